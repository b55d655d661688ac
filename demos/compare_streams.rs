//! Capture two encodings of the same button and compare them.
//!
//! Run with: cargo run --example compare_streams

use node_stream_diff::{
    nodes, to_text, CanonicalRules, Comparator, CompareOptions, RemovalRule, Source,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // The markup form spells members the way the author wrote them.
    let markup = to_text(nodes![
        ns("", "urn:ui"),
        so("urn:ui", "Button"),
        sm("urn:ui", "Width"),
        v(120),
        em,
        sm("urn:ui", "Background"),
        v("Red"),
        em,
        sm("urn:ui", "IsEnabled"),
        v(true),
        em,
        eo,
    ])?;

    // The binary form adds a synthetic key, orders members differently and
    // stores the color as a literal.
    let binary = to_text(nodes![
        ns("", "urn:ui"),
        so("urn:ui", "Button"),
        directive("Key"),
        v("Button_1"),
        em,
        sm("urn:ui", "Background"),
        v("#FFFF0000"),
        em,
        sm("urn:ui", "IsEnabled"),
        v("true"),
        em,
        sm("urn:ui", "Width"),
        v("120"),
        em,
        eo,
    ])?;

    println!("Markup capture:\n{}", markup);
    println!("Binary capture:\n{}", binary);

    let rules = CanonicalRules::default()
        .with_removal(RemovalRule::new("x:Key").for_source(Source::Binary));
    let comparator = Comparator::new(CompareOptions::new().with_rules(rules));

    let comparison = comparator.compare_text(&markup, &binary)?;
    println!("{}", serde_json::to_string_pretty(&comparison)?);
    assert!(comparison.is_equivalent());
    println!("✓ Streams are equivalent");

    Ok(())
}
