//! nsdiff: compare two captured node streams.
//!
//! Usage:
//!   nsdiff <markup.txt> <binary.txt> [--dump-dir DIR] [--dump-name NAME] [--no-dump]
//!          [--remove TOKEN]... [--remove-binary TOKEN]... [--json]
//!
//! Examples:
//!   # Compare, dumping canonical lists under /tmp/node-stream-diff on mismatch
//!   nsdiff button.markup.txt button.binary.txt
//!
//!   # Ignore the synthetic x:Key the binary form adds, print a JSON report
//!   nsdiff a.txt b.txt --remove-binary x:Key --json
//!
//! Exit status: 0 equivalent, 1 not equivalent, 2 error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use node_stream_diff::{CanonicalRules, Comparator, CompareOptions, Comparison, RemovalRule, Source};

/// Compare two captured node streams after canonicalization
#[derive(Parser, Debug)]
#[command(name = "nsdiff")]
#[command(about = "Compare two captured node streams after canonicalization")]
struct Args {
    /// Stream captured from the markup form
    markup: PathBuf,

    /// Stream captured from the binary form
    binary: PathBuf,

    /// Directory for canonical dumps written on a mismatch
    #[arg(long, env = "NSDIFF_DUMP_DIR")]
    dump_dir: Option<PathBuf>,

    /// Base file name of the dumps
    #[arg(long, default_value = "comparison")]
    dump_name: String,

    /// Do not write dumps on a mismatch
    #[arg(long)]
    no_dump: bool,

    /// Member token whose groups are removed from both streams (repeatable)
    #[arg(long, value_name = "TOKEN")]
    remove: Vec<String>,

    /// Member token whose groups are removed from the binary stream only (repeatable)
    #[arg(long, value_name = "TOKEN")]
    remove_binary: Vec<String>,

    /// Print the comparison as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn options(&self) -> CompareOptions {
        let mut rules = CanonicalRules::default();
        for token in &self.remove {
            rules = rules.with_removal(RemovalRule::new(token.as_str()));
        }
        for token in &self.remove_binary {
            rules = rules.with_removal(RemovalRule::new(token.as_str()).for_source(Source::Binary));
        }

        let mut options = CompareOptions::new()
            .with_rules(rules)
            .with_dump_name(self.dump_name.as_str())
            .with_persist_on_failure(!self.no_dump);
        if let Some(dir) = &self.dump_dir {
            options = options.with_dump_dir(dir.clone());
        }
        options
    }
}

fn report(comparison: &Comparison) {
    if comparison.equivalent {
        println!("equivalent ({} rows)", comparison.markup_len);
        return;
    }

    println!(
        "not equivalent: {} differing row(s), markup {} rows, binary {} rows",
        comparison.differing_rows, comparison.markup_len, comparison.binary_len
    );
    if let Some(mismatch) = &comparison.first_mismatch {
        println!("first mismatch at row {}:", mismatch.index);
        println!("  markup: {}", mismatch.markup.as_deref().unwrap_or("<end of stream>"));
        println!("  binary: {}", mismatch.binary.as_deref().unwrap_or("<end of stream>"));
    }
    if let Some(dumps) = &comparison.dumps {
        println!("canonical streams written to:");
        println!("  {}", dumps.markup.display());
        println!("  {}", dumps.binary.display());
    }
}

fn run(args: &Args) -> Result<Comparison, Box<dyn std::error::Error>> {
    let comparator = Comparator::new(args.options());
    let comparison = comparator.compare_files(&args.markup, &args.binary)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        report(&comparison);
    }
    Ok(comparison)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "node_stream_diff=warn".into()),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(comparison) if comparison.is_equivalent() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("nsdiff: {}", e);
            ExitCode::from(2)
        }
    }
}
