//! # node_stream_diff
//!
//! Equivalence testing for two encodings of the same object graph.
//!
//! ## What is a node stream?
//!
//! A markup form and a binary form of an object graph can both be read into a
//! flat sequence of events: namespace declarations, object starts and ends,
//! member starts and ends, and leaf values. This crate renders such a stream
//! to a line-oriented canonical text, reads that text back, and decides
//! whether two captured streams describe the same graph.
//!
//! ## Key Features
//!
//! - **Diagnostic encoder**: one indented row per event, with namespace-aware
//!   prefixes and optional `@line,col` positions
//! - **Scanner and decoder**: canonical text back to events through a
//!   pluggable [`SchemaResolver`]
//! - **Canonicalizer**: removes, rewrites and reorders rows so harmless
//!   encoder differences disappear
//! - **Comparator**: row-by-row equivalence with both canonical lists dumped
//!   to disk on a mismatch
//!
//! ## Quick Start
//!
//! ### Encoding a stream
//!
//! ```rust
//! use node_stream_diff::{nodes, to_text};
//!
//! let text = to_text(nodes![
//!     so("urn:ui", "Button"),
//!     sm("urn:ui", "Content"),
//!     v("OK"),
//!     em,
//!     eo,
//! ])
//! .unwrap();
//! assert_eq!(text, "SO Button\n  SM Content\n    V \"OK\"\n  EM\nEO\nClosed.\n");
//! ```
//!
//! ### Comparing two captures
//!
//! ```rust
//! use node_stream_diff::{Comparator, CompareOptions};
//!
//! let markup = "SO Button\nSM xml:lang\nV en-US\nEM\nSM Background\nV Red\nEM\nEO";
//! let binary = "SO Button\nSM Background\nV #FFFF0000\nEM\nSM Language\nV en-US\nEM\nEO";
//!
//! let comparator = Comparator::new(CompareOptions::new().with_persist_on_failure(false));
//! assert!(comparator.compare_text(markup, binary).unwrap().is_equivalent());
//! ```
//!
//! ### Decoding text back into events
//!
//! ```rust
//! use node_stream_diff::{from_text, Node, Schema};
//!
//! let mut schema = Schema::new();
//! let button = schema.add_type("urn:ui", "Button");
//! schema.add_member(button, "Width");
//!
//! let nodes = from_text("NS =urn:ui\nSO Button\nSM Width\nV \"10\"\nEM\nEO\nClosed.", &schema).unwrap();
//! assert_eq!(nodes[1], Node::start_object("urn:ui", "Button"));
//! assert_eq!(nodes[3], Node::Value("10".to_string()));
//! ```
//!
//! ## Logging
//!
//! Every pass emits `tracing` events (`debug` per canonicalization, `warn` on a
//! mismatch, `info` when dumps are written). The library never installs a
//! subscriber.
//!
//! ## Format
//!
//! The canonical text grammar is described in the [`format`] module.

pub mod canon;
pub mod color;
pub mod compare;
pub mod de;
pub mod error;
pub mod format;
pub mod frame;
pub mod macros;
pub mod map;
pub mod node;
pub mod options;
pub mod point;
pub mod rules;
pub mod scanner;
pub mod schema;
pub mod ser;
pub mod value;

pub use canon::Canonicalizer;
pub use color::Color;
pub use compare::{Comparator, Comparison, DumpPaths, Mismatch};
pub use de::{decode_into, from_text, Decoder};
pub use error::{Error, Result};
pub use frame::{Frame, FrameStack};
pub use map::PrefixMap;
pub use node::{
    transform, LineInfo, MemberName, Node, NodeListReader, NodeReader, NodeSink, Opcode, TypeName,
    XAML_NAMESPACE, XAML_PREFIX, XML_NAMESPACE, XML_PREFIX,
};
pub use options::{CompareOptions, EncoderOptions, LineTerminator};
pub use point::{Point, PointList};
pub use rules::{CanonicalRules, RemovalRule, Source, ValueWrapper};
pub use scanner::{scan, Instruction, RowFlag, Scanner};
pub use schema::{Lookup, MemberDef, MemberId, Schema, SchemaResolver, TypeId};
pub use ser::{encode_reader, to_text, to_text_with_options, write_quoted, Encoder};
pub use value::{LeafValue, Number};

/// Canonicalizes captured text with the default rules.
///
/// # Examples
///
/// ```rust
/// use node_stream_diff::{canonicalize, Source};
///
/// let rows = canonicalize("SO Setter\nSM Value\nV TRUE\nEM\nSM Property\nV Button.IsEnabled\nEM\nEO", Source::Binary).unwrap();
/// assert_eq!(
///     rows,
///     vec!["SO Setter", "SM Property", "V \"IsEnabled\"", "EM", "SM Value", "V \"true\"", "EM", "EO"]
/// );
/// ```
///
/// # Errors
///
/// Returns an error if the text does not scan or its scopes are unbalanced.
pub fn canonicalize(text: &str, source: Source) -> Result<Vec<String>> {
    let rules = CanonicalRules::default();
    Canonicalizer::new(&rules).canonicalize_text(text, source)
}

/// Compares two captured row lists with the default options.
///
/// On a mismatch both canonical lists are written under the system temp
/// directory; see [`CompareOptions`] to change that.
///
/// # Examples
///
/// ```rust
/// use node_stream_diff::compare;
///
/// let a = ["SO Panel", "SM Width", "V 10", "EM", "SM Height", "V 20", "EM", "EO"];
/// let b = ["SO Panel", "SM Height", "V 20", "EM", "SM Width", "V 10", "EM", "EO"];
/// assert!(compare(&a, &b).unwrap());
/// ```
///
/// # Errors
///
/// Returns an error if either list is malformed or a dump cannot be written.
/// Non-equivalence is `Ok(false)`, not an error.
pub fn compare<M, B>(markup_rows: &[M], binary_rows: &[B]) -> Result<bool>
where
    M: AsRef<str>,
    B: AsRef<str>,
{
    Comparator::default()
        .compare(markup_rows, binary_rows)
        .map(|c| c.is_equivalent())
}

/// Compares two captured texts with the default options.
///
/// # Errors
///
/// Returns an error if either text is malformed or a dump cannot be written.
pub fn compare_text(markup: &str, binary: &str) -> Result<Comparison> {
    Comparator::default().compare_text(markup, binary)
}

/// Decodes `text` and encodes the events again, normalizing indentation,
/// prefixes and quoting.
///
/// # Examples
///
/// ```rust
/// use node_stream_diff::{reencode, Schema};
///
/// let text = reencode("SO Button\nSM Content\nV OK\nEM\nEO", &Schema::new()).unwrap();
/// assert_eq!(text, "SO Button\n  SM Content UNKNOWN\n    V \"OK\"\n  EM\nEO\nClosed.\n");
/// ```
///
/// # Errors
///
/// Returns an error if the text does not scan or decode.
pub fn reencode<S>(text: &str, schema: &S) -> Result<String>
where
    S: SchemaResolver + ?Sized,
{
    let mut encoder = Encoder::new(EncoderOptions::default());
    decode_into(text, schema, &mut encoder)?;
    encoder.finish()
}
