//! Configuration for encoding and comparing.
//!
//! - [`EncoderOptions`]: indentation, line terminator and whether diagnostic
//!   positions are written
//! - [`CompareOptions`]: canonicalization rules and where mismatch dumps go
//!
//! ## Examples
//!
//! ```rust
//! use node_stream_diff::{CompareOptions, EncoderOptions, LineTerminator};
//!
//! let encoder = EncoderOptions::new()
//!     .with_indent(4)
//!     .with_line_terminator(LineTerminator::CrLf);
//! assert_eq!(encoder.line_terminator.as_str(), "\r\n");
//!
//! let compare = CompareOptions::new()
//!     .with_dump_dir("target/stream-dumps")
//!     .with_dump_name("button_test");
//! assert!(compare.persist_on_failure);
//! ```

use crate::rules::CanonicalRules;
use std::path::PathBuf;

/// Row terminator written by the encoder. The scanner accepts both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineTerminator {
    #[default]
    Lf,
    CrLf,
}

impl LineTerminator {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineTerminator::Lf => "\n",
            LineTerminator::CrLf => "\r\n",
        }
    }
}

#[derive(Clone, Debug)]
pub struct EncoderOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    pub line_terminator: LineTerminator,
    /// Append `\t@line,col` to rows whose event carried a position.
    pub line_info: bool,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        EncoderOptions {
            indent: 2,
            line_terminator: LineTerminator::default(),
            line_info: true,
        }
    }
}

impl EncoderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_line_terminator(mut self, terminator: LineTerminator) -> Self {
        self.line_terminator = terminator;
        self
    }

    #[must_use]
    pub fn with_line_info(mut self, line_info: bool) -> Self {
        self.line_info = line_info;
        self
    }
}

/// Options for [`Comparator`](crate::Comparator).
///
/// On a mismatch both canonical lists are written to
/// `<dump_dir>/<dump_name>.markup.txt` and `<dump_dir>/<dump_name>.binary.txt`
/// unless `persist_on_failure` is off.
#[derive(Clone, Debug)]
pub struct CompareOptions {
    pub rules: CanonicalRules,
    pub dump_dir: PathBuf,
    pub dump_name: String,
    pub persist_on_failure: bool,
    /// Reorder member groups within object scopes.
    pub reorder_members: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        CompareOptions {
            rules: CanonicalRules::default(),
            dump_dir: std::env::temp_dir().join("node-stream-diff"),
            dump_name: "comparison".to_string(),
            persist_on_failure: true,
            reorder_members: true,
        }
    }
}

impl CompareOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rules(mut self, rules: CanonicalRules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_dump_name(mut self, name: impl Into<String>) -> Self {
        self.dump_name = name.into();
        self
    }

    #[must_use]
    pub fn with_persist_on_failure(mut self, persist: bool) -> Self {
        self.persist_on_failure = persist;
        self
    }

    #[must_use]
    pub fn with_reorder_members(mut self, reorder: bool) -> Self {
        self.reorder_members = reorder;
        self
    }
}
