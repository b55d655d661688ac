//! Error types for scanning, decoding, encoding and comparing node streams.
//!
//! ## Error Categories
//!
//! - **Malformed input**: unscannable rows, unknown opcodes, unbound prefixes and
//!   unbalanced nesting. These are fatal; no partial result is ever returned.
//! - **Setup failures**: missing input files or unusable dump directories.
//! - **I/O errors**: reading captured streams or writing diagnostic dumps.
//!
//! A comparison that finds the two streams different is *not* an error. It is
//! reported through [`Comparison`](crate::Comparison) so callers can tell
//! "the tool could not run" apart from "the graphs are not equivalent".
//!
//! ## Examples
//!
//! ```rust
//! use node_stream_diff::{scan, Error};
//!
//! let result = scan("ZZ foo");
//! assert!(matches!(result, Err(Error::UnknownOpcode { line: 1, .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by the node-stream tooling.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Syntax error with detailed context
    #[error("Syntax error at line {line}, column {col}:\n{context}\n{msg}{suggestion}")]
    Syntax {
        line: usize,
        col: usize,
        msg: String,
        context: String,
        suggestion: String,
    },

    /// A row whose opcode tag is not part of the instruction vocabulary
    #[error("Unknown opcode `{opcode}` at line {line}:\n{context}")]
    UnknownOpcode {
        line: usize,
        opcode: String,
        context: String,
    },

    /// A namespace prefix with no binding in any enclosing frame
    #[error("Unbound namespace prefix `{prefix}` at line {line}")]
    UnboundPrefix { line: usize, prefix: String },

    /// Start/end markers that do not nest properly
    #[error("Unbalanced node stream at line {line}: {msg}")]
    Unbalanced { line: usize, msg: String },

    /// A required input (file, collaborator) is missing
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use node_stream_diff::Error;
    ///
    /// let err = Error::syntax(10, 5, "unterminated quoted value");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
            context: String::new(),
            suggestion: String::new(),
        }
    }

    /// Creates a syntax error with the offending row and an optional suggestion.
    pub fn syntax_with_context(
        line: usize,
        col: usize,
        msg: &str,
        context: &str,
        suggestion: Option<&str>,
    ) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
            context: context.to_string(),
            suggestion: suggestion
                .map(|s| format!("\nHelp: {}", s))
                .unwrap_or_default(),
        }
    }

    /// Creates an unknown-opcode error for the given row.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use node_stream_diff::Error;
    ///
    /// let err = Error::unknown_opcode(3, "ZZ", "ZZ foo");
    /// assert!(err.to_string().contains("`ZZ`"));
    /// ```
    pub fn unknown_opcode(line: usize, opcode: &str, context: &str) -> Self {
        Error::UnknownOpcode {
            line,
            opcode: opcode.to_string(),
            context: context.to_string(),
        }
    }

    /// Creates an unbound-prefix error.
    pub fn unbound_prefix(line: usize, prefix: &str) -> Self {
        Error::UnboundPrefix {
            line,
            prefix: prefix.to_string(),
        }
    }

    /// Creates a nesting error.
    pub fn unbalanced(line: usize, msg: &str) -> Self {
        Error::Unbalanced {
            line,
            msg: msg.to_string(),
        }
    }

    /// Creates a missing-input error for setup failures.
    pub fn missing_input<T: fmt::Display>(what: T) -> Self {
        Error::MissingInput(what.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for errors caused by malformed stream content.
    #[must_use]
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Error::Syntax { .. }
                | Error::UnknownOpcode { .. }
                | Error::UnboundPrefix { .. }
                | Error::Unbalanced { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_rendering() {
        let err = Error::syntax_with_context(2, 1, "bad row", "SO", Some("add a type token"));
        let text = err.to_string();
        assert!(text.contains("Help: add a type token"));
        assert!(text.contains("line 2"));
    }

    #[test]
    fn test_malformed_classification() {
        assert!(Error::unbalanced(1, "x").is_malformed_input());
        assert!(Error::unbound_prefix(1, "p").is_malformed_input());
        assert!(!Error::missing_input("a.txt").is_malformed_input());
        assert!(!Error::io("disk full").is_malformed_input());
    }
}
