//! Canonical text scanning.
//!
//! The [`Scanner`] splits a captured text blob into [`Instruction`]s, one per
//! non-blank row. Leading whitespace is ignored; nesting is recomputed from
//! the opcodes by whoever consumes the instructions. Everything after the
//! first TAB of a row is a diagnostic suffix (`@line,col`) and never becomes
//! part of an operand.
//!
//! ```rust
//! use node_stream_diff::{scan, Opcode};
//!
//! let rows = scan("SO p:Button\n  SM Width\n    V \"10\"\n  EM\nEO\nClosed.").unwrap();
//! assert_eq!(rows.len(), 6);
//! assert_eq!(rows[0].opcode, Opcode::StartObject);
//! assert_eq!(rows[0].operands, vec!["p", "Button"]);
//! assert_eq!(rows[2].value(), Some("10"));
//! ```
//!
//! A row with an unrecognized opcode stops scanning; no partial result is
//! returned because a corrupt instruction stream cannot be resynchronized.

use crate::node::{LineInfo, Opcode};
use crate::{Error, Result};
use std::fmt;

/// Trailing flag tokens on `SO` and `SM` rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowFlag {
    Retrieved,
    Implicit,
    Unknown,
}

impl RowFlag {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RowFlag::Retrieved => "RETRIEVED",
            RowFlag::Implicit => "IMPLICIT",
            RowFlag::Unknown => "UNKNOWN",
        }
    }

    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "RETRIEVED" => Some(RowFlag::Retrieved),
            "IMPLICIT" => Some(RowFlag::Implicit),
            "UNKNOWN" => Some(RowFlag::Unknown),
            _ => None,
        }
    }
}

/// One scanned row.
///
/// Operand layout by opcode:
///
/// | Opcode | Operands |
/// |--------|----------|
/// | `NS` | `[prefix, uri]` |
/// | `SO`, `SM` | `[prefix, name, flags...]` (`prefix` may be empty) |
/// | `V` | `[value]` (unescaped) |
/// | `GO`, `EO`, `EM`, `Closed.` | `[]` |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<String>,
    /// 1-based row number in the scanned text.
    pub line: usize,
    pub line_info: Option<LineInfo>,
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: Vec<String>) -> Self {
        Instruction {
            opcode,
            operands,
            line: 0,
            line_info: None,
        }
    }

    /// Prefix token of an `NS`, `SO` or `SM` row.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        match self.opcode {
            Opcode::Namespace | Opcode::StartObject | Opcode::StartMember => {
                self.operands.first().map(String::as_str)
            }
            _ => None,
        }
    }

    /// Type or member name of an `SO` or `SM` row.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self.opcode {
            Opcode::StartObject | Opcode::StartMember => self.operands.get(1).map(String::as_str),
            _ => None,
        }
    }

    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match self.opcode {
            Opcode::Namespace => self.operands.get(1).map(String::as_str),
            _ => None,
        }
    }

    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self.opcode {
            Opcode::Value => self.operands.first().map(String::as_str),
            _ => None,
        }
    }

    pub fn flags(&self) -> impl Iterator<Item = RowFlag> + '_ {
        let skip = match self.opcode {
            Opcode::StartObject | Opcode::StartMember => 2,
            _ => self.operands.len(),
        };
        self.operands
            .iter()
            .skip(skip)
            .filter_map(|t| RowFlag::from_token(t))
    }

    #[must_use]
    pub fn has_flag(&self, flag: RowFlag) -> bool {
        self.flags().any(|f| f == flag)
    }

    /// The `prefix:name` token as written, or just `name` when unprefixed.
    #[must_use]
    pub fn qualified_token(&self) -> Option<String> {
        let name = self.name()?;
        match self.prefix() {
            Some(prefix) if !prefix.is_empty() => Some(format!("{}:{}", prefix, name)),
            _ => Some(name.to_string()),
        }
    }
}

impl fmt::Display for Instruction {
    /// Renders the row body: no indentation, no diagnostic suffix, values
    /// always quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Opcode::Namespace => write!(
                f,
                "NS {}={}",
                self.prefix().unwrap_or_default(),
                self.uri().unwrap_or_default()
            ),
            Opcode::StartObject | Opcode::StartMember => {
                write!(f, "{} {}", self.opcode, self.qualified_token().unwrap_or_default())?;
                for flag in self.operands.iter().skip(2) {
                    write!(f, " {}", flag)?;
                }
                Ok(())
            }
            Opcode::Value => {
                let mut quoted = String::new();
                crate::ser::write_quoted(&mut quoted, self.value().unwrap_or_default());
                write!(f, "V {}", quoted)
            }
            other => f.write_str(other.as_str()),
        }
    }
}

/// Row splitter for canonical text.
pub struct Scanner<'a> {
    input: &'a str,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner { input }
    }

    /// Scans every row. Stops at the first malformed row with an error.
    pub fn scan(&self) -> Result<Vec<Instruction>> {
        let mut instructions = Vec::new();
        let mut closed_at: Option<usize> = None;

        for (index, raw) in self.input.lines().enumerate() {
            let line = index + 1;
            let Some(instruction) = scan_row(line, raw)? else {
                continue;
            };
            if let Some(closed) = closed_at {
                return Err(Error::syntax_with_context(
                    line,
                    1,
                    "row after terminal `Closed.`",
                    raw,
                    Some(&format!("the stream was closed at line {}", closed)),
                ));
            }
            if instruction.opcode == Opcode::Closed {
                closed_at = Some(line);
            }
            instructions.push(instruction);
        }

        Ok(instructions)
    }
}

/// Scans a text blob into instructions.
pub fn scan(text: &str) -> Result<Vec<Instruction>> {
    Scanner::new(text).scan()
}

fn scan_row(line: usize, raw: &str) -> Result<Option<Instruction>> {
    let trimmed = raw.trim_start();
    let indent = raw.len() - trimmed.len();
    let (body, diagnostic) = match trimmed.split_once('\t') {
        Some((body, diag)) => (body.trim_end_matches(' '), Some(diag)),
        None => (trimmed, None),
    };
    if body.trim().is_empty() {
        return Ok(None);
    }

    let (tag, rest) = match body.split_once(' ') {
        Some((tag, rest)) => (tag, Some(rest)),
        None => (body, None),
    };
    let opcode = Opcode::from_tag(tag).ok_or_else(|| Error::unknown_opcode(line, tag, raw))?;
    let col = indent + tag.len() + 2;

    let operands = match opcode {
        Opcode::Namespace => {
            let rest = rest.unwrap_or_default();
            let (prefix, uri) = rest.split_once('=').ok_or_else(|| {
                Error::syntax_with_context(
                    line,
                    col,
                    "namespace row without `=`",
                    raw,
                    Some("write `NS <prefix>=<uri>`"),
                )
            })?;
            vec![prefix.trim().to_string(), uri.trim().to_string()]
        }
        Opcode::StartObject | Opcode::StartMember => scan_named(line, col, raw, opcode, rest)?,
        Opcode::Value => vec![scan_value(line, col, raw, rest.unwrap_or_default())?],
        Opcode::GetObject | Opcode::EndObject | Opcode::EndMember | Opcode::Closed => {
            if rest.map_or(false, |r| !r.trim().is_empty()) {
                return Err(Error::syntax_with_context(
                    line,
                    col,
                    &format!("`{}` takes no operands", opcode),
                    raw,
                    None,
                ));
            }
            Vec::new()
        }
    };

    Ok(Some(Instruction {
        opcode,
        operands,
        line,
        line_info: diagnostic.and_then(parse_line_info),
    }))
}

fn scan_named(
    line: usize,
    col: usize,
    raw: &str,
    opcode: Opcode,
    rest: Option<&str>,
) -> Result<Vec<String>> {
    let mut tokens = rest.unwrap_or_default().split_whitespace();
    let token = tokens.next().ok_or_else(|| {
        let what = if opcode == Opcode::StartObject {
            "type"
        } else {
            "member"
        };
        Error::syntax_with_context(line, col, &format!("missing {} name", what), raw, None)
    })?;

    let (prefix, name) = token.split_once(':').unwrap_or(("", token));
    if name.is_empty() {
        return Err(Error::syntax_with_context(line, col, "empty name after prefix", raw, None));
    }
    let mut operands = vec![prefix.to_string(), name.to_string()];

    for flag in tokens {
        let allowed = match RowFlag::from_token(flag) {
            Some(RowFlag::Retrieved) => opcode == Opcode::StartObject,
            Some(RowFlag::Implicit | RowFlag::Unknown) => opcode == Opcode::StartMember,
            None => false,
        };
        if !allowed {
            return Err(Error::syntax_with_context(
                line,
                col,
                &format!("unexpected token `{}` on `{}` row", flag, opcode),
                raw,
                Some("flags are RETRIEVED (SO), IMPLICIT and UNKNOWN (SM)"),
            ));
        }
        operands.push(flag.to_string());
    }

    Ok(operands)
}

fn scan_value(line: usize, col: usize, raw: &str, rest: &str) -> Result<String> {
    if !rest.starts_with('"') {
        return Ok(rest.to_string());
    }

    let mut result = String::new();
    let mut chars = rest[1..].char_indices();
    while let Some((offset, ch)) = chars.next() {
        match ch {
            '"' => {
                let trailing = &rest[offset + 2..];
                if !trailing.trim().is_empty() {
                    return Err(Error::syntax_with_context(
                        line,
                        col + offset + 2,
                        "text after closing quote",
                        raw,
                        None,
                    ));
                }
                return Ok(result);
            }
            '\\' => match chars.next().map(|(_, c)| c) {
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('b') => result.push('\u{0008}'),
                Some('f') => result.push('\u{000C}'),
                Some('0') => result.push('\0'),
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).map(|(_, c)| c).collect();
                    let ch = u32::from_str_radix(&hex, 16)
                        .ok()
                        .filter(|_| hex.len() == 4)
                        .and_then(char::from_u32)
                        .ok_or_else(|| {
                            Error::syntax(line, col + offset, "invalid \\u escape in value")
                        })?;
                    result.push(ch);
                }
                _ => {
                    return Err(Error::syntax_with_context(
                        line,
                        col + offset,
                        "invalid escape sequence in value",
                        raw,
                        None,
                    ))
                }
            },
            _ => result.push(ch),
        }
    }

    Err(Error::syntax_with_context(
        line,
        col,
        "unterminated quoted value",
        raw,
        Some("close the value with `\"`"),
    ))
}

fn parse_line_info(diagnostic: &str) -> Option<LineInfo> {
    let (line, column) = diagnostic.trim().strip_prefix('@')?.split_once(',')?;
    Some(LineInfo::new(line.trim().parse().ok()?, column.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_opcode_is_fatal() {
        let err = scan("SO p:Button\nZZ foo\nEO").unwrap_err();
        match err {
            Error::UnknownOpcode { line, opcode, .. } => {
                assert_eq!(line, 2);
                assert_eq!(opcode, "ZZ");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_namespace_row_splits_on_first_equals() {
        let rows = scan("NS p=urn:a=b").unwrap();
        assert_eq!(rows[0].operands, vec!["p", "urn:a=b"]);
        assert!(scan("NS p urn").is_err());
    }

    #[test]
    fn test_flags_are_kept() {
        let rows = scan("SO p:Style RETRIEVED\nSM x:_Items IMPLICIT").unwrap();
        assert!(rows[0].has_flag(RowFlag::Retrieved));
        assert_eq!(rows[1].operands, vec!["x", "_Items", "IMPLICIT"]);
        assert!(scan("SO p:Style IMPLICIT").is_err());
        assert!(scan("SM Width RETRIEVED").is_err());
    }

    #[test]
    fn test_unprefixed_names() {
        let rows = scan("SM Grid.Row").unwrap();
        assert_eq!(rows[0].prefix(), Some(""));
        assert_eq!(rows[0].name(), Some("Grid.Row"));
        assert_eq!(rows[0].to_string(), "SM Grid.Row");
    }

    #[test]
    fn test_values() {
        let rows = scan("V \"a \\\"b\\\"\\tc\"\nV bare words\nV\nV \"\\u0041\"").unwrap();
        assert_eq!(rows[0].value(), Some("a \"b\"\tc"));
        assert_eq!(rows[1].value(), Some("bare words"));
        assert_eq!(rows[2].value(), Some(""));
        assert_eq!(rows[3].value(), Some("A"));
        assert!(scan("V \"open").is_err());
        assert!(scan("V \"a\" b").is_err());
    }

    #[test]
    fn test_diagnostic_suffix_is_split_off() {
        let rows = scan("    SM Width\t@3,7\n\tEM").unwrap();
        assert_eq!(rows[0].line_info, Some(LineInfo::new(3, 7)));
        assert_eq!(rows[0].to_string(), "SM Width");
        assert_eq!(rows[1].opcode, Opcode::EndMember);
    }

    #[test]
    fn test_rows_after_closed() {
        assert!(scan("EO\nClosed.\n\n").is_ok());
        assert!(scan("Closed.\nEO").is_err());
    }

    #[test]
    fn test_crlf_terminators() {
        let rows = scan("SO Button\r\nEO\r\nClosed.\r\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name(), Some("Button"));
    }
}
