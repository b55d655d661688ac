//! Diagnostic encoding of live node streams.
//!
//! The [`Encoder`] is a [`NodeSink`]: feed it events from any reader and it
//! renders one indented canonical row per event. Indentation is the current
//! nesting depth; it helps a human reader and is ignored by the scanner.
//!
//! ```rust
//! use node_stream_diff::{to_text, MemberName, Node};
//!
//! let nodes = vec![
//!     Node::namespace("", "urn:ui"),
//!     Node::start_object("urn:ui", "Button"),
//!     Node::start_member(MemberName::declared("urn:ui", "Width")),
//!     Node::value(10),
//!     Node::EndMember,
//!     Node::EndObject,
//! ];
//!
//! let text = to_text(nodes).unwrap();
//! assert_eq!(
//!     text,
//!     "NS =urn:ui\nSO Button\n  SM Width\n    V \"10\"\n  EM\nEO\nClosed.\n"
//! );
//! ```
//!
//! Annotations:
//!
//! - `IMPLICIT` / `UNKNOWN` after a member the markup never spelled out or no
//!   schema recognized
//! - `GO` for an object that was retrieved rather than constructed
//! - `\t@line,col` when the reader reported a position and
//!   [`EncoderOptions::line_info`] is on

use crate::frame::{Frame, FrameStack};
use crate::node::{LineInfo, MemberName, Node, NodeReader, NodeSink, Opcode};
use crate::options::EncoderOptions;
use crate::scanner::RowFlag;
use crate::{Error, Result};

/// Renders node-stream events as canonical text.
pub struct Encoder {
    output: String,
    options: EncoderOptions,
    frames: FrameStack,
    depth: usize,
    rows: usize,
    line_info: Option<LineInfo>,
    closed: bool,
}

impl Encoder {
    pub fn new(options: EncoderOptions) -> Self {
        Encoder {
            output: String::with_capacity(256),
            options,
            frames: FrameStack::new(),
            depth: 0,
            rows: 0,
            line_info: None,
            closed: false,
        }
    }

    /// Checks that every scope was closed, writes the terminal `Closed.` row
    /// and returns the text.
    pub fn finish(mut self) -> Result<String> {
        if !self.frames.is_empty() {
            return Err(Error::unbalanced(
                self.rows + 1,
                &format!("{} object scope(s) still open", self.frames.depth()),
            ));
        }
        self.write_row(Opcode::Closed.as_str());
        self.closed = true;
        Ok(self.output)
    }

    fn write_row(&mut self, body: &str) {
        for _ in 0..self.depth * self.options.indent {
            self.output.push(' ');
        }
        self.output.push_str(body);
        if let Some(info) = self.line_info.take() {
            if self.options.line_info {
                self.output.push('\t');
                self.output.push_str(&info.to_string());
            }
        }
        self.output.push_str(self.options.line_terminator.as_str());
        self.rows += 1;
    }

    fn unbalanced(&self, msg: &str) -> Error {
        Error::unbalanced(self.rows + 1, msg)
    }

    /// An object or a namespace declaration may appear at the root or inside
    /// an open member.
    fn check_object_position(&self) -> Result<()> {
        match self.frames.current() {
            Some(frame) if frame.member.is_none() => {
                Err(self.unbalanced("object or namespace directly inside an object"))
            }
            _ => Ok(()),
        }
    }

    fn member_token(&self, member: &MemberName) -> String {
        let name = member.qualified_name();
        // Unprefixed only when the decoder would read it back in this namespace.
        let bare_namespace = self.frames.unprefixed_member_namespace();
        let prefix = if bare_namespace == Some(member.namespace.as_str()) {
            None
        } else {
            self.frames.best_named_prefix_for(&[member.namespace.as_str()])
        };

        let mut token = match prefix {
            Some(prefix) => format!("{}:{}", prefix, name),
            None => name,
        };
        if member.implicit {
            token.push(' ');
            token.push_str(RowFlag::Implicit.as_str());
        }
        if member.unknown {
            token.push(' ');
            token.push_str(RowFlag::Unknown.as_str());
        }
        token
    }
}

impl NodeSink for Encoder {
    fn write_node(&mut self, node: Node) -> Result<()> {
        if self.closed {
            return Err(self.unbalanced("event after the stream was closed"));
        }

        match node {
            Node::Namespace { prefix, uri } => {
                self.check_object_position()?;
                self.write_row(&format!("NS {}={}", prefix, uri));
                self.frames.declare(prefix, uri);
            }
            Node::StartObject(ty) => {
                self.check_object_position()?;
                // Pending bindings belong to this object and are already visible.
                let prefix = self.frames.best_prefix_for(&[ty.namespace.as_str()]);
                let row = match prefix.as_deref() {
                    Some(p) if !p.is_empty() => format!("SO {}:{}", p, ty.name),
                    _ => format!("SO {}", ty.name),
                };
                self.frames.push(Frame::new(Some(ty)));
                self.write_row(&row);
                self.depth += 1;
            }
            Node::GetObject => {
                self.check_object_position()?;
                let mut frame = Frame::new(None);
                frame.retrieved = true;
                self.frames.push(frame);
                self.write_row(Opcode::GetObject.as_str());
                self.depth += 1;
            }
            Node::EndObject => {
                match self.frames.current() {
                    None => return Err(self.unbalanced("EndObject without an open object")),
                    Some(frame) if frame.member.is_some() => {
                        return Err(self.unbalanced("EndObject while a member is still open"))
                    }
                    Some(_) => {}
                }
                self.depth -= 1;
                self.write_row(Opcode::EndObject.as_str());
                self.frames.pop();
            }
            Node::StartMember(member) => {
                match self.frames.current() {
                    None => return Err(self.unbalanced("member started outside an object")),
                    Some(frame) if frame.member.is_some() => {
                        return Err(self.unbalanced("member started inside another member"))
                    }
                    Some(_) => {}
                }
                let row = format!("SM {}", self.member_token(&member));
                self.write_row(&row);
                if let Some(frame) = self.frames.current_mut() {
                    frame.member = Some(member);
                }
                self.depth += 1;
            }
            Node::EndMember => {
                if self.frames.current_member().is_none() {
                    return Err(self.unbalanced("EndMember without an open member"));
                }
                self.depth -= 1;
                self.write_row(Opcode::EndMember.as_str());
                if let Some(frame) = self.frames.current_mut() {
                    frame.member = None;
                }
            }
            Node::Value(value) => {
                if self.frames.current_member().is_none() {
                    return Err(self.unbalanced("value outside a member"));
                }
                let mut row = String::with_capacity(value.len() + 4);
                row.push_str("V ");
                write_quoted(&mut row, &value);
                self.write_row(&row);
            }
        }
        Ok(())
    }

    fn set_line_info(&mut self, line_info: LineInfo) {
        self.line_info = Some(line_info);
    }
}

/// Writes `s` double-quoted with backslash escapes. Raw tabs never reach the
/// output, so a tab in a row always starts the diagnostic suffix.
pub fn write_quoted(output: &mut String, s: &str) {
    output.push('"');
    for ch in s.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            '\u{0008}' => output.push_str("\\b"),
            '\u{000C}' => output.push_str("\\f"),
            '\0' => output.push_str("\\0"),
            c if c.is_control() => output.push_str(&format!("\\u{:04X}", c as u32)),
            c => output.push(c),
        }
    }
    output.push('"');
}

/// Encodes a complete event sequence with default options.
pub fn to_text<I>(nodes: I) -> Result<String>
where
    I: IntoIterator<Item = Node>,
{
    to_text_with_options(nodes, EncoderOptions::default())
}

pub fn to_text_with_options<I>(nodes: I, options: EncoderOptions) -> Result<String>
where
    I: IntoIterator<Item = Node>,
{
    let mut encoder = Encoder::new(options);
    for node in nodes {
        encoder.write_node(node)?;
    }
    encoder.finish()
}

/// Drains a reader through the encoder.
pub fn encode_reader<R>(reader: &mut R, options: EncoderOptions) -> Result<String>
where
    R: NodeReader + ?Sized,
{
    let mut encoder = Encoder::new(options);
    let count = crate::node::transform(reader, &mut encoder)?;
    tracing::debug!(events = count, "encoded node stream");
    encoder.finish()
}
