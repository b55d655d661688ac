//! The node-stream event model.
//!
//! A node stream is an object graph flattened by pre-order traversal with
//! explicit close markers:
//!
//! ```text
//! NS p=urn:ui          Namespace { prefix: "p", uri: "urn:ui" }
//! SO p:Button          StartObject(TypeName)
//!   SM Width           StartMember(MemberName)
//!     V "10"           Value("10")
//!   EM                 EndMember
//! EO                   EndObject
//! ```
//!
//! Producers push events into a [`NodeSink`]; pull-based producers implement
//! [`NodeReader`] and are drained with [`transform`].

use crate::value::LeafValue;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The core markup namespace. Directives such as `x:Key` live here.
pub const XAML_NAMESPACE: &str = "http://schemas.microsoft.com/winfx/2006/xaml";

/// The XML-reserved namespace, always written with the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Conventional prefix for [`XAML_NAMESPACE`] when no binding is in scope.
pub const XAML_PREFIX: &str = "x";

pub const XML_PREFIX: &str = "xml";

/// A namespace-qualified type name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeName {
    pub namespace: String,
    pub name: String,
}

impl TypeName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeName {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.name)
    }
}

/// A member opened by [`Node::StartMember`].
///
/// `declaring_type` is only set for attachable members, where it names the
/// owning type (`Grid` in `Grid.Row`). Directive members such as `x:Key` and
/// the implicit `_Items` live in [`XAML_NAMESPACE`] with no declaring type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberName {
    pub name: String,
    pub namespace: String,
    pub declaring_type: Option<TypeName>,
    pub attachable: bool,
    pub implicit: bool,
    pub unknown: bool,
}

impl MemberName {
    /// A member declared by the enclosing object's type.
    pub fn declared(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        MemberName {
            name: name.into(),
            namespace: namespace.into(),
            declaring_type: None,
            attachable: false,
            implicit: false,
            unknown: false,
        }
    }

    /// An attachable member owned by `owner`, e.g. `Grid.Row`.
    pub fn attachable(owner: TypeName, name: impl Into<String>) -> Self {
        MemberName {
            name: name.into(),
            namespace: owner.namespace.clone(),
            declaring_type: Some(owner),
            attachable: true,
            implicit: false,
            unknown: false,
        }
    }

    /// An explicit directive in the core markup namespace, e.g. `Key`.
    pub fn directive(name: impl Into<String>) -> Self {
        Self::declared(XAML_NAMESPACE, name)
    }

    /// A directive the markup never spelled out, e.g. `_Items`.
    pub fn implicit(name: impl Into<String>) -> Self {
        MemberName {
            implicit: true,
            ..Self::directive(name)
        }
    }

    /// A member no schema could resolve; retained verbatim.
    pub fn unknown(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        MemberName {
            unknown: true,
            ..Self::declared(namespace, name)
        }
    }

    /// The name as written in a member row: `Owner.Name` for attachables.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.declaring_type {
            Some(owner) if self.attachable => format!("{}.{}", owner.name, self.name),
            _ => self.name.clone(),
        }
    }
}

/// Source position of the event that produced a row. Diagnostic only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInfo {
    pub line: usize,
    pub column: usize,
}

impl LineInfo {
    pub const fn new(line: usize, column: usize) -> Self {
        LineInfo { line, column }
    }
}

impl fmt::Display for LineInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{},{}", self.line, self.column)
    }
}

/// A single node-stream event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Namespace { prefix: String, uri: String },
    StartObject(TypeName),
    GetObject,
    EndObject,
    StartMember(MemberName),
    EndMember,
    Value(String),
}

impl Node {
    pub fn namespace(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Node::Namespace {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    pub fn start_object(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Node::StartObject(TypeName::new(namespace, name))
    }

    pub fn start_member(member: MemberName) -> Self {
        Node::StartMember(member)
    }

    /// A leaf value, rendered to its normalized string form.
    pub fn value(value: impl Into<LeafValue>) -> Self {
        Node::Value(value.into().into_raw())
    }

    #[must_use]
    pub fn opcode(&self) -> Opcode {
        match self {
            Node::Namespace { .. } => Opcode::Namespace,
            Node::StartObject(_) => Opcode::StartObject,
            Node::GetObject => Opcode::GetObject,
            Node::EndObject => Opcode::EndObject,
            Node::StartMember(_) => Opcode::StartMember,
            Node::EndMember => Opcode::EndMember,
            Node::Value(_) => Opcode::Value,
        }
    }
}

/// Row tags of the canonical text form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Namespace,
    StartObject,
    GetObject,
    EndObject,
    StartMember,
    EndMember,
    Value,
    Closed,
}

impl Opcode {
    /// Returns the row tag for this opcode.
    ///
    /// ```rust
    /// use node_stream_diff::Opcode;
    ///
    /// assert_eq!(Opcode::StartMember.as_str(), "SM");
    /// assert_eq!(Opcode::from_tag("EO"), Some(Opcode::EndObject));
    /// assert_eq!(Opcode::from_tag("ZZ"), None);
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Opcode::Namespace => "NS",
            Opcode::StartObject => "SO",
            Opcode::GetObject => "GO",
            Opcode::EndObject => "EO",
            Opcode::StartMember => "SM",
            Opcode::EndMember => "EM",
            Opcode::Value => "V",
            Opcode::Closed => "Closed.",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "NS" => Some(Opcode::Namespace),
            "SO" => Some(Opcode::StartObject),
            "GO" => Some(Opcode::GetObject),
            "EO" => Some(Opcode::EndObject),
            "SM" => Some(Opcode::StartMember),
            "EM" => Some(Opcode::EndMember),
            "V" => Some(Opcode::Value),
            "Closed." => Some(Opcode::Closed),
            _ => None,
        }
    }

    /// `SO` and `GO` both open an object scope.
    #[inline]
    #[must_use]
    pub const fn opens_object(&self) -> bool {
        matches!(self, Opcode::StartObject | Opcode::GetObject)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A consumer of node-stream events.
pub trait NodeSink {
    fn write_node(&mut self, node: Node) -> Result<()>;

    /// Position of the next node written. Sinks that don't report positions
    /// can ignore it.
    fn set_line_info(&mut self, _line_info: LineInfo) {}
}

impl NodeSink for Vec<Node> {
    fn write_node(&mut self, node: Node) -> Result<()> {
        self.push(node);
        Ok(())
    }
}

impl<S: NodeSink + ?Sized> NodeSink for &mut S {
    fn write_node(&mut self, node: Node) -> Result<()> {
        (**self).write_node(node)
    }

    fn set_line_info(&mut self, line_info: LineInfo) {
        (**self).set_line_info(line_info)
    }
}

/// A pull-based producer of node-stream events.
///
/// External readers of the markup and binary forms implement this; their
/// type-resolution context is whatever [`SchemaResolver`](crate::SchemaResolver)
/// they were built with.
pub trait NodeReader {
    /// Returns the next event, or `None` once the stream is exhausted.
    fn read(&mut self) -> Result<Option<Node>>;

    /// Position of the event last returned by [`read`](Self::read), if known.
    fn line_info(&self) -> Option<LineInfo> {
        None
    }
}

/// Replays an already captured event list.
#[derive(Clone, Debug, Default)]
pub struct NodeListReader {
    nodes: std::vec::IntoIter<(Node, Option<LineInfo>)>,
    current: Option<LineInfo>,
}

impl NodeListReader {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self::with_line_info(nodes.into_iter().map(|n| (n, None)).collect())
    }

    pub fn with_line_info(nodes: Vec<(Node, Option<LineInfo>)>) -> Self {
        NodeListReader {
            nodes: nodes.into_iter(),
            current: None,
        }
    }
}

impl NodeReader for NodeListReader {
    fn read(&mut self) -> Result<Option<Node>> {
        Ok(self.nodes.next().map(|(node, info)| {
            self.current = info;
            node
        }))
    }

    fn line_info(&self) -> Option<LineInfo> {
        self.current
    }
}

/// Drains `reader` into `sink`, forwarding positions. Returns the number of
/// events moved.
pub fn transform<R, S>(reader: &mut R, sink: &mut S) -> Result<usize>
where
    R: NodeReader + ?Sized,
    S: NodeSink + ?Sized,
{
    let mut count = 0;
    while let Some(node) = reader.read()? {
        if let Some(info) = reader.line_info() {
            sink.set_line_info(info);
        }
        sink.write_node(node)?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_member_names() {
        let owner = TypeName::new("urn:ui", "Grid");
        assert_eq!(MemberName::attachable(owner, "Row").qualified_name(), "Grid.Row");
        assert_eq!(MemberName::directive("Key").qualified_name(), "Key");
        assert!(MemberName::implicit("_Items").implicit);
    }

    #[test]
    fn test_transform_moves_everything() {
        let nodes = vec![
            Node::start_object("urn:ui", "Button"),
            Node::EndObject,
        ];
        let mut reader = NodeListReader::new(nodes.clone());
        let mut sink: Vec<Node> = Vec::new();
        assert_eq!(transform(&mut reader, &mut sink).unwrap(), 2);
        assert_eq!(sink, nodes);
    }

    #[test]
    fn test_opcode_tags_roundtrip() {
        for op in [
            Opcode::Namespace,
            Opcode::StartObject,
            Opcode::GetObject,
            Opcode::EndObject,
            Opcode::StartMember,
            Opcode::EndMember,
            Opcode::Value,
            Opcode::Closed,
        ] {
            assert_eq!(Opcode::from_tag(op.as_str()), Some(op));
        }
    }
}
