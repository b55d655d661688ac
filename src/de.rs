//! Decoding canonical text back into node-stream events.
//!
//! The [`Decoder`] consumes scanned [`Instruction`]s and pushes events into
//! any [`NodeSink`]. Names are resolved through a [`SchemaResolver`]:
//!
//! 1. `UNKNOWN` members are kept verbatim.
//! 2. `IMPLICIT` members resolve against the directive table.
//! 3. Members in a directive namespace (`x:`, `xml:`) resolve as directives.
//! 4. `Owner.Name` resolves `Owner` first, then an attachable `Name` on it.
//! 5. Anything else resolves against the current object's type.
//!
//! A failed lookup never drops the member; it comes out as an unknown member
//! so comparison can still line it up with the other stream.
//!
//! ```rust
//! use node_stream_diff::{from_text, MemberName, Node, Schema};
//!
//! let mut schema = Schema::new();
//! let button = schema.add_type("urn:ui", "Button");
//! schema.add_member(button, "Width");
//!
//! let nodes = from_text("NS =urn:ui\nSO Button\nSM Width\nV \"10\"\nEM\nSM Tint\nV red\nEM\nEO\nClosed.", &schema).unwrap();
//! assert_eq!(nodes[2], Node::StartMember(MemberName::declared("urn:ui", "Width")));
//! assert_eq!(nodes[5], Node::StartMember(MemberName::unknown("urn:ui", "Tint")));
//! ```

use crate::frame::{Frame, FrameStack};
use crate::node::{
    MemberName, Node, NodeSink, Opcode, TypeName, XAML_NAMESPACE, XML_NAMESPACE,
};
use crate::scanner::{scan, Instruction, RowFlag};
use crate::schema::{Lookup, SchemaResolver};
use crate::{Error, Result};

/// Drives a [`NodeSink`] from scanned instructions.
pub struct Decoder<'s, S: SchemaResolver + ?Sized> {
    schema: &'s S,
    frames: FrameStack,
    closed: bool,
}

impl<'s, S: SchemaResolver + ?Sized> Decoder<'s, S> {
    pub fn new(schema: &'s S) -> Self {
        Decoder {
            schema,
            frames: FrameStack::new(),
            closed: false,
        }
    }

    /// Decodes every instruction into `sink`. Fails on the first malformed
    /// instruction, and if any scope is still open at the end.
    pub fn decode<K>(&mut self, instructions: &[Instruction], sink: &mut K) -> Result<()>
    where
        K: NodeSink + ?Sized,
    {
        let mut last_line = 0;
        for instruction in instructions {
            last_line = instruction.line;
            if self.closed {
                return Err(Error::syntax(instruction.line, 1, "row after terminal `Closed.`"));
            }
            self.step(instruction, sink)?;
        }

        if !self.frames.is_empty() {
            return Err(Error::unbalanced(
                last_line + 1,
                &format!("{} object scope(s) never closed", self.frames.depth()),
            ));
        }
        Ok(())
    }

    fn step<K>(&mut self, ins: &Instruction, sink: &mut K) -> Result<()>
    where
        K: NodeSink + ?Sized,
    {
        if let Some(info) = ins.line_info {
            sink.set_line_info(info);
        }

        let node = match ins.opcode {
            Opcode::Namespace => {
                self.check_object_position(ins, "namespace declaration")?;
                let prefix = ins.prefix().unwrap_or_default().to_string();
                let uri = ins.uri().unwrap_or_default().to_string();
                self.frames.declare(prefix.clone(), uri.clone());
                Node::Namespace { prefix, uri }
            }
            Opcode::StartObject => {
                self.check_object_position(ins, "object")?;
                let namespace = self.type_namespace(ins)?;
                let name = ins.name().unwrap_or_default().to_string();
                let ty = TypeName::new(namespace, name);
                let retrieved = ins.has_flag(RowFlag::Retrieved);

                let mut frame = Frame::new(Some(ty.clone()));
                frame.schema_type = self.schema.resolve_type(&ty.namespace, &ty.name).known();
                frame.retrieved = retrieved;
                if frame.schema_type.is_none() {
                    tracing::debug!(line = ins.line, type_name = %ty, "unresolved object type");
                }
                self.frames.push(frame);

                if retrieved {
                    Node::GetObject
                } else {
                    Node::StartObject(ty)
                }
            }
            Opcode::GetObject => {
                self.check_object_position(ins, "object")?;
                let mut frame = Frame::new(None);
                frame.retrieved = true;
                self.frames.push(frame);
                Node::GetObject
            }
            Opcode::EndObject => {
                match self.frames.current() {
                    None => return Err(Error::unbalanced(ins.line, "EO without an open object")),
                    Some(frame) if frame.member.is_some() => {
                        return Err(Error::unbalanced(ins.line, "EO while a member is still open"))
                    }
                    Some(_) => {}
                }
                self.frames.pop();
                Node::EndObject
            }
            Opcode::StartMember => {
                match self.frames.current() {
                    None => return Err(Error::unbalanced(ins.line, "SM outside an object")),
                    Some(frame) if frame.member.is_some() => {
                        return Err(Error::unbalanced(ins.line, "SM inside another member"))
                    }
                    Some(_) => {}
                }
                let member = self.resolve_member(ins)?;
                if let Some(frame) = self.frames.current_mut() {
                    frame.member = Some(member.clone());
                }
                Node::StartMember(member)
            }
            Opcode::EndMember => {
                if self.frames.current_member().is_none() {
                    return Err(Error::unbalanced(ins.line, "EM without an open member"));
                }
                if let Some(frame) = self.frames.current_mut() {
                    frame.member = None;
                }
                Node::EndMember
            }
            Opcode::Value => {
                if self.frames.current_member().is_none() {
                    return Err(Error::unbalanced(ins.line, "value outside a member"));
                }
                Node::Value(ins.value().unwrap_or_default().to_string())
            }
            Opcode::Closed => {
                if !self.frames.is_empty() {
                    return Err(Error::unbalanced(
                        ins.line,
                        "stream closed with open object scopes",
                    ));
                }
                self.closed = true;
                return Ok(());
            }
        };

        sink.write_node(node)
    }

    /// Objects and namespace declarations appear at the root or inside an
    /// open member.
    fn check_object_position(&self, ins: &Instruction, what: &str) -> Result<()> {
        match self.frames.current() {
            Some(frame) if frame.member.is_none() => Err(Error::unbalanced(
                ins.line,
                &format!("{} directly inside an object", what),
            )),
            _ => Ok(()),
        }
    }

    fn resolve_prefix(&self, prefix: &str, line: usize) -> Result<String> {
        match self.frames.resolve(prefix) {
            Some(uri) => Ok(uri.to_string()),
            // An unbound default prefix means "no namespace".
            None if prefix.is_empty() => Ok(String::new()),
            None => Err(Error::unbound_prefix(line, prefix)),
        }
    }

    fn type_namespace(&self, ins: &Instruction) -> Result<String> {
        self.resolve_prefix(ins.prefix().unwrap_or_default(), ins.line)
    }

    fn member_namespace(&self, ins: &Instruction) -> Result<String> {
        let prefix = ins.prefix().unwrap_or_default();
        if prefix.is_empty() {
            if let Some(ns) = self.frames.unprefixed_member_namespace() {
                return Ok(ns.to_string());
            }
        }
        self.resolve_prefix(prefix, ins.line)
    }

    fn resolve_member(&self, ins: &Instruction) -> Result<MemberName> {
        let namespace = self.member_namespace(ins)?;
        let written = ins.name().unwrap_or_default();
        let (owner, local) = match written.split_once('.') {
            Some((owner, local)) => (Some(owner), local),
            None => (None, written),
        };
        let implicit = ins.has_flag(RowFlag::Implicit);

        let unknown = || {
            tracing::debug!(line = ins.line, member = written, "retaining unknown member");
            let mut member = match owner {
                Some(owner) => MemberName::attachable(TypeName::new(namespace.clone(), owner), local),
                None => MemberName::declared(namespace.clone(), local),
            };
            member.unknown = true;
            member.implicit = implicit;
            member
        };

        if ins.has_flag(RowFlag::Unknown) {
            return Ok(unknown());
        }

        if implicit {
            return Ok(match self.schema.resolve_directive(XAML_NAMESPACE, written) {
                Lookup::Known(_) => MemberName::implicit(written),
                Lookup::Unknown(_) => unknown(),
            });
        }

        if owner.is_none() && (namespace == XAML_NAMESPACE || namespace == XML_NAMESPACE) {
            return Ok(match self.schema.resolve_directive(&namespace, local) {
                Lookup::Known(_) => MemberName::declared(namespace.clone(), local),
                Lookup::Unknown(_) => unknown(),
            });
        }

        if let Some(owner) = owner {
            let attachable = match self.schema.resolve_type(&namespace, owner) {
                Lookup::Known(ty) => self
                    .schema
                    .resolve_member(ty, local)
                    .known()
                    .and_then(|id| self.schema.member(id))
                    .map_or(false, |def| def.attachable),
                Lookup::Unknown(_) => false,
            };
            return Ok(if attachable {
                MemberName::attachable(TypeName::new(namespace.clone(), owner), local)
            } else {
                unknown()
            });
        }

        let declared = self
            .frames
            .current()
            .and_then(|frame| frame.schema_type)
            .map_or(false, |ty| self.schema.resolve_member(ty, local).is_known());
        Ok(if declared {
            MemberName::declared(namespace.clone(), local)
        } else {
            unknown()
        })
    }
}

/// Scans and decodes `text` into an event list.
pub fn from_text<S>(text: &str, schema: &S) -> Result<Vec<Node>>
where
    S: SchemaResolver + ?Sized,
{
    let mut nodes = Vec::new();
    decode_into(text, schema, &mut nodes)?;
    Ok(nodes)
}

/// Scans and decodes `text` into `sink`.
pub fn decode_into<S, K>(text: &str, schema: &S, sink: &mut K) -> Result<()>
where
    S: SchemaResolver + ?Sized,
    K: NodeSink + ?Sized,
{
    let instructions = scan(text)?;
    Decoder::new(schema).decode(&instructions, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    const UI: &str = "urn:ui";

    fn schema() -> Schema {
        let mut schema = Schema::new();
        let grid = schema.add_type(UI, "Grid");
        schema.add_attachable(grid, "Row");
        schema.add_member(grid, "Children");
        schema
    }

    #[test]
    fn test_retrieved_objects() {
        let text = "NS p=urn:ui\nSO p:Grid\nSM Children\nSO p:Grid RETRIEVED\nEO\nGO\nEO\nEM\nEO";
        let nodes = from_text(text, &schema()).unwrap();
        assert_eq!(nodes[3], Node::GetObject);
        assert_eq!(nodes[5], Node::GetObject);
    }

    #[test]
    fn test_attachable_and_directives() {
        let text = "NS p=urn:ui\nSO p:Grid\nSM p:Grid.Row\nV 1\nEM\nSM x:Key\nV k\nEM\nSM x:_Items IMPLICIT\nEM\nEO";
        let nodes = from_text(text, &schema()).unwrap();
        assert_eq!(
            nodes[2],
            Node::StartMember(MemberName::attachable(TypeName::new(UI, "Grid"), "Row"))
        );
        assert_eq!(nodes[5], Node::StartMember(MemberName::directive("Key")));
        assert_eq!(nodes[8], Node::StartMember(MemberName::implicit("_Items")));
    }

    #[test]
    fn test_unknown_members_are_retained() {
        let text = "NS p=urn:ui\nSO p:Grid\nSM Dock.Side\nEM\nSM x:Bogus\nEM\nEO";
        let nodes = from_text(text, &schema()).unwrap();
        match &nodes[2] {
            Node::StartMember(m) => {
                assert!(m.unknown && m.attachable);
                assert_eq!(m.qualified_name(), "Dock.Side");
            }
            other => panic!("unexpected node {other:?}"),
        }
        assert_eq!(
            nodes[4],
            Node::StartMember(MemberName::unknown(XAML_NAMESPACE, "Bogus"))
        );
    }

    #[test]
    fn test_unprefixed_member_reads_through_empty_binding() {
        let text = "NS =urn:a\nNS p=urn:b\nSO p:Foo\nSM Bar\nEM\nSM p:Baz\nEM\nEO";
        let nodes = from_text(text, &Schema::empty()).unwrap();
        assert_eq!(nodes[2], Node::start_object("urn:b", "Foo"));
        match (&nodes[3], &nodes[5]) {
            (Node::StartMember(bar), Node::StartMember(baz)) => {
                assert_eq!(bar.namespace, "urn:a");
                assert_eq!(baz.namespace, "urn:b");
            }
            other => panic!("unexpected nodes {other:?}"),
        }

        // Without an empty binding the object's own namespace applies.
        let nodes = from_text("NS p=urn:b\nSO p:Foo\nSM Bar\nEM\nEO", &Schema::empty()).unwrap();
        match &nodes[2] {
            Node::StartMember(bar) => assert_eq!(bar.namespace, "urn:b"),
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_unbound_prefix_is_fatal() {
        let err = from_text("SO q:Grid\nEO", &schema()).unwrap_err();
        assert!(matches!(err, Error::UnboundPrefix { line: 1, .. }));
    }

    #[test]
    fn test_structural_errors() {
        let schema = schema();
        for text in [
            "V 1",
            "SO Grid\nV 1\nEO",
            "SO Grid\nSM A\nEO",
            "EM",
            "SO Grid",
            "SO Grid\nSO Grid\nEO\nEO",
            "SO Grid\nClosed.",
        ] {
            let err = from_text(text, &schema).unwrap_err();
            assert!(matches!(err, Error::Unbalanced { .. }), "{text}: {err}");
        }
    }
}
