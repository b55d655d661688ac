//! Type and member resolution.
//!
//! The decoder never guesses what a name means; it asks a [`SchemaResolver`].
//! Each source format supplies its own resolver. [`Schema`] is an in-memory
//! implementation suitable for tests and for replaying captured text.
//!
//! Failed lookups are not errors. They come back as [`Lookup::Unknown`] and
//! the decoder keeps the name as an unknown member so it still takes part in
//! comparison.
//!
//! ```rust
//! use node_stream_diff::{Lookup, Schema, SchemaResolver};
//!
//! let mut schema = Schema::new();
//! let control = schema.add_type("urn:ui", "Control");
//! let button = schema.add_type("urn:ui", "Button");
//! schema.set_base(button, control);
//! schema.add_member(control, "Width");
//!
//! let Lookup::Known(ty) = schema.resolve_type("urn:ui", "Button") else { panic!() };
//! assert!(schema.resolve_member(ty, "Width").is_known());
//! assert!(!schema.resolve_member(ty, "Heigth").is_known());
//! ```

use crate::node::{XAML_NAMESPACE, XML_NAMESPACE};
use indexmap::IndexMap;

/// Opaque handle to a type known by a resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(pub usize);

/// Opaque handle to a member known by a resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemberId(pub usize);

/// Result of a schema lookup. `Unknown` carries the name that failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    Known(T),
    Unknown(String),
}

impl<T> Lookup<T> {
    #[inline]
    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, Lookup::Known(_))
    }

    #[must_use]
    pub fn known(self) -> Option<T> {
        match self {
            Lookup::Known(value) => Some(value),
            Lookup::Unknown(_) => None,
        }
    }
}

/// What a resolver knows about a member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberDef {
    pub name: String,
    /// Declaring type; `None` for directives.
    pub owner: Option<TypeId>,
    pub attachable: bool,
}

/// Name resolution for the decoder.
///
/// Names are passed with their prefix already resolved to a namespace.
pub trait SchemaResolver {
    fn resolve_type(&self, namespace: &str, name: &str) -> Lookup<TypeId>;

    /// Resolves a member declared on `owner` or one of its base types.
    fn resolve_member(&self, owner: TypeId, name: &str) -> Lookup<MemberId>;

    /// Resolves a directive (`x:Key`, `_Items`, `xml:lang`, ...).
    fn resolve_directive(&self, namespace: &str, name: &str) -> Lookup<MemberId>;

    fn member(&self, id: MemberId) -> Option<&MemberDef>;
}

/// Directives every schema starts with.
const XAML_DIRECTIVES: &[&str] = &[
    "Key",
    "Name",
    "Uid",
    "Class",
    "ClassModifier",
    "FieldModifier",
    "Shared",
    "Subclass",
    "TypeArguments",
    "Arguments",
    "FactoryMethod",
    "ConnectionId",
    "_Items",
    "_Initialization",
    "_PositionalParameters",
    "_UnknownContent",
    "_Reference",
];

const XML_DIRECTIVES: &[&str] = &["lang", "space", "base"];

#[derive(Clone, Debug)]
struct TypeDef {
    base: Option<TypeId>,
}

/// An in-memory schema with single inheritance and a directive table.
#[derive(Clone, Debug)]
pub struct Schema {
    types: Vec<TypeDef>,
    type_index: IndexMap<(String, String), TypeId>,
    members: Vec<MemberDef>,
    member_index: IndexMap<(TypeId, String), MemberId>,
    directives: IndexMap<(String, String), MemberId>,
}

impl Schema {
    /// Creates a schema holding only the standard directive table.
    #[must_use]
    pub fn new() -> Self {
        let mut schema = Self::empty();
        for name in XAML_DIRECTIVES {
            schema.add_directive(XAML_NAMESPACE, name);
        }
        for name in XML_DIRECTIVES {
            schema.add_directive(XML_NAMESPACE, name);
        }
        schema
    }

    /// Creates a schema with no types and no directives.
    #[must_use]
    pub fn empty() -> Self {
        Schema {
            types: Vec::new(),
            type_index: IndexMap::new(),
            members: Vec::new(),
            member_index: IndexMap::new(),
            directives: IndexMap::new(),
        }
    }

    /// Registers a type, returning the existing handle if already known.
    pub fn add_type(&mut self, namespace: &str, name: &str) -> TypeId {
        let key = (namespace.to_string(), name.to_string());
        if let Some(id) = self.type_index.get(&key) {
            return *id;
        }
        let id = TypeId(self.types.len());
        self.types.push(TypeDef { base: None });
        self.type_index.insert(key, id);
        id
    }

    pub fn set_base(&mut self, ty: TypeId, base: TypeId) {
        if let Some(def) = self.types.get_mut(ty.0) {
            def.base = Some(base);
        }
    }

    pub fn add_member(&mut self, owner: TypeId, name: &str) -> MemberId {
        self.insert_member(owner, name, false)
    }

    pub fn add_attachable(&mut self, owner: TypeId, name: &str) -> MemberId {
        self.insert_member(owner, name, true)
    }

    pub fn add_directive(&mut self, namespace: &str, name: &str) -> MemberId {
        let key = (namespace.to_string(), name.to_string());
        if let Some(id) = self.directives.get(&key) {
            return *id;
        }
        let id = MemberId(self.members.len());
        self.members.push(MemberDef {
            name: name.to_string(),
            owner: None,
            attachable: false,
        });
        self.directives.insert(key, id);
        id
    }

    fn insert_member(&mut self, owner: TypeId, name: &str, attachable: bool) -> MemberId {
        let key = (owner, name.to_string());
        if let Some(id) = self.member_index.get(&key) {
            return *id;
        }
        let id = MemberId(self.members.len());
        self.members.push(MemberDef {
            name: name.to_string(),
            owner: Some(owner),
            attachable,
        });
        self.member_index.insert(key, id);
        id
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaResolver for Schema {
    fn resolve_type(&self, namespace: &str, name: &str) -> Lookup<TypeId> {
        match self
            .type_index
            .get(&(namespace.to_string(), name.to_string()))
        {
            Some(id) => Lookup::Known(*id),
            None => Lookup::Unknown(name.to_string()),
        }
    }

    fn resolve_member(&self, owner: TypeId, name: &str) -> Lookup<MemberId> {
        // Walk the base chain iteratively; `seen` guards against cycles.
        let mut current = Some(owner);
        let mut seen = 0;
        while let Some(ty) = current {
            if let Some(id) = self.member_index.get(&(ty, name.to_string())) {
                return Lookup::Known(*id);
            }
            seen += 1;
            if seen > self.types.len() {
                break;
            }
            current = self.types.get(ty.0).and_then(|def| def.base);
        }
        Lookup::Unknown(name.to_string())
    }

    fn resolve_directive(&self, namespace: &str, name: &str) -> Lookup<MemberId> {
        match self
            .directives
            .get(&(namespace.to_string(), name.to_string()))
        {
            Some(id) => Lookup::Known(*id),
            None => Lookup::Unknown(name.to_string()),
        }
    }

    fn member(&self, id: MemberId) -> Option<&MemberDef> {
        self.members.get(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_table() {
        let schema = Schema::new();
        assert!(schema.resolve_directive(XAML_NAMESPACE, "_Items").is_known());
        assert!(schema.resolve_directive(XML_NAMESPACE, "lang").is_known());
        assert!(!schema.resolve_directive(XAML_NAMESPACE, "Bogus").is_known());
        assert!(!Schema::empty().resolve_directive(XAML_NAMESPACE, "Key").is_known());
    }

    #[test]
    fn test_attachable_members() {
        let mut schema = Schema::new();
        let grid = schema.add_type("urn:ui", "Grid");
        let row = schema.add_attachable(grid, "Row");
        assert_eq!(schema.resolve_member(grid, "Row"), Lookup::Known(row));
        assert!(schema.member(row).map_or(false, |m| m.attachable));
    }

    #[test]
    fn test_base_cycle_terminates() {
        let mut schema = Schema::new();
        let a = schema.add_type("urn:t", "A");
        let b = schema.add_type("urn:t", "B");
        schema.set_base(a, b);
        schema.set_base(b, a);
        assert_eq!(
            schema.resolve_member(a, "Missing"),
            Lookup::Unknown("Missing".to_string())
        );
    }

    #[test]
    fn test_add_type_is_idempotent() {
        let mut schema = Schema::new();
        assert_eq!(schema.add_type("urn:t", "A"), schema.add_type("urn:t", "A"));
    }
}
