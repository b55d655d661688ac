//! Frame stack shared by the encoder and the decoder.
//!
//! Frames live in an index-based arena: each [`Frame`] records its enclosing
//! frame as `parent: Option<usize>`, and prefix lookups walk that chain
//! outward. Namespace declarations seen before an object starts are held as
//! *pending* and move into that object's frame when it is pushed; they are
//! already visible while the object's own type token is being resolved.

use crate::map::PrefixMap;
use crate::node::{MemberName, TypeName, XAML_NAMESPACE, XAML_PREFIX, XML_NAMESPACE, XML_PREFIX};
use crate::schema::TypeId;

/// One open object scope.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Type of the object; `None` for a retrieved object without a type token.
    pub object_type: Option<TypeName>,
    /// Schema handle for member resolution, when the type resolved.
    pub schema_type: Option<TypeId>,
    pub retrieved: bool,
    /// Member currently open on this object.
    pub member: Option<MemberName>,
    pub namespaces: PrefixMap,
    pub parent: Option<usize>,
}

impl Frame {
    pub fn new(object_type: Option<TypeName>) -> Self {
        Frame {
            object_type,
            ..Frame::default()
        }
    }

    /// Namespace of the object's type, if it has one.
    #[must_use]
    pub fn type_namespace(&self) -> Option<&str> {
        self.object_type.as_ref().map(|t| t.namespace.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameStack {
    frames: Vec<Frame>,
    current: Option<usize>,
    pending: PrefixMap,
}

impl FrameStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a prefix binding for the next object pushed.
    pub fn declare(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.pending.insert(prefix, uri);
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Pushes `frame` as the new innermost frame, attaching pending bindings.
    /// Returns the frame's arena index.
    pub fn push(&mut self, mut frame: Frame) -> usize {
        let mut namespaces = self.pending.take();
        for (prefix, uri) in frame.namespaces.take() {
            namespaces.insert(prefix, uri);
        }
        frame.namespaces = namespaces;
        frame.parent = self.current;
        self.frames.push(frame);
        let index = self.frames.len() - 1;
        self.current = Some(index);
        index
    }

    pub fn pop(&mut self) -> Option<Frame> {
        let index = self.current?;
        debug_assert_eq!(index + 1, self.frames.len());
        let frame = self.frames.pop()?;
        self.current = frame.parent;
        Some(frame)
    }

    #[must_use]
    pub fn current(&self) -> Option<&Frame> {
        self.current.map(|i| &self.frames[i])
    }

    pub fn current_mut(&mut self) -> Option<&mut Frame> {
        match self.current {
            Some(i) => self.frames.get_mut(i),
            None => None,
        }
    }

    #[must_use]
    pub fn current_type(&self) -> Option<&TypeName> {
        self.current().and_then(|f| f.object_type.as_ref())
    }

    #[must_use]
    pub fn current_member(&self) -> Option<&MemberName> {
        self.current().and_then(|f| f.member.as_ref())
    }

    /// Number of open object frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Binding scopes from innermost (pending) to outermost.
    fn scopes(&self) -> impl Iterator<Item = &PrefixMap> + '_ {
        let frames = std::iter::successors(self.current, move |&i| self.frames[i].parent)
            .map(move |i| &self.frames[i].namespaces);
        std::iter::once(&self.pending).chain(frames)
    }

    /// Resolves `prefix` to a namespace.
    ///
    /// At the root, `xml` and `x` fall back to the XML and core markup
    /// namespaces; every other unbound prefix yields `None`.
    #[must_use]
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        if let Some(uri) = self.scopes().find_map(|scope| scope.get(prefix)) {
            return Some(uri);
        }
        match prefix {
            XML_PREFIX => Some(XML_NAMESPACE),
            XAML_PREFIX => Some(XAML_NAMESPACE),
            _ => None,
        }
    }

    /// Namespace an unprefixed member name reads as: the empty prefix when
    /// it is bound, otherwise the namespace of the current object's type.
    #[must_use]
    pub fn unprefixed_member_namespace(&self) -> Option<&str> {
        self.scopes()
            .find_map(|scope| scope.get(""))
            .or_else(|| self.current().and_then(Frame::type_namespace))
    }

    /// Picks the prefix to write for a name in one of `candidates`.
    ///
    /// The innermost frame holding a visible binding wins, and within a frame
    /// the shortest prefix does. The XML namespace is always `xml`; the core
    /// markup namespace falls back to `x` when nothing binds it and `x` is not
    /// taken. `None` means the name is written unprefixed.
    #[must_use]
    pub fn best_prefix_for(&self, candidates: &[&str]) -> Option<String> {
        self.pick_prefix(candidates, true)
    }

    /// Like [`best_prefix_for`](Self::best_prefix_for), but never returns the
    /// empty prefix. Member names need this: an unprefixed member does not
    /// read through the empty binding when its object's type sits elsewhere.
    #[must_use]
    pub fn best_named_prefix_for(&self, candidates: &[&str]) -> Option<String> {
        self.pick_prefix(candidates, false)
    }

    fn pick_prefix(&self, candidates: &[&str], allow_empty: bool) -> Option<String> {
        if candidates.contains(&XML_NAMESPACE) {
            return Some(XML_PREFIX.to_string());
        }

        for scope in self.scopes() {
            let mut best: Option<&str> = None;
            for (prefix, uri) in scope.iter() {
                if !candidates.contains(&uri.as_str()) || (!allow_empty && prefix.is_empty()) {
                    continue;
                }
                // shadowed by an inner binding of the same prefix
                if self.resolve(prefix) != Some(uri.as_str()) {
                    continue;
                }
                if best.map_or(true, |b| prefix.len() < b.len()) {
                    best = Some(prefix.as_str());
                }
            }
            if let Some(prefix) = best {
                return Some(prefix.to_string());
            }
        }

        if candidates.contains(&XAML_NAMESPACE) && self.resolve(XAML_PREFIX) == Some(XAML_NAMESPACE)
        {
            return Some(XAML_PREFIX.to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_with(bindings: &[&[(&str, &str)]]) -> FrameStack {
        let mut stack = FrameStack::new();
        for frame in bindings {
            for (prefix, uri) in frame.iter() {
                stack.declare(*prefix, *uri);
            }
            stack.push(Frame::new(None));
        }
        stack
    }

    #[test]
    fn test_resolution_walks_outward() {
        let stack = stack_with(&[&[("p", "urn:outer")], &[("q", "urn:inner")]]);
        assert_eq!(stack.resolve("p"), Some("urn:outer"));
        assert_eq!(stack.resolve("q"), Some("urn:inner"));
        assert_eq!(stack.resolve("nope"), None);
    }

    #[test]
    fn test_inner_binding_shadows() {
        let stack = stack_with(&[&[("p", "urn:outer")], &[("p", "urn:inner")]]);
        assert_eq!(stack.resolve("p"), Some("urn:inner"));
        assert_eq!(stack.best_prefix_for(&["urn:outer"]), None);
    }

    #[test]
    fn test_root_fallbacks() {
        let stack = FrameStack::new();
        assert_eq!(stack.resolve("x"), Some(XAML_NAMESPACE));
        assert_eq!(stack.resolve("xml"), Some(XML_NAMESPACE));
        assert_eq!(stack.best_prefix_for(&[XAML_NAMESPACE]), Some("x".to_string()));
        assert_eq!(stack.best_prefix_for(&[XML_NAMESPACE]), Some("xml".to_string()));
    }

    #[test]
    fn test_shortest_and_most_local_prefix() {
        let stack = stack_with(&[
            &[("a", "urn:ui")],
            &[("long", "urn:ui"), ("ui", "urn:ui")],
        ]);
        assert_eq!(stack.best_prefix_for(&["urn:ui"]), Some("ui".to_string()));
    }

    #[test]
    fn test_pending_bindings_are_visible() {
        let mut stack = FrameStack::new();
        stack.declare("p", "urn:ui");
        assert_eq!(stack.resolve("p"), Some("urn:ui"));
        stack.push(Frame::new(None));
        assert!(!stack.has_pending());
        assert_eq!(stack.resolve("p"), Some("urn:ui"));
        stack.pop();
        assert_eq!(stack.resolve("p"), None);
    }

    #[test]
    fn test_parent_links() {
        let mut stack = FrameStack::new();
        let outer = stack.push(Frame::new(None));
        stack.push(Frame::new(None));
        assert_eq!(stack.current().and_then(|f| f.parent), Some(outer));
        assert_eq!(stack.depth(), 2);
        stack.pop();
        stack.pop();
        assert!(stack.pop().is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_unprefixed_member_namespace() {
        let mut stack = FrameStack::new();
        stack.push(Frame::new(Some(TypeName::new("urn:b", "Foo"))));
        assert_eq!(stack.unprefixed_member_namespace(), Some("urn:b"));

        let mut stack = stack_with(&[&[("", "urn:a"), ("p", "urn:b")]]);
        stack.push(Frame::new(Some(TypeName::new("urn:b", "Foo"))));
        assert_eq!(stack.unprefixed_member_namespace(), Some("urn:a"));
        assert_eq!(stack.best_prefix_for(&["urn:a"]), Some(String::new()));
        assert_eq!(stack.best_named_prefix_for(&["urn:a"]), None);
        assert_eq!(stack.best_named_prefix_for(&["urn:b"]), Some("p".to_string()));
    }
}
