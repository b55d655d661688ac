/// Builds a single [`Node`](crate::Node).
///
/// ```rust
/// use node_stream_diff::{node, Node};
///
/// assert_eq!(node!(eo), Node::EndObject);
/// assert_eq!(node!(v(10)), Node::Value("10".to_string()));
/// ```
#[macro_export]
macro_rules! node {
    (ns($prefix:expr, $uri:expr)) => {
        $crate::Node::namespace($prefix, $uri)
    };

    (so($ns:expr, $name:expr)) => {
        $crate::Node::start_object($ns, $name)
    };

    (go) => {
        $crate::Node::GetObject
    };

    (eo) => {
        $crate::Node::EndObject
    };

    (sm($ns:expr, $name:expr)) => {
        $crate::Node::start_member($crate::MemberName::declared($ns, $name))
    };

    // Attachable member `Owner.Name`
    (attach($ns:expr, $owner:expr, $name:expr)) => {
        $crate::Node::start_member($crate::MemberName::attachable(
            $crate::TypeName::new($ns, $owner),
            $name,
        ))
    };

    (directive($name:expr)) => {
        $crate::Node::start_member($crate::MemberName::directive($name))
    };

    (implicit($name:expr)) => {
        $crate::Node::start_member($crate::MemberName::implicit($name))
    };

    (unknown($ns:expr, $name:expr)) => {
        $crate::Node::start_member($crate::MemberName::unknown($ns, $name))
    };

    (em) => {
        $crate::Node::EndMember
    };

    (v($value:expr)) => {
        $crate::Node::value($value)
    };
}

/// Builds a `Vec<Node>` from a comma-separated list of [`node!`] items.
///
/// ```rust
/// use node_stream_diff::{nodes, to_text};
///
/// let events = nodes![
///     ns("", "urn:ui"),
///     so("urn:ui", "Button"),
///     sm("urn:ui", "Width"),
///     v(10),
///     em,
///     eo,
/// ];
/// assert_eq!(
///     to_text(events).unwrap(),
///     "NS =urn:ui\nSO Button\n  SM Width\n    V \"10\"\n  EM\nEO\nClosed.\n"
/// );
/// ```
#[macro_export]
macro_rules! nodes {
    ($($op:ident $( ( $($arg:expr),* ) )?),* $(,)?) => {
        vec![$($crate::node!($op $( ( $($arg),* ) )?)),*]
    };
}
