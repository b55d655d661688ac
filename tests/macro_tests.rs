use node_stream_diff::{node, nodes, to_text, MemberName, Node, TypeName, XAML_NAMESPACE};

#[test]
fn test_node_macro_structure() {
    assert_eq!(node!(go), Node::GetObject);
    assert_eq!(node!(eo), Node::EndObject);
    assert_eq!(node!(em), Node::EndMember);
    assert_eq!(
        node!(ns("x", XAML_NAMESPACE)),
        Node::Namespace {
            prefix: "x".to_string(),
            uri: XAML_NAMESPACE.to_string()
        }
    );
    assert_eq!(
        node!(so("urn:ui", "Button")),
        Node::StartObject(TypeName::new("urn:ui", "Button"))
    );
}

#[test]
fn test_node_macro_members() {
    assert_eq!(
        node!(sm("urn:ui", "Width")),
        Node::StartMember(MemberName::declared("urn:ui", "Width"))
    );
    assert_eq!(
        node!(unknown("urn:other", "Extra")),
        Node::StartMember(MemberName::unknown("urn:other", "Extra"))
    );
    assert_eq!(
        node!(implicit("_Items")),
        Node::StartMember(MemberName::implicit("_Items"))
    );
}

#[test]
fn test_node_macro_values() {
    assert_eq!(node!(v(42)), Node::Value("42".to_string()));
    assert_eq!(node!(v(-123)), Node::Value("-123".to_string()));
    assert_eq!(node!(v(false)), Node::Value("False".to_string()));
    assert_eq!(node!(v(String::from("owned"))), Node::Value("owned".to_string()));
}

#[test]
fn test_nodes_macro_trailing_comma_and_encoding() {
    let events = nodes![
        ns("p", "urn:ui"),
        so("urn:ui", "Grid"),
        attach("urn:ui", "Grid", "Row"),
        v(1),
        em,
        implicit("_Items"),
        go,
        eo,
        em,
        eo,
    ];
    assert_eq!(events.len(), 10);

    let text = to_text(events).unwrap();
    let expected = [
        "NS p=urn:ui",
        "SO p:Grid",
        "  SM Grid.Row",
        "    V \"1\"",
        "  EM",
        "  SM x:_Items IMPLICIT",
        "    GO",
        "    EO",
        "  EM",
        "EO",
        "Closed.",
        "",
    ]
    .join("\n");
    assert_eq!(text, expected);
}
