use super::*;
use crate::node::NodeType;

fn nodes() -> Vec<Node> {
    vec![
        Node::pinned("github.com/a/a", NodeType::Commit, "abc123"),
        Node::pinned("gitlab.com/b/b", NodeType::Tag, "v1.0"),
    ]
}

#[test]
fn test_build_table_rows() {
    let table = build_table(&nodes());
    assert_eq!(table.row_iter().count(), 2);

    let rendered = table.to_string();
    assert!(rendered.contains("Import Path"));
    assert!(rendered.contains("github.com/a/a"));
    assert!(rendered.contains("v1.0"));
}

#[test]
fn test_render_json_uses_registry_keys() {
    let json = render_json(&nodes()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed[0]["ImportPath"], "github.com/a/a");
    assert_eq!(parsed[1]["Type"], "tag");
}

#[test]
fn test_render_json_empty() {
    assert_eq!(render_json(&[]).unwrap(), "[]");
}
