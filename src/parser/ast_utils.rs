use tree_sitter::Node;

use crate::parser::symbols::Span;

/// Safe wrapper around node.utf8_text that handles encoding errors gracefully
pub fn safe_node_text<'a>(node: Node, source: &'a [u8]) -> Option<&'a str> {
    node.utf8_text(source).ok()
}

/// Extract text content from a named field, falling back to empty string
pub fn extract_field_text(node: Node, field_name: &str, source: &[u8]) -> String {
    node.child_by_field_name(field_name)
        .and_then(|n| safe_node_text(n, source))
        .unwrap_or("")
        .to_string()
}

/// Find the first child node of any of the specified types
pub fn find_child_of_type<'a>(node: Node<'a>, types: &[&str]) -> Option<Node<'a>> {
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        if types.contains(&child.kind()) {
            return Some(child);
        }
    }

    None
}

/// Find all child nodes of the specified type
pub fn find_children_of_type<'a>(node: Node<'a>, node_type: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    let mut children = Vec::new();

    for child in node.children(&mut cursor) {
        if child.kind() == node_type {
            children.push(child);
        }
    }

    children
}

/// Named children without the comments tree-sitter interleaves as extras
pub fn named_children_no_comments<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// All children attached to a field, e.g. every `name` of `a, b int`
pub fn children_by_field<'a>(node: Node<'a>, field_name: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field_name, &mut cursor).collect()
}

/// Check if a node has an anonymous token child such as `*`
pub fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| !child.is_named() && child.kind() == token);
    found
}

/// Strip the quotes of an interpreted or raw string literal
pub fn unquote(literal: &str) -> &str {
    literal.trim_matches(|c| c == '"' || c == '`')
}

/// 1-based start position of a node
pub fn node_span(node: Node) -> Span {
    let point = node.start_position();
    Span {
        line: point.row + 1,
        column: point.column + 1,
    }
}
