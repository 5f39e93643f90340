use ego_tree::{NodeId, NodeRef, Tree};
use scraper::Html;
use scraper::node::{Node, Text};

/// Creates a detached text node value
pub fn text_node(text: &str) -> Node {
    Node::Text(Text { text: text.into() })
}

/// Parse `markup` as a fragment and copy its top-level nodes into `tree`
///
/// The copies are orphans; attach them with [`insert_before`],
/// [`insert_after`] or [`append_children`].
pub fn graft_fragment(tree: &mut Tree<Node>, markup: &str) -> Vec<NodeId> {
    let fragment = Html::parse_fragment(markup);
    fragment
        .root_element()
        .children()
        .map(|child| copy_subtree(tree, child))
        .collect()
}

fn copy_subtree(tree: &mut Tree<Node>, source: NodeRef<'_, Node>) -> NodeId {
    let id = tree.orphan(source.value().clone()).id();
    for child in source.children() {
        let child_id = copy_subtree(tree, child);
        if let Some(mut node) = tree.get_mut(id) {
            node.append_id(child_id);
        }
    }
    id
}

/// Insert `nodes` in order as preceding siblings of `anchor`
pub fn insert_before(tree: &mut Tree<Node>, anchor: NodeId, nodes: &[NodeId]) {
    for &id in nodes {
        if let Some(mut node) = tree.get_mut(anchor) {
            node.insert_id_before(id);
        }
    }
}

/// Insert `nodes` in order as following siblings of `anchor`
pub fn insert_after(tree: &mut Tree<Node>, anchor: NodeId, nodes: &[NodeId]) {
    let mut previous = anchor;
    for &id in nodes {
        if let Some(mut node) = tree.get_mut(previous) {
            node.insert_id_after(id);
            previous = id;
        }
    }
}

/// Append `nodes` in order as the last children of `parent`
pub fn append_children(tree: &mut Tree<Node>, parent: NodeId, nodes: &[NodeId]) {
    for &id in nodes {
        if let Some(mut node) = tree.get_mut(parent) {
            node.append_id(id);
        }
    }
}

/// Detach every child of `parent`
pub fn remove_children(tree: &mut Tree<Node>, parent: NodeId) {
    let children: Vec<NodeId> = match tree.get(parent) {
        Some(node) => node.children().map(|c| c.id()).collect(),
        None => return,
    };
    for id in children {
        if let Some(mut node) = tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Replace `target` with `nodes`, keeping its position
pub fn replace_with(tree: &mut Tree<Node>, target: NodeId, nodes: &[NodeId]) {
    insert_before(tree, target, nodes);
    if let Some(mut node) = tree.get_mut(target) {
        node.detach();
    }
}

/// Replace the element `target` with a plain text node holding its text content
pub fn unwrap_to_text(tree: &mut Tree<Node>, target: NodeId) {
    let label = match tree.get(target) {
        Some(node) => subtree_text(node),
        None => return,
    };
    let text_id = tree.orphan(text_node(&label)).id();
    replace_with(tree, target, &[text_id]);
}

/// Concatenated text of every text node under `node`
pub fn subtree_text(node: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    for descendant in node.descendants() {
        if let Some(text) = descendant.value().as_text() {
            out.push_str(&text.text);
        }
    }
    out
}

/// Lowercase tag name of an element node
pub fn tag_of(node: NodeRef<'_, Node>) -> Option<&str> {
    node.value().as_element().map(|el| el.name())
}

/// Nearest ancestor element whose tag is one of `tags`
pub fn nearest_ancestor<'a>(node: NodeRef<'a, Node>, tags: &[&str]) -> Option<NodeRef<'a, Node>> {
    node.ancestors()
        .find(|ancestor| tag_of(*ancestor).is_some_and(|tag| tags.contains(&tag)))
}
