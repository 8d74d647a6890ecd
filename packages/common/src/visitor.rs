use pageforge_document::Node;

/// Visitor pattern for traversing document trees immutably
///
/// This trait provides a default implementation that walks the entire
/// tree in document order. Override `visit_node` to act on nodes; call
/// `walk_node` from the override to keep descending.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }
}

/// Mutable visitor pattern for transforming document trees
///
/// Similar to Visitor, but provides mutable access to nodes.
pub trait VisitorMut: Sized {
    fn visit_node_mut(&mut self, node: &mut Node) {
        walk_node_mut(self, node);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node) {
    for child in &node.children {
        visitor.visit_node(child);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut Node) {
    for child in &mut node.children {
        visitor.visit_node_mut(child);
    }
}
