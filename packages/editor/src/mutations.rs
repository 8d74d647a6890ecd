//! # Path-Based Mutations
//!
//! Surgical operations on a document tree, addressed by positional path.
//!
//! ## Mutation Semantics
//!
//! ### RemoveByPaths
//! - Single top-down walk over one tree snapshot
//! - A matched node is dropped with its entire subtree
//! - Sibling order is preserved; unmatched paths are ignored
//!
//! ### UpdateText
//! - Writes the element type's text property path (catalog-driven)
//! - Also writes the type's historical alias path so either reader sees
//!   the update
//! - May create intermediate property structure
//! - Missing node: no-op
//!
//! ### UpdateProperty
//! - Writes through an explicit property path
//! - Overwrites existing keys only; an absent intermediate or final
//!   segment no-ops the whole call. This asymmetry with UpdateText is
//!   intentional and covered by tests
//! - Alias prefixes (e.g. a FAQ's two item keys) are mirrored when the
//!   mirrored path exists

use pageforge_document::{ElementCatalog, Node};
use serde_json::Value;
use std::collections::HashSet;

/// Remove every node whose path is in `paths`, descendants included.
///
/// All paths must come from the same tree snapshot; the walk matches them
/// against original child indices, so earlier drops in the same batch do
/// not shift later ones.
pub fn remove_by_paths(root: &Node, paths: &HashSet<Vec<usize>>) -> Node {
    let mut prefix = Vec::new();
    retain(root, &mut prefix, paths)
}

fn retain(node: &Node, prefix: &mut Vec<usize>, paths: &HashSet<Vec<usize>>) -> Node {
    let mut kept = Node {
        id: node.id,
        element_type: node.element_type.clone(),
        properties: node.properties.clone(),
        children: Vec::with_capacity(node.children.len()),
    };
    for (index, child) in node.children.iter().enumerate() {
        prefix.push(index);
        if !paths.contains(prefix) {
            kept.children.push(retain(child, prefix, paths));
        }
        prefix.pop();
    }
    kept
}

/// Overwrite the text of the node at `path`. Returns whether a write
/// happened; a missing node is a silent no-op.
pub fn update_text(
    root: &mut Node,
    path: &[usize],
    new_text: &str,
    catalog: &ElementCatalog,
) -> bool {
    let Some(node) = root.get_at_mut(path) else {
        return false;
    };
    write_node_text(node, new_text, catalog)
}

/// Write a node's text through its catalog text path, plus the type's
/// alias path when one exists. Shared by text updates and slot filling.
pub(crate) fn write_node_text(node: &mut Node, new_text: &str, catalog: &ElementCatalog) -> bool {
    let primary = catalog.text_path_for(&node.element_type).to_string();
    let wrote = node.set_property_creating(&primary, Value::String(new_text.to_string()));
    if let Some(alias) = catalog.text_alias_for(&node.element_type) {
        let alias = alias.to_string();
        node.set_property_creating(&alias, Value::String(new_text.to_string()));
    }
    wrote
}

/// Overwrite an existing property of the node at `path`. Returns whether
/// a write happened; missing nodes and absent property segments are
/// silent no-ops.
pub fn update_property(
    root: &mut Node,
    path: &[usize],
    property_path: &str,
    value: Value,
    catalog: &ElementCatalog,
) -> bool {
    let Some(node) = root.get_at_mut(path) else {
        return false;
    };
    let wrote = node.set_property_existing(property_path, value.clone());
    if wrote {
        if let Some(mirror) = catalog.mirror_property(&node.element_type, property_path) {
            node.set_property_existing(&mirror, value);
        }
    }
    wrote
}
