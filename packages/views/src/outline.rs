//! Outline extraction: a read-only walk producing one addressed,
//! human-labelled entry per text-bearing node, with the breadcrumb of
//! structural ancestors as context.

use pageforge_document::{path, ElementCatalog, Node};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineEntry {
    pub path: String,
    pub element_type: String,
    pub label: String,
    pub context: String,
    pub text: String,
}

/// Collect outline entries for every text-bearing node under `root`.
pub fn extract_outline(root: &Node, catalog: &ElementCatalog) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    let mut prefix = Vec::new();
    let mut crumbs = Vec::new();
    walk(root, catalog, &mut prefix, &mut crumbs, &mut entries);
    entries
}

fn walk(
    node: &Node,
    catalog: &ElementCatalog,
    prefix: &mut Vec<usize>,
    crumbs: &mut Vec<String>,
    entries: &mut Vec<OutlineEntry>,
) {
    for (index, child) in node.children.iter().enumerate() {
        prefix.push(index);

        if catalog.is_text_bearing(&child.element_type) {
            if let Some(Value::String(text)) = child.property(catalog.text_path_for(&child.element_type)) {
                if !text.trim().is_empty() {
                    let context = if crumbs.is_empty() {
                        catalog.root_label.clone()
                    } else {
                        crumbs.join(" > ")
                    };
                    entries.push(OutlineEntry {
                        path: path::path_of(prefix),
                        element_type: child.element_type.clone(),
                        label: catalog.label_for(&child.element_type).to_string(),
                        context,
                        text: text.clone(),
                    });
                }
            }
        }

        let structural = catalog.is_structural(&child.element_type);
        if structural {
            crumbs.push(catalog.label_for(&child.element_type).to_string());
        }
        walk(child, catalog, prefix, crumbs, entries);
        if structural {
            crumbs.pop();
        }

        prefix.pop();
    }
}

/// Flat, labelled rendering of the outline entries.
pub fn render_summary(entries: &[OutlineEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "{} [{}] {} — {}\n",
            entry.path, entry.label, entry.text, entry.context
        ));
    }
    out
}

/// Indented rendering of the whole tree, one line per node.
pub struct TreeRenderer<'a> {
    catalog: &'a ElementCatalog,
    indent_string: String,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(catalog: &'a ElementCatalog) -> Self {
        Self {
            catalog,
            indent_string: "  ".to_string(),
        }
    }

    pub fn render(&self, root: &Node) -> String {
        let mut out = String::new();
        self.render_children(root, 0, &mut out);
        out
    }

    fn render_children(&self, node: &Node, depth: usize, out: &mut String) {
        for child in &node.children {
            out.push_str(&self.indent_string.repeat(depth));
            out.push_str("- ");
            out.push_str(self.catalog.label_for(&child.element_type));

            if let Some(Value::String(text)) =
                child.property(self.catalog.text_path_for(&child.element_type))
            {
                if !text.trim().is_empty() {
                    let short: String = text.chars().take(60).collect();
                    out.push_str(&format!(": \"{short}\""));
                }
            }
            out.push('\n');

            self.render_children(child, depth + 1, out);
        }
    }
}

pub fn render_tree(root: &Node, catalog: &ElementCatalog) -> String {
    TreeRenderer::new(catalog).render(root)
}
