//! # Template Slot-Filling Injector
//!
//! Distributes queued content sections into an existing page template.
//!
//! Three ordered passes consume the queue against the page's top-level
//! template sections, each tracked with a `used` flag:
//!
//! 1. **Leaf slots** — deepest column-type containers with no column
//!    descendants, one payload per slot, in document order
//! 2. **Groups** — sets of two or more sibling layout containers, one
//!    payload per member, set by set
//! 3. **Section fallback** — one payload per still-unused section,
//!    written into the section itself
//!
//! Filling a target overwrites its first descendant heading and text
//! nodes, synthesizing minimal ones when absent, and marks the owning
//! section used. Sections never marked used are deleted afterwards;
//! payloads that found no home are returned for the caller to append.

use pageforge_common::{walk_node, Visitor};
use pageforge_document::{ElementCatalog, IdGenerator, Node};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// One injectable content unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPayload {
    pub title: String,
    pub body: String,
    #[serde(default = "default_title_tag")]
    pub title_tag: String,
}

fn default_title_tag() -> String {
    "h2".to_string()
}

pub struct Injector<'a> {
    catalog: &'a ElementCatalog,
    ids: &'a mut IdGenerator,
}

impl<'a> Injector<'a> {
    pub fn new(catalog: &'a ElementCatalog, ids: &'a mut IdGenerator) -> Self {
        Self { catalog, ids }
    }

    /// Fill existing template sections with `sections`, returning the
    /// payloads that found no slot, group, or section to land in.
    pub fn inject_sections(
        &mut self,
        root: &mut Node,
        sections: &[SectionPayload],
    ) -> Vec<SectionPayload> {
        let mut queue: VecDeque<SectionPayload> = sections.iter().cloned().collect();

        let template: Vec<usize> = root
            .children
            .iter()
            .enumerate()
            .filter(|(_, child)| self.catalog.is_section(&child.element_type))
            .map(|(index, _)| index)
            .collect();
        if template.is_empty() {
            return queue.into_iter().collect();
        }
        let mut used = vec![false; template.len()];
        // Containers that already consumed a payload this call; a later
        // pass never refills one.
        let mut filled: HashSet<Vec<usize>> = HashSet::new();

        // Pass 1: leaf column slots, in document order.
        for (ordinal, &section_index) in template.iter().enumerate() {
            if queue.is_empty() {
                break;
            }
            let slots = leaf_slot_paths(&root.children[section_index], self.catalog);
            for slot_path in slots {
                if queue.is_empty() {
                    break;
                }
                // Slot paths were computed against the current tree, so
                // the lookup cannot miss.
                let Some(container) = root.children[section_index].get_at_mut(&slot_path) else {
                    continue;
                };
                let Some(payload) = queue.pop_front() else {
                    break;
                };
                self.fill(container, &payload);
                used[ordinal] = true;
                filled.insert(absolute_path(section_index, &slot_path));
            }
        }

        // Pass 2: sibling layout groups.
        if !queue.is_empty() {
            for (ordinal, &section_index) in template.iter().enumerate() {
                if queue.is_empty() {
                    break;
                }
                let groups = group_member_paths(&root.children[section_index], self.catalog);
                for member_path in groups {
                    if queue.is_empty() {
                        break;
                    }
                    let absolute = absolute_path(section_index, &member_path);
                    if filled.contains(&absolute) {
                        continue;
                    }
                    let Some(container) = root.children[section_index].get_at_mut(&member_path) else {
                        continue;
                    };
                    let Some(payload) = queue.pop_front() else {
                        break;
                    };
                    self.fill(container, &payload);
                    used[ordinal] = true;
                    filled.insert(absolute);
                }
            }
        }

        // Pass 3: write directly into sections nothing has touched yet.
        if !queue.is_empty() {
            for (ordinal, &section_index) in template.iter().enumerate() {
                if used[ordinal] {
                    continue;
                }
                let Some(payload) = queue.pop_front() else {
                    break;
                };
                self.fill(&mut root.children[section_index], &payload);
                used[ordinal] = true;
            }
        }

        // Template sections never filled by any pass are dropped.
        let unused: Vec<usize> = template
            .iter()
            .zip(&used)
            .filter(|(_, &was_used)| !was_used)
            .map(|(&index, _)| index)
            .collect();
        if !unused.is_empty() {
            debug!(count = unused.len(), "pruning unused template sections");
            root.children = std::mem::take(&mut root.children)
                .into_iter()
                .enumerate()
                .filter(|(index, _)| !unused.contains(index))
                .map(|(_, child)| child)
                .collect();
        }

        queue.into_iter().collect()
    }

    /// Append each payload as a brand-new bottom-of-document section.
    pub fn append_sections(&mut self, root: &mut Node, sections: &[SectionPayload]) {
        for payload in sections {
            let scaffold = self.section_scaffold(payload);
            root.children.push(scaffold);
        }
    }

    /// Append raw markup wrapped in a minimal section scaffold.
    pub fn append_html(&mut self, root: &mut Node, html: &str) {
        let body = self.synthesize_text(html);
        let column = Node::with_children(
            self.ids.next_id(),
            self.catalog.synthesized_column_type.clone(),
            vec![body],
        );
        let section = Node::with_children(
            self.ids.next_id(),
            self.catalog.synthesized_section_type.clone(),
            vec![column],
        );
        root.children.push(section);
    }

    fn section_scaffold(&mut self, payload: &SectionPayload) -> Node {
        let heading = self.synthesize_heading(payload);
        let body = self.synthesize_text(&payload.body);
        let column = Node::with_children(
            self.ids.next_id(),
            self.catalog.synthesized_column_type.clone(),
            vec![heading, body],
        );
        Node::with_children(
            self.ids.next_id(),
            self.catalog.synthesized_section_type.clone(),
            vec![column],
        )
    }

    /// Overwrite the first descendant heading and text nodes, creating
    /// minimal ones when the container has none.
    fn fill(&mut self, container: &mut Node, payload: &SectionPayload) {
        let catalog = self.catalog;

        match find_first_path(container, &|node| catalog.is_heading(&node.element_type)) {
            Some(heading_path) => {
                if let Some(heading) = container.get_at_mut(&heading_path) {
                    crate::mutations::write_node_text(heading, &payload.title, catalog);
                }
            }
            None => {
                let heading = self.synthesize_heading(payload);
                container.children.insert(0, heading);
            }
        }

        match find_first_path(container, &|node| catalog.is_body_text(&node.element_type)) {
            Some(body_path) => {
                if let Some(body) = container.get_at_mut(&body_path) {
                    crate::mutations::write_node_text(body, &payload.body, catalog);
                }
            }
            None => {
                let body = self.synthesize_text(&payload.body);
                container.children.push(body);
            }
        }
    }

    fn synthesize_heading(&mut self, payload: &SectionPayload) -> Node {
        let mut heading = Node::new(
            self.ids.next_id(),
            self.catalog.synthesized_heading_type.clone(),
        );
        crate::mutations::write_node_text(&mut heading, &payload.title, self.catalog);
        let tag_path = self.catalog.heading_tag_path.clone();
        heading.set_property_creating(&tag_path, Value::String(payload.title_tag.clone()));
        heading
    }

    fn synthesize_text(&mut self, body: &str) -> Node {
        let mut node = Node::new(
            self.ids.next_id(),
            self.catalog.synthesized_text_type.clone(),
        );
        crate::mutations::write_node_text(&mut node, body, self.catalog);
        node
    }
}

fn absolute_path(section_index: usize, relative: &[usize]) -> Vec<usize> {
    let mut path = Vec::with_capacity(relative.len() + 1);
    path.push(section_index);
    path.extend_from_slice(relative);
    path
}

/// Paths (relative to `section`) of every deepest column-type container:
/// a column or grid with no column-type descendant.
fn leaf_slot_paths(section: &Node, catalog: &ElementCatalog) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut prefix = Vec::new();
    collect_leaf_slots(section, catalog, &mut prefix, &mut out);
    out
}

fn collect_leaf_slots(
    node: &Node,
    catalog: &ElementCatalog,
    prefix: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    for (index, child) in node.children.iter().enumerate() {
        prefix.push(index);
        if catalog.is_column(&child.element_type) && !has_column_descendant(child, catalog) {
            out.push(prefix.clone());
        } else {
            collect_leaf_slots(child, catalog, prefix, out);
        }
        prefix.pop();
    }
}

/// Member paths of every sibling set of two or more layout containers,
/// set by set in document order.
fn group_member_paths(section: &Node, catalog: &ElementCatalog) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut prefix = Vec::new();
    collect_groups(section, catalog, &mut prefix, &mut out);
    out
}

fn collect_groups(
    node: &Node,
    catalog: &ElementCatalog,
    prefix: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    let members: Vec<usize> = node
        .children
        .iter()
        .enumerate()
        .filter(|(_, child)| is_group_member(child, catalog))
        .map(|(index, _)| index)
        .collect();
    if members.len() >= 2 {
        for index in members {
            let mut path = prefix.clone();
            path.push(index);
            out.push(path);
        }
    }

    for (index, child) in node.children.iter().enumerate() {
        prefix.push(index);
        collect_groups(child, catalog, prefix, out);
        prefix.pop();
    }
}

fn is_group_member(node: &Node, catalog: &ElementCatalog) -> bool {
    catalog.is_column(&node.element_type)
        || (catalog.is_layout(&node.element_type) && !node.children.is_empty())
}

struct ColumnProbe<'a> {
    catalog: &'a ElementCatalog,
    found: bool,
}

impl Visitor for ColumnProbe<'_> {
    fn visit_node(&mut self, node: &Node) {
        if self.found {
            return;
        }
        if self.catalog.is_column(&node.element_type) {
            self.found = true;
            return;
        }
        walk_node(self, node);
    }
}

fn has_column_descendant(node: &Node, catalog: &ElementCatalog) -> bool {
    let mut probe = ColumnProbe {
        catalog,
        found: false,
    };
    walk_node(&mut probe, node);
    probe.found
}

/// Path (relative to `node`) of the first descendant matching the
/// predicate, in document order.
fn find_first_path(node: &Node, predicate: &dyn Fn(&Node) -> bool) -> Option<Vec<usize>> {
    for (index, child) in node.children.iter().enumerate() {
        if predicate(child) {
            return Some(vec![index]);
        }
        if let Some(mut rest) = find_first_path(child, predicate) {
            rest.insert(0, index);
            return Some(rest);
        }
    }
    None
}
