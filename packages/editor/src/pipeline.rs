//! # Editing Pipeline
//!
//! Coordinates the full document lifecycle: Decode → Mutate → Encode
//!
//! The Pipeline composes the codec with the path-based mutator and the
//! slot-filling injector. One `apply` call is the unit of work: decode
//! (or bootstrap) a document, run the requested edits against it, and
//! re-encode into the exact storage shape the input used. Every address
//! in a request is resolved against the caller's snapshot: text and
//! property updates run before structural removals, and injection only
//! appends or rewrites in place.

use pageforge_document::{codec, path, ElementCatalog, IdGenerator};
use pageforge_views::{
    extract_outline, extract_text_map, render_summary, render_tree, OutlineEntry, OutlineStyle,
    ReadOptions, TextMapEntry, TextMapStyle,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::inject::{Injector, SectionPayload};
use crate::{mutations, EditorError};

/// Write-side payload, as sent by an automation client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditRequest {
    pub remove_paths: Vec<String>,
    pub text_updates: Vec<TextUpdate>,
    pub append_html: Option<String>,
    pub append_sections: Vec<SectionPayload>,
}

impl EditRequest {
    pub fn is_empty(&self) -> bool {
        self.remove_paths.is_empty()
            && self.text_updates.is_empty()
            && self.append_html.is_none()
            && self.append_sections.is_empty()
    }
}

/// One text or property update. Addressed by `path`, by `path` + `prop`,
/// or by a `fieldKey` from the text map (`<path>|<property path>`).
/// Entries carrying a property component update properties; entries
/// without one update the node's text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextUpdate {
    pub path: Option<String>,
    pub field_key: Option<String>,
    pub prop: Option<String>,
    pub text: String,
}

impl TextUpdate {
    /// Resolve to `(node path, optional property path)`.
    fn resolve(&self) -> Result<(String, Option<String>), EditorError> {
        if let Some(field_key) = &self.field_key {
            let (node_path, prop) = field_key.split_once('|').ok_or_else(|| {
                EditorError::InvalidPayload(format!("fieldKey missing separator: {field_key}"))
            })?;
            return Ok((node_path.to_string(), Some(prop.to_string())));
        }
        let node_path = self.path.clone().ok_or_else(|| {
            EditorError::InvalidPayload("text update requires a path or fieldKey".to_string())
        })?;
        Ok((node_path, self.prop.clone()))
    }
}

/// What one `apply` call did, for the caller's log line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSummary {
    pub texts_updated: usize,
    pub properties_updated: usize,
    pub stale_skipped: usize,
    pub nodes_removed: usize,
    pub sections_filled: usize,
    pub sections_pruned: usize,
    pub sections_appended: usize,
    pub nodes_before: usize,
    pub nodes_after: usize,
}

/// Result of one `apply` call.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    /// The re-encoded document, in the same storage shape as the input.
    pub document: Value,
    pub summary: EditSummary,
}

/// Read-side view of a document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub outline: Vec<OutlineEntry>,
    pub rendered_outline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_map: Option<Vec<TextMapEntry>>,
}

/// Composes codec → mutator/injector → codec.
pub struct Pipeline {
    catalog: ElementCatalog,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            catalog: ElementCatalog::default(),
        }
    }

    pub fn with_catalog(catalog: ElementCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ElementCatalog {
        &self.catalog
    }

    /// Decode a stored document and build its read views. `None` means
    /// there is no usable document behind `raw`.
    pub fn inspect(&self, raw: &Value, options: &ReadOptions) -> Option<DocumentView> {
        let wrapper = codec::decode(raw)?;

        let outline = extract_outline(&wrapper.root, &self.catalog);
        let rendered_outline = match options.outline_style {
            OutlineStyle::Summary => render_summary(&outline),
            OutlineStyle::Tree => render_tree(&wrapper.root, &self.catalog),
        };
        let layout = matches!(options.layout_mode, pageforge_views::LayoutMode::Full)
            .then(|| wrapper.root.to_value());
        let text_map = (options.text_map && options.text_map_style != TextMapStyle::None)
            .then(|| extract_text_map(&wrapper.root, &self.catalog, &options.extract_options()));

        Some(DocumentView {
            outline,
            rendered_outline,
            layout,
            text_map,
        })
    }

    /// Apply an edit request. A missing or undecodable `raw` bootstraps
    /// the canonical empty document; stale addresses are skipped, never
    /// fatal. Only a structurally malformed payload errors.
    pub fn apply(
        &self,
        raw: Option<&Value>,
        request: &EditRequest,
    ) -> Result<EditOutcome, EditorError> {
        let wrapper = raw
            .and_then(codec::decode)
            .unwrap_or_else(codec::build_empty);
        let mut root = wrapper.root.clone();

        let mut summary = EditSummary {
            nodes_before: root.subtree_len(),
            ..Default::default()
        };
        let mut ids = IdGenerator::from_seed(pageforge_document::document_seed(
            &serde_json::to_string(&wrapper.raw_original)?,
        ));

        // Text and property updates first: they never change the tree's
        // shape, so every address still matches the caller's snapshot.
        for update in &request.text_updates {
            let (path_str, prop) = update.resolve()?;
            let Some(indices) = path::parse(&path_str) else {
                warn!(path = %path_str, "skipping update with unparseable path");
                summary.stale_skipped += 1;
                continue;
            };
            let applied = match &prop {
                Some(prop) => mutations::update_property(
                    &mut root,
                    &indices,
                    prop,
                    Value::String(update.text.clone()),
                    &self.catalog,
                ),
                None => mutations::update_text(&mut root, &indices, &update.text, &self.catalog),
            };
            match (applied, prop.is_some()) {
                (true, true) => summary.properties_updated += 1,
                (true, false) => summary.texts_updated += 1,
                (false, _) => {
                    warn!(path = %path_str, "skipping update with stale address");
                    summary.stale_skipped += 1;
                }
            }
        }

        // Removals: one single-snapshot pass over the whole batch.
        if !request.remove_paths.is_empty() {
            let mut targets: HashSet<Vec<usize>> = HashSet::new();
            for path_str in &request.remove_paths {
                match path::parse(path_str) {
                    Some(indices) if !indices.is_empty() => {
                        targets.insert(indices);
                    }
                    _ => {
                        warn!(path = %path_str, "skipping removal with unparseable path");
                        summary.stale_skipped += 1;
                    }
                }
            }
            let before = root.subtree_len();
            root = mutations::remove_by_paths(&root, &targets);
            summary.nodes_removed = before - root.subtree_len();
        }

        let mut injector = Injector::new(&self.catalog, &mut ids);

        if !request.append_sections.is_empty() {
            let has_template = root
                .children
                .iter()
                .any(|child| self.catalog.is_section(&child.element_type));
            if has_template {
                let top_level_before = root.children.len();
                let remaining = injector.inject_sections(&mut root, &request.append_sections);
                summary.sections_filled = request.append_sections.len() - remaining.len();
                summary.sections_pruned = top_level_before.saturating_sub(root.children.len());
                summary.sections_appended += remaining.len();
                injector.append_sections(&mut root, &remaining);
            } else {
                injector.append_sections(&mut root, &request.append_sections);
                summary.sections_appended += request.append_sections.len();
            }
        }

        if let Some(html) = request.append_html.as_deref() {
            if !html.trim().is_empty() {
                injector.append_html(&mut root, html);
                summary.sections_appended += 1;
            }
        }

        summary.nodes_after = root.subtree_len();
        debug!(?summary, "edit request applied");

        Ok(EditOutcome {
            document: codec::encode(&wrapper, &root),
            summary,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
