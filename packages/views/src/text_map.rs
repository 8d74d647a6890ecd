//! Text map extraction: a flattened, deduplicated list of editable text
//! fields, each addressed by node path plus property path.
//!
//! The walk is a single DFS. Branch keys that only carry layout or visual
//! data are never descended; leaf strings that are structural noise
//! (ids, slugs, widths) are dropped unless the numeric allowlist rescues
//! them. Surviving entries are deduplicated by `field_key` and tagged by
//! kind so a caller knows whether it is editing plain text, markup, or a
//! URL.

use once_cell::sync::Lazy;
use pageforge_document::{path, ElementCatalog, Node};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::options::{ExtractOptions, TextMapScope, TextMapStyle};

static VECTOR_MARKUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<(?:svg|path|g|polygon|circle|rect)\b|viewBox="#).unwrap());
static HTML_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[a-zA-Z][a-zA-Z0-9-]*(\s[^>]*)?>").unwrap());
static HTML_CLOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</[a-zA-Z][a-zA-Z0-9-]*>").unwrap());
static URL_VALUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(https?:)?//\S+$").unwrap());
static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    Text,
    Html,
    Url,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMapEntry {
    /// Dedup key: `<node path>|<property path>`.
    pub field_key: String,
    pub path: String,
    pub property_path: String,
    pub kind: TextKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Extract the text map for a tree. Returns nothing when the style is
/// `None`.
pub fn extract_text_map(
    root: &Node,
    catalog: &ElementCatalog,
    options: &ExtractOptions,
) -> Vec<TextMapEntry> {
    if options.style == TextMapStyle::None {
        return Vec::new();
    }

    let mut walker = Walker {
        catalog,
        options,
        entries: Vec::new(),
        seen: HashSet::new(),
        crumbs: Vec::new(),
    };
    let mut prefix = Vec::new();
    walker.walk(root, &mut prefix);
    walker.entries
}

struct Walker<'a> {
    catalog: &'a ElementCatalog,
    options: &'a ExtractOptions,
    entries: Vec<TextMapEntry>,
    seen: HashSet<String>,
    crumbs: Vec<String>,
}

impl<'a> Walker<'a> {
    fn walk(&mut self, node: &Node, prefix: &mut Vec<usize>) {
        for (index, child) in node.children.iter().enumerate() {
            prefix.push(index);
            self.scan_node(child, prefix);

            let structural = self.catalog.is_structural(&child.element_type);
            if structural {
                self.crumbs
                    .push(self.catalog.label_for(&child.element_type).to_string());
            }
            self.walk(child, prefix);
            if structural {
                self.crumbs.pop();
            }
            prefix.pop();
        }
    }

    fn scan_node(&mut self, node: &Node, prefix: &[usize]) {
        let node_path = path::path_of(prefix);
        match self.options.scope {
            TextMapScope::Content => {
                if let Some(value) = node.properties.get("content") {
                    let mut segments = vec!["content".to_string()];
                    self.scan_value(node, &node_path, value, &mut segments);
                }
            }
            TextMapScope::All => {
                for (key, value) in &node.properties {
                    if self.skip_branch(key) {
                        continue;
                    }
                    let mut segments = vec![key.clone()];
                    self.scan_value(node, &node_path, value, &mut segments);
                }
            }
        }
    }

    fn skip_branch(&self, key: &str) -> bool {
        self.catalog.is_excluded_branch(key)
            || (!self.options.include_media && self.catalog.is_media_branch(key))
    }

    fn scan_value(
        &mut self,
        node: &Node,
        node_path: &str,
        value: &Value,
        segments: &mut Vec<String>,
    ) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if self.skip_branch(key) {
                        continue;
                    }
                    segments.push(key.clone());
                    self.scan_value(node, node_path, child, segments);
                    segments.pop();
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    segments.push(index.to_string());
                    self.scan_value(node, node_path, child, segments);
                    segments.pop();
                }
            }
            Value::String(text) => self.emit(node, node_path, text, segments),
            _ => {}
        }
    }

    fn emit(&mut self, node: &Node, node_path: &str, text: &str, segments: &[String]) {
        if text.trim().is_empty() || VECTOR_MARKUP_RE.is_match(text) {
            return;
        }

        let segment = segments.last().map(String::as_str).unwrap_or_default();
        let numeric = NUMERIC_RE.is_match(text);
        if self.catalog.is_excluded_leaf(segment)
            && !(numeric && self.catalog.is_numeric_allowed_leaf(segment))
        {
            return;
        }

        let property_path = segments.join(".");
        let field_key = format!("{node_path}|{property_path}");
        if !self.seen.insert(field_key.clone()) {
            return;
        }

        let kind = if HTML_OPEN_RE.is_match(text) && HTML_CLOSE_RE.is_match(text) {
            TextKind::Html
        } else if self.catalog.is_url_leaf(segment) || URL_VALUE_RE.is_match(text) {
            TextKind::Url
        } else {
            TextKind::Text
        };

        let style = self.options.style;
        let text = (style != TextMapStyle::Keys).then(|| self.truncate(text));
        let (element_type, label, context) = if style == TextMapStyle::Full {
            let context = if self.crumbs.is_empty() {
                self.catalog.root_label.clone()
            } else {
                self.crumbs.join(" > ")
            };
            (
                Some(node.element_type.clone()),
                Some(self.catalog.label_for(&node.element_type).to_string()),
                Some(context),
            )
        } else {
            (None, None, None)
        };

        self.entries.push(TextMapEntry {
            field_key,
            path: node_path.to_string(),
            property_path,
            kind,
            text,
            element_type,
            label,
            context,
        });
    }

    fn truncate(&self, text: &str) -> String {
        let max = self.options.max_chars;
        if max == 0 || text.chars().count() <= max {
            return text.to_string();
        }
        let mut short: String = text.chars().take(max).collect();
        short.push('…');
        short
    }
}
