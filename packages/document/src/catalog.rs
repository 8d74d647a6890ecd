//! Element classification data.
//!
//! Every heuristic the engine applies to a builder's element vocabulary
//! lives here as plain data: which element types carry editable text and
//! where, which types are structural containers, which property keys are
//! layout noise, and which leaf names are worth exposing. Hosts tune these
//! lists per builder version by deserializing an override instead of
//! patching code.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Versioned classification catalog for one builder's element vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementCatalog {
    pub version: u32,

    /// Property path every text-bearing type writes through unless
    /// overridden in `text_paths`.
    pub default_text_path: String,

    /// Text-bearing element types and their primary text property path.
    pub text_paths: HashMap<String, String>,

    /// Secondary text path written alongside the primary on text updates,
    /// for types that historically stored the same content twice.
    pub text_alias_paths: HashMap<String, String>,

    /// Property-path prefix pairs mirrored on property updates, per
    /// element type. Both orders are honored.
    pub property_alias_prefixes: HashMap<String, Vec<(String, String)>>,

    /// Human labels for elements shown in outline breadcrumbs.
    pub element_labels: HashMap<String, String>,

    /// Label used when no structural ancestor contributed one.
    pub root_label: String,

    /// Top-level template section types.
    pub section_types: Vec<String>,

    /// Column/grid types eligible as leaf injection slots.
    pub column_types: Vec<String>,

    /// Container types that count as layout-bearing in group detection.
    pub layout_types: Vec<String>,

    /// Heading types targeted when filling a slot.
    pub heading_types: Vec<String>,

    /// Body-text types targeted when filling a slot.
    pub text_types: Vec<String>,

    /// Element types synthesized for injected content.
    pub synthesized_section_type: String,
    pub synthesized_column_type: String,
    pub synthesized_heading_type: String,
    pub synthesized_text_type: String,

    /// Property path carrying a synthesized heading's tag name.
    pub heading_tag_path: String,

    /// Property branch keys never descended into by the text map.
    pub excluded_property_keys: Vec<String>,

    /// Property branch keys treated as media, skipped unless requested.
    pub media_property_keys: Vec<String>,

    /// Leaf segment names excluded from the text map.
    pub excluded_leaf_segments: Vec<String>,

    /// Leaf segment names kept even when numeric.
    pub numeric_leaf_segments: Vec<String>,

    /// Leaf segment names tagged as URLs.
    pub url_leaf_segments: Vec<String>,
}

impl Default for ElementCatalog {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            version: 1,
            default_text_path: "content.content.text".into(),
            text_paths: [
                ("heading", "content.content.text"),
                ("text", "content.content.text"),
                ("text-editor", "content.content.text"),
                ("button", "content.settings.label"),
                ("blockquote", "content.content.text"),
                ("counter", "content.settings.title"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            text_alias_paths: [("text-editor", "content.settings.text")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            property_alias_prefixes: [
                (
                    "faq",
                    vec![(
                        "content.settings.questions".to_string(),
                        "content.settings.items".to_string(),
                    )],
                ),
                (
                    "accordion",
                    vec![(
                        "content.settings.questions".to_string(),
                        "content.settings.items".to_string(),
                    )],
                ),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
            element_labels: [
                ("root", "Document"),
                ("section", "Section"),
                ("inner-section", "Inner Section"),
                ("container", "Container"),
                ("column", "Column"),
                ("grid", "Grid"),
                ("div", "Div"),
                ("heading", "Heading"),
                ("text", "Text"),
                ("text-editor", "Rich Text"),
                ("button", "Button"),
                ("image", "Image"),
                ("faq", "FAQ"),
                ("accordion", "Accordion"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            root_label: "Document".into(),
            section_types: strings(&["section"]),
            column_types: strings(&["column", "grid"]),
            layout_types: strings(&["container", "div", "inner-section"]),
            heading_types: strings(&["heading"]),
            text_types: strings(&["text", "text-editor"]),
            synthesized_section_type: "section".into(),
            synthesized_column_type: "column".into(),
            synthesized_heading_type: "heading".into(),
            synthesized_text_type: "text-editor".into(),
            heading_tag_path: "content.settings.tag".into(),
            excluded_property_keys: strings(&[
                "layout",
                "style",
                "design",
                "spacing",
                "border",
                "background",
                "effects",
                "typography",
                "responsive",
                "advanced",
                "animation",
            ]),
            media_property_keys: strings(&[
                "image",
                "images",
                "media",
                "gallery",
                "video",
                "icon",
            ]),
            excluded_leaf_segments: strings(&[
                "id",
                "slug",
                "class",
                "width",
                "height",
                "size",
                "margin",
                "padding",
                "color",
                "font",
                "weight",
                "align",
                "direction",
                "unit",
                "breakpoint",
                "tag",
            ]),
            numeric_leaf_segments: strings(&[
                "price", "stat", "count", "value", "number", "percent", "year",
            ]),
            url_leaf_segments: strings(&["url", "link", "href", "src"]),
        }
    }
}

impl ElementCatalog {
    pub fn is_text_bearing(&self, element_type: &str) -> bool {
        self.text_paths.contains_key(element_type)
    }

    /// Primary text property path for an element type.
    pub fn text_path_for(&self, element_type: &str) -> &str {
        self.text_paths
            .get(element_type)
            .map(String::as_str)
            .unwrap_or(&self.default_text_path)
    }

    /// Secondary path written alongside the primary, if the type has one.
    pub fn text_alias_for(&self, element_type: &str) -> Option<&str> {
        self.text_alias_paths.get(element_type).map(String::as_str)
    }

    /// Mirror of a property path under the type's alias prefixes, if any.
    pub fn mirror_property(&self, element_type: &str, property_path: &str) -> Option<String> {
        for (a, b) in self.property_alias_prefixes.get(element_type)? {
            if let Some(rest) = property_path.strip_prefix(a.as_str()) {
                return Some(format!("{b}{rest}"));
            }
            if let Some(rest) = property_path.strip_prefix(b.as_str()) {
                return Some(format!("{a}{rest}"));
            }
        }
        None
    }

    pub fn is_structural(&self, element_type: &str) -> bool {
        self.is_section(element_type)
            || self.is_column(element_type)
            || self.is_layout(element_type)
    }

    pub fn is_section(&self, element_type: &str) -> bool {
        self.section_types.iter().any(|t| t == element_type)
    }

    pub fn is_column(&self, element_type: &str) -> bool {
        self.column_types.iter().any(|t| t == element_type)
    }

    pub fn is_layout(&self, element_type: &str) -> bool {
        self.layout_types.iter().any(|t| t == element_type)
    }

    pub fn is_heading(&self, element_type: &str) -> bool {
        self.heading_types.iter().any(|t| t == element_type)
    }

    pub fn is_body_text(&self, element_type: &str) -> bool {
        self.text_types.iter().any(|t| t == element_type)
    }

    /// Display label for an element type, falling back to the type name.
    pub fn label_for<'a>(&'a self, element_type: &'a str) -> &'a str {
        self.element_labels
            .get(element_type)
            .map(String::as_str)
            .unwrap_or(element_type)
    }

    pub fn is_excluded_branch(&self, key: &str) -> bool {
        self.excluded_property_keys.iter().any(|k| k == key)
    }

    pub fn is_media_branch(&self, key: &str) -> bool {
        self.media_property_keys.iter().any(|k| k == key)
    }

    pub fn is_excluded_leaf(&self, segment: &str) -> bool {
        self.excluded_leaf_segments.iter().any(|k| k == segment)
    }

    pub fn is_numeric_allowed_leaf(&self, segment: &str) -> bool {
        self.numeric_leaf_segments.iter().any(|k| k == segment)
    }

    pub fn is_url_leaf(&self, segment: &str) -> bool {
        self.url_leaf_segments.iter().any(|k| k == segment)
    }
}
