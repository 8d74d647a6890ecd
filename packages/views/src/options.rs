use serde::{Deserialize, Serialize};

/// How much of the document structure a read exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Outline,
    Full,
}

/// Rendering style for the outline view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutlineStyle {
    #[default]
    Summary,
    Tree,
}

/// Verbosity of text-map entries. `None` disables the map entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextMapStyle {
    Full,
    #[default]
    Compact,
    Keys,
    None,
}

/// Which property branches the text map descends into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextMapScope {
    /// Only the `content` branch of each node.
    #[default]
    Content,
    /// Every property branch.
    All,
}

/// Configuration for one extraction walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub style: TextMapStyle,
    pub scope: TextMapScope,
    /// Maximum characters per entry; 0 means unlimited.
    pub max_chars: usize,
    pub include_media: bool,
}

/// Read-side options as consumed from a request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadOptions {
    pub layout_mode: LayoutMode,
    pub outline_style: OutlineStyle,
    pub text_map: bool,
    pub text_map_style: TextMapStyle,
    pub text_map_max_chars: usize,
    pub text_map_scope: TextMapScope,
    pub text_map_include_media: bool,
}

impl ReadOptions {
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            style: self.text_map_style,
            scope: self.text_map_scope,
            max_chars: self.text_map_max_chars,
            include_media: self.text_map_include_media,
        }
    }
}
