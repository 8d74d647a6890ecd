pub mod options;
pub mod outline;
pub mod text_map;

pub use options::{
    ExtractOptions, LayoutMode, OutlineStyle, ReadOptions, TextMapScope, TextMapStyle,
};
pub use outline::{extract_outline, render_summary, render_tree, OutlineEntry};
pub use text_map::{extract_text_map, TextKind, TextMapEntry};
