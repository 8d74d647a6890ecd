//! # Pageforge Editor
//!
//! Core transformation engine for builder documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: raw stored value ⇄ node tree      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: decode → mutate/inject → encode     │
//! │  - Path-based removal and text edits        │
//! │  - Template slot-filling injection          │
//! │  - Storage-shape-preserving round trip      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ views: outline + text map (read side)       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The stored shape is sacred**: whatever storage shape and type a
//!    document arrived in, it leaves in
//! 2. **Addresses are positional**: paths index one tree snapshot; one
//!    `apply` call resolves every address against the caller's snapshot
//! 3. **Stale addresses are skipped, not fatal**: automation clients
//!    batch edits; one stale path must not sink the batch
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pageforge_editor::{EditRequest, Pipeline};
//!
//! let pipeline = Pipeline::new();
//!
//! // Read side
//! let view = pipeline.inspect(&raw, &ReadOptions::default());
//!
//! // Write side
//! let request: EditRequest = serde_json::from_str(payload)?;
//! let outcome = pipeline.apply(Some(&raw), &request)?;
//! persist(outcome.document);
//! ```

mod errors;
mod inject;
mod mutations;
mod pipeline;

pub use errors::EditorError;
pub use inject::{Injector, SectionPayload};
pub use mutations::{remove_by_paths, update_property, update_text};
pub use pipeline::{DocumentView, EditOutcome, EditRequest, EditSummary, Pipeline, TextUpdate};

// Re-export common types for convenience
pub use pageforge_document::{ElementCatalog, IdGenerator, Node};
pub use pageforge_views::ReadOptions;
