//! Dashboard layout reconciliation and editing.
//!
//! # Responsibility
//! - Own the code-defined default widget set.
//! - Merge persisted per-user layouts onto the defaults.
//! - Apply interactive edits and persist them with a debounce.
//!
//! # Invariants
//! - The default layout is the authoritative widget id set.
//! - Merged layouts contain exactly one entry per default id.

pub mod editor;
pub mod merge;
pub mod widgets;

pub use editor::{LayoutEditor, LayoutError};
pub use merge::{merge_layout, parse_stored_layout, to_stored_layout};
pub use widgets::default_layout;
