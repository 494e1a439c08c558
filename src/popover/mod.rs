//! Popover placement: where the translation panel goes relative to the
//! span it explains, and how a user drag moves it.
//!
//! Anchor and drag state are ephemeral. They are recomputed per lookup
//! and never persisted.

pub mod anchor;
pub mod drag;

pub use anchor::{compute_anchor, PlacementConfig, PopoverAnchor, Side};
pub use drag::{apply_drag, DragState, RenderPosition};
