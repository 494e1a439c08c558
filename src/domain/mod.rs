//! Domain types for the reading assistant.
//!
//! This module contains the core data structures:
//! - Span: Resolved word/phrase target and its surrounding context
//! - Definition: Lookup requests and their results
//! - Geometry: Points and rectangles for hit-testing and placement

pub mod definition;
pub mod geometry;
pub mod span;

// Re-export commonly used types
pub use definition::{Definition, LookupRequest, LookupState, PlaybackOutcome};
pub use geometry::{Point, Rect};
pub use span::{Caret, ContextSource, ContextWindow, NodeId, Span};
