//! Pronunciation playback.
//!
//! A single [`PlaybackController`] is owned by the application and shared
//! by handle with whatever needs to start or cancel audio. It guarantees at
//! most one playback at a time.

pub mod controller;

pub use controller::{truncate_chars, PlaybackController, PlaybackError, DEFAULT_MAX_CHARS};
