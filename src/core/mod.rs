//! Core orchestration logic.
//!
//! This module contains:
//! - Presentation: generation clock and shared presentation state
//! - LookupSequencer: issues lookups and suppresses stale results
//! - History: bounded, deduplicated lookup log
//! - Reader: one open article wired to all of the above

pub mod history;
pub mod presentation;
pub mod reader;
pub mod sequencer;

// Re-export commonly used types
pub use history::{History, HistoryEntry, DEFAULT_DEDUPE_WINDOW, DEFAULT_HISTORY_CAPACITY};
pub use presentation::{Presentation, PresentationSnapshot};
pub use reader::{Reader, Viewport, DEFAULT_POPOVER_WIDTH};
pub use sequencer::{LookupSequencer, LookupSettings, DEFAULT_AUTO_PLAY_PAUSE, DEFAULT_REQUEST_TIMEOUT};
