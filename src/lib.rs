//! wordlens - click-to-translate reading assistant core
//!
//! Turns a click or a drag over article text into a translated, pronounced
//! definition shown in a popover next to the text.
//!
//! # Architecture
//!
//! The system is built around a generation clock:
//! - Every interaction takes a new generation
//! - Only the newest generation may change what the reader sees
//! - Stale translations are dropped, and a new interaction always stops audio
//!
//! # Modules
//!
//! - `resolver`: Pointer/selection to word or phrase plus sentence context
//! - `popover`: Anchored placement and drag repositioning
//! - `core`: Lookup sequencing, presentation state, history, `Reader`
//! - `audio`: Single-instance playback with remote and on-device speech
//! - `adapters`: Translation and speech providers
//! - `session`: Persisted settings, article, bookmark and history
//! - `domain`: Data structures (Span, ContextWindow, Definition)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Open an article
//! wordlens open article.txt
//!
//! # Look up a word by position or by text
//! wordlens lookup --point 135,12
//! wordlens lookup --find tale --speak
//!
//! # Look up a phrase
//! wordlens lookup --find "kan ikke tale"
//! ```

pub mod adapters;
pub mod audio;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod popover;
pub mod resolver;
pub mod session;

// Re-export main types at crate root for convenience
pub use crate::core::{LookupSequencer, Presentation, Reader};
pub use audio::{PlaybackController, PlaybackError};
pub use domain::{ContextWindow, Definition, LookupState, PlaybackOutcome, Span};
pub use popover::{compute_anchor, PopoverAnchor};
pub use resolver::{resolve_at_point, resolve_from_selection, Document};
pub use session::SessionState;
