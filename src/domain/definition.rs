//! Lookup requests and the definitions they produce.

use serde::{Deserialize, Serialize};

use super::span::{ContextWindow, Span};

/// One user interaction's lookup, immutable after creation.
///
/// `generation` is strictly increasing per session; only the request with
/// the highest generation may affect shared presentation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupRequest {
    pub generation: u64,
    pub span: Span,
    pub context: ContextWindow,
    pub source_language: String,
    pub target_language: String,
    pub detailed: bool,
    /// Drag-selected phrase or sentence (never auto-played)
    pub is_phrase: bool,
}

/// Lookup result produced by a translation provider.
///
/// Replaced wholesale on every accepted result; never partially mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    pub word: String,
    pub translation: String,
    #[serde(default)]
    pub pronunciation: String,
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_explanation: Option<String>,
    pub source_language: String,
    pub target_language: String,
}

/// Lifecycle of a single lookup request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupState {
    /// Provider call in flight
    Issued,
    /// A newer request was submitted before this one completed
    Superseded,
    /// Result accepted into presentation state
    Resolved,
    /// Provider failed while this request was current
    Failed,
}

impl LookupState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LookupState::Issued)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LookupState::Issued => "issued",
            LookupState::Superseded => "superseded",
            LookupState::Resolved => "resolved",
            LookupState::Failed => "failed",
        }
    }
}

/// How a playback ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Audio played to the end
    Completed,
    /// Stopped by `stop_all` or a newer playback
    Cancelled,
}
