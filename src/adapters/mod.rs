//! Adapter interfaces for external systems.
//!
//! Adapters provide a unified interface for the collaborators the core
//! delegates to: translation providers and speech synthesizers.

pub mod speech;
pub mod translate;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Definition;

// Re-export the concrete adapters
pub use speech::{parse_espeak_voices, select_voice, PlayerCommand, RemoteSpeech, SystemSpeech, Voice};
pub use translate::{LlmTranslator, QuickTranslator, TieredTranslator};

/// Input to a translation provider
#[derive(Debug, Clone)]
pub struct TranslationQuery {
    /// Word or phrase to translate
    pub text: String,

    /// Sentence the text appeared in
    pub context: String,

    /// Source language code, or "auto"
    pub source_language: String,

    pub target_language: String,

    /// Ask for a detailed explanation
    pub detailed: bool,
}

/// Translation provider failures
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Invalid API key")]
    InvalidCredentials,

    #[error("Rate limit exceeded, please wait")]
    RateLimited,

    #[error("Translation quota exceeded")]
    QuotaExceeded,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not parse provider response: {0}")]
    Parse(String),

    #[error("Translation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Map a non-success HTTP status to a user-facing error
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => ProviderError::InvalidCredentials,
            429 => ProviderError::RateLimited,
            456 => ProviderError::QuotaExceeded,
            _ => ProviderError::Http {
                status,
                message: body.trim().chars().take(200).collect(),
            },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::Parse(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

/// External translation service
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Translate `query.text` in the context of `query.context`
    async fn translate(&self, query: &TranslationQuery) -> Result<Definition, ProviderError>;
}

/// One pronunciation request
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,

    /// Language/locale tag used to pick a voice ("da", "en-GB", ...)
    pub voice_hint: String,

    /// Rate multiplier, 1.0 = normal
    pub rate: f32,
}

/// External speech synthesizer.
///
/// `speak` resolves when the audio has finished. Dropping the returned
/// future must stop the audio: implementations that spawn processes set
/// `kill_on_drop`.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn speak(&self, utterance: &Utterance) -> Result<()>;
}
