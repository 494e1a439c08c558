//! Lookup sequencer: issues translation calls and makes sure only the
//! newest interaction ever reaches the presentation state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::adapters::{ProviderError, TranslationProvider, TranslationQuery};
use crate::audio::PlaybackController;
use crate::domain::{ContextWindow, Definition, LookupRequest, LookupState, PlaybackOutcome, Span};

use super::presentation::Presentation;

/// Default bound on a single provider call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default pause between auto-play repetitions
pub const DEFAULT_AUTO_PLAY_PAUSE: Duration = Duration::from_millis(500);

/// Knobs the sequencer reads at the start of every lookup
#[derive(Debug, Clone, PartialEq)]
pub struct LookupSettings {
    pub request_timeout: Duration,

    /// Repetitions played after a single-word lookup (0 disables)
    pub auto_play_count: u32,

    pub auto_play_pause: Duration,

    pub playback_speed: f32,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            auto_play_count: 1,
            auto_play_pause: DEFAULT_AUTO_PLAY_PAUSE,
            playback_speed: 1.0,
        }
    }
}

/// Serializes lookups by generation.
///
/// `submit` returns immediately; the provider call and its effects run on a
/// spawned task. Only the request holding the newest generation may touch
/// [`Presentation`]; older completions are dropped without a trace.
pub struct LookupSequencer {
    translator: Arc<dyn TranslationProvider>,
    playback: Arc<PlaybackController>,
    presentation: Arc<Presentation>,
    settings: Mutex<LookupSettings>,
}

impl LookupSequencer {
    pub fn new(
        translator: Arc<dyn TranslationProvider>,
        playback: Arc<PlaybackController>,
        presentation: Arc<Presentation>,
        settings: LookupSettings,
    ) -> Self {
        Self {
            translator,
            playback,
            presentation,
            settings: Mutex::new(settings),
        }
    }

    pub fn presentation(&self) -> &Arc<Presentation> {
        &self.presentation
    }

    pub fn playback(&self) -> &Arc<PlaybackController> {
        &self.playback
    }

    pub fn settings(&self) -> LookupSettings {
        self.settings.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace settings; applies to lookups submitted afterwards
    pub fn set_settings(&self, settings: LookupSettings) {
        *self.settings.lock().unwrap_or_else(|e| e.into_inner()) = settings;
    }

    /// Start a lookup for `span`.
    ///
    /// Loading is shown and previous audio is stopped before this returns.
    /// The handle resolves to the request's terminal state; dropping it
    /// does not cancel the lookup.
    pub fn submit(
        self: &Arc<Self>,
        span: Span,
        context: ContextWindow,
        source_language: &str,
        target_language: &str,
        detailed: bool,
        is_phrase: bool,
    ) -> JoinHandle<LookupState> {
        // The generation moves first so that an auto-play loop of the
        // previous lookup fails its gate before stop_all runs.
        let generation = self.presentation.begin();
        self.playback.stop_all();

        let request = LookupRequest {
            generation,
            span,
            context,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            detailed,
            is_phrase,
        };
        let settings = self.settings();

        let this = Arc::clone(self);
        tokio::spawn(async move { this.run(request, settings).await })
    }

    #[instrument(skip(self, request, settings), fields(generation = request.generation, text = %request.span.text))]
    async fn run(self: Arc<Self>, request: LookupRequest, settings: LookupSettings) -> LookupState {
        let query = TranslationQuery {
            text: request.span.text.clone(),
            context: request.context.text.clone(),
            source_language: request.source_language.clone(),
            target_language: request.target_language.clone(),
            detailed: request.detailed,
        };

        let result = match tokio::time::timeout(settings.request_timeout, self.translator.translate(&query)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(settings.request_timeout)),
        };

        match result {
            Ok(definition) => {
                if !self.presentation.accept(request.generation, definition.clone()) {
                    debug!("Discarding stale definition");
                    return LookupState::Superseded;
                }
                info!(
                    provider = self.translator.name(),
                    translation = %definition.translation,
                    "Lookup resolved"
                );

                if !request.is_phrase && settings.auto_play_count > 0 {
                    let this = Arc::clone(&self);
                    let generation = request.generation;
                    let text = request.span.text.clone();
                    tokio::spawn(async move {
                        this.auto_play(generation, text, definition, &settings).await;
                    });
                }
                LookupState::Resolved
            }
            Err(e) => {
                if !self.presentation.fail(request.generation, e.to_string()) {
                    debug!(error = %e, "Discarding stale failure");
                    return LookupState::Superseded;
                }
                error!(provider = self.translator.name(), error = %e, "Lookup failed");
                LookupState::Failed
            }
        }
    }

    /// Play `text` up to `auto_play_count` times while `generation` stays
    /// current. Returns the number of repetitions that played to the end.
    async fn auto_play(
        &self,
        generation: u64,
        text: String,
        definition: Definition,
        settings: &LookupSettings,
    ) -> u32 {
        let mut played = 0;
        for repetition in 0..settings.auto_play_count {
            if repetition > 0 {
                tokio::time::sleep(settings.auto_play_pause).await;
            }

            let presentation = &self.presentation;
            let outcome = self
                .playback
                .play_while(&text, &definition.source_language, settings.playback_speed, || {
                    presentation.is_current(generation)
                })
                .await;

            match outcome {
                Ok(PlaybackOutcome::Completed) => played += 1,
                Ok(PlaybackOutcome::Cancelled) => {
                    debug!(generation, played, "Auto-play cancelled");
                    break;
                }
                Err(e) => {
                    debug!(generation, error = %e, "Auto-play stopped");
                    break;
                }
            }
        }
        played
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = LookupSettings::default();
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.auto_play_pause, Duration::from_millis(500));
        assert_eq!(settings.auto_play_count, 1);
    }
}
