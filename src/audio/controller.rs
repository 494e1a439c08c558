//! Single-instance playback controller with primary/fallback speech paths.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use crate::adapters::{SpeechProvider, Utterance};
use crate::domain::PlaybackOutcome;

/// Longest text handed to a synthesizer (provider URL-length limits)
pub const DEFAULT_MAX_CHARS: usize = 200;

/// Playback failures
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("Pronunciation unavailable (primary: {primary}; fallback: {fallback})")]
    Unavailable { primary: String, fallback: String },
}

/// The playback currently allowed to run
struct ActivePlayback {
    id: u64,
    cancel: oneshot::Sender<()>,
}

/// Plays one pronunciation at a time.
///
/// Starting a playback cancels the previous one. Cancellation (from a new
/// playback or [`stop_all`](Self::stop_all)) resolves the cancelled `play`
/// with [`PlaybackOutcome::Cancelled`], never with an error.
pub struct PlaybackController {
    primary: Arc<dyn SpeechProvider>,
    fallback: Arc<dyn SpeechProvider>,
    max_chars: usize,
    active: Mutex<Option<ActivePlayback>>,
    next_id: AtomicU64,
}

impl PlaybackController {
    pub fn new(primary: Arc<dyn SpeechProvider>, fallback: Arc<dyn SpeechProvider>) -> Self {
        Self {
            primary,
            fallback,
            max_chars: DEFAULT_MAX_CHARS,
            active: Mutex::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    /// Override the input length limit
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActivePlayback>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether a playback is in progress
    pub fn is_playing(&self) -> bool {
        self.lock_active().is_some()
    }

    /// Play `text`, replacing any playback in progress
    pub async fn play(
        &self,
        text: &str,
        voice_hint: &str,
        speed: f32,
    ) -> Result<PlaybackOutcome, PlaybackError> {
        self.play_while(text, voice_hint, speed, || true).await
    }

    /// Play `text` only if `still_wanted` holds at the moment the playback
    /// takes over the controller.
    ///
    /// The check runs under the same lock `stop_all` takes, so a caller
    /// that invalidates `still_wanted` and then calls `stop_all` can never
    /// leave this playback running.
    #[instrument(skip(self, text, still_wanted))]
    pub async fn play_while<F>(
        &self,
        text: &str,
        voice_hint: &str,
        speed: f32,
        still_wanted: F,
    ) -> Result<PlaybackOutcome, PlaybackError>
    where
        F: Fn() -> bool,
    {
        let (cancel, mut cancelled) = oneshot::channel();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut active = self.lock_active();
            // An unwanted playback leaves the current one untouched
            if !still_wanted() {
                debug!("Playback no longer wanted");
                return Ok(PlaybackOutcome::Cancelled);
            }
            if let Some(previous) = active.replace(ActivePlayback { id, cancel }) {
                let _ = previous.cancel.send(());
            }
        }

        let utterance = Utterance {
            text: truncate_chars(text, self.max_chars),
            voice_hint: voice_hint.to_string(),
            rate: speed,
        };

        let outcome = if utterance.text.is_empty() {
            Ok(PlaybackOutcome::Completed)
        } else {
            tokio::select! {
                result = self.speak_with_fallback(&utterance) => result.map(|()| PlaybackOutcome::Completed),
                _ = &mut cancelled => {
                    debug!("Playback cancelled");
                    Ok(PlaybackOutcome::Cancelled)
                }
            }
        };

        // Release the slot unless a newer playback already took it
        let mut active = self.lock_active();
        if active.as_ref().map(|a| a.id) == Some(id) {
            *active = None;
        }

        outcome
    }

    async fn speak_with_fallback(&self, utterance: &Utterance) -> Result<(), PlaybackError> {
        let primary_err = match self.primary.speak(utterance).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        warn!(
            provider = self.primary.name(),
            error = %primary_err,
            "Primary speech failed, falling back"
        );

        match self.fallback.speak(utterance).await {
            Ok(()) => Ok(()),
            Err(fallback_err) => Err(PlaybackError::Unavailable {
                primary: primary_err.to_string(),
                fallback: fallback_err.to_string(),
            }),
        }
    }

    /// Cancel the playback in progress, if any. Idempotent.
    pub fn stop_all(&self) {
        if let Some(active) = self.lock_active().take() {
            debug!(id = active.id, "Stopping playback");
            let _ = active.cancel.send(());
        }
    }
}

/// First `max_chars` codepoints of the trimmed text
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("  tale  ", 200), "tale");
        assert_eq!(truncate_chars("привет", 3), "при");
        assert_eq!(truncate_chars("", 10), "");
    }
}
