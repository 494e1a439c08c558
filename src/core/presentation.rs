//! Shared presentation state and the generation clock that guards it.
//!
//! Every interaction takes a new generation. Setters that carry a
//! generation only apply while that generation is still the newest, and
//! the comparison and the write happen under one lock, so a stale
//! completion can never interleave with a newer `begin`.

use std::sync::{Mutex, MutexGuard};

use crate::domain::Definition;

use super::history::{History, HistoryEntry};

/// Point-in-time copy of the presentation state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentationSnapshot {
    /// Newest generation issued
    pub generation: u64,

    /// A lookup for `generation` is in flight
    pub loading: bool,

    /// Definition currently shown
    pub definition: Option<Definition>,

    /// Generation that produced `definition` (0 if none)
    pub definition_generation: u64,

    /// User-visible failure of the current lookup
    pub error: Option<String>,

    /// Non-fatal warning (e.g. pronunciation unavailable)
    pub warning: Option<String>,
}

#[derive(Debug)]
struct PresentationState {
    snapshot: PresentationSnapshot,
    history: History,
}

/// Presentation state shared between the sequencer and the UI
#[derive(Debug)]
pub struct Presentation {
    state: Mutex<PresentationState>,
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new(History::default())
    }
}

impl Presentation {
    pub fn new(history: History) -> Self {
        Self {
            state: Mutex::new(PresentationState {
                snapshot: PresentationSnapshot::default(),
                history,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PresentationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a new interaction: take the next generation, show loading and
    /// clear the shown definition and error.
    pub fn begin(&self) -> u64 {
        let mut state = self.lock();
        let s = &mut state.snapshot;
        s.generation += 1;
        s.loading = true;
        s.definition = None;
        s.error = None;
        s.warning = None;
        s.generation
    }

    /// Clear the popover without starting a lookup.
    ///
    /// Takes a generation too, so lookups still in flight are discarded
    /// when they complete.
    pub fn clear(&self) -> u64 {
        let mut state = self.lock();
        let s = &mut state.snapshot;
        s.generation += 1;
        s.loading = false;
        s.definition = None;
        s.error = None;
        s.warning = None;
        s.generation
    }

    pub fn current_generation(&self) -> u64 {
        self.lock().snapshot.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.lock().snapshot.generation == generation
    }

    /// Show `definition` and record it in history if `generation` is
    /// current. Returns whether it was applied.
    pub fn accept(&self, generation: u64, definition: Definition) -> bool {
        let mut state = self.lock();
        if state.snapshot.generation != generation {
            return false;
        }
        state.history.record(definition.clone());
        let s = &mut state.snapshot;
        s.definition = Some(definition);
        s.definition_generation = generation;
        s.loading = false;
        true
    }

    /// Surface a failure if `generation` is current. Returns whether it
    /// was applied.
    pub fn fail(&self, generation: u64, message: impl Into<String>) -> bool {
        let mut state = self.lock();
        if state.snapshot.generation != generation {
            return false;
        }
        let s = &mut state.snapshot;
        s.error = Some(message.into());
        s.loading = false;
        true
    }

    /// Show a non-fatal warning; does not touch lookup state
    pub fn warn(&self, message: impl Into<String>) {
        self.lock().snapshot.warning = Some(message.into());
    }

    pub fn snapshot(&self) -> PresentationSnapshot {
        self.lock().snapshot.clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.lock().history.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(word: &str) -> Definition {
        Definition {
            word: word.to_string(),
            translation: "x".to_string(),
            pronunciation: String::new(),
            part_of_speech: String::new(),
            detailed_explanation: None,
            source_language: "da".to_string(),
            target_language: "en".to_string(),
        }
    }

    #[test]
    fn test_begin_sets_loading_and_clears() {
        let p = Presentation::default();
        let g1 = p.begin();
        assert!(p.accept(g1, def("han")));

        let g2 = p.begin();
        assert_eq!(g2, g1 + 1);
        let snap = p.snapshot();
        assert!(snap.loading);
        assert!(snap.definition.is_none());
    }

    #[test]
    fn test_stale_accept_is_rejected() {
        let p = Presentation::default();
        let g1 = p.begin();
        let g2 = p.begin();

        assert!(!p.accept(g1, def("han")));
        assert!(p.snapshot().loading);
        assert!(p.history().is_empty());

        assert!(p.accept(g2, def("tale")));
        let snap = p.snapshot();
        assert!(!snap.loading);
        assert_eq!(snap.definition_generation, g2);
        assert_eq!(p.history().len(), 1);
    }

    #[test]
    fn test_stale_failure_is_rejected() {
        let p = Presentation::default();
        let g1 = p.begin();
        let _g2 = p.begin();
        assert!(!p.fail(g1, "boom"));
        assert!(p.snapshot().error.is_none());
    }

    #[test]
    fn test_clear_supersedes_in_flight() {
        let p = Presentation::default();
        let g1 = p.begin();
        p.clear();
        assert!(!p.accept(g1, def("han")));
        let snap = p.snapshot();
        assert!(!snap.loading);
        assert!(snap.definition.is_none());
    }
}
