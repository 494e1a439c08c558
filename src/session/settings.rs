//! Reader-facing settings persisted with the session.

use serde::{Deserialize, Serialize};

/// Per-reader lookup and playback preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSettings {
    /// Language of the article, or "auto"
    #[serde(default = "default_source_language")]
    pub source_language: String,

    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Pronunciations played after a single-word lookup
    #[serde(default = "default_auto_play_count")]
    pub auto_play_count: u32,

    #[serde(default = "default_playback_speed")]
    pub playback_speed: f32,

    /// Request detailed explanations
    #[serde(default)]
    pub detailed: bool,
}

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_auto_play_count() -> u32 {
    1
}

fn default_playback_speed() -> f32 {
    1.0
}

impl Default for ReadingSettings {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            auto_play_count: default_auto_play_count(),
            playback_speed: default_playback_speed(),
            detailed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: ReadingSettings = serde_json::from_str(r#"{"targetLanguage":"de"}"#).unwrap();
        assert_eq!(settings.target_language, "de");
        assert_eq!(settings.source_language, "auto");
        assert_eq!(settings.auto_play_count, 1);
        assert!(!settings.detailed);
    }
}
