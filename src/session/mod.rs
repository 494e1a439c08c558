//! Session persistence: settings, the open article, the bookmark and the
//! lookup history.
//!
//! Reads never fail. Anything missing or unparseable falls back to its
//! default, and failed writes are logged and dropped.

pub mod article;
pub mod settings;
pub mod store;

pub use article::{article_id, Article, Bookmark};
pub use settings::ReadingSettings;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, PersistenceError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::core::HistoryEntry;

pub const SETTINGS_KEY: &str = "settings";
pub const ARTICLE_KEY: &str = "article";
pub const BOOKMARK_KEY: &str = "bookmark";
pub const HISTORY_KEY: &str = "history";

/// Everything restored at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub settings: ReadingSettings,
    pub article: Option<Article>,
    pub bookmark: Option<Bookmark>,
    /// Newest first
    pub history: Vec<HistoryEntry>,
}

impl SessionState {
    /// Read every key from `store`, substituting defaults per key
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let article: Option<Article> = read_key(store, ARTICLE_KEY);
        // A bookmark for some other article is meaningless
        let bookmark = read_key::<Bookmark>(store, BOOKMARK_KEY)
            .filter(|b| article.as_ref().map_or(false, |a| b.matches(a)));

        Self {
            settings: read_key(store, SETTINGS_KEY).unwrap_or_default(),
            article,
            bookmark,
            history: read_key(store, HISTORY_KEY).unwrap_or_default(),
        }
    }

    pub fn save_settings(store: &dyn KeyValueStore, settings: &ReadingSettings) {
        write_key(store, SETTINGS_KEY, settings);
    }

    /// Store a new article; the previous bookmark no longer applies
    pub fn save_article(store: &dyn KeyValueStore, article: &Article) {
        write_key(store, ARTICLE_KEY, article);
        if let Err(e) = store.remove(BOOKMARK_KEY) {
            warn!(error = %e, "Failed to clear bookmark");
        }
    }

    pub fn save_bookmark(store: &dyn KeyValueStore, bookmark: &Bookmark) {
        write_key(store, BOOKMARK_KEY, bookmark);
    }

    pub fn save_history(store: &dyn KeyValueStore, history: &[HistoryEntry]) {
        write_key(store, HISTORY_KEY, history);
    }
}

fn read_key<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Ignoring unparseable session value");
            None
        }
    }
}

fn write_key<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(|source| PersistenceError::Encode {
            key: key.to_string(),
            source,
        })
        .and_then(|json| store.set(key, json));

    if let Err(e) = result {
        warn!(key, error = %e, "Dropping session write");
    }
}
