//! The article being read and the reader's place in it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Plain-text article; paragraphs are separated by newlines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Content hash of `text`
    pub id: String,
    pub title: String,
    pub text: String,
    pub added_at: DateTime<Utc>,
}

impl Article {
    /// Create an article; the title defaults to the first paragraph
    pub fn new(title: Option<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| default_title(&text));
        Self {
            id: article_id(&text),
            title,
            text,
            added_at: Utc::now(),
        }
    }

    /// Non-blank lines, trimmed
    pub fn paragraphs(&self) -> Vec<&str> {
        self.text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().len()
    }
}

/// First 16 hex characters of the SHA-256 of `text`
pub fn article_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex::encode(digest)[..16].to_string()
}

fn default_title(text: &str) -> String {
    let first = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("Untitled");
    let title: String = first.chars().take(60).collect();
    if first.chars().count() > 60 {
        format!("{}…", title.trim_end())
    } else {
        title
    }
}

/// Reading position: paragraph index within an article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub article_id: String,
    pub paragraph: usize,
}

impl Bookmark {
    /// Bookmark `paragraph` of `article`, clamped to its last paragraph
    pub fn new(article: &Article, paragraph: usize) -> Self {
        let last = article.paragraph_count().saturating_sub(1);
        Self {
            article_id: article.id.clone(),
            paragraph: paragraph.min(last),
        }
    }

    /// Whether this bookmark belongs to `article`
    pub fn matches(&self, article: &Article) -> bool {
        self.article_id == article.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_id_is_stable_prefix() {
        let a = Article::new(None, "Han kan ikke tale dansk.");
        let b = Article::new(Some("Other".to_string()), "Han kan ikke tale dansk.");
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.len(), 16);
        assert_ne!(a.id, article_id("Hun kan tale dansk."));
    }

    #[test]
    fn test_paragraphs_skip_blank_lines() {
        let article = Article::new(None, "Første.\n\n  Anden.  \n\nTredje.");
        assert_eq!(article.paragraphs(), vec!["Første.", "Anden.", "Tredje."]);
        assert_eq!(article.title, "Første.");
    }

    #[test]
    fn test_bookmark_clamped() {
        let article = Article::new(None, "a\nb\nc");
        assert_eq!(Bookmark::new(&article, 1).paragraph, 1);
        assert_eq!(Bookmark::new(&article, 10).paragraph, 2);

        let empty = Article::new(None, "");
        assert_eq!(Bookmark::new(&empty, 3).paragraph, 0);
    }
}
