//! Translation providers.
//!
//! - [`LlmTranslator`]: chat-completions model, returns pronunciation, part
//!   of speech and optionally a detailed explanation.
//! - [`QuickTranslator`]: cheap non-AI machine translation.
//! - [`TieredTranslator`]: tries the quick one first for plain lookups and
//!   falls through to the rich one on any failure.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::Definition;

use super::{ProviderError, TranslationProvider, TranslationQuery};

/// Default OpenAI-compatible endpoint
pub const DEFAULT_LLM_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default model
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Default quick translation endpoint
pub const DEFAULT_QUICK_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

// ─── LLM provider ────────────────────────────────────────────────────

/// Chat-completions backed translator
pub struct LlmTranslator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// JSON object the model is asked to produce
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelDefinition {
    #[serde(default)]
    word: Option<String>,
    translation: String,
    #[serde(default)]
    pronunciation: String,
    #[serde(default)]
    part_of_speech: String,
    #[serde(default)]
    detailed_explanation: Option<String>,
    /// Language code the model detected, asked for when the source is `auto`
    #[serde(default)]
    source_language: Option<String>,
}

impl LlmTranslator {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
        }
    }

    /// System and user prompts for a query
    pub fn build_prompt(query: &TranslationQuery) -> (String, String) {
        let source = if query.source_language == "auto" {
            "the detected language".to_string()
        } else {
            query.source_language.clone()
        };

        let mut system = format!(
            "You are a dictionary for language learners. Translate from {} to {}. \
             Reply with a single JSON object with keys: word, translation, \
             pronunciation (IPA), partOfSpeech",
            source, query.target_language
        );
        if query.detailed {
            system.push_str(
                ", detailedExplanation (usage, nuance and grammar notes, written in the target language)",
            );
        }
        if query.source_language == "auto" {
            system.push_str(", sourceLanguage (ISO 639-1 code of the text's language)");
        }
        system.push('.');

        let user = format!("Text: {}\nContext: {}", query.text, query.context);
        (system, user)
    }

    fn request_body(&self, query: &TranslationQuery) -> Value {
        let (system, user) = Self::build_prompt(query);
        serde_json::json!({
            "model": self.model,
            "temperature": 0.2,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        })
    }
}

/// Parse the model's reply into a definition.
///
/// Accepts the object bare or wrapped in a fenced code block.
pub fn parse_model_reply(content: &str, query: &TranslationQuery) -> Result<Definition, ProviderError> {
    let trimmed = content.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let parsed: ModelDefinition =
        serde_json::from_str(json).map_err(|e| ProviderError::Parse(e.to_string()))?;

    if parsed.translation.trim().is_empty() {
        return Err(ProviderError::Parse("empty translation".to_string()));
    }

    let detailed_explanation = if query.detailed {
        parsed.detailed_explanation.filter(|s| !s.trim().is_empty())
    } else {
        None
    };

    let source_language = match parsed.source_language.map(|l| l.trim().to_lowercase()) {
        Some(detected) if query.source_language == "auto" && !detected.is_empty() => detected,
        _ => query.source_language.clone(),
    };

    Ok(Definition {
        word: parsed
            .word
            .filter(|w| !w.trim().is_empty())
            .unwrap_or_else(|| query.text.clone()),
        translation: parsed.translation,
        pronunciation: parsed.pronunciation,
        part_of_speech: parsed.part_of_speech,
        detailed_explanation,
        source_language,
        target_language: query.target_language.clone(),
    })
}

#[async_trait]
impl TranslationProvider for LlmTranslator {
    fn name(&self) -> &str {
        "llm"
    }

    async fn translate(&self, query: &TranslationQuery) -> Result<Definition, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("no API key for LLM translator".to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.request_body(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ProviderError::Parse("no choices returned".to_string()))?;

        parse_model_reply(content, query)
    }
}

// ─── Quick provider ──────────────────────────────────────────────────

/// Non-AI machine translation (word + transliteration only)
pub struct QuickTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl Default for QuickTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_QUICK_ENDPOINT)
    }
}

impl QuickTranslator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Request URL for a query
    pub fn request_url(&self, query: &TranslationQuery) -> Result<reqwest::Url, ProviderError> {
        let source = if query.source_language.is_empty() {
            "auto"
        } else {
            query.source_language.as_str()
        };

        reqwest::Url::parse_with_params(
            &self.endpoint,
            &[
                ("client", "gtx"),
                ("sl", source),
                ("tl", query.target_language.as_str()),
                ("dt", "t"),
                ("dt", "rm"),
                ("q", query.text.as_str()),
            ],
        )
        .map_err(|e| ProviderError::NotConfigured(format!("invalid endpoint {}: {}", self.endpoint, e)))
    }
}

/// Parse the nested-array response of the quick endpoint.
///
/// Shape: `[[["translated", "original", ...], ..., [null, null, "tr", "src-translit"]], null, "detected"]`
pub fn parse_quick_response(body: &Value, query: &TranslationQuery) -> Result<Definition, ProviderError> {
    let rows = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::Parse("missing sentence array".to_string()))?;

    let translation: String = rows
        .iter()
        .filter_map(|row| row.get(0).and_then(Value::as_str))
        .collect();

    if translation.trim().is_empty() {
        return Err(ProviderError::Parse("empty translation".to_string()));
    }

    let pronunciation = rows
        .iter()
        .filter(|row| row.get(0).map(Value::is_null).unwrap_or(false))
        .find_map(|row| row.get(3).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    let source_language = match body.get(2).and_then(Value::as_str) {
        Some(detected) if query.source_language == "auto" || query.source_language.is_empty() => {
            detected.to_string()
        }
        _ => query.source_language.clone(),
    };

    Ok(Definition {
        word: query.text.clone(),
        translation: translation.trim().to_string(),
        pronunciation,
        part_of_speech: String::new(),
        detailed_explanation: None,
        source_language,
        target_language: query.target_language.clone(),
    })
}

#[async_trait]
impl TranslationProvider for QuickTranslator {
    fn name(&self) -> &str {
        "quick"
    }

    async fn translate(&self, query: &TranslationQuery) -> Result<Definition, ProviderError> {
        let url = self.request_url(query)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        let body: Value = response.json().await?;
        parse_quick_response(&body, query)
    }
}

// ─── Tiered provider ─────────────────────────────────────────────────

/// Quick-first translator with rich fallthrough
pub struct TieredTranslator {
    quick: Option<Arc<dyn TranslationProvider>>,
    rich: Arc<dyn TranslationProvider>,
}

impl TieredTranslator {
    pub fn new(quick: Option<Arc<dyn TranslationProvider>>, rich: Arc<dyn TranslationProvider>) -> Self {
        Self { quick, rich }
    }
}

#[async_trait]
impl TranslationProvider for TieredTranslator {
    fn name(&self) -> &str {
        "tiered"
    }

    async fn translate(&self, query: &TranslationQuery) -> Result<Definition, ProviderError> {
        if !query.detailed {
            if let Some(quick) = &self.quick {
                match quick.translate(query).await {
                    Ok(def) => return Ok(def),
                    Err(e) => {
                        debug!(provider = quick.name(), error = %e, "Quick translation failed, falling through");
                    }
                }
            }
        }

        self.rich.translate(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(detailed: bool) -> TranslationQuery {
        TranslationQuery {
            text: "tale".to_string(),
            context: "Han kan ikke tale dansk.".to_string(),
            source_language: "da".to_string(),
            target_language: "en".to_string(),
            detailed,
        }
    }

    #[test]
    fn test_parse_model_reply_bare() {
        let reply = r#"{"word":"tale","translation":"speak","pronunciation":"ˈtæːlə","partOfSpeech":"verb"}"#;
        let def = parse_model_reply(reply, &query(false)).unwrap();
        assert_eq!(def.word, "tale");
        assert_eq!(def.translation, "speak");
        assert_eq!(def.part_of_speech, "verb");
        assert_eq!(def.source_language, "da");
        assert!(def.detailed_explanation.is_none());
    }

    #[test]
    fn test_parse_model_reply_fenced_with_detail() {
        let reply = "```json\n{\"translation\":\"speak\",\"detailedExplanation\":\"Infinitive after kan.\"}\n```";
        let def = parse_model_reply(reply, &query(true)).unwrap();
        assert_eq!(def.word, "tale");
        assert_eq!(def.detailed_explanation.as_deref(), Some("Infinitive after kan."));
    }

    #[test]
    fn test_parse_model_reply_drops_unrequested_detail() {
        let reply = r#"{"translation":"speak","detailedExplanation":"extra"}"#;
        let def = parse_model_reply(reply, &query(false)).unwrap();
        assert!(def.detailed_explanation.is_none());
    }

    #[test]
    fn test_parse_model_reply_rejects_garbage() {
        assert!(matches!(parse_model_reply("not json", &query(false)), Err(ProviderError::Parse(_))));
        assert!(matches!(
            parse_model_reply(r#"{"translation":"  "}"#, &query(false)),
            Err(ProviderError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_model_reply_detected_language() {
        let mut q = query(false);
        q.source_language = "auto".to_string();
        assert!(LlmTranslator::build_prompt(&q).0.contains("sourceLanguage"));

        let reply = r#"{"translation":"speak","sourceLanguage":" DA "}"#;
        assert_eq!(parse_model_reply(reply, &q).unwrap().source_language, "da");

        // An explicit source language wins over whatever the model claims
        let reply = r#"{"translation":"speak","sourceLanguage":"no"}"#;
        assert_eq!(parse_model_reply(reply, &query(false)).unwrap().source_language, "da");
        assert!(!LlmTranslator::build_prompt(&query(false)).0.contains("sourceLanguage"));
    }

    #[test]
    fn test_prompt_mentions_detail_only_when_asked() {
        let (system, user) = LlmTranslator::build_prompt(&query(false));
        assert!(!system.contains("detailedExplanation"));
        assert!(user.contains("Context: Han kan ikke tale dansk."));

        let (system, _) = LlmTranslator::build_prompt(&query(true));
        assert!(system.contains("detailedExplanation"));
    }

    #[test]
    fn test_parse_quick_response() {
        let body = serde_json::json!([
            [["speak", "tale", null, null, 10], [null, null, "speak", "ta-le"]],
            null,
            "da"
        ]);
        let def = parse_quick_response(&body, &query(false)).unwrap();
        assert_eq!(def.translation, "speak");
        assert_eq!(def.pronunciation, "ta-le");
        assert_eq!(def.word, "tale");
    }

    #[test]
    fn test_parse_quick_response_detected_language() {
        let mut q = query(false);
        q.source_language = "auto".to_string();
        let body = serde_json::json!([[["speak", "tale"]], null, "no"]);
        let def = parse_quick_response(&body, &q).unwrap();
        assert_eq!(def.source_language, "no");
        assert_eq!(def.pronunciation, "");
    }

    #[test]
    fn test_parse_quick_response_empty() {
        let body = serde_json::json!([[], null, "da"]);
        assert!(parse_quick_response(&body, &query(false)).is_err());
        assert!(parse_quick_response(&serde_json::json!({}), &query(false)).is_err());
    }

    #[test]
    fn test_quick_request_url() {
        let quick = QuickTranslator::default();
        let mut q = query(false);
        q.text = "kan ikke".to_string();
        let url = quick.request_url(&q).unwrap();
        let s = url.as_str();
        assert!(s.starts_with(DEFAULT_QUICK_ENDPOINT));
        assert!(s.contains("sl=da"));
        assert!(s.contains("tl=en"));
        assert!(s.contains("dt=t&dt=rm"));
        assert!(s.contains("q=kan+ikke"));
    }
}
