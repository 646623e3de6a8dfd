use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use quiz_core::model::{OPTION_COUNT, option_label};

use crate::error::HintError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Source of free-text hints for the "ask AI" lifeline.
#[async_trait]
pub trait HintProvider: Send + Sync {
    /// Produce a short hint for `question`.
    ///
    /// # Errors
    ///
    /// Returns `HintError` when no hint can be produced.
    async fn hint(
        &self,
        question: &str,
        options: &[String; OPTION_COUNT],
    ) -> Result<String, HintError>;
}

#[derive(Clone, Debug)]
pub struct HintConfig {
    pub base_url: Url,
    pub api_key: String,
    pub model: String,
}

impl HintConfig {
    /// Read `QUIZ_AI_API_KEY`, `QUIZ_AI_BASE_URL` and `QUIZ_AI_MODEL`.
    ///
    /// Returns `Ok(None)` when no API key is set.
    ///
    /// # Errors
    ///
    /// Returns `HintError::InvalidBaseUrl` if the base URL does not parse.
    pub fn from_env() -> Result<Option<Self>, HintError> {
        let Ok(api_key) = env::var("QUIZ_AI_API_KEY") else {
            return Ok(None);
        };
        let base_url = env::var("QUIZ_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("QUIZ_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Self::new(&base_url, api_key, model)
    }

    /// Returns `Ok(None)` for a blank API key.
    ///
    /// # Errors
    ///
    /// Returns `HintError::InvalidBaseUrl` unless `base_url` is an http(s) URL.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Option<Self>, HintError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Ok(None);
        }
        let parsed =
            Url::parse(base_url).map_err(|_| HintError::InvalidBaseUrl(base_url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HintError::InvalidBaseUrl(base_url.to_string()));
        }
        let model = model.into();
        Ok(Some(Self {
            base_url: parsed,
            api_key,
            model: if model.trim().is_empty() {
                DEFAULT_MODEL.to_string()
            } else {
                model
            },
        }))
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

/// Hints from an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct HintService {
    client: Client,
    config: Option<HintConfig>,
}

impl HintService {
    /// # Errors
    ///
    /// Returns `HintError::InvalidBaseUrl` for a malformed `QUIZ_AI_BASE_URL`.
    pub fn from_env() -> Result<Self, HintError> {
        Ok(Self::new(HintConfig::from_env()?))
    }

    #[must_use]
    pub fn new(config: Option<HintConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl HintProvider for HintService {
    async fn hint(
        &self,
        question: &str,
        options: &[String; OPTION_COUNT],
    ) -> Result<String, HintError> {
        let config = self.config.as_ref().ok_or(HintError::Disabled)?;

        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(question, options),
            }],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(config.completions_url())
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(HintError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(HintError::EmptyResponse)?;

        Ok(content)
    }
}

/// Ask for a nudge in Azerbaijani without naming the answer outright.
#[must_use]
pub fn build_prompt(question: &str, options: &[String; OPTION_COUNT]) -> String {
    let listed = options
        .iter()
        .enumerate()
        .map(|(index, text)| format!("{}) {text}", option_label(index)))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Sən viktorina oyununda köməkçisən. Sual: \"{question}\"\n\
         Variantlar:\n{listed}\n\
         Düzgün cavabı birbaşa demədən, bir-iki cümləlik qısa ipucu ver."
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> [String; OPTION_COUNT] {
        ["Bakı", "Gəncə", "Şəki", "Quba"].map(String::from)
    }

    #[test]
    fn blank_key_disables_hints() {
        let config = HintConfig::new(DEFAULT_BASE_URL, "  ", DEFAULT_MODEL).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let err = HintConfig::new("not a url", "key", DEFAULT_MODEL).unwrap_err();
        assert!(matches!(err, HintError::InvalidBaseUrl(_)));
        let err = HintConfig::new("ftp://example.com", "key", DEFAULT_MODEL).unwrap_err();
        assert!(matches!(err, HintError::InvalidBaseUrl(_)));
    }

    #[test]
    fn completions_url_handles_trailing_slash() {
        let config = HintConfig::new("http://localhost:8080/v1/", "key", "")
            .unwrap()
            .unwrap();
        assert_eq!(
            config.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn prompt_lists_labelled_options() {
        let prompt = build_prompt("Azərbaycanın paytaxtı hansıdır?", &options());
        assert!(prompt.contains("Azərbaycanın paytaxtı hansıdır?"));
        assert!(prompt.contains("A) Bakı"));
        assert!(prompt.contains("D) Quba"));
    }

    #[tokio::test]
    async fn disabled_service_reports_disabled() {
        let service = HintService::new(None);
        assert!(!service.enabled());
        let err = service.hint("?", &options()).await.unwrap_err();
        assert!(matches!(err, HintError::Disabled));
    }
}
