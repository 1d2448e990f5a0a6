//! OpenRouter chat-completions translator

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use luminous_core::config::TranslationSettings;
use luminous_core::ConfigError;

use crate::translate::{TranslateError, TranslationRequest, Translator};

const SYSTEM_PROMPT: &str = "You translate verses of the Quran from Arabic into clear, faithful \
modern English. Reply with the translation only: no commentary, no verse numbers, \
no quotation marks.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenRouter client
pub struct OpenRouterTranslator {
    http: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenRouterTranslator {
    pub fn from_settings(
        settings: &TranslationSettings,
        http: Client,
    ) -> Result<Self, ConfigError> {
        let api_key = settings.api_key.clone().ok_or(ConfigError::Missing {
            key: "OPENROUTER_API_KEY",
        })?;
        Ok(Self {
            http,
            api_key,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn user_prompt(request: &TranslationRequest) -> String {
    format!(
        "Translate Surah {}, verse {}:\n\n{}",
        request.surah, request.verse, request.verse_text
    )
}

/// First non-empty choice, trimmed.
fn extract_translation(response: ChatResponse) -> Result<String, TranslateError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .ok_or(TranslateError::Empty)
}

#[async_trait]
impl Translator for OpenRouterTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslateError> {
        let prompt = user_prompt(request);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.2,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("X-Title", "Luminous Verses")
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslateError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(
                %status,
                body = %detail,
                model = %self.model,
                "OpenRouter rejected request"
            );
            return Err(TranslateError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::Transport(e.without_url().to_string()))?;
        extract_translation(parsed)
    }
}
