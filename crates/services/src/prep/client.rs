use std::env;

use async_trait::async_trait;
use prep_core::model::Question;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AnswerClientError;
use crate::prep::prompts;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 10_000;

/// Prompt pair sent for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl AnswerRequest {
    #[must_use]
    pub fn for_question(question: &Question) -> Self {
        Self {
            system_prompt: prompts::system_prompt(&question.tags).to_owned(),
            user_prompt: prompts::user_prompt(question),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAnswer {
    pub text: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// Anything that can turn a prompt pair into an answer.
#[async_trait]
pub trait AnswerClient: Send + Sync {
    /// Generate one answer.
    ///
    /// # Errors
    ///
    /// Returns `AnswerClientError` when the backend is unavailable or replies
    /// without content.
    async fn generate(&self, request: &AnswerRequest) -> Result<GeneratedAnswer, AnswerClientError>;
}

#[derive(Clone, Debug)]
pub struct ChatCompletionsConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl ChatCompletionsConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("OPENROUTER_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("PREP_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("PREP_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    config: Option<ChatCompletionsConfig>,
}

impl ChatCompletionsClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ChatCompletionsConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ChatCompletionsConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Override the configured model, if the client is enabled.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        if let Some(config) = self.config.as_mut() {
            config.model = model.into();
        }
        self
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.config.as_ref().map(|config| config.model.as_str())
    }
}

#[async_trait]
impl AnswerClient for ChatCompletionsClient {
    async fn generate(&self, request: &AnswerRequest) -> Result<GeneratedAnswer, AnswerClientError> {
        let config = self
            .config
            .as_ref()
            .ok_or(AnswerClientError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: request.user_prompt.clone(),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnswerClientError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let usage = body.usage.map(|usage| TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        });
        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AnswerClientError::EmptyResponse)?;

        Ok(GeneratedAnswer {
            text: text.trim().to_string(),
            model: config.model.clone(),
            usage,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}
