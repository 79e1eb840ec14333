//! OpenAI chat completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Provider, ProviderError, http_client};
use crate::bot::writing::Composer;
use crate::config::OpenAiSettings;

const RESEARCH_SYSTEM_PROMPT: &str = "You are a helpful research assistant.";

pub struct OpenAiClient {
    api_key: Option<String>,
    settings: OpenAiSettings,
    http: reqwest::Client,
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    System,
    User,
}

impl Role {
    fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, settings: OpenAiSettings) -> reqwest::Result<Self> {
        let http = http_client(settings.timeout_secs)?;
        Ok(Self { api_key, settings, http })
    }

    pub async fn chat(&self, messages: &[Message], max_tokens: u32) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingKey("OPENAI_API_KEY"))?;

        let request = ApiRequest {
            model: &self.settings.model,
            messages: messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: self.settings.temperature,
            max_tokens,
        };

        let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = response.status();
        debug!("OpenAI response status: {status}");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("{status}: {body}")));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::Empty)
    }
}

#[async_trait]
impl Provider for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn label(&self) -> &'static str {
        "OpenAI"
    }

    async fn answer(&self, query: &str) -> Result<String, ProviderError> {
        let messages = [
            Message {
                role: Role::System,
                content: RESEARCH_SYSTEM_PROMPT.to_string(),
            },
            Message {
                role: Role::User,
                content: query.to_string(),
            },
        ];
        self.chat(&messages, self.settings.max_tokens).await
    }
}

#[async_trait]
impl Composer for OpenAiClient {
    async fn compose(&self, prompt: &str) -> Result<String, ProviderError> {
        let messages = [Message {
            role: Role::System,
            content: prompt.to_string(),
        }];
        self.chat(&messages, self.settings.writing_max_tokens).await
    }
}
