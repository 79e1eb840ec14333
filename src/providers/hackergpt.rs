use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Provider, ProviderError, http_client};
use crate::config::HackerGptSettings;

const NO_ANSWER: &str = "لا يوجد رد";

pub struct HackerGptClient {
    settings: HackerGptSettings,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    text: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ApiResponse {
    response: Option<String>,
}

impl HackerGptClient {
    pub fn new(settings: HackerGptSettings) -> reqwest::Result<Self> {
        let http = http_client(settings.timeout_secs)?;
        Ok(Self { settings, http })
    }
}

#[async_trait]
impl Provider for HackerGptClient {
    fn name(&self) -> &'static str {
        "hackergpt"
    }

    fn label(&self) -> &'static str {
        "HackerGPT"
    }

    async fn answer(&self, query: &str) -> Result<String, ProviderError> {
        let request = ApiRequest {
            text: query,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let response = self
            .http
            .post(&self.settings.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = response.status();
        debug!("HackerGPT response status: {status}");
        // Anything other than a plain 200 is a failure
        if status != reqwest::StatusCode::OK {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(parsed.response.unwrap_or_else(|| NO_ANSWER.to_string()))
    }
}
