use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::http::agent_with_timeout;
use crate::prompt::SYSTEM_PROMPT;
use crate::{BackendError, SummarizeError};

use super::{Backend, BackendParams, SummaryRequest, Summarizer, chat};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Hosted Anthropic Messages API.
pub struct AnthropicSummarizer {
    model: String,
    base_url: String,
    api_key: Option<String>,
    agent: ureq::Agent,
}

impl AnthropicSummarizer {
    pub fn new(params: &BackendParams) -> Result<Self, SummarizeError> {
        params.validate(Backend::Anthropic.id())?;
        Ok(Self {
            model: params.model.trim().to_string(),
            base_url: params.base_url_or(DEFAULT_BASE_URL),
            api_key: params.api_key(),
            agent: agent_with_timeout(params.timeout_or(DEFAULT_TIMEOUT)),
        })
    }

    fn build_request_body(&self, prompt: &str, temperature: f64) -> serde_json::Value {
        json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": SYSTEM_PROMPT,
            "messages": [
                {"role": "user", "content": prompt},
            ],
            "temperature": temperature,
        })
    }

    fn parse_response(body: &str) -> Result<String, BackendError> {
        let response: MessageResponse = serde_json::from_str(body)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        if response.content.is_empty() {
            return Err(BackendError::InvalidResponse("no content blocks".into()));
        }
        let texts: Vec<String> = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();
        if texts.is_empty() {
            return Err(BackendError::InvalidResponse("no text content".into()));
        }
        Ok(texts.concat())
    }

    fn fail(source: BackendError) -> SummarizeError {
        SummarizeError::backend(Backend::Anthropic.id(), source)
    }
}

impl Summarizer for AnthropicSummarizer {
    fn name(&self) -> &'static str {
        Backend::Anthropic.id()
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn default_temperature(&self) -> f64 {
        DEFAULT_TEMPERATURE
    }

    fn summarize(&mut self, request: &SummaryRequest) -> Result<String, SummarizeError> {
        let api_key = self.api_key.clone().ok_or_else(|| {
            Self::fail(BackendError::MissingCredential("ANTHROPIC_API_KEY".into()))
        })?;

        let temperature = request.temperature_or(DEFAULT_TEMPERATURE);
        let body = self.build_request_body(&request.user_prompt(), temperature);
        let url = format!("{}/messages", self.base_url);
        debug!(provider = self.name(), model = %self.model, %url, temperature, "summarize request");

        let headers = [
            ("x-api-key", api_key),
            ("anthropic-version", ANTHROPIC_VERSION.to_string()),
        ];
        let raw = chat::post_json(&self.agent, &url, &headers, &body).map_err(Self::fail)?;
        let content = Self::parse_response(raw.trim()).map_err(Self::fail)?;
        Ok(content.trim().to_string())
    }
}

#[derive(Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}
