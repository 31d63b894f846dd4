use std::time::Duration;

use tracing::debug;

use crate::http::agent_with_timeout;
use crate::{BackendError, SummarizeError};

use super::{Backend, BackendParams, SummaryRequest, Summarizer, chat};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Hosted OpenAI chat completions.
pub struct OpenAiSummarizer {
    model: String,
    base_url: String,
    api_key: Option<String>,
    agent: ureq::Agent,
}

impl OpenAiSummarizer {
    pub fn new(params: &BackendParams) -> Result<Self, SummarizeError> {
        params.validate(Backend::OpenAi.id())?;
        Ok(Self {
            model: params.model.trim().to_string(),
            base_url: params.base_url_or(DEFAULT_BASE_URL),
            api_key: params.api_key(),
            agent: agent_with_timeout(params.timeout_or(DEFAULT_TIMEOUT)),
        })
    }

    fn build_request_body(&self, prompt: &str, temperature: f64) -> serde_json::Value {
        chat::chat_completion_body(&self.model, prompt, temperature)
    }

    fn fail(source: BackendError) -> SummarizeError {
        SummarizeError::backend(Backend::OpenAi.id(), source)
    }
}

impl Summarizer for OpenAiSummarizer {
    fn name(&self) -> &'static str {
        Backend::OpenAi.id()
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn default_temperature(&self) -> f64 {
        DEFAULT_TEMPERATURE
    }

    fn summarize(&mut self, request: &SummaryRequest) -> Result<String, SummarizeError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Self::fail(BackendError::MissingCredential("OPENAI_API_KEY".into())))?;

        let temperature = request.temperature_or(DEFAULT_TEMPERATURE);
        let body = self.build_request_body(&request.user_prompt(), temperature);
        let url = format!("{}/chat/completions", self.base_url);
        debug!(provider = self.name(), model = %self.model, %url, temperature, "summarize request");

        let headers = [("Authorization", format!("Bearer {api_key}"))];
        let raw = chat::post_json(&self.agent, &url, &headers, &body).map_err(Self::fail)?;
        let content = chat::parse_chat_completion(raw.trim()).map_err(Self::fail)?;
        Ok(content.trim().to_string())
    }
}
