use std::time::Duration;

use tracing::debug;

use crate::http::agent_with_timeout;
use crate::{BackendError, SummarizeError};

use super::{Backend, BackendParams, SummaryRequest, Summarizer, chat};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:1234/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Locally hosted OpenAI-compatible server (LM Studio, llama.cpp, vLLM).
pub struct GptOssSummarizer {
    model: String,
    base_url: String,
    api_key: Option<String>,
    agent: ureq::Agent,
}

impl GptOssSummarizer {
    pub fn new(params: &BackendParams) -> Result<Self, SummarizeError> {
        params.validate(Backend::GptOss.id())?;
        Ok(Self {
            model: params.model.trim().to_string(),
            base_url: params.base_url_or(DEFAULT_BASE_URL),
            api_key: params.api_key(),
            agent: agent_with_timeout(params.timeout_or(DEFAULT_TIMEOUT)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        self.api_key
            .iter()
            .map(|key| ("Authorization", format!("Bearer {key}")))
            .collect()
    }

    fn fail(source: BackendError) -> SummarizeError {
        SummarizeError::backend(Backend::GptOss.id(), source)
    }
}

impl Summarizer for GptOssSummarizer {
    fn name(&self) -> &'static str {
        Backend::GptOss.id()
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn default_temperature(&self) -> f64 {
        DEFAULT_TEMPERATURE
    }

    fn summarize(&mut self, request: &SummaryRequest) -> Result<String, SummarizeError> {
        let temperature = request.temperature_or(DEFAULT_TEMPERATURE);
        let body = chat::chat_completion_body(&self.model, &request.user_prompt(), temperature);
        let url = format!("{}/chat/completions", self.base_url);
        debug!(provider = self.name(), model = %self.model, %url, temperature, "summarize request");

        let raw = chat::post_json(&self.agent, &url, &self.headers(), &body).map_err(Self::fail)?;
        let content = chat::parse_chat_completion(raw.trim()).map_err(Self::fail)?;
        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_endpoint_without_auth() {
        let summarizer = GptOssSummarizer::new(&BackendParams::new("gpt-oss-20b")).unwrap();
        assert_eq!(summarizer.base_url(), "http://127.0.0.1:1234/v1");
        assert!(summarizer.headers().is_empty());
    }

    #[test]
    fn api_key_adds_bearer_header() {
        let summarizer =
            GptOssSummarizer::new(&BackendParams::new("gpt-oss-20b").with_api_key("local-key"))
                .unwrap();
        assert_eq!(
            summarizer.headers(),
            vec![("Authorization", "Bearer local-key".to_string())]
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let params = BackendParams::new("gpt-oss-20b").with_timeout(Duration::ZERO);
        assert!(matches!(
            GptOssSummarizer::new(&params),
            Err(SummarizeError::ProviderImplementation { .. })
        ));
    }
}
