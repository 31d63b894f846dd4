pub mod anthropic;
mod chat;
pub mod gptoss;
pub mod openai;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::warn;

use crate::SummarizeError;
use crate::prompt::build_user_prompt;

const TEMPERATURE_KEY: &str = "temperature";

/// Summarize backend abstraction.
pub trait Summarizer: Send {
    /// Provider identifier this instance serves.
    fn name(&self) -> &'static str;
    fn model(&self) -> &str;
    /// Temperature sent when the request carries none.
    fn default_temperature(&self) -> f64;
    fn summarize(&mut self, request: &SummaryRequest) -> Result<String, SummarizeError>;
}

/// Free-form per-request options. Only `temperature` is interpreted; other
/// keys are carried and ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryOptions {
    values: Map<String, Value>,
}

impl SummaryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.insert(TEMPERATURE_KEY, temperature);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn temperature(&self) -> Option<f64> {
        match self.values.get(TEMPERATURE_KEY)? {
            Value::Number(number) => number.as_f64(),
            other => {
                warn!(value = %other, "ignoring non-numeric temperature option");
                None
            }
        }
    }
}

impl From<Map<String, Value>> for SummaryOptions {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

/// One summarize call: transcript text plus optional directives.
#[derive(Debug, Clone, Default)]
pub struct SummaryRequest {
    pub text: String,
    pub style: Option<String>,
    pub language: Option<String>,
    pub options: Option<SummaryOptions>,
}

impl SummaryRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_options(mut self, options: SummaryOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn user_prompt(&self) -> String {
        build_user_prompt(
            &self.text,
            self.style.as_deref(),
            self.language.as_deref(),
        )
    }

    /// Requested temperature, or `default` when the options carry none.
    pub fn temperature_or(&self, default: f64) -> f64 {
        self.options
            .as_ref()
            .and_then(SummaryOptions::temperature)
            .unwrap_or(default)
    }
}

/// Construction parameters handed to a backend constructor.
#[derive(Clone, Default)]
pub struct BackendParams {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl BackendParams {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub(crate) fn base_url_or(&self, default: &str) -> String {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    pub(crate) fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }

    pub(crate) fn validate(&self, provider: &str) -> Result<(), SummarizeError> {
        if self.model.trim().is_empty() {
            return Err(SummarizeError::ProviderImplementation {
                provider: provider.to_string(),
                reason: "model name must not be empty".into(),
            });
        }
        if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(SummarizeError::ProviderImplementation {
                provider: provider.to_string(),
                reason: "timeout must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for BackendParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendParams")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Known backend families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    OpenAi,
    GptOss,
    Anthropic,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::OpenAi, Backend::GptOss, Backend::Anthropic];

    pub fn id(self) -> &'static str {
        match self {
            Backend::OpenAi => "openai",
            Backend::GptOss => "gptoss",
            Backend::Anthropic => "anthropic",
        }
    }

    pub fn from_id(provider: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|backend| backend.id().eq_ignore_ascii_case(provider.trim()))
    }

    fn create(self, params: &BackendParams) -> Result<Box<dyn Summarizer>, SummarizeError> {
        match self {
            Backend::OpenAi => Ok(Box::new(openai::OpenAiSummarizer::new(params)?)),
            Backend::GptOss => Ok(Box::new(gptoss::GptOssSummarizer::new(params)?)),
            Backend::Anthropic => Ok(Box::new(anthropic::AnthropicSummarizer::new(params)?)),
        }
    }
}

type Constructor =
    Box<dyn Fn(&BackendParams) -> Result<Box<dyn Summarizer>, SummarizeError> + Send + Sync>;

/// Fixed mapping from provider identifier to adapter constructor.
pub struct SummarizerFactory {
    constructors: BTreeMap<String, Constructor>,
}

impl SummarizerFactory {
    /// A factory with no providers registered.
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut factory = Self::empty();
        for backend in Backend::ALL {
            factory.register(backend.id(), move |params| backend.create(params));
        }
        factory
    }

    /// Register (or replace) the constructor for a provider.
    pub fn register<F>(&mut self, provider: &str, constructor: F) -> &mut Self
    where
        F: Fn(&BackendParams) -> Result<Box<dyn Summarizer>, SummarizeError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors
            .insert(provider_key(provider), Box::new(constructor));
        self
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn build(
        &self,
        provider: &str,
        params: &BackendParams,
    ) -> Result<Box<dyn Summarizer>, SummarizeError> {
        let key = provider_key(provider);
        let constructor = self
            .constructors
            .get(&key)
            .ok_or_else(|| SummarizeError::UnknownProvider(provider.to_string()))?;

        let summarizer = constructor(params).map_err(|err| match err {
            err @ SummarizeError::ProviderImplementation { .. } => err,
            other => SummarizeError::ProviderImplementation {
                provider: key.clone(),
                reason: format!("construction failed: {other}"),
            },
        })?;

        if summarizer.name() != key {
            return Err(SummarizeError::ProviderImplementation {
                provider: key,
                reason: format!(
                    "constructor returned a summarizer for {}",
                    summarizer.name()
                ),
            });
        }

        Ok(summarizer)
    }
}

impl Default for SummarizerFactory {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for SummarizerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizerFactory")
            .field("providers", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn provider_key(provider: &str) -> String {
    provider.trim().to_ascii_lowercase()
}

/// Build a summarizer for `provider` from the built-in backends.
pub fn create_summarizer(
    provider: &str,
    params: &BackendParams,
) -> Result<Box<dyn Summarizer>, SummarizeError> {
    SummarizerFactory::builtin().build(provider, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BackendError;

    struct EchoSummarizer {
        name: &'static str,
        model: String,
    }

    impl Summarizer for EchoSummarizer {
        fn name(&self) -> &'static str {
            self.name
        }

        fn model(&self) -> &str {
            &self.model
        }

        fn default_temperature(&self) -> f64 {
            0.5
        }

        fn summarize(&mut self, request: &SummaryRequest) -> Result<String, SummarizeError> {
            Ok(request.text.trim().to_string())
        }
    }

    fn echo(
        name: &'static str,
        params: &BackendParams,
    ) -> Result<Box<dyn Summarizer>, SummarizeError> {
        Ok(Box::new(EchoSummarizer {
            name,
            model: params.model.clone(),
        }))
    }

    #[test]
    fn build_unknown_provider_names_it() {
        let factory = SummarizerFactory::builtin();
        match factory.build("vendor1", &BackendParams::new("model-a")) {
            Err(SummarizeError::UnknownProvider(provider)) => assert_eq!(provider, "vendor1"),
            Err(other) => panic!("expected UnknownProvider, got {other:?}"),
            Ok(_) => panic!("expected UnknownProvider"),
        }
    }

    #[test]
    fn builtin_factory_builds_every_backend() {
        let factory = SummarizerFactory::builtin();
        for backend in Backend::ALL {
            let summarizer = factory
                .build(backend.id(), &BackendParams::new("some-model"))
                .unwrap();
            assert_eq!(summarizer.name(), backend.id());
            assert_eq!(summarizer.model(), "some-model");
        }
    }

    #[test]
    fn provider_lookup_ignores_case() {
        let summarizer = create_summarizer("OpenAI", &BackendParams::new("gpt-4o")).unwrap();
        assert_eq!(summarizer.name(), "openai");
        assert_eq!(Backend::from_id(" GPTOSS "), Some(Backend::GptOss));
        assert_eq!(Backend::from_id("vendor1"), None);
    }

    #[test]
    fn empty_model_is_rejected_by_the_constructor() {
        match create_summarizer("gptoss", &BackendParams::new("  ")) {
            Err(SummarizeError::ProviderImplementation { provider, reason }) => {
                assert_eq!(provider, "gptoss");
                assert!(reason.contains("model"));
            }
            Err(other) => panic!("expected ProviderImplementation, got {other:?}"),
            Ok(_) => panic!("expected ProviderImplementation"),
        }
    }

    #[test]
    fn constructor_failures_are_reported_as_implementation_errors() {
        let mut factory = SummarizerFactory::empty();
        factory.register("broken", |_| {
            Err(SummarizeError::backend(
                "broken",
                BackendError::Network("unreachable".into()),
            ))
        });
        match factory.build("broken", &BackendParams::new("m")) {
            Err(SummarizeError::ProviderImplementation { provider, reason }) => {
                assert_eq!(provider, "broken");
                assert!(reason.contains("construction failed"));
            }
            Err(other) => panic!("expected ProviderImplementation, got {other:?}"),
            Ok(_) => panic!("expected ProviderImplementation"),
        }
    }

    #[test]
    fn miswired_constructor_is_rejected() {
        let mut factory = SummarizerFactory::empty();
        factory.register("vendor2", |params| echo("vendor1", params));
        match factory.build("vendor2", &BackendParams::new("m")) {
            Err(SummarizeError::ProviderImplementation { provider, reason }) => {
                assert_eq!(provider, "vendor2");
                assert!(reason.contains("vendor1"));
            }
            Err(other) => panic!("expected ProviderImplementation, got {other:?}"),
            Ok(_) => panic!("expected ProviderImplementation"),
        }
    }

    #[test]
    fn registered_substitute_backend_is_usable() {
        let mut factory = SummarizerFactory::builtin();
        factory.register("echo", |params| echo("echo", params));
        let mut summarizer = factory.build("echo", &BackendParams::new("m")).unwrap();
        let summary = summarizer
            .summarize(&SummaryRequest::new("  hello  "))
            .unwrap();
        assert_eq!(summary, "hello");
        assert!(factory.providers().any(|provider| provider == "openai"));
    }

    #[test]
    fn options_temperature_falls_back_to_default() {
        let request = SummaryRequest::new("text");
        assert_eq!(request.temperature_or(0.2), 0.2);

        let request = SummaryRequest::new("text").with_options(SummaryOptions::new());
        assert_eq!(request.temperature_or(0.2), 0.2);

        let request =
            SummaryRequest::new("text").with_options(SummaryOptions::new().with_temperature(0.7));
        assert_eq!(request.temperature_or(0.2), 0.7);
    }

    #[test]
    fn options_ignore_unknown_keys_and_bad_temperature() {
        let mut options = SummaryOptions::new();
        options.insert("top_p", 0.9);
        options.insert("temperature", "hot");
        assert_eq!(options.temperature(), None);
        assert_eq!(options.get("top_p"), Some(&Value::from(0.9)));

        let request = SummaryRequest::new("text").with_options(options);
        assert_eq!(request.temperature_or(0.2), 0.2);
    }

    #[test]
    fn backend_params_debug_redacts_api_key() {
        let params = BackendParams::new("gpt-4o").with_api_key("sk-secret");
        let debug = format!("{params:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn backend_params_normalize_base_url() {
        let params = BackendParams::new("m").with_base_url("http://localhost:1234/v1/");
        assert_eq!(params.base_url_or("unused"), "http://localhost:1234/v1");
        let params = BackendParams::new("m").with_base_url("   ");
        assert_eq!(params.base_url_or("http://default"), "http://default");
    }
}
