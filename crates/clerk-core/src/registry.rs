use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::SummarizeError;

/// Built-in model to provider table.
const BUILTIN_MODELS: &[(&str, &str)] = &[
    ("gpt-4o-mini", "openai"),
    ("gpt-4o", "openai"),
    ("gpt-oss-20b", "gptoss"),
    ("gpt-oss-13b", "gptoss"),
    ("claude-3-haiku", "anthropic"),
    ("claude-3-opus", "anthropic"),
];

static BUILTIN: LazyLock<ProviderRegistry> = LazyLock::new(ProviderRegistry::builtin);

/// Maps model identifiers to the provider that serves them.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    models: BTreeMap<String, String>,
}

impl ProviderRegistry {
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_MODELS.iter().copied())
    }

    pub fn from_entries<I, M, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (M, P)>,
        M: Into<String>,
        P: Into<String>,
    {
        Self::default().with_entries(entries)
    }

    /// Extend the table; a later entry for the same model replaces the earlier one.
    pub fn with_entries<I, M, P>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (M, P)>,
        M: Into<String>,
        P: Into<String>,
    {
        for (model, provider) in entries {
            self.models.insert(model.into(), provider.into());
        }
        self
    }

    pub fn resolve(&self, model: &str) -> Result<&str, SummarizeError> {
        self.models
            .get(model)
            .map(String::as_str)
            .ok_or_else(|| SummarizeError::UnknownModel(model.to_string()))
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    /// Entries in model-name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.models
            .iter()
            .map(|(model, provider)| (model.as_str(), provider.as_str()))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Resolve a model against the built-in table.
pub fn resolve(model: &str) -> Result<&'static str, SummarizeError> {
    BUILTIN.resolve(model)
}
