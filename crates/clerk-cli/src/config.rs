use clerk_core::summarize::Backend;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const CONFIG_VERSION: u32 = 1;
const TRANSCRIBE_PROVIDERS: [&str; 3] = ["openai", "groq", "whisper"];

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("home directory not found; set HOME or CLERK_HOME")]
    HomeMissing,
    #[error("config io error: {0}")]
    Io(#[from] io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub base_dir: PathBuf,
    pub config_path: PathBuf,
}

impl ConfigPaths {
    pub fn from_home() -> Result<Self, ConfigError> {
        if let Some(base) = std::env::var_os("CLERK_HOME").filter(|value| !value.is_empty()) {
            return Ok(Self::from_base(PathBuf::from(base)));
        }
        let home = std::env::var("HOME").map_err(|_| ConfigError::HomeMissing)?;
        Ok(Self::from_base(PathBuf::from(home).join(".clerk")))
    }

    pub fn from_base(base_dir: PathBuf) -> Self {
        let config_path = base_dir.join("config.toml");
        Self {
            base_dir,
            config_path,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub transcribe: TranscribeConfig,
    pub summarize: SummarizeConfig,
    pub chunk: ChunkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            transcribe: TranscribeConfig::default(),
            summarize: SummarizeConfig::default(),
            chunk: ChunkConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscribeConfig {
    pub provider: String,
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    /// ISO-639-1 spoken language hint; empty lets the provider detect it.
    pub language: String,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "whisper-1".to_string(),
            api_key: String::new(),
            base_url: String::new(),
            language: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizeConfig {
    pub model: String,
    pub temperature: f64,
    pub style: String,
    pub language: String,
    /// Request timeout in seconds; 0 keeps each backend's default.
    pub timeout_secs: u64,
    pub api_keys: BTreeMap<String, String>,
    pub base_urls: BTreeMap<String, String>,
    /// Extra model -> provider mappings layered over the built-in table.
    pub models: BTreeMap<String, String>,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            style: String::new(),
            language: String::new(),
            timeout_secs: 0,
            api_keys: BTreeMap::new(),
            base_urls: BTreeMap::new(),
            models: BTreeMap::new(),
        }
    }
}

impl SummarizeConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    pub minutes: u32,
    pub dir: String,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            minutes: 5,
            dir: "chunk".to_string(),
        }
    }
}

impl Config {
    pub fn load_or_create(paths: &ConfigPaths) -> Result<Self, ConfigError> {
        fs::create_dir_all(&paths.base_dir)?;
        if paths.config_path.exists() {
            return Self::load(paths);
        }

        let config = Self::default();
        Self::write(paths, &config)?;
        Ok(config)
    }

    pub fn load(paths: &ConfigPaths) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&paths.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.version < CONFIG_VERSION {
            config.version = CONFIG_VERSION;
            Self::write(paths, &config)?;
        } else if config.version > CONFIG_VERSION {
            warn!(
                file_version = config.version,
                supported = CONFIG_VERSION,
                "config version is newer than supported; proceeding"
            );
        }

        warn_if_loose_permissions(&paths.config_path)?;
        Ok(config)
    }

    pub fn write(paths: &ConfigPaths, config: &Config) -> Result<(), ConfigError> {
        fs::create_dir_all(&paths.base_dir)?;
        let content = toml::to_string_pretty(config)?;
        write_atomic(&paths.config_path, content.as_bytes())?;
        Ok(())
    }

    /// Layer environment values over the file. Blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(model) = env("LLM_MODEL") {
            self.summarize.model = model;
        }
        if let Some(key) = env("OPENAI_API_KEY") {
            if self.transcribe.provider == "openai" {
                self.transcribe.api_key = key.clone();
            }
            self.summarize.api_keys.insert("openai".into(), key);
        }
        if let Some(key) = env("ANTHROPIC_API_KEY") {
            self.summarize.api_keys.insert("anthropic".into(), key);
        }
        if let Some(url) = env("GPT_OSS_BASE_URL") {
            self.summarize.base_urls.insert("gptoss".into(), url);
        }
        if self.transcribe.provider == "groq" {
            if let Some(key) = env("GROQ_API_KEY") {
                self.transcribe.api_key = key;
            }
        }
        if self.transcribe.provider == "whisper" {
            if let Some(model) = env("WHISPER_MODEL") {
                self.transcribe.model = model;
            }
        }
    }

    pub fn redacted(&self) -> Self {
        let mut redacted = self.clone();
        redact(&mut redacted.transcribe.api_key);
        for key in redacted.summarize.api_keys.values_mut() {
            redact(key);
        }
        redacted
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let provider = self.transcribe.provider.as_str();
        if !TRANSCRIBE_PROVIDERS.contains(&provider) {
            return Err(ConfigError::Validation(format!(
                "transcribe.provider must be openai, groq or whisper (got {provider})"
            )));
        }
        if provider == "whisper"
            && !self.transcribe.model.trim().is_empty()
            && !Path::new(&self.transcribe.model).exists()
        {
            return Err(ConfigError::Validation(format!(
                "transcribe.model path not found: {}",
                self.transcribe.model
            )));
        }

        if self.summarize.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "summarize.model must not be empty".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.summarize.temperature) {
            return Err(ConfigError::Validation(
                "summarize.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        validate_provider_keys("summarize.api_keys", self.summarize.api_keys.keys())?;
        validate_provider_keys("summarize.base_urls", self.summarize.base_urls.keys())?;
        for (model, provider) in &self.summarize.models {
            if model.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "summarize.models entries must name a model".into(),
                ));
            }
            if Backend::from_id(provider).is_none() {
                return Err(ConfigError::Validation(format!(
                    "summarize.models.{model} maps to unknown provider {provider}"
                )));
            }
        }

        if self.chunk.minutes == 0 {
            return Err(ConfigError::Validation(
                "chunk.minutes must be greater than 0".into(),
            ));
        }
        if self.chunk.dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "chunk.dir must not be empty".into(),
            ));
        }

        Ok(())
    }
}

fn validate_provider_keys<'a>(
    label: &str,
    providers: impl Iterator<Item = &'a String>,
) -> Result<(), ConfigError> {
    for provider in providers {
        if Backend::from_id(provider).is_none() {
            return Err(ConfigError::Validation(format!(
                "{label} has unknown provider {provider}"
            )));
        }
    }
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ConfigError> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::other("config path missing parent directory"))?;
    let tmp_path = parent.join("config.toml.tmp");
    fs::write(&tmp_path, contents)?;
    set_strict_permissions(&tmp_path)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn set_strict_permissions(path: &Path) -> Result<(), ConfigError> {
    #[cfg(unix)]
    {
        let perm = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perm)?;
    }
    Ok(())
}

fn warn_if_loose_permissions(path: &Path) -> Result<(), ConfigError> {
    #[cfg(unix)]
    {
        let metadata = fs::metadata(path)?;
        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            warn!(
                path = %path.display(),
                "config file is group/world readable; set permissions to 0600"
            );
        }
    }
    Ok(())
}

fn redact(value: &mut String) {
    if !value.trim().is_empty() {
        *value = "<redacted>".to_string();
    }
}
