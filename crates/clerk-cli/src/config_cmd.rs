use crate::config::{Config, ConfigError, ConfigPaths};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Print config with secrets redacted
    #[arg(long)]
    pub print: bool,

    /// Set a config value (dotted key=value)
    #[arg(long, value_name = "key=value")]
    pub set: Vec<String>,
}

pub fn run(args: &ConfigArgs, paths: &ConfigPaths) -> Result<(), ConfigError> {
    let mut config = Config::load_or_create(paths)?;

    if !args.set.is_empty() {
        for assignment in &args.set {
            apply_set(&mut config, assignment)?;
        }
        config.validate()?;
        Config::write(paths, &config)?;
    }

    if args.print || args.set.is_empty() {
        let redacted = config.redacted();
        let output = toml::to_string_pretty(&redacted)?;
        println!("{output}");
    }

    Ok(())
}

fn apply_set(config: &mut Config, assignment: &str) -> Result<(), ConfigError> {
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| ConfigError::Validation("expected key=value for --set".into()))?;
    let key = key.trim();
    let value = value.trim();

    if let Some((table, provider)) = key.split_once(".api_keys.") {
        return set_map_entry(table, provider, value, |c| &mut c.summarize.api_keys, config);
    }
    if let Some((table, provider)) = key.split_once(".base_urls.") {
        return set_map_entry(table, provider, value, |c| &mut c.summarize.base_urls, config);
    }
    if let Some((table, model)) = key.split_once(".models.") {
        return set_map_entry(table, model, value, |c| &mut c.summarize.models, config);
    }

    match key {
        "transcribe.provider" => config.transcribe.provider = value.to_string(),
        "transcribe.model" => config.transcribe.model = value.to_string(),
        "transcribe.api_key" => config.transcribe.api_key = value.to_string(),
        "transcribe.base_url" => config.transcribe.base_url = value.to_string(),
        "transcribe.language" => config.transcribe.language = value.to_string(),
        "summarize.model" => config.summarize.model = value.to_string(),
        "summarize.temperature" => config.summarize.temperature = parse_f64(value, key)?,
        "summarize.style" => config.summarize.style = value.to_string(),
        "summarize.language" => config.summarize.language = value.to_string(),
        "summarize.timeout_secs" => config.summarize.timeout_secs = parse_u64(value, key)?,
        "chunk.minutes" => {
            let parsed = parse_u32(value, key)?;
            if parsed == 0 {
                return Err(ConfigError::Validation(
                    "chunk.minutes must be greater than 0".into(),
                ));
            }
            config.chunk.minutes = parsed;
        }
        "chunk.dir" => config.chunk.dir = value.to_string(),
        _ => {
            return Err(ConfigError::Validation(format!(
                "unknown config key: {key}"
            )));
        }
    }
    Ok(())
}

/// Set or, with an empty value, remove an entry of a `[summarize.*]` table.
fn set_map_entry<F>(
    table: &str,
    entry: &str,
    value: &str,
    select: F,
    config: &mut Config,
) -> Result<(), ConfigError>
where
    F: FnOnce(&mut Config) -> &mut std::collections::BTreeMap<String, String>,
{
    if table != "summarize" || entry.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "unknown config key: {table}.{entry}"
        )));
    }
    let map = select(config);
    if value.is_empty() {
        map.remove(entry);
    } else {
        map.insert(entry.to_string(), value.to_string());
    }
    Ok(())
}

fn parse_u32(value: &str, key: &str) -> Result<u32, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{key} expects an unsigned integer")))
}

fn parse_u64(value: &str, key: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{key} expects an unsigned integer")))
}

fn parse_f64(value: &str, key: &str) -> Result<f64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{key} expects a number")))
}

#[cfg(test)]
mod tests {
    use super::apply_set;
    use crate::config::Config;

    #[test]
    fn set_updates_scalar_fields() {
        let mut config = Config::default();
        apply_set(&mut config, "summarize.model=claude-3-opus").unwrap();
        apply_set(&mut config, "summarize.temperature = 0.7").unwrap();
        apply_set(&mut config, "chunk.minutes=10").unwrap();
        apply_set(&mut config, "transcribe.language=ja").unwrap();
        assert_eq!(config.summarize.model, "claude-3-opus");
        assert_eq!(config.summarize.temperature, 0.7);
        assert_eq!(config.chunk.minutes, 10);
        assert_eq!(config.transcribe.language, "ja");
    }

    #[test]
    fn set_adds_and_removes_map_entries() {
        let mut config = Config::default();
        apply_set(&mut config, "summarize.api_keys.anthropic=ak-1").unwrap();
        apply_set(&mut config, "summarize.models.llama-3-70b=gptoss").unwrap();
        assert_eq!(config.summarize.api_keys["anthropic"], "ak-1");
        assert_eq!(config.summarize.models["llama-3-70b"], "gptoss");

        apply_set(&mut config, "summarize.api_keys.anthropic=").unwrap();
        assert!(config.summarize.api_keys.is_empty());
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut config = Config::default();
        assert!(apply_set(&mut config, "summarize.model").is_err());
        assert!(apply_set(&mut config, "chunk.minutes=0").is_err());
        assert!(apply_set(&mut config, "summarize.temperature=warm").is_err());
        let err = apply_set(&mut config, "ui.theme=dark").unwrap_err();
        assert!(err.to_string().contains("unknown config key"));
    }
}
