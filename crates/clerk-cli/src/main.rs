mod config;
mod config_cmd;
mod models_cmd;

use clap::{Parser, Subcommand, ValueEnum};
use clerk_core::pipeline::{Pipeline, ProviderSettings, SummaryPlan};
use clerk_core::registry::ProviderRegistry;
use clerk_core::summarize::SummarizerFactory;
use clerk_core::transcribe::{TranscriberParams, create_transcriber};
use clerk_core::{PipelineError, SummarizeError};
use config::{Config, ConfigPaths};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "clerk",
    version,
    about = "transcribe a recording and summarize it",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show or edit the config file
    Config(config_cmd::ConfigArgs),
    /// List supported summarize models and their providers
    Models,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SummarizeMode {
    Yes,
    None,
}

#[derive(Parser, Debug, Clone)]
struct RunArgs {
    /// Audio file to transcribe
    #[arg(long, required = true)]
    input: Option<PathBuf>,

    #[arg(long, default_value = "transcript.txt")]
    transcript_output: PathBuf,

    #[arg(long, default_value = "summary.txt")]
    summary_output: PathBuf,

    /// Whether to summarize the transcript
    #[arg(long, value_enum, default_value_t = SummarizeMode::Yes)]
    summarize: SummarizeMode,

    /// Chunk length in minutes
    #[arg(long, value_name = "minutes")]
    chunk_minutes: Option<u32>,

    /// Directory chunk files are written to
    #[arg(long, value_name = "dir")]
    chunk_dir: Option<PathBuf>,

    /// Summarize model
    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    temperature: Option<f64>,

    /// Summary style, e.g. "bullet points"
    #[arg(long)]
    style: Option<String>,

    /// Summary language
    #[arg(long)]
    language: Option<String>,
}

#[derive(Debug, Clone)]
struct ResolvedRun {
    input: PathBuf,
    transcript_output: PathBuf,
    summary_output: PathBuf,
    chunk_len: Duration,
    chunk_dir: PathBuf,
    summary: Option<SummaryPlan>,
}

impl RunArgs {
    fn resolve(self, config: &Config) -> Result<ResolvedRun, String> {
        let input = self.input.ok_or_else(|| "--input is required".to_string())?;

        let minutes = self.chunk_minutes.unwrap_or(config.chunk.minutes);
        if minutes == 0 {
            return Err("chunk minutes must be greater than 0".into());
        }

        let summary = match self.summarize {
            SummarizeMode::None => None,
            SummarizeMode::Yes => {
                let temperature = self.temperature.unwrap_or(config.summarize.temperature);
                if !(0.0..=2.0).contains(&temperature) {
                    return Err(format!(
                        "temperature must be between 0.0 and 2.0 (got {temperature})"
                    ));
                }
                Some(SummaryPlan {
                    model: self
                        .model
                        .unwrap_or_else(|| config.summarize.model.clone()),
                    style: non_empty(self.style.as_deref().unwrap_or(&config.summarize.style)),
                    language: non_empty(
                        self.language
                            .as_deref()
                            .unwrap_or(&config.summarize.language),
                    ),
                    temperature: Some(temperature),
                })
            }
        };

        Ok(ResolvedRun {
            input,
            transcript_output: self.transcript_output,
            summary_output: self.summary_output,
            chunk_len: Duration::from_secs(u64::from(minutes) * 60),
            chunk_dir: self
                .chunk_dir
                .unwrap_or_else(|| PathBuf::from(&config.chunk.dir)),
            summary,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn registry_for(config: &Config) -> ProviderRegistry {
    ProviderRegistry::builtin().with_entries(
        config
            .summarize
            .models
            .iter()
            .map(|(model, provider)| (model.clone(), provider.to_ascii_lowercase())),
    )
}

fn provider_settings(config: &Config) -> ProviderSettings {
    ProviderSettings {
        api_keys: lowercase_keys(&config.summarize.api_keys),
        base_urls: lowercase_keys(&config.summarize.base_urls),
        timeout: config.summarize.timeout(),
    }
}

fn lowercase_keys(map: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    map.iter()
        .map(|(provider, value)| (provider.to_ascii_lowercase(), value.clone()))
        .collect()
}

fn transcriber_params(config: &Config) -> TranscriberParams {
    TranscriberParams {
        model: non_empty(&config.transcribe.model),
        api_key: non_empty(&config.transcribe.api_key),
        base_url: non_empty(&config.transcribe.base_url),
        language: non_empty(&config.transcribe.language),
    }
}

fn summarize_error_message(err: &SummarizeError) -> String {
    match err {
        SummarizeError::UnknownModel(model) => format!("unsupported model: {model}"),
        SummarizeError::UnknownProvider(provider) => {
            format!("no summarizer available for provider: {provider}")
        }
        SummarizeError::ProviderImplementation { .. } => format!("summarizer init failed: {err}"),
        SummarizeError::BackendCall { .. } => format!("summarization failed: {err}"),
    }
}

fn pipeline_error_message(err: &PipelineError) -> String {
    match err {
        PipelineError::Audio(e) => format!("audio split failed: {e}"),
        PipelineError::Transcribe(e) => format!("transcription failed: {e}"),
        PipelineError::Summarize(e) => summarize_error_message(e),
    }
}

fn write_output(path: &Path, contents: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| format!("{}: {e}", parent.display()))?;
    }
    fs::write(path, contents).map_err(|e| format!("{}: {e}", path.display()))
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = match ConfigPaths::from_home() {
        Ok(paths) => paths,
        Err(err) => {
            eprintln!("config paths error: {err}");
            std::process::exit(1);
        }
    };

    let mut config = match Config::load_or_create(&paths) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config load failed: {err}");
            std::process::exit(1);
        }
    };

    if let Some(command) = cli.command {
        match command {
            Command::Config(args) => {
                if let Err(e) = config_cmd::run(&args, &paths) {
                    eprintln!("config failed: {e}");
                    std::process::exit(1);
                }
            }
            Command::Models => models_cmd::run(&registry_for(&config)),
        }
        return;
    }

    config.apply_env_overrides(|key| std::env::var(key).ok());
    if let Err(err) = config.validate() {
        eprintln!("config invalid: {err}");
        std::process::exit(1);
    }

    let run = match cli.run.resolve(&config) {
        Ok(run) => run,
        Err(err) => {
            eprintln!("run args error: {err}");
            std::process::exit(1);
        }
    };

    let pipeline = Pipeline::new(
        registry_for(&config),
        SummarizerFactory::builtin(),
        provider_settings(&config),
    );

    if let Some(plan) = &run.summary {
        if let Err(err) = pipeline.resolve(&plan.model) {
            eprintln!("{}", summarize_error_message(&err));
            std::process::exit(1);
        }
    }

    let mut transcriber = match create_transcriber(
        config.transcribe.provider.as_str(),
        &transcriber_params(&config),
    ) {
        Ok(transcriber) => transcriber,
        Err(e) => {
            eprintln!("transcribe init failed: {e}");
            std::process::exit(1);
        }
    };

    let transcript = match pipeline.transcribe(
        transcriber.as_mut(),
        &run.input,
        run.chunk_len,
        &run.chunk_dir,
    ) {
        Ok(transcript) => transcript,
        Err(err) => {
            eprintln!("{}", pipeline_error_message(&err));
            std::process::exit(1);
        }
    };

    if let Err(e) = write_output(&run.transcript_output, &transcript.text) {
        eprintln!("transcript write failed: {e}");
        std::process::exit(1);
    }
    println!("transcript written to {}", run.transcript_output.display());

    let Some(plan) = &run.summary else {
        return;
    };
    let summary = match pipeline.summarize(&plan.model, &plan.request(&transcript.text)) {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("{}", summarize_error_message(&err));
            std::process::exit(1);
        }
    };

    if let Err(e) = write_output(&run.summary_output, &summary) {
        eprintln!("summary write failed: {e}");
        std::process::exit(1);
    }
    println!("summary written to {}", run.summary_output.display());
}
