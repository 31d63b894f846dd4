use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::audio;
use crate::registry::ProviderRegistry;
use crate::summarize::{BackendParams, SummarizerFactory, SummaryOptions, SummaryRequest};
use crate::transcribe::Transcriber;
use crate::{PipelineError, SummarizeError, TranscribeError};

/// Connection settings per provider identifier, applied after resolution.
#[derive(Clone, Default)]
pub struct ProviderSettings {
    pub api_keys: BTreeMap<String, String>,
    pub base_urls: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

impl ProviderSettings {
    pub fn backend_params(&self, provider: &str, model: &str) -> BackendParams {
        BackendParams {
            model: model.to_string(),
            api_key: self.api_keys.get(provider).cloned(),
            base_url: self.base_urls.get(provider).cloned(),
            timeout: self.timeout,
        }
    }
}

/// Transcript of a split source.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub text: String,
    pub chunks: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub transcript: Transcript,
    pub summary: Option<String>,
}

/// Transcribe each chunk in order and join the texts with newlines.
pub fn transcribe_chunks(
    transcriber: &mut dyn Transcriber,
    chunks: &[PathBuf],
) -> Result<String, TranscribeError> {
    let mut transcripts = Vec::with_capacity(chunks.len());
    for path in chunks {
        info!(path = %path.display(), provider = transcriber.name(), "transcribing");
        transcripts.push(transcriber.transcribe(path)?);
    }
    Ok(transcripts.join("\n"))
}

/// Resolves models, builds summarizers and drives a run.
pub struct Pipeline {
    registry: ProviderRegistry,
    factory: SummarizerFactory,
    settings: ProviderSettings,
}

impl Pipeline {
    pub fn new(
        registry: ProviderRegistry,
        factory: SummarizerFactory,
        settings: ProviderSettings,
    ) -> Self {
        Self {
            registry,
            factory,
            settings,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn resolve(&self, model: &str) -> Result<&str, SummarizeError> {
        self.registry.resolve(model)
    }

    /// Split `source` into `chunk_len` pieces under `chunk_dir` and transcribe them.
    pub fn transcribe(
        &self,
        transcriber: &mut dyn Transcriber,
        source: &Path,
        chunk_len: Duration,
        chunk_dir: &Path,
    ) -> Result<Transcript, PipelineError> {
        let chunks = audio::split_audio_by(source, chunk_len, chunk_dir)?;
        let text = transcribe_chunks(transcriber, &chunks)?;
        info!(chunks = chunks.len(), chars = text.len(), "transcription complete");
        Ok(Transcript { text, chunks })
    }

    /// Resolve `model`, build a fresh summarizer for it and summarize `request`.
    pub fn summarize(
        &self,
        model: &str,
        request: &SummaryRequest,
    ) -> Result<String, SummarizeError> {
        let provider = self.registry.resolve(model)?;
        let params = self.settings.backend_params(provider, model);
        let mut summarizer = self.factory.build(provider, &params)?;
        info!(provider, model, "generating summary");
        let summary = summarizer.summarize(request)?;
        info!(chars = summary.len(), "summary generated");
        Ok(summary)
    }

    /// Full run. The model is resolved before any audio work so an
    /// unsupported model fails fast.
    pub fn run(
        &self,
        transcriber: &mut dyn Transcriber,
        job: &Job,
    ) -> Result<PipelineOutput, PipelineError> {
        if let Some(summary) = &job.summary {
            self.resolve(&summary.model)?;
        }

        let transcript = self.transcribe(transcriber, &job.source, job.chunk_len, &job.chunk_dir)?;
        let summary = match &job.summary {
            Some(plan) => {
                let request = plan.request(&transcript.text);
                Some(self.summarize(&plan.model, &request)?)
            }
            None => None,
        };

        Ok(PipelineOutput {
            transcript,
            summary,
        })
    }
}

/// Inputs for [`Pipeline::run`].
#[derive(Debug, Clone)]
pub struct Job {
    pub source: PathBuf,
    pub chunk_len: Duration,
    pub chunk_dir: PathBuf,
    pub summary: Option<SummaryPlan>,
}

/// Summarize step settings; the transcript text is filled in at run time.
#[derive(Debug, Clone, Default)]
pub struct SummaryPlan {
    pub model: String,
    pub style: Option<String>,
    pub language: Option<String>,
    pub temperature: Option<f64>,
}

impl SummaryPlan {
    pub fn request(&self, text: &str) -> SummaryRequest {
        let mut request = SummaryRequest::new(text);
        request.style = self.style.clone();
        request.language = self.language.clone();
        if let Some(temperature) = self.temperature {
            request = request.with_options(SummaryOptions::new().with_temperature(temperature));
        }
        request
    }
}
