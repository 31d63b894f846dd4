use std::path::PathBuf;
use thiserror::Error;

/// Errors from audio segmentation (decode, resample, chunk writing).
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("input not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("chunk length must be greater than zero")]
    InvalidChunkLength,

    #[error("audio io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audio decode failed: {0}")]
    Decode(String),

    #[error("resample failed: {0}")]
    Resample(String),

    #[error("chunk encode failed: {0}")]
    Encode(String),
}

/// Errors from transcribe providers.
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("transcribe io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown transcribe provider: {0}")]
    UnknownProvider(String),

    #[error("model load failed: {0}")]
    ModelLoad(String),

    #[error("transcription failed: {0}")]
    TranscribeFailed(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors from resolving, building and calling summarize backends.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("provider {provider} is malformed: {reason}")]
    ProviderImplementation { provider: String, reason: String },

    #[error("{provider} backend call failed: {source}")]
    BackendCall {
        provider: &'static str,
        #[source]
        source: BackendError,
    },
}

impl SummarizeError {
    pub(crate) fn backend(provider: &'static str, source: BackendError) -> Self {
        Self::BackendCall { provider, source }
    }
}

/// Failure detail for a single backend request.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("credential not set: {0}")]
    MissingCredential(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("http status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors from a full split, transcribe and summarize run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("audio: {0}")]
    Audio(#[from] AudioError),

    #[error("transcribe: {0}")]
    Transcribe(#[from] TranscribeError),

    #[error("summarize: {0}")]
    Summarize(#[from] SummarizeError),
}
