pub mod cloud;
#[cfg(feature = "whisper")]
pub mod whisper;

use std::path::Path;

use crate::TranscribeError;

/// Speech-to-text provider abstraction.
pub trait Transcriber: Send {
    fn name(&self) -> &'static str;
    /// Full transcript of one audio file.
    fn transcribe(&mut self, path: &Path) -> Result<String, TranscribeError>;
}

/// Construction parameters for a transcribe provider.
#[derive(Debug, Clone, Default)]
pub struct TranscriberParams {
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// ISO-639-1 code; `None` lets the engine detect it.
    pub language: Option<String>,
}

/// Create a transcribe provider by name.
///
/// - `"openai"` and `"groq"` upload each file to an OpenAI-compatible
///   `/audio/transcriptions` endpoint and require an API key.
/// - `"whisper"` (cargo feature `whisper`) runs a local GGML model; `model`
///   must point to the model file.
pub fn create_transcriber(
    provider: &str,
    params: &TranscriberParams,
) -> Result<Box<dyn Transcriber>, TranscribeError> {
    match provider.trim().to_ascii_lowercase().as_str() {
        "openai" => Ok(Box::new(cloud::CloudTranscriber::openai(params)?)),
        "groq" => Ok(Box::new(cloud::CloudTranscriber::groq(params)?)),
        #[cfg(feature = "whisper")]
        "whisper" => {
            let path = params
                .model
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    TranscribeError::ModelLoad(
                        "model path required for whisper provider (WHISPER_MODEL=/path/to/ggml-*.bin)"
                            .into(),
                    )
                })?;
            Ok(Box::new(whisper::WhisperTranscriber::new(
                path,
                params.language.as_deref(),
            )?))
        }
        #[cfg(not(feature = "whisper"))]
        "whisper" => Err(TranscribeError::ModelLoad(
            "whisper provider requires building with --features whisper".into(),
        )),
        _ => Err(TranscribeError::UnknownProvider(provider.to_string())),
    }
}
