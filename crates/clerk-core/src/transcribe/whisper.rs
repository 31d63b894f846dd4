use std::path::Path;

use tracing::warn;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::TranscribeError;
use crate::audio::{CHUNK_SAMPLE_RATE, decode, resample};

use super::Transcriber;

/// Local transcribe provider using whisper.cpp via whisper-rs.
pub struct WhisperTranscriber {
    ctx: WhisperContext,
    language: String,
}

impl WhisperTranscriber {
    pub fn new(model_path: &str, language: Option<&str>) -> Result<Self, TranscribeError> {
        if !Path::new(model_path).exists() {
            return Err(TranscribeError::ModelLoad(format!(
                "whisper model not found at {model_path}"
            )));
        }
        let ctx = WhisperContext::new_with_params(model_path, WhisperContextParameters::new())
            .map_err(|e| TranscribeError::ModelLoad(format!("{e}")))?;
        Ok(Self {
            ctx,
            language: language.unwrap_or("auto").to_string(),
        })
    }
}

impl Transcriber for WhisperTranscriber {
    fn name(&self) -> &'static str {
        "whisper"
    }

    fn transcribe(&mut self, path: &Path) -> Result<String, TranscribeError> {
        if !path.exists() {
            return Err(TranscribeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("audio not found: {}", path.display()),
            )));
        }
        let decoded = decode::decode_mono(path)
            .map_err(|e| TranscribeError::TranscribeFailed(format!("{e}")))?;
        let pcm = resample::resample(&decoded.samples, decoded.sample_rate, CHUNK_SAMPLE_RATE)
            .map_err(|e| TranscribeError::TranscribeFailed(format!("{e}")))?;

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| TranscribeError::TranscribeFailed(format!("{e}")))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 5 });
        params.set_language(Some(self.language.as_str()));
        params.set_n_threads(4);
        params.set_print_progress(false);
        params.set_print_realtime(false);

        state
            .full(params, &pcm)
            .map_err(|e| TranscribeError::TranscribeFailed(format!("{e}")))?;

        let mut text = String::new();
        for i in 0..state.full_n_segments() {
            let Some(seg) = state.get_segment(i) else {
                continue;
            };
            match seg.to_str() {
                Ok(segment_text) => text.push_str(segment_text),
                Err(e) => warn!(segment = i, error = %e, "failed to decode segment text"),
            }
        }

        Ok(text.trim().to_string())
    }
}
