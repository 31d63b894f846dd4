use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use ureq::unversioned::multipart::{Form, Part};

use crate::TranscribeError;
use crate::http::{agent_with_timeout, truncate_body};

use super::{Transcriber, TranscriberParams};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_MODEL: &str = "whisper-1";
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const GROQ_MODEL: &str = "whisper-large-v3-turbo";
const TIMEOUT: Duration = Duration::from_secs(300);

/// Transcribe provider for OpenAI-compatible `/audio/transcriptions` APIs.
pub struct CloudTranscriber {
    name: &'static str,
    base_url: String,
    model: String,
    api_key: String,
    language: Option<String>,
    agent: ureq::Agent,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl CloudTranscriber {
    pub fn openai(params: &TranscriberParams) -> Result<Self, TranscribeError> {
        Self::new("openai", OPENAI_BASE_URL, OPENAI_MODEL, params)
    }

    pub fn groq(params: &TranscriberParams) -> Result<Self, TranscribeError> {
        Self::new("groq", GROQ_BASE_URL, GROQ_MODEL, params)
    }

    fn new(
        name: &'static str,
        default_base_url: &str,
        default_model: &str,
        params: &TranscriberParams,
    ) -> Result<Self, TranscribeError> {
        let api_key = non_empty(params.api_key.as_deref())
            .ok_or_else(|| TranscribeError::ModelLoad(format!("{name} API key not set")))?
            .to_string();
        let base_url = non_empty(params.base_url.as_deref())
            .unwrap_or(default_base_url)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            name,
            base_url,
            model: non_empty(params.model.as_deref())
                .unwrap_or(default_model)
                .to_string(),
            api_key,
            language: non_empty(params.language.as_deref()).map(str::to_string),
            agent: agent_with_timeout(TIMEOUT),
        })
    }
}

impl Transcriber for CloudTranscriber {
    fn name(&self) -> &'static str {
        self.name
    }

    fn transcribe(&mut self, path: &Path) -> Result<String, TranscribeError> {
        let audio = fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio.wav");

        let mut form = Form::new()
            .text("model", self.model.as_str())
            .text("response_format", "json");
        if let Some(language) = self.language.as_deref() {
            form = form.text("language", language);
        }
        let form = form.part(
            "file",
            Part::bytes(&audio)
                .file_name(file_name)
                .mime_str(mime_for(path))
                .map_err(|e| TranscribeError::Network(format!("{e}")))?,
        );

        let url = format!("{}/audio/transcriptions", self.base_url);
        debug!(provider = self.name, model = %self.model, path = %path.display(), "transcribe request");

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send(form)
            .map_err(|e| TranscribeError::Network(format!("{e}")))?;

        let status = response.status();
        let raw = response
            .into_body()
            .read_to_string()
            .map_err(|e| TranscribeError::Network(format!("{e}")))?;
        if !status.is_success() {
            return Err(TranscribeError::Network(format!(
                "http status {}: {}",
                status.as_u16(),
                truncate_body(&raw)
            )));
        }

        let parsed: TranscriptionResponse = serde_json::from_str(raw.trim())
            .map_err(|e| TranscribeError::InvalidResponse(e.to_string()))?;
        Ok(parsed.text.trim().to_string())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") | Some("mp4") => "audio/mp4",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}
