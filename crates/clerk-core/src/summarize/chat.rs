use serde::Deserialize;
use serde_json::json;
use ureq::Agent;

use crate::BackendError;
use crate::http::truncate_body;
use crate::prompt::SYSTEM_PROMPT;

/// OpenAI-style chat completion body: system instruction plus user prompt.
pub(crate) fn chat_completion_body(
    model: &str,
    prompt: &str,
    temperature: f64,
) -> serde_json::Value {
    json!({
        "model": model,
        "messages": [
            {"role": "system", "content": SYSTEM_PROMPT},
            {"role": "user", "content": prompt},
        ],
        "temperature": temperature,
    })
}

/// Extract the first completion's message content.
pub(crate) fn parse_chat_completion(body: &str) -> Result<String, BackendError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::InvalidResponse("no choices".into()))?;
    choice
        .message
        .content
        .ok_or_else(|| BackendError::InvalidResponse("completion has no content".into()))
}

/// POST a JSON body and return the raw response text of a 2xx reply.
pub(crate) fn post_json(
    agent: &Agent,
    url: &str,
    headers: &[(&str, String)],
    body: &serde_json::Value,
) -> Result<String, BackendError> {
    let mut request = agent.post(url);
    for (name, value) in headers {
        request = request.header(*name, value.as_str());
    }

    let response = request
        .send_json(body)
        .map_err(|e| BackendError::Network(format!("{e}")))?;
    let status = response.status();

    let raw = response
        .into_body()
        .read_to_string()
        .map_err(|e| BackendError::Network(format!("{e}")))?;

    if !status.is_success() {
        return Err(BackendError::Status {
            status: status.as_u16(),
            body: truncate_body(&raw),
        });
    }
    Ok(raw)
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
