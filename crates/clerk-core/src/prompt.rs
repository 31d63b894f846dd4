/// System-role instruction sent ahead of every summarize request.
pub const SYSTEM_PROMPT: &str = "You are an expert minutes-taker.";

const STYLE_LABEL: &str = "Style";
const LANGUAGE_LABEL: &str = "Language";
const INSTRUCTION: &str = "Summarize the following transcript:";

/// Assemble the user prompt from the transcript and optional directives.
///
/// Blank directives are treated as absent so no empty labeled line is emitted.
pub fn build_user_prompt(text: &str, style: Option<&str>, language: Option<&str>) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(3);

    if let Some(style) = non_blank(style) {
        lines.push(format!("{STYLE_LABEL}: {style}"));
    }
    if let Some(language) = non_blank(language) {
        lines.push(format!("{LANGUAGE_LABEL}: {language}"));
    }
    lines.push(format!("{INSTRUCTION}\n{text}"));

    lines.join("\n")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
