use std::time::Duration;
use ureq::Agent;

const TIMEOUT_RESOLVE: Duration = Duration::from_secs(5);
const TIMEOUT_CONNECT: Duration = Duration::from_secs(10);

/// Longest response body kept in an error message.
pub const ERROR_BODY_LIMIT: usize = 512;

/// Blocking agent bounded by a global per-request timeout.
///
/// Non-2xx statuses are returned as responses so callers can report the body.
pub fn agent_with_timeout(timeout: Duration) -> Agent {
    let config = Agent::config_builder()
        .timeout_global(Some(timeout))
        .timeout_resolve(Some(TIMEOUT_RESOLVE.min(timeout)))
        .timeout_connect(Some(TIMEOUT_CONNECT.min(timeout)))
        .http_status_as_error(false)
        .build();
    config.into()
}

pub fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= ERROR_BODY_LIMIT {
        return trimmed.to_string();
    }
    let mut end = ERROR_BODY_LIMIT;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &trimmed[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("  bad request \n"), "bad request");
    }

    #[test]
    fn truncate_body_cuts_on_char_boundary() {
        let body = "é".repeat(ERROR_BODY_LIMIT);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with('…'));
        assert!(truncated.len() <= ERROR_BODY_LIMIT + '…'.len_utf8());
    }
}
