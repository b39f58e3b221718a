use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing configuration: {0}")]
    MissingConfig(String),
    #[error("authentication rejected ({status}): {message}")]
    AuthenticationFailed { status: u16, message: String },
    #[error("access forbidden: {0}")]
    Forbidden(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Parse(String),
    #[error("api error ({status}): {message}")]
    Unknown { status: u16, message: String },
}

impl ApiError {
    /// The single message surfaced to the person at the terminal.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::MissingConfig(what) => format!(
                "API credentials not configured ({what}). Set TWITTER_API_KEY and TWITTER_API_SECRET."
            ),
            ApiError::AuthenticationFailed { .. } => {
                "Failed to authenticate with the search API. Check your API key and secret.".into()
            }
            ApiError::Forbidden(_) => {
                "Your API access level doesn't include search. A paid tier may be required.".into()
            }
            ApiError::RateLimited(_) => {
                "Too many requests to the search API. Wait 15 minutes before trying again.".into()
            }
            ApiError::Transport(err) => format!("Network error talking to the search API: {err}"),
            ApiError::Parse(detail) => format!("The search API returned an unexpected response: {detail}"),
            ApiError::Unknown { status, message } => format!("Search API error {status}: {message}"),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::RateLimited(_) | ApiError::Transport(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Token,
    Search,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorItem>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

const MAX_BODY_EXCERPT: usize = 200;

/// Map a non-success response onto the error taxonomy.
pub fn classify_failure(
    endpoint: Endpoint,
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> ApiError {
    let is_json = content_type
        .map(|value| value.contains("application/json"))
        .unwrap_or(false);
    let message = if is_json {
        json_error_message(body).unwrap_or_else(|| excerpt(body))
    } else {
        excerpt(body)
    };
    let message = if message.is_empty() {
        format!("HTTP {status}")
    } else {
        message
    };

    if status == 429 || (!is_json && body.contains("Too Many Requests")) {
        return ApiError::RateLimited(message);
    }
    match (endpoint, status) {
        (Endpoint::Token, _) | (Endpoint::Search, 401) => {
            ApiError::AuthenticationFailed { status, message }
        }
        (Endpoint::Search, 403) => ApiError::Forbidden(message),
        (Endpoint::Search, _) => ApiError::Unknown { status, message },
    }
}

fn json_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let joined = parsed
        .errors
        .iter()
        .filter_map(|item| {
            item.detail
                .clone()
                .or_else(|| item.message.clone())
                .or_else(|| item.title.clone())
        })
        .collect::<Vec<_>>()
        .join(", ");
    if !joined.is_empty() {
        return Some(joined);
    }
    parsed.detail.or(parsed.title)
}

fn excerpt(body: &str) -> String {
    body.trim().chars().take(MAX_BODY_EXCERPT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn json_error_details_are_joined() {
        let body = r#"{"errors":[{"title":"Bad","detail":"query too long"},{"title":"Also bad"}]}"#;
        let err = classify_failure(Endpoint::Search, 400, Some("application/json"), body);
        assert_matches!(err, ApiError::Unknown { status: 400, ref message } if message == "query too long, Also bad");
    }

    #[test]
    fn problem_documents_use_their_detail() {
        let body = r#"{"title":"Unauthorized","detail":"Unauthorized","type":"about:blank","status":401}"#;
        let err = classify_failure(Endpoint::Search, 401, Some("application/json; charset=utf-8"), body);
        assert_matches!(err, ApiError::AuthenticationFailed { status: 401, .. });
    }

    #[test]
    fn html_rate_limit_pages_are_recognised() {
        let err = classify_failure(
            Endpoint::Search,
            503,
            Some("text/html"),
            "<html>Too Many Requests</html>",
        );
        assert_matches!(err, ApiError::RateLimited(_));
        assert!(err.is_retryable());
    }

    #[test]
    fn search_forbidden_maps_to_tier_error() {
        let err = classify_failure(Endpoint::Search, 403, Some("text/plain"), "nope");
        assert_matches!(err, ApiError::Forbidden(ref msg) if msg == "nope");
        assert!(err.user_message().contains("access level"));
    }

    #[test]
    fn token_failures_are_authentication_errors() {
        let err = classify_failure(Endpoint::Token, 403, None, "");
        assert_matches!(err, ApiError::AuthenticationFailed { status: 403, ref message } if message == "HTTP 403");
        let err = classify_failure(Endpoint::Token, 429, None, "");
        assert_matches!(err, ApiError::RateLimited(_));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(1_000);
        let err = classify_failure(Endpoint::Search, 500, None, &body);
        assert_matches!(err, ApiError::Unknown { ref message, .. } if message.len() == MAX_BODY_EXCERPT);
    }
}
