//! Error type shared by every API wrapper.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while talking to the recipe service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("{message}")]
    Status {
        status: u16,
        /// Best available human-readable message.
        message: String,
        /// Raw response body, kept for soft-failure detection.
        body: String,
    },
    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
    #[error("Could not read image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Refused before or without reaching a remote service.
    #[error("{0}")]
    Rejected(String),
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

impl ApiError {
    /// HTTP status of a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service refused an add because the item is already there.
    ///
    /// The service only signals this through its message text, so both the
    /// normalised message and the raw body are inspected.
    pub fn is_already_exists(&self) -> bool {
        const MARKER: &str = "already exists";
        match self {
            ApiError::Status { message, body, .. } => {
                message.to_lowercase().contains(MARKER) || body.to_lowercase().contains(MARKER)
            }
            ApiError::Rejected(message) => message.to_lowercase().contains(MARKER),
            _ => false,
        }
    }
}

/// Pick the best human-readable message out of an error response body.
///
/// Preference: a structured string field (`error`, `details`, `message`),
/// then a joined `errors` array, then the raw text, then `fallback`.
pub fn normalize_message(content_type: Option<&str>, body: &str, fallback: &str) -> String {
    let looks_json = content_type.is_some_and(|ct| ct.contains("json"))
        || body.trim_start().starts_with('{');

    if looks_json {
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(body) {
            for key in ["error", "details", "message"] {
                if let Some(text) = map.get(key).and_then(|v| v.as_str()) {
                    if !text.trim().is_empty() {
                        return text.to_string();
                    }
                }
            }
            if let Some(errors) = map.get("errors").and_then(|v| v.as_array()) {
                let joined = errors
                    .iter()
                    .map(|e| match e.as_str() {
                        Some(s) => s.to_string(),
                        None => e.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                if !joined.is_empty() {
                    return joined;
                }
            }
            return fallback.to_string();
        }
    }

    let text = body.trim();
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: Option<&str> = Some("application/json; charset=utf-8");

    #[test]
    fn structured_field_wins() {
        let body = r#"{"error":"Title is required","errors":["a","b"]}"#;
        assert_eq!(normalize_message(JSON, body, "fallback"), "Title is required");
    }

    #[test]
    fn details_used_when_error_missing() {
        let body = r#"{"details":"Recipe already exists in album"}"#;
        assert_eq!(
            normalize_message(JSON, body, "fallback"),
            "Recipe already exists in album"
        );
    }

    #[test]
    fn errors_array_is_joined() {
        let body = r#"{"errors":["Title is required","Time must be a number"]}"#;
        assert_eq!(
            normalize_message(JSON, body, "fallback"),
            "Title is required, Time must be a number"
        );
    }

    #[test]
    fn plain_text_body_used_verbatim() {
        assert_eq!(
            normalize_message(Some("text/html"), "  Bad Gateway \n", "fallback"),
            "Bad Gateway"
        );
    }

    #[test]
    fn empty_body_falls_back() {
        assert_eq!(normalize_message(None, "", "Failed to fetch album"), "Failed to fetch album");
        assert_eq!(normalize_message(JSON, "{}", "Failed to fetch album"), "Failed to fetch album");
    }

    #[test]
    fn json_body_without_content_type_is_still_parsed() {
        let body = r#"{"error":"Unauthorized"}"#;
        assert_eq!(normalize_message(None, body, "fallback"), "Unauthorized");
    }

    #[test]
    fn already_exists_checks_raw_body() {
        let err = ApiError::Status {
            status: 400,
            message: "Failed to add recipe to album".to_string(),
            body: r#"{"error":"Failed to add recipe to album","details":"Recipe already exists in album"}"#
                .to_string(),
        };
        assert!(err.is_already_exists());
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn other_failures_are_not_duplicates() {
        let err = ApiError::Status {
            status: 500,
            message: "Internal error".to_string(),
            body: String::new(),
        };
        assert!(!err.is_already_exists());
        assert!(!ApiError::Rejected("nope".into()).is_already_exists());
    }
}
