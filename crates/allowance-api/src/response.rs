//! Response classification.
//!
//! Every backend response is classified into either a parsed body or an
//! [`HttpFailure`] carrying the status, the raw body and a human-readable
//! message. Nothing is inferred from partially parsed bodies.

use auth_gateway::ApiResponse;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Body of a response, parsed leniently.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// No body (e.g. 204 No Content).
    Empty,
    Json(Value),
    /// Body that is not valid JSON.
    Text(String),
}

impl ResponseBody {
    /// Parse a raw body: empty stays empty, invalid JSON is kept as text.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return ResponseBody::Empty;
        }
        match serde_json::from_str(raw) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(raw.to_string()),
        }
    }

    /// Message the backend put in the body, if any.
    ///
    /// Looks at `error`, then `message`, then a bare string body.
    pub fn message(&self) -> Option<String> {
        let message = match self {
            ResponseBody::Empty => None,
            ResponseBody::Text(text) => Some(text.trim().to_string()),
            ResponseBody::Json(Value::String(text)) => Some(text.trim().to_string()),
            ResponseBody::Json(Value::Object(map)) => ["error", "message"]
                .iter()
                .filter_map(|key| map.get(*key).and_then(Value::as_str))
                .map(|text| text.trim().to_string())
                .find(|text| !text.is_empty()),
            ResponseBody::Json(_) => None,
        };
        message.filter(|text| !text.is_empty())
    }
}

/// A non-success response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
    pub status: u16,
    pub raw_body: String,
    pub parsed_message: String,
}

impl HttpFailure {
    /// Message formatted as `"<status>: <message>"`.
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.status, self.parsed_message)
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

/// Classify a response into its body or an [`HttpFailure`].
///
/// The failure message comes from the body when present, then from
/// `fallback`, then from [`generic_message`].
pub fn classify(response: &ApiResponse, fallback: Option<&str>) -> Result<ResponseBody, HttpFailure> {
    let body = ResponseBody::parse(&response.body);
    if response.status.is_success() {
        return Ok(body);
    }

    let status = response.status.as_u16();
    let parsed_message = body
        .message()
        .or_else(|| fallback.map(String::from))
        .unwrap_or_else(|| generic_message(status).to_string());

    Err(HttpFailure {
        status,
        raw_body: response.body.clone(),
        parsed_message,
    })
}

/// Generic message for a status code when nothing better is available.
pub fn generic_message(status: u16) -> &'static str {
    match status {
        400 => "The request was invalid",
        401 => "You are not signed in",
        403 => "You do not have permission to do that",
        404 => "Not found",
        409 => "The request conflicts with the current state",
        422 => "The request could not be processed",
        429 => "Too many requests, try again later",
        500..=599 => "The server encountered an error",
        _ => "Request failed",
    }
}

/// Length and digest of a body, for logs that must not carry payloads.
pub(crate) fn summarize_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_gateway::StatusCode;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse::new(StatusCode::from_u16(status).unwrap(), body)
    }

    #[test]
    fn test_parse_empty_body() {
        assert_eq!(ResponseBody::parse(""), ResponseBody::Empty);
        assert_eq!(ResponseBody::parse("  \n"), ResponseBody::Empty);
    }

    #[test]
    fn test_parse_invalid_json_is_text() {
        assert_eq!(
            ResponseBody::parse("Bad Gateway"),
            ResponseBody::Text("Bad Gateway".into())
        );
    }

    #[test]
    fn test_error_field_wins_over_message() {
        let failure = classify(
            &response(400, r#"{"error":"Email taken","message":"ignored"}"#),
            Some("Registration failed"),
        )
        .unwrap_err();
        assert_eq!(failure.parsed_message, "Email taken");
        assert_eq!(failure.user_message(), "400: Email taken");
    }

    #[test]
    fn test_message_field_used_when_no_error() {
        let failure = classify(&response(404, r#"{"message":"List not found"}"#), None).unwrap_err();
        assert_eq!(failure.parsed_message, "List not found");
    }

    #[test]
    fn test_plain_text_body_is_message() {
        let failure = classify(&response(502, "upstream down"), None).unwrap_err();
        assert_eq!(failure.user_message(), "502: upstream down");
        assert_eq!(failure.raw_body, "upstream down");
    }

    #[test]
    fn test_fallback_then_generic() {
        let with_fallback = classify(&response(400, "{}"), Some("Could not add item")).unwrap_err();
        assert_eq!(with_fallback.parsed_message, "Could not add item");

        let generic = classify(&response(503, ""), None).unwrap_err();
        assert_eq!(generic.parsed_message, "The server encountered an error");
    }

    #[test]
    fn test_success_body_is_returned() {
        let body = classify(&response(200, r#"{"id":"1"}"#), None).unwrap();
        assert_eq!(body, ResponseBody::Json(serde_json::json!({"id": "1"})));
        assert_eq!(classify(&response(204, ""), None).unwrap(), ResponseBody::Empty);
    }

    #[test]
    fn test_summarize_body_hides_content() {
        let summary = summarize_body("secret-token");
        assert!(summary.starts_with("len=12,digest="));
        assert!(!summary.contains("secret"));
    }
}
