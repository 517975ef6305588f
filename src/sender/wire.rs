use crate::domain::TestcaseRequest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct TestcasesRequest {
    pub testcases: Vec<TestcaseRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
    pub detail: Option<String>,
}

impl ErrorResponse {
    /// Extracts the human-readable part of an error body, falling back to the raw text.
    /// `message` wins over `detail` when a body carries both.
    pub fn message_from_body(body: &str) -> String {
        serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|response| response.message.or(response.detail))
            .unwrap_or_else(|| body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(
            ErrorResponse::message_from_body(r#"{"message": "error message"}"#),
            "error message"
        );
        assert_eq!(
            ErrorResponse::message_from_body(r#"{"detail": "invalid api key"}"#),
            "invalid api key"
        );
        assert_eq!(
            ErrorResponse::message_from_body("Internal Server Error"),
            "Internal Server Error"
        );
        assert_eq!(ErrorResponse::message_from_body(""), "");
    }

    #[test]
    fn test_error_message_prefers_message_over_detail() {
        assert_eq!(
            ErrorResponse::message_from_body(
                r#"{"message": "session id is taken", "detail": "duplicate key"}"#
            ),
            "session id is taken"
        );
        assert_eq!(
            ErrorResponse::message_from_body(r#"{"message": null, "detail": "duplicate key"}"#),
            "duplicate key"
        );
        assert_eq!(ErrorResponse::message_from_body("{}"), "{}");
    }
}
