use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    InvalidParams,
    MissingCredentials,
    MissingAccountId,
    InvalidAccountId,
    Unauthorized,
    Api,
    Graphql,
    NotFound,
    Timeout,
    Retryable,
    Internal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub retryable: bool,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
            retryable: matches!(kind, ToolErrorKind::Timeout | ToolErrorKind::Retryable),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidParams, "INVALID_PARAMS", message)
    }

    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::new(
            ToolErrorKind::MissingCredentials,
            "MISSING_CREDENTIALS",
            message,
        )
    }

    pub fn missing_account_id() -> Self {
        Self::new(
            ToolErrorKind::MissingAccountId,
            "MISSING_ACCOUNT_ID",
            "Account ID must be provided",
        )
    }

    pub fn invalid_account_id() -> Self {
        Self::new(
            ToolErrorKind::InvalidAccountId,
            "INVALID_ACCOUNT_ID",
            "Invalid account ID format",
        )
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Unauthorized, "UNAUTHORIZED", message)
    }

    /// Non-OK REST response. The body has already been decoded by the
    /// time this is raised; status and status text travel in `details`.
    pub fn rest_api(status: u16, status_text: &str) -> Self {
        Self::new(
            ToolErrorKind::Api,
            "API_ERROR",
            format!("REST API error: {} {}", status, status_text),
        )
        .with_details(serde_json::json!({"status": status, "status_text": status_text}))
    }

    pub fn nerdgraph_api(status: u16, status_text: &str) -> Self {
        Self::new(
            ToolErrorKind::Api,
            "API_ERROR",
            format!("NerdGraph API error: {} {}", status, status_text),
        )
        .with_details(serde_json::json!({"status": status, "status_text": status_text}))
    }

    /// Semantic failure: HTTP transport succeeded but the envelope
    /// carried a non-empty `errors` array.
    pub fn graphql(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Graphql, "GRAPHQL_ERROR", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, "NOT_FOUND", message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, "TIMEOUT", message)
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Retryable, "RETRYABLE", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, "INTERNAL", message)
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ToolError {}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_api_error_carries_status_details() {
        let err = ToolError::rest_api(502, "Bad Gateway");
        assert_eq!(err.kind, ToolErrorKind::Api);
        assert_eq!(err.message, "REST API error: 502 Bad Gateway");
        let details = err.details.expect("details");
        assert_eq!(details["status"], 502);
        assert_eq!(details["status_text"], "Bad Gateway");
    }

    #[test]
    fn retryable_flag_follows_kind() {
        assert!(ToolError::timeout("t").retryable);
        assert!(ToolError::retryable("r").retryable);
        assert!(!ToolError::invalid_account_id().retryable);
        assert!(!ToolError::graphql("boom").retryable);
    }
}
