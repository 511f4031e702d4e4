//! Error types for orchestrator client operations
//!
//! Every failure a command can report is one of these variants. The
//! `Display` text is what the CLI prints, so messages are user-facing.

use thiserror::Error;

/// Result type alias for orchestrator client operations.
pub type Result<T> = std::result::Result<T, OrchError>;

/// Errors produced while talking to the orchestrator services or
/// interpreting CLI input.
#[derive(Debug, Error)]
pub enum OrchError {
    /// The backend rejected the request with 401.
    #[error("Unauthenticated. Please login")]
    Unauthenticated,

    /// The backend rejected the request with 403.
    #[error("{context}: {status_text}. Unauthenticated. Please login")]
    Forbidden { context: String, status_text: String },

    /// Any other non-success status.
    #[error("{context}:[{status_text}]")]
    Http { context: String, status_text: String },

    /// The response body identified the resource as missing.
    #[error("{context}: not found")]
    NotFound { context: String },

    /// The response body carried a structured error message.
    #[error("{context}: {message}")]
    Api { context: String, message: String },

    /// The request never produced a response (connect failure, timeout).
    #[error("{context}: no response from backend")]
    NoResponse { context: String },

    /// A dotted `<app-name>.<name>` flag key was malformed.
    #[error("{kind} {key} not in format <app-name>.<{kind}-name>")]
    InvalidFormat { kind: &'static str, key: String },

    /// Chart values were neither a YAML mapping nor base64-wrapped YAML.
    #[error("invalid chart values: {0}")]
    InvalidChartValues(String),

    /// A `--parameter-template` spec could not be parsed.
    #[error("invalid parameter template {spec}: {reason}")]
    InvalidParameterTemplate { spec: String, reason: String },

    /// A flag value was rejected before any request was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // The cause is reported through `source()`, not repeated in the message.

    /// A success response could not be decoded.
    #[error("failed to decode response")]
    Decode(#[from] serde_json::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

impl OrchError {
    /// Build an `InvalidFormat` error for an override property key.
    pub fn invalid_property(key: impl Into<String>) -> Self {
        Self::InvalidFormat {
            kind: "property",
            key: key.into(),
        }
    }

    /// Build an `InvalidFormat` error for a target-cluster label key.
    pub fn invalid_label(key: impl Into<String>) -> Self {
        Self::InvalidFormat {
            kind: "label",
            key: key.into(),
        }
    }

    /// Returns true for errors that mean the user must log in again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Forbidden { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_property_message() {
        let err = OrchError::invalid_property("badkey");
        assert_eq!(
            err.to_string(),
            "property badkey not in format <app-name>.<property-name>"
        );
    }

    #[test]
    fn test_invalid_label_message() {
        let err = OrchError::invalid_label("nolabel");
        assert_eq!(
            err.to_string(),
            "label nolabel not in format <app-name>.<label-name>"
        );
    }

    #[test]
    fn test_no_response_message() {
        let err = OrchError::NoResponse {
            context: "error listing hosts".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "error listing hosts: no response from backend"
        );
    }

    #[test]
    fn test_wrapped_cause_is_source_only() {
        let cause = serde_json::from_str::<u32>("nope").unwrap_err();
        let cause_text = cause.to_string();
        let err = OrchError::from(cause);

        assert_eq!(err.to_string(), "failed to decode response");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some(cause_text.as_str()));
    }

    #[test]
    fn test_auth_failure_detection() {
        assert!(OrchError::Unauthenticated.is_auth_failure());
        assert!(OrchError::Forbidden {
            context: "ctx".into(),
            status_text: "Forbidden".into(),
        }
        .is_auth_failure());
        assert!(!OrchError::InvalidArgument("x".into()).is_auth_failure());
    }
}
