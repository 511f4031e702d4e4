//! Response classification shared by every command
//!
//! Service calls return an [`ApiResponse`]. Commands hand its status to
//! [`classify`] to decide whether to print the result, and fall back to
//! [`refine`] to pull a better message out of the body when they abort.

use crate::error::{OrchError, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Outcome category of a single HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// 2xx
    Success,
    /// 401
    Unauthenticated,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 4xx other than 401, 403 and 404
    OtherClientError,
    /// 5xx
    ServerError,
    /// 1xx, 3xx and codes outside the HTTP range
    Unexpected,
}

impl StatusOutcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            401 => Self::Unauthenticated,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400..=499 => Self::OtherClientError,
            500..=599 => Self::ServerError,
            _ => Self::Unexpected,
        }
    }
}

/// Transport-neutral response returned by every service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Canonical reason phrase, e.g. "Not Found"
    pub status_text: String,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    pub fn outcome(&self) -> StatusOutcome {
        StatusOutcome::from_status(self.status)
    }

    pub fn is_success(&self) -> bool {
        self.outcome() == StatusOutcome::Success
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Classify this response, see [`classify`]
    pub fn classify(&self, verbose: bool, context: &str) -> Result<bool> {
        classify(self.status, verbose, context, &self.status_text)
    }
}

/// Decide whether a command should proceed with a response.
///
/// Returns `Ok(true)` for 2xx and `Ok(false)` for 404, which is never an
/// error here: list commands treat it as an empty result and the rest stay
/// silent. 401 and 403 map to the login errors, anything else to a
/// bracketed status error. `verbose` does not change the outcome.
pub fn classify(status: u16, verbose: bool, context: &str, status_text: &str) -> Result<bool> {
    let outcome = StatusOutcome::from_status(status);
    if verbose {
        debug!(status, ?outcome, context, "Classifying response");
    }

    match outcome {
        StatusOutcome::Success => Ok(true),
        StatusOutcome::NotFound => Ok(false),
        StatusOutcome::Unauthenticated => Err(OrchError::Unauthenticated),
        StatusOutcome::Forbidden => Err(OrchError::Forbidden {
            context: context.to_string(),
            status_text: status_text.to_string(),
        }),
        StatusOutcome::OtherClientError | StatusOutcome::ServerError | StatusOutcome::Unexpected => {
            Err(OrchError::Http {
                context: context.to_string(),
                status_text: status_text.to_string(),
            })
        }
    }
}

/// Best-effort refinement of a classified error using the response body.
///
/// Only generic status errors are refined. The backend's error payload is
/// not a stable contract, so this is substring and field matching only.
pub fn refine(err: OrchError, body: &str) -> OrchError {
    let OrchError::Http { context, status_text } = err else {
        return err;
    };

    if body.to_lowercase().contains("not found") {
        return OrchError::NotFound { context };
    }

    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.is_empty());

    match message {
        Some(message) => OrchError::Api { context, message },
        None => OrchError::Http { context, status_text },
    }
}
