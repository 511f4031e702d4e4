//! Logging setup and structured request events
//!
//! Provides:
//! - tracing subscriber initialisation (text or JSON, stderr only so that
//!   command output on stdout stays machine readable)
//! - structured events for every backend call

use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to `default_filter`.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_tracing(json: bool, default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_err() {
        debug!("Tracing subscriber already installed");
    }
}

/// Structured logger for backend calls
///
/// Provides consistent events for requests made on behalf of one service
/// so that `RUST_LOG=debug` shows the full request trail.
#[derive(Clone)]
pub struct RequestLogger {
    service: &'static str,
}

impl RequestLogger {
    pub fn new(service: &'static str) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    /// Log an outgoing request
    pub fn log_request(&self, method: &str, url: &str) {
        debug!(
            event = "request_sent",
            service = %self.service,
            method = %method,
            url = %url,
            "Sending request"
        );
    }

    /// Log a received response
    pub fn log_response(&self, method: &str, url: &str, status: u16, elapsed: Duration) {
        if status >= 500 {
            warn!(
                event = "response_received",
                service = %self.service,
                method = %method,
                url = %url,
                status = status,
                elapsed_ms = elapsed.as_millis() as u64,
                "Backend returned server error"
            );
        } else {
            debug!(
                event = "response_received",
                service = %self.service,
                method = %method,
                url = %url,
                status = status,
                elapsed_ms = elapsed.as_millis() as u64,
                "Received response"
            );
        }
    }

    /// Log a request that produced no response
    pub fn log_no_response(&self, method: &str, url: &str, error: &str) {
        warn!(
            event = "no_response",
            service = %self.service,
            method = %method,
            url = %url,
            error = %error,
            "No response from backend"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(false, DEFAULT_LOG_FILTER);
        init_tracing(true, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_request_logger_creation() {
        let logger = RequestLogger::new("deployment");
        assert_eq!(logger.service(), "deployment");
        logger.log_request("GET", "http://localhost/deployments");
        logger.log_response("GET", "http://localhost/deployments", 200, Duration::from_millis(3));
        logger.log_no_response("GET", "http://localhost/deployments", "connection refused");
    }
}
