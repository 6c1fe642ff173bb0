// ── Core error types ──
//
// User-facing errors from skylight-core. Widgets never see HTTP status
// codes or JSON parse failures directly; the `From<skylight_api::Error>`
// impl translates transport-layer errors into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Not found: {identifier}")]
    NotFound { identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation not supported: {operation} ({reason})")]
    Unsupported { operation: String, reason: String },

    #[error("Operation rejected: {message}")]
    Rejected { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("{feature} is not configured")]
    NotConfigured { feature: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_configured(feature: impl Into<String>) -> Self {
        Self::NotConfigured {
            feature: feature.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<skylight_api::Error> for CoreError {
    fn from(err: skylight_api::Error) -> Self {
        match err {
            skylight_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            skylight_api::Error::Transport(ref e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            skylight_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            skylight_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            skylight_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            skylight_api::Error::Http { status: 404, message } => {
                CoreError::NotFound { identifier: message }
            }
            skylight_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            skylight_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            skylight_api::Error::WebSocketClosed { code, reason } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket closed (code {code}): {reason}"),
            },
            skylight_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_404_maps_to_not_found() {
        let err: CoreError = skylight_api::Error::Http {
            status: 404,
            message: "Entity not found.".into(),
        }
        .into();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn auth_failure_keeps_message() {
        let err: CoreError = skylight_api::Error::Authentication {
            message: "401: Unauthorized".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Authentication failed: 401: Unauthorized");
    }
}
