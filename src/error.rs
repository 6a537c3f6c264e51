//! Gateway error taxonomy.

use thiserror::Error;

/// Errors from the social graph and timeline gateways.
///
/// Only `RateLimited` and `Transient` are recoverable; the crawler retries
/// those in place with a fixed cooldown. Everything else aborts the run
/// without producing a report.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Hard rate-limit signal (error code 88 in the reference API).
    #[error("rate limited by the gateway")]
    RateLimited,

    /// Transient internal error (error code 131 in the reference API).
    #[error("transient gateway error")]
    Transient,

    /// Any other API-level failure, including auth and not-found responses.
    #[error("gateway error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<i64>,
    },

    /// A response that parsed as success but carried an unusable payload.
    #[error("malformed gateway payload: {0}")]
    Payload(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OAuth error: {0}")]
    OAuth(String),
}

impl GatewayError {
    /// Whether the same request may be retried in place.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Transient)
    }
}
