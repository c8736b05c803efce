use thiserror::Error;

/// Top-level error type for the `atmwatch-api` crate.
///
/// Covers every failure mode at the HTTP boundary: authentication,
/// transport, API status failures, and payload decoding. `atmwatch-core`
/// maps these into user-facing diagnostics. The pure derivation layer
/// above never produces errors -- only this boundary can fail.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected or session expired (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response, carrying the HTTP status and response body text.
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// Device lookup found nothing, even after the list fallback.
    #[error("Device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error means the session is no longer valid
    /// and the caller should treat itself as logged out.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient transport error worth
    /// retrying at the next poll tick.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Api { status: 404, .. } | Self::DeviceNotFound { .. } => true,
            _ => false,
        }
    }
}
