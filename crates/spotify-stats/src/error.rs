//! Error types for stats retrieval

/// Errors from Web API calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 401/403 — the stored token was rejected. Callers clear the session
    /// and force a re-login; nothing here is retried.
    #[error("access token rejected; session must be re-established")]
    Unauthorized,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("response decode failed: {0}")]
    Decode(String),
}

/// Result alias for stats operations.
pub type Result<T> = std::result::Result<T, Error>;
