//! Error types for the PKCE login flow

/// Errors from login-flow and session-store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// The callback carried an authorization code but no verifier was in
    /// the session store. Storage was cleared mid-flow; the login cannot be
    /// completed and must restart.
    #[error("no code verifier in session store; restart the login")]
    MissingVerifier,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("session file parse error: {0}")]
    SessionParse(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
