//! Spotify application identity and endpoint set
//!
//! Public OAuth client configuration. The client ID is not a secret — it
//! identifies the application; PKCE replaces the client secret entirely.
//! Endpoints are fields rather than hardwired constants so tests can point
//! an `OAuthApp` at a local mock server.

/// Authorization endpoint (browser navigates here to grant consent)
pub const SPOTIFY_AUTHORIZE_ENDPOINT: &str = "https://accounts.spotify.com/authorize";

/// Token endpoint for the authorization-code exchange
pub const SPOTIFY_TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";

/// Scopes the stats dashboard needs: top items, listening history, profile.
pub const DEFAULT_SCOPES: &str =
    "user-top-read user-read-recently-played user-read-private user-read-email";

/// A registered Spotify application plus the endpoints it talks to.
#[derive(Debug, Clone)]
pub struct OAuthApp {
    pub client_id: String,
    /// Must match the value registered with Spotify byte-for-byte. Stored
    /// verbatim and never re-normalized; the token endpoint rejects the
    /// exchange on any mismatch.
    pub redirect_uri: String,
    /// Space-joined scope list sent in the authorization URL.
    pub scopes: String,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
}

impl OAuthApp {
    /// Describe an app against the real Spotify accounts endpoints.
    pub fn spotify(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: DEFAULT_SCOPES.to_string(),
            authorize_endpoint: SPOTIFY_AUTHORIZE_ENDPOINT.to_string(),
            token_endpoint: SPOTIFY_TOKEN_ENDPOINT.to_string(),
        }
    }

    /// Replace the default scope list.
    pub fn with_scopes(mut self, scopes: impl Into<String>) -> Self {
        self.scopes = scopes.into();
        self
    }
}
