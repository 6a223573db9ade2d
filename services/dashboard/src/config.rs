//! Configuration types and loading
//!
//! Config precedence: CLI `--config` > `CONFIG_PATH` env var > `dashboard.toml`.
//! There is no client secret anywhere — the Spotify app is a public PKCE
//! client, so the TOML holds only non-secret identity and server settings.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use spotify_auth::OAuthApp;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Invalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub spotify: SpotifyConfig,
    pub server: ServerConfig,
}

/// Registered Spotify application settings
#[derive(Debug, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    /// Must byte-for-byte match the redirect URI registered with Spotify.
    pub redirect_uri: String,
    /// Optional override of the default scope list.
    #[serde(default)]
    pub scopes: Option<String>,
}

/// Local HTTP server settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
}

fn default_session_file() -> PathBuf {
    PathBuf::from("session.json")
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        if config.spotify.client_id.trim().is_empty() {
            return Err(ConfigError::Invalid("client_id must not be empty".into()));
        }

        if !config.spotify.redirect_uri.starts_with("http://")
            && !config.spotify.redirect_uri.starts_with("https://")
        {
            return Err(ConfigError::Invalid(format!(
                "redirect_uri must start with http:// or https://, got: {}",
                config.spotify.redirect_uri
            )));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("dashboard.toml")
    }

    /// The OAuth application this config describes.
    pub fn oauth_app(&self) -> OAuthApp {
        let app = OAuthApp::spotify(&self.spotify.client_id, &self.spotify.redirect_uri);
        match &self.spotify.scopes {
            Some(scopes) => app.with_scopes(scopes),
            None => app,
        }
    }
}
