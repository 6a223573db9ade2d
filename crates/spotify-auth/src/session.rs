//! Durable session storage
//!
//! The browser original kept the access token and the in-flight code
//! verifier in origin-scoped localStorage so they survive the full-page
//! redirect to the authorization server. Here the same two slots live in a
//! JSON file next to the dashboard config. All writes use atomic temp-file
//! + rename to prevent corruption on crash, and the file is 0600 since it
//! holds a bearer token.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::secret::Secret;

/// On-disk shape of the session file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct SessionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    /// Present only between `begin_login` and `complete_login`.
    #[serde(skip_serializing_if = "Option::is_none")]
    code_verifier: Option<String>,
}

/// File-backed store for the access token and the pending PKCE verifier.
///
/// This is the only mutable session state in the system: no module-level
/// globals. The Mutex serializes read-modify-write cycles on the file when
/// handler tasks overlap.
pub struct SessionStore {
    path: PathBuf,
    state: Mutex<SessionState>,
}

impl SessionStore {
    /// Load the session from the given file path.
    ///
    /// A missing file is the logged-out state: starts empty and creates the
    /// file as `{}` so future loads skip the cold-start path.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading session file: {e}")))?;
            let state: SessionState = serde_json::from_str(&contents)
                .map_err(|e| Error::SessionParse(format!("parsing session file: {e}")))?;
            info!(
                path = %path.display(),
                authenticated = state.access_token.is_some(),
                "loaded session"
            );
            state
        } else {
            info!(path = %path.display(), "session file not found, starting logged out");
            let state = SessionState::default();
            write_atomic(&path, &state).await?;
            state
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Store the verifier for an in-flight login attempt.
    ///
    /// Replaces any previous verifier wholesale — verifiers are never
    /// reused across login attempts, so a restarted login invalidates the
    /// old one before the browser ever leaves the page.
    pub async fn store_verifier(&self, verifier: String) -> Result<()> {
        let mut state = self.state.lock().await;
        state.code_verifier = Some(verifier);
        debug!("stored code verifier for pending login");
        write_atomic(&self.path, &state).await
    }

    /// Remove and return the pending verifier (single use).
    ///
    /// The removal is persisted immediately so a replayed callback cannot
    /// complete a second exchange with the same verifier.
    pub async fn take_verifier(&self) -> Result<Option<String>> {
        let mut state = self.state.lock().await;
        let verifier = state.code_verifier.take();
        if verifier.is_some() {
            write_atomic(&self.path, &state).await?;
        }
        Ok(verifier)
    }

    /// Persist a freshly exchanged access token.
    ///
    /// Overwrites any previous token and drops any leftover verifier —
    /// the login attempt is finished either way.
    pub async fn save_token(&self, token: String) -> Result<()> {
        let mut state = self.state.lock().await;
        state.access_token = Some(token);
        state.code_verifier = None;
        debug!("saved access token");
        write_atomic(&self.path, &state).await
    }

    /// The stored access token, if any.
    pub async fn access_token(&self) -> Option<Secret> {
        let state = self.state.lock().await;
        state.access_token.clone().map(Secret::new)
    }

    /// Whether a token is currently stored.
    pub async fn is_authenticated(&self) -> bool {
        let state = self.state.lock().await;
        state.access_token.is_some()
    }

    /// Erase both the token and any pending verifier.
    ///
    /// Used on explicit logout and on a 401 from any authenticated call.
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.access_token = None;
        state.code_verifier = None;
        info!("session cleared");
        write_atomic(&self.path, &state).await
    }
}

/// Write the session to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. Sets 0600 permissions (owner read/write only) since the
/// file contains a bearer token.
async fn write_atomic(path: &Path, state: &SessionState) -> Result<()> {
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| Error::SessionParse(format!("serializing session: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("session path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".session.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp session file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting session file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp session file: {e}")))?;

    debug!(path = %path.display(), "persisted session");
    Ok(())
}
