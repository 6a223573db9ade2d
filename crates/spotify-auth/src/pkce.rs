//! PKCE (Proof Key for Code Exchange) implementation per RFC 7636
//!
//! Generates the code verifier and S256 challenge used during the OAuth
//! authorization flow. The verifier is held in the session store across the
//! redirect and sent during token exchange; the challenge is included in
//! the authorization URL so the authorization server can verify the
//! exchange request came from the same party that initiated the flow.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use sha2::{Digest, Sha256};
use url::form_urlencoded;

use crate::app::OAuthApp;

/// Generate a cryptographically random PKCE code verifier.
///
/// Produces 32 random bytes hex-encoded to 64 characters. RFC 7636 requires
/// 43-128 characters from the unreserved URL set; lowercase hex satisfies
/// both bounds.
pub fn generate_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Compute the S256 code challenge from a verifier.
///
/// `challenge = BASE64URL(SHA256(verifier))` — deterministic and pure.
/// The output never contains `+`, `/`, or `=`.
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Build the full authorization URL with all required OAuth parameters.
///
/// `show_dialog=true` forces the consent screen even for a previously
/// authorized user, matching the dashboard's explicit-login behavior.
pub fn build_authorization_url(app: &OAuthApp, challenge: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", &app.client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", &app.redirect_uri)
        .append_pair("scope", &app.scopes)
        .append_pair("code_challenge_method", "S256")
        .append_pair("code_challenge", challenge)
        .append_pair("show_dialog", "true")
        .finish();
    format!("{}?{}", app.authorize_endpoint, query)
}
