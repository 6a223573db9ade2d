//! Authorization-code token exchange
//!
//! The single token-endpoint interaction in this flow: a form-encoded POST
//! trading the authorization code plus the PKCE verifier for an access
//! token. There is no refresh grant — an expired token surfaces as a 401
//! on a later API call and forces a fresh login.

use serde::Deserialize;

use crate::app::OAuthApp;
use crate::error::{Error, Result};

/// Success response from the token endpoint.
///
/// Only `access_token` is required by contract; the remaining fields are
/// informational. `expires_in` is reported but not tracked — expiry is
/// detected by the API's own 401 response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    /// Seconds until the access token expires (delta, not absolute)
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Exchange an authorization code for an access token.
///
/// The user has authorized in their browser and the callback delivered the
/// code. Sending the code together with the verifier proves we are the
/// party that initiated the flow. The code is single-use; the caller
/// discards it whatever the outcome.
pub async fn exchange_code(
    client: &reqwest::Client,
    app: &OAuthApp,
    code: &str,
    verifier: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(&app.token_endpoint)
        .form(&[
            ("client_id", app.client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", app.redirect_uri.as_str()),
            ("code_verifier", verifier),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::TokenExchange(failure_description(
            status.as_u16(),
            &body,
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::TokenExchange(format!("invalid token response: {e}")))
}

/// Pull the provider's human-readable description out of a failure body.
///
/// Spotify returns `{"error": "...", "error_description": "..."}`;
/// `error_description` is preferred, then `error`, then the raw body when
/// it isn't JSON at all.
fn failure_description(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(desc) = value.get("error_description").and_then(|d| d.as_str()) {
            return format!("token endpoint returned {status}: {desc}");
        }
        if let Some(code) = value.get("error").and_then(|e| e.as_str()) {
            return format!("token endpoint returned {status}: {code}");
        }
    }
    format!("token endpoint returned {status}: {body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::Form;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;

    #[test]
    fn token_response_requires_only_access_token() {
        let token: TokenResponse = serde_json::from_str(r#"{"access_token":"at_abc"}"#).unwrap();
        assert_eq!(token.access_token, "at_abc");
        assert!(token.expires_in.is_none());
    }

    #[test]
    fn token_response_deserializes_full_body() {
        let json = r#"{"access_token":"at_abc","token_type":"Bearer","scope":"user-top-read","expires_in":3600}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "at_abc");
        assert_eq!(token.token_type.as_deref(), Some("Bearer"));
        assert_eq!(token.expires_in, Some(3600));
    }

    #[test]
    fn failure_description_prefers_error_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#;
        let desc = failure_description(400, body);
        assert!(desc.contains("Invalid authorization code"), "got: {desc}");
    }

    #[test]
    fn failure_description_falls_back_to_error_code() {
        let desc = failure_description(400, r#"{"error":"invalid_grant"}"#);
        assert!(desc.contains("invalid_grant"), "got: {desc}");
    }

    #[test]
    fn failure_description_passes_through_non_json() {
        let desc = failure_description(502, "bad gateway");
        assert!(desc.contains("502"));
        assert!(desc.contains("bad gateway"));
    }

    #[derive(serde::Deserialize)]
    struct ExchangeForm {
        client_id: String,
        grant_type: String,
        code: String,
        redirect_uri: String,
        code_verifier: String,
    }

    /// Local token endpoint that accepts exactly one (code, verifier) pair.
    async fn spawn_token_endpoint() -> String {
        let handler = |Form(form): Form<ExchangeForm>| async move {
            if form.grant_type == "authorization_code"
                && form.client_id == "client-123"
                && form.redirect_uri == "http://127.0.0.1:8888/callback"
                && form.code == "ABC123"
                && form.code_verifier == "good-verifier"
            {
                axum::Json(serde_json::json!({
                    "access_token": "at_mock",
                    "token_type": "Bearer",
                    "expires_in": 3600
                }))
                .into_response()
            } else {
                (
                    StatusCode::BAD_REQUEST,
                    axum::Json(serde_json::json!({
                        "error": "invalid_grant",
                        "error_description": "code or verifier rejected"
                    })),
                )
                    .into_response()
            }
        };

        let router = Router::new().route("/api/token", post(handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api/token")
    }

    fn test_app(token_endpoint: String) -> OAuthApp {
        let mut app = OAuthApp::spotify("client-123", "http://127.0.0.1:8888/callback");
        app.token_endpoint = token_endpoint;
        app
    }

    #[tokio::test]
    async fn exchange_returns_token_on_success() {
        let app = test_app(spawn_token_endpoint().await);
        let client = reqwest::Client::new();

        let token = exchange_code(&client, &app, "ABC123", "good-verifier")
            .await
            .unwrap();
        assert_eq!(token.access_token, "at_mock");
    }

    #[tokio::test]
    async fn exchange_surfaces_provider_description_on_failure() {
        let app = test_app(spawn_token_endpoint().await);
        let client = reqwest::Client::new();

        let err = exchange_code(&client, &app, "ABC123", "wrong-verifier")
            .await
            .unwrap_err();
        match err {
            Error::TokenExchange(desc) => {
                assert!(desc.contains("code or verifier rejected"), "got: {desc}")
            }
            other => panic!("expected TokenExchange, got {other:?}"),
        }
    }
}
