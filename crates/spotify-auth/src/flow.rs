//! Login flow entry points
//!
//! `begin_login` and `complete_login` are deliberately two independent
//! entry points rather than two halves of one coroutine: the authorization
//! step navigates the whole browser away to the accounts origin, so the
//! only thing connecting them is the verifier persisted in the
//! `SessionStore`. There is no in-process continuation to cancel or time
//! out — an abandoned authorization simply never delivers a callback.

use tracing::{info, warn};
use url::form_urlencoded;

use crate::app::OAuthApp;
use crate::error::{Error, Result};
use crate::pkce;
use crate::session::SessionStore;
use crate::token;

/// What the callback query string carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectQuery {
    /// `?code=` — the user authorized; the exchange can proceed.
    Code(String),
    /// `?error=` — the user denied consent or the provider failed.
    Denied(String),
    /// Neither parameter — no redirect is pending.
    None,
}

impl RedirectQuery {
    /// Parse the raw query string (without the leading `?`) delivered to
    /// the redirect URI. An `error` parameter wins over `code`.
    pub fn parse(query: &str) -> Self {
        let mut code = None;
        let mut error = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                _ => {}
            }
        }
        if let Some(reason) = error {
            RedirectQuery::Denied(reason)
        } else if let Some(code) = code {
            RedirectQuery::Code(code)
        } else {
            RedirectQuery::None
        }
    }
}

/// Result of `complete_login`.
#[derive(Debug)]
pub enum LoginOutcome {
    /// The code was exchanged and the token persisted.
    LoggedIn,
    /// The provider reported an error (e.g. `access_denied`). No exchange
    /// was attempted; the reason is the provider's `error` value.
    Denied(String),
    /// The query carried no redirect parameters. The caller falls back to
    /// any previously persisted token.
    NoRedirect,
}

/// Start a login attempt: generate a fresh verifier/challenge pair,
/// persist the verifier, and return the authorization URL the browser must
/// navigate to.
///
/// The returned URL is a full-page redirect target, not an in-page
/// request; control resumes only via a later call to `complete_login`.
pub async fn begin_login(store: &SessionStore, app: &OAuthApp) -> Result<String> {
    let verifier = pkce::generate_verifier();
    let challenge = pkce::compute_challenge(&verifier);
    store.store_verifier(verifier).await?;
    info!("login initiated, handing off to authorization endpoint");
    Ok(pkce::build_authorization_url(app, &challenge))
}

/// Finish a login attempt from the callback query string.
///
/// - `?error=` → `Denied`, no network call
/// - `?code=` with no stored verifier → `Error::MissingVerifier`, no
///   network call
/// - `?code=` with a verifier → exchange, persist the token, `LoggedIn`
/// - neither → `NoRedirect`
///
/// The caller is responsible for stripping the query from the visible URL
/// (here: redirecting after the callback) so a reload cannot replay the
/// single-use code.
pub async fn complete_login(
    client: &reqwest::Client,
    store: &SessionStore,
    app: &OAuthApp,
    query: &str,
) -> Result<LoginOutcome> {
    match RedirectQuery::parse(query) {
        RedirectQuery::Denied(reason) => {
            warn!(%reason, "authorization denied by provider");
            Ok(LoginOutcome::Denied(reason))
        }
        RedirectQuery::None => Ok(LoginOutcome::NoRedirect),
        RedirectQuery::Code(code) => {
            let verifier = store
                .take_verifier()
                .await?
                .ok_or(Error::MissingVerifier)?;
            let tokens = token::exchange_code(client, app, &code, &verifier).await?;
            store.save_token(tokens.access_token).await?;
            info!("login complete, access token persisted");
            Ok(LoginOutcome::LoggedIn)
        }
    }
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
    fn parse_extracts_code() {
        assert_eq!(
            RedirectQuery::parse("code=ABC123"),
            RedirectQuery::Code("ABC123".into())
        );
    }

    #[test]
    fn parse_extracts_error() {
        assert_eq!(
            RedirectQuery::parse("error=access_denied"),
            RedirectQuery::Denied("access_denied".into())
        );
    }

    #[test]
    fn parse_error_wins_over_code() {
        assert_eq!(
            RedirectQuery::parse("code=ABC123&error=server_error"),
            RedirectQuery::Denied("server_error".into())
        );
    }

    #[test]
    fn parse_empty_query_is_none() {
        assert_eq!(RedirectQuery::parse(""), RedirectQuery::None);
        assert_eq!(RedirectQuery::parse("state=xyz"), RedirectQuery::None);
    }

    #[test]
    fn parse_decodes_percent_encoding() {
        assert_eq!(
            RedirectQuery::parse("error=access%20denied"),
            RedirectQuery::Denied("access denied".into())
        );
    }

    /// App whose token endpoint is unroutable — any network call fails
    /// loudly, so tests that must not touch the network would error.
    fn offline_app() -> OAuthApp {
        let mut app = OAuthApp::spotify("client-123", "http://127.0.0.1:8888/callback");
        app.token_endpoint = "http://192.0.2.1:1/api/token".into();
        app
    }

    async fn fresh_store(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::load(dir.path().join("session.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn begin_login_persists_verifier_matching_challenge() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;
        let app = offline_app();

        let url = begin_login(&store, &app).await.unwrap();
        let parsed = url::Url::parse(&url).unwrap();
        let challenge = parsed
            .query_pairs()
            .find(|(k, _)| k == "code_challenge")
            .map(|(_, v)| v.into_owned())
            .unwrap();

        let verifier = store.take_verifier().await.unwrap().unwrap();
        assert_eq!(pkce::compute_challenge(&verifier), challenge);
    }

    #[tokio::test]
    async fn successive_logins_produce_distinct_verifiers() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;
        let app = offline_app();

        begin_login(&store, &app).await.unwrap();
        let first = store.take_verifier().await.unwrap().unwrap();
        begin_login(&store, &app).await.unwrap();
        let second = store.take_verifier().await.unwrap().unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn denied_callback_skips_the_exchange() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;
        let app = offline_app();
        let client = reqwest::Client::new();

        // A network call would fail against the unroutable endpoint, so a
        // Denied outcome proves no exchange was attempted.
        let outcome = complete_login(&client, &store, &app, "error=access_denied")
            .await
            .unwrap();
        match outcome {
            LoginOutcome::Denied(reason) => assert_eq!(reason, "access_denied"),
            other => panic!("expected Denied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn code_without_verifier_fails_before_any_network_call() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;
        let app = offline_app();
        let client = reqwest::Client::new();

        let err = complete_login(&client, &store, &app, "code=ABC123")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingVerifier));
    }

    #[tokio::test]
    async fn empty_query_reports_no_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;
        let app = offline_app();
        let client = reqwest::Client::new();

        let outcome = complete_login(&client, &store, &app, "").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::NoRedirect));
    }

    #[derive(serde::Deserialize)]
    struct ExchangeForm {
        grant_type: String,
        code: String,
        code_verifier: String,
    }

    /// Token endpoint that verifies the S256 binding the way the real
    /// authorization server does: recompute the challenge from the
    /// submitted verifier and compare against the one sent at authorize
    /// time.
    async fn spawn_verifying_endpoint(expected_challenge: String) -> String {
        let handler = move |Form(form): Form<ExchangeForm>| {
            let expected = expected_challenge.clone();
            async move {
                if form.grant_type == "authorization_code"
                    && form.code == "ABC123"
                    && pkce::compute_challenge(&form.code_verifier) == expected
                {
                    axum::Json(serde_json::json!({
                        "access_token": "at_e2e",
                        "token_type": "Bearer",
                        "expires_in": 3600
                    }))
                    .into_response()
                } else {
                    (
                        StatusCode::BAD_REQUEST,
                        axum::Json(serde_json::json!({
                            "error": "invalid_grant",
                            "error_description": "challenge mismatch"
                        })),
                    )
                        .into_response()
                }
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

    #[tokio::test]
    async fn end_to_end_login_persists_the_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;
        let mut app = OAuthApp::spotify("client-123", "http://127.0.0.1:8888/callback");
        let client = reqwest::Client::new();

        let url = begin_login(&store, &app).await.unwrap();
        let challenge = url::Url::parse(&url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "code_challenge")
            .map(|(_, v)| v.into_owned())
            .unwrap();

        app.token_endpoint = spawn_verifying_endpoint(challenge).await;

        let outcome = complete_login(&client, &store, &app, "code=ABC123")
            .await
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::LoggedIn));
        assert_eq!(store.access_token().await.unwrap().expose(), "at_e2e");
        // The verifier was consumed; a replayed callback cannot re-exchange
        assert_eq!(store.take_verifier().await.unwrap(), None);
    }

    #[tokio::test]
    async fn exchange_failure_surfaces_provider_description() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;
        let mut app = OAuthApp::spotify("client-123", "http://127.0.0.1:8888/callback");
        let client = reqwest::Client::new();

        begin_login(&store, &app).await.unwrap();
        // Endpoint expects a different challenge, so the exchange fails
        app.token_endpoint = spawn_verifying_endpoint("some-other-challenge".into()).await;

        let err = complete_login(&client, &store, &app, "code=ABC123")
            .await
            .unwrap_err();
        match err {
            Error::TokenExchange(desc) => {
                assert!(desc.contains("challenge mismatch"), "got: {desc}")
            }
            other => panic!("expected TokenExchange, got {other:?}"),
        }
        // The failed attempt consumed the verifier; the flow must restart
        assert_eq!(store.take_verifier().await.unwrap(), None);
        assert!(store.access_token().await.is_none());
    }
}
