//! HTTP surface of the dashboard
//!
//! `/login`, `/callback`, and `/logout` drive the PKCE session lifecycle;
//! the `/api/*` panels serve retrieved and aggregated stats as JSON. All
//! rendering lives in the browser — this service only moves data.
//!
//! Session-invalidation policy: an `Unauthorized` from any API call clears
//! the stored session and answers 401, forcing a fresh `/login`.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use tracing::{error, info, warn};

use spotify_auth::{Error as AuthError, LoginOutcome, OAuthApp, SessionStore, flow};
use spotify_stats::{Error as StatsError, StatsClient, TimeRange, aggregate};

/// Shared application state accessible from all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub app: Arc<OAuthApp>,
    pub http: reqwest::Client,
    /// Web API base; tests point this at a local mock.
    pub api_base: String,
    pub started_at: Instant,
}

/// Build the axum router with all routes and shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", post(logout))
        .route("/api/me", get(me))
        .route("/api/top/artists", get(top_artists))
        .route("/api/top/tracks", get(top_tracks))
        .route("/api/top/albums", get(top_albums))
        .route("/api/genres", get(genres))
        .route("/api/summary", get(summary))
        .route("/api/recent", get(recent))
        .with_state(state)
}

fn json_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        axum::Json(serde_json::json!({ "error": code, "message": message })),
    )
        .into_response()
}

async fn index(State(state): State<AppState>) -> Response {
    axum::Json(serde_json::json!({
        "service": "vtrack-dashboard",
        "authenticated": state.store.is_authenticated().await,
        "endpoints": [
            "/login", "/callback", "/logout", "/health",
            "/api/me", "/api/top/artists", "/api/top/tracks",
            "/api/top/albums", "/api/genres", "/api/summary", "/api/recent"
        ]
    }))
    .into_response()
}

async fn health(State(state): State<AppState>) -> Response {
    axum::Json(serde_json::json!({
        "status": "ok",
        "authenticated": state.store.is_authenticated().await,
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
    .into_response()
}

/// GET /login — start a fresh login attempt and hand the browser off to
/// the authorization endpoint.
async fn login(State(state): State<AppState>) -> Response {
    match flow::begin_login(&state.store, &state.app).await {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => {
            error!(error = %e, "failed to begin login");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "login_failed",
                &e.to_string(),
            )
        }
    }
}

/// GET /callback — the registered redirect URI. Redirecting to `/` after
/// processing strips the single-use code from the visible URL, so a
/// reload cannot replay it.
async fn callback(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let query = query.unwrap_or_default();
    match flow::complete_login(&state.http, &state.store, &state.app, &query).await {
        Ok(LoginOutcome::LoggedIn) => Redirect::to("/").into_response(),
        Ok(LoginOutcome::NoRedirect) => Redirect::to("/").into_response(),
        Ok(LoginOutcome::Denied(reason)) => {
            json_error(StatusCode::UNAUTHORIZED, "authorization_denied", &reason)
        }
        Err(AuthError::MissingVerifier) => json_error(
            StatusCode::BAD_REQUEST,
            "missing_verifier",
            "no login attempt is pending; restart via /login",
        ),
        Err(e) => {
            error!(error = %e, "token exchange failed");
            json_error(StatusCode::BAD_GATEWAY, "token_exchange_failed", &e.to_string())
        }
    }
}

/// POST /logout — erase the stored token and any pending verifier.
async fn logout(State(state): State<AppState>) -> Response {
    match state.store.clear().await {
        Ok(()) => {
            info!("logged out");
            axum::Json(serde_json::json!({ "status": "logged_out" })).into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to clear session");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "logout_failed",
                &e.to_string(),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct RangeParams {
    #[serde(default)]
    range: Option<String>,
}

fn parse_range(params: &RangeParams) -> Result<TimeRange, Response> {
    match params.range.as_deref() {
        None => Ok(TimeRange::default()),
        Some(s) => TimeRange::parse(s).ok_or_else(|| {
            json_error(
                StatusCode::BAD_REQUEST,
                "invalid_range",
                "range must be one of short, medium, long",
            )
        }),
    }
}

/// A stats client for the stored token, or a 401 when logged out.
async fn stats_client(state: &AppState) -> Result<StatsClient, Response> {
    match state.store.access_token().await {
        Some(token) => Ok(StatsClient::new(state.http.clone(), token)
            .with_api_base(state.api_base.clone())),
        None => Err(json_error(
            StatusCode::UNAUTHORIZED,
            "not_authenticated",
            "no access token stored; log in via /login",
        )),
    }
}

/// Map a stats error onto a response. A rejected token destroys the
/// session so the next request starts the re-login path.
async fn stats_error(state: &AppState, err: StatsError) -> Response {
    match err {
        StatsError::Unauthorized => {
            warn!("token rejected by the API, clearing session");
            if let Err(e) = state.store.clear().await {
                error!(error = %e, "failed to clear session");
            }
            json_error(
                StatusCode::UNAUTHORIZED,
                "session_expired",
                "access token rejected; log in again via /login",
            )
        }
        StatsError::Api { status, message } => json_error(
            StatusCode::BAD_GATEWAY,
            "api_error",
            &format!("{status}: {message}"),
        ),
        other => json_error(StatusCode::BAD_GATEWAY, "upstream_error", &other.to_string()),
    }
}

async fn me(State(state): State<AppState>) -> Response {
    let client = match stats_client(&state).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match client.profile().await {
        Ok(profile) => axum::Json(profile).into_response(),
        Err(e) => stats_error(&state, e).await,
    }
}

async fn top_artists(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Response {
    let range = match parse_range(&params) {
        Ok(r) => r,
        Err(r) => return r,
    };
    let client = match stats_client(&state).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match client.top_artists(range, 50).await {
        Ok(page) => axum::Json(serde_json::json!({ "items": page.items })).into_response(),
        Err(e) => stats_error(&state, e).await,
    }
}

async fn top_tracks(State(state): State<AppState>, Query(params): Query<RangeParams>) -> Response {
    let range = match parse_range(&params) {
        Ok(r) => r,
        Err(r) => return r,
    };
    let client = match stats_client(&state).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match client.top_tracks(range, 50).await {
        Ok(page) => axum::Json(serde_json::json!({ "items": page.items })).into_response(),
        Err(e) => stats_error(&state, e).await,
    }
}

/// Top albums are derived: counted out of the top tracks, since the API
/// has no top-albums endpoint.
async fn top_albums(State(state): State<AppState>, Query(params): Query<RangeParams>) -> Response {
    let range = match parse_range(&params) {
        Ok(r) => r,
        Err(r) => return r,
    };
    let client = match stats_client(&state).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match client.top_tracks(range, 50).await {
        Ok(page) => {
            let albums = aggregate::top_albums(&page.items, 50);
            axum::Json(serde_json::json!({ "items": albums })).into_response()
        }
        Err(e) => stats_error(&state, e).await,
    }
}

/// Derived genre ranking over the top artists.
async fn genres(State(state): State<AppState>, Query(params): Query<RangeParams>) -> Response {
    let range = match parse_range(&params) {
        Ok(r) => r,
        Err(r) => return r,
    };
    let client = match stats_client(&state).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match client.top_artists(range, 50).await {
        Ok(page) => {
            let genres = aggregate::top_genres(&page.items, 10);
            axum::Json(serde_json::json!({ "genres": genres })).into_response()
        }
        Err(e) => stats_error(&state, e).await,
    }
}

/// Duration/popularity aggregate over the top tracks.
async fn summary(State(state): State<AppState>, Query(params): Query<RangeParams>) -> Response {
    let range = match parse_range(&params) {
        Ok(r) => r,
        Err(r) => return r,
    };
    let client = match stats_client(&state).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match client.top_tracks(range, 50).await {
        Ok(page) => axum::Json(aggregate::summarize(&page.items)).into_response(),
        Err(e) => stats_error(&state, e).await,
    }
}

async fn recent(State(state): State<AppState>) -> Response {
    let client = match stats_client(&state).await {
        Ok(c) => c,
        Err(r) => return r,
    };
    match client.recently_played(50).await {
        Ok(page) => axum::Json(serde_json::json!({ "items": page.items })).into_response(),
        Err(e) => stats_error(&state, e).await,
    }
}
