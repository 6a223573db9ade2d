//! Spotify OAuth authentication library
//!
//! Implements the Authorization Code with PKCE flow for a public client
//! (no client secret) plus durable session storage. This crate is a
//! standalone library with no dependency on the dashboard binary — it can
//! be tested and used independently.
//!
//! Login flow:
//! 1. `flow::begin_login()` generates a verifier/challenge pair, persists
//!    the verifier, and returns the authorization URL
//! 2. The browser navigates to that URL; Spotify redirects back to the
//!    registered URI with `?code=` or `?error=`
//! 3. `flow::complete_login()` inspects the callback query, exchanges the
//!    code via `token::exchange_code()`, and persists the access token
//! 4. A 401 from any later API call means the session is dead: callers
//!    run `SessionStore::clear()` and force a fresh login
//!
//! There is deliberately no refresh-token path: an expired access token
//! surfaces as a 401 and the user logs in again.

pub mod app;
pub mod error;
pub mod flow;
pub mod pkce;
pub mod secret;
pub mod session;
pub mod token;

pub use app::{DEFAULT_SCOPES, OAuthApp, SPOTIFY_AUTHORIZE_ENDPOINT, SPOTIFY_TOKEN_ENDPOINT};
pub use error::{Error, Result};
pub use flow::{LoginOutcome, RedirectQuery, begin_login, complete_login};
pub use pkce::{build_authorization_url, compute_challenge, generate_verifier};
pub use secret::Secret;
pub use session::SessionStore;
pub use token::{TokenResponse, exchange_code};
