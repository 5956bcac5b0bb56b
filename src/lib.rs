//! An asynchronous client for the Spotify Web API.
//!
//! The crate is split into the pieces a request travels through:
//!
//! * [`auth`] — the two access flows ([`AuthCodeFlow`], [`ClientCredsFlow`])
//!   that own a bearer token and re-authenticate it when it lapses.
//! * [`client`] — [`Client`], which validates the token, issues the HTTP
//!   call and maps Spotify's error envelope into [`ClientError`].
//! * [`param`] — the [`MissingOr`] wrapper used by every optional request
//!   parameter to distinguish "not supplied" from "supplied but empty".
//! * [`model`] — typed response objects, including the [`model::Page`] and
//!   [`model::CursorBasedPage`] pagination envelopes.
//!
//! ```no_run
//! use cadenza::{Client, ClientCredsFlow, Credentials, MissingOr};
//!
//! # async fn run() -> cadenza::ClientResult<()> {
//! let creds = Credentials::from_env().expect("missing SPOTIFY_CLIENT_ID");
//! let flow = ClientCredsFlow::new(creds);
//! flow.request_token().await?;
//!
//! let client = Client::new(flow);
//! let album = client.album("4aawyAB9vmqN3uQ7FjRGTy".parse().unwrap(), MissingOr::Missing).await?;
//! println!("{}", album.name);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod custom_serde;
pub mod http;
pub mod model;
pub mod param;
pub mod token;

use base64::{Engine as _, engine::general_purpose};
use rand::Rng as _;
use std::collections::HashSet;
use thiserror::Error;

pub use auth::{AccessFlow, AuthCodeFlow, ClientCredsFlow};
pub use client::Client;
pub use http::Headers;
pub use param::MissingOr;
pub use token::Token;

/// Groups up the kinds of errors that may happen in this crate.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("json parse error: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("url parse error: {0}")]
    ParseUrl(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A non-success response from the token endpoint or the resource API.
    /// The status and message come from Spotify's error envelope when one is
    /// present, otherwise from the bare HTTP status line.
    #[error("api error {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Api { status: u16, message: Option<String> },

    /// Invalid arguments detected before any request is made.
    #[error("invalid client usage: {0}")]
    InvalidArgument(String),

    #[error("token is not valid")]
    InvalidToken,
}

pub type ClientResult<T> = Result<T, ClientError>;

/// The client credentials registered for the application.
///
/// The secret is optional: the PKCE variant of the authorization code flow
/// authenticates with a code verifier instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub id: String,
    pub secret: Option<String>,
}

impl Credentials {
    pub fn new(id: &str, secret: &str) -> Self {
        Self {
            id: id.to_owned(),
            secret: Some(secret.to_owned()),
        }
    }

    /// Credentials for the PKCE variant, which needs no client secret.
    pub fn new_pkce(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            secret: None,
        }
    }

    /// Reads `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET` from the
    /// environment, loading a `.env` file first if one exists. Returns
    /// `None` when the client id is not set.
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();
        Some(Self {
            id: std::env::var("SPOTIFY_CLIENT_ID").ok()?,
            secret: std::env::var("SPOTIFY_CLIENT_SECRET").ok(),
        })
    }

    /// The HTTP Basic authorization header for the token endpoint, available
    /// only when a client secret is held.
    pub fn auth_headers(&self) -> Option<Headers> {
        let secret = self.secret.as_ref()?;
        let value = general_purpose::STANDARD.encode(format!("{}:{secret}", self.id));
        let mut headers = Headers::new();
        headers.insert("authorization".to_owned(), format!("Basic {value}"));
        Some(headers)
    }
}

/// OAuth settings for the authorization code flow: where Spotify redirects
/// after consent, the CSRF state echoed through the redirect, and the scopes
/// to request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OAuth {
    pub redirect_uri: String,
    pub state: String,
    pub scopes: HashSet<String>,
}

impl Default for OAuth {
    fn default() -> Self {
        Self {
            redirect_uri: String::new(),
            state: generate_random_string(16, alphabets::ALPHANUM),
            scopes: HashSet::new(),
        }
    }
}

/// Endpoint locations, overridable for tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Base of the resource API; every request path is appended to it.
    pub api_base_url: String,
    /// The token endpoint all grant exchanges POST to.
    pub token_url: String,
    /// The consent screen the authorization URL points at.
    pub authorize_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.spotify.com/v1/".to_owned(),
            token_url: "https://accounts.spotify.com/api/token".to_owned(),
            authorize_url: "https://accounts.spotify.com/authorize".to_owned(),
        }
    }
}

pub mod alphabets {
    pub const ALPHANUM: &[u8] =
        b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    /// The characters a PKCE code verifier may contain, per RFC 7636.
    pub const PKCE_CODE_VERIFIER: &[u8] =
        b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-._~";
}

/// Generate `length` random chars from the given alphabet.
pub(crate) fn generate_random_string(length: usize, alphabet: &[u8]) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

/// Join scopes into the space-separated form the accounts service expects.
pub(crate) fn join_scopes(scopes: &HashSet<String>) -> String {
    scopes
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_header_encodes_id_and_secret() {
        let creds = Credentials::new("id123", "secret456");
        let headers = creds.auth_headers().unwrap();
        // base64("id123:secret456")
        assert_eq!(
            headers.get("authorization").map(String::as_str),
            Some("Basic aWQxMjM6c2VjcmV0NDU2")
        );
    }

    #[test]
    fn pkce_credentials_have_no_auth_header() {
        assert!(Credentials::new_pkce("id123").auth_headers().is_none());
    }

    #[test]
    fn random_strings_stay_in_alphabet() {
        let state = generate_random_string(43, alphabets::PKCE_CODE_VERIFIER);
        assert_eq!(state.len(), 43);
        assert!(
            state
                .bytes()
                .all(|b| alphabets::PKCE_CODE_VERIFIER.contains(&b))
        );
    }
}
