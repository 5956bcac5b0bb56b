//! The two access flows that own a bearer token and keep it valid.
//!
//! Both flows share one contract, [`AccessFlow`]: `validate_token` performs
//! the flow's re-authentication when the stored token has lapsed, and
//! `access_token` hands out the current bearer string. [`Client`] calls
//! `validate_token` before every request, so a lapsed token is renewed on
//! the request path rather than by any background task.
//!
//! [`Client`]: crate::client::Client

use crate::{
    ClientError, ClientResult, Config, Credentials, OAuth, alphabets, generate_random_string,
    http::{Form, Headers, HttpClient},
    join_scopes,
    token::Token,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::future::Future;
use url::Url;

/// Form and query keys understood by the accounts service.
pub(crate) mod params {
    pub const CLIENT_ID: &str = "client_id";
    pub const CODE: &str = "code";
    pub const CODE_CHALLENGE: &str = "code_challenge";
    pub const CODE_CHALLENGE_METHOD: &str = "code_challenge_method";
    pub const CODE_CHALLENGE_METHOD_S256: &str = "S256";
    pub const CODE_VERIFIER: &str = "code_verifier";
    pub const GRANT_TYPE: &str = "grant_type";
    pub const GRANT_TYPE_AUTH_CODE: &str = "authorization_code";
    pub const GRANT_TYPE_CLIENT_CREDS: &str = "client_credentials";
    pub const GRANT_TYPE_REFRESH_TOKEN: &str = "refresh_token";
    pub const REDIRECT_URI: &str = "redirect_uri";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const RESPONSE_TYPE: &str = "response_type";
    pub const RESPONSE_TYPE_CODE: &str = "code";
    pub const SCOPE: &str = "scope";
    pub const SHOW_DIALOG: &str = "show_dialog";
    pub const STATE: &str = "state";
}

const VERIFIER_BYTES: usize = 43;

/// The contract every access flow exposes to the request pipeline.
pub trait AccessFlow: Send + Sync {
    /// If the current instant is at or past the stored expiry, perform the
    /// flow's re-authentication; otherwise return immediately.
    fn validate_token(&self) -> impl Future<Output = ClientResult<()>> + Send;

    /// A clone of the current bearer access token.
    fn access_token(&self) -> ClientResult<String>;
}

/// Sends a grant exchange to the token endpoint and stamps the expiry
/// instant of the token it returns.
async fn fetch_access_token(
    http: &HttpClient,
    token_url: &str,
    headers: Option<&Headers>,
    payload: &Form<'_>,
) -> ClientResult<Token> {
    let response = http.post_form(token_url, headers, payload).await?;
    if !response.status.is_success() {
        return Err(ClientError::Api {
            status: response.status.as_u16(),
            message: response.status.canonical_reason().map(ToOwned::to_owned),
        });
    }
    let mut token = serde_json::from_slice::<Token>(&response.body)?;
    token.stamp_expiry();
    Ok(token)
}

/// The [authorization code flow][reference] client, covering both the
/// confidential variant (client secret, sent as HTTP Basic credentials) and
/// the public/PKCE variant (code verifier, sent in the form body). The two
/// are mutually exclusive; which one applies follows from whether
/// [`Credentials`] holds a secret.
///
/// [reference]: https://developer.spotify.com/documentation/web-api/tutorials/code-flow
#[derive(Debug, Default)]
pub struct AuthCodeFlow {
    pub creds: Credentials,
    pub oauth: OAuth,
    pub config: Config,
    /// The code verifier for the PKCE variant, set by
    /// [`Self::get_authorize_url`].
    pub verifier: Option<String>,
    token: RwLock<Option<Token>>,
    http: HttpClient,
}

impl AuthCodeFlow {
    pub fn new(creds: Credentials, oauth: OAuth) -> Self {
        Self {
            creds,
            oauth,
            ..Self::default()
        }
    }

    /// Same as [`Self::new`] but with an extra parameter to configure the
    /// endpoint locations.
    pub fn with_config(creds: Credentials, oauth: OAuth, config: Config) -> Self {
        Self {
            creds,
            oauth,
            config,
            ..Self::default()
        }
    }

    /// Resumes a flow from a previously obtained token, e.g. one a caller
    /// persisted across runs.
    pub fn from_token(creds: Credentials, oauth: OAuth, token: Token) -> Self {
        Self {
            creds,
            oauth,
            token: RwLock::new(Some(token)),
            ..Self::default()
        }
    }

    /// A clone of the currently held token, if any.
    pub fn token(&self) -> Option<Token> {
        self.token.read().clone()
    }

    /// Generate the verifier code and the challenge code for PKCE.
    fn generate_codes(verifier_bytes: usize) -> (String, String) {
        debug_assert!(verifier_bytes >= 43);
        debug_assert!(verifier_bytes <= 128);
        // The code verifier is just the randomly generated string.
        let verifier = generate_random_string(verifier_bytes, alphabets::PKCE_CODE_VERIFIER);
        // The code challenge is the code verifier hashed with SHA256 and then
        // encoded with base64url.
        //
        // NOTE: base64url != base64; it uses a different set of characters.
        // See https://datatracker.ietf.org/doc/html/rfc4648#section-5 for
        // more information.
        let mut hasher = Sha256::new();
        hasher.update(verifier.as_bytes());
        let challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());

        (verifier, challenge)
    }

    /// Returns the URL needed to authorize the current client as the first
    /// step in the authorization flow. Pure string assembly; no request is
    /// made.
    ///
    /// In the PKCE variant this also generates the verifier/challenge pair
    /// and stores the verifier for the later [`Self::request_token`] call.
    /// `show_dialog` forces the approval dialog even when the user already
    /// approved the application.
    ///
    /// [reference]: https://developer.spotify.com/documentation/web-api/tutorials/code-flow
    pub fn get_authorize_url(&mut self, show_dialog: bool) -> ClientResult<String> {
        tracing::debug!("building authorize URL");

        let challenge = if self.creds.secret.is_none() {
            let (verifier, challenge) = Self::generate_codes(VERIFIER_BYTES);
            // The verifier will be needed later when requesting the token
            self.verifier = Some(verifier);
            Some(challenge)
        } else {
            None
        };

        let scopes = join_scopes(&self.oauth.scopes);
        let mut payload: Vec<(&str, &str)> = vec![
            (params::CLIENT_ID, &self.creds.id),
            (params::RESPONSE_TYPE, params::RESPONSE_TYPE_CODE),
            (params::REDIRECT_URI, &self.oauth.redirect_uri),
            (params::STATE, &self.oauth.state),
        ];
        if !scopes.is_empty() {
            payload.push((params::SCOPE, &scopes));
        }
        if show_dialog {
            payload.push((params::SHOW_DIALOG, "true"));
        }
        if let Some(challenge) = &challenge {
            payload.push((
                params::CODE_CHALLENGE_METHOD,
                params::CODE_CHALLENGE_METHOD_S256,
            ));
            payload.push((params::CODE_CHALLENGE, challenge));
        }

        let parsed = Url::parse_with_params(&self.config.authorize_url, payload)?;
        Ok(parsed.into())
    }

    /// Exchanges the one-time authorization code from the consent redirect
    /// for a token set.
    ///
    /// Exactly one of a client secret and a PKCE code verifier must be held;
    /// holding both or neither is an error raised before any request.
    pub async fn request_token(&self, code: &str) -> ClientResult<()> {
        tracing::info!("requesting auth code token");

        let mut data = Form::new();
        data.insert(params::GRANT_TYPE, params::GRANT_TYPE_AUTH_CODE);
        data.insert(params::CODE, code);
        data.insert(params::REDIRECT_URI, &self.oauth.redirect_uri);

        let headers = match (&self.creds.secret, &self.verifier) {
            (Some(_), Some(_)) => {
                return Err(ClientError::InvalidArgument(
                    "only one of a client secret and a PKCE code verifier may be supplied"
                        .to_owned(),
                ));
            }
            (Some(_), None) => self.creds.auth_headers(),
            (None, Some(verifier)) => {
                data.insert(params::CLIENT_ID, &self.creds.id);
                data.insert(params::CODE_VERIFIER, verifier);
                None
            }
            (None, None) => {
                return Err(ClientError::InvalidArgument(
                    "a client secret or a PKCE code verifier is required; for PKCE, call \
                     `get_authorize_url` first"
                        .to_owned(),
                ));
            }
        };

        let token =
            fetch_access_token(&self.http, &self.config.token_url, headers.as_ref(), &data)
                .await?;
        *self.token.write() = Some(token);
        Ok(())
    }

    /// Obtains a new token set with the stored refresh token. The accounts
    /// service may rotate the refresh token; when it doesn't, the previous
    /// one is kept.
    pub async fn refresh_token(&self) -> ClientResult<()> {
        tracing::info!("refreshing auth code token");

        let refresh_token = self
            .token
            .read()
            .as_ref()
            .and_then(|token| token.refresh_token.clone())
            .ok_or(ClientError::InvalidToken)?;

        let mut data = Form::new();
        data.insert(params::GRANT_TYPE, params::GRANT_TYPE_REFRESH_TOKEN);
        data.insert(params::REFRESH_TOKEN, &refresh_token);

        let headers = self.creds.auth_headers();
        if headers.is_none() {
            data.insert(params::CLIENT_ID, &self.creds.id);
        }

        let mut token =
            fetch_access_token(&self.http, &self.config.token_url, headers.as_ref(), &data)
                .await?;
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token);
        }
        *self.token.write() = Some(token);
        Ok(())
    }
}

impl AccessFlow for AuthCodeFlow {
    async fn validate_token(&self) -> ClientResult<()> {
        // The lock is released before refreshing: concurrent callers that
        // both observe a lapsed token will both refresh, last write winning.
        let expired = self.token.read().as_ref().is_some_and(Token::is_expired);
        if expired {
            self.refresh_token().await?;
        }
        Ok(())
    }

    fn access_token(&self) -> ClientResult<String> {
        self.token
            .read()
            .as_ref()
            .map(|token| token.access_token.clone())
            .ok_or(ClientError::InvalidToken)
    }
}

/// The [client credentials flow][reference] client, for server-to-server
/// requests with no user context. There is no refresh token and no scopes
/// are ever granted; renewing the token re-runs the credentials exchange.
///
/// [reference]: https://developer.spotify.com/documentation/web-api/tutorials/client-credentials-flow
#[derive(Debug, Default)]
pub struct ClientCredsFlow {
    pub creds: Credentials,
    pub config: Config,
    token: RwLock<Option<Token>>,
    http: HttpClient,
}

impl ClientCredsFlow {
    pub fn new(creds: Credentials) -> Self {
        Self {
            creds,
            ..Self::default()
        }
    }

    /// Same as [`Self::new`] but with an extra parameter to configure the
    /// endpoint locations.
    pub fn with_config(creds: Credentials, config: Config) -> Self {
        Self {
            creds,
            config,
            ..Self::default()
        }
    }

    /// A clone of the currently held token, if any.
    pub fn token(&self) -> Option<Token> {
        self.token.read().clone()
    }

    /// Runs the client credentials exchange. This flow has no user consent
    /// step, so this both obtains the first token and renews lapsed ones.
    pub async fn request_token(&self) -> ClientResult<()> {
        tracing::info!("requesting client credentials token");

        let headers = self.creds.auth_headers().ok_or_else(|| {
            ClientError::InvalidArgument(
                "the client credentials flow requires a client secret".to_owned(),
            )
        })?;

        let mut data = Form::new();
        data.insert(params::GRANT_TYPE, params::GRANT_TYPE_CLIENT_CREDS);

        let token =
            fetch_access_token(&self.http, &self.config.token_url, Some(&headers), &data).await?;
        *self.token.write() = Some(token);
        Ok(())
    }
}

impl AccessFlow for ClientCredsFlow {
    async fn validate_token(&self) -> ClientResult<()> {
        let expired = self.token.read().as_ref().is_some_and(Token::is_expired);
        if expired {
            self.request_token().await?;
        }
        Ok(())
    }

    fn access_token(&self) -> ClientResult<String> {
        self.token
            .read()
            .as_ref()
            .map(|token| token.access_token.clone())
            .ok_or(ClientError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pkce_challenge_matches_the_rfc_7636_vector() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let mut hasher = Sha256::new();
        hasher.update(verifier.as_bytes());
        let challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());
        assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn generated_codes_are_well_formed() {
        let (verifier, challenge) = AuthCodeFlow::generate_codes(VERIFIER_BYTES);
        assert_eq!(verifier.len(), VERIFIER_BYTES);
        assert!(
            verifier
                .bytes()
                .all(|b| alphabets::PKCE_CODE_VERIFIER.contains(&b))
        );
        // SHA-256 digest, base64url without padding
        assert_eq!(challenge.len(), 43);
        assert!(!challenge.contains('='));
    }

    #[test]
    fn authorize_url_includes_a_challenge_only_for_pkce() {
        let oauth = OAuth {
            redirect_uri: "http://127.0.0.1:8888/callback".to_owned(),
            state: "somestate".to_owned(),
            scopes: ["user-read-private".to_owned()].into(),
        };

        let mut pkce = AuthCodeFlow::new(Credentials::new_pkce("clientid"), oauth.clone());
        let url = pkce.get_authorize_url(false).unwrap();
        assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("code_challenge="));
        assert!(url.contains("state=somestate"));
        assert!(url.contains("scope=user-read-private"));
        assert!(!url.contains("show_dialog"));
        assert!(pkce.verifier.is_some());

        let mut confidential =
            AuthCodeFlow::new(Credentials::new("clientid", "clientsecret"), oauth);
        let url = confidential.get_authorize_url(true).unwrap();
        assert!(!url.contains("code_challenge"));
        assert!(url.contains("show_dialog=true"));
        assert!(confidential.verifier.is_none());
    }

    #[tokio::test]
    async fn secret_and_verifier_together_fail_before_any_request() {
        let mut flow = AuthCodeFlow::new(
            Credentials::new("clientid", "clientsecret"),
            OAuth::default(),
        );
        flow.verifier = Some("averifier".to_owned());
        // The config points at the real accounts service; the call must fail
        // without ever reaching it.
        let err = flow.request_token("somecode").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn a_flow_without_secret_or_verifier_is_rejected() {
        let flow = AuthCodeFlow::new(Credentials::new_pkce("clientid"), OAuth::default());
        let err = flow.request_token("somecode").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn client_creds_flow_requires_a_secret() {
        let flow = ClientCredsFlow::new(Credentials::new_pkce("clientid"));
        let err = flow.request_token().await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }

    #[test]
    fn access_token_errors_until_authenticated() {
        let flow = ClientCredsFlow::new(Credentials::new("clientid", "clientsecret"));
        assert!(matches!(
            flow.access_token(),
            Err(ClientError::InvalidToken)
        ));
    }
}
