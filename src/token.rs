//! The access token record shared by both grant flows.

use crate::custom_serde::{duration_second, space_separated_scopes};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Spotify access token information, as returned by the token endpoint.
///
/// [Reference](https://developer.spotify.com/documentation/web-api/concepts/access-token)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// An access token that can be provided in subsequent calls.
    pub access_token: String,
    /// How the access token may be used; always "Bearer".
    pub token_type: String,
    /// The time period for which the access token is valid.
    #[serde(with = "duration_second")]
    pub expires_in: Duration,
    /// The absolute instant the token lapses, computed when the token is
    /// received. Unset only for tokens built by hand.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// A token that can be sent to the accounts service in place of an
    /// authorization code to obtain the next access token. Only the
    /// authorization code flow ever holds one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// The scopes granted for this access token. Empty for the client
    /// credentials flow.
    // The token response carries these as one space-separated string.
    #[serde(default, with = "space_separated_scopes", rename = "scope")]
    pub scopes: HashSet<String>,
}

impl Default for Token {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            token_type: "Bearer".to_owned(),
            expires_in: Duration::zero(),
            expires_at: Some(Utc::now()),
            refresh_token: None,
            scopes: HashSet::new(),
        }
    }
}

impl Token {
    /// Whether the current instant is at or past the stored expiry. A token
    /// without an expiry instant counts as expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_none_or(|expiration| Utc::now() >= expiration)
    }

    /// Stamps `expires_at` from `expires_in`, counting from now.
    pub(crate) fn stamp_expiry(&mut self) {
        self.expires_at = Utc::now().checked_add_signed(self.expires_in);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_the_token_endpoint_shape() {
        let token: Token = serde_json::from_str(
            r#"{
                "access_token": "NgCXRK...MzYjw",
                "token_type": "Bearer",
                "scope": "user-read-private user-read-email",
                "expires_in": 3600,
                "refresh_token": "NgAagA...Um_SHo"
            }"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "NgCXRK...MzYjw");
        assert_eq!(token.expires_in, Duration::seconds(3600));
        assert_eq!(token.refresh_token.as_deref(), Some("NgAagA...Um_SHo"));
        assert!(token.scopes.contains("user-read-private"));
        // Not stamped until the flow records when it was received.
        assert!(token.expires_at.is_none());
    }

    #[test]
    fn scope_and_refresh_token_are_optional() {
        let token: Token = serde_json::from_str(
            r#"{"access_token": "abc", "token_type": "Bearer", "expires_in": 3600}"#,
        )
        .unwrap();
        assert!(token.scopes.is_empty());
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn expiry_is_inclusive_at_the_boundary() {
        let mut token = Token {
            expires_in: Duration::seconds(3600),
            ..Token::default()
        };

        token.expires_at = Some(Utc::now() + Duration::seconds(60));
        assert!(!token.is_expired());

        token.expires_at = Some(Utc::now());
        assert!(token.is_expired());

        token.expires_at = Some(Utc::now() - Duration::seconds(1));
        assert!(token.is_expired());

        token.expires_at = None;
        assert!(token.is_expired());
    }

    #[test]
    fn stamping_tracks_the_reported_lifetime() {
        let mut token = Token {
            expires_in: Duration::seconds(3600),
            expires_at: None,
            ..Token::default()
        };
        token.stamp_expiry();
        let expires_at = token.expires_at.unwrap();
        let delta = expires_at - Utc::now();
        assert!(delta > Duration::seconds(3590) && delta <= Duration::seconds(3600));
    }
}
