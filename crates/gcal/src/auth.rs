//! OAuth2 flows: consent URL, code exchange, token refresh.

use std::env;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{GcalError, Result};
use crate::{AUTH_URI, CALENDAR_SCOPE, TOKEN_URI};

/// Static OAuth application credentials plus the fixed redirect URI.
#[derive(Debug, Clone)]
pub struct OauthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Tokens returned by the authorization-code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Present because we request `prompt=consent`; `None` only if Google
    /// misbehaves.
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Result of refreshing an access token. Google does not rotate the
/// refresh token on refresh, so none is returned here.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshedToken {
    pub access_token: String,
    pub expires_in: i64,
}

impl TokenResponse {
    /// Absolute expiry computed from `expires_in`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.expires_in)
    }
}

impl RefreshedToken {
    /// Absolute expiry computed from `expires_in`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.expires_in)
    }
}

impl OauthConfig {
    /// Load OAuth app credentials from the environment.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `GOOGLE_CLIENT_ID` | OAuth client id (required) |
    /// | `GOOGLE_CLIENT_SECRET` | OAuth client secret (required) |
    /// | `GOOGLE_REDIRECT_URI` | Callback URL registered with Google (required) |
    pub fn from_env() -> std::result::Result<Self, env::VarError> {
        Ok(Self {
            client_id: env::var("GOOGLE_CLIENT_ID")?,
            client_secret: env::var("GOOGLE_CLIENT_SECRET")?,
            redirect_uri: env::var("GOOGLE_REDIRECT_URI")?,
        })
    }

    /// Build the consent URL for a client.
    ///
    /// `access_type=offline` + `prompt=consent` force Google to issue a
    /// refresh token on every consent, not just the first. `state` carries
    /// the client id for correlation on callback.
    pub fn authorize_url(&self, state: &str) -> String {
        let mut url = Url::parse(AUTH_URI).expect("static auth URI is valid");
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", CALENDAR_SCOPE)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", state);
        url.to_string()
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        debug!("Exchanging authorization code for tokens");

        let client = reqwest::Client::new();
        let resp = client
            .post(TOKEN_URI)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GcalError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }

    /// Get a fresh access token using the stored refresh token.
    ///
    /// A 4xx from the token endpoint means the refresh token is expired or
    /// revoked; that surfaces as [`GcalError::AuthExpired`] and the user
    /// has to reconnect.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<RefreshedToken> {
        debug!("Refreshing access token");

        let client = reqwest::Client::new();
        let resp = client
            .post(TOKEN_URI)
            .form(&[
                ("refresh_token", refresh_token),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if status.is_client_error() {
            return Err(GcalError::AuthExpired);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GcalError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> OauthConfig {
        OauthConfig {
            client_id: "id-123".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "https://app.example.com/api/calendar/oauth/callback".to_string(),
        }
    }

    #[test]
    fn test_authorize_url_params() {
        let url = test_config().authorize_url("client-42");
        let parsed = Url::parse(&url).unwrap();
        let params: std::collections::HashMap<_, _> = parsed.query_pairs().collect();

        assert_eq!(params["client_id"], "id-123");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], CALENDAR_SCOPE);
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
        assert_eq!(params["state"], "client-42");
    }

    #[test]
    fn test_expires_at_is_in_the_future() {
        let token = TokenResponse {
            access_token: "at".to_string(),
            refresh_token: Some("rt".to_string()),
            expires_in: 3600,
        };
        assert!(token.expires_at() > Utc::now() + Duration::seconds(3500));
    }
}
