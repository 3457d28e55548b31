//! WorkOS AuthKit client.
//!
//! Two operations against the User Management API: exchanging an
//! authorization code after the hosted login, and exchanging a refresh
//! token when an access token has expired. Both return the same
//! `{user, tokens, impersonator}` payload. The session guard and callback
//! handler depend on the `IdentityProvider` trait so tests can stub the
//! provider instead of the network.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::session::{Impersonator, User};

/// Timeout for calls to the identity provider.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Successful authentication result: a fresh token pair plus the user.
#[derive(Debug, Clone, Deserialize)]
pub struct Authenticated {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
    #[serde(default)]
    pub impersonator: Option<Impersonator>,
}

/// Identity-provider operations the server depends on.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange the authorization code from the login redirect.
    async fn authenticate_with_code(&self, code: &str) -> Result<Authenticated, ProviderError>;

    /// Exchange a refresh token for a new token pair.
    /// Refresh tokens are single use; the provider invalidates the one sent.
    async fn authenticate_with_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Authenticated, ProviderError>;

    /// Hosted login URL to send unauthenticated users to.
    fn authorization_url(&self) -> String;
}

/// Errors from identity-provider calls.
#[derive(Debug)]
pub enum ProviderError {
    /// Base URL could not be combined with an endpoint path
    BadBaseUrl(url::ParseError),
    /// Network or protocol failure
    Http(reqwest::Error),
    /// Provider answered with a non-success status
    Status { status: u16, body: String },
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::BadBaseUrl(e) => write!(f, "Invalid API base URL: {}", e),
            ProviderError::Http(e) => write!(f, "Provider request failed: {}", e),
            ProviderError::Status { status, body } => {
                write!(f, "Provider returned status {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for ProviderError {}

#[derive(Serialize)]
struct AuthenticateRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

/// HTTP client for the WorkOS User Management API.
pub struct WorkOsClient {
    http: reqwest::Client,
    authenticate_url: Url,
    authorize_url: Url,
    jwks_url: Url,
    api_key: String,
    client_id: String,
    redirect_uri: String,
}

impl WorkOsClient {
    pub fn new(
        api_base: &Url,
        api_key: String,
        client_id: String,
        redirect_uri: String,
    ) -> Result<Self, ProviderError> {
        let authenticate_url = api_base
            .join("user_management/authenticate")
            .map_err(ProviderError::BadBaseUrl)?;
        let authorize_url = api_base
            .join("user_management/authorize")
            .map_err(ProviderError::BadBaseUrl)?;
        let jwks_url = api_base
            .join(&format!("sso/jwks/{}", client_id))
            .map_err(ProviderError::BadBaseUrl)?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ProviderError::Http)?;

        Ok(Self {
            http,
            authenticate_url,
            authorize_url,
            jwks_url,
            api_key,
            client_id,
            redirect_uri,
        })
    }

    /// JWKS endpoint publishing the keys that sign this client's tokens.
    pub fn jwks_url(&self) -> Url {
        self.jwks_url.clone()
    }

    async fn authenticate(
        &self,
        request: AuthenticateRequest<'_>,
    ) -> Result<Authenticated, ProviderError> {
        let response = self
            .http
            .post(self.authenticate_url.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(ProviderError::Http)
    }
}

#[async_trait]
impl IdentityProvider for WorkOsClient {
    async fn authenticate_with_code(&self, code: &str) -> Result<Authenticated, ProviderError> {
        self.authenticate(AuthenticateRequest {
            client_id: &self.client_id,
            client_secret: &self.api_key,
            grant_type: "authorization_code",
            code: Some(code),
            refresh_token: None,
        })
        .await
    }

    async fn authenticate_with_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Authenticated, ProviderError> {
        self.authenticate(AuthenticateRequest {
            client_id: &self.client_id,
            client_secret: &self.api_key,
            grant_type: "refresh_token",
            code: None,
            refresh_token: Some(refresh_token),
        })
        .await
    }

    fn authorization_url(&self) -> String {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("provider", "authkit");
        url.to_string()
    }
}
