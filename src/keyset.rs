//! Access-token verification against the provider's remote key set.
//!
//! The identity provider signs access tokens with RS256 and publishes the
//! public keys as a JWKS. `RemoteKeySet` fetches that document lazily,
//! caches it for an hour, and refetches once when a token references an
//! unknown `kid` (key rotation). The session guard only consumes the
//! `TokenVerifier` trait, so tests can substitute a stub.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use tokio::sync::RwLock;
use url::Url;

/// How long a fetched JWKS stays valid before a refetch.
const JWKS_TTL: Duration = Duration::from_secs(3600);

/// Timeout for the JWKS fetch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Verifies an access token's signature and validity window.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<(), VerifyError>;
}

/// Errors from token verification or key-set fetching.
#[derive(Debug)]
pub enum VerifyError {
    /// Network failure or unparseable JWKS response
    Fetch(reqwest::Error),
    /// JWKS endpoint returned a non-success status
    HttpStatus(u16),
    /// Token header carries no `kid`
    MissingKeyId,
    /// No key with the token's `kid`, even after a refetch
    UnknownKey(String),
    /// JWK could not be converted to a decoding key
    BadKey,
    /// Signature, expiry, or structural validation failed
    Jwt(jsonwebtoken::errors::Error),
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyError::Fetch(e) => write!(f, "Failed to fetch key set: {}", e),
            VerifyError::HttpStatus(status) => {
                write!(f, "Key set endpoint returned status {}", status)
            }
            VerifyError::MissingKeyId => write!(f, "Token header has no key ID"),
            VerifyError::UnknownKey(kid) => write!(f, "No key in key set with ID {}", kid),
            VerifyError::BadKey => write!(f, "Key set entry is not a usable key"),
            VerifyError::Jwt(e) => write!(f, "Token validation failed: {}", e),
        }
    }
}

impl std::error::Error for VerifyError {}

struct CachedKeys {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// Lazily fetched, TTL-cached JWKS used to verify access tokens.
pub struct RemoteKeySet {
    http: reqwest::Client,
    jwks_url: Url,
    cache: RwLock<Option<CachedKeys>>,
}

impl RemoteKeySet {
    pub fn new(jwks_url: Url) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            jwks_url,
            cache: RwLock::new(None),
        })
    }

    /// Look up a key in the cache without fetching. Expired entries miss.
    async fn find_cached(&self, kid: &str) -> Option<Jwk> {
        let cache = self.cache.read().await;
        let cached = cache.as_ref()?;
        if cached.fetched_at.elapsed() >= JWKS_TTL {
            return None;
        }
        cached.jwks.find(kid).cloned()
    }

    /// Fetch a fresh JWKS and replace the cache.
    async fn refresh(&self) -> Result<(), VerifyError> {
        let response = self
            .http
            .get(self.jwks_url.clone())
            .send()
            .await
            .map_err(VerifyError::Fetch)?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::HttpStatus(status.as_u16()));
        }

        let jwks: JwkSet = response.json().await.map_err(VerifyError::Fetch)?;
        tracing::debug!(url = %self.jwks_url, keys = jwks.keys.len(), "Fetched key set");

        let mut cache = self.cache.write().await;
        *cache = Some(CachedKeys {
            jwks,
            fetched_at: Instant::now(),
        });
        Ok(())
    }

    /// Get the decoding key for a `kid`, refetching the JWKS once on a miss.
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, VerifyError> {
        if let Some(jwk) = self.find_cached(kid).await {
            return DecodingKey::from_jwk(&jwk).map_err(|_| VerifyError::BadKey);
        }

        self.refresh().await?;

        let jwk = self
            .find_cached(kid)
            .await
            .ok_or_else(|| VerifyError::UnknownKey(kid.to_string()))?;
        DecodingKey::from_jwk(&jwk).map_err(|_| VerifyError::BadKey)
    }
}

#[async_trait]
impl TokenVerifier for RemoteKeySet {
    async fn verify(&self, token: &str) -> Result<(), VerifyError> {
        let header = jsonwebtoken::decode_header(token).map_err(VerifyError::Jwt)?;
        let kid = header.kid.ok_or(VerifyError::MissingKeyId)?;

        let key = self.key_for(&kid).await?;

        // AuthKit signs with RS256; don't accept anything else the token
        // header claims. Audience is not part of these tokens.
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;

        jsonwebtoken::decode::<serde_json::Value>(token, &key, &validation)
            .map_err(VerifyError::Jwt)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_malformed_token_rejected_without_fetch() {
        // A token that fails header parsing never reaches the network
        let keys = RemoteKeySet::new(Url::parse("https://keys.invalid/jwks").unwrap()).unwrap();

        let result = keys.verify("not-a-jwt").await;
        assert!(matches!(result, Err(VerifyError::Jwt(_))));
    }

    #[tokio::test]
    async fn test_token_without_kid_rejected() {
        let keys = RemoteKeySet::new(Url::parse("https://keys.invalid/jwks").unwrap()).unwrap();

        // Header {"alg":"RS256","typ":"JWT"} with no kid
        let token = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.e30.sig";
        let result = keys.verify(token).await;
        assert!(matches!(result, Err(VerifyError::MissingKeyId)));
    }
}
