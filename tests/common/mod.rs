#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use wicket::AppState;
use wicket::keyset::{TokenVerifier, VerifyError};
use wicket::session::{Impersonator, Sealer, Session, User};
use wicket::workos::{Authenticated, IdentityProvider, ProviderError};

pub const COOKIE_PASSWORD: &str = "integration-test-cookie-password-32ch";

/// Verifier accepting exactly one token string; counts calls.
pub struct StubVerifier {
    pub valid_token: String,
    pub calls: AtomicUsize,
}

impl StubVerifier {
    pub fn new(valid_token: &str) -> Self {
        Self {
            valid_token: valid_token.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TokenVerifier for StubVerifier {
    async fn verify(&self, token: &str) -> Result<(), VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if token == self.valid_token {
            Ok(())
        } else {
            Err(VerifyError::Jwt(
                jsonwebtoken::errors::ErrorKind::ExpiredSignature.into(),
            ))
        }
    }
}

/// Identity provider accepting the fixed code "valid-code" and, when
/// configured, any refresh token. Counts every exchange call.
pub struct StubProvider {
    pub accept_refresh: bool,
    pub code_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(accept_refresh: bool) -> Self {
        Self {
            accept_refresh,
            code_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    fn issue(&self) -> Authenticated {
        Authenticated {
            access_token: "new-access-token".to_string(),
            refresh_token: "new-refresh-token".to_string(),
            user: sample_user(),
            impersonator: None,
        }
    }

    fn rejected() -> ProviderError {
        ProviderError::Status {
            status: 400,
            body: r#"{"error":"invalid_grant"}"#.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    async fn authenticate_with_code(&self, code: &str) -> Result<Authenticated, ProviderError> {
        self.code_calls.fetch_add(1, Ordering::SeqCst);
        if code == "valid-code" {
            Ok(self.issue())
        } else {
            Err(Self::rejected())
        }
    }

    async fn authenticate_with_refresh_token(
        &self,
        _refresh_token: &str,
    ) -> Result<Authenticated, ProviderError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.accept_refresh {
            Ok(self.issue())
        } else {
            Err(Self::rejected())
        }
    }

    fn authorization_url(&self) -> String {
        "https://auth.stub.invalid/authorize".to_string()
    }
}

pub struct TestBackend {
    pub state: AppState,
    pub sealer: Sealer,
    pub verifier: Arc<StubVerifier>,
    pub provider: Arc<StubProvider>,
}

/// Build an AppState around stub dependencies.
pub fn test_backend(valid_token: &str, accept_refresh: bool) -> TestBackend {
    let sealer = Sealer::new(COOKIE_PASSWORD);
    let verifier = Arc::new(StubVerifier::new(valid_token));
    let provider = Arc::new(StubProvider::new(accept_refresh));

    let state = AppState {
        sealer: Arc::new(sealer.clone()),
        verifier: verifier.clone(),
        provider: provider.clone(),
    };

    TestBackend {
        state,
        sealer,
        verifier,
        provider,
    }
}

pub fn sample_user() -> User {
    User {
        id: "user_01H00000000000000000000000".to_string(),
        email: "alice@example.com".to_string(),
        email_verified: true,
        first_name: Some("Alice".to_string()),
        last_name: Some("Doe".to_string()),
        profile_picture_url: None,
    }
}

pub fn sample_session(access_token: &str) -> Session {
    Session {
        access_token: access_token.to_string(),
        refresh_token: "original-refresh-token".to_string(),
        user: sample_user(),
        impersonator: Some(Impersonator {
            email: "support@example.com".to_string(),
            reason: Some("ticket 42".to_string()),
        }),
    }
}

/// Pull the value out of a `name=value; attrs` Set-Cookie string.
pub fn cookie_value(set_cookie: &str) -> &str {
    let pair = set_cookie.split(';').next().unwrap();
    pair.split_once('=').unwrap().1
}
