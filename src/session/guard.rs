//! The session guard.
//!
//! Every request passes through here; only paths under `/admin/` get any
//! session work. The flow is a small state machine: the cookie classifies
//! into {Valid, Expired, Unauthenticated}, a pure `decide` maps that to an
//! action, and the middleware executes the action. An expired session gets
//! exactly one refresh attempt against the identity provider; a failed
//! refresh deletes the cookie so a consumed refresh token is never retried.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::warn;

use super::cookie::{SESSION_COOKIE_NAME, clear_session_cookie, get_cookie, session_cookie};
use super::seal::{SealError, Sealer};
use super::types::Session;
use crate::AppState;
use crate::keyset::TokenVerifier;
use crate::workos::ProviderError;

/// Path prefix requiring a valid session.
pub const PROTECTED_PREFIX: &str = "/admin/";

/// Redirect target for unauthenticated requests.
pub const LOGIN_PATH: &str = "/auth";

/// What the session cookie told us about this request.
#[derive(Debug, PartialEq)]
pub enum SessionState {
    /// Session present and the access token verified
    Valid(Session),
    /// Session present but the access token failed verification
    Expired(Session),
    /// No cookie, or a cookie that would not unseal
    Unauthenticated,
}

/// What the guard does with a request.
#[derive(Debug, PartialEq)]
pub enum Action {
    /// Run the protected handler unchanged
    Proceed,
    /// Attempt a single token refresh before proceeding
    Refresh(Session),
    /// Send the client to the login entry point
    Redirect,
    /// Delete the session cookie, then send the client to login
    RedirectAndClear,
}

/// Classify the request's session cookie.
/// Unsealing failures are expected (stale secrets, tampering) and collapse
/// into `Unauthenticated` rather than surfacing as errors.
pub async fn classify(
    cookie: Option<&str>,
    sealer: &Sealer,
    verifier: &dyn TokenVerifier,
) -> SessionState {
    let Some(raw) = cookie else {
        return SessionState::Unauthenticated;
    };

    let session = match sealer.unseal(raw) {
        Ok(session) => session,
        Err(_) => {
            tracing::debug!("Session cookie failed to unseal");
            return SessionState::Unauthenticated;
        }
    };

    match verifier.verify(&session.access_token).await {
        Ok(()) => SessionState::Valid(session),
        Err(e) => {
            warn!(error = %e, "Failed to verify session");
            SessionState::Expired(session)
        }
    }
}

/// Map session state to a guard action. Pure; `RedirectAndClear` is only
/// reached through the refresh-failure path.
pub fn decide(state: SessionState) -> Action {
    match state {
        SessionState::Valid(_) => Action::Proceed,
        SessionState::Expired(session) => Action::Refresh(session),
        SessionState::Unauthenticated => Action::Redirect,
    }
}

enum RefreshError {
    Provider(ProviderError),
    Seal(SealError),
}

impl std::fmt::Display for RefreshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshError::Provider(e) => write!(f, "{}", e),
            RefreshError::Seal(e) => write!(f, "{}", e),
        }
    }
}

/// Exchange the session's refresh token for a new token pair and seal the
/// updated session. The user and impersonator fields carry over unchanged.
async fn refresh_session(state: &AppState, session: Session) -> Result<String, RefreshError> {
    let tokens = state
        .provider
        .authenticate_with_refresh_token(&session.refresh_token)
        .await
        .map_err(RefreshError::Provider)?;

    let renewed = Session {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user: session.user,
        impersonator: session.impersonator,
    };

    state.sealer.seal(&renewed).map_err(RefreshError::Seal)
}

fn append_set_cookie(response: &mut Response, cookie: &str) {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(SET_COOKIE, value);
    }
}

fn redirect_to_login() -> Response {
    Redirect::temporary(LOGIN_PATH).into_response()
}

fn redirect_and_clear() -> Response {
    let mut response = redirect_to_login();
    append_set_cookie(&mut response, &clear_session_cookie());
    response
}

/// Middleware guarding the protected path prefix.
pub async fn session_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !request.uri().path().starts_with(PROTECTED_PREFIX) {
        return next.run(request).await;
    }

    let session_state = {
        let cookie = get_cookie(request.headers(), SESSION_COOKIE_NAME);
        classify(cookie, &state.sealer, state.verifier.as_ref()).await
    };

    match decide(session_state) {
        Action::Proceed => next.run(request).await,
        Action::Redirect => redirect_to_login(),
        Action::RedirectAndClear => redirect_and_clear(),
        Action::Refresh(session) => match refresh_session(&state, session).await {
            Ok(sealed) => {
                let mut response = next.run(request).await;
                append_set_cookie(&mut response, &session_cookie(&sealed));
                response
            }
            Err(e) => {
                warn!(error = %e, "Failed to refresh session");
                redirect_and_clear()
            }
        },
    }
}
