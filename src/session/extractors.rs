//! Axum extractors for session data.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::cookie::{SESSION_COOKIE_NAME, get_cookie};
use super::types::User;
use crate::AppState;

/// Read-only lookup of the session's user. Unseals the cookie if present
/// and returns `Session.user`, else `None`. Does not verify token validity;
/// this is a convenience accessor, not a security gate.
pub struct CurrentUser(pub Option<User>);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = get_cookie(&parts.headers, SESSION_COOKIE_NAME)
            .and_then(|raw| state.sealer.unseal(raw).ok())
            .map(|session| session.user);

        Ok(CurrentUser(user))
    }
}
