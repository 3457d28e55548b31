//! Login callback endpoint.
//!
//! The identity provider redirects the browser here after a completed
//! hosted login, with a one-time authorization code in the query string.

use axum::{
    extract::{Query, State},
    http::{
        StatusCode,
        header::{LOCATION, SET_COOKIE},
    },
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{error, info};

use super::error::ApiError;
use crate::AppState;
use crate::pages::DASHBOARD_PATH;
use crate::session::{Session, session_cookie};

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
}

/// Complete the login handshake: exchange the authorization code for a
/// token pair, seal the session into the cookie, and send the browser to
/// the dashboard with a 302.
///
/// A failed exchange is fatal to this request. There is no recovery path;
/// the user restarts the login flow.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let code = query
        .code
        .ok_or_else(|| ApiError::bad_request("Missing authorization code"))?;

    let auth = state
        .provider
        .authenticate_with_code(&code)
        .await
        .map_err(|e| {
            error!(error = %e, "Authorization code exchange failed");
            ApiError::internal("Authentication failed")
        })?;

    info!(user = %auth.user.id, "Login completed");

    let session = Session {
        access_token: auth.access_token,
        refresh_token: auth.refresh_token,
        user: auth.user,
        impersonator: auth.impersonator,
    };

    let sealed = state.sealer.seal(&session).map_err(|e| {
        error!(error = %e, "Failed to seal session");
        ApiError::internal("Authentication failed")
    })?;

    Ok((
        StatusCode::FOUND,
        [
            (SET_COOKIE, session_cookie(&sealed)),
            (LOCATION, DASHBOARD_PATH.to_string()),
        ],
    ))
}
