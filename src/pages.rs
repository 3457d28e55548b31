//! Page handlers: the login entry point and the admin area.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
};

use crate::AppState;
use crate::session::CurrentUser;

/// Post-login landing page; lives under the protected prefix.
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Login entry point. Hands the browser to the provider's hosted login;
/// the provider redirects back to `/api/callback` with a code.
pub async fn login_handler(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.provider.authorization_url())
}

/// Admin landing page. The session guard has already run, so a session
/// cookie is present; `CurrentUser` only decorates the page with it.
pub async fn dashboard_handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    let body = match user {
        Some(user) => {
            let name = user.first_name.as_deref().unwrap_or(&user.email);
            format!(
                "<!doctype html><html><body><h1>Dashboard</h1>\
                 <p>Signed in as {}</p></body></html>",
                name
            )
        }
        None => "<!doctype html><html><body><h1>Dashboard</h1></body></html>".to_string(),
    };
    Html(body)
}
