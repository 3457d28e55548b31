mod callback;
mod error;

use axum::{Router, routing::get};

use crate::AppState;

/// Create the API router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/callback", get(callback::callback))
        .with_state(state)
}
