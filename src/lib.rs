pub mod api;
pub mod cli;
pub mod keyset;
pub mod pages;
pub mod session;
pub mod workos;

use std::sync::Arc;

use api::create_api_router;
use axum::{Router, middleware, response::Redirect, routing::get};
use keyset::{RemoteKeySet, TokenVerifier};
use session::{LOGIN_PATH, Sealer, session_guard};
use tokio::net::TcpListener;
use url::Url;
use workos::{IdentityProvider, ProviderError, WorkOsClient};

pub struct ServerConfig {
    /// Identity-provider server credential (sk_...)
    pub api_key: String,
    /// OAuth client identifier (client_...)
    pub client_id: String,
    /// Symmetric secret sealing the session cookie
    pub cookie_password: String,
    /// Identity-provider API base URL
    pub api_base: Url,
    /// Redirect URI registered with the provider for the login callback
    pub redirect_uri: String,
}

/// Shared per-process dependencies, passed explicitly so the guard stays
/// unit-testable: no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub sealer: Arc<Sealer>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub provider: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Build the real provider client and key-set verifier from config.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ProviderError> {
        let provider = WorkOsClient::new(
            &config.api_base,
            config.api_key.clone(),
            config.client_id.clone(),
            config.redirect_uri.clone(),
        )?;
        let verifier = RemoteKeySet::new(provider.jwks_url()).map_err(ProviderError::Http)?;

        Ok(Self {
            sealer: Arc::new(Sealer::new(&config.cookie_password)),
            verifier: Arc::new(verifier),
            provider: Arc::new(provider),
        })
    }
}

/// Create the application router. The session guard wraps every route and
/// gates the `/admin/` prefix; everything else passes through it untouched.
pub fn create_app(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(Redirect::temporary(LOGIN_PATH)))
        .route(LOGIN_PATH, get(pages::login_handler))
        .route(pages::DASHBOARD_PATH, get(pages::dashboard_handler))
        .with_state(state.clone());

    Router::new()
        .merge(pages)
        .nest("/api", create_api_router(state.clone()))
        .layer(middleware::from_fn_with_state(state, session_guard))
}

/// Run the server on the given listener. Blocks until the server exits.
pub async fn run_server(state: AppState, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(state);
    axum::serve(listener, app).await
}
