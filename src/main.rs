use clap::Parser;
use tracing::{error, info};
use wicket::cli::{Args, build_config, init_logging, load_api_key, load_cookie_password};
use wicket::{AppState, run_server};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(api_key) = load_api_key() else {
        std::process::exit(1);
    };

    let Some(cookie_password) = load_cookie_password() else {
        std::process::exit(1);
    };

    let port = args.port;
    let config = build_config(args, api_key, cookie_password);

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to initialize identity-provider client");
            std::process::exit(1);
        }
    };

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let local_addr = listener.local_addr().unwrap();
    info!(address = %local_addr, "Listening");

    if let Err(e) = run_server(state, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
