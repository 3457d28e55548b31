//! CLI argument parsing, validation, and startup helpers.

use clap::Parser;
use tracing::error;
use url::Url;

use crate::ServerConfig;
use crate::session::MIN_COOKIE_PASSWORD_LENGTH;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Wicket", about = "Admin pages gated behind WorkOS AuthKit sessions")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "4321")]
    pub port: u16,

    /// WorkOS OAuth client identifier
    #[arg(long, env = "WORKOS_CLIENT_ID")]
    pub client_id: String,

    /// Identity-provider API base URL
    #[arg(long, default_value = "https://api.workos.com/", value_parser = validate_api_base)]
    pub api_base: Url,

    /// Redirect URI registered with the provider for the login callback
    #[arg(long, default_value = "http://localhost:4321/api/callback")]
    pub redirect_uri: String,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

fn validate_api_base(s: &str) -> Result<Url, String> {
    let url = Url::parse(s).map_err(|e| format!("Invalid API base URL: {}", e))?;

    let is_https = url.scheme() == "https";
    let is_localhost = matches!(url.host_str(), Some("localhost") | Some("127.0.0.1"));

    if !is_https && !is_localhost {
        return Err("API base must use HTTPS for non-localhost hosts".to_string());
    }

    Ok(url)
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Read a secret from the environment, then clear the variable.
fn take_env_var(name: &str) -> Option<String> {
    let value = std::env::var(name).ok()?;
    // Clear the environment variable to prevent leaking.
    // SAFETY: We're single-threaded at this point during startup,
    // and no other code is reading this environment variable.
    unsafe { std::env::remove_var(name) };
    Some(value)
}

/// Load the identity-provider API key from `WORKOS_API_KEY`.
/// Returns None and logs an error if it is missing or empty.
pub fn load_api_key() -> Option<String> {
    match take_env_var("WORKOS_API_KEY") {
        Some(key) if !key.is_empty() => Some(key),
        _ => {
            error!("WORKOS_API_KEY environment variable is required");
            None
        }
    }
}

/// Load the cookie-sealing secret from `WORKOS_COOKIE_PASSWORD`.
/// Returns None and logs an error if it is missing or too short.
pub fn load_cookie_password() -> Option<String> {
    let Some(password) = take_env_var("WORKOS_COOKIE_PASSWORD") else {
        error!("WORKOS_COOKIE_PASSWORD environment variable is required");
        return None;
    };

    if password.len() < MIN_COOKIE_PASSWORD_LENGTH {
        error!(
            "WORKOS_COOKIE_PASSWORD is shorter than {} characters. Use a longer secret",
            MIN_COOKIE_PASSWORD_LENGTH
        );
        return None;
    }

    Some(password)
}

/// Build ServerConfig from validated arguments and loaded secrets.
pub fn build_config(args: Args, api_key: String, cookie_password: String) -> ServerConfig {
    ServerConfig {
        api_key,
        client_id: args.client_id,
        cookie_password,
        api_base: args.api_base,
        redirect_uri: args.redirect_uri,
    }
}
