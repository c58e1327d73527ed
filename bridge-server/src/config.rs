//! Configuration module for environment variable parsing.
//!
//! The bot token and the downstream application URL are required; everything
//! else falls back to a default.

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;
use url::Url;

/// Public Telegram Bot API host.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Default timeout applied to every outbound call.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Errors that prevent the bridge from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} is not a valid http(s) URL: {value}")]
    InvalidUrl { name: &'static str, value: String },
}

/// Application configuration loaded once at startup.
///
/// Immutable for the lifetime of the process and shared read-only between
/// request handlers.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token, used for outbound calls and inbound comparison
    pub bot_token: String,

    /// Downstream application webhook receiver
    pub app_url: String,

    /// Telegram Bot API base, without trailing slash
    pub api_base: String,

    /// Port for the web server to listen on
    pub port: u16,

    /// HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Build a configuration with defaults for everything but the two required values.
    pub fn new(bot_token: impl Into<String>, app_url: impl Into<String>) -> Self {
        Config {
            bot_token: bot_token.into(),
            app_url: app_url.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            port: 8080,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let app_url = required("APP_URL")?;
        validate_url("APP_URL", &app_url)?;

        let mut config = Config::new(bot_token, app_url);

        if let Ok(api_base) = env::var("TELEGRAM_API_URL") {
            validate_url("TELEGRAM_API_URL", &api_base)?;
            config = config.with_api_base(api_base);
        }

        config.port = parse_or("PORT", 8080);
        config.request_timeout_ms = parse_or("REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS);

        Ok(config)
    }

    /// Timeout for outbound calls.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Read a variable that must be present and non-empty.
fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn validate_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            name,
            value: value.to_string(),
        }),
    }
}

/// Parse an optional numeric variable, warning and falling back on garbage.
fn parse_or<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid numeric value, using default");
            default
        }
    }
}
