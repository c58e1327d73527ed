//! Telegram Bridge - HTTP relay between the Telegram Bot API and a downstream app.
//!
//! ## Architecture
//!
//! ```text
//! Telegram ──POST /webhook──────────────▶ Bridge ──▶ APP_URL
//! App ──/bot<token>/<method>────────────▶ Bridge ──▶ api.telegram.org
//! App ──/file/bot<token>/<path>─────────▶ Bridge ──▶ api.telegram.org/file
//! ```
//!
//! Every request is handled independently with exactly one outbound call.

pub mod config;
pub mod error;
pub mod telegram;
pub mod util;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use error::BridgeError;
pub use telegram::TelegramApi;
pub use web::{router, AppState};
