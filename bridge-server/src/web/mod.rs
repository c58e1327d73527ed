//! Web server module.
//!
//! Five independent endpoints, each doing at most one outbound call:
//! - `GET /` liveness
//! - `POST /webhook` Telegram update relay to the downstream app
//! - `GET|POST /bot<token>/<method>` Bot API proxy
//! - `GET /file/bot<token>/<path>` file download relay
//! - `POST /set-webhook` webhook registration helper

pub mod auth;
pub mod handlers;
pub mod proxy;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{set_webhook, status, telegram_webhook, Ack, AppState, StatusResponse};
pub use proxy::{api_proxy, download_file};

/// Largest request body accepted; matches the Bot API upload limit.
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Build the bridge router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/webhook", post(telegram_webhook))
        .route("/set-webhook", post(set_webhook))
        .route("/file/:bot/*file_path", get(download_file))
        .route("/:bot/*method", get(api_proxy).post(api_proxy))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
