//! Error type shared by all relay endpoints.
//!
//! Every variant maps to one of three external outcomes: a client error
//! (400), an authentication failure (401) or a server error (500). The body is
//! always `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Body could not be parsed as JSON.
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    /// Body parsed but carried nothing worth forwarding.
    #[error("No data received")]
    EmptyPayload,

    #[error("webhook URL required")]
    MissingWebhookUrl,

    #[error("Invalid form body: {0}")]
    InvalidForm(String),

    /// File path whose last segment cannot be sent as a header value.
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("Invalid bot token")]
    InvalidToken,

    /// Path did not carry a `bot<token>` segment.
    #[error("Not found")]
    NotFound,

    /// Telegram answered a file download with a non-success status.
    #[error("Failed to download file")]
    DownloadFailed(StatusCode),

    /// Outbound request could not be built.
    #[error("{0}")]
    RequestBuild(String),

    /// Transport, timeout or decoding failure talking to an upstream,
    /// with its full cause chain.
    #[error("{0}")]
    Upstream(String),
}

// Telegram URLs embed the bot token; keep them out of logs and error bodies.
impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(error_chain(&err.without_url()))
    }
}

/// Join an error and all of its sources: `outer: cause: root cause`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // hyper and reqwest sometimes repeat the inner message in the outer one
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

impl BridgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_)
            | Self::EmptyPayload
            | Self::MissingWebhookUrl
            | Self::InvalidForm(_)
            | Self::InvalidFileName(_)
            | Self::DownloadFailed(_) => StatusCode::BAD_REQUEST,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RequestBuild(_) | Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if let Self::DownloadFailed(upstream) = &self {
            warn!(upstream_status = upstream.as_u16(), "file_download_rejected");
        } else if status.is_server_error() {
            error!(error = %message, "request_failed");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
