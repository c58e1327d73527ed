//! Status, inbound webhook and webhook registration handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    Json,
};
use reqwest::{redirect, Client};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::{BridgeError, Result};
use crate::telegram::TelegramApi;
use crate::util::forward_headers;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub telegram: TelegramApi,
    /// Client for Telegram calls; follows redirects.
    pub client: Client,
    /// Client for the downstream app; never follows redirects.
    pub relay_client: Client,
}

impl AppState {
    pub fn new(config: Config) -> reqwest::Result<Self> {
        let timeout = config.request_timeout();

        let client = Client::builder().timeout(timeout).build()?;
        let relay_client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            telegram: TelegramApi::from_config(&config),
            config: Arc::new(config),
            client,
            relay_client,
        })
    }
}

// =============================================================================
// Status
// =============================================================================

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness endpoint.
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "Telegram Bridge Server Running",
        version: "1.0",
    })
}

// =============================================================================
// Inbound Webhook
// =============================================================================

#[derive(Serialize)]
pub struct Ack {
    pub ok: bool,
}

/// Receives an update from Telegram and forwards it to the downstream app.
///
/// Telegram is always answered with `{"ok": true}` once the update has been
/// accepted, whatever the downstream app does with it. Repeated non-2xx
/// answers make Telegram back off or drop the webhook, so downstream failures
/// are only logged.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    body: Bytes,
) -> Result<Json<Ack>> {
    let update: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, body_length = body.len(), "webhook_invalid_json");
        BridgeError::InvalidJson(e.to_string())
    })?;

    if is_empty_payload(&update) {
        error!("webhook_no_data");
        return Err(BridgeError::EmptyPayload);
    }

    let remote_ip = connect_info.map(|ConnectInfo(addr)| addr.ip());

    info!(
        update_id = ?update.get("update_id"),
        remote_addr = ?remote_ip,
        "webhook_received"
    );

    let headers =
        forward_headers(remote_ip).map_err(|e| BridgeError::RequestBuild(e.to_string()))?;

    let request = state
        .relay_client
        .post(&state.config.app_url)
        .headers(headers)
        .json(&update)
        .build()
        .map_err(|e| BridgeError::RequestBuild(e.to_string()))?;

    match state.relay_client.execute(request).await {
        Ok(resp) => {
            let status = resp.status();
            if status.is_success() {
                info!(status_code = status.as_u16(), "webhook_forwarded");
            } else {
                warn!(status_code = status.as_u16(), "webhook_downstream_status");
            }
        }
        Err(e) if e.is_timeout() => {
            error!(error = %e, "webhook_forward_timeout");
        }
        Err(e) => {
            error!(error = %e, "webhook_forward_failed");
        }
    }

    Ok(Json(Ack { ok: true }))
}

/// Whether a parsed body carries nothing: `null`, `false`, `0`, `""`, `[]` or `{}`.
fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

// =============================================================================
// Webhook Registration
// =============================================================================

/// Registers a URL as the bot's webhook.
///
/// Telegram's reply is returned with status 200 even when Telegram itself
/// answered with an error status.
pub async fn set_webhook(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let request: Value =
        serde_json::from_slice(&body).map_err(|e| BridgeError::InvalidJson(e.to_string()))?;

    let url = request
        .get("url")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .ok_or(BridgeError::MissingWebhookUrl)?;

    info!(webhook_url = %url, "set_webhook_requested");

    let reply = state.telegram.set_webhook(&state.client, url).await?;

    Ok(Json(reply))
}
