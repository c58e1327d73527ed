//! Helpers for driving the router against a mock Telegram / downstream app.

use axum::body::{to_bytes, Body, Bytes};
use axum::http::Request;
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use crate::web::{router, AppState, MAX_BODY_BYTES};
use crate::Config;

pub const TOKEN: &str = "123456:TEST-token";

/// Config pointing both Telegram and the downstream app at `server`.
pub fn config(server: &MockServer) -> Config {
    Config::new(TOKEN, format!("{}/app", server.uri())).with_api_base(server.uri())
}

pub async fn send(config: Config, request: Request<Body>) -> Response {
    let state = AppState::new(config).expect("failed to build state");
    router(state)
        .oneshot(request)
        .await
        .expect("oneshot request failed")
}

pub async fn body_bytes(response: Response) -> Bytes {
    to_bytes(response.into_body(), MAX_BODY_BYTES)
        .await
        .expect("failed to read body")
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("body is not JSON")
}
