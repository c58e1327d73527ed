//! Telegram Bot API URL builder and client calls.

use axum::body::Bytes;
use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{BridgeError, Result};
use crate::Config;

/// Bot API endpoint set for a single bot token.
#[derive(Debug, Clone)]
pub struct TelegramApi {
    base: String,
    token: String,
}

/// A file fetched from Telegram's file storage.
#[derive(Debug)]
pub struct DownloadedFile {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl TelegramApi {
    pub fn new(base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base.clone(), config.bot_token.clone())
    }

    /// `<base>/bot<token>/<method>`
    pub fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base,
            self.token,
            method.trim_start_matches('/')
        )
    }

    /// `<base>/file/bot<token>/<file_path>`
    pub fn file_url(&self, file_path: &str) -> String {
        format!(
            "{}/file/bot{}/{}",
            self.base,
            self.token,
            file_path.trim_start_matches('/')
        )
    }

    /// Register `url` as the bot's webhook and return Telegram's JSON reply.
    ///
    /// The reply is returned whatever its HTTP status; only transport and
    /// decoding failures are errors.
    pub async fn set_webhook(&self, client: &Client, url: &str) -> Result<Value> {
        let response = client
            .post(self.method_url("setWebhook"))
            .json(&json!({ "url": url }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status_code = status.as_u16(), "set_webhook_upstream_status");
        }

        let body: Value = response.json().await?;
        let ok = body.get("ok").and_then(serde_json::Value::as_bool);

        info!(
            status_code = status.as_u16(),
            ok = ?ok,
            "set_webhook_complete"
        );

        Ok(body)
    }

    /// Fetch a file by its Telegram file path.
    pub async fn download_file(&self, client: &Client, file_path: &str) -> Result<DownloadedFile> {
        let response = client.get(self.file_url(file_path)).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                file_path = file_path,
                status_code = status.as_u16(),
                "file_download_upstream_failed"
            );
            return Err(BridgeError::DownloadFailed(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?;

        info!(
            file_path = file_path,
            size_bytes = bytes.len(),
            content_type = ?content_type,
            "file_download_complete"
        );

        Ok(DownloadedFile {
            bytes,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_method_url() {
        let api = TelegramApi::new("https://api.telegram.org/", "123:abc");
        assert_eq!(
            api.method_url("getMe"),
            "https://api.telegram.org/bot123:abc/getMe"
        );
        assert_eq!(
            api.method_url("/sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_file_url() {
        let api = TelegramApi::new("https://api.telegram.org", "123:abc");
        assert_eq!(
            api.file_url("photos/file_0.jpg"),
            "https://api.telegram.org/file/bot123:abc/photos/file_0.jpg"
        );
    }

    #[tokio::test]
    async fn test_set_webhook_returns_reply_on_error_status() {
        let server = MockServer::start().await;
        let reply = json!({ "ok": false, "error_code": 401, "description": "Unauthorized" });

        Mock::given(method("POST"))
            .and(path("/bot123:abc/setWebhook"))
            .and(body_json(json!({ "url": "https://app.example.com/hook" })))
            .respond_with(ResponseTemplate::new(401).set_body_json(&reply))
            .expect(1)
            .mount(&server)
            .await;

        let api = TelegramApi::new(server.uri(), "123:abc");
        let body = api
            .set_webhook(&Client::new(), "https://app.example.com/hook")
            .await
            .unwrap();

        assert_eq!(body, reply);
    }

    #[tokio::test]
    async fn test_set_webhook_non_json_reply_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/setWebhook"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let api = TelegramApi::new(server.uri(), "123:abc");
        let err = api
            .set_webhook(&Client::new(), "https://app.example.com/hook")
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_download_file_failure_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/file/bot123:abc/documents/missing.pdf"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let api = TelegramApi::new(server.uri(), "123:abc");
        let err = api
            .download_file(&Client::new(), "documents/missing.pdf")
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::DownloadFailed(s) if s.as_u16() == 404));
    }
}
