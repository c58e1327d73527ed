//! Bot API proxy and file download relay.
//!
//! The downstream app talks to the bridge using Telegram's own URL layout
//! (`/bot<token>/<method>` and `/file/bot<token>/<path>`), so pointing its
//! Bot API base at the bridge is the only change it needs.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    response::{IntoResponse, Response},
    Form,
};
use reqwest::{multipart, RequestBuilder};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{BridgeError, Result};
use crate::util::{is_json_content_type, mime_type, strip_hop_headers};
use crate::web::auth::{token_from_segment, verify_token};
use crate::web::AppState;

// =============================================================================
// Bot API Proxy
// =============================================================================

/// Forwards a Bot API call to Telegram and relays the reply unchanged.
///
/// - POST with a JSON content type: JSON body forwarded as JSON
/// - other POST: form fields forwarded, as multipart when files are attached
/// - GET: query parameters forwarded
pub async fn api_proxy(
    State(state): State<AppState>,
    Path((segment, api_method)): Path<(String, String)>,
    Query(params): Query<Vec<(String, String)>>,
    request: Request,
) -> Result<Response> {
    let token = token_from_segment(&segment)?;
    verify_token(&state.config.bot_token, token)?;

    let url = state.telegram.method_url(&api_method);
    let http_method = request.method().clone();

    info!(
        api_method = %api_method,
        http_method = %http_method,
        "api_proxy_request"
    );

    let outbound = if http_method == Method::POST {
        if is_json_content_type(request.headers()) {
            let body = Bytes::from_request(request, &state)
                .await
                .map_err(|e| BridgeError::InvalidJson(e.body_text()))?;
            let payload: Value = serde_json::from_slice(&body)
                .map_err(|e| BridgeError::InvalidJson(e.to_string()))?;
            state.client.post(&url).json(&payload)
        } else {
            let form = ForwardForm::from_request(request, &state).await?;
            form.attach(state.client.post(&url))?
        }
    } else {
        state.client.get(&url).query(&params)
    };

    let upstream = outbound.send().await.map_err(|e| {
        let err = BridgeError::from(e);
        warn!(api_method = %api_method, error = %err, "api_proxy_upstream_failed");
        err
    })?;

    info!(
        api_method = %api_method,
        status_code = upstream.status().as_u16(),
        "api_proxy_response"
    );

    relay_response(upstream).await
}

/// Copy an upstream reply into a response: same status, same body, same
/// headers minus the transport framing ones.
async fn relay_response(upstream: reqwest::Response) -> Result<Response> {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_headers(&mut headers);

    let body = upstream.bytes().await?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// A file field from a multipart request.
struct FilePart {
    name: String,
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// Form fields and attachments of a non-JSON POST.
#[derive(Default)]
struct ForwardForm {
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
}

impl ForwardForm {
    /// Read form fields from a urlencoded or multipart body. Any other body
    /// yields an empty form.
    async fn from_request(request: Request, state: &AppState) -> Result<Self> {
        match mime_type(request.headers()).as_deref() {
            Some("multipart/form-data") => {
                let multipart = Multipart::from_request(request, state)
                    .await
                    .map_err(|e| BridgeError::InvalidForm(e.body_text()))?;
                Self::from_multipart(multipart).await
            }
            Some("application/x-www-form-urlencoded") => {
                let Form(fields) = Form::<Vec<(String, String)>>::from_request(request, state)
                    .await
                    .map_err(|e| BridgeError::InvalidForm(e.body_text()))?;
                Ok(Self {
                    fields,
                    files: Vec::new(),
                })
            }
            _ => Ok(Self::default()),
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| BridgeError::InvalidForm(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(ToString::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(ToString::to_string);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| BridgeError::InvalidForm(e.body_text()))?;
                    form.files.push(FilePart {
                        name,
                        file_name,
                        content_type,
                        data,
                    });
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| BridgeError::InvalidForm(e.body_text()))?;
                    form.fields.push((name, value));
                }
            }
        }

        Ok(form)
    }

    /// Attach the form to an outbound request: multipart when files are
    /// present, urlencoded when only fields are, no body otherwise.
    fn attach(self, request: RequestBuilder) -> Result<RequestBuilder> {
        if !self.files.is_empty() {
            let mut form = multipart::Form::new();
            for (name, value) in self.fields {
                form = form.text(name, value);
            }
            for file in self.files {
                let mut part = multipart::Part::bytes(file.data.to_vec()).file_name(file.file_name);
                if let Some(content_type) = file.content_type {
                    part = part
                        .mime_str(&content_type)
                        .map_err(|e| BridgeError::RequestBuild(e.to_string()))?;
                }
                form = form.part(file.name, part);
            }
            Ok(request.multipart(form))
        } else if !self.fields.is_empty() {
            Ok(request.form(&self.fields))
        } else {
            Ok(request)
        }
    }
}

// =============================================================================
// File Download
// =============================================================================

/// Downloads a file from Telegram and returns it as an attachment.
///
/// The caller's token is checked, but the download URL is always built with
/// the configured one.
pub async fn download_file(
    State(state): State<AppState>,
    Path((segment, file_path)): Path<(String, String)>,
) -> Result<Response> {
    let token = token_from_segment(&segment)?;
    verify_token(&state.config.bot_token, token)?;

    let name = file_name(&file_path);
    let disposition = HeaderValue::try_from(format!("attachment; filename={name}"))
        .map_err(|_| BridgeError::InvalidFileName(name.to_string()))?;

    let file = state
        .telegram
        .download_file(&state.client, &file_path)
        .await?;

    let content_type = file
        .content_type
        .and_then(|ct| HeaderValue::try_from(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    Ok((
        [(CONTENT_DISPOSITION, disposition), (CONTENT_TYPE, content_type)],
        file.bytes,
    )
        .into_response())
}

/// Last segment of a file path; empty when the path ends in `/`.
fn file_name(file_path: &str) -> &str {
    match file_path.rfind('/') {
        Some(idx) => &file_path[idx + 1..],
        None => file_path,
    }
}
