//! Header helpers for outbound and relayed requests.

use std::net::IpAddr;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, CONNECTION, CONTENT_TYPE,
    TRANSFER_ENCODING, USER_AGENT,
};

/// Identifies the bridge to the downstream application.
pub const BRIDGE_USER_AGENT: &str = "TelegramBridge/1.0";

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Framing headers that must not be copied onto a relayed response.
const HOP_HEADERS: [HeaderName; 2] = [TRANSFER_ENCODING, CONNECTION];

/// Build the headers attached to a webhook forwarded downstream.
pub fn forward_headers(remote_addr: Option<IpAddr>) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(BRIDGE_USER_AGENT));

    if let Some(addr) = remote_addr {
        headers.insert(
            HeaderName::from_static(X_FORWARDED_FOR),
            HeaderValue::from_str(&addr.to_string())?,
        );
    }

    Ok(headers)
}

/// Remove transport framing headers from an upstream response.
pub fn strip_hop_headers(headers: &mut HeaderMap) {
    for name in &HOP_HEADERS {
        headers.remove(name);
    }
}

/// Whether a request's content type is JSON (`application/json` or `application/*+json`).
pub fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(mime) = mime_type(headers) else {
        return false;
    };

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// The lowercased media type of a request, without parameters.
pub fn mime_type(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let mime = raw.split(';').next()?.trim().to_ascii_lowercase();
    (!mime.is_empty()).then_some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_content_type(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_forward_headers() {
        let headers = forward_headers(Some("10.0.0.7".parse().unwrap())).unwrap();
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[USER_AGENT], BRIDGE_USER_AGENT);
        assert_eq!(headers[X_FORWARDED_FOR], "10.0.0.7");
    }

    #[test]
    fn test_forward_headers_without_remote() {
        let headers = forward_headers(None).unwrap();
        assert_eq!(headers.len(), 2);
        assert!(headers.get(X_FORWARDED_FOR).is_none());
    }

    #[test]
    fn test_strip_hop_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-custom", HeaderValue::from_static("kept"));

        strip_hop_headers(&mut headers);

        assert!(headers.get(TRANSFER_ENCODING).is_none());
        assert!(headers.get(CONNECTION).is_none());
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers["x-custom"], "kept");
    }

    #[test]
    fn test_is_json_content_type() {
        assert!(is_json_content_type(&with_content_type("application/json")));
        assert!(is_json_content_type(&with_content_type(
            "Application/JSON; charset=utf-8"
        )));
        assert!(is_json_content_type(&with_content_type(
            "application/vnd.api+json"
        )));
        assert!(!is_json_content_type(&with_content_type(
            "application/x-www-form-urlencoded"
        )));
        assert!(!is_json_content_type(&with_content_type("text/json")));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }
}
