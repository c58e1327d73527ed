//! Bot token verification for the proxied Bot API paths.
//!
//! Callers address the bridge exactly as they would address Telegram, so the
//! token arrives as the `bot<token>` path segment.

use tracing::warn;

use crate::error::{BridgeError, Result};

/// Split the token out of a `bot<token>` path segment.
///
/// Any other segment is not a Bot API path.
pub fn token_from_segment(segment: &str) -> Result<&str> {
    segment.strip_prefix("bot").ok_or(BridgeError::NotFound)
}

/// Check a caller-supplied token against the configured one.
pub fn verify_token(expected: &str, provided: &str) -> Result<()> {
    if constant_time_compare(expected, provided) {
        Ok(())
    } else {
        warn!(
            expected_length = expected.len(),
            actual_length = provided.len(),
            "bot_token_mismatch"
        );
        Err(BridgeError::InvalidToken)
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
