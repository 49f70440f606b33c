use crate::error::{Result, WebhookError};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_ALGORITHM: &str = "HmacSHA256";
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Compute the lowercase hex HMAC-SHA256 of `payload` keyed by `secret`.
/// With `include_prefix` the result reads "sha256=<hex>".
pub fn generate_signature(secret: &str, payload: &str, include_prefix: bool) -> Result<String> {
    if secret.trim().is_empty() {
        return Err(WebhookError::InvalidArgument(
            "webhook secret cannot be empty".to_string(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| WebhookError::InvalidArgument(format!("unusable webhook secret: {e}")))?;
    mac.update(payload.as_bytes());
    let digest = hex::encode(mac.finalize().into_bytes());

    if include_prefix {
        Ok(format!("{SIGNATURE_PREFIX}{digest}"))
    } else {
        Ok(digest)
    }
}

/// Verify a signature header value against the payload.
/// Accepts "sha256=<hex>" or a bare hex digest.
///
/// A blank secret is a caller error. Everything else that prevents a match
/// (blank or malformed signature, wrong digest) is reported as `Ok(false)`.
pub fn verify_signature(secret: &str, payload: &str, signature: &str) -> Result<bool> {
    if secret.trim().is_empty() {
        return Err(WebhookError::InvalidArgument(
            "webhook secret cannot be empty".to_string(),
        ));
    }

    if signature.trim().is_empty() {
        return Ok(false);
    }

    let provided = strip_signature_prefix(signature);
    let expected = match generate_signature(secret, payload, false) {
        Ok(sig) => sig,
        Err(e) => {
            tracing::warn!(error = %e, "failed to compute expected webhook signature");
            return Ok(false);
        }
    };

    Ok(constant_time_eq(expected.as_bytes(), provided.as_bytes()))
}

fn strip_signature_prefix(signature: &str) -> &str {
    match signature.get(..SIGNATURE_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(SIGNATURE_PREFIX) => {
            &signature[SIGNATURE_PREFIX.len()..]
        }
        _ => signature,
    }
}

/// Length is checked up front; a digest's length is public. Past that every
/// byte pair is visited.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
