//! GitHub webhook signature verification.
//!
//! GitHub signs the raw request body with HMAC-SHA256 using the webhook secret
//! and sends the hex digest in `X-Hub-Signature-256` as `sha256=<hex>`.
//! Reference: https://docs.github.com/en/webhooks/using-webhooks/validating-webhook-deliveries

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Verify a GitHub webhook signature.
///
/// # Arguments
///
/// * `payload` - The raw, unparsed request body
/// * `signature` - Value of the `X-Hub-Signature-256` header, if sent
/// * `secret` - The webhook secret configured on GitHub
///
/// # Returns
///
/// `true` only if the header carries the HMAC of `payload` under `secret`.
/// Every malformed input yields `false`.
pub fn verify_github_signature(payload: &[u8], signature: Option<&str>, secret: &str) -> bool {
    let Some(provided_hex) = signature
        .filter(|s| !s.is_empty())
        .and_then(|s| s.strip_prefix(SIGNATURE_PREFIX))
    else {
        warn!(
            has_signature = signature.is_some_and(|s| !s.is_empty()),
            "github_signature_missing_or_unprefixed"
        );
        return false;
    };

    let provided = match hex::decode(provided_hex) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "github_signature_invalid_hex");
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("github_signature_invalid_key");
            return false;
        }
    };
    mac.update(payload);
    let expected = mac.finalize().into_bytes();

    // Lengths are public (always 32 for SHA-256); only the contents are compared
    // in constant time.
    if provided.len() != expected.len() {
        warn!(
            expected_length = expected.len(),
            actual_length = provided.len(),
            "github_signature_length_mismatch"
        );
        return false;
    }

    let valid: bool = expected.as_slice().ct_eq(&provided).into();
    if !valid {
        warn!("github_signature_mismatch");
    }

    valid
}

/// Compute the `sha256=<hex>` header value for a payload.
pub fn sign_payload(payload: &[u8], secret: &str) -> String {
    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(payload);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}
