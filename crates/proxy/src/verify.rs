//! Signed-request verification for app proxy calls.
//!
//! The platform signs every request it proxies to the app: the query string
//! carries an `hmac` parameter computed over the remaining parameters with
//! the app's shared secret. A request whose signature does not check out was
//! not relayed by the platform and must be rejected before anything else
//! happens.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Query parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "hmac";

/// Verify the platform signature over a full set of query parameters.
///
/// The signed message is rebuilt the way the platform builds it: the `hmac`
/// parameter is dropped, values of repeated parameters are joined with
/// commas, the remaining pairs are sorted by key (byte order) and joined as
/// `key=value` with `&`. The signature is the lowercase-hex HMAC-SHA256 of
/// that message under the shared secret.
///
/// Returns `false` when the signature parameter is missing, is not lowercase
/// hex, or does not match. Never panics.
#[must_use]
pub fn verify_signed_query(params: &[(String, String)], secret: &str) -> bool {
    let Some(provided) = params
        .iter()
        .find(|(key, _)| key == SIGNATURE_PARAM)
        .map(|(_, value)| value.as_str())
    else {
        return false;
    };

    let Some(provided) = decode_lowercase_hex(provided) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(canonical_message(params).as_bytes());

    // Timing-safe digest comparison
    mac.verify_slice(&provided).is_ok()
}

/// Rebuild the signed message from the inbound query parameters.
fn canonical_message(params: &[(String, String)]) -> String {
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (key, value) in params {
        if key == SIGNATURE_PARAM {
            continue;
        }
        grouped.entry(key.as_str()).or_default().push(value.as_str());
    }

    grouped
        .iter()
        .map(|(key, values)| format!("{key}={}", values.join(",")))
        .collect::<Vec<_>>()
        .join("&")
}

/// Decode a lowercase hex string.
///
/// The platform encodes the signature as lowercase hex; uppercase input is
/// rejected rather than normalized, matching an exact byte comparison
/// against the lowercase encoding.
fn decode_lowercase_hex(s: &str) -> Option<Vec<u8>> {
    if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return None;
    }
    hex::decode(s).ok()
}
