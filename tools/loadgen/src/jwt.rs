//! JWT subject extraction
//!
//! Reads the `sub` claim from an access token without verifying the
//! signature. The exchange puts the numeric user id there.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

/// Subject of a compact JWT, or `None` if the token is malformed or has no `sub`.
pub fn decode_subject(token: &str) -> Option<String> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let payload = URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&payload).ok()?;

    match claims.get("sub")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
