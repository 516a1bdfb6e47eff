//! Webhook signature verification
//!
//! The commerce system signs each delivery with
//! `X-Order-Signature: t=<unix seconds>,v1=<hex hmac-sha256>` over
//! `"{t}.{raw body}"`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Maximum age of a delivery before it is rejected as a replay
const MAX_SKEW_SECS: i64 = 300;

pub fn verify_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), &'static str> {
    let mut timestamp = "";
    let mut signature = "";
    for part in sig_header.split(',') {
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signature = v;
        }
    }

    if timestamp.is_empty() || signature.is_empty() {
        return Err("Invalid signature header");
    }

    let signed_payload = format!("{timestamp}.{}", std::str::from_utf8(payload).unwrap_or(""));
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(signed_payload.as_bytes());

    // Decode hex signature and use constant-time comparison via hmac::verify_slice
    let sig_bytes = hex::decode(signature).map_err(|_| "Invalid signature hex")?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Webhook signature mismatch")?;

    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    let now = chrono::Utc::now().timestamp();
    if (now - ts).abs() > MAX_SKEW_SECS {
        return Err("Webhook timestamp too old");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(body: &[u8], secret: &str, ts: i64) -> String {
        let signed_payload = format!("{ts}.{}", std::str::from_utf8(body).unwrap());
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());
        format!("t={ts},v1={sig}")
    }

    #[test]
    fn accepts_valid_signature() {
        let body = br#"{"externalOrderId":"o-1"}"#;
        let ts = chrono::Utc::now().timestamp();
        let header = sign(body, "secret", ts);
        assert!(verify_signature(body, &header, "secret").is_ok());
    }

    #[test]
    fn rejects_wrong_secret() {
        let body = b"payload";
        let ts = chrono::Utc::now().timestamp();
        let header = sign(body, "secret", ts);
        assert!(verify_signature(body, &header, "other").is_err());
    }

    #[test]
    fn rejects_tampered_body() {
        let ts = chrono::Utc::now().timestamp();
        let header = sign(b"payload", "secret", ts);
        assert!(verify_signature(b"tampered", &header, "secret").is_err());
    }

    #[test]
    fn rejects_stale_timestamp() {
        let body = b"payload";
        let ts = chrono::Utc::now().timestamp() - 3600;
        let header = sign(body, "secret", ts);
        assert_eq!(
            verify_signature(body, &header, "secret"),
            Err("Webhook timestamp too old")
        );
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(verify_signature(b"payload", "v1=abc", "secret").is_err());
        assert!(verify_signature(b"payload", "t=123", "secret").is_err());
        assert!(verify_signature(b"payload", "", "secret").is_err());
    }
}
