//! Per-request authentication.
//!
//! The vendor authenticates each call with `md5(key + "+" + secret + "+" + ts)`
//! where `ts` is the unix time in seconds. The timestamp is validated
//! server-side, so a signature must be produced right before dispatch and never
//! reused for a later request.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

pub const APP_KEY_FIELD: &str = "appKey";
pub const SIGNATURE_FIELD: &str = "signature";
pub const TIMESTAMP_FIELD: &str = "timestamp";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(rename = "appKey")]
    pub app_key: String,
    pub signature: String,
    pub timestamp: String,
}

impl Signature {
    /// The signature as `(field, value)` pairs in wire order.
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [
            (APP_KEY_FIELD, self.app_key.as_str()),
            (SIGNATURE_FIELD, self.signature.as_str()),
            (TIMESTAMP_FIELD, self.timestamp.as_str()),
        ]
    }
}

/// Sign with the current wall-clock time.
pub fn sign(api_key: &str, api_secret: &str) -> Signature {
    sign_at(api_key, api_secret, chrono::Utc::now().timestamp())
}

/// Sign for an explicit unix timestamp (seconds).
pub fn sign_at(api_key: &str, api_secret: &str, unix_seconds: i64) -> Signature {
    let timestamp = unix_seconds.to_string();
    let digest = Md5::digest(format!("{api_key}+{api_secret}+{timestamp}").as_bytes());

    Signature {
        app_key: api_key.to_string(),
        signature: hex::encode(digest),
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        let sig = sign_at("key", "secret", 1_700_000_000);

        assert_eq!(sig.app_key, "key");
        assert_eq!(sig.timestamp, "1700000000");
        assert_eq!(sig.signature, "afb253015418e11e118f1f85db58678b");
        assert_eq!(sig.signature.len(), 32);
        assert!(
            sig.signature
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn empty_input_digest() {
        let sig = sign_at("", "", 0);
        assert_eq!(sig.signature, "d7d5f05e354964f35794fe8294aeb6ff");
    }

    #[test]
    fn same_second_is_deterministic() {
        assert_eq!(sign_at("k", "s", 42), sign_at("k", "s", 42));
    }

    #[test]
    fn different_seconds_differ() {
        let a = sign_at("k", "s", 1_700_000_000);
        let b = sign_at("k", "s", 1_700_000_001);
        assert_ne!(a.signature, b.signature);
        assert_ne!(a.timestamp, b.timestamp);
    }

    #[test]
    fn live_signature_uses_current_time() {
        let before = chrono::Utc::now().timestamp();
        let sig = sign("k", "s");
        let after = chrono::Utc::now().timestamp();

        let ts: i64 = sig.timestamp.parse().unwrap();
        assert!(ts >= before && ts <= after);
        assert_eq!(sig, sign_at("k", "s", ts));
    }

    #[test]
    fn fields_in_wire_order() {
        let sig = sign_at("k", "s", 7);
        let names: Vec<_> = sig.fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["appKey", "signature", "timestamp"]);
    }

    #[test]
    fn serializes_camel_case_key() {
        let value = serde_json::to_value(sign_at("k", "s", 7)).unwrap();
        assert_eq!(value["appKey"], "k");
        assert_eq!(value["timestamp"], "7");
    }
}
