//! Request and payload types sent to the submission API.
//!
//! Serialised as JSON. Field order follows declaration order; arbitrary
//! objects keep insertion order because `serde_json` is built with
//! `preserve_order`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Submission envelope
// ---------------------------------------------------------------------------

/// Request body for the submission endpoint: `{"data": "<ciphertext>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Armored (or armor-stripped) OpenPGP ciphertext.
    pub data: String,
}

impl SubmitRequest {
    /// Wrap a ciphertext string.
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Login verification payload encrypted for the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub email: String,
    pub device_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn submit_request_shape() {
        let req = SubmitRequest::new("-----BEGIN PGP MESSAGE-----");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"data": "-----BEGIN PGP MESSAGE-----"}));
    }

    #[test]
    fn login_payload_uses_camel_case_in_declaration_order() {
        let p = LoginPayload {
            email: "a@b.com".into(),
            device_id: "1".into(),
        };
        assert_eq!(
            serde_json::to_string(&p).unwrap(),
            r#"{"email":"a@b.com","deviceId":"1"}"#
        );
    }

    #[test]
    fn object_keys_keep_insertion_order() {
        let v: serde_json::Value = serde_json::from_str(r#"{"z":1,"a":2}"#).unwrap();
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"z":1,"a":2}"#);
    }
}
