// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encode/decode of the encrypted response envelope.

use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64ct::{Base64, Encoding};
use serde::{de::DeserializeOwned, ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::Value;
use utoipa::ToSchema;

use super::key::{EnvelopeKey, KeyError};
use crate::error::{ApiError, GENERIC_FAILURE_MESSAGE};

/// Current envelope version. Bound into every ciphertext as associated data.
pub const ENVELOPE_VERSION: u8 = 1;

fn associated_data(version: u8) -> Vec<u8> {
    format!("agora-envelope/v{version}").into_bytes()
}

/// The wire object returned by every data-carrying route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SealedEnvelope {
    /// Envelope version.
    pub v: u8,
    /// Base64 AES-GCM nonce (12 bytes).
    pub iv: String,
    /// Base64 ciphertext with the authentication tag appended.
    pub data: String,
}

/// Plaintext of an application-level failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureBody {
    pub success: bool,
    pub message: String,
}

impl FailureBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Options for [`EnvelopeCodec::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub status: StatusCode,
}

impl EncodeOptions {
    pub fn status(status: StatusCode) -> Self {
        Self { status }
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::status(StatusCode::OK)
    }
}

/// Encode-side failures. Never sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("payload encryption failed")]
    Seal,
}

/// Decode-side failures.
///
/// Callers must treat every variant as a failed request, never as empty data.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Body is not an envelope of the fixed shape.
    #[error("malformed envelope: {0}")]
    Malformed(String),

    /// Envelope version this build does not understand.
    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u8),

    /// Authentication failed: tampered or truncated data, or the wrong secret.
    #[error("envelope could not be decrypted")]
    Decryption,

    /// Decrypted bytes are not the expected JSON.
    #[error("decrypted payload is invalid: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Response envelope codec.
///
/// Cheap to clone; the derived key is shared.
#[derive(Debug, Clone)]
pub struct EnvelopeCodec {
    key: Arc<EnvelopeKey>,
}

impl EnvelopeCodec {
    pub fn new(key: EnvelopeKey) -> Self {
        Self { key: Arc::new(key) }
    }

    pub fn from_secret(secret: &[u8]) -> Result<Self, KeyError> {
        EnvelopeKey::from_secret(secret).map(Self::new)
    }

    // ========== Encode ==========

    /// Serialize and encrypt `data` into a [`SealedEnvelope`].
    pub fn seal<T: Serialize + ?Sized>(&self, data: &T) -> Result<SealedEnvelope, EncodeError> {
        let value = serde_json::to_value(data)?;
        self.seal_value(&value)
    }

    fn seal_value(&self, value: &Value) -> Result<SealedEnvelope, EncodeError> {
        let plaintext = serde_json::to_vec(&Canonical(value))?;
        let (nonce, ciphertext) = self
            .key
            .seal(&associated_data(ENVELOPE_VERSION), &plaintext)
            .map_err(|_| EncodeError::Seal)?;

        Ok(SealedEnvelope {
            v: ENVELOPE_VERSION,
            iv: Base64::encode_string(&nonce),
            data: Base64::encode_string(&ciphertext),
        })
    }

    /// Encode `data` as an encrypted HTTP response with the given status.
    ///
    /// Fails closed: if `data` cannot be serialized or sealed, the client
    /// receives a sealed generic failure with status 500 instead.
    pub fn encode<T: Serialize + ?Sized>(&self, data: &T, options: EncodeOptions) -> Response {
        let sealed = serde_json::to_value(data)
            .map_err(EncodeError::from)
            .and_then(|value| {
                check_status_consistency(&value, options.status);
                self.seal_value(&value)
            });

        match sealed {
            Ok(envelope) => envelope_response(options.status, envelope),
            Err(err) => {
                tracing::error!(error = %err, status = %options.status, "Response encoding failed");
                self.generic_failure()
            }
        }
    }

    /// Encode an application-level failure `{ success: false, message }`.
    pub fn failure(&self, status: StatusCode, message: impl Into<String>) -> Response {
        self.encode(&FailureBody::new(message), EncodeOptions::status(status))
    }

    /// Terminal action for route handlers: exactly one encode of either the
    /// success value or the error.
    pub fn respond<T: Serialize>(&self, result: Result<(StatusCode, T), ApiError>) -> Response {
        match result {
            Ok((status, body)) => self.encode(&body, EncodeOptions::status(status)),
            Err(err) => {
                if err.status.is_server_error() {
                    tracing::error!(status = %err.status, error = %err.message, "Request failed");
                } else {
                    tracing::debug!(status = %err.status, error = %err.message, "Request rejected");
                }
                self.failure(err.status, err.public_message())
            }
        }
    }

    fn generic_failure(&self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        match self.seal(&FailureBody::new(GENERIC_FAILURE_MESSAGE)) {
            Ok(envelope) => envelope_response(status, envelope),
            Err(err) => {
                tracing::error!(error = %err, "Generic failure envelope could not be sealed");
                status.into_response()
            }
        }
    }

    // ========== Decode ==========

    /// Decode a received response body back into the original JSON value.
    pub fn decode(&self, body: &[u8]) -> Result<Value, DecodeError> {
        let envelope: SealedEnvelope =
            serde_json::from_slice(body).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        self.open(&envelope)
    }

    /// Decode straight into a typed value.
    pub fn decode_as<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, DecodeError> {
        Ok(serde_json::from_value(self.decode(body)?)?)
    }

    /// Decrypt an already-parsed envelope.
    pub fn open(&self, envelope: &SealedEnvelope) -> Result<Value, DecodeError> {
        if envelope.v != ENVELOPE_VERSION {
            return Err(DecodeError::UnsupportedVersion(envelope.v));
        }

        let nonce = Base64::decode_vec(&envelope.iv)
            .map_err(|_| DecodeError::Malformed("iv is not valid base64".to_string()))?;
        let ciphertext = Base64::decode_vec(&envelope.data)
            .map_err(|_| DecodeError::Malformed("data is not valid base64".to_string()))?;

        let plaintext = self
            .key
            .open(&associated_data(envelope.v), &nonce, ciphertext)
            .map_err(|_| DecodeError::Decryption)?;

        Ok(serde_json::from_slice(&plaintext)?)
    }
}

/// Compact JSON view of a value with object keys sorted at every depth.
struct Canonical<'a>(&'a Value);

impl Serialize for Canonical<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(object) => {
                let mut entries: Vec<_> = object.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));

                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, &Canonical(value))?;
                }
                map.end()
            }
            Value::Array(items) => serializer.collect_seq(items.iter().map(Canonical)),
            other => other.serialize(serializer),
        }
    }
}

fn envelope_response(status: StatusCode, envelope: SealedEnvelope) -> Response {
    (
        status,
        [(header::CACHE_CONTROL, "no-store")],
        Json(envelope),
    )
        .into_response()
}

/// `success` must agree with the status class.
fn check_status_consistency(value: &Value, status: StatusCode) {
    if let Some(success) = value.get("success").and_then(Value::as_bool) {
        if success != status.is_success() {
            tracing::warn!(
                %status,
                success,
                "Response success flag disagrees with HTTP status"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    const SECRET: &[u8] = b"test-secret-test-secret-test-secret!";
    const OTHER_SECRET: &[u8] = b"another-secret-another-secret-another";

    fn codec() -> EnvelopeCodec {
        EnvelopeCodec::from_secret(SECRET).unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize"))
        }
    }

    fn flip_bit(b64: &str, bit: usize) -> String {
        let mut bytes = Base64::decode_vec(b64).unwrap();
        bytes[bit / 8] ^= 1 << (bit % 8);
        Base64::encode_string(&bytes)
    }

    #[derive(Serialize)]
    struct Inner {
        beta: u8,
        alpha: u8,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct DeclaredOutOfOrder {
        zeta: bool,
        member_list: Vec<Inner>,
        alpha: &'static str,
    }

    #[test]
    fn plaintext_is_compact_with_sorted_keys() {
        let codec = codec();
        let envelope = codec
            .seal(&DeclaredOutOfOrder {
                zeta: true,
                member_list: vec![Inner { beta: 2, alpha: 1 }],
                alpha: "a",
            })
            .unwrap();

        let nonce = Base64::decode_vec(&envelope.iv).unwrap();
        let ciphertext = Base64::decode_vec(&envelope.data).unwrap();
        let plaintext = codec
            .key
            .open(&associated_data(envelope.v), &nonce, ciphertext)
            .unwrap();

        assert_eq!(
            String::from_utf8(plaintext).unwrap(),
            r#"{"alpha":"a","memberList":[{"alpha":1,"beta":2}],"zeta":true}"#
        );
    }

    #[tokio::test]
    async fn board_members_scenario_round_trips() {
        let codec = codec();
        let data = json!({ "success": true, "boardMembers": [{ "name": "Ada" }] });

        let response = codec.encode(&data, EncodeOptions::status(StatusCode::OK));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");

        let body = body_bytes(response).await;
        assert_eq!(codec.decode(&body).unwrap(), data);

        let wrong = EnvelopeCodec::from_secret(OTHER_SECRET).unwrap();
        assert!(matches!(wrong.decode(&body), Err(DecodeError::Decryption)));
    }

    #[test]
    fn round_trip_preserves_assorted_values() {
        let codec = codec();
        let values = [
            json!(null),
            json!(true),
            json!(42),
            json!("plain string"),
            json!([]),
            json!({}),
            json!({ "nested": { "list": [1, 2.5, "three", null], "emoji": "🎉" } }),
        ];

        for value in values {
            let sealed = codec.seal(&value).unwrap();
            assert_eq!(codec.open(&sealed).unwrap(), value);
        }
    }

    #[test]
    fn every_nonce_bit_flip_is_detected() {
        let codec = codec();
        let sealed = codec.seal(&json!({ "success": true })).unwrap();

        for bit in 0..96 {
            let mut tampered = sealed.clone();
            tampered.iv = flip_bit(&sealed.iv, bit);
            assert!(
                matches!(codec.open(&tampered), Err(DecodeError::Decryption)),
                "nonce bit {bit} flip not detected"
            );
        }
    }

    #[test]
    fn every_ciphertext_bit_flip_is_detected() {
        let codec = codec();
        let sealed = codec.seal(&json!({ "success": true, "n": 1 })).unwrap();
        let len = Base64::decode_vec(&sealed.data).unwrap().len();

        for bit in 0..len * 8 {
            let mut tampered = sealed.clone();
            tampered.data = flip_bit(&sealed.data, bit);
            assert!(
                matches!(codec.open(&tampered), Err(DecodeError::Decryption)),
                "ciphertext bit {bit} flip not detected"
            );
        }
    }

    #[test]
    fn truncated_ciphertext_fails_decryption() {
        let codec = codec();
        let mut sealed = codec.seal(&json!({ "success": true })).unwrap();
        let bytes = Base64::decode_vec(&sealed.data).unwrap();
        sealed.data = Base64::encode_string(&bytes[..bytes.len() - 1]);

        assert!(matches!(codec.open(&sealed), Err(DecodeError::Decryption)));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let codec = codec();
        let mut sealed = codec.seal(&json!({ "success": true })).unwrap();
        sealed.v = 2;

        assert!(matches!(
            codec.open(&sealed),
            Err(DecodeError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        let codec = codec();

        let bodies: [&[u8]; 4] = [
            b"not json",
            br#"{"success":true,"boardMembers":[]}"#,
            br#"{"v":1,"iv":"AAAA"}"#,
            br#"{"v":1,"iv":"@@@","data":"AAAA"}"#,
        ];

        for body in bodies {
            assert!(
                matches!(codec.decode(body), Err(DecodeError::Malformed(_))),
                "accepted {}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn extra_cleartext_fields_are_rejected() {
        let codec = codec();
        let sealed = codec.seal(&json!({ "success": true })).unwrap();
        let mut raw = serde_json::to_value(&sealed).unwrap();
        raw["success"] = json!(true);

        let body = serde_json::to_vec(&raw).unwrap();
        assert!(matches!(codec.decode(&body), Err(DecodeError::Malformed(_))));
    }

    #[tokio::test]
    async fn envelope_never_contains_plaintext_values() {
        let codec = codec();
        let data = json!({
            "success": true,
            "boardMembers": [
                { "name": "MARKER-ada-lovelace-91f2", "email": "MARKER-ada@example.test" }
            ],
            "note": "MARKER-note-55c1"
        });

        let body = body_bytes(codec.encode(&data, EncodeOptions::default())).await;
        let raw = String::from_utf8(body).unwrap();

        for marker in ["MARKER", "ada-lovelace", "example.test", "note-55c1", "boardMembers"] {
            assert!(!raw.contains(marker), "envelope leaks {marker}");
        }
        let wire: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let mut keys: Vec<_> = wire.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["data", "iv", "v"]);
    }

    #[tokio::test]
    async fn serialization_failure_fails_closed() {
        let codec = codec();
        let response = codec.encode(&Unserializable, EncodeOptions::status(StatusCode::OK));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_bytes(response).await;
        let failure: FailureBody = codec.decode_as(&body).unwrap();
        assert_eq!(failure, FailureBody::new(GENERIC_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn respond_hides_internal_error_detail() {
        let codec = codec();
        let result: Result<(StatusCode, serde_json::Value), ApiError> =
            Err(ApiError::internal("connection refused at 10.0.0.7:27017"));

        let response = codec.respond(result);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let failure: FailureBody = codec.decode_as(&body_bytes(response).await).unwrap();
        assert!(!failure.success);
        assert_eq!(failure.message, GENERIC_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn respond_passes_client_errors_through() {
        let codec = codec();
        let result: Result<(StatusCode, serde_json::Value), ApiError> =
            Err(ApiError::not_found("Board not found"));

        let response = codec.respond(result);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let failure: FailureBody = codec.decode_as(&body_bytes(response).await).unwrap();
        assert_eq!(failure, FailureBody::new("Board not found"));
    }

    #[tokio::test]
    async fn respond_encodes_success_with_its_status() {
        let codec = codec();
        let response = codec.respond(Ok((StatusCode::CREATED, json!({ "success": true }))));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            codec.decode(&body_bytes(response).await).unwrap(),
            json!({ "success": true })
        );
    }
}
