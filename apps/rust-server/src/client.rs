// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Consuming side of the envelope contract.
//!
//! [`EnvelopeClient`] fetches an API route, opens the sealed envelope and
//! hands back the typed payload. A body that cannot be opened is a failed
//! request, never empty data.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

use crate::api::deprecated::DeprecationNotice;
use crate::envelope::EnvelopeCodec;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Message shown for any failure whose detail must stay out of the UI.
pub const OPERATION_FAILED_MESSAGE: &str = "Operation failed";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The response could not be opened or did not match the expected shape.
    #[error("Operation failed")]
    RequestFailed,

    #[error("Operation failed")]
    Transport(#[source] reqwest::Error),

    /// The server answered `{ success: false, message }`.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The route is retired (plain `410 Gone`).
    #[error("{0}")]
    Deprecated(String),

    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Clone)]
pub struct EnvelopeClient {
    base_url: Url,
    codec: EnvelopeCodec,
    session: Option<String>,
    http: Client,
}

impl EnvelopeClient {
    /// Client for the API rooted at `base_url` (e.g. `https://host/v1`).
    pub fn new(base_url: &str, codec: EnvelopeCodec) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Transport)?;

        Ok(Self {
            base_url,
            codec,
            session: None,
            http,
        })
    }

    /// Send `token` as a bearer session on every request.
    pub fn with_session(mut self, token: impl Into<String>) -> Self {
        self.session = Some(token.into());
        self
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path)?;
        self.send(self.http.get(url)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        self.send(self.http.post(url).json(body)).await
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.session {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|err| {
            tracing::warn!(error = %err, "API request failed");
            ClientError::Transport(err)
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            tracing::warn!(error = %err, %status, "Reading API response failed");
            ClientError::Transport(err)
        })?;

        self.read_response(status, &body)
    }

    /// Interpret a raw response.
    pub fn read_response<T: DeserializeOwned>(
        &self,
        status: StatusCode,
        body: &[u8],
    ) -> Result<T, ClientError> {
        if status == StatusCode::GONE {
            let message = serde_json::from_slice::<DeprecationNotice>(body)
                .map(|notice| notice.message)
                .unwrap_or_else(|_| "This endpoint has been deprecated.".to_string());
            return Err(ClientError::Deprecated(message));
        }

        let payload = self.codec.decode(body).map_err(|err| {
            tracing::warn!(error = %err, %status, "Response envelope could not be opened");
            ClientError::RequestFailed
        })?;

        if payload.get("success").and_then(Value::as_bool) == Some(false) {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(OPERATION_FAILED_MESSAGE)
                .to_string();
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_value(payload).map_err(|err| {
            tracing::warn!(error = %err, %status, "Response payload has an unexpected shape");
            ClientError::RequestFailed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{FailureBody, SealedEnvelope};
    use crate::models::BoardsResponse;
    use crate::test_support::RESPONSE_SECRET;
    use serde_json::json;

    fn codec() -> EnvelopeCodec {
        EnvelopeCodec::from_secret(RESPONSE_SECRET).unwrap()
    }

    fn client() -> EnvelopeClient {
        EnvelopeClient::new("http://127.0.0.1:8080/v1", codec()).unwrap()
    }

    fn sealed(value: &Value) -> Vec<u8> {
        serde_json::to_vec(&codec().seal(value).unwrap()).unwrap()
    }

    #[test]
    fn base_url_keeps_its_path() {
        let client = client();
        assert_eq!(
            client.url("/boards/council/members").unwrap().as_str(),
            "http://127.0.0.1:8080/v1/boards/council/members"
        );
    }

    #[test]
    fn success_payload_is_typed() {
        let body = sealed(&json!({ "success": true, "boards": [] }));
        let decoded: BoardsResponse = client().read_response(StatusCode::OK, &body).unwrap();
        assert!(decoded.success);
        assert!(decoded.boards.is_empty());
    }

    #[test]
    fn failure_payload_is_rejected() {
        let body = serde_json::to_vec(&codec().seal(&FailureBody::new("Board not found")).unwrap())
            .unwrap();
        let err = client()
            .read_response::<Value>(StatusCode::NOT_FOUND, &body)
            .unwrap_err();

        match err {
            ClientError::Rejected { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Board not found");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn gone_is_deprecated() {
        let body = br#"{"message":"This endpoint has been deprecated."}"#;
        let err = client()
            .read_response::<Value>(StatusCode::GONE, body)
            .unwrap_err();
        assert!(matches!(err, ClientError::Deprecated(msg) if msg.contains("deprecated")));
    }

    #[test]
    fn unopenable_bodies_fail_generically() {
        let other = EnvelopeCodec::from_secret(&[7u8; 32]).unwrap();
        let wrong_key = serde_json::to_vec(&other.seal(&json!({ "success": true })).unwrap()).unwrap();
        let tampered = {
            let mut envelope: SealedEnvelope =
                serde_json::from_slice(&sealed(&json!({ "success": true }))).unwrap();
            envelope.v = 9;
            serde_json::to_vec(&envelope).unwrap()
        };

        for body in [wrong_key, tampered, b"{\"success\":true}".to_vec()] {
            let err = client()
                .read_response::<Value>(StatusCode::OK, &body)
                .unwrap_err();
            assert!(matches!(err, ClientError::RequestFailed));
            assert_eq!(err.to_string(), OPERATION_FAILED_MESSAGE);
        }
    }

    #[test]
    fn unexpected_shape_fails_generically() {
        let body = sealed(&json!({ "success": true, "boards": "nope" }));
        let err = client()
            .read_response::<BoardsResponse>(StatusCode::OK, &body)
            .unwrap_err();
        assert!(matches!(err, ClientError::RequestFailed));
    }
}
