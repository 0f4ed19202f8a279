// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuance, lookup and verification.

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{AuthError, AuthenticatedUser, Role, SessionClaims};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// HS256 session-token configuration.
#[derive(Clone)]
pub struct AuthConfig {
    encoding: EncodingKey,
    decoding: DecodingKey,
    /// Name of the cookie carrying the session token.
    pub cookie_name: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    pub fn new(secret: &[u8], cookie_name: impl Into<String>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            cookie_name: cookie_name.into(),
        }
    }

    /// Issue a session token valid for `ttl`.
    ///
    /// Used by operator tooling and tests; interactive logins are issued by
    /// the login service.
    pub fn issue(
        &self,
        user_id: &str,
        display_name: &str,
        role: Role,
        ttl: chrono::Duration,
    ) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            name: Some(display_name.to_string()),
            role: Some(role.to_string()),
            iat: now,
            exp: now + ttl.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(e.to_string()))
    }

    /// Verify a session token and return the user it identifies.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;

        let token_data = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                _ => AuthError::MalformedToken,
            })?;

        Ok(AuthenticatedUser::from_claims(token_data.claims))
    }

    /// Find the session token in the request headers.
    ///
    /// An `Authorization` header wins over the cookie and must be a bearer
    /// token. Returns `Ok(None)` when neither is present.
    pub fn token_from_headers(&self, headers: &HeaderMap) -> Result<Option<String>, AuthError> {
        if let Some(value) = headers.get(AUTHORIZATION) {
            let value = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
            let token = value
                .strip_prefix("Bearer ")
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .ok_or(AuthError::InvalidAuthHeader)?;
            return Ok(Some(token.to_string()));
        }

        let token = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(token)
    }
}
