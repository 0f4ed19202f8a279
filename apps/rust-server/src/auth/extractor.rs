// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require a session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth, State(state): State<AppState>) -> Response {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! Rejections are sealed failure envelopes, so they carry the same wire
//! format as every other API response.

use axum::{extract::FromRequestParts, http::request::Parts, response::Response};

use super::{AuthError, AuthenticatedUser, Role};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Uses the user attached by the session middleware when present, otherwise
/// verifies the request's token itself.
pub struct Auth(pub AuthenticatedUser);

/// Resolve the authenticated user for a request.
pub fn authenticate(parts: &Parts, state: &AppState) -> Result<AuthenticatedUser, AuthError> {
    if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
        return Ok(user.clone());
    }

    let token = state
        .auth
        .token_from_headers(&parts.headers)?
        .ok_or(AuthError::MissingCredentials)?;
    state.auth.verify(&token)
}

impl FromRequestParts<AppState> for Auth {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, state)
            .map(Auth)
            .map_err(|err| err.into_envelope(&state.codec))
    }
}

/// Extractor that requires at least the moderator role.
pub struct ModeratorOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for ModeratorOnly {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).and_then(|user| {
            if user.has_role(Role::Moderator) {
                Ok(user)
            } else {
                Err(AuthError::InsufficientPermissions)
            }
        });

        user.map(ModeratorOnly)
            .map_err(|err| err.into_envelope(&state.codec))
    }
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).and_then(|user| {
            if user.is_admin() {
                Ok(user)
            } else {
                Err(AuthError::InsufficientPermissions)
            }
        });

        user.map(AdminOnly)
            .map_err(|err| err.into_envelope(&state.codec))
    }
}
