// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session middleware for Axum.
//!
//! Runs in front of every `/v1` route:
//!
//! - no credentials: the request continues anonymously
//! - valid token: the [`AuthenticatedUser`] is inserted into the request
//!   extensions for the extractors in `extractor.rs`
//! - invalid or expired token: the request is rejected with a sealed 401
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/me", get(me))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), session_middleware));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::AuthenticatedUser;
use crate::state::AppState;

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match state.auth.token_from_headers(request.headers()) {
        Ok(Some(token)) => token,
        Ok(None) => return next.run(request).await,
        Err(err) => return err.into_envelope(&state.codec),
    };

    match state.auth.verify(&token) {
        Ok(user) => {
            tracing::debug!(user_id = %user.user_id, role = %user.role, "Session verified");
            request.extensions_mut().insert::<AuthenticatedUser>(user);
            next.run(request).await
        }
        Err(err) => err.into_envelope(&state.codec),
    }
}
