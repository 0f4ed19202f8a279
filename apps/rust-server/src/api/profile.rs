// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, response::Response};

use crate::{
    auth::Auth,
    envelope::SealedEnvelope,
    models::{ProfileResponse, UserProfile},
    state::AppState,
};

/// The caller's own profile, as carried by the session token.
#[utoipa::path(
    get,
    path = "/v1/me",
    tag = "Profile",
    responses(
        (status = 200, description = "Sealed ProfileResponse", body = SealedEnvelope),
        (status = 401, description = "Sealed failure: session required", body = SealedEnvelope)
    )
)]
pub async fn me(Auth(user): Auth, State(state): State<AppState>) -> Response {
    let body = ProfileResponse {
        success: true,
        user: UserProfile {
            user_id: user.user_id,
            display_name: user.display_name,
            role: user.role,
        },
    };
    state.codec.respond(Ok((StatusCode::OK, body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::store::InMemoryStore;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn me_returns_session_identity() {
        let state = AppState::for_tests(InMemoryStore::new());
        let user = AuthenticatedUser {
            user_id: "user_42".into(),
            display_name: "Grace".into(),
            role: Role::Moderator,
            expires_at: 0,
        };

        let response = me(Auth(user), State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let profile: ProfileResponse = state.codec.decode_as(&bytes).unwrap();
        assert_eq!(profile.user.user_id, "user_42");
        assert_eq!(profile.user.role, Role::Moderator);
    }
}
