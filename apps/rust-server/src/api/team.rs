// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, response::Response};

use crate::{envelope::SealedEnvelope, error::ApiError, models::TeamResponse, state::AppState};

#[utoipa::path(
    get,
    path = "/v1/team",
    tag = "Team",
    responses((status = 200, description = "Sealed TeamResponse", body = SealedEnvelope))
)]
pub async fn list_team_members(State(state): State<AppState>) -> Response {
    state.codec.respond(team(&state).await)
}

async fn team(state: &AppState) -> Result<(StatusCode, TeamResponse), ApiError> {
    let store = state.store().await?;
    let team_members = store.read().await.team_members();
    Ok((
        StatusCode::OK,
        TeamResponse {
            success: true,
            team_members,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamMember;
    use crate::store::InMemoryStore;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn team_is_ordered() {
        let mut store = InMemoryStore::new();
        for (id, order) in [("t2", 2), ("t1", 1)] {
            store.insert_team_member(TeamMember {
                id: id.into(),
                name: id.to_uppercase(),
                title: "Steward".into(),
                bio: String::new(),
                order,
            });
        }
        let state = AppState::for_tests(store);

        let response = list_team_members(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let team: TeamResponse = state.codec.decode_as(&bytes).unwrap();
        let ids: Vec<_> = team.team_members.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t2"]);
    }
}
