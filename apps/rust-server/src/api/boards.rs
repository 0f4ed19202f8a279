// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    envelope::SealedEnvelope,
    error::ApiError,
    models::{BoardMembersResponse, BoardsResponse},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/v1/boards",
    tag = "Boards",
    responses((status = 200, description = "Sealed BoardsResponse", body = SealedEnvelope))
)]
pub async fn list_boards(State(state): State<AppState>) -> Response {
    state.codec.respond(boards(&state).await)
}

async fn boards(state: &AppState) -> Result<(StatusCode, BoardsResponse), ApiError> {
    let store = state.store().await?;
    let boards = store.read().await.list_boards();
    Ok((
        StatusCode::OK,
        BoardsResponse {
            success: true,
            boards,
        },
    ))
}

#[utoipa::path(
    get,
    path = "/v1/boards/{slug}/members",
    params(("slug" = String, Path, description = "Board slug")),
    tag = "Boards",
    responses(
        (status = 200, description = "Sealed BoardMembersResponse", body = SealedEnvelope),
        (status = 404, description = "Sealed failure: board not found", body = SealedEnvelope)
    )
)]
pub async fn list_board_members(
    slug: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Response {
    let result = match slug {
        Ok(Path(slug)) => board_members(&state, &slug).await,
        Err(rejection) => Err(rejection.into()),
    };
    state.codec.respond(result)
}

async fn board_members(
    state: &AppState,
    slug: &str,
) -> Result<(StatusCode, BoardMembersResponse), ApiError> {
    let store = state.store().await?;
    let board_members = store.read().await.board_members(slug)?;
    Ok((
        StatusCode::OK,
        BoardMembersResponse {
            success: true,
            board_members,
        },
    ))
}
