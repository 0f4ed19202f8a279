// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::{
    auth::AdminOnly,
    envelope::SealedEnvelope,
    error::ApiError,
    events::PlatformEvent,
    models::{CreateSupporterRequest, SupporterResponse, SupportersResponse},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/v1/supporters",
    tag = "Supporters",
    responses((status = 200, description = "Sealed SupportersResponse", body = SealedEnvelope))
)]
pub async fn list_supporters(State(state): State<AppState>) -> Response {
    state.codec.respond(supporters(&state).await)
}

async fn supporters(state: &AppState) -> Result<(StatusCode, SupportersResponse), ApiError> {
    let store = state.store().await?;
    let supporters = store.read().await.list_supporters();
    Ok((
        StatusCode::OK,
        SupportersResponse {
            success: true,
            supporters,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/v1/supporters",
    request_body = CreateSupporterRequest,
    tag = "Supporters",
    responses(
        (status = 201, description = "Sealed SupporterResponse", body = SealedEnvelope),
        (status = 403, description = "Sealed failure: admin role required", body = SealedEnvelope)
    )
)]
pub async fn create_supporter(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    request: Result<Json<CreateSupporterRequest>, JsonRejection>,
) -> Response {
    let result = match request {
        Ok(Json(request)) => add_supporter(&state, request).await,
        Err(rejection) => Err(rejection.into()),
    };
    if let Ok((_, body)) = &result {
        tracing::info!(admin = %admin.user_id, supporter_id = %body.supporter.id, "Supporter added");
    }
    state.codec.respond(result)
}

async fn add_supporter(
    state: &AppState,
    request: CreateSupporterRequest,
) -> Result<(StatusCode, SupporterResponse), ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::unprocessable("Supporter name is required"));
    }

    let store = state.store().await?;
    let supporter = store.write().await.add_supporter(CreateSupporterRequest {
        name: name.to_string(),
        tier: request.tier,
    });

    state.events.publish(PlatformEvent::SupporterAdded {
        supporter_id: supporter.id.clone(),
    });

    Ok((
        StatusCode::CREATED,
        SupporterResponse {
            success: true,
            supporter,
        },
    ))
}
