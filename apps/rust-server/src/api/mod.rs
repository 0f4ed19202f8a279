// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::Response,
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::middleware::session_middleware,
    auth::Role,
    envelope::SealedEnvelope,
    models::{CreateCommentRequest, CreateSupporterRequest, SupporterTier},
    state::AppState,
};

pub mod articles;
pub mod boards;
pub mod deprecated;
pub mod health;
pub mod profile;
pub mod supporters;
pub mod team;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/boards", get(boards::list_boards))
        .route("/boards/{slug}/members", get(boards::list_board_members))
        .route(
            "/supporters",
            get(supporters::list_supporters).post(supporters::create_supporter),
        )
        .route("/team", get(team::list_team_members))
        .route("/articles", get(articles::list_articles))
        .route("/articles/{slug}", get(articles::get_article))
        .route(
            "/articles/{slug}/comments",
            get(articles::list_comments).post(articles::create_comment),
        )
        .route(
            "/articles/{slug}/comments/{comment_id}",
            delete(articles::remove_comment),
        )
        .route("/me", get(profile::me))
        .route("/board/members", get(deprecated::legacy_board_members))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Unknown `/v1` routes answer with a sealed 404.
async fn not_found(State(state): State<AppState>) -> Response {
    state.codec.failure(StatusCode::NOT_FOUND, "Not found")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        boards::list_boards,
        boards::list_board_members,
        supporters::list_supporters,
        supporters::create_supporter,
        team::list_team_members,
        articles::list_articles,
        articles::get_article,
        articles::list_comments,
        articles::create_comment,
        articles::remove_comment,
        profile::me,
        deprecated::legacy_board_members,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            SealedEnvelope,
            CreateSupporterRequest,
            CreateCommentRequest,
            SupporterTier,
            Role,
            deprecated::DeprecationNotice,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Boards", description = "Boards and their members"),
        (name = "Supporters", description = "Supporter listing and registration"),
        (name = "Team", description = "Team page"),
        (name = "Articles", description = "Articles, comments and comment moderation"),
        (name = "Profile", description = "Session profile"),
        (name = "Deprecated", description = "Retired routes (plain JSON 410)"),
        (name = "Health", description = "Probes (plain JSON)")
    )
)]
struct ApiDoc;
