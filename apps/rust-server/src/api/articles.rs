// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::Response,
    Json,
};

use crate::{
    auth::{Auth, AuthenticatedUser, ModeratorOnly},
    envelope::SealedEnvelope,
    error::ApiError,
    events::PlatformEvent,
    models::{
        ArticleResponse, ArticleSummary, ArticlesResponse, CommentRemovedResponse,
        CommentResponse, CommentsResponse, CreateCommentRequest, MAX_COMMENT_LEN,
    },
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/v1/articles",
    tag = "Articles",
    responses((status = 200, description = "Sealed ArticlesResponse", body = SealedEnvelope))
)]
pub async fn list_articles(State(state): State<AppState>) -> Response {
    state.codec.respond(articles(&state).await)
}

async fn articles(state: &AppState) -> Result<(StatusCode, ArticlesResponse), ApiError> {
    let store = state.store().await?;
    let articles = store
        .read()
        .await
        .list_articles()
        .iter()
        .map(ArticleSummary::from)
        .collect();
    Ok((
        StatusCode::OK,
        ArticlesResponse {
            success: true,
            articles,
        },
    ))
}

#[utoipa::path(
    get,
    path = "/v1/articles/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    tag = "Articles",
    responses(
        (status = 200, description = "Sealed ArticleResponse", body = SealedEnvelope),
        (status = 404, description = "Sealed failure: article not found", body = SealedEnvelope)
    )
)]
pub async fn get_article(
    slug: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Response {
    let result = match slug {
        Ok(Path(slug)) => article(&state, &slug).await,
        Err(rejection) => Err(rejection.into()),
    };
    state.codec.respond(result)
}

async fn article(state: &AppState, slug: &str) -> Result<(StatusCode, ArticleResponse), ApiError> {
    let store = state.store().await?;
    let article = store.read().await.article(slug)?;

    state.events.publish(PlatformEvent::ArticleViewed {
        slug: article.slug.clone(),
    });

    Ok((
        StatusCode::OK,
        ArticleResponse {
            success: true,
            article,
        },
    ))
}

#[utoipa::path(
    get,
    path = "/v1/articles/{slug}/comments",
    params(("slug" = String, Path, description = "Article slug")),
    tag = "Articles",
    responses(
        (status = 200, description = "Sealed CommentsResponse", body = SealedEnvelope),
        (status = 404, description = "Sealed failure: article not found", body = SealedEnvelope)
    )
)]
pub async fn list_comments(
    slug: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Response {
    let result = match slug {
        Ok(Path(slug)) => comments(&state, &slug).await,
        Err(rejection) => Err(rejection.into()),
    };
    state.codec.respond(result)
}

async fn comments(
    state: &AppState,
    slug: &str,
) -> Result<(StatusCode, CommentsResponse), ApiError> {
    let store = state.store().await?;
    let comments = store.read().await.comments(slug)?;
    Ok((
        StatusCode::OK,
        CommentsResponse {
            success: true,
            comments,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/v1/articles/{slug}/comments",
    params(("slug" = String, Path, description = "Article slug")),
    request_body = CreateCommentRequest,
    tag = "Articles",
    responses(
        (status = 201, description = "Sealed CommentResponse", body = SealedEnvelope),
        (status = 401, description = "Sealed failure: session required", body = SealedEnvelope),
        (status = 404, description = "Sealed failure: article not found", body = SealedEnvelope),
        (status = 422, description = "Sealed failure: invalid comment body", body = SealedEnvelope)
    )
)]
pub async fn create_comment(
    Auth(user): Auth,
    slug: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
    request: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Response {
    let result = match (slug, request) {
        (Ok(Path(slug)), Ok(Json(request))) => add_comment(&state, &user, &slug, request).await,
        (Err(rejection), _) => Err(rejection.into()),
        (_, Err(rejection)) => Err(rejection.into()),
    };
    state.codec.respond(result)
}

async fn add_comment(
    state: &AppState,
    user: &AuthenticatedUser,
    slug: &str,
    request: CreateCommentRequest,
) -> Result<(StatusCode, CommentResponse), ApiError> {
    let body = request.body.trim();
    if body.is_empty() {
        return Err(ApiError::unprocessable("Comment body is required"));
    }
    if body.chars().count() > MAX_COMMENT_LEN {
        return Err(ApiError::unprocessable(format!(
            "Comment body exceeds {MAX_COMMENT_LEN} characters"
        )));
    }

    let store = state.store().await?;
    let comment = store
        .write()
        .await
        .add_comment(slug, &user.user_id, &user.display_name, body)?;

    tracing::info!(article = %slug, comment_id = %comment.id, user_id = %user.user_id, "Comment posted");
    state.events.publish(PlatformEvent::CommentPosted {
        article_slug: comment.article_slug.clone(),
        comment_id: comment.id.clone(),
        author_id: comment.author_id.clone(),
    });

    Ok((
        StatusCode::CREATED,
        CommentResponse {
            success: true,
            comment,
        },
    ))
}

#[utoipa::path(
    delete,
    path = "/v1/articles/{slug}/comments/{comment_id}",
    params(
        ("slug" = String, Path, description = "Article slug"),
        ("comment_id" = String, Path, description = "Comment id")
    ),
    tag = "Articles",
    responses(
        (status = 200, description = "Sealed CommentRemovedResponse", body = SealedEnvelope),
        (status = 403, description = "Sealed failure: moderator role required", body = SealedEnvelope),
        (status = 404, description = "Sealed failure: article or comment not found", body = SealedEnvelope)
    )
)]
pub async fn remove_comment(
    ModeratorOnly(moderator): ModeratorOnly,
    ids: Result<Path<(String, String)>, PathRejection>,
    State(state): State<AppState>,
) -> Response {
    let result = match ids {
        Ok(Path((slug, comment_id))) => delete_comment(&state, &moderator, &slug, &comment_id).await,
        Err(rejection) => Err(rejection.into()),
    };
    state.codec.respond(result)
}

async fn delete_comment(
    state: &AppState,
    moderator: &AuthenticatedUser,
    slug: &str,
    comment_id: &str,
) -> Result<(StatusCode, CommentRemovedResponse), ApiError> {
    let store = state.store().await?;
    let comment = store.write().await.remove_comment(slug, comment_id)?;

    tracing::info!(article = %slug, comment_id = %comment.id, moderator = %moderator.user_id, "Comment removed");
    state.events.publish(PlatformEvent::CommentRemoved {
        article_slug: comment.article_slug,
        comment_id: comment.id.clone(),
        moderator_id: moderator.user_id.clone(),
    });

    Ok((
        StatusCode::OK,
        CommentRemovedResponse {
            success: true,
            comment_id: comment.id,
        },
    ))
}
