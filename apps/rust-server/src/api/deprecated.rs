// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deprecated routes.
//!
//! The documented exemption from the envelope contract. A retired route
//! answers `410 Gone` with a plain JSON notice, readable without the
//! envelope secret. A notice never carries user or domain data.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Plain-text body of a `410 Gone` response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeprecationNotice {
    pub message: String,
    /// Route that replaces the retired one, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

/// Unencrypted `410 Gone` response.
#[derive(Debug, Clone)]
pub struct Deprecated(pub DeprecationNotice);

impl Deprecated {
    pub fn new(message: impl Into<String>, replacement: Option<&str>) -> Self {
        Self(DeprecationNotice {
            message: message.into(),
            replacement: replacement.map(str::to_string),
        })
    }
}

impl IntoResponse for Deprecated {
    fn into_response(self) -> Response {
        (StatusCode::GONE, Json(self.0)).into_response()
    }
}

/// Retired single-board member listing.
#[utoipa::path(
    get,
    path = "/v1/board/members",
    tag = "Deprecated",
    responses((status = 410, description = "Route retired (plain JSON)", body = DeprecationNotice))
)]
pub async fn legacy_board_members() -> Deprecated {
    Deprecated::new(
        "This endpoint has been deprecated. Use /v1/boards/{slug}/members instead.",
        Some("/v1/boards/{slug}/members"),
    )
}
