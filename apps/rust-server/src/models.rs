// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Domain records owned by the data layer plus the response bodies the
//! handlers hand to the envelope codec. Field names are camelCase on the
//! wire, matching what the browser client reads after decoding.
//!
//! ## Model Categories
//!
//! - **Boards**: community boards and their members
//! - **Supporters**: people backing the platform
//! - **Team**: staff shown on the about page
//! - **Articles & Comments**: published content and discussion

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Boards
// =============================================================================

/// A community board.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    /// URL-safe identifier used in routes.
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A member seat on a board.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BoardMember {
    /// Slug of the board this seat belongs to.
    pub board: String,
    pub name: String,
    /// Seat title, e.g. "Chair" or "Treasurer".
    #[serde(default)]
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

// =============================================================================
// Supporters & Team
// =============================================================================

/// Supporter tiers, lowest to highest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SupporterTier {
    Bronze,
    Silver,
    Gold,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Supporter {
    pub id: String,
    pub name: String,
    pub tier: SupporterTier,
    pub since: DateTime<Utc>,
}

/// Request to add a supporter (admin only).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupporterRequest {
    pub name: String,
    pub tier: SupporterTier,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub bio: String,
    /// Display order on the team page.
    #[serde(default)]
    pub order: u32,
}

// =============================================================================
// Articles & Comments
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub summary: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
}

/// Article listing entry (no body).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub slug: String,
    pub title: String,
    pub author: String,
    pub summary: String,
    pub published_at: DateTime<Utc>,
}

impl From<&Article> for ArticleSummary {
    fn from(article: &Article) -> Self {
        Self {
            slug: article.slug.clone(),
            title: article.title.clone(),
            author: article.author.clone(),
            summary: article.summary.clone(),
            published_at: article.published_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub article_slug: String,
    pub author_id: String,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub body: String,
}

/// Maximum comment length in characters.
pub const MAX_COMMENT_LEN: usize = 5_000;

// =============================================================================
// Response Bodies (plaintext of the envelope)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardsResponse {
    pub success: bool,
    pub boards: Vec<Board>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardMembersResponse {
    pub success: bool,
    pub board_members: Vec<BoardMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupportersResponse {
    pub success: bool,
    pub supporters: Vec<Supporter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupporterResponse {
    pub success: bool,
    pub supporter: Supporter,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    pub success: bool,
    pub team_members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesResponse {
    pub success: bool,
    pub articles: Vec<ArticleSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    pub success: bool,
    pub article: Article,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentsResponse {
    pub success: bool,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub success: bool,
    pub comment: Comment,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentRemovedResponse {
    pub success: bool,
    pub comment_id: String,
}

/// The caller's own profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    pub role: crate::auth::Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub success: bool,
    pub user: UserProfile,
}
