// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory content store.
//!
//! Holds the platform's domain records and answers the handful of queries
//! the API routes need. Records are returned as plain domain objects; the
//! handlers decide how they are wrapped.
//!
//! The store can be seeded from a JSON document shaped like [`SeedData`].

use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{
    Article, Board, BoardMember, Comment, CreateSupporterRequest, Supporter, TeamMember,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("seed data is invalid: {0}")]
    Seed(#[from] serde_json::Error),

    #[error("{0} not found")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Seed document accepted by [`InMemoryStore::from_seed`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedData {
    pub boards: Vec<Board>,
    pub board_members: Vec<BoardMember>,
    pub supporters: Vec<Supporter>,
    pub team_members: Vec<TeamMember>,
    pub articles: Vec<Article>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    boards: HashMap<String, Board>,
    board_members: Vec<BoardMember>,
    supporters: HashMap<String, Supporter>,
    team: Vec<TeamMember>,
    articles: HashMap<String, Article>,
    comments: Vec<Comment>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: SeedData) -> Self {
        Self {
            boards: seed
                .boards
                .into_iter()
                .map(|board| (board.slug.clone(), board))
                .collect(),
            board_members: seed.board_members,
            supporters: seed
                .supporters
                .into_iter()
                .map(|supporter| (supporter.id.clone(), supporter))
                .collect(),
            team: seed.team_members,
            articles: seed
                .articles
                .into_iter()
                .map(|article| (article.slug.clone(), article))
                .collect(),
            comments: seed.comments,
        }
    }

    /// Parse a seed document.
    pub fn from_seed_json(bytes: &[u8]) -> StoreResult<Self> {
        let seed: SeedData = serde_json::from_slice(bytes)?;
        Ok(Self::from_seed(seed))
    }

    // ========== Boards ==========

    pub fn insert_board(&mut self, board: Board) {
        self.boards.insert(board.slug.clone(), board);
    }

    /// All boards, sorted by name.
    pub fn list_boards(&self) -> Vec<Board> {
        let mut boards: Vec<Board> = self.boards.values().cloned().collect();
        boards.sort_by(|a, b| a.name.cmp(&b.name));
        boards
    }

    pub fn insert_board_member(&mut self, member: BoardMember) {
        self.board_members.push(member);
    }

    /// Members of a board in insertion order.
    pub fn board_members(&self, slug: &str) -> StoreResult<Vec<BoardMember>> {
        if !self.boards.contains_key(slug) {
            return Err(StoreError::NotFound("Board".to_string()));
        }
        Ok(self
            .board_members
            .iter()
            .filter(|member| member.board == slug)
            .cloned()
            .collect())
    }

    // ========== Supporters ==========

    /// Supporters, highest tier first, then longest-standing.
    pub fn list_supporters(&self) -> Vec<Supporter> {
        let mut supporters: Vec<Supporter> = self.supporters.values().cloned().collect();
        supporters.sort_by(|a, b| b.tier.cmp(&a.tier).then(a.since.cmp(&b.since)));
        supporters
    }

    pub fn add_supporter(&mut self, request: CreateSupporterRequest) -> Supporter {
        let supporter = Supporter {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            tier: request.tier,
            since: Utc::now(),
        };
        self.supporters
            .insert(supporter.id.clone(), supporter.clone());
        supporter
    }

    // ========== Team ==========

    pub fn insert_team_member(&mut self, member: TeamMember) {
        self.team.push(member);
    }

    pub fn team_members(&self) -> Vec<TeamMember> {
        let mut team = self.team.clone();
        team.sort_by_key(|member| member.order);
        team
    }

    // ========== Articles ==========

    pub fn insert_article(&mut self, article: Article) {
        self.articles.insert(article.slug.clone(), article);
    }

    /// Articles, newest first.
    pub fn list_articles(&self) -> Vec<Article> {
        let mut articles: Vec<Article> = self.articles.values().cloned().collect();
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        articles
    }

    pub fn article(&self, slug: &str) -> StoreResult<Article> {
        self.articles
            .get(slug)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("Article".to_string()))
    }

    // ========== Comments ==========

    /// Comments on an article, oldest first.
    pub fn comments(&self, article_slug: &str) -> StoreResult<Vec<Comment>> {
        if !self.articles.contains_key(article_slug) {
            return Err(StoreError::NotFound("Article".to_string()));
        }
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|comment| comment.article_slug == article_slug)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    pub fn add_comment(
        &mut self,
        article_slug: &str,
        author_id: &str,
        author_name: &str,
        body: &str,
    ) -> StoreResult<Comment> {
        if !self.articles.contains_key(article_slug) {
            return Err(StoreError::NotFound("Article".to_string()));
        }
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            article_slug: article_slug.to_string(),
            author_id: author_id.to_string(),
            author_name: author_name.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        };
        self.comments.push(comment.clone());
        Ok(comment)
    }

    /// Remove a comment from an article, returning it.
    pub fn remove_comment(&mut self, article_slug: &str, comment_id: &str) -> StoreResult<Comment> {
        if !self.articles.contains_key(article_slug) {
            return Err(StoreError::NotFound("Article".to_string()));
        }
        let index = self
            .comments
            .iter()
            .position(|comment| comment.article_slug == article_slug && comment.id == comment_id)
            .ok_or_else(|| StoreError::NotFound("Comment".to_string()))?;
        Ok(self.comments.remove(index))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_store;
    use super::*;
    use crate::models::SupporterTier;

    #[test]
    fn board_members_filter_by_board() {
        let mut store = sample_store();
        store.insert_board(Board {
            id: "b2".into(),
            slug: "events".into(),
            name: "Events".into(),
            description: String::new(),
        });
        store.insert_board_member(BoardMember {
            board: "events".into(),
            name: "Barbara".into(),
            position: "Lead".into(),
            avatar_url: None,
        });

        let members = store.board_members("council").unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Ada");
    }

    #[test]
    fn unknown_board_is_not_found() {
        let store = sample_store();
        assert!(matches!(
            store.board_members("nope"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn supporters_sorted_by_tier() {
        let mut store = sample_store();
        let gold = store.add_supporter(CreateSupporterRequest {
            name: "Margaret".into(),
            tier: SupporterTier::Gold,
        });

        let supporters = store.list_supporters();
        assert_eq!(supporters[0], gold);
        assert_eq!(supporters[1].name, "Linus");
    }

    #[test]
    fn comments_require_existing_article() {
        let mut store = sample_store();
        assert!(store.add_comment("missing", "u1", "Ada", "hi").is_err());

        let comment = store.add_comment("welcome", "u1", "Ada", "hi").unwrap();
        assert_eq!(store.comments("welcome").unwrap(), vec![comment]);
    }

    #[test]
    fn remove_comment_scoped_to_article() {
        let mut store = sample_store();
        let comment = store.add_comment("welcome", "u1", "Ada", "hi").unwrap();

        assert!(matches!(
            store.remove_comment("welcome", "nope"),
            Err(StoreError::NotFound(what)) if what == "Comment"
        ));
        assert!(matches!(
            store.remove_comment("missing", &comment.id),
            Err(StoreError::NotFound(what)) if what == "Article"
        ));

        assert_eq!(store.remove_comment("welcome", &comment.id).unwrap(), comment);
        assert!(store.comments("welcome").unwrap().is_empty());
    }

    #[test]
    fn seed_json_populates_store() {
        let seed = br#"{
            "boards": [{ "id": "b1", "slug": "council", "name": "Council" }],
            "boardMembers": [{ "board": "council", "name": "Ada", "position": "Chair" }],
            "teamMembers": [
                { "id": "t2", "name": "Second", "title": "Editor", "order": 2 },
                { "id": "t1", "name": "First", "title": "Founder", "order": 1 }
            ]
        }"#;

        let store = InMemoryStore::from_seed_json(seed).unwrap();
        assert_eq!(store.list_boards().len(), 1);
        assert_eq!(store.board_members("council").unwrap()[0].name, "Ada");
        assert_eq!(store.team_members()[0].name, "First");
        assert!(store.list_articles().is_empty());
    }

    #[test]
    fn invalid_seed_is_rejected() {
        let result = InMemoryStore::from_seed_json(b"{\"boards\": 5}");
        assert!(matches!(result, Err(StoreError::Seed(_))));
    }
}
