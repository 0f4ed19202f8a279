// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Drives the envelope client against a live server on an ephemeral port.

use std::net::SocketAddr;

use agora_server::{
    api::router,
    auth::{AuthConfig, Role},
    client::{ClientError, EnvelopeClient},
    db::Database,
    envelope::EnvelopeCodec,
    models::{BoardMembersResponse, CommentResponse, CreateCommentRequest, ProfileResponse},
    state::AppState,
    store::InMemoryStore,
};

const RESPONSE_SECRET: &[u8] = b"integration-response-secret-0123456789abcdef";
const JWT_SECRET: &[u8] = b"integration-session-secret";

const SEED: &str = r#"{
    "boards": [
        { "id": "b1", "slug": "council", "name": "Community Council", "description": "Elected stewards" }
    ],
    "boardMembers": [
        { "board": "council", "name": "Ada", "position": "Chair" },
        { "board": "council", "name": "Grace", "position": "Treasurer" }
    ],
    "articles": [
        {
            "id": "a1",
            "slug": "welcome",
            "title": "Welcome",
            "author": "Grace",
            "body": "Welcome to the community.",
            "publishedAt": "2025-03-01T12:00:00Z"
        }
    ]
}"#;

fn codec(secret: &[u8]) -> EnvelopeCodec {
    EnvelopeCodec::from_secret(secret).unwrap()
}

async fn spawn_server() -> (SocketAddr, AppState) {
    let store = InMemoryStore::from_seed_json(SEED.as_bytes()).unwrap();
    let state = AppState::new(
        Database::with_store(store),
        codec(RESPONSE_SECRET),
        AuthConfig::new(JWT_SECRET, "token"),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

fn client(addr: SocketAddr, secret: &[u8]) -> EnvelopeClient {
    EnvelopeClient::new(&format!("http://{addr}/v1"), codec(secret)).unwrap()
}

#[tokio::test]
async fn board_members_round_trip() {
    let (addr, _) = spawn_server().await;

    let response: BoardMembersResponse = client(addr, RESPONSE_SECRET)
        .get("/boards/council/members")
        .await
        .unwrap();

    assert!(response.success);
    let names: Vec<_> = response.board_members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["Ada", "Grace"]);
}

#[tokio::test]
async fn wrong_secret_is_a_failed_request() {
    let (addr, _) = spawn_server().await;

    let err = client(addr, b"some-other-secret-that-is-long-enough!!")
        .get::<BoardMembersResponse>("/boards/council/members")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::RequestFailed));
    assert_eq!(err.to_string(), "Operation failed");
}

#[tokio::test]
async fn deprecated_route_surfaces_notice() {
    let (addr, _) = spawn_server().await;

    let err = client(addr, RESPONSE_SECRET)
        .get::<serde_json::Value>("/board/members")
        .await
        .unwrap_err();

    match err {
        ClientError::Deprecated(message) => assert!(message.contains("/v1/boards/{slug}/members")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn missing_board_is_rejected() {
    let (addr, _) = spawn_server().await;

    let err = client(addr, RESPONSE_SECRET)
        .get::<BoardMembersResponse>("/boards/unknown/members")
        .await
        .unwrap_err();

    match err {
        ClientError::Rejected { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Board not found");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn session_client_posts_comment() {
    let (addr, state) = spawn_server().await;
    let token = state
        .auth
        .issue("user_5", "Margaret", Role::Member, chrono::Duration::minutes(5))
        .unwrap();
    let client = client(addr, RESPONSE_SECRET).with_session(token);

    let profile: ProfileResponse = client.get("/me").await.unwrap();
    assert_eq!(profile.user.user_id, "user_5");

    let created: CommentResponse = client
        .post(
            "/articles/welcome/comments",
            &CreateCommentRequest {
                body: "Hello from the integration test".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.comment.author_name, "Margaret");
    assert_eq!(created.comment.article_slug, "welcome");
}
