use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use filmgraph::api::{create_router, AppState};
use filmgraph::store::MemoryStore;

fn create_test_server() -> TestServer {
    let store = Arc::new(MemoryStore::with_catalog(1..=4, 1..=6));
    let state = AppState::in_memory(store);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

async fn befriend(server: &TestServer, user: i64, friend: i64) {
    server
        .put(&format!("/users/{user}/friends/{friend}"))
        .await
        .assert_status_ok();
}

async fn like(server: &TestServer, film: i64, user: i64) {
    server
        .put(&format!("/films/{film}/like/{user}"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_request_id_header_is_set() {
    let server = create_test_server();

    let response = server.get("/health").await;
    let request_id = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());

    let incoming = "7f1b8f0e-4c1a-4d6b-9a43-5b1f0d3c2e11";
    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(incoming),
        )
        .await;
    assert_eq!(response.header("x-request-id"), incoming);
}

#[tokio::test]
async fn test_friend_request_is_one_sided_until_accepted() {
    let server = create_test_server();

    befriend(&server, 1, 2).await;

    // The requester already sees the pending friend, the target does not.
    let friends: Vec<i64> = server.get("/users/1/friends").await.json();
    assert_eq!(friends, vec![2]);
    let friends: Vec<i64> = server.get("/users/2/friends").await.json();
    assert!(friends.is_empty());

    befriend(&server, 2, 1).await;

    let friends: Vec<i64> = server.get("/users/2/friends").await.json();
    assert_eq!(friends, vec![1]);
}

#[tokio::test]
async fn test_remove_friend_keeps_reverse_request() {
    let server = create_test_server();
    befriend(&server, 1, 2).await;
    befriend(&server, 2, 1).await;

    server.delete("/users/1/friends/2").await.assert_status_ok();

    let friends: Vec<i64> = server.get("/users/1/friends").await.json();
    assert!(friends.is_empty());
    let friends: Vec<i64> = server.get("/users/2/friends").await.json();
    assert_eq!(friends, vec![1]);
}

#[tokio::test]
async fn test_common_friends() {
    let server = create_test_server();
    befriend(&server, 1, 3).await;
    befriend(&server, 1, 4).await;
    befriend(&server, 2, 3).await;

    let response = server.get("/users/1/friends/common/2").await;
    response.assert_status_ok();
    let common: Vec<i64> = response.json();
    assert_eq!(common, vec![3]);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let server = create_test_server();

    let response = server.put("/users/1/friends/99").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body, json!({ "error": "User with id = 99 not found" }));

    server
        .get("/users/99/friends")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/users/99/feed")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/users/99/recommendations")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_self_friendship_is_rejected() {
    let server = create_test_server();

    let response = server.put("/users/1/friends/1").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_friend_feed_events() {
    let server = create_test_server();
    befriend(&server, 1, 2).await;
    // Repeating the request changes nothing and records nothing.
    befriend(&server, 1, 2).await;
    server.delete("/users/1/friends/2").await.assert_status_ok();

    let events: Vec<Value> = server.get("/users/1/feed").await.json();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["eventType"], "FRIEND");
    assert_eq!(events[0]["operation"], "ADD");
    assert_eq!(events[1]["eventType"], "FRIEND");
    assert_eq!(events[1]["operation"], "REMOVE");
    assert_eq!(events[0]["userId"], 1);
    assert!(events[0]["eventId"].as_i64() < events[1]["eventId"].as_i64());
}

#[tokio::test]
async fn test_like_and_unlike_film() {
    let server = create_test_server();
    like(&server, 3, 1).await;
    like(&server, 3, 2).await;

    let likes: Value = server.get("/films/3/likes").await.json();
    assert_eq!(likes, json!({ "filmId": 3, "likes": 2, "users": [1, 2] }));

    server.delete("/films/3/like/2").await.assert_status_ok();

    let likes: Value = server.get("/films/3/likes").await.json();
    assert_eq!(likes["likes"], 1);

    let events: Vec<Value> = server.get("/users/2/feed").await.json();
    let operations: Vec<&str> = events
        .iter()
        .map(|e| e["operation"].as_str().unwrap())
        .collect();
    assert_eq!(operations, vec!["ADD", "REMOVE"]);
    assert!(events.iter().all(|e| e["eventType"] == "LIKE"));
}

#[tokio::test]
async fn test_like_unknown_film_is_not_found() {
    let server = create_test_server();

    let response = server.put("/films/42/like/1").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Film with id = 42 not found");
}

#[tokio::test]
async fn test_popular_films() {
    let server = create_test_server();
    like(&server, 5, 1).await;
    like(&server, 5, 2).await;
    like(&server, 2, 3).await;

    let popular: Vec<i64> = server
        .get("/films/popular")
        .add_query_param("count", 3)
        .await
        .json();
    assert_eq!(popular, vec![5, 2, 1]);

    let popular: Vec<i64> = server.get("/films/popular").await.json();
    assert_eq!(popular.len(), 6);

    server
        .get("/films/popular")
        .add_query_param("count", 0)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_common_films() {
    let server = create_test_server();
    for film in [1, 2, 4] {
        like(&server, film, 1).await;
    }
    for film in [2, 4, 6] {
        like(&server, film, 2).await;
    }
    like(&server, 4, 3).await;

    let common: Vec<i64> = server
        .get("/films/common")
        .add_query_param("userId", 1)
        .add_query_param("friendId", 2)
        .await
        .json();

    assert_eq!(common, vec![4, 2]);
}

#[tokio::test]
async fn test_recommendations() {
    let server = create_test_server();
    for film in [1, 2] {
        like(&server, film, 1).await;
    }
    for film in [1, 2, 3, 5] {
        like(&server, film, 2).await;
    }
    for film in [5, 6] {
        like(&server, film, 3).await;
    }

    let response = server.get("/users/1/recommendations").await;
    response.assert_status_ok();
    let films: Vec<i64> = response.json();
    // 5 has two likes, 3 one; 6 belongs to a user with no overlap.
    assert_eq!(films, vec![5, 3]);

    let films: Vec<i64> = server
        .get("/users/1/recommendations")
        .add_query_param("limit", 1)
        .await
        .json();
    assert_eq!(films, vec![5]);

    let films: Vec<i64> = server.get("/users/4/recommendations").await.json();
    assert!(films.is_empty());
}
