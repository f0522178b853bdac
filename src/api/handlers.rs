use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{FeedEvent, FilmId, UserId},
    services::ensure_user,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonFilmsQuery {
    pub user_id: UserId,
    pub friend_id: UserId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmLikesResponse {
    pub film_id: FilmId,
    pub likes: usize,
    pub users: Vec<UserId>,
}

const DEFAULT_POPULAR_COUNT: usize = 10;

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// `user_id` sends (or accepts) a friend request to `friend_id`
pub async fn add_friend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path((user_id, friend_id)): Path<(UserId, UserId)>,
) -> AppResult<StatusCode> {
    let transition = state.friendships.request_friend(user_id, friend_id).await?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        friend_id = %friend_id,
        changed = transition.changed(),
        "Processed friend request"
    );

    Ok(StatusCode::OK)
}

/// `user_id` removes `friend_id` from their friends
pub async fn remove_friend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path((user_id, friend_id)): Path<(UserId, UserId)>,
) -> AppResult<StatusCode> {
    let transition = state.friendships.remove_friend(user_id, friend_id).await?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        friend_id = %friend_id,
        changed = transition.changed(),
        "Processed friend removal"
    );

    Ok(StatusCode::OK)
}

pub async fn get_friends(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<UserId>>> {
    Ok(Json(state.friendships.friends_of(user_id).await?))
}

pub async fn get_common_friends(
    State(state): State<AppState>,
    Path((user_id, other_id)): Path<(UserId, UserId)>,
) -> AppResult<Json<Vec<UserId>>> {
    Ok(Json(
        state.friendships.common_friends(user_id, other_id).await?,
    ))
}

/// Recommended films for a user
pub async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<Vec<FilmId>>> {
    ensure_user(state.users.as_ref(), user_id).await?;
    let films = state
        .recommendations
        .recommend(user_id, params.limit)
        .await?;
    Ok(Json(films))
}

/// Activity feed of a user, oldest event first
pub async fn get_feed(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<FeedEvent>>> {
    ensure_user(state.users.as_ref(), user_id).await?;
    Ok(Json(state.feed.events_of(user_id).await?))
}

pub async fn like_film(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path((film_id, user_id)): Path<(FilmId, UserId)>,
) -> AppResult<StatusCode> {
    let inserted = state.likes.like(film_id, user_id).await?;

    tracing::info!(
        request_id = %request_id,
        film_id = %film_id,
        user_id = %user_id,
        inserted,
        "Processed like"
    );

    Ok(StatusCode::OK)
}

pub async fn unlike_film(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path((film_id, user_id)): Path<(FilmId, UserId)>,
) -> AppResult<StatusCode> {
    let removed = state.likes.unlike(film_id, user_id).await?;

    tracing::info!(
        request_id = %request_id,
        film_id = %film_id,
        user_id = %user_id,
        removed,
        "Processed unlike"
    );

    Ok(StatusCode::OK)
}

pub async fn get_film_likes(
    State(state): State<AppState>,
    Path(film_id): Path<FilmId>,
) -> AppResult<Json<FilmLikesResponse>> {
    let users: Vec<UserId> = state.likes.likers_of(film_id).await?.into_iter().collect();

    Ok(Json(FilmLikesResponse {
        film_id,
        likes: users.len(),
        users,
    }))
}

/// Most liked films, `count` defaults to 10
pub async fn get_popular_films(
    State(state): State<AppState>,
    Query(params): Query<PopularQuery>,
) -> AppResult<Json<Vec<FilmId>>> {
    let count = params.count.unwrap_or(DEFAULT_POPULAR_COUNT);
    Ok(Json(state.likes.top_by_likes(count).await?))
}

/// Films liked by both users
pub async fn get_common_films(
    State(state): State<AppState>,
    Query(params): Query<CommonFilmsQuery>,
) -> AppResult<Json<Vec<FilmId>>> {
    Ok(Json(
        state
            .likes
            .common_films(params.user_id, params.friend_id)
            .await?,
    ))
}
