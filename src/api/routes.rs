use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Friendship graph
        .route(
            "/users/:id/friends/:friend_id",
            put(handlers::add_friend).delete(handlers::remove_friend),
        )
        .route("/users/:id/friends", get(handlers::get_friends))
        .route(
            "/users/:id/friends/common/:other_id",
            get(handlers::get_common_friends),
        )
        // Recommendations and activity feed
        .route(
            "/users/:id/recommendations",
            get(handlers::get_recommendations),
        )
        .route("/users/:id/feed", get(handlers::get_feed))
        // Likes
        .route("/films/popular", get(handlers::get_popular_films))
        .route("/films/common", get(handlers::get_common_films))
        .route("/films/:id/likes", get(handlers::get_film_likes))
        .route(
            "/films/:id/like/:user_id",
            put(handlers::like_film).delete(handlers::unlike_film),
        )
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
