use std::sync::Arc;

use crate::{
    db::Cache,
    services::{
        ActivityFeed, EventEmitter, FriendshipGraph, LikeStore, RecommendationEngine,
        RecommendationSettings,
    },
    store::{MemoryStore, Repositories, UserDirectory},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserDirectory>,
    pub friendships: FriendshipGraph,
    pub likes: LikeStore,
    pub recommendations: RecommendationEngine,
    pub feed: ActivityFeed,
    pub events: EventEmitter,
}

impl AppState {
    /// Wires the services over the given storage
    ///
    /// With a cache, recommendation lists are served through Redis for
    /// `settings.cache_ttl` seconds.
    pub fn new(
        repositories: Repositories,
        cache: Option<Cache>,
        settings: RecommendationSettings,
    ) -> Self {
        let feed = ActivityFeed::new(repositories.feed.clone());
        let events = EventEmitter::new(feed.clone());

        let friendships = FriendshipGraph::new(
            repositories.users.clone(),
            repositories.friendships.clone(),
            events.clone(),
        );

        let likes = LikeStore::new(
            repositories.users.clone(),
            repositories.films.clone(),
            repositories.likes.clone(),
            events.clone(),
        );
        let mut recommendations =
            RecommendationEngine::new(repositories.likes.clone(), settings);

        if let Some(cache) = cache {
            recommendations = recommendations.with_cache(cache);
        }

        Self {
            users: repositories.users,
            friendships,
            likes,
            recommendations,
            feed,
            events,
        }
    }

    /// State over an in-process store, without caching
    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self::new(
            Repositories::from_store(store),
            None,
            RecommendationSettings::default(),
        )
    }
}
