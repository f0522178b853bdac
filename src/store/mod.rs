//! Storage abstraction for the social graph
//!
//! Services talk to storage only through the traits in this module. Two
//! implementations exist: [`MemoryStore`] for tests and local runs, and
//! [`PgStore`] backed by PostgreSQL. Every mutating method must be atomic with
//! respect to itself: a read-check-write sequence runs under one lock or one
//! transaction.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{
        EdgeChange, EventType, FeedEvent, FilmId, FriendEdge, Operation, PairState, Transition,
        UserId,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Pure planner deciding which writes a friendship operation performs on a pair
///
/// Receives `(a, b, state)` where `state` holds edge(a, b) and edge(b, a).
pub type TransitionPlan = fn(UserId, UserId, &PairState) -> Vec<EdgeChange>;

/// User-existence lookups, served by the user-management subsystem
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, id: UserId) -> AppResult<bool>;
}

/// Film lookups, served by the film catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FilmCatalog: Send + Sync {
    async fn film_exists(&self, id: FilmId) -> AppResult<bool>;

    /// All films known to the catalog, in ascending id order
    async fn film_ids(&self) -> AppResult<Vec<FilmId>>;
}

/// Directional friendship rows
#[async_trait::async_trait]
pub trait FriendshipRepository: Send + Sync {
    /// Reads edge(a, b) and edge(b, a), runs `plan` over them and applies the
    /// returned changes, all within one atomic scope.
    async fn transition(&self, a: UserId, b: UserId, plan: TransitionPlan)
        -> AppResult<Transition>;

    async fn edge(&self, from: UserId, to: UserId) -> AppResult<Option<FriendEdge>>;

    /// Every edge where `user` is either endpoint
    async fn edges_of(&self, user: UserId) -> AppResult<Vec<FriendEdge>>;
}

/// The user-film like relation
#[async_trait::async_trait]
pub trait LikeRepository: Send + Sync {
    /// Returns `true` if the like did not exist before
    async fn insert_like(&self, user: UserId, film: FilmId) -> AppResult<bool>;

    /// Returns `true` if a like was removed
    async fn delete_like(&self, user: UserId, film: FilmId) -> AppResult<bool>;

    async fn likes_of(&self, user: UserId) -> AppResult<BTreeSet<FilmId>>;

    async fn likers_of(&self, film: FilmId) -> AppResult<BTreeSet<UserId>>;

    /// Like count per film; films without likes are absent
    async fn like_counts(&self) -> AppResult<HashMap<FilmId, usize>>;

    /// Snapshot of every user's like set; users without likes are absent
    async fn all_likes(&self) -> AppResult<HashMap<UserId, BTreeSet<FilmId>>>;
}

/// Feed event with every field but the store-assigned id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedEvent {
    pub timestamp: i64,
    pub user_id: UserId,
    pub event_type: EventType,
    pub operation: Operation,
    pub entity_id: i64,
}

/// Append-only activity log
#[async_trait::async_trait]
pub trait FeedRepository: Send + Sync {
    /// Stores the event under a fresh, monotonically increasing id
    async fn append(&self, event: NewFeedEvent) -> AppResult<FeedEvent>;

    /// Events of `user` in ascending id order
    async fn events_of(&self, user: UserId) -> AppResult<Vec<FeedEvent>>;
}

/// Bundle of storage handles shared by the services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserDirectory>,
    pub films: Arc<dyn FilmCatalog>,
    pub friendships: Arc<dyn FriendshipRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub feed: Arc<dyn FeedRepository>,
}

impl Repositories {
    /// Uses one store for every concern
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserDirectory
            + FilmCatalog
            + FriendshipRepository
            + LikeRepository
            + FeedRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            films: store.clone(),
            friendships: store.clone(),
            likes: store.clone(),
            feed: store,
        }
    }
}
