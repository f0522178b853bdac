use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{FilmId, UserId},
    services::{ensure_film, ensure_user, events::DomainEvent, EventEmitter},
    store::{FilmCatalog, LikeRepository, UserDirectory},
};

/// Orders films by like count, most liked first; ties go to the lower film id
pub fn rank_by_likes(
    films: impl IntoIterator<Item = FilmId>,
    counts: &HashMap<FilmId, usize>,
) -> Vec<FilmId> {
    let mut ranked: Vec<FilmId> = films.into_iter().collect();
    ranked.sort_by_key(|film| (Reverse(counts.get(film).copied().unwrap_or(0)), *film));
    ranked
}

/// The user-film like relation and the rankings derived from it
#[derive(Clone)]
pub struct LikeStore {
    users: Arc<dyn UserDirectory>,
    films: Arc<dyn FilmCatalog>,
    likes: Arc<dyn LikeRepository>,
    events: EventEmitter,
}

impl LikeStore {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        films: Arc<dyn FilmCatalog>,
        likes: Arc<dyn LikeRepository>,
        events: EventEmitter,
    ) -> Self {
        Self {
            users,
            films,
            likes,
            events,
        }
    }

    async fn ensure_film_and_user(&self, film: FilmId, user: UserId) -> AppResult<()> {
        ensure_film(self.films.as_ref(), film).await?;
        ensure_user(self.users.as_ref(), user).await
    }

    /// `user` likes `film`
    ///
    /// Records a LIKE/ADD event for `user` when the like is new; liking twice
    /// changes nothing and records nothing.
    pub async fn like(&self, film: FilmId, user: UserId) -> AppResult<bool> {
        self.ensure_film_and_user(film, user).await?;

        let inserted = self.likes.insert_like(user, film).await?;
        if inserted {
            tracing::info!(user_id = %user, film_id = %film, "Film liked");
            self.events.emit(DomainEvent::FilmLiked { user, film }).await;
        }
        Ok(inserted)
    }

    /// `user` withdraws their like of `film`
    ///
    /// Records a LIKE/REMOVE event for `user` when a like was removed.
    pub async fn unlike(&self, film: FilmId, user: UserId) -> AppResult<bool> {
        self.ensure_film_and_user(film, user).await?;

        let removed = self.likes.delete_like(user, film).await?;
        if removed {
            tracing::info!(user_id = %user, film_id = %film, "Film unliked");
            self.events.emit(DomainEvent::FilmUnliked { user, film }).await;
        }
        Ok(removed)
    }

    pub async fn likes_of(&self, user: UserId) -> AppResult<BTreeSet<FilmId>> {
        ensure_user(self.users.as_ref(), user).await?;
        self.likes.likes_of(user).await
    }

    pub async fn likers_of(&self, film: FilmId) -> AppResult<BTreeSet<UserId>> {
        ensure_film(self.films.as_ref(), film).await?;
        self.likes.likers_of(film).await
    }

    pub async fn count_likes(&self, film: FilmId) -> AppResult<usize> {
        Ok(self.likers_of(film).await?.len())
    }

    /// The `count` most liked films of the catalog, films without likes included
    ///
    /// Always read from committed likes, never from the cache.
    pub async fn top_by_likes(&self, count: usize) -> AppResult<Vec<FilmId>> {
        if count == 0 {
            return Err(AppError::InvalidInput(
                "count must be greater than zero".to_string(),
            ));
        }

        let films = self.films.film_ids().await?;
        let counts = self.likes.like_counts().await?;

        let mut ranked = rank_by_likes(films, &counts);
        ranked.truncate(count);
        Ok(ranked)
    }

    /// Films both users liked, most liked first
    pub async fn common_films(&self, user: UserId, friend: UserId) -> AppResult<Vec<FilmId>> {
        ensure_user(self.users.as_ref(), user).await?;
        ensure_user(self.users.as_ref(), friend).await?;

        let mine = self.likes.likes_of(user).await?;
        let theirs = self.likes.likes_of(friend).await?;
        let shared: Vec<FilmId> = mine.intersection(&theirs).copied().collect();
        if shared.is_empty() {
            return Ok(shared);
        }

        let counts = self.likes.like_counts().await?;
        Ok(rank_by_likes(shared, &counts))
    }
}
