use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{FilmId, UserId},
    services::likes::rank_by_likes,
    store::LikeRepository,
};

/// Tunables for the recommendation endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationSettings {
    /// Result size when the caller does not pass a limit
    pub default_limit: usize,
    /// Seconds a cached recommendation list stays valid
    pub cache_ttl: u64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_limit: 10,
            cache_ttl: 60,
        }
    }
}

/// Collaborative filtering over like sets
///
/// A user counts as similar to the target when they share strictly more than
/// half (integer division) of the target's likes. Candidates are the similar
/// users' likes the target has not liked yet, ranked by total like count with
/// ties going to the lower film id.
pub fn recommend_from(
    user: UserId,
    likes: &HashMap<UserId, BTreeSet<FilmId>>,
    limit: usize,
) -> Vec<FilmId> {
    let Some(target) = likes.get(&user).filter(|films| !films.is_empty()) else {
        return Vec::new();
    };
    let threshold = target.len() / 2;

    let mut candidates = BTreeSet::new();
    for (other_user, other) in likes {
        if *other_user == user {
            continue;
        }
        let overlap = target.intersection(other).count();
        if overlap > threshold {
            candidates.extend(other.difference(target).copied());
        }
    }

    if candidates.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<FilmId, usize> = HashMap::new();
    for film in likes.values().flatten() {
        *counts.entry(*film).or_insert(0) += 1;
    }

    let mut ranked = rank_by_likes(candidates, &counts);
    ranked.truncate(limit);
    ranked
}

#[derive(Clone)]
pub struct RecommendationEngine {
    likes: Arc<dyn LikeRepository>,
    cache: Option<Cache>,
    settings: RecommendationSettings,
}

impl RecommendationEngine {
    pub fn new(likes: Arc<dyn LikeRepository>, settings: RecommendationSettings) -> Self {
        Self {
            likes,
            cache: None,
            settings,
        }
    }

    /// Serves results through Redis for `settings.cache_ttl` seconds
    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Films to suggest to `user`, at most `limit` (default from settings)
    ///
    /// Works on a snapshot of the like relation; a user without likes gets an
    /// empty list.
    #[tracing::instrument(skip(self))]
    pub async fn recommend(&self, user: UserId, limit: Option<usize>) -> AppResult<Vec<FilmId>> {
        let limit = limit.unwrap_or(self.settings.default_limit);
        if limit == 0 {
            return Ok(Vec::new());
        }

        match &self.cache {
            Some(cache) => cached!(
                cache,
                CacheKey::Recommendations { user, limit },
                self.settings.cache_ttl,
                async { self.compute(user, limit).await }
            ),
            None => self.compute(user, limit).await,
        }
    }

    async fn compute(&self, user: UserId, limit: usize) -> AppResult<Vec<FilmId>> {
        let snapshot = self.likes.all_likes().await?;
        let films = recommend_from(user, &snapshot, limit);

        tracing::info!(
            user_id = %user,
            users_compared = snapshot.len().saturating_sub(1),
            recommended = films.len(),
            "Recommendations computed"
        );

        Ok(films)
    }
}
