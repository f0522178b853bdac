pub mod events;
pub mod feed;
pub mod friendship;
pub mod likes;
pub mod recommendations;

pub use events::{DomainEvent, EventEmitter};
pub use feed::{ActivityFeed, Clock, SystemClock};
pub use friendship::FriendshipGraph;
pub use likes::LikeStore;
pub use recommendations::{RecommendationEngine, RecommendationSettings};

use crate::{
    error::{AppError, AppResult},
    models::{FilmId, UserId},
    store::{FilmCatalog, UserDirectory},
};

/// Fails with `UserNotFound` unless the directory knows `id`
pub async fn ensure_user(users: &dyn UserDirectory, id: UserId) -> AppResult<()> {
    if users.user_exists(id).await? {
        Ok(())
    } else {
        Err(AppError::UserNotFound(id))
    }
}

/// Fails with `FilmNotFound` unless the catalog knows `id`
pub async fn ensure_film(films: &dyn FilmCatalog, id: FilmId) -> AppResult<()> {
    if films.film_exists(id).await? {
        Ok(())
    } else {
        Err(AppError::FilmNotFound(id))
    }
}
