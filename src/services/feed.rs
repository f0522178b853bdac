use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::AppResult,
    models::{FeedEvent, FeedEventDraft, UserId},
    store::{FeedRepository, NewFeedEvent},
};

/// Source of event timestamps, in whole seconds since the Unix epoch
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Append-only log of what users did
///
/// Ordering is by `event_id`, never by timestamp: several events recorded
/// within the same second share a timestamp.
#[derive(Clone)]
pub struct ActivityFeed {
    repo: Arc<dyn FeedRepository>,
    clock: Arc<dyn Clock>,
}

impl ActivityFeed {
    pub fn new(repo: Arc<dyn FeedRepository>) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: Arc<dyn FeedRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Stores `draft` with a fresh id and the current time
    ///
    /// A draft whose entity could not be resolved is dropped with a warning
    /// and `Ok(None)` is returned.
    pub async fn record(&self, draft: FeedEventDraft) -> AppResult<Option<FeedEvent>> {
        let Some(entity_id) = draft.entity_id else {
            tracing::warn!(
                user_id = %draft.user_id,
                event_type = %draft.event_type,
                operation = %draft.operation,
                "Feed event has no resolvable entity, not recording"
            );
            return Ok(None);
        };

        let stored = self
            .repo
            .append(NewFeedEvent {
                timestamp: self.clock.now_secs(),
                user_id: draft.user_id,
                event_type: draft.event_type,
                operation: draft.operation,
                entity_id,
            })
            .await?;

        tracing::debug!(
            event_id = stored.event_id,
            user_id = %stored.user_id,
            event_type = %stored.event_type,
            operation = %stored.operation,
            "Feed event recorded"
        );

        Ok(Some(stored))
    }

    /// Every event of `user`, oldest first
    pub async fn events_of(&self, user: UserId) -> AppResult<Vec<FeedEvent>> {
        self.repo.events_of(user).await
    }
}
