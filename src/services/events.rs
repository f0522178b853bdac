use crate::{
    models::{EventType, FeedEvent, FeedEventDraft, FilmId, Operation, ReviewId, UserId},
    services::feed::ActivityFeed,
};

/// A successful mutation that belongs in the acting user's feed
///
/// Friend events carry the id of the friendship row the mutation wrote, review
/// events the review id. Either may be `None` when the entity could not be
/// resolved, in which case nothing is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainEvent {
    FriendAdded { user: UserId, edge: Option<i64> },
    FriendRemoved { user: UserId, edge: Option<i64> },
    FilmLiked { user: UserId, film: FilmId },
    FilmUnliked { user: UserId, film: FilmId },
    ReviewCreated { user: UserId, review: Option<ReviewId> },
    ReviewUpdated { user: UserId, review: Option<ReviewId> },
    ReviewDeleted { user: UserId, review: Option<ReviewId> },
}

impl DomainEvent {
    /// Maps the event onto its feed entry
    ///
    /// Like events reference the acting user, not the film.
    pub fn to_draft(&self) -> FeedEventDraft {
        let (user_id, event_type, operation, entity_id) = match *self {
            DomainEvent::FriendAdded { user, edge } => (user, EventType::Friend, Operation::Add, edge),
            DomainEvent::FriendRemoved { user, edge } => {
                (user, EventType::Friend, Operation::Remove, edge)
            }
            DomainEvent::FilmLiked { user, .. } => (user, EventType::Like, Operation::Add, Some(user.0)),
            DomainEvent::FilmUnliked { user, .. } => {
                (user, EventType::Like, Operation::Remove, Some(user.0))
            }
            DomainEvent::ReviewCreated { user, review } => {
                (user, EventType::Review, Operation::Add, review.map(|r| r.0))
            }
            DomainEvent::ReviewUpdated { user, review } => {
                (user, EventType::Review, Operation::Update, review.map(|r| r.0))
            }
            DomainEvent::ReviewDeleted { user, review } => {
                (user, EventType::Review, Operation::Remove, review.map(|r| r.0))
            }
        };

        FeedEventDraft {
            user_id,
            event_type,
            operation,
            entity_id,
        }
    }
}

/// Writes domain events to the activity feed after their mutation committed
///
/// Emission never fails the caller: storage errors are logged and dropped.
/// The review service, which lives outside this crate, reports its
/// create/update/delete through [`EventEmitter::emit`] as well.
#[derive(Clone)]
pub struct EventEmitter {
    feed: ActivityFeed,
}

impl EventEmitter {
    pub fn new(feed: ActivityFeed) -> Self {
        Self { feed }
    }

    pub async fn emit(&self, event: DomainEvent) -> Option<FeedEvent> {
        match self.feed.record(event.to_draft()).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(error = %e, event = ?event, "Failed to record feed event");
                None
            }
        }
    }
}
