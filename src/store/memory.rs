use std::collections::{BTreeSet, HashMap};

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{EdgeChange, FeedEvent, FilmId, FriendEdge, PairState, Transition, UserId},
    store::{
        FeedRepository, FilmCatalog, FriendshipRepository, LikeRepository, NewFeedEvent,
        TransitionPlan, UserDirectory,
    },
};

/// In-process store guarded by a single lock
///
/// Ids for edges and feed events come from counters owned by the instance, so
/// two stores never share an id sequence.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    users: BTreeSet<UserId>,
    films: BTreeSet<FilmId>,
    edges: HashMap<(UserId, UserId), FriendEdge>,
    likes: HashMap<UserId, BTreeSet<FilmId>>,
    feed: Vec<FeedEvent>,
    last_edge_id: i64,
    last_event_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose directory and catalog already know the given ids
    pub fn with_catalog(
        users: impl IntoIterator<Item = i64>,
        films: impl IntoIterator<Item = i64>,
    ) -> Self {
        let state = MemoryState {
            users: users.into_iter().map(UserId).collect(),
            films: films.into_iter().map(FilmId).collect(),
            ..MemoryState::default()
        };

        Self {
            inner: RwLock::new(state),
        }
    }

    pub async fn register_film(&self, id: FilmId) {
        self.inner.write().await.films.insert(id);
    }
}

impl MemoryState {
    fn pair(&self, a: UserId, b: UserId) -> PairState {
        PairState {
            forward: self.edges.get(&(a, b)).copied(),
            reverse: self.edges.get(&(b, a)).copied(),
        }
    }

    /// Applies one change and returns the id of the row it wrote
    fn apply(&mut self, change: EdgeChange) -> AppResult<i64> {
        let key = change.endpoints();
        match change {
            EdgeChange::Insert { from, to } => {
                if self.edges.contains_key(&key) {
                    return Err(AppError::Internal(format!(
                        "friendship {} -> {} already exists",
                        from, to
                    )));
                }
                self.last_edge_id += 1;
                let edge = FriendEdge {
                    id: self.last_edge_id,
                    from,
                    to,
                    confirmed: false,
                };
                self.edges.insert(key, edge);
                Ok(edge.id)
            }
            EdgeChange::Confirm { .. } | EdgeChange::Demote { .. } => {
                let confirmed = matches!(change, EdgeChange::Confirm { .. });
                let edge = self.edges.get_mut(&key).ok_or_else(|| missing_edge(key))?;
                edge.confirmed = confirmed;
                Ok(edge.id)
            }
            EdgeChange::Delete { .. } => self
                .edges
                .remove(&key)
                .map(|edge| edge.id)
                .ok_or_else(|| missing_edge(key)),
        }
    }
}

fn missing_edge((from, to): (UserId, UserId)) -> AppError {
    AppError::Internal(format!("friendship {} -> {} does not exist", from, to))
}

#[async_trait::async_trait]
impl UserDirectory for MemoryStore {
    async fn user_exists(&self, id: UserId) -> AppResult<bool> {
        Ok(self.inner.read().await.users.contains(&id))
    }
}

#[async_trait::async_trait]
impl FilmCatalog for MemoryStore {
    async fn film_exists(&self, id: FilmId) -> AppResult<bool> {
        Ok(self.inner.read().await.films.contains(&id))
    }

    async fn film_ids(&self) -> AppResult<Vec<FilmId>> {
        Ok(self.inner.read().await.films.iter().copied().collect())
    }
}

#[async_trait::async_trait]
impl FriendshipRepository for MemoryStore {
    async fn transition(
        &self,
        a: UserId,
        b: UserId,
        plan: TransitionPlan,
    ) -> AppResult<Transition> {
        let mut state = self.inner.write().await;
        let changes = plan(a, b, &state.pair(a, b));

        // Changes are all-or-nothing: a failed step restores the pair.
        let (saved_edges, saved_edge_id) = (state.edges.clone(), state.last_edge_id);
        let mut affected_edge = None;
        for change in &changes {
            match state.apply(*change) {
                Ok(id) => {
                    affected_edge.get_or_insert(id);
                }
                Err(e) => {
                    state.edges = saved_edges;
                    state.last_edge_id = saved_edge_id;
                    return Err(e);
                }
            }
        }

        Ok(Transition {
            changes,
            affected_edge,
        })
    }

    async fn edge(&self, from: UserId, to: UserId) -> AppResult<Option<FriendEdge>> {
        Ok(self.inner.read().await.edges.get(&(from, to)).copied())
    }

    async fn edges_of(&self, user: UserId) -> AppResult<Vec<FriendEdge>> {
        let state = self.inner.read().await;
        let mut edges: Vec<FriendEdge> = state
            .edges
            .values()
            .filter(|edge| edge.from == user || edge.to == user)
            .copied()
            .collect();
        edges.sort_by_key(|edge| edge.id);
        Ok(edges)
    }
}

#[async_trait::async_trait]
impl LikeRepository for MemoryStore {
    async fn insert_like(&self, user: UserId, film: FilmId) -> AppResult<bool> {
        let mut state = self.inner.write().await;
        Ok(state.likes.entry(user).or_default().insert(film))
    }

    async fn delete_like(&self, user: UserId, film: FilmId) -> AppResult<bool> {
        let mut state = self.inner.write().await;
        let Some(films) = state.likes.get_mut(&user) else {
            return Ok(false);
        };
        let removed = films.remove(&film);
        if films.is_empty() {
            state.likes.remove(&user);
        }
        Ok(removed)
    }

    async fn likes_of(&self, user: UserId) -> AppResult<BTreeSet<FilmId>> {
        let state = self.inner.read().await;
        Ok(state.likes.get(&user).cloned().unwrap_or_default())
    }

    async fn likers_of(&self, film: FilmId) -> AppResult<BTreeSet<UserId>> {
        let state = self.inner.read().await;
        Ok(state
            .likes
            .iter()
            .filter(|(_, films)| films.contains(&film))
            .map(|(user, _)| *user)
            .collect())
    }

    async fn like_counts(&self) -> AppResult<HashMap<FilmId, usize>> {
        let state = self.inner.read().await;
        let mut counts = HashMap::new();
        for film in state.likes.values().flatten() {
            *counts.entry(*film).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn all_likes(&self) -> AppResult<HashMap<UserId, BTreeSet<FilmId>>> {
        Ok(self.inner.read().await.likes.clone())
    }
}

#[async_trait::async_trait]
impl FeedRepository for MemoryStore {
    async fn append(&self, event: NewFeedEvent) -> AppResult<FeedEvent> {
        let mut state = self.inner.write().await;
        state.last_event_id += 1;
        let stored = FeedEvent {
            event_id: state.last_event_id,
            timestamp: event.timestamp,
            user_id: event.user_id,
            event_type: event.event_type,
            operation: event.operation,
            entity_id: event.entity_id,
        };
        state.feed.push(stored.clone());
        Ok(stored)
    }

    async fn events_of(&self, user: UserId) -> AppResult<Vec<FeedEvent>> {
        let state = self.inner.read().await;
        Ok(state
            .feed
            .iter()
            .filter(|event| event.user_id == user)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, Operation};

    fn insert_forward(a: UserId, b: UserId, _state: &PairState) -> Vec<EdgeChange> {
        vec![EdgeChange::Insert { from: a, to: b }]
    }

    fn confirm_reverse(a: UserId, b: UserId, state: &PairState) -> Vec<EdgeChange> {
        match state.reverse {
            Some(_) => vec![EdgeChange::Confirm { from: b, to: a }],
            None => vec![],
        }
    }

    #[tokio::test]
    async fn test_catalog_lookups() {
        let store = MemoryStore::with_catalog([1, 2], [10]);

        assert!(store.user_exists(UserId(1)).await.unwrap());
        assert!(!store.user_exists(UserId(3)).await.unwrap());
        assert!(store.film_exists(FilmId(10)).await.unwrap());

        store.register_film(FilmId(5)).await;
        assert_eq!(
            store.film_ids().await.unwrap(),
            vec![FilmId(5), FilmId(10)]
        );
    }

    #[tokio::test]
    async fn test_transition_assigns_edge_ids() {
        let store = MemoryStore::new();

        let first = store
            .transition(UserId(1), UserId(2), insert_forward)
            .await
            .unwrap();
        let second = store
            .transition(UserId(3), UserId(1), insert_forward)
            .await
            .unwrap();

        assert_eq!(first.affected_edge, Some(1));
        assert_eq!(second.affected_edge, Some(2));
        assert_eq!(store.edges_of(UserId(1)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_transition_reports_updated_edge() {
        let store = MemoryStore::new();
        store
            .transition(UserId(1), UserId(2), insert_forward)
            .await
            .unwrap();

        let confirmed = store
            .transition(UserId(2), UserId(1), confirm_reverse)
            .await
            .unwrap();

        assert_eq!(confirmed.affected_edge, Some(1));
        let edge = store.edge(UserId(1), UserId(2)).await.unwrap().unwrap();
        assert!(edge.confirmed);
    }

    #[tokio::test]
    async fn test_transition_with_empty_plan_writes_nothing() {
        let store = MemoryStore::new();

        let transition = store
            .transition(UserId(1), UserId(2), confirm_reverse)
            .await
            .unwrap();

        assert!(!transition.changed());
        assert_eq!(transition.affected_edge, None);
        assert!(store.edges_of(UserId(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let store = MemoryStore::new();
        store
            .transition(UserId(1), UserId(2), insert_forward)
            .await
            .unwrap();

        let result = store
            .transition(UserId(1), UserId(2), insert_forward)
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_failed_transition_leaves_pair_untouched() {
        fn confirm_then_insert_twice(a: UserId, b: UserId, _state: &PairState) -> Vec<EdgeChange> {
            vec![
                EdgeChange::Confirm { from: a, to: b },
                EdgeChange::Insert { from: b, to: a },
                EdgeChange::Insert { from: b, to: a },
            ]
        }

        let store = MemoryStore::new();
        store
            .transition(UserId(1), UserId(2), insert_forward)
            .await
            .unwrap();

        let result = store
            .transition(UserId(1), UserId(2), confirm_then_insert_twice)
            .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        let edges = store.edges_of(UserId(1)).await.unwrap();
        assert_eq!(edges.len(), 1);
        assert!(!edges[0].confirmed);

        let next = store
            .transition(UserId(3), UserId(1), insert_forward)
            .await
            .unwrap();
        assert_eq!(next.affected_edge, Some(2));
    }

    #[tokio::test]
    async fn test_like_insert_and_delete_report_changes() {
        let store = MemoryStore::new();

        assert!(store.insert_like(UserId(1), FilmId(10)).await.unwrap());
        assert!(!store.insert_like(UserId(1), FilmId(10)).await.unwrap());
        assert!(store.insert_like(UserId(2), FilmId(10)).await.unwrap());

        assert_eq!(store.like_counts().await.unwrap()[&FilmId(10)], 2);
        assert_eq!(
            store.likers_of(FilmId(10)).await.unwrap(),
            BTreeSet::from([UserId(1), UserId(2)])
        );

        assert!(store.delete_like(UserId(1), FilmId(10)).await.unwrap());
        assert!(!store.delete_like(UserId(1), FilmId(10)).await.unwrap());
        assert!(store.likes_of(UserId(1)).await.unwrap().is_empty());
        assert!(!store.all_likes().await.unwrap().contains_key(&UserId(1)));
    }

    #[tokio::test]
    async fn test_feed_ids_increase_per_store() {
        let store = MemoryStore::new();
        let event = |user: i64| NewFeedEvent {
            timestamp: 100,
            user_id: UserId(user),
            event_type: EventType::Like,
            operation: Operation::Add,
            entity_id: user,
        };

        let first = store.append(event(1)).await.unwrap();
        let second = store.append(event(2)).await.unwrap();
        let third = store.append(event(1)).await.unwrap();

        assert!(first.event_id < second.event_id && second.event_id < third.event_id);

        let events = store.events_of(UserId(1)).await.unwrap();
        assert_eq!(
            events.iter().map(|e| e.event_id).collect::<Vec<_>>(),
            vec![first.event_id, third.event_id]
        );

        let other = MemoryStore::new();
        assert_eq!(other.append(event(1)).await.unwrap().event_id, 1);
    }
}
