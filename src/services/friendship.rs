//! Directional friendship state machine.
//!
//! A friendship between `a` and `b` is stored as at most one row per ordered
//! pair. `requestFriend(a, b)` either creates a pending `a -> b` row or, when
//! `b` already asked `a`, confirms the existing `b -> a` row. The confirmed flag
//! therefore always sits on the row of whoever asked first.
//!
//! `friends_of(u)` counts every outgoing row of `u` regardless of
//! confirmation, plus incoming rows that are confirmed.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{EdgeChange, FriendEdge, PairState, Transition, UserId},
    services::{ensure_user, events::DomainEvent, EventEmitter},
    store::{FriendshipRepository, UserDirectory},
};

/// Writes performed by `request_friend(a, b)`
pub fn plan_request(a: UserId, b: UserId, state: &PairState) -> Vec<EdgeChange> {
    if state.forward.is_some() {
        return vec![];
    }

    match state.reverse {
        Some(edge) if !edge.confirmed => vec![EdgeChange::Confirm { from: b, to: a }],
        // Already mutual: the confirmation lives on b -> a.
        Some(_) => vec![],
        None => vec![EdgeChange::Insert { from: a, to: b }],
    }
}

/// Writes performed by `remove_friend(a, b)`
pub fn plan_remove(a: UserId, b: UserId, state: &PairState) -> Vec<EdgeChange> {
    if let Some(reverse) = state.reverse {
        if reverse.confirmed {
            return vec![EdgeChange::Demote { from: b, to: a }];
        }
    }

    match state.forward {
        Some(forward) if forward.confirmed && state.reverse.is_none() => vec![
            EdgeChange::Delete { from: a, to: b },
            EdgeChange::Insert { from: b, to: a },
        ],
        Some(_) => vec![EdgeChange::Delete { from: a, to: b }],
        None => vec![],
    }
}

/// Users `user` counts as friends, given every edge touching `user`
pub fn friends_from_edges(user: UserId, edges: &[FriendEdge]) -> BTreeSet<UserId> {
    edges
        .iter()
        .filter_map(|edge| {
            if edge.from == user {
                Some(edge.to)
            } else if edge.to == user && edge.confirmed {
                Some(edge.from)
            } else {
                None
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct FriendshipGraph {
    users: Arc<dyn UserDirectory>,
    edges: Arc<dyn FriendshipRepository>,
    events: EventEmitter,
}

impl FriendshipGraph {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        edges: Arc<dyn FriendshipRepository>,
        events: EventEmitter,
    ) -> Self {
        Self {
            users,
            edges,
            events,
        }
    }

    async fn ensure_pair(&self, a: UserId, b: UserId) -> AppResult<()> {
        ensure_user(self.users.as_ref(), a).await?;
        ensure_user(self.users.as_ref(), b).await?;
        if a == b {
            return Err(AppError::InvalidInput(format!(
                "User {} cannot befriend themselves",
                a
            )));
        }
        Ok(())
    }

    /// `a` asks `b` to be friends
    ///
    /// On a state change, records a FRIEND/ADD event for `a` referencing the
    /// written row. Repeating the call is a no-op and records nothing.
    pub async fn request_friend(&self, a: UserId, b: UserId) -> AppResult<Transition> {
        self.ensure_pair(a, b).await?;

        let transition = self.edges.transition(a, b, plan_request).await?;
        if transition.changed() {
            tracing::info!(user_id = %a, friend_id = %b, changes = ?transition.changes, "Friend request applied");
            self.events
                .emit(DomainEvent::FriendAdded {
                    user: a,
                    edge: transition.affected_edge,
                })
                .await;
        } else {
            tracing::debug!(user_id = %a, friend_id = %b, "Friend request already in place");
        }

        Ok(transition)
    }

    /// `a` drops `b` from their friends
    ///
    /// On a state change, records a FRIEND/REMOVE event for `a` referencing
    /// the written row. Removing a missing friendship is a no-op.
    pub async fn remove_friend(&self, a: UserId, b: UserId) -> AppResult<Transition> {
        self.ensure_pair(a, b).await?;

        let transition = self.edges.transition(a, b, plan_remove).await?;
        if transition.changed() {
            tracing::info!(user_id = %a, friend_id = %b, changes = ?transition.changes, "Friend removal applied");
            self.events
                .emit(DomainEvent::FriendRemoved {
                    user: a,
                    edge: transition.affected_edge,
                })
                .await;
        } else {
            tracing::debug!(user_id = %a, friend_id = %b, "No friendship to remove");
        }

        Ok(transition)
    }

    pub async fn friends_of(&self, user: UserId) -> AppResult<Vec<UserId>> {
        ensure_user(self.users.as_ref(), user).await?;
        Ok(self.friend_set(user).await?.into_iter().collect())
    }

    pub async fn common_friends(&self, a: UserId, b: UserId) -> AppResult<Vec<UserId>> {
        ensure_user(self.users.as_ref(), a).await?;
        ensure_user(self.users.as_ref(), b).await?;

        let first = self.friend_set(a).await?;
        let second = self.friend_set(b).await?;
        Ok(first.intersection(&second).copied().collect())
    }

    async fn friend_set(&self, user: UserId) -> AppResult<BTreeSet<UserId>> {
        let edges = self.edges.edges_of(user).await?;
        Ok(friends_from_edges(user, &edges))
    }
}
