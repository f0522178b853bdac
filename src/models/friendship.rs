use serde::{Deserialize, Serialize};

use super::UserId;

/// A directional friendship row
///
/// `from` asked `to` to be friends. `confirmed` is set once `to` reciprocated;
/// the reverse pair is tracked by its own, independent row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendEdge {
    pub id: i64,
    pub from: UserId,
    pub to: UserId,
    pub confirmed: bool,
}

/// Both directional rows of an ordered pair `(a, b)`, as read inside one atomic scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairState {
    /// edge(a, b)
    pub forward: Option<FriendEdge>,
    /// edge(b, a)
    pub reverse: Option<FriendEdge>,
}

/// A single write against the friendship rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeChange {
    /// Insert an unconfirmed edge
    Insert { from: UserId, to: UserId },
    /// Set `confirmed = true` on an existing edge
    Confirm { from: UserId, to: UserId },
    /// Set `confirmed = false` on an existing edge
    Demote { from: UserId, to: UserId },
    /// Delete an existing edge
    Delete { from: UserId, to: UserId },
}

impl EdgeChange {
    /// The ordered pair the change writes to
    pub fn endpoints(&self) -> (UserId, UserId) {
        match *self {
            EdgeChange::Insert { from, to }
            | EdgeChange::Confirm { from, to }
            | EdgeChange::Demote { from, to }
            | EdgeChange::Delete { from, to } => (from, to),
        }
    }
}

/// Result of applying a planned set of changes to a pair
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transition {
    pub changes: Vec<EdgeChange>,
    /// Id of the row written by the first change, if any
    pub affected_edge: Option<i64>,
}

impl Transition {
    pub fn changed(&self) -> bool {
        !self.changes.is_empty()
    }
}
