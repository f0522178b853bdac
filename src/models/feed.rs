use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::UserId;

/// Kind of domain object a feed event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Friend,
    Like,
    Review,
}

/// What happened to the referenced object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Friend => "FRIEND",
            EventType::Like => "LIKE",
            EventType::Review => "REVIEW",
        }
    }
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "ADD",
            Operation::Remove => "REMOVE",
            Operation::Update => "UPDATE",
        }
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FRIEND" => Ok(EventType::Friend),
            "LIKE" => Ok(EventType::Like),
            "REVIEW" => Ok(EventType::Review),
            other => Err(format!("unknown event type: {}", other)),
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(Operation::Add),
            "REMOVE" => Ok(Operation::Remove),
            "UPDATE" => Ok(Operation::Update),
            other => Err(format!("unknown operation: {}", other)),
        }
    }
}

/// An event about to be written to the activity feed
///
/// `entity_id` is `None` when the affected entity could not be resolved;
/// such drafts are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEventDraft {
    pub user_id: UserId,
    pub event_type: EventType,
    pub operation: Operation,
    pub entity_id: Option<i64>,
}

/// A stored, immutable activity feed entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEvent {
    pub event_id: i64,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    pub user_id: UserId,
    pub event_type: EventType,
    pub operation: Operation,
    pub entity_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_event_json_shape() {
        let event = FeedEvent {
            event_id: 3,
            timestamp: 1_700_000_000,
            user_id: UserId(1),
            event_type: EventType::Friend,
            operation: Operation::Add,
            entity_id: 12,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["eventId"], 3);
        assert_eq!(json["timestamp"], 1_700_000_000i64);
        assert_eq!(json["userId"], 1);
        assert_eq!(json["eventType"], "FRIEND");
        assert_eq!(json["operation"], "ADD");
        assert_eq!(json["entityId"], 12);
    }

    #[test]
    fn test_event_type_parses_its_own_label() {
        for kind in [EventType::Friend, EventType::Like, EventType::Review] {
            assert_eq!(kind.as_str().parse::<EventType>().unwrap(), kind);
        }
        assert!("DELETE".parse::<EventType>().is_err());
    }

    #[test]
    fn test_operation_parses_its_own_label() {
        for op in [Operation::Add, Operation::Remove, Operation::Update] {
            assert_eq!(op.to_string().parse::<Operation>().unwrap(), op);
        }
        assert!("add".parse::<Operation>().is_err());
    }
}
