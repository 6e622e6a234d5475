//! Append-only transition history.
//!
//! Every order, cheque and load transition produces one immutable
//! [`TransitionRecord`] that feeds the history panels of the back office.

use chrono::{DateTime, Utc};
use haulbook_shared::types::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of entity a history record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A customer order.
    Order,
    /// A customer cheque.
    Cheque,
    /// A load sheet.
    Load,
}

impl EntityKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Cheque => "cheque",
            Self::Load => "load",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "order" | "orders" => Some(Self::Order),
            "cheque" | "cheques" => Some(Self::Cheque),
            "load" | "loads" => Some(Self::Load),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One state change of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Kind of the entity.
    pub entity_kind: EntityKind,
    /// Identifier of the entity.
    pub entity_id: Uuid,
    /// State before the change.
    pub previous_state: String,
    /// State after the change.
    pub new_state: String,
    /// Operator who caused the change.
    pub actor: UserId,
    /// Free-text reason, if any.
    pub reason: Option<String>,
    /// When the change happened.
    pub occurred_at: DateTime<Utc>,
}

impl TransitionRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn now(
        entity_kind: EntityKind,
        entity_id: Uuid,
        previous_state: &str,
        new_state: &str,
        actor: UserId,
        reason: Option<String>,
    ) -> Self {
        Self {
            entity_kind,
            entity_id,
            previous_state: previous_state.to_string(),
            new_state: new_state.to_string(),
            actor,
            reason,
            occurred_at: Utc::now(),
        }
    }

    /// Returns true if the record documents an event that left the state as is.
    #[must_use]
    pub fn is_self_transition(&self) -> bool {
        self.previous_state == self.new_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_parse() {
        assert_eq!(EntityKind::parse("order"), Some(EntityKind::Order));
        assert_eq!(EntityKind::parse("Cheques"), Some(EntityKind::Cheque));
        assert_eq!(EntityKind::parse("LOAD"), Some(EntityKind::Load));
        assert_eq!(EntityKind::parse("invoice"), None);
    }

    #[test]
    fn test_record_now() {
        let actor = UserId::new();
        let id = Uuid::new_v4();
        let record =
            TransitionRecord::now(EntityKind::Cheque, id, "pending", "deposited", actor, None);
        assert_eq!(record.entity_id, id);
        assert_eq!(record.actor, actor);
        assert!(!record.is_self_transition());
    }
}
