//! Load sheet domain types.

use chrono::{DateTime, NaiveDate, Utc};
use haulbook_shared::types::{BusinessUnitId, LoadId, PersonId, UserId, VehicleId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::history::{EntityKind, TransitionRecord};
use crate::order::LoadAssignment;

/// Crew, vehicle and date of a new load sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoad {
    /// Delivery vehicle.
    pub vehicle_id: VehicleId,
    /// Person responsible for the delivery run.
    pub responsible_person_id: PersonId,
    /// Optional helper.
    pub helper_id: Option<PersonId>,
    /// Date of the run.
    pub load_date: NaiveDate,
}

/// The part of a load sheet needed to decide whether it can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadState {
    /// Load identifier.
    pub id: LoadId,
    /// Whether the load still accepts changes.
    pub is_open: bool,
}

/// A validated batch of order assignments for one new load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    /// The new load's identifier.
    pub load_id: LoadId,
    /// Business unit shared by every order in the batch.
    pub business_unit_id: BusinessUnitId,
    /// One assignment per order, in the requested order.
    pub assignments: Vec<LoadAssignment>,
}

/// A load sheet state change (open → closed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTransition {
    /// Load identifier.
    pub load_id: LoadId,
    /// Operator closing the load.
    pub actor: UserId,
    /// When the load was closed.
    pub occurred_at: DateTime<Utc>,
}

impl LoadTransition {
    /// Builds the history record for this transition.
    #[must_use]
    pub fn history(&self) -> TransitionRecord {
        TransitionRecord {
            entity_kind: EntityKind::Load,
            entity_id: Uuid::from(self.load_id),
            previous_state: "open".to_string(),
            new_state: "closed".to_string(),
            actor: self.actor,
            reason: Some("reconciliation closed the load".to_string()),
            occurred_at: self.occurred_at,
        }
    }
}
