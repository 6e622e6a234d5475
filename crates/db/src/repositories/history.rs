//! Transition history repository.

use chrono::Utc;
use haulbook_core::history::{EntityKind, TransitionRecord};
use haulbook_shared::types::UserId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::transition_history;

/// Appends one history record using the caller's connection or transaction.
pub(crate) async fn record<C: ConnectionTrait>(
    conn: &C,
    record: &TransitionRecord,
) -> Result<(), DbErr> {
    transition_history::ActiveModel {
        id: Set(Uuid::now_v7()),
        entity_kind: Set(record.entity_kind.into()),
        entity_id: Set(record.entity_id),
        previous_state: Set(record.previous_state.clone()),
        new_state: Set(record.new_state.clone()),
        actor_id: Set(record.actor.into_inner()),
        reason: Set(record.reason.clone()),
        occurred_at: Set(record.occurred_at.into()),
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Read access to the transition history.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    db: DatabaseConnection,
}

impl HistoryRepository {
    /// Creates a new history repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the transitions of one entity, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        entity_kind: EntityKind,
        entity_id: Uuid,
    ) -> Result<Vec<TransitionRecord>, DbErr> {
        let rows = transition_history::Entity::find()
            .filter(transition_history::Column::EntityKind.eq(
                crate::entities::sea_orm_active_enums::EntityKind::from(entity_kind),
            ))
            .filter(transition_history::Column::EntityId.eq(entity_id))
            .order_by_asc(transition_history::Column::OccurredAt)
            .order_by_asc(transition_history::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(into_record).collect())
    }
}

fn into_record(row: transition_history::Model) -> TransitionRecord {
    TransitionRecord {
        entity_kind: row.entity_kind.into(),
        entity_id: row.entity_id,
        previous_state: row.previous_state,
        new_state: row.new_state,
        actor: UserId::from_uuid(row.actor_id),
        reason: row.reason,
        occurred_at: row.occurred_at.with_timezone(&Utc),
    }
}
