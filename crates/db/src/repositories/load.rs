//! Load sheet repository.

use std::collections::HashMap;

use chrono::Utc;
use haulbook_core::history::{EntityKind, TransitionRecord};
use haulbook_core::load::{LoadError, LoadService, NewLoad};
use haulbook_core::order::{AmountChangeKind, OrderSnapshot};
use haulbook_shared::EngineConfig;
use haulbook_shared::types::{BusinessUnitId, LoadId, OrderId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::entities::{load_orders, load_sequences, loads, orders};

use super::{history, order};

/// One order on a load sheet.
#[derive(Debug, Clone, Serialize)]
pub struct LoadEntry {
    /// Position on the sheet, starting at 1.
    pub position: i32,
    /// Amount recorded when the order left.
    pub dispatched_amount: Decimal,
    /// The order as it is now.
    pub order: orders::Model,
}

/// A load sheet with its orders in sheet order.
#[derive(Debug, Clone, Serialize)]
pub struct LoadDetail {
    /// The load row.
    pub load: loads::Model,
    /// Orders on the sheet.
    pub orders: Vec<LoadEntry>,
}

/// Load sheet repository.
#[derive(Debug, Clone)]
pub struct LoadRepository {
    db: DatabaseConnection,
    prefix: String,
    width: usize,
}

impl LoadRepository {
    /// Creates a new load repository with the default numbering scheme.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let defaults = EngineConfig::default();
        Self {
            db,
            prefix: defaults.load_number_prefix,
            width: defaults.load_number_width,
        }
    }

    /// Overrides the load number prefix and zero-padded width.
    #[must_use]
    pub fn with_numbering(mut self, prefix: impl Into<String>, width: usize) -> Self {
        self.prefix = prefix.into();
        self.width = width;
        self
    }

    /// Creates a load sheet and dispatches every selected order on it.
    ///
    /// Orders are locked in ascending id order. Nothing is written unless
    /// every order can be loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The selection is empty or repeats an order
    /// - An order is missing, not loading or already on an open load
    /// - The orders belong to different business units
    /// - Database operation fails
    #[instrument(skip(self, new_load), fields(orders = order_ids.len()))]
    pub async fn create(
        &self,
        order_ids: &[OrderId],
        new_load: NewLoad,
        actor: UserId,
    ) -> Result<LoadDetail, LoadError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LoadError::Database(e.to_string()))?;

        let mut ids: Vec<_> = order_ids.iter().map(|id| id.into_inner()).collect();
        ids.sort_unstable();
        ids.dedup();

        let rows = orders::Entity::find()
            .filter(orders::Column::Id.is_in(ids))
            .order_by_asc(orders::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(|e| LoadError::Database(e.to_string()))?;

        let mut snapshots: Vec<OrderSnapshot> = Vec::with_capacity(rows.len());
        for row in &rows {
            snapshots.push(
                order::snapshot(&txn, row)
                    .await
                    .map_err(|e| LoadError::Database(e.to_string()))?,
            );
        }

        let load_id = LoadId::new();
        let plan = LoadService::plan(load_id, order_ids, &snapshots, actor)?;

        let sequence = next_sequence(&txn, plan.business_unit_id)
            .await
            .map_err(|e| LoadError::Database(e.to_string()))?;
        let load_number = LoadService::format_load_number(&self.prefix, self.width, sequence);

        let now = Utc::now();
        loads::ActiveModel {
            id: Set(load_id.into_inner()),
            load_number: Set(load_number.clone()),
            business_unit_id: Set(plan.business_unit_id.into_inner()),
            vehicle_id: Set(new_load.vehicle_id.into_inner()),
            responsible_person_id: Set(new_load.responsible_person_id.into_inner()),
            helper_id: Set(new_load.helper_id.map(|id| id.into_inner())),
            load_date: Set(new_load.load_date),
            is_open: Set(true),
            created_by: Set(actor.into_inner()),
            created_at: Set(now.into()),
            closed_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| LoadError::Database(e.to_string()))?;

        let opened = TransitionRecord::now(
            EntityKind::Load,
            load_id.into_inner(),
            "new",
            "open",
            actor,
            Some(load_number.clone()),
        );
        history::record(&txn, &opened)
            .await
            .map_err(|e| LoadError::Database(e.to_string()))?;

        let mut by_id: HashMap<_, _> = rows.into_iter().map(|row| (row.id, row)).collect();
        for (index, assignment) in plan.assignments.iter().enumerate() {
            let order_id = assignment.transition.order_id;
            load_orders::ActiveModel {
                load_id: Set(load_id.into_inner()),
                order_id: Set(order_id.into_inner()),
                position: Set(i32::try_from(index + 1).unwrap_or(i32::MAX)),
                dispatched_amount: Set(assignment.dispatched_amount),
            }
            .insert(&txn)
            .await
            .map_err(|e| LoadError::Database(e.to_string()))?;

            let row = by_id
                .remove(&order_id.into_inner())
                .ok_or_else(|| LoadError::Database(format!("Order {order_id} was not locked")))?;
            let version = row.version;
            let mut active: orders::ActiveModel = row.into();
            active.status = Set(assignment.transition.to.into());
            active.load_id = Set(Some(load_id.into_inner()));
            if assignment.snapshot_taken {
                active.dispatched_amount = Set(Some(assignment.dispatched_amount));
            }
            active.version = Set(version + 1);
            active.updated_at = Set(now.into());
            active
                .update(&txn)
                .await
                .map_err(|e| LoadError::Database(e.to_string()))?;

            if assignment.snapshot_taken {
                order::record_amount(
                    &txn,
                    order_id,
                    AmountChangeKind::Dispatched,
                    assignment.dispatched_amount,
                    actor,
                )
                .await
                .map_err(|e| LoadError::Database(e.to_string()))?;
            }

            history::record(&txn, &assignment.transition.history())
                .await
                .map_err(|e| LoadError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| LoadError::Database(e.to_string()))?;

        info!(%load_id, %load_number, orders = plan.assignments.len(), "load created");
        self.find(load_id).await
    }

    /// Gets a load sheet with its orders.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::NotFound` if the load does not exist.
    pub async fn find(&self, load_id: LoadId) -> Result<LoadDetail, LoadError> {
        let load = loads::Entity::find_by_id(load_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| LoadError::Database(e.to_string()))?
            .ok_or(LoadError::NotFound(load_id))?;

        let entries = load_orders::Entity::find()
            .filter(load_orders::Column::LoadId.eq(load.id))
            .order_by_asc(load_orders::Column::Position)
            .find_also_related(orders::Entity)
            .all(&self.db)
            .await
            .map_err(|e| LoadError::Database(e.to_string()))?;

        let orders = entries
            .into_iter()
            .filter_map(|(entry, order)| {
                order.map(|order| LoadEntry {
                    position: entry.position,
                    dispatched_amount: entry.dispatched_amount,
                    order,
                })
            })
            .collect();

        Ok(LoadDetail { load, orders })
    }
}

/// Allocates the next load sequence number of a business unit.
async fn next_sequence<C: ConnectionTrait>(
    conn: &C,
    business_unit_id: BusinessUnitId,
) -> Result<i64, DbErr> {
    let current = load_sequences::Entity::find_by_id(business_unit_id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await?;

    match current {
        Some(row) => {
            let next = row.last_value + 1;
            let mut active: load_sequences::ActiveModel = row.into();
            active.last_value = Set(next);
            active.update(conn).await?;
            Ok(next)
        }
        None => {
            load_sequences::ActiveModel {
                business_unit_id: Set(business_unit_id.into_inner()),
                last_value: Set(1),
            }
            .insert(conn)
            .await?;
            Ok(1)
        }
    }
}
