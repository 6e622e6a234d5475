//! Reconciliation repository.
//!
//! Finalizes a load after delivery: every asserted order outcome, the cheque
//! settlements of returned orders and the optional load close are written in
//! one transaction.

use std::collections::HashSet;

use chrono::Utc;
use haulbook_core::load::LoadState;
use haulbook_core::order::{AmountChangeKind, OrderStatus};
use haulbook_core::reconciliation::{
    LoadedOrder, OrderUpdate, OutcomeKind, ReconciliationError, ReconciliationService, SkipReason,
};
use haulbook_shared::types::{LoadId, OrderId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::entities::{load_orders, loads, orders};

use super::{cheque, history, order};

/// What happened to one submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OrderResult {
    /// The asserted outcome was written.
    Applied {
        /// The order.
        order_id: OrderId,
        /// Status before reconciliation.
        from: OrderStatus,
        /// Status after reconciliation.
        to: OrderStatus,
        /// Final amount minus dispatched amount.
        diff: Decimal,
        /// Number of cheques returned or handed back.
        cheques_settled: usize,
    },
    /// The order already matched the assertion.
    Unchanged {
        /// The order.
        order_id: OrderId,
    },
    /// The update was ignored.
    Skipped {
        /// The order.
        order_id: OrderId,
        /// Why it was ignored.
        reason: SkipReason,
    },
}

/// Result of finalizing a load.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    /// The reconciled load.
    pub load_id: LoadId,
    /// Whether the load is closed after this call.
    pub closed: bool,
    /// One result per submitted update, in submission order.
    pub results: Vec<OrderResult>,
}

/// Reconciliation repository.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Applies delivery outcomes to the orders of a load.
    ///
    /// Orders that are unknown, not on the load or rescheduled off it are
    /// skipped and reported. A closed load only accepts a resubmission that
    /// changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The load does not exist
    /// - The batch is malformed
    /// - The load is closed and the batch would change it
    /// - Settling a returned order's cheques fails
    /// - Database operation fails
    #[instrument(skip(self, updates), fields(updates = updates.len()))]
    pub async fn finalize(
        &self,
        load_id: LoadId,
        updates: &[OrderUpdate],
        close_load: bool,
        actor: UserId,
    ) -> Result<ReconciliationReport, ReconciliationError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ReconciliationError::Database(e.to_string()))?;

        let load = loads::Entity::find_by_id(load_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| ReconciliationError::Database(e.to_string()))?
            .ok_or(ReconciliationError::NotFound(load_id))?;

        let manifest: HashSet<_> = load_orders::Entity::find()
            .filter(load_orders::Column::LoadId.eq(load.id))
            .all(&txn)
            .await
            .map_err(|e| ReconciliationError::Database(e.to_string()))?
            .into_iter()
            .map(|entry| entry.order_id)
            .collect();

        let mut ids: Vec<_> = updates.iter().map(|u| u.order_id.into_inner()).collect();
        ids.sort_unstable();
        ids.dedup();
        let rows = orders::Entity::find()
            .filter(orders::Column::Id.is_in(ids))
            .order_by_asc(orders::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(|e| ReconciliationError::Database(e.to_string()))?;

        let mut loaded = Vec::with_capacity(rows.len());
        for row in &rows {
            let snapshot = order::snapshot(&txn, row)
                .await
                .map_err(|e| ReconciliationError::Database(e.to_string()))?;
            loaded.push(LoadedOrder {
                snapshot,
                payment_status: row.payment_status.into(),
                notes: row.notes.clone(),
                on_manifest: manifest.contains(&row.id),
                attached: row.load_id == Some(load.id),
            });
        }

        let state = LoadState {
            id: load_id,
            is_open: load.is_open,
        };
        let plan = ReconciliationService::plan(state, &loaded, updates, close_load, actor)?;

        let today = Utc::now().date_naive();
        let mut results = Vec::with_capacity(plan.outcomes.len());
        for outcome in &plan.outcomes {
            let order_id = outcome.order_id;
            match &outcome.kind {
                OutcomeKind::Skipped(reason) => {
                    warn!(%load_id, %order_id, reason = reason.describe(), "reconciliation update skipped");
                    results.push(OrderResult::Skipped {
                        order_id,
                        reason: *reason,
                    });
                }
                OutcomeKind::Unchanged => results.push(OrderResult::Unchanged { order_id }),
                OutcomeKind::Applied(change) => {
                    let row = rows
                        .iter()
                        .find(|row| row.id == order_id.into_inner())
                        .cloned()
                        .ok_or_else(|| {
                            ReconciliationError::Database(format!("Order {order_id} was not locked"))
                        })?;

                    let version = row.version;
                    let mut active: orders::ActiveModel = row.into();
                    active.status = Set(change.transition.to.into());
                    active.total_amount = Set(change.total_amount);
                    active.payment_status = Set(change.payment_status.into());
                    active.notes = Set(change.notes.clone());
                    if change.detach {
                        active.load_id = Set(None);
                    }
                    active.version = Set(version + 1);
                    active.updated_at = Set(change.transition.occurred_at.into());
                    active
                        .update(&txn)
                        .await
                        .map_err(|e| ReconciliationError::Database(e.to_string()))?;

                    order::record_amount(
                        &txn,
                        order_id,
                        AmountChangeKind::Reconciled,
                        change.total_amount,
                        actor,
                    )
                    .await
                    .map_err(|e| ReconciliationError::Database(e.to_string()))?;
                    history::record(&txn, &change.transition.history())
                        .await
                        .map_err(|e| ReconciliationError::Database(e.to_string()))?;

                    let cheques_settled = if change.settle_cheques {
                        cheque::return_for_order(&txn, order_id, today, "order returned", actor)
                            .await?
                    } else {
                        0
                    };

                    results.push(OrderResult::Applied {
                        order_id,
                        from: change.transition.from,
                        to: change.transition.to,
                        diff: change.diff,
                        cheques_settled,
                    });
                }
            }
        }

        let mut closed = !load.is_open;
        if let Some(close) = &plan.close {
            let mut active: loads::ActiveModel = load.into();
            active.is_open = Set(false);
            active.closed_at = Set(Some(close.occurred_at.into()));
            active
                .update(&txn)
                .await
                .map_err(|e| ReconciliationError::Database(e.to_string()))?;
            history::record(&txn, &close.history())
                .await
                .map_err(|e| ReconciliationError::Database(e.to_string()))?;
            closed = true;
        }

        txn.commit()
            .await
            .map_err(|e| ReconciliationError::Database(e.to_string()))?;

        info!(
            %load_id,
            applied = plan.applied().count(),
            closed,
            "load reconciled"
        );
        Ok(ReconciliationReport {
            load_id,
            closed,
            results,
        })
    }
}
