//! Reconciliation planning.

use std::collections::HashSet;

use haulbook_shared::types::UserId;
use rust_decimal::Decimal;

use crate::load::{LoadService, LoadState};
use crate::order::{OrderService, OrderStatus, OrderTransition};
use crate::reconciliation::error::ReconciliationError;
use crate::reconciliation::types::{
    LoadedOrder, OrderOutcome, OrderUpdate, OutcomeKind, ReconciledOrder, ReconciliationPlan,
    SkipReason,
};

/// Stateless service deciding the outcome of a reconciliation batch.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Plan a reconciliation batch.
    ///
    /// Malformed updates reject the batch. Updates naming unknown orders,
    /// orders that are not (or no longer) on the load, or orders whose
    /// outcome is settled are skipped and reported. Re-submitting values an
    /// order already has is a no-op, so a retried batch is safe even after
    /// the load closed.
    ///
    /// # Errors
    /// * `ReconciliationError::Validation` for a non-target status, a negative
    ///   amount or an order named twice
    /// * `ReconciliationError::LoadClosed` if the load is closed and the batch
    ///   would change something
    pub fn plan(
        load: LoadState,
        orders: &[LoadedOrder],
        updates: &[OrderUpdate],
        close_load: bool,
        actor: UserId,
    ) -> Result<ReconciliationPlan, ReconciliationError> {
        Self::validate(updates)?;

        let mut outcomes = Vec::with_capacity(updates.len());
        for update in updates {
            let kind = match orders.iter().find(|o| o.snapshot.id == update.order_id) {
                None => OutcomeKind::Skipped(SkipReason::UnknownOrder),
                Some(order) => Self::decide(order, update, actor),
            };
            outcomes.push(OrderOutcome {
                order_id: update.order_id,
                kind,
            });
        }

        let mut plan = ReconciliationPlan {
            load_id: load.id,
            outcomes,
            close: None,
        };

        if load.is_open {
            if close_load {
                plan.close = Some(LoadService::close(&load, actor).map_err(|_| {
                    ReconciliationError::LoadClosed(load.id)
                })?);
            }
        } else if !plan.is_noop() {
            return Err(ReconciliationError::LoadClosed(load.id));
        }

        Ok(plan)
    }

    fn validate(updates: &[OrderUpdate]) -> Result<(), ReconciliationError> {
        let mut seen = HashSet::with_capacity(updates.len());
        for update in updates {
            let invalid = |message: String| ReconciliationError::Validation {
                order_id: update.order_id,
                message,
            };
            if !seen.insert(update.order_id) {
                return Err(invalid("order appears more than once".to_string()));
            }
            if !update.status.is_reconciliation_target() {
                return Err(invalid(format!(
                    "{} is not a reconciliation outcome",
                    update.status
                )));
            }
            if update.final_amount < Decimal::ZERO {
                return Err(invalid("final amount must not be negative".to_string()));
            }
        }
        Ok(())
    }

    fn decide(order: &LoadedOrder, update: &OrderUpdate, actor: UserId) -> OutcomeKind {
        if !order.on_manifest {
            return OutcomeKind::Skipped(SkipReason::NotOnLoad);
        }
        if !order.attached {
            return OutcomeKind::Skipped(if order.snapshot.status == OrderStatus::Cancelled {
                SkipReason::AlreadyResolved
            } else {
                SkipReason::Rescheduled
            });
        }

        let notes = update
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToString::to_string);
        let snapshot = &order.snapshot;

        let unchanged = snapshot.status == update.status
            && snapshot.total_amount == update.final_amount
            && order.payment_status == update.payment_status
            && (notes.is_none() || notes == order.notes);
        if unchanged {
            return OutcomeKind::Unchanged;
        }

        let from = snapshot.status;
        let to = update.status;
        let correction = from.is_final() && from == to;
        if !correction && !OrderService::is_valid_transition(from, to) {
            return OutcomeKind::Skipped(SkipReason::AlreadyResolved);
        }

        let dispatched_amount = snapshot.dispatched_amount.unwrap_or(snapshot.total_amount);
        let diff = update.final_amount - dispatched_amount;
        let reason = if diff.is_zero() {
            notes.clone()
        } else {
            let differs = format!("final amount differs from dispatched by {diff}");
            Some(match &notes {
                Some(notes) => format!("{differs}; {notes}"),
                None => differs,
            })
        };

        OutcomeKind::Applied(Box::new(ReconciledOrder {
            transition: OrderTransition::new(snapshot.id, from, to, actor, reason),
            total_amount: update.final_amount,
            payment_status: update.payment_status,
            notes: notes.or_else(|| order.notes.clone()),
            dispatched_amount,
            diff,
            detach: to == OrderStatus::Loading,
            settle_cheques: to == OrderStatus::Returned && from != OrderStatus::Returned,
        }))
    }
}
