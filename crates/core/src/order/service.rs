//! Order state machine.
//!
//! This module implements the transitions of an order from placement to
//! dispatch. Reconciliation outcomes are decided by
//! [`crate::reconciliation::ReconciliationService`], which relies on
//! [`OrderService::is_valid_transition`] for its edge checks.

use haulbook_shared::types::{LoadId, UserId};
use rust_decimal::Decimal;

use crate::order::error::OrderError;
use crate::order::types::{LoadAssignment, OrderSnapshot, OrderStatus, OrderTransition};

/// Stateless service for order status transitions.
///
/// Every method validates the transition against the order's current
/// snapshot and returns the change to persist; nothing is mutated here.
pub struct OrderService;

impl OrderService {
    /// Approve a pending order.
    ///
    /// # Returns
    /// * `Ok(OrderTransition)` Pending → Processing
    /// * `Err(OrderError::InvalidTransition)` if not Pending
    pub fn approve(order: &OrderSnapshot, actor: UserId) -> Result<OrderTransition, OrderError> {
        Self::step(order, OrderStatus::Pending, OrderStatus::Processing, actor, None)
    }

    /// Send an approved order to quality check.
    ///
    /// # Returns
    /// * `Ok(OrderTransition)` Processing → Checking
    /// * `Err(OrderError::InvalidTransition)` if not Processing
    pub fn send_to_qc(
        order: &OrderSnapshot,
        actor: UserId,
    ) -> Result<OrderTransition, OrderError> {
        Self::step(order, OrderStatus::Processing, OrderStatus::Checking, actor, None)
    }

    /// Pass quality check.
    ///
    /// `forced` marks a pass with incomplete verification. It is recorded in
    /// the history reason; the transition itself is unconditional.
    ///
    /// # Returns
    /// * `Ok(OrderTransition)` Checking → Loading
    /// * `Err(OrderError::InvalidTransition)` if not Checking
    pub fn pass_qc(
        order: &OrderSnapshot,
        actor: UserId,
        forced: bool,
    ) -> Result<OrderTransition, OrderError> {
        let reason = forced.then(|| "QC passed with incomplete verification".to_string());
        Self::step(order, OrderStatus::Checking, OrderStatus::Loading, actor, reason)
    }

    /// Attach an order to a load and snapshot its dispatched amount.
    ///
    /// The snapshot is write-once: an order that was rescheduled and loaded
    /// again keeps its first dispatched amount.
    ///
    /// # Returns
    /// * `Ok(LoadAssignment)` Loading/Checking → InTransit
    /// * `Err(OrderError::AlreadyLoaded)` if attached to an open load
    /// * `Err(OrderError::InvalidTransition)` from any other status
    pub fn assign_to_load(
        order: &OrderSnapshot,
        load_id: LoadId,
        actor: UserId,
    ) -> Result<LoadAssignment, OrderError> {
        if let Some(open_load) = order.open_load {
            return Err(OrderError::AlreadyLoaded {
                order_id: order.id,
                load_id: open_load,
            });
        }
        if !order.status.is_loadable() {
            return Err(OrderError::InvalidTransition {
                order_id: order.id,
                from: order.status,
                to: OrderStatus::InTransit,
            });
        }

        let (dispatched_amount, snapshot_taken) = match order.dispatched_amount {
            Some(amount) => (amount, false),
            None => (order.total_amount, true),
        };

        Ok(LoadAssignment {
            transition: OrderTransition::new(
                order.id,
                order.status,
                OrderStatus::InTransit,
                actor,
                None,
            ),
            load_id,
            dispatched_amount,
            snapshot_taken,
        })
    }

    /// Reject an order.
    ///
    /// An in-transit order may be cancelled too. The caller detaches it from
    /// its load and settles its open cheques.
    ///
    /// # Returns
    /// * `Ok(OrderTransition)` to Cancelled
    /// * `Err(OrderError::InvalidTransition)` if the order is terminal
    pub fn reject(
        order: &OrderSnapshot,
        actor: UserId,
        reason: Option<String>,
    ) -> Result<OrderTransition, OrderError> {
        if !order.status.can_cancel() {
            return Err(OrderError::InvalidTransition {
                order_id: order.id,
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }
        let reason = reason.filter(|r| !r.trim().is_empty());
        Ok(OrderTransition::new(
            order.id,
            order.status,
            OrderStatus::Cancelled,
            actor,
            reason,
        ))
    }

    /// Validate an invoice total change coming from the invoice editor.
    ///
    /// Totals can change in any non-terminal status; the dispatched snapshot
    /// is never touched.
    pub fn edit_invoice_amount(
        order: &OrderSnapshot,
        new_total: Decimal,
    ) -> Result<(), OrderError> {
        if new_total < Decimal::ZERO {
            return Err(OrderError::Validation(
                "Invoice total must not be negative".to_string(),
            ));
        }
        if order.status.is_terminal() {
            return Err(OrderError::InvalidTransition {
                order_id: order.id,
                from: order.status,
                to: order.status,
            });
        }
        Ok(())
    }

    /// Validate that an invoice number can be attached.
    pub fn attach_invoice(
        order: &OrderSnapshot,
        existing: Option<&str>,
        invoice_number: &str,
    ) -> Result<(), OrderError> {
        if invoice_number.trim().is_empty() {
            return Err(OrderError::Validation(
                "Invoice number is required".to_string(),
            ));
        }
        if let Some(existing) = existing {
            return Err(OrderError::Validation(format!(
                "Order {} is already billed on invoice {existing}",
                order.id
            )));
        }
        if order.status == OrderStatus::Cancelled {
            return Err(OrderError::InvalidTransition {
                order_id: order.id,
                from: order.status,
                to: order.status,
            });
        }
        Ok(())
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Processing
    /// - Processing → Checking
    /// - Checking → Loading
    /// - Checking/Loading → InTransit
    /// - InTransit → Delivered/Partial/Returned/Loading
    /// - Delivered/Partial/Returned → another final status (reconciliation re-run)
    /// - Pending/Processing/Checking/Loading/InTransit → Cancelled
    #[must_use]
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        use OrderStatus::{
            Cancelled, Checking, Delivered, InTransit, Loading, Partial, Pending, Processing,
            Returned,
        };

        matches!(
            (from, to),
            (Pending, Processing)
                | (Processing, Checking)
                | (Checking, Loading)
                | (Checking | Loading, InTransit)
                | (InTransit, Delivered | Partial | Returned | Loading)
                | (Pending | Processing | Checking | Loading | InTransit, Cancelled)
        ) || (from.is_final() && to.is_final() && from != to)
    }

    fn step(
        order: &OrderSnapshot,
        expected: OrderStatus,
        to: OrderStatus,
        actor: UserId,
        reason: Option<String>,
    ) -> Result<OrderTransition, OrderError> {
        if order.status != expected {
            return Err(OrderError::InvalidTransition {
                order_id: order.id,
                from: order.status,
                to,
            });
        }
        Ok(OrderTransition::new(order.id, order.status, to, actor, reason))
    }
}
