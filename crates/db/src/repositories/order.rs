//! Order repository.
//!
//! Every status change locks the order row, asks [`OrderService`] for the
//! transition and writes status, version and history in one transaction.

use chrono::Utc;
use haulbook_core::claim::ClaimStatus;
use haulbook_core::history::{EntityKind, TransitionRecord};
use haulbook_core::order::{
    AmountChangeKind, OrderError, OrderLineInput, OrderService, OrderSnapshot, OrderStatus,
    OrderTransition, PaymentStatus, order_total,
};
use haulbook_shared::types::{BusinessUnitId, CustomerId, LoadId, OrderId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{loads, order_amount_changes, order_lines, orders};

use super::{cheque, history};

/// Input for placing a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderInput {
    /// Business key of the order.
    pub order_number: String,
    /// Ordering customer.
    pub customer_id: CustomerId,
    /// Business unit fulfilling the order.
    pub business_unit_id: BusinessUnitId,
    /// Invoice number, when the order is billed at placement.
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Ordered lines.
    pub lines: Vec<OrderLineInput>,
}

/// An order with its lines and amount ledger.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    /// The order row.
    pub order: orders::Model,
    /// Lines in line-number order.
    pub lines: Vec<order_lines::Model>,
    /// Amount changes, oldest first.
    pub amount_changes: Vec<order_amount_changes::Model>,
}

/// Order repository.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
}

impl OrderRepository {
    /// Creates a new order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Places a new pending order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The order number is empty or the lines are invalid
    /// - The order number is already used
    /// - Database operation fails
    #[instrument(skip(self, input), fields(order_number = %input.order_number))]
    pub async fn place(
        &self,
        input: PlaceOrderInput,
        actor: UserId,
    ) -> Result<OrderDetail, OrderError> {
        let order_number = input.order_number.trim().to_string();
        if order_number.is_empty() {
            return Err(OrderError::Validation(
                "Order number is required".to_string(),
            ));
        }
        let total = order_total(&input.lines)?;

        let existing = orders::Entity::find()
            .filter(orders::Column::OrderNumber.eq(order_number.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
        if existing.is_some() {
            return Err(OrderError::Duplicate(order_number));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let now = Utc::now();
        let order_id = OrderId::new();
        orders::ActiveModel {
            id: Set(order_id.into_inner()),
            order_number: Set(order_number.clone()),
            invoice_number: Set(input
                .invoice_number
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())),
            customer_id: Set(input.customer_id.into_inner()),
            business_unit_id: Set(input.business_unit_id.into_inner()),
            status: Set(OrderStatus::Pending.into()),
            payment_status: Set(PaymentStatus::Unpaid.into()),
            total_amount: Set(total),
            dispatched_amount: Set(None),
            load_id: Set(None),
            notes: Set(input.notes),
            version: Set(1),
            created_by: Set(actor.into_inner()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                OrderError::Duplicate(order_number.clone())
            }
            _ => OrderError::Database(e.to_string()),
        })?;

        for (index, line) in input.lines.iter().enumerate() {
            order_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                order_id: Set(order_id.into_inner()),
                line_number: Set(i32::try_from(index + 1).unwrap_or(i32::MAX)),
                product_id: Set(line.product_id.into_inner()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                free_quantity: Set(line.free_quantity),
                claim_status: Set(ClaimStatus::for_free_quantity(line.free_quantity).into()),
                claim_purchase_id: Set(None),
            }
            .insert(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
        }

        record_amount(&txn, order_id, AmountChangeKind::Placed, total, actor)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let placed = TransitionRecord::now(
            EntityKind::Order,
            order_id.into_inner(),
            "new",
            OrderStatus::Pending.as_str(),
            actor,
            None,
        );
        history::record(&txn, &placed)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(%order_id, %total, "order placed");
        self.find(order_id).await
    }

    /// Gets an order with its lines and amount ledger.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist.
    pub async fn find(&self, order_id: OrderId) -> Result<OrderDetail, OrderError> {
        let order = orders::Entity::find_by_id(order_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?
            .ok_or(OrderError::NotFound(order_id))?;

        let lines = order_lines::Entity::find()
            .filter(order_lines::Column::OrderId.eq(order.id))
            .order_by_asc(order_lines::Column::LineNumber)
            .all(&self.db)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let amount_changes = order_amount_changes::Entity::find()
            .filter(order_amount_changes::Column::OrderId.eq(order.id))
            .order_by_asc(order_amount_changes::Column::RecordedAt)
            .order_by_asc(order_amount_changes::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        Ok(OrderDetail {
            order,
            lines,
            amount_changes,
        })
    }

    /// Approves a pending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is missing or not pending.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        order_id: OrderId,
        actor: UserId,
    ) -> Result<orders::Model, OrderError> {
        self.transition(order_id, |order| OrderService::approve(order, actor))
            .await
    }

    /// Sends an approved order to quality check.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is missing or not processing.
    #[instrument(skip(self))]
    pub async fn send_to_qc(
        &self,
        order_id: OrderId,
        actor: UserId,
    ) -> Result<orders::Model, OrderError> {
        self.transition(order_id, |order| OrderService::send_to_qc(order, actor))
            .await
    }

    /// Passes quality check.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is missing or not checking.
    #[instrument(skip(self))]
    pub async fn pass_qc(
        &self,
        order_id: OrderId,
        actor: UserId,
        forced: bool,
    ) -> Result<orders::Model, OrderError> {
        self.transition(order_id, |order| OrderService::pass_qc(order, actor, forced))
            .await
    }

    /// Cancels an order.
    ///
    /// An order cancelled in transit is detached from its load and its open
    /// cheques are returned or handed back in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is missing or terminal.
    #[instrument(skip(self, reason))]
    pub async fn reject(
        &self,
        order_id: OrderId,
        actor: UserId,
        reason: Option<String>,
    ) -> Result<orders::Model, OrderError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let order = lock(&txn, order_id)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?
            .ok_or(OrderError::NotFound(order_id))?;
        let current = snapshot(&txn, &order)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let transition = OrderService::reject(&current, actor, reason)?;
        let in_transit = transition.from == OrderStatus::InTransit;

        let version = order.version;
        let mut active: orders::ActiveModel = order.into();
        active.status = Set(transition.to.into());
        if in_transit {
            active.load_id = Set(None);
        }
        active.version = Set(version + 1);
        active.updated_at = Set(transition.occurred_at.into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        history::record(&txn, &transition.history())
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let cheques_settled = if in_transit {
            cheque::return_for_order(
                &txn,
                order_id,
                transition.occurred_at.date_naive(),
                "order cancelled",
                actor,
            )
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?
        } else {
            0
        };

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(%order_id, from = %transition.from, cheques_settled, "order cancelled");
        Ok(updated)
    }

    /// Attaches the invoice number an order is billed on.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is missing, cancelled or already billed.
    #[instrument(skip(self))]
    pub async fn attach_invoice(
        &self,
        order_id: OrderId,
        invoice_number: &str,
    ) -> Result<orders::Model, OrderError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let order = lock(&txn, order_id)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?
            .ok_or(OrderError::NotFound(order_id))?;
        let current = snapshot(&txn, &order)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
        OrderService::attach_invoice(&current, order.invoice_number.as_deref(), invoice_number)?;

        let version = order.version;
        let mut active: orders::ActiveModel = order.into();
        active.invoice_number = Set(Some(invoice_number.trim().to_string()));
        active.version = Set(version + 1);
        active.updated_at = Set(Utc::now().into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
        Ok(updated)
    }

    /// Changes the invoice total of an order.
    ///
    /// The dispatched amount is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is missing or terminal, or the total is
    /// negative.
    #[instrument(skip(self))]
    pub async fn edit_invoice_amount(
        &self,
        order_id: OrderId,
        new_total: Decimal,
        actor: UserId,
    ) -> Result<orders::Model, OrderError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let order = lock(&txn, order_id)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?
            .ok_or(OrderError::NotFound(order_id))?;
        let current = snapshot(&txn, &order)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
        OrderService::edit_invoice_amount(&current, new_total)?;

        let version = order.version;
        let mut active: orders::ActiveModel = order.into();
        active.total_amount = Set(new_total);
        active.version = Set(version + 1);
        active.updated_at = Set(Utc::now().into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        record_amount(&txn, order_id, AmountChangeKind::InvoiceEdit, new_total, actor)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
        Ok(updated)
    }

    async fn transition<F>(&self, order_id: OrderId, decide: F) -> Result<orders::Model, OrderError>
    where
        F: FnOnce(&OrderSnapshot) -> Result<OrderTransition, OrderError>,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let order = lock(&txn, order_id)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?
            .ok_or(OrderError::NotFound(order_id))?;
        let current = snapshot(&txn, &order)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let transition = decide(&current)?;

        let version = order.version;
        let mut active: orders::ActiveModel = order.into();
        active.status = Set(transition.to.into());
        active.version = Set(version + 1);
        active.updated_at = Set(transition.occurred_at.into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        history::record(&txn, &transition.history())
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(%order_id, from = %transition.from, to = %transition.to, "order transitioned");
        Ok(updated)
    }
}

/// Reads an order row for update.
pub(crate) async fn lock<C: ConnectionTrait>(
    conn: &C,
    order_id: OrderId,
) -> Result<Option<orders::Model>, DbErr> {
    orders::Entity::find_by_id(order_id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await
}

/// Builds the core view of an order row.
///
/// `open_load` is only set while the referenced load is still open.
pub(crate) async fn snapshot<C: ConnectionTrait>(
    conn: &C,
    order: &orders::Model,
) -> Result<OrderSnapshot, DbErr> {
    let open_load = match order.load_id {
        Some(load_id) => loads::Entity::find_by_id(load_id)
            .one(conn)
            .await?
            .filter(|load| load.is_open)
            .map(|load| LoadId::from_uuid(load.id)),
        None => None,
    };

    Ok(OrderSnapshot {
        id: OrderId::from_uuid(order.id),
        business_unit_id: BusinessUnitId::from_uuid(order.business_unit_id),
        status: order.status.into(),
        total_amount: order.total_amount,
        dispatched_amount: order.dispatched_amount,
        open_load,
    })
}

/// Appends one entry to an order's amount ledger.
pub(crate) async fn record_amount<C: ConnectionTrait>(
    conn: &C,
    order_id: OrderId,
    kind: AmountChangeKind,
    amount: Decimal,
    actor: UserId,
) -> Result<(), DbErr> {
    order_amount_changes::ActiveModel {
        id: Set(Uuid::now_v7()),
        order_id: Set(order_id.into_inner()),
        kind: Set(kind.into()),
        amount: Set(amount),
        actor_id: Set(actor.into_inner()),
        recorded_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;
    Ok(())
}
