//! Stock repository: positions, movements and purchase receipts.

use chrono::Utc;
use haulbook_core::order::PaymentStatus;
use haulbook_core::stock::{
    AdjustmentLine, DamageLine, MovementKind, PurchaseLineInput, PurchaseStatus, StockError,
    StockKey, StockPlan, StockPosition, StockService, TransferLine, purchase_total,
};
use haulbook_shared::types::{
    LocationId, PageRequest, PageResponse, ProductId, PurchaseId, SupplierId, UserId,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{purchase_lines, purchases, stock_movements, stock_positions};

/// Input for recording a received purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivePurchaseInput {
    /// Business key of the purchase.
    pub purchase_number: String,
    /// Supplier delivering the goods.
    pub supplier_id: SupplierId,
    /// Location receiving the goods.
    pub location_id: LocationId,
    /// Received lines.
    pub lines: Vec<PurchaseLineInput>,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

/// A purchase with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseDetail {
    /// The purchase row.
    pub purchase: purchases::Model,
    /// Purchase lines.
    pub lines: Vec<purchase_lines::Model>,
}

/// Stock repository.
#[derive(Debug, Clone)]
pub struct StockRepository {
    db: DatabaseConnection,
}

impl StockRepository {
    /// Creates a new stock repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a received purchase and raises good stock.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The purchase number is empty or a line is invalid
    /// - The purchase number is already used
    /// - Database operation fails
    #[instrument(skip(self, input), fields(purchase_number = %input.purchase_number))]
    pub async fn receive_purchase(
        &self,
        input: ReceivePurchaseInput,
        actor: UserId,
    ) -> Result<PurchaseDetail, StockError> {
        let purchase_number = input.purchase_number.trim().to_string();
        if purchase_number.is_empty() {
            return Err(StockError::Validation(
                "Purchase number is required".to_string(),
            ));
        }
        let total_cost = purchase_total(&input.lines)?;

        let existing = purchases::Entity::find()
            .filter(purchases::Column::PurchaseNumber.eq(purchase_number.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;
        if existing.is_some() {
            return Err(StockError::Duplicate(purchase_number));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        let items: Vec<_> = input
            .lines
            .iter()
            .map(|line| (line.product_id, line.quantity))
            .collect();
        let keys = items
            .iter()
            .map(|(product_id, _)| (input.location_id, *product_id))
            .collect();
        let positions = lock_positions(&txn, keys)
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;
        let plan = StockService::receive(
            input.location_id,
            &items,
            &positions,
            MovementKind::PurchaseReceipt,
            Some(purchase_number.as_str()),
        )?;

        let purchase_id = PurchaseId::new();
        let detail = insert_purchase(
            &txn,
            NewPurchase {
                id: purchase_id,
                number: &purchase_number,
                supplier_id: input.supplier_id,
                location_id: input.location_id,
                payment_status: PaymentStatus::Unpaid,
                total_cost,
                is_free_issue: false,
                note: input.note,
                lines: &input.lines,
            },
            actor,
        )
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                StockError::Duplicate(purchase_number.clone())
            }
            _ => StockError::Database(e.to_string()),
        })?;

        apply_plan(&txn, &plan, Some(purchase_id.into_inner()), actor)
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        info!(%purchase_id, movements = plan.movements.len(), "purchase received");
        Ok(detail)
    }

    /// Moves good stock to damaged.
    ///
    /// # Errors
    ///
    /// Returns `StockError::InsufficientStock` if good stock cannot cover a
    /// product; nothing is written in that case.
    #[instrument(skip(self, lines, reason))]
    pub async fn report_damage(
        &self,
        location_id: LocationId,
        lines: &[DamageLine],
        reason: Option<&str>,
        actor: UserId,
    ) -> Result<Vec<StockPosition>, StockError> {
        let keys = lines.iter().map(|l| (location_id, l.product_id)).collect();
        self.execute(keys, actor, |positions| {
            StockService::damage(location_id, lines, positions, reason)
        })
        .await
    }

    /// Sets good stock to counted quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if a line is negative or repeats a product.
    #[instrument(skip(self, lines, reason))]
    pub async fn adjust(
        &self,
        location_id: LocationId,
        lines: &[AdjustmentLine],
        reason: Option<&str>,
        actor: UserId,
    ) -> Result<Vec<StockPosition>, StockError> {
        let keys = lines.iter().map(|l| (location_id, l.product_id)).collect();
        self.execute(keys, actor, |positions| {
            StockService::adjust(location_id, lines, positions, reason)
        })
        .await
    }

    /// Moves good stock between two locations.
    ///
    /// # Errors
    ///
    /// Returns an error if the locations are equal or the source cannot cover
    /// a product.
    #[instrument(skip(self, lines))]
    pub async fn transfer(
        &self,
        from: LocationId,
        to: LocationId,
        lines: &[TransferLine],
        actor: UserId,
    ) -> Result<Vec<StockPosition>, StockError> {
        let keys = lines
            .iter()
            .flat_map(|l| [(from, l.product_id), (to, l.product_id)])
            .collect();
        self.execute(keys, actor, |positions| {
            StockService::transfer(from, to, lines, positions)
        })
        .await
    }

    /// Gets the stock position of a product at a location.
    ///
    /// A product never stocked at the location has an empty position.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn position(
        &self,
        location_id: LocationId,
        product_id: ProductId,
    ) -> Result<StockPosition, StockError> {
        let row = stock_positions::Entity::find_by_id((
            location_id.into_inner(),
            product_id.into_inner(),
        ))
        .one(&self.db)
        .await
        .map_err(|e| StockError::Database(e.to_string()))?;

        Ok(row.map_or_else(
            || StockPosition::empty(location_id, product_id),
            |row| to_position(&row),
        ))
    }

    /// Lists the movements at a location, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_movements(
        &self,
        location_id: LocationId,
        product_id: Option<ProductId>,
        page: PageRequest,
    ) -> Result<PageResponse<stock_movements::Model>, StockError> {
        let page = page.normalized();
        let mut query = stock_movements::Entity::find()
            .filter(stock_movements::Column::LocationId.eq(location_id.into_inner()));
        if let Some(product_id) = product_id {
            query = query.filter(stock_movements::Column::ProductId.eq(product_id.into_inner()));
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        let movements = query
            .order_by_desc(stock_movements::Column::CreatedAt)
            .order_by_desc(stock_movements::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        Ok(PageResponse::new(movements, page, total))
    }

    async fn execute<F>(
        &self,
        keys: Vec<StockKey>,
        actor: UserId,
        decide: F,
    ) -> Result<Vec<StockPosition>, StockError>
    where
        F: FnOnce(&[StockPosition]) -> Result<StockPlan, StockError>,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        let positions = lock_positions(&txn, keys)
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;
        let plan = decide(&positions)?;

        apply_plan(&txn, &plan, None, actor)
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        info!(movements = plan.movements.len(), "stock updated");
        Ok(plan.positions)
    }
}

/// Fields of a purchase row to insert.
pub(crate) struct NewPurchase<'a> {
    pub id: PurchaseId,
    pub number: &'a str,
    pub supplier_id: SupplierId,
    pub location_id: LocationId,
    pub payment_status: PaymentStatus,
    pub total_cost: Decimal,
    pub is_free_issue: bool,
    pub note: Option<String>,
    pub lines: &'a [PurchaseLineInput],
}

/// Inserts a received purchase and its lines.
pub(crate) async fn insert_purchase<C: ConnectionTrait>(
    conn: &C,
    purchase: NewPurchase<'_>,
    actor: UserId,
) -> Result<PurchaseDetail, DbErr> {
    let row = purchases::ActiveModel {
        id: Set(purchase.id.into_inner()),
        purchase_number: Set(purchase.number.to_string()),
        supplier_id: Set(purchase.supplier_id.into_inner()),
        location_id: Set(purchase.location_id.into_inner()),
        status: Set(PurchaseStatus::Received.into()),
        payment_status: Set(purchase.payment_status.into()),
        total_cost: Set(purchase.total_cost),
        is_free_issue: Set(purchase.is_free_issue),
        note: Set(purchase.note),
        created_by: Set(actor.into_inner()),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;

    let mut lines = Vec::with_capacity(purchase.lines.len());
    for line in purchase.lines {
        let inserted = purchase_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            purchase_id: Set(purchase.id.into_inner()),
            product_id: Set(line.product_id.into_inner()),
            quantity: Set(line.quantity),
            unit_cost: Set(line.unit_cost),
        }
        .insert(conn)
        .await?;
        lines.push(inserted);
    }

    Ok(PurchaseDetail {
        purchase: row,
        lines,
    })
}

/// Reads the positions for the given keys for update, in lock order.
///
/// Keys without a row yet are omitted.
pub(crate) async fn lock_positions<C: ConnectionTrait>(
    conn: &C,
    keys: Vec<StockKey>,
) -> Result<Vec<StockPosition>, DbErr> {
    let mut positions = Vec::new();
    for (location_id, product_id) in StockService::lock_order(keys) {
        let row = stock_positions::Entity::find_by_id((
            location_id.into_inner(),
            product_id.into_inner(),
        ))
        .lock_exclusive()
        .one(conn)
        .await?;
        if let Some(row) = row {
            positions.push(to_position(&row));
        }
    }
    Ok(positions)
}

/// Writes the positions and movements of a plan.
pub(crate) async fn apply_plan<C: ConnectionTrait>(
    conn: &C,
    plan: &StockPlan,
    reference_id: Option<Uuid>,
    actor: UserId,
) -> Result<(), DbErr> {
    let now = Utc::now();

    for position in &plan.positions {
        let key = (
            position.location_id.into_inner(),
            position.product_id.into_inner(),
        );
        match stock_positions::Entity::find_by_id(key).one(conn).await? {
            Some(row) => {
                let mut active: stock_positions::ActiveModel = row.into();
                active.good_quantity = Set(position.good_quantity);
                active.damaged_quantity = Set(position.damaged_quantity);
                active.updated_at = Set(now.into());
                active.update(conn).await?;
            }
            None => {
                stock_positions::ActiveModel {
                    location_id: Set(key.0),
                    product_id: Set(key.1),
                    good_quantity: Set(position.good_quantity),
                    damaged_quantity: Set(position.damaged_quantity),
                    updated_at: Set(now.into()),
                }
                .insert(conn)
                .await?;
            }
        }
    }

    for movement in &plan.movements {
        stock_movements::ActiveModel {
            id: Set(Uuid::now_v7()),
            location_id: Set(movement.location_id.into_inner()),
            product_id: Set(movement.product_id.into_inner()),
            kind: Set(movement.kind.into()),
            good_delta: Set(movement.good_delta),
            damaged_delta: Set(movement.damaged_delta),
            good_after: Set(movement.good_after),
            damaged_after: Set(movement.damaged_after),
            reference_id: Set(reference_id),
            note: Set(movement.note.clone()),
            actor_id: Set(actor.into_inner()),
            created_at: Set(now.into()),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

fn to_position(row: &stock_positions::Model) -> StockPosition {
    StockPosition {
        location_id: LocationId::from_uuid(row.location_id),
        product_id: ProductId::from_uuid(row.product_id),
        good_quantity: row.good_quantity,
        damaged_quantity: row.damaged_quantity,
    }
}
