//! Free-issue claim repository.
//!
//! Converting claims creates a zero-cost received purchase, restocks the
//! free quantity and marks every selected line approved, all in one
//! transaction.

use std::collections::HashMap;

use haulbook_core::claim::{ClaimError, ClaimItem, ClaimService, ClaimStatus};
use haulbook_core::order::{OrderStatus, PaymentStatus};
use haulbook_core::stock::{MovementKind, PurchaseLineInput, StockService};
use haulbook_shared::EngineConfig;
use haulbook_shared::types::{
    BusinessUnitId, LocationId, OrderId, OrderLineId, ProductId, PurchaseId, SupplierId, UserId,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::entities::sea_orm_active_enums::{
    ClaimStatus as DbClaimStatus, OrderStatus as DbOrderStatus,
};
use crate::entities::{order_lines, orders};

use super::stock::{self, NewPurchase, PurchaseDetail};

/// Input for converting free-issue claims into a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertClaimsInput {
    /// Order lines to claim.
    pub line_ids: Vec<OrderLineId>,
    /// Supplier granting the free issue.
    pub supplier_id: SupplierId,
    /// Location restocked with the free goods.
    pub location_id: LocationId,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

/// Free-issue claim repository.
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    db: DatabaseConnection,
    prefix: String,
}

impl ClaimRepository {
    /// Creates a new claim repository with the default purchase prefix.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            prefix: EngineConfig::default().claim_purchase_prefix,
        }
    }

    /// Overrides the prefix of generated purchase numbers.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Lists unclaimed free-issue lines of orders that were not cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_claimable(
        &self,
        business_unit_id: Option<BusinessUnitId>,
    ) -> Result<Vec<ClaimItem>, ClaimError> {
        let mut query = order_lines::Entity::find()
            .find_also_related(orders::Entity)
            .filter(order_lines::Column::ClaimStatus.eq(DbClaimStatus::Unclaimed))
            .filter(orders::Column::Status.ne(DbOrderStatus::from(OrderStatus::Cancelled)));
        if let Some(business_unit_id) = business_unit_id {
            query = query.filter(orders::Column::BusinessUnitId.eq(business_unit_id.into_inner()));
        }

        let rows = query
            .order_by_asc(order_lines::Column::OrderId)
            .order_by_asc(order_lines::Column::LineNumber)
            .all(&self.db)
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(line, order)| order.map(|order| to_item(&line, &order)))
            .collect())
    }

    /// Converts unclaimed free-issue lines into one zero-cost purchase.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The selection is empty or repeats a line
    /// - A line is missing, has no free quantity or was already claimed
    /// - A line belongs to a cancelled order
    /// - Database operation fails
    #[instrument(skip(self, input), fields(lines = input.line_ids.len()))]
    pub async fn convert(
        &self,
        input: ConvertClaimsInput,
        actor: UserId,
    ) -> Result<PurchaseDetail, ClaimError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))?;

        let mut ids: Vec<_> = input.line_ids.iter().map(|id| id.into_inner()).collect();
        ids.sort_unstable();
        ids.dedup();

        let lines = order_lines::Entity::find()
            .filter(order_lines::Column::Id.is_in(ids))
            .order_by_asc(order_lines::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))?;

        let order_ids: Vec<_> = lines.iter().map(|line| line.order_id).collect();
        let owners: HashMap<_, _> = orders::Entity::find()
            .filter(orders::Column::Id.is_in(order_ids))
            .all(&txn)
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))?
            .into_iter()
            .map(|order| (order.id, order))
            .collect();

        let items: Vec<ClaimItem> = lines
            .iter()
            .filter_map(|line| owners.get(&line.order_id).map(|order| to_item(line, order)))
            .collect();

        let purchase_id = PurchaseId::new();
        let conversion = ClaimService::plan(&input.line_ids, &items, purchase_id)?;
        let purchase_number = ClaimService::purchase_number(&self.prefix, purchase_id);

        let positions = stock::lock_positions(
            &txn,
            conversion
                .lines
                .iter()
                .map(|(product_id, _)| (input.location_id, *product_id))
                .collect(),
        )
        .await
        .map_err(|e| ClaimError::Database(e.to_string()))?;
        let plan = StockService::receive(
            input.location_id,
            &conversion.lines,
            &positions,
            MovementKind::ClaimConversion,
            Some(purchase_number.as_str()),
        )?;

        let purchase_lines: Vec<PurchaseLineInput> = conversion
            .lines
            .iter()
            .map(|(product_id, quantity)| PurchaseLineInput {
                product_id: *product_id,
                quantity: *quantity,
                unit_cost: Decimal::ZERO,
            })
            .collect();
        let detail = stock::insert_purchase(
            &txn,
            NewPurchase {
                id: purchase_id,
                number: &purchase_number,
                supplier_id: input.supplier_id,
                location_id: input.location_id,
                payment_status: PaymentStatus::Paid,
                total_cost: Decimal::ZERO,
                is_free_issue: true,
                note: input.note,
                lines: &purchase_lines,
            },
            actor,
        )
        .await
        .map_err(|e| ClaimError::Database(e.to_string()))?;

        stock::apply_plan(&txn, &plan, Some(purchase_id.into_inner()), actor)
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))?;

        for line in lines {
            let mut active: order_lines::ActiveModel = line.into();
            active.claim_status = Set(ClaimStatus::Approved.into());
            active.claim_purchase_id = Set(Some(purchase_id.into_inner()));
            active
                .update(&txn)
                .await
                .map_err(|e| ClaimError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))?;

        info!(
            %purchase_id,
            %purchase_number,
            quantity = %conversion.total_quantity(),
            "free-issue claims converted"
        );
        Ok(detail)
    }
}

fn to_item(line: &order_lines::Model, order: &orders::Model) -> ClaimItem {
    ClaimItem {
        line_id: OrderLineId::from_uuid(line.id),
        order_id: OrderId::from_uuid(order.id),
        business_unit_id: BusinessUnitId::from_uuid(order.business_unit_id),
        product_id: ProductId::from_uuid(line.product_id),
        free_quantity: line.free_quantity,
        claim_status: line.claim_status.into(),
        order_cancelled: OrderStatus::from(order.status) == OrderStatus::Cancelled,
    }
}
