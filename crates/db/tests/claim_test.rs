//! Integration tests for free-issue claim conversion.

mod common;

use haulbook_core::claim::{ClaimError, ClaimStatus};
use haulbook_core::order::{OrderLineInput, PaymentStatus};
use haulbook_db::repositories::{ConvertClaimsInput, PlaceOrderInput};
use haulbook_db::{ClaimRepository, OrderRepository, StockRepository};
use haulbook_shared::types::{
    BusinessUnitId, CustomerId, LocationId, OrderId, OrderLineId, ProductId, SupplierId, UserId,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;

use common::setup;

async fn order_with_free_goods(
    db: &DatabaseConnection,
    number: &str,
    business_unit_id: BusinessUnitId,
    product_id: ProductId,
    free_quantity: Decimal,
    actor: UserId,
) -> (OrderId, Vec<OrderLineId>) {
    let detail = OrderRepository::new(db.clone())
        .place(
            PlaceOrderInput {
                order_number: number.to_string(),
                customer_id: CustomerId::new(),
                business_unit_id,
                invoice_number: None,
                notes: None,
                lines: vec![
                    OrderLineInput {
                        product_id,
                        quantity: dec!(10),
                        unit_price: dec!(4),
                        free_quantity,
                    },
                    OrderLineInput {
                        product_id: ProductId::new(),
                        quantity: dec!(1),
                        unit_price: dec!(9),
                        free_quantity: Decimal::ZERO,
                    },
                ],
            },
            actor,
        )
        .await
        .expect("Failed to place order");
    let lines = detail
        .lines
        .iter()
        .map(|line| OrderLineId::from_uuid(line.id))
        .collect();
    (OrderId::from_uuid(detail.order.id), lines)
}

// ============================================================================
// Test: Converting claims restocks free goods through a zero-cost purchase
// ============================================================================

#[tokio::test]
async fn test_convert_claims() {
    let db = setup().await;
    let actor = UserId::new();
    let unit = BusinessUnitId::new();
    let soap = ProductId::new();
    let store = LocationId::new();
    let claims = ClaimRepository::new(db.clone());

    let (_, first) = order_with_free_goods(&db, "SO-1", unit, soap, dec!(2), actor).await;
    let (_, second) = order_with_free_goods(&db, "SO-2", unit, soap, dec!(3), actor).await;

    let claimable = claims.list_claimable(Some(unit)).await.expect("claimable");
    assert_eq!(claimable.len(), 2);
    assert!(claimable.iter().all(|c| c.claim_status == ClaimStatus::Unclaimed));

    let purchase = claims
        .convert(
            ConvertClaimsInput {
                line_ids: vec![first[0], second[0]],
                supplier_id: SupplierId::new(),
                location_id: store,
                note: Some("October free issue".to_string()),
            },
            actor,
        )
        .await
        .expect("Failed to convert claims");

    assert!(purchase.purchase.is_free_issue);
    assert!(purchase.purchase.purchase_number.starts_with("FI-"));
    assert_eq!(purchase.purchase.total_cost, Decimal::ZERO);
    assert_eq!(
        PaymentStatus::from(purchase.purchase.payment_status),
        PaymentStatus::Paid
    );
    assert_eq!(purchase.lines.len(), 1);
    assert_eq!(purchase.lines[0].quantity, dec!(5));

    let position = StockRepository::new(db.clone())
        .position(store, soap)
        .await
        .expect("position");
    assert_eq!(position.good_quantity, dec!(5));

    assert!(claims.list_claimable(None).await.expect("claimable").is_empty());
}

// ============================================================================
// Test: A line cannot be claimed twice
// ============================================================================

#[tokio::test]
async fn test_double_conversion_is_rejected() {
    let db = setup().await;
    let actor = UserId::new();
    let unit = BusinessUnitId::new();
    let soap = ProductId::new();
    let store = LocationId::new();
    let claims = ClaimRepository::new(db.clone()).with_prefix("FREE");

    let (_, lines) = order_with_free_goods(&db, "SO-1", unit, soap, dec!(2), actor).await;
    let input = ConvertClaimsInput {
        line_ids: vec![lines[0]],
        supplier_id: SupplierId::new(),
        location_id: store,
        note: None,
    };

    let purchase = claims
        .convert(input.clone(), actor)
        .await
        .expect("Failed to convert claims");
    assert!(purchase.purchase.purchase_number.starts_with("FREE-"));

    let again = claims.convert(input, actor).await;
    match again {
        Err(ClaimError::AlreadyClaimed(line_id)) => assert_eq!(line_id, lines[0]),
        other => panic!("Expected AlreadyClaimed error, got {other:?}"),
    }

    let position = StockRepository::new(db.clone())
        .position(store, soap)
        .await
        .expect("position");
    assert_eq!(position.good_quantity, dec!(2));
}

// ============================================================================
// Test: Lines without free goods or unknown lines are rejected
// ============================================================================

#[tokio::test]
async fn test_invalid_selection() {
    let db = setup().await;
    let actor = UserId::new();
    let claims = ClaimRepository::new(db.clone());

    let (_, lines) = order_with_free_goods(
        &db,
        "SO-1",
        BusinessUnitId::new(),
        ProductId::new(),
        dec!(1),
        actor,
    )
    .await;

    let input = |line_ids: Vec<OrderLineId>| ConvertClaimsInput {
        line_ids,
        supplier_id: SupplierId::new(),
        location_id: LocationId::new(),
        note: None,
    };

    assert!(matches!(
        claims.convert(input(vec![]), actor).await,
        Err(ClaimError::Validation(_))
    ));
    assert!(matches!(
        claims.convert(input(vec![lines[1]]), actor).await,
        Err(ClaimError::Validation(_))
    ));
    assert!(matches!(
        claims.convert(input(vec![OrderLineId::new()]), actor).await,
        Err(ClaimError::NotFound(_))
    ));
}

// ============================================================================
// Test: Lines of a cancelled order cannot be converted
// ============================================================================

#[tokio::test]
async fn test_cancelled_order_lines_are_not_claimable() {
    let db = setup().await;
    let actor = UserId::new();
    let unit = BusinessUnitId::new();
    let claims = ClaimRepository::new(db.clone());
    let store = LocationId::new();
    let rice = ProductId::new();

    let (order_id, lines) = order_with_free_goods(&db, "SO-1", unit, rice, dec!(3), actor).await;
    OrderRepository::new(db.clone())
        .reject(order_id, actor, Some("duplicate order".to_string()))
        .await
        .expect("Failed to reject order");

    let listed = claims.list_claimable(Some(unit)).await.expect("list");
    assert!(listed.is_empty());

    let result = claims
        .convert(
            ConvertClaimsInput {
                line_ids: vec![lines[0]],
                supplier_id: SupplierId::new(),
                location_id: store,
                note: None,
            },
            actor,
        )
        .await;
    assert!(matches!(result, Err(ClaimError::Validation(_))));

    let position = StockRepository::new(db.clone())
        .position(store, rice)
        .await
        .expect("position");
    assert_eq!(position.good_quantity, Decimal::ZERO);
}
