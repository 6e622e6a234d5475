//! Integration tests for load creation.
//!
//! Tests load numbering, the all-or-nothing assignment of orders to a load
//! and the guards against loading an order twice.

mod common;

use haulbook_core::history::EntityKind;
use haulbook_core::load::LoadError;
use haulbook_core::order::{OrderError, OrderStatus};
use haulbook_db::{HistoryRepository, LoadRepository, OrderRepository};
use haulbook_shared::types::{BusinessUnitId, CustomerId, OrderId, UserId};
use rust_decimal_macros::dec;

use common::{loading_order, new_load, place_order, setup};

// ============================================================================
// Test: Load numbers are sequential per business unit
// ============================================================================

#[tokio::test]
async fn test_load_numbers_are_sequential_per_business_unit() {
    let db = setup().await;
    let actor = UserId::new();
    let unit_a = BusinessUnitId::new();
    let unit_b = BusinessUnitId::new();
    let repo = LoadRepository::new(db.clone());

    let first = loading_order(&db, "SO-1", unit_a, dec!(100), actor).await;
    let second = loading_order(&db, "SO-2", unit_a, dec!(200), actor).await;
    let other = loading_order(&db, "SO-3", unit_b, dec!(300), actor).await;

    let load_1 = repo
        .create(&[first], new_load(), actor)
        .await
        .expect("Failed to create first load");
    let load_2 = repo
        .create(&[second], new_load(), actor)
        .await
        .expect("Failed to create second load");
    let load_3 = repo
        .create(&[other], new_load(), actor)
        .await
        .expect("Failed to create load for other unit");

    assert_eq!(load_1.load.load_number, "LD-000001");
    assert_eq!(load_2.load.load_number, "LD-000002");
    assert_eq!(load_3.load.load_number, "LD-000001");
    assert!(load_1.load.is_open);
}

// ============================================================================
// Test: Creating a load dispatches every order and snapshots its amount
// ============================================================================

#[tokio::test]
async fn test_create_load_dispatches_orders() {
    let db = setup().await;
    let actor = UserId::new();
    let unit = BusinessUnitId::new();

    let a = loading_order(&db, "SO-A", unit, dec!(10000), actor).await;
    let b = loading_order(&db, "SO-B", unit, dec!(5000), actor).await;

    let detail = LoadRepository::new(db.clone())
        .with_numbering("TRK", 4)
        .create(&[b, a], new_load(), actor)
        .await
        .expect("Failed to create load");

    assert_eq!(detail.load.load_number, "TRK-0001");
    assert_eq!(detail.orders.len(), 2);
    assert_eq!(detail.orders[0].order.id, b.into_inner());
    assert_eq!(detail.orders[0].position, 1);
    assert_eq!(detail.orders[1].dispatched_amount, dec!(10000));

    for entry in &detail.orders {
        assert_eq!(OrderStatus::from(entry.order.status), OrderStatus::InTransit);
        assert_eq!(entry.order.load_id, Some(detail.load.id));
        assert_eq!(entry.order.dispatched_amount, Some(entry.dispatched_amount));
    }

    let history = HistoryRepository::new(db.clone())
        .list(EntityKind::Order, a.into_inner())
        .await
        .expect("Failed to list history");
    let last = history.last().expect("history recorded");
    assert_eq!(last.previous_state, "loading");
    assert_eq!(last.new_state, "in_transit");
}

// ============================================================================
// Test: An order on an open load cannot be loaded again
// ============================================================================

#[tokio::test]
async fn test_order_on_open_load_is_rejected() {
    let db = setup().await;
    let actor = UserId::new();
    let unit = BusinessUnitId::new();
    let repo = LoadRepository::new(db.clone());

    let order_id = loading_order(&db, "SO-1", unit, dec!(100), actor).await;
    let first = repo
        .create(&[order_id], new_load(), actor)
        .await
        .expect("Failed to create load");

    let result = repo.create(&[order_id], new_load(), actor).await;
    match result {
        Err(LoadError::Order(OrderError::AlreadyLoaded { load_id, .. })) => {
            assert_eq!(load_id.into_inner(), first.load.id);
        }
        other => panic!("Expected AlreadyLoaded error, got {other:?}"),
    }
}

// ============================================================================
// Test: One bad order leaves every order of the selection untouched
// ============================================================================

#[tokio::test]
async fn test_create_load_is_all_or_nothing() {
    let db = setup().await;
    let actor = UserId::new();
    let unit = BusinessUnitId::new();

    let ready = loading_order(&db, "SO-1", unit, dec!(100), actor).await;
    let pending = place_order(&db, "SO-2", unit, CustomerId::new(), dec!(50), actor).await;

    let result = LoadRepository::new(db.clone())
        .create(&[ready, pending], new_load(), actor)
        .await;
    assert!(
        matches!(
            result,
            Err(LoadError::Order(OrderError::InvalidTransition { .. }))
        ),
        "Expected InvalidTransition, got {result:?}"
    );

    let order = OrderRepository::new(db.clone())
        .find(ready)
        .await
        .expect("Failed to find order");
    assert_eq!(OrderStatus::from(order.order.status), OrderStatus::Loading);
    assert_eq!(order.order.load_id, None);
    assert_eq!(order.order.dispatched_amount, None);
}

// ============================================================================
// Test: Selection guards
// ============================================================================

#[tokio::test]
async fn test_selection_guards() {
    let db = setup().await;
    let actor = UserId::new();
    let repo = LoadRepository::new(db.clone());

    let a = loading_order(&db, "SO-1", BusinessUnitId::new(), dec!(100), actor).await;
    let b = loading_order(&db, "SO-2", BusinessUnitId::new(), dec!(100), actor).await;

    assert!(matches!(
        repo.create(&[], new_load(), actor).await,
        Err(LoadError::EmptySelection)
    ));
    assert!(matches!(
        repo.create(&[a, a], new_load(), actor).await,
        Err(LoadError::DuplicateOrder(id)) if id == a
    ));
    assert!(matches!(
        repo.create(&[a, b], new_load(), actor).await,
        Err(LoadError::MixedBusinessUnits(_))
    ));
    assert!(matches!(
        repo.create(&[OrderId::new()], new_load(), actor).await,
        Err(LoadError::Order(OrderError::NotFound(_)))
    ));
}
