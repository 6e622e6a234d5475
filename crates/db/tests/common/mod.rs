//! Shared fixtures for repository integration tests.
//!
//! Every test gets its own in-memory `SQLite` database with the full schema
//! applied, so tests never observe each other's rows.

#![allow(dead_code)]

use chrono::NaiveDate;
use haulbook_core::account::AccountType;
use haulbook_core::load::NewLoad;
use haulbook_core::order::OrderLineInput;
use haulbook_db::migration::{Migrator, MigratorTrait};
use haulbook_db::repositories::{OpenAccountInput, PlaceOrderInput};
use haulbook_db::{AccountRepository, OrderRepository};
use haulbook_shared::types::{
    AccountId, BusinessUnitId, CustomerId, OrderId, PersonId, ProductId, UserId, VehicleId,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Opens a fresh in-memory database and runs all migrations.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// A fixed business date.
pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).expect("valid date")
}

/// Places a single-line order whose total is `total`.
pub async fn place_order(
    db: &DatabaseConnection,
    number: &str,
    business_unit_id: BusinessUnitId,
    customer_id: CustomerId,
    total: Decimal,
    actor: UserId,
) -> OrderId {
    let repo = OrderRepository::new(db.clone());
    let detail = repo
        .place(
            PlaceOrderInput {
                order_number: number.to_string(),
                customer_id,
                business_unit_id,
                invoice_number: None,
                notes: None,
                lines: vec![OrderLineInput {
                    product_id: ProductId::new(),
                    quantity: Decimal::ONE,
                    unit_price: total,
                    free_quantity: Decimal::ZERO,
                }],
            },
            actor,
        )
        .await
        .expect("Failed to place order");
    OrderId::from_uuid(detail.order.id)
}

/// Places an order and walks it through approval and quality check.
pub async fn loading_order(
    db: &DatabaseConnection,
    number: &str,
    business_unit_id: BusinessUnitId,
    total: Decimal,
    actor: UserId,
) -> OrderId {
    let order_id = place_order(
        db,
        number,
        business_unit_id,
        CustomerId::new(),
        total,
        actor,
    )
    .await;

    let repo = OrderRepository::new(db.clone());
    repo.approve(order_id, actor)
        .await
        .expect("Failed to approve order");
    repo.send_to_qc(order_id, actor)
        .await
        .expect("Failed to send order to QC");
    repo.pass_qc(order_id, actor, false)
        .await
        .expect("Failed to pass QC");
    order_id
}

/// Load parameters with fresh vehicle and crew.
pub fn new_load() -> NewLoad {
    NewLoad {
        vehicle_id: VehicleId::new(),
        responsible_person_id: PersonId::new(),
        helper_id: None,
        load_date: day(19),
    }
}

/// Opens a bank account without overdraft.
pub async fn open_account(
    db: &DatabaseConnection,
    name: &str,
    opening_balance: Decimal,
    actor: UserId,
) -> AccountId {
    let account = AccountRepository::new(db.clone())
        .open(
            OpenAccountInput {
                name: name.to_string(),
                account_type: AccountType::Current,
                opening_balance,
                allow_overdraft: false,
                bank_code: None,
            },
            actor,
        )
        .await
        .expect("Failed to open account");
    AccountId::from_uuid(account.id)
}
