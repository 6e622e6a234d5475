//! Initial schema: orders, loads, cheques, accounts, stock and history.
//!
//! Written with the schema builder so the same migration runs on Postgres
//! and on the SQLite databases used by the test suite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_orders(manager).await?;
        create_loads(manager).await?;
        create_accounts(manager).await?;
        create_cheques(manager).await?;
        create_stock(manager).await?;
        create_history(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let tables: [DynIden; 15] = [
            TransitionHistory::Table.into_iden(),
            PurchaseLines::Table.into_iden(),
            Purchases::Table.into_iden(),
            StockMovements::Table.into_iden(),
            StockPositions::Table.into_iden(),
            CustomerBalances::Table.into_iden(),
            Cheques::Table.into_iden(),
            AccountEntries::Table.into_iden(),
            Accounts::Table.into_iden(),
            LoadSequences::Table.into_iden(),
            LoadOrders::Table.into_iden(),
            Loads::Table.into_iden(),
            OrderAmountChanges::Table.into_iden(),
            OrderLines::Table.into_iden(),
            Orders::Table.into_iden(),
        ];
        for table in tables {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn uuid_pk(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().primary_key().to_owned()
}

fn uuid(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn uuid_null(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).uuid().null().to_owned()
}

fn money(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).decimal_len(16, 4).not_null().to_owned()
}

fn text(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).string().not_null().to_owned()
}

fn text_null(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).string().null().to_owned()
}

fn timestamp(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn date_null(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).date().null().to_owned()
}

async fn create_orders(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Orders::Table)
                .if_not_exists()
                .col(uuid_pk(Orders::Id))
                .col(text(Orders::OrderNumber).unique_key().to_owned())
                .col(text_null(Orders::InvoiceNumber))
                .col(uuid(Orders::CustomerId))
                .col(uuid(Orders::BusinessUnitId))
                .col(text(Orders::Status))
                .col(text(Orders::PaymentStatus))
                .col(money(Orders::TotalAmount))
                .col(ColumnDef::new(Orders::DispatchedAmount).decimal_len(16, 4).null())
                .col(uuid_null(Orders::LoadId))
                .col(text_null(Orders::Notes))
                .col(ColumnDef::new(Orders::Version).integer().not_null().default(1))
                .col(uuid(Orders::CreatedBy))
                .col(timestamp(Orders::CreatedAt))
                .col(timestamp(Orders::UpdatedAt))
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_orders_load")
                .table(Orders::Table)
                .col(Orders::LoadId)
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(OrderLines::Table)
                .if_not_exists()
                .col(uuid_pk(OrderLines::Id))
                .col(uuid(OrderLines::OrderId))
                .col(ColumnDef::new(OrderLines::LineNumber).integer().not_null())
                .col(uuid(OrderLines::ProductId))
                .col(money(OrderLines::Quantity))
                .col(money(OrderLines::UnitPrice))
                .col(money(OrderLines::FreeQuantity))
                .col(text(OrderLines::ClaimStatus))
                .col(uuid_null(OrderLines::ClaimPurchaseId))
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_order_lines_order")
                        .from(OrderLines::Table, OrderLines::OrderId)
                        .to(Orders::Table, Orders::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_order_lines_claim_status")
                .table(OrderLines::Table)
                .col(OrderLines::ClaimStatus)
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(OrderAmountChanges::Table)
                .if_not_exists()
                .col(uuid_pk(OrderAmountChanges::Id))
                .col(uuid(OrderAmountChanges::OrderId))
                .col(text(OrderAmountChanges::Kind))
                .col(money(OrderAmountChanges::Amount))
                .col(uuid(OrderAmountChanges::ActorId))
                .col(timestamp(OrderAmountChanges::RecordedAt))
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_order_amount_changes_order")
                        .from(OrderAmountChanges::Table, OrderAmountChanges::OrderId)
                        .to(Orders::Table, Orders::Id),
                )
                .to_owned(),
        )
        .await
}

async fn create_loads(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Loads::Table)
                .if_not_exists()
                .col(uuid_pk(Loads::Id))
                .col(text(Loads::LoadNumber).unique_key().to_owned())
                .col(uuid(Loads::BusinessUnitId))
                .col(uuid(Loads::VehicleId))
                .col(uuid(Loads::ResponsiblePersonId))
                .col(uuid_null(Loads::HelperId))
                .col(ColumnDef::new(Loads::LoadDate).date().not_null())
                .col(ColumnDef::new(Loads::IsOpen).boolean().not_null().default(true))
                .col(uuid(Loads::CreatedBy))
                .col(timestamp(Loads::CreatedAt))
                .col(
                    ColumnDef::new(Loads::ClosedAt)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(LoadOrders::Table)
                .if_not_exists()
                .col(uuid(LoadOrders::LoadId))
                .col(uuid(LoadOrders::OrderId))
                .col(ColumnDef::new(LoadOrders::Position).integer().not_null())
                .col(money(LoadOrders::DispatchedAmount))
                .primary_key(
                    Index::create()
                        .col(LoadOrders::LoadId)
                        .col(LoadOrders::OrderId),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_load_orders_load")
                        .from(LoadOrders::Table, LoadOrders::LoadId)
                        .to(Loads::Table, Loads::Id),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_load_orders_order")
                        .from(LoadOrders::Table, LoadOrders::OrderId)
                        .to(Orders::Table, Orders::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(LoadSequences::Table)
                .if_not_exists()
                .col(uuid_pk(LoadSequences::BusinessUnitId))
                .col(
                    ColumnDef::new(LoadSequences::LastValue)
                        .big_integer()
                        .not_null(),
                )
                .to_owned(),
        )
        .await
}

async fn create_accounts(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Accounts::Table)
                .if_not_exists()
                .col(uuid_pk(Accounts::Id))
                .col(text(Accounts::Name))
                .col(text(Accounts::AccountType))
                .col(money(Accounts::Balance))
                .col(
                    ColumnDef::new(Accounts::AllowOverdraft)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(text_null(Accounts::BankCode))
                .col(timestamp(Accounts::CreatedAt))
                .col(timestamp(Accounts::UpdatedAt))
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(AccountEntries::Table)
                .if_not_exists()
                .col(uuid_pk(AccountEntries::Id))
                .col(uuid(AccountEntries::AccountId))
                .col(text(AccountEntries::Kind))
                .col(money(AccountEntries::Amount))
                .col(money(AccountEntries::BalanceAfter))
                .col(uuid_null(AccountEntries::TransferId))
                .col(uuid_null(AccountEntries::ChequeId))
                .col(ColumnDef::new(AccountEntries::EntryDate).date().not_null())
                .col(text_null(AccountEntries::Note))
                .col(uuid(AccountEntries::ActorId))
                .col(timestamp(AccountEntries::CreatedAt))
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_account_entries_account")
                        .from(AccountEntries::Table, AccountEntries::AccountId)
                        .to(Accounts::Table, Accounts::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_account_entries_account")
                .table(AccountEntries::Table)
                .col(AccountEntries::AccountId)
                .col(AccountEntries::CreatedAt)
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_account_entries_cheque")
                .table(AccountEntries::Table)
                .col(AccountEntries::ChequeId)
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(CustomerBalances::Table)
                .if_not_exists()
                .col(uuid_pk(CustomerBalances::CustomerId))
                .col(money(CustomerBalances::Outstanding))
                .col(timestamp(CustomerBalances::UpdatedAt))
                .to_owned(),
        )
        .await
}

async fn create_cheques(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Cheques::Table)
                .if_not_exists()
                .col(uuid_pk(Cheques::Id))
                .col(uuid(Cheques::PaymentId))
                .col(text(Cheques::ChequeNumber))
                .col(money(Cheques::Amount))
                .col(ColumnDef::new(Cheques::ChequeDate).date().not_null())
                .col(text(Cheques::Status))
                .col(uuid_null(Cheques::DepositAccountId))
                .col(uuid(Cheques::CustomerId))
                .col(uuid_null(Cheques::OrderId))
                .col(date_null(Cheques::DepositedOn))
                .col(date_null(Cheques::ClearedOn))
                .col(date_null(Cheques::ReturnedOn))
                .col(text_null(Cheques::ReturnReason))
                .col(timestamp(Cheques::CreatedAt))
                .col(timestamp(Cheques::UpdatedAt))
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_cheques_deposit_account")
                        .from(Cheques::Table, Cheques::DepositAccountId)
                        .to(Accounts::Table, Accounts::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_cheques_payment_number")
                .table(Cheques::Table)
                .col(Cheques::PaymentId)
                .col(Cheques::ChequeNumber)
                .unique()
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_cheques_order")
                .table(Cheques::Table)
                .col(Cheques::OrderId)
                .to_owned(),
        )
        .await
}

async fn create_stock(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(StockPositions::Table)
                .if_not_exists()
                .col(uuid(StockPositions::LocationId))
                .col(uuid(StockPositions::ProductId))
                .col(money(StockPositions::GoodQuantity))
                .col(money(StockPositions::DamagedQuantity))
                .col(timestamp(StockPositions::UpdatedAt))
                .primary_key(
                    Index::create()
                        .col(StockPositions::LocationId)
                        .col(StockPositions::ProductId),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(StockMovements::Table)
                .if_not_exists()
                .col(uuid_pk(StockMovements::Id))
                .col(uuid(StockMovements::LocationId))
                .col(uuid(StockMovements::ProductId))
                .col(text(StockMovements::Kind))
                .col(money(StockMovements::GoodDelta))
                .col(money(StockMovements::DamagedDelta))
                .col(money(StockMovements::GoodAfter))
                .col(money(StockMovements::DamagedAfter))
                .col(uuid_null(StockMovements::ReferenceId))
                .col(text_null(StockMovements::Note))
                .col(uuid(StockMovements::ActorId))
                .col(timestamp(StockMovements::CreatedAt))
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_stock_movements_position")
                .table(StockMovements::Table)
                .col(StockMovements::LocationId)
                .col(StockMovements::ProductId)
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(Purchases::Table)
                .if_not_exists()
                .col(uuid_pk(Purchases::Id))
                .col(text(Purchases::PurchaseNumber).unique_key().to_owned())
                .col(uuid(Purchases::SupplierId))
                .col(uuid(Purchases::LocationId))
                .col(text(Purchases::Status))
                .col(text(Purchases::PaymentStatus))
                .col(money(Purchases::TotalCost))
                .col(
                    ColumnDef::new(Purchases::IsFreeIssue)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(text_null(Purchases::Note))
                .col(uuid(Purchases::CreatedBy))
                .col(timestamp(Purchases::CreatedAt))
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(PurchaseLines::Table)
                .if_not_exists()
                .col(uuid_pk(PurchaseLines::Id))
                .col(uuid(PurchaseLines::PurchaseId))
                .col(uuid(PurchaseLines::ProductId))
                .col(money(PurchaseLines::Quantity))
                .col(money(PurchaseLines::UnitCost))
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_purchase_lines_purchase")
                        .from(PurchaseLines::Table, PurchaseLines::PurchaseId)
                        .to(Purchases::Table, Purchases::Id),
                )
                .to_owned(),
        )
        .await
}

async fn create_history(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(TransitionHistory::Table)
                .if_not_exists()
                .col(uuid_pk(TransitionHistory::Id))
                .col(text(TransitionHistory::EntityKind))
                .col(uuid(TransitionHistory::EntityId))
                .col(text(TransitionHistory::PreviousState))
                .col(text(TransitionHistory::NewState))
                .col(uuid(TransitionHistory::ActorId))
                .col(text_null(TransitionHistory::Reason))
                .col(timestamp(TransitionHistory::OccurredAt))
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_transition_history_entity")
                .table(TransitionHistory::Table)
                .col(TransitionHistory::EntityKind)
                .col(TransitionHistory::EntityId)
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderNumber,
    InvoiceNumber,
    CustomerId,
    BusinessUnitId,
    Status,
    PaymentStatus,
    TotalAmount,
    DispatchedAmount,
    LoadId,
    Notes,
    Version,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderLines {
    Table,
    Id,
    OrderId,
    LineNumber,
    ProductId,
    Quantity,
    UnitPrice,
    FreeQuantity,
    ClaimStatus,
    ClaimPurchaseId,
}

#[derive(DeriveIden)]
enum OrderAmountChanges {
    Table,
    Id,
    OrderId,
    Kind,
    Amount,
    ActorId,
    RecordedAt,
}

#[derive(DeriveIden)]
enum Loads {
    Table,
    Id,
    LoadNumber,
    BusinessUnitId,
    VehicleId,
    ResponsiblePersonId,
    HelperId,
    LoadDate,
    IsOpen,
    CreatedBy,
    CreatedAt,
    ClosedAt,
}

#[derive(DeriveIden)]
enum LoadOrders {
    Table,
    LoadId,
    OrderId,
    Position,
    DispatchedAmount,
}

#[derive(DeriveIden)]
enum LoadSequences {
    Table,
    BusinessUnitId,
    LastValue,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Name,
    AccountType,
    Balance,
    AllowOverdraft,
    BankCode,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AccountEntries {
    Table,
    Id,
    AccountId,
    Kind,
    Amount,
    BalanceAfter,
    TransferId,
    ChequeId,
    EntryDate,
    Note,
    ActorId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CustomerBalances {
    Table,
    CustomerId,
    Outstanding,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Cheques {
    Table,
    Id,
    PaymentId,
    ChequeNumber,
    Amount,
    ChequeDate,
    Status,
    DepositAccountId,
    CustomerId,
    OrderId,
    DepositedOn,
    ClearedOn,
    ReturnedOn,
    ReturnReason,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StockPositions {
    Table,
    LocationId,
    ProductId,
    GoodQuantity,
    DamagedQuantity,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StockMovements {
    Table,
    Id,
    LocationId,
    ProductId,
    Kind,
    GoodDelta,
    DamagedDelta,
    GoodAfter,
    DamagedAfter,
    ReferenceId,
    Note,
    ActorId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Purchases {
    Table,
    Id,
    PurchaseNumber,
    SupplierId,
    LocationId,
    Status,
    PaymentStatus,
    TotalCost,
    IsFreeIssue,
    Note,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PurchaseLines {
    Table,
    Id,
    PurchaseId,
    ProductId,
    Quantity,
    UnitCost,
}

#[derive(DeriveIden)]
enum TransitionHistory {
    Table,
    Id,
    EntityKind,
    EntityId,
    PreviousState,
    NewState,
    ActorId,
    Reason,
    OccurredAt,
}
