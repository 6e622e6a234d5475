//! `SeaORM` entity definitions.

pub mod account_entries;
pub mod accounts;
pub mod cheques;
pub mod customer_balances;
pub mod load_orders;
pub mod load_sequences;
pub mod loads;
pub mod order_amount_changes;
pub mod order_lines;
pub mod orders;
pub mod purchase_lines;
pub mod purchases;
pub mod sea_orm_active_enums;
pub mod stock_movements;
pub mod stock_positions;
pub mod transition_history;
