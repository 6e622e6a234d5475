//! `SeaORM` Entity for accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AccountType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub account_type: AccountType,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub balance: Decimal,
    pub allow_overdraft: bool,
    pub bank_code: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_entries::Entity")]
    AccountEntries,
    #[sea_orm(has_many = "super::cheques::Entity")]
    Cheques,
}

impl Related<super::account_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountEntries.def()
    }
}

impl Related<super::cheques::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cheques.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
