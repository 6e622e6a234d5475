//! `SeaORM` Entity for load_orders table.
//!
//! The manifest of a load: rows stay after an order is rescheduled off it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "load_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub load_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_id: Uuid,
    pub position: i32,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub dispatched_amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::loads::Entity",
        from = "Column::LoadId",
        to = "super::loads::Column::Id"
    )]
    Loads,
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Orders,
}

impl Related<super::loads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loads.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
