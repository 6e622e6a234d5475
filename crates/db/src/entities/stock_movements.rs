//! `SeaORM` Entity for stock_movements table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::MovementKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub location_id: Uuid,
    pub product_id: Uuid,
    pub kind: MovementKind,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub good_delta: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub damaged_delta: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub good_after: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub damaged_after: Decimal,
    pub reference_id: Option<Uuid>,
    pub note: Option<String>,
    pub actor_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
