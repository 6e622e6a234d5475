//! `SeaORM` Entity for loads table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub load_number: String,
    pub business_unit_id: Uuid,
    pub vehicle_id: Uuid,
    pub responsible_person_id: Uuid,
    pub helper_id: Option<Uuid>,
    pub load_date: Date,
    pub is_open: bool,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub closed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::load_orders::Entity")]
    LoadOrders,
}

impl Related<super::load_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoadOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
