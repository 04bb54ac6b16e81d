//! `SeaORM` Entity for float_accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "float_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub branch_id: Uuid,
    /// cash-in-till | momo | agency-banking | power | e-zwich | jumia
    pub account_type: String,
    pub provider: Option<String>,
    pub account_number: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub current_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub min_threshold: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub max_threshold: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::branches::Entity",
        from = "Column::BranchId",
        to = "super::branches::Column::Id"
    )]
    Branches,
    #[sea_orm(has_many = "super::float_movements::Entity")]
    FloatMovements,
}

impl Related<super::branches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branches.def()
    }
}

impl Related<super::float_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FloatMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
