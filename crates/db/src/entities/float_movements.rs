//! `SeaORM` Entity for float_movements table (append-only).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "float_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub float_account_id: Uuid,
    pub transaction_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub delta: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub balance_before: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub balance_after: Decimal,
    pub memo: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::float_accounts::Entity",
        from = "Column::FloatAccountId",
        to = "super::float_accounts::Column::Id"
    )]
    FloatAccounts,
}

impl Related<super::float_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FloatAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
