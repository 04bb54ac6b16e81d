//! `SeaORM` Entity for gl_transactions table (journal headers).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "gl_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub source_module: String,
    pub source_transaction_id: Option<Uuid>,
    pub source_transaction_type: String,
    pub description: String,
    /// posted | reversed
    pub status: String,
    pub created_by: Uuid,
    pub branch_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::gl_journal_lines::Entity")]
    GlJournalLines,
}

impl Related<super::gl_journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GlJournalLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
