//! Seeds the chart of accounts.

use backoffice_core::ledger::SEED_CHART;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend, Statement};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for entry in SEED_CHART {
            db.execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "INSERT INTO gl_accounts (code, name, account_type) VALUES ($1, $2, $3) \
                 ON CONFLICT (code) DO NOTHING",
                [
                    entry.code.into(),
                    entry.name.into(),
                    entry.account_type.as_str().into(),
                ],
            ))
            .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DELETE FROM gl_accounts a WHERE NOT EXISTS \
             (SELECT 1 FROM gl_journal_lines l WHERE l.account_id = a.id)",
        )
        .await?;
        Ok(())
    }
}
