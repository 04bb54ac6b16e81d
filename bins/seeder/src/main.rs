//! Demo data seeder for development and manual testing.
//!
//! Seeds one branch, one user per role, a float account per rail and an
//! E-Zwich card batch. The chart of accounts is seeded by the migrations,
//! so run `migrator up` first. Re-running skips anything already present.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use backoffice_core::auth::{UserRole, hash_password};
use backoffice_core::batch::{BatchError, NewCardBatch};
use backoffice_core::float::{FloatAccountType, FloatError, NewFloatAccount};
use backoffice_db::{
    BatchRepository, BranchRepository, FloatAccountRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

const BRANCH_CODE: &str = "ACC-01";
const DEMO_PASSWORD: &str = "ChangeMe123!";

/// `(email, full name, role)` for the demo staff.
const STAFF: [(&str, &str, UserRole); 5] = [
    ("admin@backoffice.local", "Ama Admin", UserRole::Admin),
    ("finance@backoffice.local", "Kofi Finance", UserRole::Finance),
    ("manager@backoffice.local", "Esi Manager", UserRole::Manager),
    ("ops@backoffice.local", "Yaw Operations", UserRole::Operations),
    ("cashier@backoffice.local", "Akua Cashier", UserRole::Cashier),
];

/// `(type, provider, opening balance, min, max)` for the demo floats.
const FLOATS: [(FloatAccountType, Option<&str>, i64, i64, i64); 6] = [
    (FloatAccountType::CashInTill, None, 5_000, 1_000, 20_000),
    (FloatAccountType::Momo, Some("MTN"), 2_000, 500, 10_000),
    (FloatAccountType::AgencyBanking, Some("GCB"), 3_000, 500, 15_000),
    (FloatAccountType::Power, Some("ECG"), 1_500, 300, 5_000),
    (FloatAccountType::EZwich, None, 0, 0, 0),
    (FloatAccountType::Jumia, None, 0, 0, 0),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = backoffice_db::connect(&database_url)
        .await
        .context("failed to connect to database")?;

    println!("Seeding branch...");
    let branch_id = seed_branch(&db).await?;

    println!("Seeding staff...");
    let admin_id = seed_staff(&db, branch_id).await?;

    println!("Seeding float accounts...");
    seed_floats(&db, branch_id, admin_id).await?;

    println!("Seeding E-Zwich card batch...");
    seed_batch(&db, branch_id).await?;

    println!("Seeding complete! Demo password for every user: {DEMO_PASSWORD}");
    Ok(())
}

async fn seed_branch(db: &DatabaseConnection) -> anyhow::Result<Uuid> {
    let repo = BranchRepository::new(db.clone());
    if let Some(branch) = repo.find_by_code(BRANCH_CODE).await? {
        println!("  Branch {BRANCH_CODE} already exists, skipping...");
        return Ok(branch.id);
    }
    let branch = repo.create(BRANCH_CODE, "Accra Central").await?;
    println!("  Created branch: {} ({})", branch.name, branch.id);
    Ok(branch.id)
}

/// Returns the admin's user ID.
async fn seed_staff(db: &DatabaseConnection, branch_id: Uuid) -> anyhow::Result<Uuid> {
    let repo = UserRepository::new(db.clone());
    let password_hash = hash_password(DEMO_PASSWORD).context("failed to hash demo password")?;
    let mut admin_id = None;

    for (email, full_name, role) in STAFF {
        let user = if let Some(existing) = repo.find_by_email(email).await? {
            println!("  {email} already exists, skipping...");
            existing
        } else {
            let created = repo
                .create(branch_id, email, full_name, &password_hash, role)
                .await?;
            println!("  Created {role}: {email}");
            created
        };
        if role == UserRole::Admin {
            admin_id = Some(user.id);
        }
    }

    admin_id.context("admin user missing after seeding")
}

async fn seed_floats(
    db: &DatabaseConnection,
    branch_id: Uuid,
    created_by: Uuid,
) -> anyhow::Result<()> {
    let repo = FloatAccountRepository::new(db.clone());

    for (account_type, provider, opening, min, max) in FLOATS {
        let input = NewFloatAccount {
            branch_id,
            account_type,
            provider: provider.map(str::to_string),
            account_number: None,
            min_threshold: Decimal::from(min),
            max_threshold: Decimal::from(max),
            opening_balance: Decimal::from(opening),
        };
        match repo.create(input, created_by).await {
            Ok(account) => println!(
                "  Created {account_type} float with balance {}",
                account.current_balance
            ),
            Err(FloatError::Duplicate { .. }) => {
                println!("  {account_type} float already exists, skipping...");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

async fn seed_batch(db: &DatabaseConnection, branch_id: Uuid) -> anyhow::Result<()> {
    let repo = BatchRepository::new(db.clone());
    let input = NewCardBatch {
        branch_id,
        batch_code: "EZ-DEMO-001".to_string(),
        quantity_received: 100,
        card_type: "standard".to_string(),
        unit_cost: Decimal::from(15),
        received_date: Utc::now().date_naive(),
        notes: Some("Seeded demo batch".to_string()),
    };
    match repo.create(input).await {
        Ok(batch) => println!("  Created batch {} with {} cards", batch.batch_code, batch.quantity_received),
        Err(BatchError::Duplicate(code)) => println!("  Batch {code} already exists, skipping..."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
