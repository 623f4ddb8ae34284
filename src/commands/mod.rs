//! CLI command implementations.

pub mod clients;
pub mod invoices;

use crate::config::Settings;
use crate::error::AppError;
use crate::services::Database;

/// Open the configured database and bring its schema up to date.
pub(crate) async fn open_store(settings: &Settings) -> Result<Database, AppError> {
    let db = Database::new(&settings.storage.db_path).await?;
    db.run_migrations().await?;
    Ok(db)
}

/// `init`: create the database file and run migrations. Idempotent.
pub async fn run_init(settings: &Settings) -> Result<(), AppError> {
    let db = open_store(settings).await?;
    db.health_check().await?;
    println!(
        "Database initialized at {}.",
        settings.storage.db_path.display()
    );
    Ok(())
}
