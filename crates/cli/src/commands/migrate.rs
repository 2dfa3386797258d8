//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! hd-cli migrate
//! ```
//!
//! Applies every migration in `crates/server/migrations/` that has not run
//! yet. The server never migrates on startup.

use super::{ConnectError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the helpdesk migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running helpdesk migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Helpdesk migrations complete!");
    Ok(())
}
