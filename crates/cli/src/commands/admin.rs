//! Admin account commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin account
//! hd-cli admin create -n "Admin Name" -e admin@example.com -p 'a-long-password'
//!
//! # Print open-ticket load per admin; `*` marks who the next ticket can go to
//! hd-cli admin loads
//! ```

use helpdesk_core::{Role, least_loaded};
use helpdesk_server::db::{PgStore, RepositoryError, Store};
use helpdesk_server::services::auth::{Argon2Hasher, AuthError, create_account};
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Account was rejected (bad input, duplicate email, database failure).
    #[error("Could not create admin: {0}")]
    Account(#[from] AuthError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Create a new admin account.
///
/// # Errors
///
/// Returns `AdminError::Account` if the input is invalid or the email is taken.
pub async fn create(name: &str, email: &str, password: &str) -> Result<(), AdminError> {
    let store = PgStore::new(connect().await?);

    let user = create_account(
        &store,
        &Argon2Hasher::default(),
        name,
        email,
        password,
        Role::Admin,
    )
    .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "Admin account created");
    Ok(())
}

/// Print every admin's open-ticket count.
///
/// # Errors
///
/// Returns `AdminError::Repository` if the store cannot be read.
pub async fn loads() -> Result<(), AdminError> {
    let store = PgStore::new(connect().await?);

    let loads = store.list_admin_loads().await?;
    if loads.is_empty() {
        tracing::warn!("No admin accounts exist; ticket creation will fail");
        return Ok(());
    }

    let floor = least_loaded(&loads);
    let mut lines = Vec::with_capacity(loads.len());
    for load in &loads {
        let label = store.get_user(load.admin_id).await?.map_or_else(
            || "(unknown)".to_owned(),
            |user| format!("{} <{}>", user.name, user.email),
        );
        let marker = if floor.contains(&load.admin_id) { "*" } else { " " };
        lines.push(format!(
            "{marker} {:>6}  {:>5}  {label}",
            load.admin_id.as_i32(),
            load.open_tickets
        ));
    }

    #[allow(clippy::print_stdout)]
    {
        println!("  {:>6}  {:>5}  ADMIN", "ID", "OPEN");
        for line in lines {
            println!("{line}");
        }
    }
    Ok(())
}
