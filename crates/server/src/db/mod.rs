//! Persistence for the helpdesk server.
//!
//! # Schema: `helpdesk`
//!
//! ## Tables
//!
//! - `users` - Customers and admins, with Argon2 password hashes
//! - `tickets` - Support tickets, each owned by one admin
//!
//! Admin load is never stored. It is counted from `tickets` on every
//! ticket creation.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p helpdesk-cli -- migrate
//! ```
//!
//! # Backends
//!
//! Handlers talk to the [`Store`] trait. [`PgStore`] is the production
//! backend; [`MemoryStore`] keeps everything in process for tests and local
//! experiments.

pub mod memory;
pub mod postgres;
pub mod tickets;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use helpdesk_core::{AdminLoad, Email, TicketId, UserId};

use crate::models::{NewTicket, NewUser, Ticket, TicketChanges, TicketDetails, TicketFilter, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use tickets::TicketRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Storage capability used by the auth and ticket services.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity probe for readiness checks.
    async fn health_check(&self) -> Result<(), RepositoryError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Look up a user and their password hash for login.
    async fn get_user_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Insert a user. Fails with `Conflict` if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn admin_exists(&self) -> Result<bool, RepositoryError>;

    /// Every admin with the number of `OPEN` tickets they own, zero included.
    async fn list_admin_loads(&self) -> Result<Vec<AdminLoad>, RepositoryError>;

    /// Insert an `OPEN` ticket and return it with both parties.
    async fn create_ticket(&self, ticket: NewTicket) -> Result<TicketDetails, RepositoryError>;

    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, RepositoryError>;

    /// Tickets matching `filter`, ordered by id.
    async fn list_tickets(
        &self,
        filter: TicketFilter,
    ) -> Result<Vec<TicketDetails>, RepositoryError>;

    /// Apply `changes` and optionally move the ticket to another admin.
    ///
    /// Fails with `NotFound` if the ticket does not exist.
    async fn update_ticket(
        &self,
        id: TicketId,
        changes: TicketChanges,
        reassign_to: Option<UserId>,
    ) -> Result<TicketDetails, RepositoryError>;

    /// Returns `true` if a ticket was removed.
    async fn delete_ticket(&self, id: TicketId) -> Result<bool, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a sqlx error, turning constraint violations into `Conflict`.
fn map_constraint_error(err: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
    {
        return RepositoryError::Conflict(conflict.to_owned());
    }
    RepositoryError::Database(err)
}

/// Parse an email column, reporting bad data as corruption.
fn parse_stored_email(raw: &str) -> Result<Email, RepositoryError> {
    Email::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))
}
