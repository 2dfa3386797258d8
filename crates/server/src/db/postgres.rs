//! `PostgreSQL` implementation of [`Store`].

use async_trait::async_trait;
use sqlx::PgPool;

use helpdesk_core::{AdminLoad, Email, TicketId, UserId};

use super::{RepositoryError, Store, TicketRepository, UserRepository};
use crate::models::{NewTicket, NewUser, Ticket, TicketChanges, TicketDetails, TicketFilter, User};

/// Store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    const fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }

    const fn tickets(&self) -> TicketRepository<'_> {
        TicketRepository::new(&self.pool)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.users().get_by_id(id).await
    }

    async fn get_user_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        self.users().get_with_password(email).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        self.users().create(&user).await
    }

    async fn admin_exists(&self) -> Result<bool, RepositoryError> {
        self.users().admin_exists().await
    }

    async fn list_admin_loads(&self) -> Result<Vec<AdminLoad>, RepositoryError> {
        self.tickets().admin_loads().await
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<TicketDetails, RepositoryError> {
        self.tickets().create(&ticket).await
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, RepositoryError> {
        self.tickets().get_by_id(id).await
    }

    async fn list_tickets(
        &self,
        filter: TicketFilter,
    ) -> Result<Vec<TicketDetails>, RepositoryError> {
        self.tickets().list(filter).await
    }

    async fn update_ticket(
        &self,
        id: TicketId,
        changes: TicketChanges,
        reassign_to: Option<UserId>,
    ) -> Result<TicketDetails, RepositoryError> {
        self.tickets().update(id, &changes, reassign_to).await
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<bool, RepositoryError> {
        self.tickets().delete(id).await
    }
}
