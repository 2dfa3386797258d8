//! Ticket workflow.
//!
//! Ticket creation is the only caller of the assignment policy: it reads
//! the current admin loads from the store, picks an owner, and inserts the
//! ticket. The read and the insert are not locked together, so two
//! simultaneous creations can land on the same admin.

use rand::Rng;
use thiserror::Error;

use helpdesk_core::{TicketId, select_admin};

use crate::db::{RepositoryError, Store};
use crate::models::{CurrentUser, NewTicket, TicketChanges, TicketDetails, TicketFilter};

/// Errors that can occur during ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Only customers file tickets.
    #[error("only customers can create tickets")]
    OnlyCustomers,

    /// Customer touched a ticket that is not theirs.
    #[error("access denied")]
    AccessDenied,

    /// Ticket does not exist.
    #[error("ticket not found")]
    NotFound,

    /// Request body failed validation.
    #[error("{0}")]
    Validation(String),

    /// No admin exists to own a new ticket.
    #[error("no admin available")]
    NoAdminAvailable,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<helpdesk_core::NoAdminAvailable> for TicketError {
    fn from(_: helpdesk_core::NoAdminAvailable) -> Self {
        Self::NoAdminAvailable
    }
}

/// Ticket service.
pub struct TicketService<'a> {
    store: &'a dyn Store,
}

impl<'a> TicketService<'a> {
    /// Create a new ticket service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// File a ticket and assign it to a least-loaded admin.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::OnlyCustomers` if the caller is an admin.
    /// Returns `TicketError::Validation` for a blank subject or description.
    /// Returns `TicketError::NoAdminAvailable` if there are no admins; nothing is stored.
    pub async fn create<R>(
        &self,
        user: CurrentUser,
        subject: &str,
        description: &str,
        rng: &mut R,
    ) -> Result<TicketDetails, TicketError>
    where
        R: Rng + Send + ?Sized,
    {
        if user.is_admin() {
            return Err(TicketError::OnlyCustomers);
        }
        let subject = required("subject", subject)?;
        let description = required("description", description)?;

        let loads = self.store.list_admin_loads().await?;
        let admin_id = select_admin(&loads, rng).map_err(|e| {
            tracing::warn!(customer_id = %user.id, "Ticket rejected: no admin available");
            TicketError::from(e)
        })?;

        let min_load = loads.iter().map(|l| l.open_tickets).min().unwrap_or_default();
        let floor = loads.iter().filter(|l| l.open_tickets == min_load).count();

        let created = self
            .store
            .create_ticket(NewTicket {
                subject,
                description,
                customer_id: user.id,
                admin_id,
            })
            .await?;

        tracing::info!(
            ticket_id = %created.ticket.id,
            customer_id = %user.id,
            admin_id = %admin_id,
            admins = loads.len(),
            floor_size = floor,
            min_load,
            "Assigned ticket"
        );

        Ok(created)
    }

    /// Tickets visible to the caller: all for admins, own for customers.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::Repository` if the store fails.
    pub async fn list(&self, user: CurrentUser) -> Result<Vec<TicketDetails>, TicketError> {
        let filter = if user.is_admin() {
            TicketFilter::All
        } else {
            TicketFilter::Customer(user.id)
        };

        Ok(self.store.list_tickets(filter).await?)
    }

    /// Apply a partial update.
    ///
    /// An admin who updates a ticket becomes its owner. Moving a ticket back
    /// to `OPEN` keeps the current owner; assignment only runs on creation.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::NotFound` for an unknown id.
    /// Returns `TicketError::AccessDenied` if a customer targets someone else's ticket.
    /// Returns `TicketError::Validation` for a blank subject or description.
    pub async fn update(
        &self,
        user: CurrentUser,
        id: TicketId,
        mut changes: TicketChanges,
    ) -> Result<TicketDetails, TicketError> {
        self.authorize(user, id).await?;

        if let Some(subject) = changes.subject.take() {
            changes.subject = Some(required("subject", &subject)?);
        }
        if let Some(description) = changes.description.take() {
            changes.description = Some(required("description", &description)?);
        }

        let reassign_to = user.is_admin().then_some(user.id);
        let updated = self
            .store
            .update_ticket(id, changes, reassign_to)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => TicketError::NotFound,
                other => TicketError::Repository(other),
            })?;

        tracing::info!(
            ticket_id = %id,
            user_id = %user.id,
            status = %updated.ticket.status,
            admin_id = %updated.ticket.admin_id,
            "Updated ticket"
        );
        Ok(updated)
    }

    /// Delete a ticket.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::NotFound` for an unknown id.
    /// Returns `TicketError::AccessDenied` if a customer targets someone else's ticket.
    pub async fn delete(&self, user: CurrentUser, id: TicketId) -> Result<(), TicketError> {
        self.authorize(user, id).await?;

        if !self.store.delete_ticket(id).await? {
            return Err(TicketError::NotFound);
        }

        tracing::info!(ticket_id = %id, user_id = %user.id, "Deleted ticket");
        Ok(())
    }

    /// Admins may touch any ticket; customers only their own.
    async fn authorize(&self, user: CurrentUser, id: TicketId) -> Result<(), TicketError> {
        let ticket = self
            .store
            .get_ticket(id)
            .await?
            .ok_or(TicketError::NotFound)?;

        if !user.is_admin() && ticket.customer_id != user.id {
            return Err(TicketError::AccessDenied);
        }
        Ok(())
    }
}

fn required(field: &str, value: &str) -> Result<String, TicketError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TicketError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}
