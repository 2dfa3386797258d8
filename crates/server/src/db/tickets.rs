//! Ticket repository for database operations.
//!
//! Every read that feeds an API response joins `users` twice so the
//! customer and the assigned admin come back with the ticket.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use helpdesk_core::{AdminLoad, TicketId, TicketStatus, UserId};

use super::{RepositoryError, map_constraint_error, parse_stored_email};
use crate::models::{
    NewTicket, PartySummary, Ticket, TicketChanges, TicketDetails, TicketFilter,
};

const DETAIL_SELECT: &str = r"
    SELECT t.id, t.subject, t.description, t.status::text AS status, t.customer_id, t.admin_id,
           t.created_at, t.updated_at,
           c.name AS customer_name, c.email AS customer_email,
           a.name AS admin_name, a.email AS admin_email
    FROM t
    JOIN helpdesk.users c ON c.id = t.customer_id
    JOIN helpdesk.users a ON a.id = t.admin_id
";

#[derive(Debug, sqlx::FromRow)]
struct TicketRow {
    id: TicketId,
    subject: String,
    description: String,
    status: String,
    customer_id: UserId,
    admin_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = RepositoryError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            subject: row.subject,
            description: row.description,
            status: row
                .status
                .parse::<TicketStatus>()
                .map_err(RepositoryError::DataCorruption)?,
            customer_id: row.customer_id,
            admin_id: row.admin_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TicketDetailsRow {
    #[sqlx(flatten)]
    ticket: TicketRow,
    customer_name: String,
    customer_email: String,
    admin_name: String,
    admin_email: String,
}

impl TryFrom<TicketDetailsRow> for TicketDetails {
    type Error = RepositoryError;

    fn try_from(row: TicketDetailsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            ticket: row.ticket.try_into()?,
            customer: PartySummary {
                name: row.customer_name,
                email: parse_stored_email(&row.customer_email)?,
            },
            admin: PartySummary {
                name: row.admin_name,
                email: parse_stored_email(&row.admin_email)?,
            },
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminLoadRow {
    admin_id: UserId,
    open_tickets: i64,
}

impl TryFrom<AdminLoadRow> for AdminLoad {
    type Error = RepositoryError;

    fn try_from(row: AdminLoadRow) -> Result<Self, Self::Error> {
        let open_tickets = u64::try_from(row.open_tickets).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative open ticket count for admin {}",
                row.admin_id
            ))
        })?;
        Ok(Self::new(row.admin_id, open_tickets))
    }
}

/// Repository for ticket database operations.
pub struct TicketRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TicketRepository<'a> {
    /// Create a new ticket repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count `OPEN` tickets per admin, including admins with none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn admin_loads(&self) -> Result<Vec<AdminLoad>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminLoadRow>(
            r"
            SELECT u.id AS admin_id, COUNT(t.id) AS open_tickets
            FROM helpdesk.users u
            LEFT JOIN helpdesk.tickets t
                   ON t.admin_id = u.id AND t.status = 'OPEN'
            WHERE u.role = 'ADMIN'
            GROUP BY u.id
            ORDER BY u.id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(AdminLoad::try_from).collect()
    }

    /// Insert a new `OPEN` ticket.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the customer or admin does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, ticket: &NewTicket) -> Result<TicketDetails, RepositoryError> {
        let row = sqlx::query_as::<_, TicketDetailsRow>(&format!(
            r"
            WITH t AS (
                INSERT INTO helpdesk.tickets (subject, description, customer_id, admin_id)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            {DETAIL_SELECT}
            "
        ))
        .bind(&ticket.subject)
        .bind(&ticket.description)
        .bind(ticket.customer_id)
        .bind(ticket.admin_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "ticket party does not exist"))?;

        TicketDetails::try_from(row)
    }

    /// Get a ticket by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: TicketId) -> Result<Option<Ticket>, RepositoryError> {
        let row = sqlx::query_as::<_, TicketRow>(
            r"
            SELECT id, subject, description, status::text AS status, customer_id, admin_id,
                   created_at, updated_at
            FROM helpdesk.tickets
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Ticket::try_from).transpose()
    }

    /// List tickets with their parties, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a party email is invalid.
    pub async fn list(&self, filter: TicketFilter) -> Result<Vec<TicketDetails>, RepositoryError> {
        let customer = match filter {
            TicketFilter::All => None,
            TicketFilter::Customer(id) => Some(id),
        };

        let rows = sqlx::query_as::<_, TicketDetailsRow>(&format!(
            r"
            WITH t AS (
                SELECT * FROM helpdesk.tickets
                WHERE $1::int4 IS NULL OR customer_id = $1
            )
            {DETAIL_SELECT}
            ORDER BY t.id
            "
        ))
        .bind(customer)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TicketDetails::try_from).collect()
    }

    /// Apply a partial update, optionally handing the ticket to another admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ticket does not exist.
    /// Returns `RepositoryError::Conflict` if `reassign_to` is not a user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: TicketId,
        changes: &TicketChanges,
        reassign_to: Option<UserId>,
    ) -> Result<TicketDetails, RepositoryError> {
        let row = sqlx::query_as::<_, TicketDetailsRow>(&format!(
            r"
            WITH t AS (
                UPDATE helpdesk.tickets
                SET subject = COALESCE($2, subject),
                    description = COALESCE($3, description),
                    status = COALESCE($4::helpdesk.ticket_status, status),
                    admin_id = COALESCE($5, admin_id),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            {DETAIL_SELECT}
            "
        ))
        .bind(id)
        .bind(changes.subject.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.status.map(TicketStatus::as_str))
        .bind(reassign_to)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "assigned admin does not exist"))?
        .ok_or(RepositoryError::NotFound)?;

        TicketDetails::try_from(row)
    }

    /// Delete a ticket. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: TicketId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM helpdesk.tickets WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
