//! Ticket domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use helpdesk_core::{Email, TicketId, TicketStatus, UserId};

/// A support ticket.
///
/// `admin_id` is set when the ticket is created and only changes when an
/// admin updates the ticket and takes it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub customer_id: UserId,
    pub admin_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Name and email of a ticket party, embedded in API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySummary {
    pub name: String,
    pub email: Email,
}

/// A ticket together with its customer and assigned admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetails {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub customer: PartySummary,
    pub admin: PartySummary,
}

/// Insert payload for a ticket whose admin has already been chosen.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
    pub customer_id: UserId,
    pub admin_id: UserId,
}

/// Partial ticket update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketChanges {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TicketStatus>,
}

/// Which tickets a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketFilter {
    /// Every ticket (admin view).
    All,
    /// Only tickets filed by this customer.
    Customer(UserId),
}

impl TicketFilter {
    #[must_use]
    pub fn matches(self, ticket: &Ticket) -> bool {
        match self {
            Self::All => true,
            Self::Customer(id) => ticket.customer_id == id,
        }
    }
}

/// `POST /api/tickets` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub subject: String,
    pub description: String,
}
