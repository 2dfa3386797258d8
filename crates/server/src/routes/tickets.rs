//! Ticket handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

use helpdesk_core::TicketId;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::{CreateTicketRequest, TicketChanges, TicketDetails};
use crate::state::AppState;

/// File a ticket. The owning admin is chosen by least open load.
///
/// `POST /api/tickets`
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketDetails>)> {
    let mut rng = StdRng::from_os_rng();
    let ticket = state
        .tickets()
        .create(user, &body.subject, &body.description, &mut rng)
        .await?;

    let ticket_id = ticket.ticket.id.to_string();
    add_breadcrumb("tickets", "Created ticket", Some(&[("ticket_id", ticket_id.as_str())]));
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// `GET /api/tickets`
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<TicketDetails>>> {
    Ok(Json(state.tickets().list(user).await?))
}

/// `PATCH /api/tickets/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<TicketId>,
    Json(changes): Json<TicketChanges>,
) -> Result<Json<TicketDetails>> {
    Ok(Json(state.tickets().update(user, id, changes).await?))
}

/// `DELETE /api/tickets/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<TicketId>,
) -> Result<StatusCode> {
    state.tickets().delete(user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
