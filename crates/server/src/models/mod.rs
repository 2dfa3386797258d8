//! Domain models for the helpdesk server.
//!
//! Domain types are kept separate from database row types; repositories map
//! rows into these after validating them.

pub mod ticket;
pub mod user;

pub use ticket::{
    CreateTicketRequest, NewTicket, PartySummary, Ticket, TicketChanges, TicketDetails,
    TicketFilter,
};
pub use user::{AuthResponse, CurrentUser, LoginRequest, NewUser, RegisterRequest, User, UserProfile};
