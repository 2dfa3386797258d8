//! Business logic services.

pub mod auth;
pub mod bootstrap;
pub mod tickets;

pub use auth::{AuthError, AuthService};
pub use bootstrap::{BootstrapOutcome, ensure_default_admin};
pub use tickets::{TicketError, TicketService};
