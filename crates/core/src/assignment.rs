//! Least-loaded admin assignment.
//!
//! Every new ticket is bound to exactly one admin at creation time. The admin
//! is drawn uniformly at random from the admins carrying the fewest open
//! tickets (the "floor set"). Load is recomputed from the store on every call;
//! nothing here keeps counters, so closing or reopening tickets needs no
//! bookkeeping.
//!
//! The selection is a pure function of a load snapshot. Two concurrent ticket
//! creations that read the same snapshot may pick the same admin; balancing is
//! best-effort, not a guarantee.
//!
//! ```
//! use helpdesk_core::{AdminLoad, UserId, select_admin};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let loads = [
//!     AdminLoad::new(UserId::new(1), 4),
//!     AdminLoad::new(UserId::new(2), 1),
//! ];
//! let mut rng = StdRng::seed_from_u64(7);
//! assert_eq!(select_admin(&loads, &mut rng), Ok(UserId::new(2)));
//! ```

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// An admin together with the number of `OPEN` tickets currently assigned to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoad {
    /// The admin.
    pub admin_id: UserId,
    /// Tickets owned by the admin whose status is `OPEN`.
    pub open_tickets: u64,
}

impl AdminLoad {
    /// Create a new load entry.
    #[must_use]
    pub const fn new(admin_id: UserId, open_tickets: u64) -> Self {
        Self {
            admin_id,
            open_tickets,
        }
    }
}

/// The admin roster was empty when a ticket needed an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no admin available to take the ticket")]
pub struct NoAdminAvailable;

/// Admins whose open-ticket count equals the roster minimum, in input order.
///
/// Returns an empty vector for an empty roster.
#[must_use]
pub fn least_loaded(loads: &[AdminLoad]) -> Vec<UserId> {
    let Some(min) = loads.iter().map(|load| load.open_tickets).min() else {
        return Vec::new();
    };

    loads
        .iter()
        .filter(|load| load.open_tickets == min)
        .map(|load| load.admin_id)
        .collect()
}

/// Pick the admin who should own a newly created ticket.
///
/// The result is a uniformly random member of [`least_loaded`]. Randomness
/// comes from the caller so tests can pass a seeded generator.
///
/// # Errors
///
/// Returns [`NoAdminAvailable`] if `loads` is empty.
pub fn select_admin<R>(loads: &[AdminLoad], rng: &mut R) -> Result<UserId, NoAdminAvailable>
where
    R: Rng + ?Sized,
{
    least_loaded(loads)
        .choose(rng)
        .copied()
        .ok_or(NoAdminAvailable)
}
