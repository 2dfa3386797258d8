//! Helpdesk Core - Shared types and the admin assignment policy.
//!
//! This crate provides the pieces shared by every helpdesk component:
//! - `server` - JSON API for registration, login and ticket management
//! - `cli` - Command-line tools for migrations and admin management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. The assignment policy lives here so it can be exercised
//! without a running store.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles and statuses
//! - [`assignment`] - Least-loaded admin selection for new tickets

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod assignment;
pub mod types;

pub use assignment::{AdminLoad, NoAdminAvailable, least_loaded, select_admin};
pub use types::*;
