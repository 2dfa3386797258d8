//! Helpdesk server library.
//!
//! Customers file tickets over a JSON API and every new ticket is handed to
//! one of the least-loaded admins. This crate provides the server as a
//! library so it can be tested with an in-memory store and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
