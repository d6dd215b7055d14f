//! Axum route handlers for the HTTP API.
//!
//! - [`auth`]: login, logout, device reset, account bootstrap
//! - [`images`]: upload, list, content fetch, delete
//! - [`assistant`]: question relay

pub mod assistant;
pub mod auth;
pub mod images;
