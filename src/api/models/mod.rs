//! Request/response data structures for the HTTP API.
//!
//! These are distinct from [`crate::db::models`]: database records carry
//! everything the row holds (password hashes, blobs), API models carry only
//! what goes over the wire.

pub mod assistant;
pub mod auth;
pub mod images;
