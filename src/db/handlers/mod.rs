//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection or transaction, provides
//! strongly-typed operations, and returns domain models from
//! [`crate::db::models`].
//!
//! # Available Repositories
//!
//! - [`Accounts`]: account records and the device-token binding operations
//! - [`Images`]: image blob storage, implementing the [`Repository`] trait

pub mod accounts;
pub mod images;
pub mod repository;

pub use accounts::Accounts;
pub use images::Images;
pub use repository::Repository;
