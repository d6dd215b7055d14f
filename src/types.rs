//! Common type definitions shared across the crate.
//!
//! Entity identifiers are SQLite rowids wrapped in type aliases:
//!
//! - [`AccountId`]: account identifier
//! - [`ImageId`]: image identifier
//!
//! [`Resource`] and [`Operation`] form the vocabulary used by permission
//! errors: an operation on a resource the requester does not own is reported
//! as `InsufficientPermissions { action, resource }`.

use std::fmt;

// Type aliases for IDs
pub type AccountId = i64;
pub type ImageId = i64;

/// Actions that can be attempted on an owned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Delete,
}

/// Entity types that ownership checks apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Accounts,
    Images,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Accounts => write!(f, "account"),
            Resource::Images => write!(f, "image"),
        }
    }
}
