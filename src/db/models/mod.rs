//! Database record models matching table schemas.
//!
//! Struct definitions that directly correspond to database table rows,
//! kept distinct from API models so storage and API representations can
//! evolve independently.

pub mod accounts;
pub mod images;
