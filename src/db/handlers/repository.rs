//! Base repository trait for database operations.

/// Contains the Repository trait.
///
/// A repository is a data access layer for one SQLite table. It provides
/// methods for creating, reading, listing, and deleting entities.
use crate::db::errors::Result;

/// Base repository trait providing common database operations
///
/// `Response` is the full record; `Summary` is what list operations return.
/// They differ for blob-carrying tables, where bulk reads must not drag the
/// payload column out of the database.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The full response/DTO type returned by single-entity operations
    type Response;

    /// The list-item type returned by `list`
    type Summary;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List entities matching a filter
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Summary>>;

    /// Delete an entity by ID, returning whether a row was removed
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;
}
