//! Database models for images.

use crate::types::{AccountId, ImageId};
use chrono::{DateTime, Utc};

/// Database request for creating a new image
#[derive(Debug, Clone)]
pub struct ImageCreateDBRequest {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub owner_id: AccountId,
}

/// Database response for a full image record, blob included.
///
/// Only fetched one at a time; list operations go through
/// [`ImageSummaryDBResponse`] so blobs never leave the database in bulk.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImageDBResponse {
    pub id: ImageId,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub size_bytes: i64,
    pub owner_id: AccountId,
    pub created_at: DateTime<Utc>,
}

/// Blob-free image record used for listings
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImageSummaryDBResponse {
    pub id: ImageId,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub owner_id: AccountId,
    pub created_at: DateTime<Utc>,
}
