//! Request/response models for image endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::images::{ImageDBResponse, ImageSummaryDBResponse};
use crate::types::{AccountId, ImageId};

/// Image metadata (the blob itself is served from `/images/{id}/content`)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImageResponse {
    pub id: ImageId,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub owner_id: AccountId,
    pub created_at: i64, // Unix timestamp
}

impl From<&ImageSummaryDBResponse> for ImageResponse {
    fn from(image: &ImageSummaryDBResponse) -> Self {
        Self {
            id: image.id,
            filename: image.filename.clone(),
            content_type: image.content_type.clone(),
            size_bytes: image.size_bytes,
            owner_id: image.owner_id,
            created_at: image.created_at.timestamp(),
        }
    }
}

impl From<&ImageDBResponse> for ImageResponse {
    fn from(image: &ImageDBResponse) -> Self {
        Self {
            id: image.id,
            filename: image.filename.clone(),
            content_type: image.content_type.clone(),
            size_bytes: image.size_bytes,
            owner_id: image.owner_id,
            created_at: image.created_at.timestamp(),
        }
    }
}

/// Response for image list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImageListResponse {
    pub data: Vec<ImageResponse>,
}

/// Response for image deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImageDeleteResponse {
    pub id: ImageId,
    pub deleted: bool,
}
