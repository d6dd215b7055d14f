//! Database repository for images.
//!
//! Image blobs live in the row itself. Single-record reads return the full
//! record including the blob; listings return [`ImageSummaryDBResponse`] so
//! a gallery page never loads every payload.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::images::{ImageCreateDBRequest, ImageDBResponse, ImageSummaryDBResponse},
};
use crate::types::{AccountId, ImageId};
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;

/// Filter for listing images
#[derive(Debug, Clone)]
pub struct ImageFilter {
    pub owner_id: AccountId,
}

impl ImageFilter {
    pub fn new(owner_id: AccountId) -> Self {
        Self { owner_id }
    }
}

pub struct Images<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Images<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl Repository for Images<'_> {
    type CreateRequest = ImageCreateDBRequest;
    type Response = ImageDBResponse;
    type Summary = ImageSummaryDBResponse;
    type Id = ImageId;
    type Filter = ImageFilter;

    #[instrument(skip(self, request), fields(filename = %request.filename, owner_id = request.owner_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let image = sqlx::query_as::<_, ImageDBResponse>(
            r#"
            INSERT INTO images (filename, content_type, data, size_bytes, owner_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(&request.filename)
        .bind(&request.content_type)
        .bind(&request.data)
        .bind(request.data.len() as i64)
        .bind(request.owner_id)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(image)
    }

    #[instrument(skip(self), fields(image_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let image = sqlx::query_as::<_, ImageDBResponse>("SELECT * FROM images WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(image)
    }

    #[instrument(skip(self, filter), fields(owner_id = filter.owner_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Summary>> {
        let images = sqlx::query_as::<_, ImageSummaryDBResponse>(
            r#"
            SELECT id, filename, content_type, size_bytes, owner_id, created_at
            FROM images
            WHERE owner_id = ?1
            ORDER BY id
            "#,
        )
        .bind(filter.owner_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(images)
    }

    #[instrument(skip(self), fields(image_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM images WHERE id = ?1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::accounts::AccountCreateDBRequest;
    use crate::test_utils::create_test_pool;

    async fn create_owner(conn: &mut SqliteConnection, email: &str) -> AccountId {
        crate::db::handlers::Accounts::new(conn)
            .create(&AccountCreateDBRequest {
                email: email.to_string(),
                password_hash: "$argon2id$fake".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn png_request(owner_id: AccountId, filename: &str, len: usize) -> ImageCreateDBRequest {
        ImageCreateDBRequest {
            filename: filename.to_string(),
            content_type: "image/png".to_string(),
            data: vec![0xAB; len],
            owner_id,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_round_trip() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let owner = create_owner(&mut conn, "owner@example.com").await;
        let mut repo = Images::new(&mut conn);

        let created = repo.create(&png_request(owner, "cat.png", 1000)).await.unwrap();
        assert_eq!(created.filename, "cat.png");
        assert_eq!(created.size_bytes, 1000);
        assert_eq!(created.owner_id, owner);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.data, vec![0xAB; 1000]);
        assert_eq!(fetched.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_owner() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let alice = create_owner(&mut conn, "alice@example.com").await;
        let bob = create_owner(&mut conn, "bob@example.com").await;

        let mut repo = Images::new(&mut conn);
        repo.create(&png_request(alice, "one.png", 10)).await.unwrap();
        repo.create(&png_request(alice, "two.png", 20)).await.unwrap();
        repo.create(&png_request(bob, "other.png", 30)).await.unwrap();

        let listed = repo.list(&ImageFilter::new(alice)).await.unwrap();
        assert_eq!(listed.len(), 2);
        // Insertion order
        assert_eq!(listed[0].filename, "one.png");
        assert_eq!(listed[1].filename, "two.png");
        assert!(listed.iter().all(|i| i.owner_id == alice));
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let owner = create_owner(&mut conn, "del@example.com").await;
        let mut repo = Images::new(&mut conn);

        let created = repo.create(&png_request(owner, "gone.png", 5)).await.unwrap();
        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(!repo.delete(created.id).await.unwrap());
    }
}
