use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    api::models::auth::CurrentAccount,
    api::models::images::{ImageDeleteResponse, ImageListResponse, ImageResponse},
    db::handlers::{Images, Repository, images::ImageFilter},
    db::models::images::{ImageCreateDBRequest, ImageDBResponse},
    errors::{Error, Result},
    types::{ImageId, Operation, Resource},
};

/// Load an image and check the requester owns it.
///
/// A foreign image is reported as 403 rather than folded into 404; the
/// distinct message matches the delete/fetch surfaces and accepts the
/// existence leak.
async fn fetch_owned(repo: &mut Images<'_>, image_id: ImageId, account: &CurrentAccount, action: Operation) -> Result<ImageDBResponse> {
    let image = repo.get_by_id(image_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Image".to_string(),
        id: image_id.to_string(),
    })?;

    if image.owner_id != account.id {
        return Err(Error::InsufficientPermissions {
            action,
            resource: Resource::Images,
        });
    }

    Ok(image)
}

/// Upload an image.
///
/// Expects a multipart form with an `image` file field. The payload is read
/// chunk by chunk so an oversized upload is rejected as soon as the cap is
/// crossed, before anything is persisted.
#[utoipa::path(
    post,
    path = "/images",
    tag = "images",
    request_body(content_type = "multipart/form-data", description = "Image file upload"),
    responses(
        (status = 201, description = "Image stored", body = ImageResponse),
        (status = 400, description = "Missing file, filename, or content type"),
        (status = 401, description = "Not logged in"),
        (status = 413, description = "Payload exceeds the configured cap"),
    )
)]
#[tracing::instrument(skip_all, fields(account_id = account.id))]
pub async fn upload_image(
    State(state): State<AppState>,
    account: CurrentAccount,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImageResponse>)> {
    let max_image_bytes = state.config.uploads.max_image_bytes;

    let mut upload: Option<(String, String, Vec<u8>)> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        if field.name() != Some("image") {
            // Ignore unknown fields (forward compatibility)
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::BadRequest {
                message: "No filename".to_string(),
            })?;

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::BadRequest {
                message: "Bad upload: missing content type".to_string(),
            })?;

        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read upload: {e}"),
        })? {
            // Check the cap incrementally to fail fast
            if (data.len() + chunk.len()) as u64 > max_image_bytes {
                return Err(Error::PayloadTooLarge {
                    message: format!("Image exceeds maximum allowed size of {max_image_bytes} bytes"),
                });
            }
            data.extend_from_slice(&chunk);
        }

        upload = Some((filename, content_type, data));
        break;
    }

    let (filename, content_type, data) = upload.ok_or_else(|| Error::BadRequest {
        message: "No file selected".to_string(),
    })?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let image = {
        let mut repo = Images::new(&mut tx);
        repo.create(&ImageCreateDBRequest {
            filename,
            content_type,
            data,
            owner_id: account.id,
        })
        .await?
    };
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!(image_id = image.id, size_bytes = image.size_bytes, "Image uploaded");

    Ok((StatusCode::CREATED, Json(ImageResponse::from(&image))))
}

/// List the requester's images.
#[utoipa::path(
    get,
    path = "/images",
    tag = "images",
    responses(
        (status = 200, description = "The requester's images, oldest first", body = ImageListResponse),
        (status = 401, description = "Not logged in"),
    )
)]
#[tracing::instrument(skip_all, fields(account_id = account.id))]
pub async fn list_images(State(state): State<AppState>, account: CurrentAccount) -> Result<Json<ImageListResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Images::new(&mut pool_conn);

    let images = repo.list(&ImageFilter::new(account.id)).await?;

    Ok(Json(ImageListResponse {
        data: images.iter().map(ImageResponse::from).collect(),
    }))
}

/// Serve an image's raw bytes with its stored content type.
#[utoipa::path(
    get,
    path = "/images/{image_id}/content",
    tag = "images",
    params(
        ("image_id" = i64, Path, description = "The ID of the image to fetch")
    ),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Image belongs to another account"),
        (status = 404, description = "Image not found"),
    )
)]
#[tracing::instrument(skip_all, fields(account_id = account.id, image_id))]
pub async fn get_image_content(State(state): State<AppState>, Path(image_id): Path<ImageId>, account: CurrentAccount) -> Result<Response> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Images::new(&mut pool_conn);

    let image = fetch_owned(&mut repo, image_id, &account, Operation::Read).await?;

    Ok(([(header::CONTENT_TYPE, image.content_type)], image.data).into_response())
}

/// Delete an image. Immediate and irreversible.
#[utoipa::path(
    delete,
    path = "/images/{image_id}",
    tag = "images",
    params(
        ("image_id" = i64, Path, description = "The ID of the image to delete")
    ),
    responses(
        (status = 200, description = "Image deleted", body = ImageDeleteResponse),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Image belongs to another account"),
        (status = 404, description = "Image not found"),
    )
)]
#[tracing::instrument(skip_all, fields(account_id = account.id, image_id))]
pub async fn delete_image(
    State(state): State<AppState>,
    Path(image_id): Path<ImageId>,
    account: CurrentAccount,
) -> Result<Json<ImageDeleteResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    {
        let mut repo = Images::new(&mut tx);
        fetch_owned(&mut repo, image_id, &account, Operation::Delete).await?;
        repo.delete(image_id).await?;
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(ImageDeleteResponse {
        id: image_id,
        deleted: true,
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_account, create_test_config, create_test_state, create_test_state_with, session_cookie_for};
    use axum::http::{HeaderValue, StatusCode, header};
    use axum_test::TestServer;

    const BOUNDARY: &str = "snapbin-test-boundary";

    /// Hand-rolled multipart body with a single `image` file field.
    fn multipart_body(filename: &str, content_type: Option<&str>, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n").as_bytes());
        if let Some(ct) = content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    fn cookie(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).unwrap()
    }

    #[tokio::test]
    async fn test_image_lifecycle_and_ownership() {
        let state = create_test_state().await;
        let alice = create_test_account(&state.db, "alice@x.com", "pw-a").await;
        let bob = create_test_account(&state.db, "bob@x.com", "pw-b").await;
        let alice_session = session_cookie_for(&alice, &state.config);
        let bob_session = session_cookie_for(&bob, &state.config);
        let server = TestServer::new(crate::router(state)).unwrap();

        // Upload 1000 bytes as alice
        let response = server
            .post("/images")
            .add_header(header::COOKIE, cookie(&alice_session))
            .content_type(&multipart_content_type())
            .bytes(multipart_body("cat.png", Some("image/png"), &[7u8; 1000]).into())
            .await;
        response.assert_status(StatusCode::CREATED);
        let uploaded: crate::api::models::images::ImageResponse = response.json();
        assert_eq!(uploaded.filename, "cat.png");
        assert_eq!(uploaded.size_bytes, 1000);
        assert_eq!(uploaded.owner_id, alice.id);

        // Owner fetches the bytes back
        let response = server
            .get(&format!("/images/{}/content", uploaded.id))
            .add_header(header::COOKIE, cookie(&alice_session))
            .await;
        response.assert_status_ok();
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
        assert_eq!(response.as_bytes().len(), 1000);

        // Bob can neither fetch nor delete it
        let response = server
            .get(&format!("/images/{}/content", uploaded.id))
            .add_header(header::COOKIE, cookie(&bob_session))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .delete(&format!("/images/{}", uploaded.id))
            .add_header(header::COOKIE, cookie(&bob_session))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // Alice deletes it; a later fetch is a 404
        let response = server
            .delete(&format!("/images/{}", uploaded.id))
            .add_header(header::COOKIE, cookie(&alice_session))
            .await;
        response.assert_status_ok();
        let body: crate::api::models::images::ImageDeleteResponse = response.json();
        assert!(body.deleted);

        let response = server
            .get(&format!("/images/{}/content", uploaded.id))
            .add_header(header::COOKIE, cookie(&alice_session))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_only_shows_own_images() {
        let state = create_test_state().await;
        let alice = create_test_account(&state.db, "alice@x.com", "pw-a").await;
        let bob = create_test_account(&state.db, "bob@x.com", "pw-b").await;
        let alice_session = session_cookie_for(&alice, &state.config);
        let bob_session = session_cookie_for(&bob, &state.config);
        let server = TestServer::new(crate::router(state)).unwrap();

        for (session, name) in [(&alice_session, "a1.png"), (&alice_session, "a2.png"), (&bob_session, "b1.png")] {
            server
                .post("/images")
                .add_header(header::COOKIE, cookie(session))
                .content_type(&multipart_content_type())
                .bytes(multipart_body(name, Some("image/png"), b"data").into())
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server.get("/images").add_header(header::COOKIE, cookie(&alice_session)).await;
        response.assert_status_ok();
        let listing: crate::api::models::images::ImageListResponse = response.json();
        assert_eq!(listing.data.len(), 2);
        assert_eq!(listing.data[0].filename, "a1.png");
        assert_eq!(listing.data[1].filename, "a2.png");
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected_without_a_row() {
        let mut config = create_test_config();
        config.uploads.max_image_bytes = 1024;
        let state = create_test_state_with(config).await;
        let account = create_test_account(&state.db, "a@x.com", "pw1").await;
        let session = session_cookie_for(&account, &state.config);
        let server = TestServer::new(crate::router(state)).unwrap();

        let response = server
            .post("/images")
            .add_header(header::COOKIE, cookie(&session))
            .content_type(&multipart_content_type())
            .bytes(multipart_body("big.png", Some("image/png"), &[0u8; 2048]).into())
            .await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

        // Nothing was persisted
        let response = server.get("/images").add_header(header::COOKIE, cookie(&session)).await;
        let listing: crate::api::models::images::ImageListResponse = response.json();
        assert!(listing.data.is_empty());
    }

    #[tokio::test]
    async fn test_upload_missing_content_type() {
        let state = create_test_state().await;
        let account = create_test_account(&state.db, "a@x.com", "pw1").await;
        let session = session_cookie_for(&account, &state.config);
        let server = TestServer::new(crate::router(state)).unwrap();

        let response = server
            .post("/images")
            .add_header(header::COOKIE, cookie(&session))
            .content_type(&multipart_content_type())
            .bytes(multipart_body("cat.png", None, b"data").into())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let state = create_test_state().await;
        let account = create_test_account(&state.db, "a@x.com", "pw1").await;
        let session = session_cookie_for(&account, &state.config);
        let server = TestServer::new(crate::router(state)).unwrap();

        let body = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{BOUNDARY}--\r\n");
        let response = server
            .post("/images")
            .add_header(header::COOKIE, cookie(&session))
            .content_type(&multipart_content_type())
            .bytes(body.into_bytes().into())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.text(), "No file selected");
    }

    #[tokio::test]
    async fn test_images_require_session() {
        let state = create_test_state().await;
        let server = TestServer::new(crate::router(state)).unwrap();

        server.get("/images").await.assert_status(StatusCode::UNAUTHORIZED);
        server.delete("/images/1").await.assert_status(StatusCode::UNAUTHORIZED);
        server.get("/images/1/content").await.assert_status(StatusCode::UNAUTHORIZED);
    }
}
