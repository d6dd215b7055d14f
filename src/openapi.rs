//! OpenAPI documentation assembled from the handler annotations.

use utoipa::OpenApi;

use crate::api::models::{
    assistant::{AskRequest, AskResponse},
    auth::{AccountResponse, AuthResponse, AuthSuccessResponse, BootstrapResponse, LoginRequest},
    images::{ImageDeleteResponse, ImageListResponse, ImageResponse},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "snapbin",
        description = "A small image locker with device-bound logins and an assistant relay"
    ),
    paths(
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::auth::reset_device,
        crate::api::handlers::auth::bootstrap,
        crate::api::handlers::images::upload_image,
        crate::api::handlers::images::list_images,
        crate::api::handlers::images::get_image_content,
        crate::api::handlers::images::delete_image,
        crate::api::handlers::assistant::ask,
    ),
    components(schemas(
        LoginRequest,
        AccountResponse,
        AuthResponse,
        AuthSuccessResponse,
        BootstrapResponse,
        ImageResponse,
        ImageListResponse,
        ImageDeleteResponse,
        AskRequest,
        AskResponse,
    )),
    tags(
        (name = "authentication", description = "Login, logout, device binding, bootstrap"),
        (name = "images", description = "Owned image storage"),
        (name = "assistant", description = "Completion relay"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("/authentication/login"));
        assert!(json.contains("/images"));
        assert!(json.contains("/ask"));
    }
}
