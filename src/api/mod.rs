//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): Login, logout, bootstrap
//! - **Device reset** (`/accounts/{id}/device-reset`): clear a device binding
//! - **Images** (`/images*`): upload, list, fetch content, delete
//! - **Assistant** (`/ask`): relay a question to the completion API
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is served at `/docs` when the server is running.

pub mod handlers;
pub mod models;
