//! Request/response models for the assistant endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A free-text question for the assistant
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

/// The assistant's textual answer.
///
/// Always returned with status 200; relay failures are folded into the
/// answer text so the chat surface degrades instead of erroring.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskResponse {
    pub answer: String,
}
