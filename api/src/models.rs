//! API Models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use formcraft_forms::RawAnswers;

/// Standard API response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn failure(error: ErrorResponse) -> Self {
        Self { success: false, data: None, error: Some(error) }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    /// Ids of the fields that failed validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

/// Error codes carried in [`ErrorResponse::code`]
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

// ============ Responses ============

/// Respondent submission
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponseRequest {
    /// Field id to raw answer value
    #[schema(value_type = Object)]
    pub answers: RawAnswers,
}
