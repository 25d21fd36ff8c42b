//! API errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use formcraft_forms::FormsError;

use crate::models::{codes, ApiResponse, ErrorResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthorized,

    #[error(transparent)]
    Forms(#[from] FormsError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forms(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Forms(FormsError::FormNotFound) => StatusCode::NOT_FOUND,
            Self::Forms(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorResponse {
        let (code, fields) = match self {
            Self::Unauthorized => (codes::UNAUTHORIZED, None),
            Self::Forms(FormsError::InvalidAnswers(rejection)) => {
                (codes::VALIDATION_ERROR, Some(rejection.field_ids()))
            }
            Self::Forms(FormsError::InvalidForm(_)) => (codes::VALIDATION_ERROR, None),
            Self::Forms(FormsError::FormNotFound) => (codes::NOT_FOUND, None),
            Self::Forms(_) => {
                return ErrorResponse {
                    code: codes::INTERNAL_ERROR.into(),
                    message: "internal server error".into(),
                    fields: None,
                };
            }
        };
        ErrorResponse {
            code: code.into(),
            message: self.to_string(),
            fields,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::<()>::failure(self.body()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcraft_forms::{RepositoryError, SchemaError};

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(FormsError::InvalidForm(SchemaError::NoFields)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(FormsError::FormNotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(FormsError::Storage(RepositoryError::ConnectionError("down".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_details_stay_private() {
        let err = ApiError::from(FormsError::Storage(RepositoryError::StorageError(
            "disk at /var/lib/formcraft full".into(),
        )));
        let body = err.body();
        assert_eq!(body.code, codes::INTERNAL_ERROR);
        assert!(!body.message.contains("/var/lib"));
    }

    #[test]
    fn test_schema_error_message() {
        let body = ApiError::from(FormsError::InvalidForm(SchemaError::EmptyTitle)).body();
        assert_eq!(body.code, codes::VALIDATION_ERROR);
        assert_eq!(body.message, "invalid form: form title is required");
        assert!(body.fields.is_none());
    }
}
