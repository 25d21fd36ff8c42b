//! Response collection endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use formcraft_forms::{FormId, ResponseRecord};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new().route(
        "/api/forms/:id/responses",
        get(list_responses).post(submit_response),
    )
}

/// Submit answers to a form. No authentication.
#[utoipa::path(
    post,
    path = "/api/forms/{id}/responses",
    params(("id" = String, Path, description = "Form ID")),
    request_body = SubmitResponseRequest,
    responses(
        (status = 201, description = "Response recorded", body = ResponseRecord),
        (status = 400, description = "Answers failed validation", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    tag = "responses"
)]
pub async fn submit_response(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(request): Json<SubmitResponseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ResponseRecord>>), ApiError> {
    let record = state
        .responses
        .submit_response(&FormId::from_string(id), request.answers)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

/// List responses to an owned form, newest first
#[utoipa::path(
    get,
    path = "/api/forms/{id}/responses",
    params(("id" = String, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Responses", body = Vec<ResponseRecord>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    tag = "responses"
)]
pub async fn list_responses(
    State(state): State<Arc<ApiState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ResponseRecord>>>, ApiError> {
    let responses = state
        .responses
        .list_responses(&owner, &FormId::from_string(id))
        .await?;
    Ok(Json(ApiResponse::success(responses)))
}
