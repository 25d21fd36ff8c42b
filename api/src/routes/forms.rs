//! Form management endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use formcraft_forms::{CreateFormCommand, DeletedForm, Form, FormId, UpdateFormCommand};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/forms", get(list_forms).post(create_form))
        .route(
            "/api/forms/:id",
            get(get_form).put(update_form).patch(update_form).delete(delete_form),
        )
}

/// List the caller's forms, newest first
#[utoipa::path(
    get,
    path = "/api/forms",
    responses(
        (status = 200, description = "Owned forms", body = Vec<Form>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "forms"
)]
pub async fn list_forms(
    State(state): State<Arc<ApiState>>,
    AuthUser(owner): AuthUser,
) -> Result<Json<ApiResponse<Vec<Form>>>, ApiError> {
    let forms = state.forms.list_forms(&owner).await?;
    Ok(Json(ApiResponse::success(forms)))
}

/// Create a form
#[utoipa::path(
    post,
    path = "/api/forms",
    request_body = CreateFormCommand,
    responses(
        (status = 201, description = "Form created", body = Form),
        (status = 400, description = "Invalid form definition", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "forms"
)]
pub async fn create_form(
    State(state): State<Arc<ApiState>>,
    AuthUser(owner): AuthUser,
    Json(command): Json<CreateFormCommand>,
) -> Result<(StatusCode, Json<ApiResponse<Form>>), ApiError> {
    let form = state.forms.create_form(&owner, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(form))))
}

/// Get a form by ID. Public so respondents can render it.
#[utoipa::path(
    get,
    path = "/api/forms/{id}",
    params(("id" = String, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Form details", body = Form),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    tag = "forms"
)]
pub async fn get_form(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Form>>, ApiError> {
    let form = state.forms.get_form(&FormId::from_string(id)).await?;
    Ok(Json(ApiResponse::success(form)))
}

/// Update the title, template or fields of a form
#[utoipa::path(
    put,
    path = "/api/forms/{id}",
    params(("id" = String, Path, description = "Form ID")),
    request_body = UpdateFormCommand,
    responses(
        (status = 200, description = "Form updated", body = Form),
        (status = 400, description = "Invalid form definition", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    tag = "forms"
)]
pub async fn update_form(
    State(state): State<Arc<ApiState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    Json(command): Json<UpdateFormCommand>,
) -> Result<Json<ApiResponse<Form>>, ApiError> {
    let form = state
        .forms
        .update_form(&owner, &FormId::from_string(id), command)
        .await?;
    Ok(Json(ApiResponse::success(form)))
}

/// Delete a form and its responses
#[utoipa::path(
    delete,
    path = "/api/forms/{id}",
    params(("id" = String, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Form deleted", body = DeletedForm),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    tag = "forms"
)]
pub async fn delete_form(
    State(state): State<Arc<ApiState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedForm>>, ApiError> {
    let deleted = state.forms.delete_form(&owner, &FormId::from_string(id)).await?;
    Ok(Json(ApiResponse::success(deleted)))
}
