//! Analytics, export and dashboard endpoints

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use formcraft_forms::{DashboardStats, FormId, FormSummary};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/forms/:id/analytics", get(form_analytics))
        .route("/api/forms/:id/export", get(export_csv))
        .route("/api/dashboard/stats", get(dashboard_stats))
}

/// Per-field response counts of an owned form
#[utoipa::path(
    get,
    path = "/api/forms/{id}/analytics",
    params(("id" = String, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Form analytics", body = FormSummary),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn form_analytics(
    State(state): State<Arc<ApiState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FormSummary>>, ApiError> {
    let summary = state
        .responses
        .form_analytics(&owner, &FormId::from_string(id))
        .await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// Download all responses as CSV
#[utoipa::path(
    get,
    path = "/api/forms/{id}/export",
    params(("id" = String, Path, description = "Form ID")),
    responses(
        (status = 200, description = "CSV file", body = String, content_type = "text/csv"),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn export_csv(
    State(state): State<Arc<ApiState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let export = state
        .responses
        .export_csv(&owner, &FormId::from_string(id))
        .await?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ),
    ];
    Ok((headers, export.content))
}

/// Totals and most recent forms of the caller
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn dashboard_stats(
    State(state): State<Arc<ApiState>>,
    AuthUser(owner): AuthUser,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let stats = state.forms.dashboard_stats(&owner).await?;
    Ok(Json(ApiResponse::success(stats)))
}
