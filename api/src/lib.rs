//! FormCraft REST API
//!
//! HTTP surface over the forms core: owner-scoped form management behind
//! bearer tokens, public form rendering and submission, and per-form analytics
//! with CSV export.
//!
//! ```text
//! GET    /health
//! GET    /api/forms                      owner
//! POST   /api/forms                      owner
//! GET    /api/forms/:id                  public
//! PUT    /api/forms/:id                  owner   (PATCH alike)
//! DELETE /api/forms/:id                  owner
//! POST   /api/forms/:id/responses        public
//! GET    /api/forms/:id/responses        owner
//! GET    /api/forms/:id/analytics        owner
//! GET    /api/forms/:id/export           owner   text/csv
//! GET    /api/dashboard/stats            owner
//! GET    /docs                           Swagger UI
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

use axum::{Router, routing::get};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use formcraft_forms::{
    Bucket, CreateFormCommand, DashboardStats, DeletedForm, FieldAnalytics, FieldDefinition,
    FieldType, Form, FormId, FormOverview, FormRepository, FormService, FormSummary, FormUseCases,
    InMemoryFormRepository, InMemoryResponseRepository, OwnerId, ResponseId, ResponseRecord,
    ResponseRepository, ResponseService, ResponseUseCases, Template, UpdateFormCommand,
};

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use middleware::{AuthUser, JwtKeys};
pub use models::*;

/// API state
pub struct ApiState {
    pub forms: Arc<dyn FormUseCases>,
    pub responses: Arc<dyn ResponseUseCases>,
    pub keys: JwtKeys,
    pub started_at: DateTime<Utc>,
}

impl ApiState {
    pub fn new(
        forms: Arc<dyn FormUseCases>,
        responses: Arc<dyn ResponseUseCases>,
        keys: JwtKeys,
    ) -> Self {
        Self {
            forms,
            responses,
            keys,
            started_at: Utc::now(),
        }
    }

    /// Wire both services over the given stores.
    pub fn with_repositories(
        config: &ServerConfig,
        forms: Arc<dyn FormRepository>,
        responses: Arc<dyn ResponseRepository>,
    ) -> Self {
        let form_service = FormService::new(forms.clone(), responses.clone())
            .with_cascade_attempts(config.cascade_delete_attempts);
        let response_service = ResponseService::new(forms, responses);
        Self::new(
            Arc::new(form_service),
            Arc::new(response_service),
            JwtKeys::from_secret(config.jwt_secret.as_bytes()),
        )
    }

    /// Wire both services over in-memory stores.
    pub fn in_memory(config: &ServerConfig) -> Self {
        Self::with_repositories(
            config,
            Arc::new(InMemoryFormRepository::new()),
            Arc::new(InMemoryResponseRepository::new()),
        )
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FormCraft API",
        version = "1.0.0",
        description = "Form builder: schemas, submissions and response analytics",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health_check,
        routes::forms::list_forms,
        routes::forms::create_form,
        routes::forms::get_form,
        routes::forms::update_form,
        routes::forms::delete_form,
        routes::responses::submit_response,
        routes::responses::list_responses,
        routes::analytics::form_analytics,
        routes::analytics::export_csv,
        routes::analytics::dashboard_stats,
    ),
    components(
        schemas(
            ErrorResponse, SubmitResponseRequest, routes::health::HealthStatus,
            Form, FieldDefinition, FieldType, Template, FormId, OwnerId, ResponseId,
            CreateFormCommand, UpdateFormCommand, DeletedForm,
            ResponseRecord,
            FormSummary, FieldAnalytics, Bucket, DashboardStats, FormOverview
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "forms", description = "Form management"),
        (name = "responses", description = "Response collection"),
        (name = "analytics", description = "Analytics, export and dashboard")
    )
)]
pub struct ApiDoc;

/// Build the API router
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health::health_check))
        .merge(routes::forms::router())
        .merge(routes::responses::router())
        .merge(routes::analytics::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(Arc::new(state))
}
