//! Data Transfer Objects (DTOs)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::FieldDefinition;
use crate::domain::value_objects::{FormId, Template};

// =============================================================================
// Form Commands
// =============================================================================

/// Missing title or fields deserialize as empty and fail validation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateFormCommand {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub template: Option<Template>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateFormCommand {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub template: Option<Template>,
    #[serde(default)]
    pub fields: Option<Vec<FieldDefinition>>,
}

// =============================================================================
// Views (Read Models)
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeletedForm {
    pub form_id: FormId,
    pub responses_deleted: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FormOverview {
    pub id: FormId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub response_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DashboardStats {
    pub total_forms: u64,
    pub total_responses: u64,
    pub recent_forms: Vec<FormOverview>,
}

/// A rendered CSV download
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}
