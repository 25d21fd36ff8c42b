//! Inbound ports (use case traits)

use async_trait::async_trait;
use thiserror::Error;

use crate::application::dto::*;
use crate::domain::aggregates::{Form, ResponseRecord, SchemaError};
use crate::domain::services::{AnswerRejection, ExportError, FormSummary, RawAnswers};
use crate::domain::value_objects::{FormId, OwnerId};
use crate::ports::outbound::RepositoryError;

/// Form management use cases
#[async_trait]
pub trait FormUseCases: Send + Sync {
    /// Create a form owned by `owner`
    async fn create_form(&self, owner: &OwnerId, command: CreateFormCommand) -> Result<Form, FormsError>;

    /// Replace the parts of a form present in `command`
    async fn update_form(
        &self,
        owner: &OwnerId,
        id: &FormId,
        command: UpdateFormCommand,
    ) -> Result<Form, FormsError>;

    /// Load a form for anyone holding its link
    async fn get_form(&self, id: &FormId) -> Result<Form, FormsError>;

    /// Forms of `owner`, newest first
    async fn list_forms(&self, owner: &OwnerId) -> Result<Vec<Form>, FormsError>;

    /// Delete a form together with all of its responses
    async fn delete_form(&self, owner: &OwnerId, id: &FormId) -> Result<DeletedForm, FormsError>;

    /// Dashboard overview for `owner`
    async fn dashboard_stats(&self, owner: &OwnerId) -> Result<DashboardStats, FormsError>;
}

/// Response collection and analytics use cases
#[async_trait]
pub trait ResponseUseCases: Send + Sync {
    /// Validate and store a respondent's answers
    async fn submit_response(&self, form_id: &FormId, answers: RawAnswers) -> Result<ResponseRecord, FormsError>;

    /// Responses to an owned form, newest first
    async fn list_responses(&self, owner: &OwnerId, form_id: &FormId) -> Result<Vec<ResponseRecord>, FormsError>;

    /// Per-field analytics of an owned form
    async fn form_analytics(&self, owner: &OwnerId, form_id: &FormId) -> Result<FormSummary, FormsError>;

    /// CSV download of an owned form's responses
    async fn export_csv(&self, owner: &OwnerId, form_id: &FormId) -> Result<CsvExport, FormsError>;
}

/// Use case errors
#[derive(Debug, Error)]
pub enum FormsError {
    /// Malformed form definition
    #[error("invalid form: {0}")]
    InvalidForm(#[from] SchemaError),

    /// Submission rejected by the validator
    #[error("invalid answers: {0}")]
    InvalidAnswers(#[from] AnswerRejection),

    /// Unknown form, or a form the caller does not own
    #[error("form not found")]
    FormNotFound,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

impl FormsError {
    /// Caller input was at fault and can be corrected.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidForm(_) | Self::InvalidAnswers(_))
    }
}
