//! Outbound ports (repository traits)
//!
//! Document-style collections: `forms` keyed by form id and `responses` queried
//! by their `form_id` foreign key.

use async_trait::async_trait;

use crate::domain::aggregates::{Form, ResponseRecord};
use crate::domain::value_objects::{FormId, OwnerId};

/// Form repository port
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Store a new form
    async fn insert(&self, form: &Form) -> Result<(), RepositoryError>;

    /// Find form by ID
    async fn find_by_id(&self, id: &FormId) -> Result<Option<Form>, RepositoryError>;

    /// Forms created by `owner`, newest first
    async fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<Form>, RepositoryError>;

    /// Replace a stored form; `false` if it is no longer stored
    async fn save(&self, form: &Form) -> Result<bool, RepositoryError>;

    /// Delete form; `false` if it was not stored
    async fn delete(&self, id: &FormId) -> Result<bool, RepositoryError>;
}

/// Response repository port
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Store a new response
    async fn insert(&self, response: &ResponseRecord) -> Result<(), RepositoryError>;

    /// Responses to a form, newest first
    async fn find_by_form(&self, form_id: &FormId) -> Result<Vec<ResponseRecord>, RepositoryError>;

    async fn count_by_form(&self, form_id: &FormId) -> Result<u64, RepositoryError>;

    /// Delete every response to a form, returning how many were removed
    async fn delete_by_form(&self, form_id: &FormId) -> Result<u64, RepositoryError>;
}

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("storage error: {0}")]
    StorageError(String),
}
