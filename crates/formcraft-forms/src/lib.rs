//! FormCraft forms core
//!
//! Form schemas, respondent answers and the analytics computed over them.
//!
//! ## Architecture
//!
//! - **Domain Layer**: `Form` and `ResponseRecord` aggregates, the typed
//!   `Answer` union, and the stateless validator and aggregator
//! - **Application Layer**: `FormService` and `ResponseService` use cases
//! - **Ports Layer**: repository traits and use case traits
//! - **Infrastructure Layer**: in-memory document store
//!
//! ## Flow
//!
//! An owner creates a form. Respondents submit raw JSON answers, which the
//! validator decodes per field type and checks against the stored form before a
//! response is persisted. Analytics load a form with its responses and reduce
//! them to per-field counts, a flat table and CSV.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{FormService, ResponseService};
pub use application::dto::*;
pub use domain::aggregates::{FieldDefinition, Form, ResponseRecord, SchemaError};
pub use domain::services::{
    aggregate_field, summarize, to_flat_table, validate_answers, AnswerRejection, Bucket,
    FieldAnalytics, FieldViolation, FlatTable, FormSummary, RawAnswers, ViolationKind,
};
pub use domain::value_objects::{Answer, AnswerSet, FieldType, FormId, OwnerId, ResponseId, Template};
pub use infrastructure::{InMemoryFormRepository, InMemoryResponseRepository};
pub use ports::inbound::{FormUseCases, FormsError, ResponseUseCases};
pub use ports::outbound::{FormRepository, RepositoryError, ResponseRepository};

pub type Result<T> = std::result::Result<T, FormsError>;
