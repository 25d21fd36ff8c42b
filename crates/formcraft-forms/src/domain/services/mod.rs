//! Domain services
//!
//! Stateless operations over forms and their responses.

pub mod aggregator;
pub mod validator;

pub use aggregator::{
    aggregate_field, summarize, to_flat_table, Bucket, ExportError, FieldAnalytics, FlatTable,
    FormSummary, SUBMITTED_AT_FORMAT, SUBMITTED_AT_HEADER,
};
pub use validator::{validate_answers, AnswerRejection, FieldViolation, RawAnswers, ViolationKind};
