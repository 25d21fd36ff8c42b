//! Forms aggregates

pub mod form;
pub mod response;

pub use form::{validate_fields, FieldDefinition, Form, SchemaError};
pub use response::ResponseRecord;
