//! Response Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Answer, AnswerSet, FormId, ResponseId};

/// One respondent's submission. References its form by id only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ResponseRecord {
    id: ResponseId,
    form_id: FormId,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    answers: AnswerSet,
    created_at: DateTime<Utc>,
}

impl ResponseRecord {
    pub fn create(form_id: FormId, answers: AnswerSet) -> Self {
        Self::create_at(form_id, answers, Utc::now())
    }

    /// Create with an explicit submission time (imports and tests).
    pub fn create_at(form_id: FormId, answers: AnswerSet, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ResponseId::new(),
            form_id,
            answers,
            created_at,
        }
    }

    pub fn id(&self) -> &ResponseId { &self.id }
    pub fn form_id(&self) -> &FormId { &self.form_id }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    pub fn answer(&self, field_id: &str) -> Option<&Answer> {
        self.answers.get(field_id)
    }
}
