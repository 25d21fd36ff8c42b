//! Answer validation
//!
//! Decodes raw submitted JSON into typed answers, field by field in schema order.
//! A submission is accepted whole or rejected whole.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::domain::aggregates::{FieldDefinition, Form};
use crate::domain::value_objects::{Answer, AnswerSet, FieldType, RATING_MAX, RATING_MIN};

/// Answers as they arrive from a respondent, keyed by field id
pub type RawAnswers = HashMap<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Required field left blank
    Missing,
    /// Value has the wrong JSON shape for the field type
    InvalidShape,
    /// Value is not one of the declared options
    UnknownOption,
    /// Rating outside 1..=5
    OutOfRange,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field_id: String,
    pub kind: ViolationKind,
}

/// Rejected submission with every violated field, in schema order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .violations.len())]
pub struct AnswerRejection {
    pub violations: Vec<FieldViolation>,
}

impl AnswerRejection {
    pub fn field_ids(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.field_id.clone()).collect()
    }
}

/// Check `raw` against the form's fields.
///
/// Ids that are not fields of the form are dropped, as are blank optional answers.
pub fn validate_answers(form: &Form, raw: &RawAnswers) -> Result<AnswerSet, AnswerRejection> {
    let mut accepted = AnswerSet::new();
    let mut violations = Vec::new();

    for field in form.fields() {
        let decoded = match raw.get(&field.id) {
            None | Some(Value::Null) => None,
            Some(value) => Some(decode(field, value)),
        };

        let kind = match decoded {
            Some(Ok(answer)) if !answer.is_empty() => {
                accepted.insert(field.id.clone(), answer);
                continue;
            }
            Some(Err(kind)) => kind,
            _ if field.required => ViolationKind::Missing,
            _ => continue,
        };
        violations.push(FieldViolation { field_id: field.id.clone(), kind });
    }

    if violations.is_empty() {
        Ok(accepted)
    } else {
        Err(AnswerRejection { violations })
    }
}

fn decode(field: &FieldDefinition, value: &Value) -> Result<Answer, ViolationKind> {
    match field.field_type {
        FieldType::Text | FieldType::Textarea => string(value).map(Answer::Text),
        FieldType::Date => string(value).map(Answer::Date),
        FieldType::Radio | FieldType::Dropdown => {
            let choice = string(value)?;
            if !choice.is_empty() && !field.has_option(&choice) {
                return Err(ViolationKind::UnknownOption);
            }
            Ok(Answer::Choice(choice))
        }
        FieldType::Checkbox => {
            let Value::Object(map) = value else {
                return Err(ViolationKind::InvalidShape);
            };
            let mut checked = BTreeMap::new();
            for (option, flag) in map {
                let Value::Bool(flag) = flag else {
                    return Err(ViolationKind::InvalidShape);
                };
                if !field.has_option(option) {
                    // unchecked strays carry no information
                    if *flag {
                        return Err(ViolationKind::UnknownOption);
                    }
                    continue;
                }
                checked.insert(option.clone(), *flag);
            }
            Ok(Answer::Checkboxes(checked))
        }
        FieldType::Rating => {
            let rating = value.as_i64().ok_or(ViolationKind::InvalidShape)?;
            if rating < i64::from(RATING_MIN) || rating > i64::from(RATING_MAX) {
                return Err(ViolationKind::OutOfRange);
            }
            Ok(Answer::Rating(rating as u8))
        }
    }
}

fn string(value: &Value) -> Result<String, ViolationKind> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or(ViolationKind::InvalidShape)
}
