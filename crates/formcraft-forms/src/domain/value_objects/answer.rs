//! Answer value objects
//!
//! A submitted answer is decoded per field type into one [`Answer`] variant, so
//! validation and analytics match on the variant instead of probing JSON shapes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One typed answer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// `text` and `textarea` fields
    Text(String),
    /// `date` fields, kept as submitted
    Date(String),
    /// `radio` and `dropdown` fields
    Choice(String),
    /// `checkbox` fields: option -> checked
    Checkboxes(BTreeMap<String, bool>),
    /// `rating` fields
    Rating(u8),
}

impl Answer {
    /// An answer that carries nothing: empty string, or no checkbox set.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) | Self::Date(s) | Self::Choice(s) => s.is_empty(),
            Self::Checkboxes(map) => !map.values().any(|checked| *checked),
            Self::Rating(_) => false,
        }
    }

    /// Options set to `true`, in key order. Empty for non-checkbox answers.
    pub fn checked_options(&self) -> impl Iterator<Item = &str> {
        let map = match self {
            Self::Checkboxes(map) => Some(map),
            _ => None,
        };
        map.into_iter()
            .flat_map(|m| m.iter())
            .filter(|(_, checked)| **checked)
            .map(|(option, _)| option.as_str())
    }
}

/// Accepted answers keyed by field id
pub type AnswerSet = BTreeMap<String, Answer>;
