//! Response analytics
//!
//! Pure reductions of a form plus its responses: per-field tabulation, the flat
//! table behind CSV export, and the per-form summary shown on the analytics page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::aggregates::{FieldDefinition, Form, ResponseRecord};
use crate::domain::value_objects::{Answer, FieldType, FormId, RATING_MAX, RATING_MIN};

/// First column of the flat table
pub const SUBMITTED_AT_HEADER: &str = "Submission Date";

/// Timestamp format of the first column (UTC)
pub const SUBMITTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One `(label, count)` pair of a tabulation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Bucket {
    pub label: String,
    pub count: u64,
}

impl Bucket {
    /// Every declared option or rating starts at zero, matched or not.
    fn zero(label: impl Into<String>) -> Self {
        Self { label: label.into(), count: 0 }
    }
}

/// Tabulate one field across `responses`.
///
/// Returns `None` for field types that are not aggregated (text, textarea, date).
/// Answers that match no bucket are ignored.
pub fn aggregate_field(field: &FieldDefinition, responses: &[ResponseRecord]) -> Option<Vec<Bucket>> {
    if !field.field_type.is_aggregable() {
        return None;
    }
    let mut buckets: Vec<Bucket> = if field.field_type.is_choice() {
        field.options.iter().map(Bucket::zero).collect()
    } else {
        (RATING_MIN..=RATING_MAX).map(|r| Bucket::zero(r.to_string())).collect()
    };
    let slots: HashMap<&str, usize> = field
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| (option.as_str(), i))
        .collect();

    for response in responses {
        match (field.field_type, response.answer(&field.id)) {
            (FieldType::Radio | FieldType::Dropdown, Some(Answer::Choice(choice))) => {
                if let Some(&i) = slots.get(choice.as_str()) {
                    buckets[i].count += 1;
                }
            }
            (FieldType::Checkbox, Some(answer @ Answer::Checkboxes(_))) => {
                for option in answer.checked_options() {
                    if let Some(&i) = slots.get(option) {
                        buckets[i].count += 1;
                    }
                }
            }
            (FieldType::Rating, Some(Answer::Rating(rating))) => {
                if (RATING_MIN..=RATING_MAX).contains(rating) {
                    buckets[usize::from(rating - RATING_MIN)].count += 1;
                }
            }
            _ => {}
        }
    }

    Some(buckets)
}

/// Header plus one row per response, in field order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FlatTable {
    /// Render as CSV text, quoting cells where needed.
    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv output is not utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Project responses onto a flat table.
///
/// Checkbox answers collapse to their checked options joined by `", "`; the
/// unchecked detail is not kept.
pub fn to_flat_table(form: &Form, responses: &[ResponseRecord]) -> FlatTable {
    let header = std::iter::once(SUBMITTED_AT_HEADER.to_string())
        .chain(form.fields().iter().map(|f| f.label.clone()))
        .collect();

    let rows = responses
        .iter()
        .map(|response| {
            std::iter::once(response.created_at().format(SUBMITTED_AT_FORMAT).to_string())
                .chain(form.fields().iter().map(|f| render_cell(f, response.answer(&f.id))))
                .collect()
        })
        .collect();

    FlatTable { header, rows }
}

fn render_cell(field: &FieldDefinition, answer: Option<&Answer>) -> String {
    match answer {
        None => String::new(),
        Some(Answer::Text(s) | Answer::Date(s) | Answer::Choice(s)) => s.clone(),
        Some(Answer::Rating(rating)) => rating.to_string(),
        Some(answer @ Answer::Checkboxes(_)) => {
            let checked: Vec<&str> = answer.checked_options().collect();
            // declared order first, then anything the schema no longer declares
            let mut cell: Vec<&str> = field
                .options
                .iter()
                .map(String::as_str)
                .filter(|o| checked.contains(o))
                .collect();
            cell.extend(checked.iter().filter(|o| !field.has_option(o)));
            cell.join(", ")
        }
    }
}

/// Tabulation of one aggregable field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldAnalytics {
    pub field_id: String,
    pub label: String,
    pub field_type: FieldType,
    pub buckets: Vec<Bucket>,
}

/// Analytics overview of one form
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FormSummary {
    pub form_id: FormId,
    pub title: String,
    pub total_responses: u64,
    pub field_count: usize,
    pub latest_response_at: Option<DateTime<Utc>>,
    pub fields: Vec<FieldAnalytics>,
}

pub fn summarize(form: &Form, responses: &[ResponseRecord]) -> FormSummary {
    let fields = form
        .fields()
        .iter()
        .filter_map(|field| {
            aggregate_field(field, responses).map(|buckets| FieldAnalytics {
                field_id: field.id.clone(),
                label: field.label.clone(),
                field_type: field.field_type,
                buckets,
            })
        })
        .collect();

    FormSummary {
        form_id: form.id().clone(),
        title: form.title().to_string(),
        total_responses: responses.len() as u64,
        field_count: form.fields().len(),
        latest_response_at: responses.iter().map(ResponseRecord::created_at).max(),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{AnswerSet, OwnerId};
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn record(field_id: &str, answer: Answer) -> ResponseRecord {
        ResponseRecord::create(FormId::new(), AnswerSet::from([(field_id.to_string(), answer)]))
    }

    fn checks(pairs: &[(&str, bool)]) -> Answer {
        Answer::Checkboxes(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect::<BTreeMap<_, _>>())
    }

    fn pairs(buckets: &[Bucket]) -> Vec<(&str, u64)> {
        buckets.iter().map(|b| (b.label.as_str(), b.count)).collect()
    }

    #[test]
    fn test_checkbox_aggregation() {
        let field = FieldDefinition::new("f2", FieldType::Checkbox, "Pick").with_options(["A", "B"]);
        let responses = vec![
            record("f2", checks(&[("A", true)])),
            record("f2", checks(&[("A", true), ("B", true)])),
            record("f2", checks(&[])),
        ];
        let buckets = aggregate_field(&field, &responses).unwrap();
        assert_eq!(pairs(&buckets), vec![("A", 2), ("B", 1)]);
    }

    #[test]
    fn test_rating_aggregation() {
        let field = FieldDefinition::new("f3", FieldType::Rating, "Rate");
        let responses: Vec<_> = [5, 5, 3, 1]
            .into_iter()
            .map(|r| record("f3", Answer::Rating(r)))
            .collect();
        let buckets = aggregate_field(&field, &responses).unwrap();
        assert_eq!(pairs(&buckets), vec![("1", 1), ("2", 0), ("3", 1), ("4", 0), ("5", 2)]);
    }

    #[test]
    fn test_rating_ignores_out_of_range() {
        let field = FieldDefinition::new("f3", FieldType::Rating, "Rate");
        let responses = vec![record("f3", Answer::Rating(0)), record("f3", Answer::Rating(9))];
        let buckets = aggregate_field(&field, &responses).unwrap();
        assert!(buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_radio_keeps_declared_order_and_ignores_unknown() {
        let field = FieldDefinition::new("q", FieldType::Radio, "Q").with_options(["Yes", "No", "Maybe"]);
        let responses = vec![
            record("q", Answer::Choice("No".into())),
            record("q", Answer::Choice("Other".into())),
            record("q", Answer::Text("No".into())),
            record("other", Answer::Choice("Yes".into())),
        ];
        let buckets = aggregate_field(&field, &responses).unwrap();
        assert_eq!(pairs(&buckets), vec![("Yes", 0), ("No", 1), ("Maybe", 0)]);
        let total: u64 = buckets.iter().map(|b| b.count).sum();
        assert!(total <= responses.len() as u64);
    }

    #[test]
    fn test_aggregation_is_repeatable() {
        let field = FieldDefinition::new("q", FieldType::Dropdown, "Q").with_options(["A", "B"]);
        let responses = vec![record("q", Answer::Choice("B".into()))];
        assert_eq!(aggregate_field(&field, &responses), aggregate_field(&field, &responses));
    }

    #[test]
    fn test_free_text_is_not_aggregated() {
        for ty in [FieldType::Text, FieldType::Textarea, FieldType::Date] {
            let field = FieldDefinition::new("t", ty, "T");
            assert_eq!(aggregate_field(&field, &[]), None);
        }
    }

    fn sample_form() -> Form {
        Form::create(
            OwnerId::new("owner"),
            "Signup",
            None,
            vec![
                FieldDefinition::new("name", FieldType::Text, "name"),
                FieldDefinition::new("agree", FieldType::Checkbox, "agree").with_options(["Yes"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_flat_table_projection() {
        let form = sample_form();
        let submitted = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        let response = ResponseRecord::create_at(
            form.id().clone(),
            AnswerSet::from([
                ("name".to_string(), Answer::Text("Ann".into())),
                ("agree".to_string(), checks(&[("Yes", true)])),
            ]),
            submitted,
        );

        let table = to_flat_table(&form, &[response]);
        assert_eq!(table.header, vec![SUBMITTED_AT_HEADER, "name", "agree"]);
        assert_eq!(table.rows, vec![vec!["2024-03-09 14:05:00", "Ann", "Yes"]]);
    }

    #[test]
    fn test_flat_table_missing_and_multi_checkbox() {
        let form = Form::create(
            OwnerId::new("owner"),
            "Prefs",
            None,
            vec![
                FieldDefinition::new("note", FieldType::Text, "Note"),
                FieldDefinition::new("pick", FieldType::Checkbox, "Pick").with_options(["Zeta", "Alpha"]),
                FieldDefinition::new("score", FieldType::Rating, "Score"),
            ],
        )
        .unwrap();
        let response = ResponseRecord::create(
            form.id().clone(),
            AnswerSet::from([
                ("pick".to_string(), checks(&[("Alpha", true), ("Zeta", true)])),
                ("score".to_string(), Answer::Rating(4)),
            ]),
        );
        let table = to_flat_table(&form, &[response]);
        assert_eq!(table.rows[0][1..], ["", "Zeta, Alpha", "4"]);
    }

    #[test]
    fn test_csv_quotes_joined_cells() {
        let table = FlatTable {
            header: vec![SUBMITTED_AT_HEADER.into(), "Pick".into()],
            rows: vec![vec!["2024-03-09 14:05:00".into(), "A, B".into()]],
        };
        let csv = table.to_csv().unwrap();
        assert_eq!(csv, "Submission Date,Pick\n2024-03-09 14:05:00,\"A, B\"\n");
    }

    #[test]
    fn test_summary_skips_free_text_fields() {
        let form = sample_form();
        let early = ResponseRecord::create_at(
            form.id().clone(),
            AnswerSet::from([("agree".to_string(), checks(&[("Yes", true)]))]),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );
        let late = ResponseRecord::create_at(
            form.id().clone(),
            AnswerSet::new(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        );
        let summary = summarize(&form, &[early, late.clone()]);

        assert_eq!(summary.total_responses, 2);
        assert_eq!(summary.field_count, 2);
        assert_eq!(summary.latest_response_at, Some(late.created_at()));
        assert_eq!(summary.fields.len(), 1);
        assert_eq!(summary.fields[0].field_id, "agree");
        assert_eq!(pairs(&summary.fields[0].buckets), vec![("Yes", 1)]);
    }
}
