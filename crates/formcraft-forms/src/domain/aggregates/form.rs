//! Form Aggregate
//!
//! A form owns its ordered field definitions. Field order is display order and
//! CSV column order, and only changes by replacing the whole list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::domain::value_objects::{FieldType, FormId, OwnerId, Template};

/// One input of a form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

impl FieldDefinition {
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            placeholder: None,
            options: vec![],
            required: false,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if self.id.trim().is_empty() {
            return Err(SchemaError::EmptyFieldId);
        }
        if self.label.trim().is_empty() {
            return Err(SchemaError::EmptyLabel(self.id.clone()));
        }
        if !self.field_type.is_choice() {
            return Ok(());
        }
        if self.options.is_empty() {
            return Err(SchemaError::MissingOptions(self.id.clone()));
        }
        let mut seen = HashSet::new();
        for option in &self.options {
            if option.is_empty() {
                return Err(SchemaError::EmptyOption(self.id.clone()));
            }
            if !seen.insert(option.as_str()) {
                return Err(SchemaError::DuplicateOption {
                    field_id: self.id.clone(),
                    option: option.clone(),
                });
            }
        }
        Ok(())
    }

    /// Options only mean something on choice fields.
    fn normalize(mut self) -> Self {
        if !self.field_type.is_choice() {
            self.options.clear();
        }
        self
    }
}

/// Check a whole field list and return it normalized.
pub fn validate_fields(fields: Vec<FieldDefinition>) -> Result<Vec<FieldDefinition>, SchemaError> {
    if fields.is_empty() {
        return Err(SchemaError::NoFields);
    }
    let mut ids = HashSet::new();
    for field in &fields {
        field.validate()?;
        if !ids.insert(field.id.as_str()) {
            return Err(SchemaError::DuplicateFieldId(field.id.clone()));
        }
    }
    Ok(fields.into_iter().map(FieldDefinition::normalize).collect())
}

fn validate_title(title: String) -> Result<String, SchemaError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(SchemaError::EmptyTitle);
    }
    Ok(title.to_string())
}

/// Form aggregate root
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Form {
    id: FormId,
    owner: OwnerId,
    title: String,
    template: Template,
    fields: Vec<FieldDefinition>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Form {
    /// Create a new form owned by `owner`
    pub fn create(
        owner: OwnerId,
        title: impl Into<String>,
        template: Option<Template>,
        fields: Vec<FieldDefinition>,
    ) -> Result<Self, SchemaError> {
        let title = validate_title(title.into())?;
        let fields = validate_fields(fields)?;
        let now = Utc::now();
        Ok(Self {
            id: FormId::new(),
            owner,
            title,
            template: template.unwrap_or_default(),
            fields,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> &FormId { &self.id }
    pub fn owner(&self) -> &OwnerId { &self.owner }
    pub fn title(&self) -> &str { &self.title }
    pub fn template(&self) -> Template { self.template }
    pub fn fields(&self) -> &[FieldDefinition] { &self.fields }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.owner == owner
    }

    /// Replace each present part wholesale. Nothing changes unless every part is valid.
    pub fn update(
        &mut self,
        title: Option<String>,
        template: Option<Template>,
        fields: Option<Vec<FieldDefinition>>,
    ) -> Result<(), SchemaError> {
        let title = title.map(validate_title).transpose()?;
        let fields = fields.map(validate_fields).transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(template) = template {
            self.template = template;
        }
        if let Some(fields) = fields {
            self.fields = fields;
        }
        self.touch();
        Ok(())
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

/// Structural problems in a form definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("form title is required")]
    EmptyTitle,

    #[error("form must have at least one field")]
    NoFields,

    #[error("field id is required")]
    EmptyFieldId,

    #[error("duplicate field id: {0}")]
    DuplicateFieldId(String),

    #[error("field {0} has no label")]
    EmptyLabel(String),

    #[error("choice field {0} requires at least one option")]
    MissingOptions(String),

    #[error("field {0} has an empty option")]
    EmptyOption(String),

    #[error("field {field_id} repeats option {option}")]
    DuplicateOption { field_id: String, option: String },
}
