use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{NewReport, ReportKind};

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Required text fields were missing. Lists every failing field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("validation failed")]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

/// A submission that passed [`validate`]. The store only accepts this type,
/// so an unvalidated report can never be inserted.
#[derive(Debug, Clone)]
pub struct ValidatedReport {
    pub(crate) kind: ReportKind,
    pub(crate) item_name: String,
    pub(crate) location: String,
    pub(crate) description: String,
}

impl ValidatedReport {
    pub fn item_name(&self) -> &str {
        &self.item_name
    }
}

/// Checks that `item_name` and `location` are non-empty after trimming.
/// Accepted names are stored trimmed; the description is kept as entered.
pub fn validate(new: NewReport) -> Result<ValidatedReport, ValidationError> {
    let item_name = new.item_name.trim();
    let location = new.location.trim();

    let mut fields = Vec::new();
    if item_name.is_empty() {
        fields.push(FieldError::new("itemName", "item name is required"));
    }
    if location.is_empty() {
        fields.push(FieldError::new("location", "location is required"));
    }
    if !fields.is_empty() {
        return Err(ValidationError { fields });
    }

    Ok(ValidatedReport {
        kind: new.kind,
        item_name: item_name.to_string(),
        location: location.to_string(),
        description: new.description,
    })
}
