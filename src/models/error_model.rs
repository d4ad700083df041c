use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub const REQUIRED_REASON: &str = "Value is required and can't be empty";

/// Field name to a map of rule name to message, as returned by the API.
pub type FieldErrors = BTreeMap<String, BTreeMap<String, String>>;

/// A validation failure, either reported by the case-management API or raised
/// by a form check before the API is called.
///
/// # Fields
/// - `detail` - A summary of the problem
/// - `field` - Messages for each invalid field
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(default)]
    pub detail: String,
    #[serde(default, rename = "validation_errors", alias = "validationErrors")]
    pub field: FieldErrors,
}

impl ValidationError {
    pub fn from_fields(field: FieldErrors) -> Self {
        Self {
            detail: String::new(),
            field,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.field.is_empty() || !self.detail.is_empty()
    }

    /// Every message for `name`, for rendering beside the form field.
    pub fn messages(&self, name: &str) -> Vec<String> {
        self.field
            .get(name)
            .map(|rules| rules.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.detail.is_empty() {
            f.write_str("validation error")
        } else {
            f.write_str(&self.detail)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Records a single `reason` message against a field.
pub fn add_reason(errors: &mut FieldErrors, field: &str, reason: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .insert("reason".to_string(), reason.to_string());
}

/// Records the "required" message against a field.
pub fn required(errors: &mut FieldErrors, field: &str) {
    add_reason(errors, field, REQUIRED_REASON);
}
