//! Error types and the normalized validation error format.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned by the evaluator when a rule could not be run at all.
///
/// Constraint failures are never errors: they come back as `Ok(Some(message))`.
/// This only surfaces rejections from caller-supplied async predicates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("Predicate for rule '{rule}' failed: {reason}")]
    Predicate { rule: &'static str, reason: String },
}

/// Error building rules from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid rule configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid regex pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// One failed field in a payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    /// Payload key
    pub field: String,
    /// Code of the rule that failed (e.g. "required", "email", "unique")
    pub code: String,
    /// Message shown to the shopper
    pub message: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Field errors of a rejected payload, in the order they were recorded.
///
/// A `Vec` rather than a map so the same payload always renders the same
/// response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn add(
        &mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(FieldError::new(field, code, message));
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Append the errors of another collection after these.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// First error recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Fields with at least one error, each listed once.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.errors.len());
        for error in &self.errors {
            if !names.contains(&error.field.as_str()) {
                names.push(&error.field);
            }
        }
        names
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Render as the `validation_error` response body.
    pub fn to_api_error(&self) -> ApiValidationError {
        ApiValidationError {
            error: ErrorBody {
                error_type: VALIDATION_ERROR_TYPE.to_string(),
                message: VALIDATION_FAILED.to_string(),
                fields: self.errors.clone(),
            },
        }
    }
}

const VALIDATION_ERROR_TYPE: &str = "validation_error";
const VALIDATION_FAILED: &str = "Validation failed";

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field_names().as_slice() {
            [] => f.write_str(VALIDATION_FAILED),
            names => write!(f, "{VALIDATION_FAILED} for {}", names.join(", ")),
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl FromIterator<FieldError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

/// Response body for a rejected request:
///
/// ```json
/// {
///   "error": {
///     "type": "validation_error",
///     "message": "Validation failed",
///     "fields": [{"field": "quantity", "code": "range", "message": "Must be between 1 and 99"}]
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiValidationError {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub fields: Vec<FieldError>,
}

/// Recover the field errors from a decoded response, e.g. in a client.
impl From<ApiValidationError> for ValidationErrors {
    fn from(api: ApiValidationError) -> Self {
        api.error.fields.into_iter().collect()
    }
}
