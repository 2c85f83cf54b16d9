//! Request payload validation.
//!
//! [`PayloadValidator`] runs per-field rule sets over a JSON request body and
//! normalizes failures into [`ValidationErrors`], ready to be rendered as the
//! API's `validation_error` response.
//!
//! ## Example
//!
//! ```rust,ignore
//! use storefront_validate::prelude::*;
//!
//! let validator = PayloadValidator::new()
//!     .field("email", [required(()), email(()), unique(accounts.clone(), ())])
//!     .field("password", [required(()), min_length(8, ())]);
//!
//! match validator.validate(&body).await? {
//!     Ok(()) => create_account(body).await,
//!     Err(errors) => respond(422, errors.to_api_error()),
//! }
//! ```

use crate::config::FieldSchema;
use crate::error::{ConfigError, EvaluationError, FieldError, ValidationErrors};
use crate::evaluate::RuleSet;
use crate::value::Value;
use futures_util::future::join_all;

/// Validates JSON payloads field by field.
#[derive(Debug, Clone, Default)]
pub struct PayloadValidator {
    fields: Vec<(String, RuleSet)>,
}

impl PayloadValidator {
    /// Create a validator with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a validator from a declarative schema.
    pub fn from_schema(schema: &FieldSchema) -> Result<Self, ConfigError> {
        Ok(Self {
            fields: schema.build()?,
        })
    }

    /// Add rules for a field. Field order is the order errors are reported in.
    pub fn field(mut self, name: impl Into<String>, rules: impl Into<RuleSet>) -> Self {
        self.fields.push((name.into(), rules.into()));
        self
    }

    /// Names of the configured fields.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Validate a single field of an already-converted value.
    ///
    /// Fields without rules pass.
    pub async fn validate_field(
        &self,
        field: &str,
        value: &Value,
    ) -> Result<Option<FieldError>, EvaluationError> {
        let Some((name, rules)) = self.fields.iter().find(|(name, _)| name == field) else {
            return Ok(None);
        };
        failed_field(name, rules, value).await
    }

    /// Validate a JSON object payload.
    ///
    /// Each field's rules run in order; distinct fields are validated
    /// concurrently. Missing fields are treated as null. The outer `Result`
    /// carries predicate errors; the inner one carries validation failures,
    /// at most one per field.
    pub async fn validate(
        &self,
        payload: &serde_json::Value,
    ) -> Result<Result<(), ValidationErrors>, EvaluationError> {
        let values: Vec<Value> = self
            .fields
            .iter()
            .map(|(name, _)| payload.get(name).map(Value::from_json).unwrap_or(Value::Null))
            .collect();

        let outcomes = join_all(
            self.fields
                .iter()
                .zip(&values)
                .map(|((name, rules), value)| failed_field(name, rules, value)),
        )
        .await;

        let mut errors = ValidationErrors::new();
        for outcome in outcomes {
            if let Some(error) = outcome? {
                errors.push(error);
            }
        }

        if !errors.is_empty() {
            tracing::debug!(
                failed = ?errors.field_names(),
                "Payload validation failed"
            );
        }
        Ok(errors.into_result())
    }
}

/// Evaluate one field, tagging a failure with the code of the failing rule.
async fn failed_field(
    name: &str,
    rules: &RuleSet,
    value: &Value,
) -> Result<Option<FieldError>, EvaluationError> {
    Ok(rules
        .first_failure(value)
        .await?
        .map(|failure| FieldError::new(name, failure.rule, failure.message)))
}
