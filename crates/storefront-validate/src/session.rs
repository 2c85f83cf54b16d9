//! Per-field validation state for interactive forms.
//!
//! The evaluator is stateless, so a form that revalidates as the user types
//! can have several evaluations of the same field in flight at once (a slow
//! `unique` lookup for "ali" finishing after the one for "alice").
//! [`ValidationSession`] versions each field: every [`begin`] bumps the
//! version, and [`complete`] only records results from the latest one.
//!
//! [`begin`]: ValidationSession::begin
//! [`complete`]: ValidationSession::complete

use crate::error::EvaluationError;
use crate::evaluate::evaluate;
use crate::rule::Rule;
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Message recorded when a custom predicate could not run.
pub const VALIDATION_UNAVAILABLE: &str = "Validation unavailable";

#[derive(Debug, Default)]
struct FieldState {
    version: u64,
    pending: bool,
    error: Option<String>,
}

/// Handle for one in-flight evaluation of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    field: String,
    version: u64,
}

impl Ticket {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

/// What happened to a completed evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The result was recorded; carries the field's error, if any
    Applied(Option<String>),
    /// A newer evaluation had started; the result was dropped
    Stale,
}

/// Tracks the latest validation outcome of each field.
#[derive(Debug, Default)]
pub struct ValidationSession {
    fields: Mutex<HashMap<String, FieldState>>,
}

impl ValidationSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HashMap<String, FieldState>> {
        // Every update is a single assignment, so a poisoned map is still
        // consistent.
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start an evaluation of `field`, superseding any in flight.
    pub fn begin(&self, field: impl Into<String>) -> Ticket {
        let field = field.into();
        let mut fields = self.state();
        let state = fields.entry(field.clone()).or_default();
        state.version += 1;
        state.pending = true;
        Ticket {
            field,
            version: state.version,
        }
    }

    /// Record the outcome of the evaluation started by `ticket`.
    ///
    /// Outcomes from superseded tickets are dropped. A predicate error is
    /// recorded as [`VALIDATION_UNAVAILABLE`].
    pub fn complete(
        &self,
        ticket: Ticket,
        outcome: Result<Option<String>, EvaluationError>,
    ) -> Completion {
        let mut fields = self.state();
        let Some(state) = fields.get_mut(&ticket.field) else {
            return Completion::Stale;
        };
        if state.version != ticket.version {
            tracing::debug!(
                field = %ticket.field,
                version = ticket.version,
                latest = state.version,
                "Discarding stale validation result"
            );
            return Completion::Stale;
        }

        let error = match outcome {
            Ok(error) => error,
            Err(e) => {
                tracing::warn!(field = %ticket.field, error = %e, "Field validation unavailable");
                Some(VALIDATION_UNAVAILABLE.to_string())
            }
        };
        state.pending = false;
        state.error = error.clone();
        Completion::Applied(error)
    }

    /// Evaluate `value` for `field` and record the result if still current.
    pub async fn validate_field(
        &self,
        field: impl Into<String>,
        value: &Value,
        rules: &[Rule],
    ) -> Completion {
        let ticket = self.begin(field);
        let outcome = evaluate(value, rules).await;
        self.complete(ticket, outcome)
    }

    /// Current error of `field`.
    pub fn error(&self, field: &str) -> Option<String> {
        self.state().get(field).and_then(|s| s.error.clone())
    }

    /// All current errors, keyed by field.
    pub fn errors(&self) -> BTreeMap<String, String> {
        self.state()
            .iter()
            .filter_map(|(field, s)| s.error.clone().map(|e| (field.clone(), e)))
            .collect()
    }

    /// Whether an evaluation of `field` is in flight.
    pub fn is_validating(&self, field: &str) -> bool {
        self.state().get(field).is_some_and(|s| s.pending)
    }

    /// No errors recorded and nothing in flight.
    pub fn is_valid(&self) -> bool {
        self.state()
            .values()
            .all(|s| s.error.is_none() && !s.pending)
    }

    /// Forget the error of `field` and drop any in-flight result for it.
    pub fn clear(&self, field: &str) {
        if let Some(state) = self.state().get_mut(field) {
            state.version += 1;
            state.pending = false;
            state.error = None;
        }
    }
}
