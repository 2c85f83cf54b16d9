//! # Storefront Validation
//!
//! Field validation for the Storefront commerce app, shared by the checkout
//! and account forms and by the REST backend's request handling.
//!
//! A field is validated by an ordered list of [`Rule`]s. Each rule is built by
//! a factory in [`rules`] and checks one thing; the [`evaluate`] function runs
//! them in order and reports the first failure as a user-facing message.
//!
//! ## Example
//!
//! ```rust,ignore
//! use storefront_validate::prelude::*;
//!
//! let rules = [
//!     required("Enter an email address"),
//!     email(()),
//!     unique(accounts.clone(), "An account with this email already exists"),
//! ];
//!
//! match evaluate(&Value::from(input), &rules).await? {
//!     None => println!("ok"),
//!     Some(message) => println!("{message}"),
//! }
//! ```
//!
//! ## Rules
//!
//! - `required`, `min_length`, `max_length`, `pattern` - declarative checks
//! - `email`, `url`, `phone` - built-in patterns
//! - `min`, `max`, `range` - numeric bounds ("Must be a number" for non-numbers)
//! - `date`, `future_date`, `past_date` - `YYYY-MM-DD` or `MM/DD/YYYY`
//! - `confirmation` - equals another field's live value
//! - `unique` - async lookup through a [`UniquenessCheck`]
//! - `file_size`, `file_type` - uploaded file metadata
//! - `custom`, `satisfies`, `custom_async` - caller-defined predicates
//!
//! ## Error Format
//!
//! [`PayloadValidator`] collects failures into [`ValidationErrors`], which
//! render as:
//!
//! ```json
//! {
//!   "error": {
//!     "type": "validation_error",
//!     "message": "Validation failed",
//!     "fields": [
//!       {"field": "email", "code": "email", "message": "Please enter a valid email address"}
//!     ]
//!   }
//! }
//! ```

mod config;
mod error;
mod evaluate;
mod payload;
mod rule;
pub mod rules;
mod session;
mod value;


pub use config::{FieldSchema, FieldSpec, RuleSpec};
pub use error::{
    ApiValidationError, ConfigError, ErrorBody, EvaluationError, FieldError, ValidationErrors,
};
pub use evaluate::{evaluate, first_failure, Failure, RuleSet};
pub use payload::PayloadValidator;
pub use rule::{Predicate, Rule, RuleKind, RuleOptions};
pub use rules::{CheckFn, UniquenessCheck};
pub use session::{Completion, Ticket, ValidationSession, VALIDATION_UNAVAILABLE};
pub use value::{FileInfo, Value};

/// Re-exported for implementing [`Predicate`] and [`UniquenessCheck`].
pub use async_trait::async_trait;

/// Prelude module for validation
pub mod prelude {
    pub use crate::async_trait;
    pub use crate::config::{FieldSchema, RuleSpec};
    pub use crate::error::{EvaluationError, FieldError, ValidationErrors};
    pub use crate::evaluate::{evaluate, RuleSet};
    pub use crate::payload::PayloadValidator;
    pub use crate::rule::{Predicate, Rule, RuleOptions};
    pub use crate::rules::*;
    pub use crate::session::{Completion, ValidationSession};
    pub use crate::value::{FileInfo, Value};
}
