//! The rule data model.
//!
//! A [`Rule`] describes exactly one constraint plus its failure message. The
//! constraint is a [`RuleKind`]: one of four declarative checks the evaluator
//! runs inline, or a [`Predicate`] it awaits. Anything needing coercion or
//! I/O (numeric bounds, dates, confirmation, uniqueness, files) is built as a
//! predicate by the factories in [`crate::rules`], so the evaluator never
//! grows factory-specific branches.

use crate::value::Value;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Trait for rule predicates.
///
/// Returns `Ok(None)` on pass and `Ok(Some(message))` on failure. A blank
/// message also counts as a pass. `Err` means the predicate itself could not
/// run; the evaluator surfaces that as
/// [`EvaluationError::Predicate`](crate::EvaluationError::Predicate).
///
/// ## Example
///
/// ```rust,ignore
/// use storefront_validate::prelude::*;
///
/// struct NotAdmin;
///
/// #[async_trait]
/// impl Predicate for NotAdmin {
///     async fn check(&self, value: &Value) -> Result<Option<String>, String> {
///         if value.to_string().eq_ignore_ascii_case("admin") {
///             Ok(Some("Username is reserved".to_string()))
///         } else {
///             Ok(None)
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Predicate: Send + Sync {
    /// Check the value.
    async fn check(&self, value: &Value) -> Result<Option<String>, String>;
}

/// Adapter for synchronous closures.
pub(crate) struct FnPredicate<F>(pub(crate) F);

#[async_trait]
impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&Value) -> Option<String> + Send + Sync,
{
    async fn check(&self, value: &Value) -> Result<Option<String>, String> {
        Ok((self.0)(value))
    }
}

/// Adapter for closures returning a future.
///
/// The closure receives an owned copy of the value so the future can be
/// `'static`.
pub(crate) struct AsyncFnPredicate<F>(pub(crate) F);

#[async_trait]
impl<F, Fut> Predicate for AsyncFnPredicate<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<String>, String>> + Send + 'static,
{
    async fn check(&self, value: &Value) -> Result<Option<String>, String> {
        (self.0)(value.clone()).await
    }
}

/// The constraint a rule applies.
#[derive(Clone)]
pub enum RuleKind {
    /// Value must not be empty
    Required,
    /// Coerced string must have at least this many characters
    MinLength(usize),
    /// Coerced string must have at most this many characters
    MaxLength(usize),
    /// Coerced string must match
    Pattern(Regex),
    /// Arbitrary, possibly asynchronous check
    Custom(Arc<dyn Predicate>),
}

impl fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Required => f.write_str("Required"),
            RuleKind::MinLength(n) => f.debug_tuple("MinLength").field(n).finish(),
            RuleKind::MaxLength(n) => f.debug_tuple("MaxLength").field(n).finish(),
            RuleKind::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            RuleKind::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A single validation constraint with its failure message.
///
/// Rules are immutable once built and cheap to clone; the same rule can be
/// shared across fields and evaluations.
#[derive(Debug, Clone)]
pub struct Rule {
    name: &'static str,
    kind: RuleKind,
    message: String,
}

impl Rule {
    /// Create a rule from its parts.
    ///
    /// Prefer the factories in [`crate::rules`]; this is for callers adding
    /// their own rule families on top of [`RuleKind::Custom`].
    pub fn new(name: &'static str, kind: RuleKind, message: impl Into<String>) -> Self {
        Self {
            name,
            kind,
            message: message.into(),
        }
    }

    /// Wrap a predicate into a custom rule.
    pub fn from_predicate(
        name: &'static str,
        predicate: impl Predicate + 'static,
        message: impl Into<String>,
    ) -> Self {
        Self::new(name, RuleKind::Custom(Arc::new(predicate)), message)
    }

    /// Stable code of the factory that built this rule (e.g. `"min"`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The constraint.
    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Message reported when a declarative constraint fails.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this is a `Required` rule.
    pub fn is_required(&self) -> bool {
        matches!(self.kind, RuleKind::Required)
    }
}

/// Options accepted by every rule factory.
///
/// Anything that converts into `RuleOptions` can be passed: `()` for the
/// defaults, or a `&str`/`String` to override the message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOptions {
    /// Custom failure message; the factory default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RuleOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom failure message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub(crate) fn message_or_else(self, default: impl FnOnce() -> String) -> String {
        self.message.unwrap_or_else(default)
    }
}

impl From<()> for RuleOptions {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<&str> for RuleOptions {
    fn from(message: &str) -> Self {
        Self::new().message(message)
    }
}

impl From<String> for RuleOptions {
    fn from(message: String) -> Self {
        Self::new().message(message)
    }
}

impl From<Option<String>> for RuleOptions {
    fn from(message: Option<String>) -> Self {
        Self { message }
    }
}
