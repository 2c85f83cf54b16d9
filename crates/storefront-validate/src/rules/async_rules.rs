//! Asynchronous rule factories.
//!
//! These rules await outside work, typically a round trip to the catalog or
//! account service.

use crate::rule::{AsyncFnPredicate, Predicate, Rule, RuleOptions};
use crate::value::Value;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Message when the uniqueness backend could not answer.
pub const UNABLE_TO_VERIFY: &str = "Unable to verify uniqueness";

/// Trait for remote uniqueness lookups.
///
/// `Ok(true)` means the value is free to use. `Err` means the lookup itself
/// failed (network, database); the `unique` rule reports that as
/// [`UNABLE_TO_VERIFY`] rather than letting the value through.
#[async_trait]
pub trait UniquenessCheck: Send + Sync {
    /// Check whether `value` is unused.
    async fn is_unique(&self, value: &str) -> Result<bool, String>;
}

#[async_trait]
impl<T: UniquenessCheck + ?Sized> UniquenessCheck for Arc<T> {
    async fn is_unique(&self, value: &str) -> Result<bool, String> {
        (**self).is_unique(value).await
    }
}

/// Uniqueness check backed by an async closure.
///
/// ```rust,ignore
/// let rule = unique(check_fn(|sku: String| async move { catalog.sku_free(&sku).await }), ());
/// ```
pub struct CheckFn<F>(F);

/// Wrap an async closure as a [`UniquenessCheck`].
pub fn check_fn<F, Fut>(f: F) -> CheckFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool, String>> + Send + 'static,
{
    CheckFn(f)
}

#[async_trait]
impl<F, Fut> UniquenessCheck for CheckFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool, String>> + Send + 'static,
{
    async fn is_unique(&self, value: &str) -> Result<bool, String> {
        (self.0)(value.to_string()).await
    }
}

struct UniquePredicate<C> {
    check: C,
    taken: String,
}

#[async_trait]
impl<C: UniquenessCheck> Predicate for UniquePredicate<C> {
    async fn check(&self, value: &Value) -> Result<Option<String>, String> {
        if value.is_empty() {
            return Ok(None);
        }

        let candidate = value.to_string();
        match self.check.is_unique(&candidate).await {
            Ok(true) => Ok(None),
            Ok(false) => Ok(Some(self.taken.clone())),
            Err(reason) => {
                tracing::warn!(error = %reason, "Uniqueness check failed");
                Ok(Some(UNABLE_TO_VERIFY.to_string()))
            }
        }
    }
}

/// Value must not already be in use, as reported by `check`.
///
/// Empty values pass without calling `check`. A failing lookup never lets
/// the value through: it fails with [`UNABLE_TO_VERIFY`].
pub fn unique(check: impl UniquenessCheck + 'static, options: impl Into<RuleOptions>) -> Rule {
    let message = options
        .into()
        .message_or_else(|| "This value is already taken".to_string());
    let predicate = UniquePredicate {
        check,
        taken: message.clone(),
    };
    Rule::from_predicate("unique", predicate, message)
}

/// Arbitrary asynchronous check.
///
/// `check` resolves to `Ok(None)` to pass or `Ok(Some(message))` to fail.
/// `Err` is not converted: it reaches the caller as
/// [`EvaluationError::Predicate`](crate::EvaluationError::Predicate).
pub fn custom_async<F, Fut>(check: F, options: impl Into<RuleOptions>) -> Rule
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<String>, String>> + Send + 'static,
{
    let message = options.into().message_or_else(|| "Invalid value".to_string());
    Rule::from_predicate("custom", AsyncFnPredicate(check), message)
}
