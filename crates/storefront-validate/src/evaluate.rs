//! The evaluator: applies an ordered rule list to one value.

use crate::error::EvaluationError;
use crate::rule::{Rule, RuleKind};
use crate::value::Value;

/// The first failing rule of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Code of the rule that failed (see [`Rule::name`])
    pub rule: &'static str,
    /// User-facing message
    pub message: String,
}

/// Evaluate `rules` against `value`, in order, stopping at the first failure.
///
/// Returns `Ok(None)` when every rule passes and `Ok(Some(message))` for the
/// first failing rule. Rules run strictly one after another: an async rule
/// is awaited before the next rule starts, so cheap rules placed first keep
/// expensive lookups from being issued at all.
///
/// Empty values only reach `Required` (which fails) and custom predicates
/// (which decide for themselves); length and pattern checks skip them.
///
/// `Err` is returned only when a caller-supplied custom predicate rejects.
pub async fn evaluate(value: &Value, rules: &[Rule]) -> Result<Option<String>, EvaluationError> {
    Ok(first_failure(value, rules).await?.map(|failure| failure.message))
}

/// Like [`evaluate`], but also reports which rule failed.
pub async fn first_failure(
    value: &Value,
    rules: &[Rule],
) -> Result<Option<Failure>, EvaluationError> {
    let empty = value.is_empty();

    for rule in rules {
        let failure = match rule.kind() {
            RuleKind::Required => empty.then(|| rule.message().to_string()),
            RuleKind::MinLength(_) | RuleKind::MaxLength(_) | RuleKind::Pattern(_) if empty => None,
            RuleKind::MinLength(n) => {
                (value.to_string().chars().count() < *n).then(|| rule.message().to_string())
            }
            RuleKind::MaxLength(n) => {
                (value.to_string().chars().count() > *n).then(|| rule.message().to_string())
            }
            RuleKind::Pattern(re) => {
                (!re.is_match(&value.to_string())).then(|| rule.message().to_string())
            }
            RuleKind::Custom(predicate) => predicate
                .check(value)
                .await
                .map_err(|reason| EvaluationError::Predicate {
                    rule: rule.name(),
                    reason,
                })?
                .filter(|message| !message.is_empty()),
        };

        if let Some(message) = failure {
            tracing::debug!(rule = rule.name(), message = %message, "Rule failed");
            return Ok(Some(Failure {
                rule: rule.name(),
                message,
            }));
        }
        tracing::trace!(rule = rule.name(), "Rule passed");
    }

    Ok(None)
}

/// An owned, ordered list of rules for one field.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append a rule in place.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether the set has a `Required` rule.
    pub fn is_required(&self) -> bool {
        self.rules.iter().any(Rule::is_required)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate the set against `value`. See [`evaluate`].
    pub async fn evaluate(&self, value: &Value) -> Result<Option<String>, EvaluationError> {
        evaluate(value, &self.rules).await
    }

    /// Evaluate the set, reporting the failing rule. See [`first_failure`].
    pub async fn first_failure(&self, value: &Value) -> Result<Option<Failure>, EvaluationError> {
        first_failure(value, &self.rules).await
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl<const N: usize> From<[Rule; N]> for RuleSet {
    fn from(rules: [Rule; N]) -> Self {
        Self {
            rules: rules.into(),
        }
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
