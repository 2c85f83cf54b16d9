//! Synchronous rule factories.
//!
//! Each factory is a pure function producing one [`Rule`]. Declarative
//! factories (`required`, `min_length`, `max_length`, `pattern` and the
//! pattern-backed `email`, `url`, `phone`) fill in a [`RuleKind`] directly.
//! Everything needing coercion or outside state is a custom predicate with
//! its message baked in.

use crate::rule::{FnPredicate, Rule, RuleKind, RuleOptions};
use crate::value::Value;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Message for values that cannot be read as a number.
pub const NOT_A_NUMBER: &str = "Must be a number";

/// Message for text that is not a recognized calendar date.
pub const INVALID_DATE: &str = "Please enter a valid date";

// Pre-compiled regex patterns
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap())
}

fn phone_regex() -> &'static Regex {
    // Optional +1, area code with or without parentheses, 10 digits total
    PHONE_REGEX.get_or_init(|| {
        Regex::new(r"^(\+1[\s-]?)?(\(\d{3}\)|\d{3})[\s-]?\d{3}[\s-]?\d{4}$").unwrap()
    })
}

/// Parse `YYYY-MM-DD` or `MM/DD/YYYY`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%m/%d/%Y"))
        .ok()
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Value must be present.
pub fn required(options: impl Into<RuleOptions>) -> Rule {
    let message = options
        .into()
        .message_or_else(|| "This field is required".to_string());
    Rule::new("required", RuleKind::Required, message)
}

/// String form must have at least `n` characters.
pub fn min_length(n: usize, options: impl Into<RuleOptions>) -> Rule {
    let message = options
        .into()
        .message_or_else(|| format!("Must be at least {n} characters"));
    Rule::new("min_length", RuleKind::MinLength(n), message)
}

/// String form must have at most `n` characters.
pub fn max_length(n: usize, options: impl Into<RuleOptions>) -> Rule {
    let message = options
        .into()
        .message_or_else(|| format!("Must be no more than {n} characters"));
    Rule::new("max_length", RuleKind::MaxLength(n), message)
}

/// String form must match `regex`.
pub fn pattern(regex: Regex, options: impl Into<RuleOptions>) -> Rule {
    let message = options.into().message_or_else(|| "Invalid format".to_string());
    Rule::new("pattern", RuleKind::Pattern(regex), message)
}

/// Arbitrary synchronous check.
///
/// `check` returns `None` to pass or the failure message. The rule's own
/// message (default "Invalid value") is informational only.
pub fn custom<F>(check: F, options: impl Into<RuleOptions>) -> Rule
where
    F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
{
    let message = options.into().message_or_else(|| "Invalid value".to_string());
    Rule::from_predicate("custom", FnPredicate(check), message)
}

/// Boolean check; `false` fails with the rule message (default "Invalid value").
pub fn satisfies<F>(pred: F, options: impl Into<RuleOptions>) -> Rule
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    let message = options.into().message_or_else(|| "Invalid value".to_string());
    let failure = message.clone();
    Rule::from_predicate(
        "custom",
        FnPredicate(move |value: &Value| (!pred(value)).then(|| failure.clone())),
        message,
    )
}

fn numeric_rule<F>(name: &'static str, in_bounds: F, message: String) -> Rule
where
    F: Fn(f64) -> bool + Send + Sync + 'static,
{
    let failure = message.clone();
    let check = move |value: &Value| {
        if value.is_empty() {
            return None;
        }
        match value.as_number() {
            None => Some(NOT_A_NUMBER.to_string()),
            Some(n) if in_bounds(n) => None,
            Some(_) => Some(failure.clone()),
        }
    };
    Rule::from_predicate(name, FnPredicate(check), message)
}

/// Numeric value must be at least `n`.
pub fn min(n: impl Into<f64>, options: impl Into<RuleOptions>) -> Rule {
    let n = n.into();
    let message = options.into().message_or_else(|| format!("Must be at least {n}"));
    numeric_rule("min", move |v| v >= n, message)
}

/// Numeric value must be at most `n`.
pub fn max(n: impl Into<f64>, options: impl Into<RuleOptions>) -> Rule {
    let n = n.into();
    let message = options
        .into()
        .message_or_else(|| format!("Must be no more than {n}"));
    numeric_rule("max", move |v| v <= n, message)
}

/// Numeric value must lie in `lo..=hi`.
pub fn range(lo: impl Into<f64>, hi: impl Into<f64>, options: impl Into<RuleOptions>) -> Rule {
    let (lo, hi) = (lo.into(), hi.into());
    let message = options
        .into()
        .message_or_else(|| format!("Must be between {lo} and {hi}"));
    numeric_rule("range", move |v| lo <= v && v <= hi, message)
}

/// Loose email check: `local@domain.tld` without whitespace.
pub fn email(options: impl Into<RuleOptions>) -> Rule {
    let message = options
        .into()
        .message_or_else(|| "Please enter a valid email address".to_string());
    Rule::new("email", RuleKind::Pattern(email_regex().clone()), message)
}

/// `http://` or `https://` URL with a host.
pub fn url(options: impl Into<RuleOptions>) -> Rule {
    let message = options
        .into()
        .message_or_else(|| "Please enter a valid URL".to_string());
    Rule::new("url", RuleKind::Pattern(url_regex().clone()), message)
}

/// US phone number.
pub fn phone(options: impl Into<RuleOptions>) -> Rule {
    let message = options
        .into()
        .message_or_else(|| "Please enter a valid phone number".to_string());
    Rule::new("phone", RuleKind::Pattern(phone_regex().clone()), message)
}

/// Shared shape of the date family: empty passes, non-dates fail with
/// [`INVALID_DATE`], parsed dates go through `accept`.
fn date_rule<F>(name: &'static str, accept: F, message: String) -> Rule
where
    F: Fn(NaiveDate) -> bool + Send + Sync + 'static,
{
    let failure = message.clone();
    let check = move |value: &Value| {
        if value.is_empty() {
            return None;
        }
        match value.as_text().and_then(parse_date) {
            None => Some(INVALID_DATE.to_string()),
            Some(date) if accept(date) => None,
            Some(_) => Some(failure.clone()),
        }
    };
    Rule::from_predicate(name, FnPredicate(check), message)
}

/// Text must be a calendar date.
pub fn date(options: impl Into<RuleOptions>) -> Rule {
    let message = options.into().message_or_else(|| INVALID_DATE.to_string());
    let failure = message.clone();
    let check = move |value: &Value| {
        if value.is_empty() {
            return None;
        }
        match value.as_text().and_then(parse_date) {
            Some(_) => None,
            None => Some(failure.clone()),
        }
    };
    Rule::from_predicate("date", FnPredicate(check), message)
}

/// Date must be strictly after today.
pub fn future_date(options: impl Into<RuleOptions>) -> Rule {
    let message = options
        .into()
        .message_or_else(|| "Date must be in the future".to_string());
    date_rule("future_date", |d| d > today(), message)
}

/// Date must not be after today. Today itself passes.
pub fn past_date(options: impl Into<RuleOptions>) -> Rule {
    let message = options
        .into()
        .message_or_else(|| "Date cannot be in the future".to_string());
    date_rule("past_date", |d| d <= today(), message)
}

/// Value must equal the current value of another field.
///
/// `original` is called on every evaluation, so edits to the other field are
/// picked up without rebuilding the rule.
pub fn confirmation<F>(
    original_field: impl Into<String>,
    original: F,
    options: impl Into<RuleOptions>,
) -> Rule
where
    F: Fn() -> Value + Send + Sync + 'static,
{
    let original_field = original_field.into();
    let message = options
        .into()
        .message_or_else(|| "Values do not match".to_string());
    let failure = message.clone();
    let check = move |value: &Value| {
        if *value == original() {
            None
        } else {
            tracing::trace!(original_field = %original_field, "confirmation mismatch");
            Some(failure.clone())
        }
    };
    Rule::from_predicate("confirmation", FnPredicate(check), message)
}

/// File must be no larger than `max_mb` megabytes (1 MB = 1024 * 1024 bytes).
///
/// Files that do not report a size pass.
pub fn file_size(max_mb: impl Into<f64>, options: impl Into<RuleOptions>) -> Rule {
    let max_mb = max_mb.into();
    let limit = max_mb * 1024.0 * 1024.0;
    let message = options
        .into()
        .message_or_else(|| format!("File size must be less than {max_mb}MB"));
    let failure = message.clone();
    let check = move |value: &Value| match value.as_file().and_then(|file| file.size) {
        Some(size) if (size as f64) > limit => Some(failure.clone()),
        _ => None,
    };
    Rule::from_predicate("file_size", FnPredicate(check), message)
}

/// File MIME type must be one of `allowed`. Files without a type fail.
pub fn file_type<I, S>(allowed: I, options: impl Into<RuleOptions>) -> Rule
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
    let message = options
        .into()
        .message_or_else(|| format!("File type must be one of: {}", allowed.join(", ")));
    let failure = message.clone();
    // A file that does not report its type is not one of the allowed types
    let check = move |value: &Value| {
        let file = value.as_file()?;
        let accepted = file
            .content_type
            .as_deref()
            .is_some_and(|t| allowed.iter().any(|a| a == t));
        (!accepted).then(|| failure.clone())
    };
    Rule::from_predicate("file_type", FnPredicate(check), message)
}
