//! Declarative rule configuration.
//!
//! Rules that need no caller-supplied closure can be described in JSON and
//! loaded at startup, so payload schemas live next to the rest of the
//! service configuration:
//!
//! ```json
//! {
//!   "fields": [
//!     {"name": "email", "rules": [{"type": "required"}, {"type": "email"}]},
//!     {"name": "quantity", "rules": [{"type": "range", "min": 1, "max": 99}]}
//!   ]
//! }
//! ```

use crate::error::ConfigError;
use crate::evaluate::RuleSet;
use crate::rule::{Rule, RuleOptions};
use crate::rules;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Serializable description of a rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleSpec {
    Required {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    MinLength {
        value: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    MaxLength {
        value: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Pattern {
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Min {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Max {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Range {
        min: f64,
        max: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Email {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Url {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Phone {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Date {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    FutureDate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    PastDate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    FileSize {
        max_mb: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    FileType {
        allowed: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl RuleSpec {
    /// Build the described rule.
    ///
    /// Only `pattern` can fail, when its regex does not compile.
    pub fn build(&self) -> Result<Rule, ConfigError> {
        let opts = |message: &Option<String>| RuleOptions::from(message.clone());

        let rule = match self {
            RuleSpec::Required { message } => rules::required(opts(message)),
            RuleSpec::MinLength { value, message } => rules::min_length(*value, opts(message)),
            RuleSpec::MaxLength { value, message } => rules::max_length(*value, opts(message)),
            RuleSpec::Pattern { pattern, message } => {
                let regex = Regex::new(pattern).map_err(|source| ConfigError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })?;
                rules::pattern(regex, opts(message))
            }
            RuleSpec::Min { value, message } => rules::min(*value, opts(message)),
            RuleSpec::Max { value, message } => rules::max(*value, opts(message)),
            RuleSpec::Range { min, max, message } => rules::range(*min, *max, opts(message)),
            RuleSpec::Email { message } => rules::email(opts(message)),
            RuleSpec::Url { message } => rules::url(opts(message)),
            RuleSpec::Phone { message } => rules::phone(opts(message)),
            RuleSpec::Date { message } => rules::date(opts(message)),
            RuleSpec::FutureDate { message } => rules::future_date(opts(message)),
            RuleSpec::PastDate { message } => rules::past_date(opts(message)),
            RuleSpec::FileSize { max_mb, message } => rules::file_size(*max_mb, opts(message)),
            RuleSpec::FileType { allowed, message } => {
                rules::file_type(allowed.iter().cloned(), opts(message))
            }
        };

        Ok(rule)
    }
}

/// Rules configured for one field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl FieldSpec {
    /// Build the field's rule set.
    pub fn build(&self) -> Result<RuleSet, ConfigError> {
        self.rules.iter().map(RuleSpec::build).collect()
    }
}

/// Rule configuration for a whole payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldSchema {
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl FieldSchema {
    /// Parse a schema from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build `(field, rules)` pairs in declaration order.
    pub fn build(&self) -> Result<Vec<(String, RuleSet)>, ConfigError> {
        self.fields
            .iter()
            .map(|field| Ok((field.name.clone(), field.build()?)))
            .collect()
    }
}
