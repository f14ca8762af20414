//! Field-level request validation.
//!
//! Each request payload implements [`Validate`] and records failures into an
//! [`Evaluator`]. Only the first failure per field is kept, so checks are listed
//! from the most basic (present at all) to the most specific.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Shape check used for email addresses.
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

/// Shared, read-only state the rules need. Built once at startup and handed to
/// every validation call.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    email_rx: Regex,
}

impl ValidationContext {
    pub fn new() -> Self {
        let email_rx = Regex::new(EMAIL_PATTERN).expect("EMAIL_PATTERN is a valid regex");
        Self { email_rx }
    }

    pub fn email_rx(&self) -> &Regex {
        &self.email_rx
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Field name to message. Serialises as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Evaluator(BTreeMap<String, String>);

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `key` unless the field already has one.
    pub fn add_field_error(&mut self, key: &str, message: &str) {
        self.0
            .entry(key.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn check_field(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_field_error(key, message);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A payload that knows its own rules.
pub trait Validate {
    fn validate(&self, ctx: &ValidationContext) -> Evaluator;
}

pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Counts Unicode scalar values, not bytes.
pub fn min_chars(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

/// `income` or `expense`, case-insensitive.
pub fn transaction_type(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "income" || value == "expense"
}

pub fn non_negative(value: f64) -> bool {
    value >= 0.0
}

pub fn positive(value: f64) -> bool {
    value > 0.0
}

/// The non-blank content of an optional field, if any. Patch payloads treat a
/// blank string the same as an absent field.
pub fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| not_blank(v))
}
