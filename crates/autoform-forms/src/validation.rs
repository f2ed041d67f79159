//! Field and form validation.
//!
//! Each field is checked against an ordered list of rules and the first
//! violated rule wins, so a field carries at most one message:
//!
//! 1. required
//! 2. email format (email fields only)
//! 3. minimum length
//! 4. maximum length
//! 5. minimum value
//! 6. maximum value
//! 7. pattern
//!
//! Length and pattern rules only look at text values. Numeric bounds only
//! apply to numeric fields and never to the blank-number sentinel. An empty
//! value on an optional field passes every rule.
//!
//! [`validate_all`] rebuilds the whole [`FieldErrors`] map from scratch, so
//! no message from an earlier pass survives a revalidation.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use autoform_core::FieldValue;

use crate::schema::{FieldSchema, FieldType, FormSchema};
use crate::store::ValueStore;
use crate::widgets::ControlKind;

/// Message for a missing required value.
pub const REQUIRED_MESSAGE: &str = "This field is required";
/// Message for a malformed email address.
pub const EMAIL_MESSAGE: &str = "Please enter a valid email";
/// Message for a pattern mismatch.
pub const PATTERN_MESSAGE: &str = "Invalid format";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Per-field validation messages, in schema order.
///
/// A field without an entry is currently valid; the form is valid iff the
/// map is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: IndexMap<String, String>,
}

impl FieldErrors {
    /// Creates an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the message for `name`, if the field is invalid.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    /// Returns `true` if `name` has a message.
    pub fn contains(&self, name: &str) -> bool {
        self.errors.contains_key(name)
    }

    /// Records or clears the message for one field.
    pub fn set(&mut self, name: &str, message: Option<String>) {
        match message {
            Some(msg) => {
                self.errors.insert(name.to_string(), msg);
            }
            None => {
                self.errors.shift_remove(name);
            }
        }
    }

    /// Removes every message.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Returns `true` if no field has a message.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of invalid fields.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterates `(field, message)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Validates one value against a field's rules.
///
/// Returns the message of the first violated rule, or `None` if the value is
/// acceptable.
pub fn validate_field(field: &FieldSchema, value: &FieldValue) -> Option<String> {
    if value.is_empty() {
        return field.required.then(|| REQUIRED_MESSAGE.to_string());
    }

    let text = value.as_str();

    if field.field_type == FieldType::Email {
        if let Some(s) = text {
            if !EMAIL_RE.is_match(s) {
                return Some(EMAIL_MESSAGE.to_string());
            }
        }
    }

    if let Some(s) = text {
        let len = s.chars().count();
        if let Some(min) = field.min_length {
            if len < min {
                return Some(format!("Minimum {min} characters required"));
            }
        }
        if let Some(max) = field.max_length {
            if len > max {
                return Some(format!("Maximum {max} characters allowed"));
            }
        }
    }

    if ControlKind::for_type(&field.field_type).is_numeric() {
        if let Some(n) = numeric_value(value) {
            if let Some(min) = field.min {
                if n < min {
                    return Some(format!("Minimum value is {}", FieldValue::Number(min)));
                }
            }
            if let Some(max) = field.max {
                if n > max {
                    return Some(format!("Maximum value is {}", FieldValue::Number(max)));
                }
            }
        }
    }

    if let (Some(pattern), Some(s)) = (&field.pattern, text) {
        if !pattern.is_match(s) {
            return Some(PATTERN_MESSAGE.to_string());
        }
    }

    None
}

/// Reads a value as a number: numbers as-is, text only if it parses.
fn numeric_value(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Validates every field of `schema` against the values in `store`.
///
/// Returns a fresh error map; fields missing from the store are checked as
/// `Null`.
pub fn validate_all(schema: &FormSchema, store: &ValueStore) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (name, field) in schema.iter() {
        let value = store.get(name).unwrap_or(&FieldValue::Null);
        let message = validate_field(field, value);
        if let Some(msg) = &message {
            tracing::debug!(field = name, message = %msg, "field failed validation");
        }
        errors.set(name, message);
    }
    errors
}
