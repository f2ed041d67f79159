//! Form value types.
//!
//! [`FieldValue`] is the value type held for every field of a form, and the
//! value type of submission payloads. It covers the three shapes a form
//! control can produce (text, number, boolean) plus `Null` for values that
//! arrive unset from an external record and `Json` for structured record
//! values that no control edits directly.

use std::fmt;

/// A single form field value.
///
/// `FieldValue` serializes as a plain JSON scalar (or the wrapped JSON for
/// [`FieldValue::Json`]), so a map of values serializes as a flat JSON object.
///
/// # Examples
///
/// ```
/// use autoform_core::value::FieldValue;
///
/// assert_eq!(FieldValue::from("Ada"), FieldValue::Text("Ada".to_string()));
/// assert_eq!(FieldValue::from(3_i64), FieldValue::Number(3.0));
/// assert!(FieldValue::from("").is_empty());
/// assert!(!FieldValue::from(false).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum FieldValue {
    /// No value.
    Null,
    /// A boolean toggle value.
    Bool(bool),
    /// A numeric value.
    Number(f64),
    /// A text value. The empty string is the "unset" sentinel.
    Text(String),
    /// Structured data carried through from an external record.
    Json(serde_json::Value),
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::Text(s) => write!(f, "{s}"),
            Self::Json(j) => write!(f, "{j}"),
        }
    }
}

/// Returns the integer form of `n` when it is whole and exactly representable.
#[allow(clippy::cast_possible_truncation)]
fn as_whole(n: f64) -> Option<i64> {
    (n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15).then(|| n as i64)
}

/// Formats a number without a trailing `.0` for whole values.
fn format_number(n: f64) -> String {
    as_whole(n).map_or_else(|| n.to_string(), |whole| whole.to_string())
}

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<i64> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s),
            other => Self::Json(other),
        }
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(v: FieldValue) -> Self {
        match v {
            FieldValue::Null => Self::Null,
            FieldValue::Bool(b) => Self::Bool(b),
            FieldValue::Number(n) => as_whole(n).map_or_else(
                || serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number),
                Self::from,
            ),
            FieldValue::Text(s) => Self::String(s),
            FieldValue::Json(j) => j,
        }
    }
}

impl FieldValue {
    /// Returns `true` if this value counts as "unset": `Null` or the empty string.
    ///
    /// `Bool(false)` and `Number(0.0)` are set values.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attempts to extract a boolean value.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract a numeric value.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_scalars() {
        assert_eq!(FieldValue::from(true), FieldValue::Bool(true));
        assert_eq!(FieldValue::from(42_i32), FieldValue::Number(42.0));
        assert_eq!(FieldValue::from(2.5_f64), FieldValue::Number(2.5));
        assert_eq!(FieldValue::from("x"), FieldValue::Text("x".into()));
        assert_eq!(FieldValue::from(None::<bool>), FieldValue::Null);
    }

    #[test]
    fn test_is_empty() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::Text(String::new()).is_empty());
        assert!(!FieldValue::Text("0".into()).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Number(30.0).to_string(), "30");
        assert_eq!(FieldValue::Number(1.5).to_string(), "1.5");
        assert_eq!(FieldValue::Null.to_string(), "");
        assert_eq!(FieldValue::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(FieldValue::from(serde_json::json!(null)), FieldValue::Null);
        assert_eq!(FieldValue::from(serde_json::json!(7)), FieldValue::Number(7.0));
        assert_eq!(
            FieldValue::from(serde_json::json!("Ada")),
            FieldValue::Text("Ada".into())
        );
        let nested = serde_json::json!({"a": 1});
        assert_eq!(FieldValue::from(nested.clone()), FieldValue::Json(nested));
    }

    #[test]
    fn test_serializes_as_plain_json() {
        let json = serde_json::to_value(FieldValue::Number(30.0)).unwrap();
        assert_eq!(json, serde_json::json!(30));
        let json = serde_json::to_value(FieldValue::Number(0.5)).unwrap();
        assert_eq!(json, serde_json::json!(0.5));
        let json = serde_json::to_value(FieldValue::Text("hi".into())).unwrap();
        assert_eq!(json, serde_json::json!("hi"));
    }

    #[test]
    fn test_deserializes_from_plain_json() {
        let v: FieldValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, FieldValue::Bool(true));
        let v: FieldValue = serde_json::from_str("\"\"").unwrap();
        assert!(v.is_empty());
    }
}
