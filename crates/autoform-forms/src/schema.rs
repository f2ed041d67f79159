//! Form schema definitions.
//!
//! A [`FormSchema`] is an ordered mapping of field name to [`FieldSchema`].
//! Declaration order is significant: it drives rendering order, grouping
//! order, and the order of keys in submission payloads.
//!
//! Schemas are usually declared as JSON:
//!
//! ```
//! use autoform_forms::schema::{FieldType, FormSchema};
//!
//! let schema = FormSchema::from_json_str(r#"{
//!     "name":  {"type": "text", "required": true, "minLength": 2},
//!     "email": {"type": "email", "required": true},
//!     "age":   {"type": "number", "min": 0, "max": 150, "group": "Details"}
//! }"#).unwrap();
//!
//! assert_eq!(schema.names().collect::<Vec<_>>(), vec!["name", "email", "age"]);
//! assert_eq!(schema.get("age").unwrap().field_type, FieldType::Number);
//! ```

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use autoform_core::{AutoformError, AutoformResult, FieldValue};

use crate::submission::{CREATED_AT_KEY, UPDATED_AT_KEY};

/// The declared type of a form field.
///
/// Parsed case-insensitively from the schema's `type` string. Strings that
/// name no known type are kept as [`FieldType::Other`] and render as a plain
/// single-line text control.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// `text` (the default).
    #[default]
    Text,
    /// `email`.
    Email,
    /// `password`.
    Password,
    /// `number`.
    Number,
    /// `range`.
    Range,
    /// `textarea`.
    Textarea,
    /// `select`.
    Select,
    /// `checkbox`.
    Checkbox,
    /// `radio`.
    Radio,
    /// `date`.
    Date,
    /// `time`.
    Time,
    /// `datetime-local`.
    DateTimeLocal,
    /// `month`.
    Month,
    /// `week`.
    Week,
    /// `color`.
    Color,
    /// `url`.
    Url,
    /// `tel`.
    Tel,
    /// `search`.
    Search,
    /// `hidden`.
    Hidden,
    /// Any other type string, preserved as written.
    Other(String),
}

impl FieldType {
    /// Returns the schema spelling of this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::Range => "range",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTimeLocal => "datetime-local",
            Self::Month => "month",
            Self::Week => "week",
            Self::Color => "color",
            Self::Url => "url",
            Self::Tel => "tel",
            Self::Search => "search",
            Self::Hidden => "hidden",
            Self::Other(s) => s,
        }
    }

    /// Returns `true` for types whose control produces numbers.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Range)
    }

    /// Returns `true` for types whose control produces free-form text, where
    /// length and pattern constraints are meaningful.
    pub const fn is_text_like(&self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Email
                | Self::Password
                | Self::Textarea
                | Self::Url
                | Self::Tel
                | Self::Search
                | Self::Other(_)
        )
    }

    /// Returns `true` for types that choose among declared options.
    pub const fn has_options(&self) -> bool {
        matches!(self, Self::Select | Self::Radio)
    }
}

impl From<&str> for FieldType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Self::Text,
            "email" => Self::Email,
            "password" => Self::Password,
            "number" => Self::Number,
            "range" => Self::Range,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime-local" => Self::DateTimeLocal,
            "month" => Self::Month,
            "week" => Self::Week,
            "color" => Self::Color,
            "url" => Self::Url,
            "tel" => Self::Tel,
            "search" => Self::Search,
            "hidden" => Self::Hidden,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One choice of a `select` or `radio` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOption")]
pub struct FieldOption {
    /// The submitted value.
    pub value: String,
    /// The displayed label.
    pub label: String,
}

impl FieldOption {
    /// Creates an option with distinct value and label.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Options may be declared as `{"value": .., "label": ..}` objects or as bare
/// scalars whose label is the value itself.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Labeled {
        value: serde_json::Value,
        label: Option<String>,
    },
    Bare(serde_json::Value),
}

impl From<RawOption> for FieldOption {
    fn from(raw: RawOption) -> Self {
        let (value, label) = match raw {
            RawOption::Labeled { value, label } => (FieldValue::from(value).to_string(), label),
            RawOption::Bare(value) => (FieldValue::from(value).to_string(), None),
        };
        let label = label.unwrap_or_else(|| value.clone());
        Self { value, label }
    }
}

/// A compiled `pattern` constraint.
///
/// Matching is unanchored: the value is valid if the expression matches
/// anywhere in it. Anchor the expression with `^...$` to require a full match.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compiles a pattern.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    /// Returns `true` if the pattern matches `value`.
    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }

    /// Returns the source expression.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::new(&source)
            .map_err(|e| serde::de::Error::custom(format!("invalid pattern '{source}': {e}")))
    }
}

/// Declarative description of a single form field.
///
/// Deserializes from the camelCase JSON form used in schemas; every key is
/// optional. Numeric bounds (`min`, `max`, `step`) only take effect for
/// numeric types, and length/pattern constraints only for text-like types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldSchema {
    /// The field type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Human-readable label. Derived from the field name when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether a value is required.
    pub required: bool,
    /// Initial value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
    /// Placeholder text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Help text rendered below the control.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Choices for `select` and `radio` fields, in display order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Minimum numeric value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum numeric value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Numeric step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Minimum length in characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular expression the value must match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    /// Whether the control is disabled.
    pub disabled: bool,
    /// Whether the control is read-only.
    pub readonly: bool,
    /// Fieldset this field is rendered in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl FieldSchema {
    /// Creates a field of the given type with no constraints.
    pub fn new(field_type: impl Into<FieldType>) -> Self {
        Self {
            field_type: field_type.into(),
            ..Self::default()
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets whether this field is required.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    /// Appends a choice.
    #[must_use]
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(FieldOption::new(value, label));
        self
    }

    /// Sets the minimum numeric value.
    #[must_use]
    pub const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the maximum numeric value.
    #[must_use]
    pub const fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Sets the numeric step.
    #[must_use]
    pub const fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Sets the minimum length.
    #[must_use]
    pub const fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    /// Sets the maximum length.
    #[must_use]
    pub const fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Sets the pattern constraint.
    #[must_use]
    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Sets whether the control is disabled.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Sets whether the control is read-only.
    #[must_use]
    pub const fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Places the field in a named fieldset.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Returns the value a fresh form starts with for this field:
    /// the declared default, `false` for checkboxes, or the empty string.
    pub fn initial_value(&self) -> FieldValue {
        match (&self.default, &self.field_type) {
            (Some(value), _) => value.clone(),
            (None, FieldType::Checkbox) => FieldValue::Bool(false),
            (None, _) => FieldValue::default(),
        }
    }

    /// Returns the label to display for a field named `name`.
    pub fn display_label(&self, name: &str) -> String {
        self.label.clone().unwrap_or_else(|| humanize(name))
    }
}

/// Turns `first_name` into `First name`.
fn humanize(name: &str) -> String {
    let spaced = name.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Payload keys the submission sequence writes itself.
fn is_reserved_name(name: &str) -> bool {
    name == UPDATED_AT_KEY || name == CREATED_AT_KEY
}

/// An ordered mapping of field name to [`FieldSchema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSchema {
    fields: IndexMap<String, FieldSchema>,
}

impl FormSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field. Redeclaring a name replaces the field in place.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: FieldSchema) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Parses a schema from a JSON object, preserving key order.
    ///
    /// # Errors
    ///
    /// Returns [`AutoformError::InvalidSchema`] if the document is not a JSON
    /// object or if any field fails to parse; the message names the field.
    pub fn from_json_str(json: &str) -> AutoformResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| AutoformError::InvalidSchema(format!("malformed JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Builds a schema from an already-parsed JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`AutoformError::InvalidSchema`] if `value` is not an object,
    /// any field fails to parse, or a field is named `updatedAt` or
    /// `createdAt`.
    pub fn from_value(value: serde_json::Value) -> AutoformResult<Self> {
        let serde_json::Value::Object(entries) = value else {
            return Err(AutoformError::InvalidSchema(
                "schema must be a JSON object".to_string(),
            ));
        };

        let mut fields = IndexMap::with_capacity(entries.len());
        for (name, raw) in entries {
            if name.is_empty() {
                return Err(AutoformError::InvalidSchema(
                    "field names must not be empty".to_string(),
                ));
            }
            if is_reserved_name(&name) {
                return Err(AutoformError::InvalidSchema(format!(
                    "field '{name}': name is reserved for payload timestamps"
                )));
            }
            let field: FieldSchema = serde_json::from_value(raw)
                .map_err(|e| AutoformError::InvalidSchema(format!("field '{name}': {e}")))?;
            fields.insert(name, field);
        }
        Ok(Self { fields })
    }

    /// Returns the field declared under `name`.
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Returns `true` if the schema declares `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterates fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
