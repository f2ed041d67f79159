//! Field type resolution and control rendering.
//!
//! Every field type resolves to one of a closed set of [`ControlKind`]s. The
//! resulting [`ControlDescriptor`] knows three things about its field:
//!
//! - which control to render,
//! - how to turn a raw interaction value into a [`FieldValue`], and
//! - which HTML constraint attributes to surface.
//!
//! The constraint attributes are advisory only. The engine never relies on
//! browser-side constraint validation; see [`crate::validation`].

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

use autoform_core::FieldValue;

use crate::schema::{FieldOption, FieldSchema, FieldType};

/// The concrete control a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// `<input>` with the given `type` attribute, producing text.
    SingleLine {
        /// The HTML `type` attribute.
        input_type: &'static str,
    },
    /// `<textarea>`, producing text.
    MultiLine,
    /// `<select>` over the field's options, producing the option value.
    Select,
    /// `<input type="checkbox">`, producing a boolean.
    Checkbox,
    /// A group of `<input type="radio">`, producing the option value.
    Radio,
    /// `<input type="number">` or `<input type="range">`, producing a number
    /// or the empty-string sentinel when blank.
    Numeric {
        /// The HTML `type` attribute.
        input_type: &'static str,
    },
}

impl ControlKind {
    /// Resolves the control for a field type. Unknown types fall back to a
    /// single-line text input.
    pub const fn for_type(field_type: &FieldType) -> Self {
        match field_type {
            FieldType::Textarea => Self::MultiLine,
            FieldType::Select => Self::Select,
            FieldType::Checkbox => Self::Checkbox,
            FieldType::Radio => Self::Radio,
            FieldType::Number => Self::Numeric {
                input_type: "number",
            },
            FieldType::Range => Self::Numeric {
                input_type: "range",
            },
            FieldType::Email => Self::single_line("email"),
            FieldType::Password => Self::single_line("password"),
            FieldType::Date => Self::single_line("date"),
            FieldType::Time => Self::single_line("time"),
            FieldType::DateTimeLocal => Self::single_line("datetime-local"),
            FieldType::Month => Self::single_line("month"),
            FieldType::Week => Self::single_line("week"),
            FieldType::Color => Self::single_line("color"),
            FieldType::Url => Self::single_line("url"),
            FieldType::Tel => Self::single_line("tel"),
            FieldType::Search => Self::single_line("search"),
            FieldType::Hidden => Self::single_line("hidden"),
            FieldType::Text | FieldType::Other(_) => Self::single_line("text"),
        }
    }

    const fn single_line(input_type: &'static str) -> Self {
        Self::SingleLine { input_type }
    }

    /// Returns `true` if the control produces numbers.
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Numeric { .. })
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleLine { input_type } | Self::Numeric { input_type } => {
                write!(f, "input[{input_type}]")
            }
            Self::MultiLine => f.write_str("textarea"),
            Self::Select => f.write_str("select"),
            Self::Checkbox => f.write_str("checkbox"),
            Self::Radio => f.write_str("radio"),
        }
    }
}

/// A raw value reported by the templating layer for one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// The control's string value (`event.target.value`).
    Text(String),
    /// The control's checked state (`event.target.checked`).
    Checked(bool),
}

impl From<&str> for RawInput {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RawInput {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for RawInput {
    fn from(v: bool) -> Self {
        Self::Checked(v)
    }
}

/// Everything the templating layer needs to render and read one control.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlDescriptor {
    /// The field name (HTML `name` attribute).
    pub name: String,
    /// The control to render.
    pub kind: ControlKind,
    /// Advisory HTML attributes, sorted by name. Boolean attributes carry
    /// their own name as value (`required="required"`).
    pub attrs: BTreeMap<&'static str, String>,
    /// Choices for select and radio controls.
    pub options: Vec<FieldOption>,
    /// Placeholder text, if any.
    pub placeholder: Option<String>,
}

/// Resolves the control descriptor for a field.
pub fn resolve(name: &str, field: &FieldSchema) -> ControlDescriptor {
    let kind = ControlKind::for_type(&field.field_type);
    let mut attrs = BTreeMap::new();

    if field.required {
        attrs.insert("required", "required".to_string());
    }
    if field.disabled {
        attrs.insert("disabled", "disabled".to_string());
    }
    if field.readonly {
        attrs.insert("readonly", "readonly".to_string());
    }

    if kind.is_numeric() {
        if let Some(min) = field.min {
            attrs.insert("min", FieldValue::Number(min).to_string());
        }
        if let Some(max) = field.max {
            attrs.insert("max", FieldValue::Number(max).to_string());
        }
        if let Some(step) = field.step {
            attrs.insert("step", FieldValue::Number(step).to_string());
        }
    }

    if field.field_type.is_text_like() {
        if let Some(len) = field.min_length {
            attrs.insert("minlength", len.to_string());
        }
        if let Some(len) = field.max_length {
            attrs.insert("maxlength", len.to_string());
        }
        if let Some(pattern) = &field.pattern {
            attrs.insert("pattern", pattern.as_str().to_string());
        }
    }

    ControlDescriptor {
        name: name.to_string(),
        kind,
        attrs,
        options: if field.field_type.has_options() {
            field.options.clone()
        } else {
            Vec::new()
        },
        placeholder: field.placeholder.clone(),
    }
}

impl ControlDescriptor {
    /// Normalises a raw interaction value into a stored [`FieldValue`].
    ///
    /// - checkboxes yield `Bool`;
    /// - numeric controls yield `Number`, or `Text("")` when blank or not a
    ///   number, so "unset" stays distinguishable from zero;
    /// - everything else yields `Text`.
    pub fn extract(&self, raw: RawInput) -> FieldValue {
        match (self.kind, raw) {
            (ControlKind::Checkbox, RawInput::Checked(checked)) => FieldValue::Bool(checked),
            (ControlKind::Checkbox, RawInput::Text(s)) => FieldValue::Bool(matches!(
                s.to_ascii_lowercase().as_str(),
                "true" | "on" | "1" | "yes"
            )),
            (ControlKind::Numeric { .. }, RawInput::Text(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map_or_else(FieldValue::default, FieldValue::Number),
            (ControlKind::Numeric { .. }, RawInput::Checked(_)) => FieldValue::default(),
            (_, RawInput::Text(s)) => FieldValue::Text(s),
            (_, RawInput::Checked(checked)) => FieldValue::Text(checked.to_string()),
        }
    }

    /// Returns the auto-generated HTML `id` for this control.
    pub fn auto_id(&self) -> String {
        format!("id_{}", self.name)
    }

    /// Returns the `id` a `<label for=..>` should target.
    ///
    /// Radio groups have no single element to focus, so the label targets the
    /// first choice.
    pub fn id_for_label(&self) -> String {
        match self.kind {
            ControlKind::Radio => format!("{}_0", self.auto_id()),
            _ => self.auto_id(),
        }
    }

    /// Renders the control as HTML with `value` as its current state.
    pub fn render(&self, value: &FieldValue) -> String {
        let name = escape_html(&self.name);
        let id = escape_html(&self.auto_id());
        let attrs = render_attrs(&self.attrs);
        let placeholder = self
            .placeholder
            .as_deref()
            .map(|p| format!(r#" placeholder="{}""#, escape_html(p)))
            .unwrap_or_default();
        let current = escape_html(&value.to_string());

        match self.kind {
            ControlKind::SingleLine { input_type } | ControlKind::Numeric { input_type } => {
                format!(
                    r#"<input type="{input_type}" name="{name}" id="{id}" value="{current}"{placeholder}{attrs} />"#
                )
            }
            ControlKind::MultiLine => {
                format!(
                    r#"<textarea name="{name}" id="{id}"{placeholder}{attrs}>{current}</textarea>"#
                )
            }
            ControlKind::Checkbox => {
                let checked = if value.as_bool().unwrap_or(false) {
                    " checked"
                } else {
                    ""
                };
                format!(r#"<input type="checkbox" name="{name}" id="{id}"{checked}{attrs} />"#)
            }
            ControlKind::Select => {
                let prompt = escape_html(self.placeholder.as_deref().unwrap_or("Select..."));
                let mut html = format!(
                    r#"<select name="{name}" id="{id}"{attrs}><option value="">{prompt}</option>"#
                );
                for option in &self.options {
                    let selected = if option.value == value.to_string() {
                        " selected"
                    } else {
                        ""
                    };
                    let _ = write!(
                        html,
                        r#"<option value="{}"{selected}>{}</option>"#,
                        escape_html(&option.value),
                        escape_html(&option.label)
                    );
                }
                html.push_str("</select>");
                html
            }
            ControlKind::Radio => {
                let mut html = String::from(r#"<div class="radio-group">"#);
                for (i, option) in self.options.iter().enumerate() {
                    let checked = if option.value == value.to_string() {
                        " checked"
                    } else {
                        ""
                    };
                    let _ = write!(
                        html,
                        r#"<label><input type="radio" name="{name}" id="{id}_{i}" value="{}"{checked}{attrs} /> {}</label>"#,
                        escape_html(&option.value),
                        escape_html(&option.label)
                    );
                }
                html.push_str("</div>");
                html
            }
        }
    }
}

/// Formats an attribute map into a string like ` key="value" key2="value2"`.
fn render_attrs(attrs: &BTreeMap<&'static str, String>) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!(r#" {k}="{}""#, escape_html(v)))
        .collect()
}

/// Escapes HTML special characters in a string.
///
/// Replaces `&`, `<`, `>`, `"`, and `'` with their HTML entity equivalents.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
