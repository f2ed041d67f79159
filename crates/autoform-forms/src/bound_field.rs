//! Bound fields: a field paired with its current value and error.
//!
//! A [`BoundField`] is what the rendering surface iterates over. It owns a
//! snapshot of everything needed to draw one form row, so it stays valid
//! after the form that produced it changes.

use serde::Serialize;

use autoform_core::FieldValue;

use crate::schema::FieldSchema;
use crate::widgets::{escape_html, resolve, ControlDescriptor};

/// A form field bound to its value and validation state.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundField {
    /// The field name.
    pub name: String,
    /// The field definition.
    pub schema: FieldSchema,
    /// The resolved control.
    pub descriptor: ControlDescriptor,
    /// The current value.
    pub value: FieldValue,
    /// The current validation message, if any.
    pub error: Option<String>,
}

/// JSON view of a bound field for external templates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundFieldContext {
    pub name: String,
    pub label: String,
    pub control: String,
    pub id: String,
    pub value: FieldValue,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub html: String,
}

impl BoundField {
    /// Binds `schema` under `name` to `value` and `error`.
    pub fn new(name: &str, schema: &FieldSchema, value: FieldValue, error: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            descriptor: resolve(name, schema),
            schema: schema.clone(),
            value,
            error,
        }
    }

    /// The display label.
    pub fn label(&self) -> String {
        self.schema.display_label(&self.name)
    }

    /// Returns the auto-generated HTML `id` for this field.
    pub fn auto_id(&self) -> String {
        self.descriptor.auto_id()
    }

    /// Returns `true` if the field currently has a validation message.
    pub const fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Renders the control HTML.
    pub fn render(&self) -> String {
        self.descriptor.render(&self.value)
    }

    /// Renders a `<label>` for this field, with a required marker.
    pub fn label_tag(&self) -> String {
        let marker = if self.schema.required {
            r#" <span class="required">*</span>"#
        } else {
            ""
        };
        format!(
            r#"<label for="{}">{}{marker}</label>"#,
            escape_html(&self.descriptor.id_for_label()),
            escape_html(&self.label())
        )
    }

    /// Renders the help text, or an empty string.
    pub fn help_html(&self) -> String {
        self.schema
            .help
            .as_deref()
            .map(|h| format!(r#"<small class="help">{}</small>"#, escape_html(h)))
            .unwrap_or_default()
    }

    /// Renders the validation message, or an empty string.
    pub fn error_html(&self) -> String {
        self.error
            .as_deref()
            .map(|e| format!(r#"<span class="error">{}</span>"#, escape_html(e)))
            .unwrap_or_default()
    }

    /// Renders the whole form row: label, control, help, and error.
    pub fn render_row(&self) -> String {
        let class = if self.has_error() {
            "field has-error"
        } else {
            "field"
        };
        format!(
            r#"<div class="{class}">{}{}{}{}</div>"#,
            self.label_tag(),
            self.render(),
            self.help_html(),
            self.error_html()
        )
    }

    /// Builds the JSON view of this field.
    pub fn context(&self) -> BoundFieldContext {
        BoundFieldContext {
            name: self.name.clone(),
            label: self.label(),
            control: self.descriptor.kind.to_string(),
            id: self.auto_id(),
            value: self.value.clone(),
            required: self.schema.required,
            help: self.schema.help.clone(),
            error: self.error.clone(),
            html: self.render_row(),
        }
    }
}
