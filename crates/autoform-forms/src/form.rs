//! The form instance.
//!
//! An [`AutoForm`] owns one form's schema, values, errors, and banners, plus
//! the [`FormSignals`] its observers subscribe to. All operations take
//! `&self`; state lives behind a mutex that is never held across an await,
//! so the form can be shared behind an `Arc` between the templating layer
//! and a submit handler.
//!
//! A submission marks the form busy for its whole duration. A second submit
//! while busy returns [`SubmitOutcome::Busy`] and changes nothing.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::json;
use tokio::time::Instant;
use tracing::Instrument;

use autoform_core::logging::form_span;
use autoform_core::{AutoformError, AutoformResult, FieldValue, FormSettings};
use autoform_signals::{FormReset, FormSignals, FormSubmitted, SubmitFailed};

use crate::bound_field::BoundField;
use crate::groups::partition;
use crate::persistence::RecordStore;
use crate::schema::{FieldSchema, FormSchema};
use crate::store::{Record, ValueStore};
use crate::submission::{Submission, SubmissionCoordinator, SubmitError, SubmitTarget};
use crate::validation::{validate_all, validate_field, FieldErrors};
use crate::widgets::{escape_html, resolve, RawInput};

/// The result of [`AutoForm::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The submission was accepted (and persisted, if configured).
    Accepted(Submission),
    /// Validation failed; the errors are now shown on the form.
    Invalid(FieldErrors),
    /// The record store rejected the payload.
    Failed(String),
    /// Another submission is still running.
    Busy,
}

impl SubmitOutcome {
    /// Returns `true` for [`SubmitOutcome::Accepted`].
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Returns the accepted submission, if any.
    pub const fn submission(&self) -> Option<&Submission> {
        match self {
            Self::Accepted(submission) => Some(submission),
            _ => None,
        }
    }
}

/// A partitioned group of bound fields, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundGroup {
    /// The fieldset title, or `None` for ungrouped fields.
    pub name: Option<String>,
    /// The group's fields in declaration order.
    pub fields: Vec<BoundField>,
}

#[derive(Debug, Clone)]
struct Banner {
    message: String,
    expires_at: Instant,
}

#[derive(Debug)]
struct FormState {
    schema: Arc<FormSchema>,
    record: Option<Record>,
    key: Option<String>,
    values: ValueStore,
    errors: FieldErrors,
    error_message: Option<String>,
    success: Option<Banner>,
}

impl FormState {
    fn reinitialize(&mut self) {
        self.values = ValueStore::initialize(&self.schema, self.record.as_ref());
        self.errors.clear();
    }

    fn clear_banners(&mut self) {
        self.error_message = None;
        self.success = None;
    }

    fn success_message(&self, now: Instant) -> Option<&str> {
        self.success
            .as_ref()
            .filter(|b| now < b.expires_at)
            .map(|b| b.message.as_str())
    }
}

/// Clears the busy flag when a submission ends, including when its future
/// is dropped early.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A schema-driven form.
///
/// # Examples
///
/// ```
/// use autoform_core::FormSettings;
/// use autoform_forms::{AutoForm, FieldSchema, FormSchema};
///
/// let schema = FormSchema::new().field("name", FieldSchema::new("text").required(true));
/// let form = AutoForm::new(schema, FormSettings::default());
/// form.handle_input("name", "Ada").unwrap();
/// assert!(form.validate());
/// ```
pub struct AutoForm {
    id: String,
    settings: FormSettings,
    coordinator: SubmissionCoordinator,
    signals: FormSignals,
    state: Mutex<FormState>,
    submitting: AtomicBool,
    span: tracing::Span,
}

impl fmt::Debug for AutoForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoForm")
            .field("id", &self.id)
            .field("settings", &self.settings)
            .field("coordinator", &self.coordinator)
            .field("submitting", &self.is_submitting())
            .finish_non_exhaustive()
    }
}

impl AutoForm {
    /// Creates a form for `schema` with no record store.
    ///
    /// `settings.record_key` becomes the key of the record being edited.
    pub fn new(schema: FormSchema, settings: FormSettings) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let span = form_span(&id);
        let schema = Arc::new(schema);
        let values = ValueStore::initialize(&schema, None);
        let state = FormState {
            schema,
            record: None,
            key: settings.record_key.clone(),
            values,
            errors: FieldErrors::new(),
            error_message: None,
            success: None,
        };
        Self {
            id,
            settings,
            coordinator: SubmissionCoordinator::default(),
            signals: FormSignals::new(),
            state: Mutex::new(state),
            submitting: AtomicBool::new(false),
            span,
        }
    }

    /// Attaches the record store submissions are persisted through.
    #[must_use]
    pub fn with_store(mut self, records: Arc<dyn RecordStore>) -> Self {
        self.coordinator = SubmissionCoordinator::new(Some(records));
        self
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().expect("form state lock poisoned")
    }

    /// Returns this form's generated identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the form's settings.
    pub const fn settings(&self) -> &FormSettings {
        &self.settings
    }

    /// Returns the signals observers connect to.
    pub const fn signals(&self) -> &FormSignals {
        &self.signals
    }

    /// Returns the current schema.
    pub fn schema(&self) -> Arc<FormSchema> {
        Arc::clone(&self.state().schema)
    }

    /// Replaces the schema and re-initialises values and errors.
    pub fn set_schema(&self, schema: FormSchema) {
        let _enter = self.span.enter();
        let mut state = self.state();
        state.schema = Arc::new(schema);
        state.reinitialize();
        tracing::debug!(fields = state.schema.len(), "schema replaced");
    }

    /// Sets the record being edited and re-initialises values and errors.
    ///
    /// `key` identifies the record for updates; `None` makes the next
    /// submission create a new record.
    pub fn set_record(&self, record: Option<Record>, key: Option<String>) {
        let _enter = self.span.enter();
        let mut state = self.state();
        state.record = record;
        state.key = key;
        state.reinitialize();
        tracing::debug!(key = state.key.as_deref().unwrap_or(""), "record assigned");
    }

    /// Fetches the configured record from the record store and edits it.
    ///
    /// Returns `Ok(false)` without touching the form when no store, path, or
    /// key is configured, or when the record does not exist.
    pub async fn load_record(&self) -> AutoformResult<bool> {
        let key = self.state().key.clone();
        let (Some(records), Some(path), Some(key)) =
            (self.coordinator.records(), self.settings.path.as_deref(), key)
        else {
            return Ok(false);
        };

        let fetched = records
            .fetch(path, &key)
            .instrument(self.span.clone())
            .await
            .map_err(AutoformError::from)?;

        match fetched {
            Some(record) => {
                self.set_record(Some(record), Some(key));
                Ok(true)
            }
            None => {
                let _enter = self.span.enter();
                tracing::debug!(path, key = %key, "record not found");
                Ok(false)
            }
        }
    }

    /// Stores a user edit.
    ///
    /// The raw input is normalised for the field's control. If the field
    /// already shows an error it is re-validated so the message clears as
    /// soon as the value becomes acceptable.
    pub fn handle_input(
        &self,
        name: &str,
        raw: impl Into<RawInput>,
    ) -> AutoformResult<FieldValue> {
        let _enter = self.span.enter();
        let mut state = self.state();
        let field = state
            .schema
            .get(name)
            .cloned()
            .ok_or_else(|| AutoformError::UnknownField(name.to_string()))?;

        let value = resolve(name, &field).extract(raw.into());
        state.values = state.values.set(name, value.clone());
        if state.errors.contains(name) {
            let message = validate_field(&field, &value);
            state.errors.set(name, message);
        }
        Ok(value)
    }

    /// Validates one field when it loses focus and returns its message.
    pub fn handle_blur(&self, name: &str) -> AutoformResult<Option<String>> {
        let _enter = self.span.enter();
        let mut state = self.state();
        let field = state
            .schema
            .get(name)
            .cloned()
            .ok_or_else(|| AutoformError::UnknownField(name.to_string()))?;

        let value = state.values.get(name).cloned().unwrap_or_default();
        let message = validate_field(&field, &value);
        if let Some(msg) = &message {
            tracing::debug!(field = name, message = %msg, "field failed validation");
        }
        state.errors.set(name, message.clone());
        Ok(message)
    }

    /// Validates every field, replacing all errors. Returns `true` if the
    /// form is valid.
    pub fn validate(&self) -> bool {
        let _enter = self.span.enter();
        let mut state = self.state();
        state.errors = validate_all(&state.schema, &state.values);
        state.errors.is_empty()
    }

    /// Submits the form.
    ///
    /// On acceptance the `submitted` signal fires, the form resets if
    /// `reset_on_submit` is set, and the success banner (if configured)
    /// shows for the banner timeout. A persistence failure sets the error
    /// banner and fires `failed`; the entered values are kept.
    pub async fn submit(&self) -> SubmitOutcome {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return SubmitOutcome::Busy;
        }
        let _busy = BusyGuard(&self.submitting);

        let (schema, values, target) = {
            let mut state = self.state();
            state.error_message = None;
            let target = SubmitTarget::new(self.settings.path.clone(), state.key.clone());
            (Arc::clone(&state.schema), state.values.clone(), target)
        };

        let result = self
            .coordinator
            .submit(&schema, &values, &target)
            .instrument(self.span.clone())
            .await;

        let _enter = self.span.enter();
        match result {
            Ok(submission) => {
                self.state().errors.clear();
                self.signals.submitted.send(&FormSubmitted {
                    payload: submission.payload.to_json(),
                    key: submission.key.clone(),
                    path: submission.path.clone(),
                });
                if self.settings.reset_on_submit {
                    self.reset();
                }
                if let Some(message) = &self.settings.success_message {
                    self.state().success = Some(Banner {
                        message: message.clone(),
                        expires_at: Instant::now() + self.settings.banner_timeout(),
                    });
                }
                SubmitOutcome::Accepted(submission)
            }
            Err(SubmitError::Validation(errors)) => {
                self.state().errors = errors.clone();
                SubmitOutcome::Invalid(errors)
            }
            Err(SubmitError::Persistence(err)) => {
                self.state().error_message = Some(err.message.clone());
                self.signals.failed.send(&SubmitFailed {
                    message: err.message.clone(),
                });
                SubmitOutcome::Failed(err.message)
            }
        }
    }

    /// Restores the initial values for the current schema and record,
    /// clears errors and banners, and fires the `reset` signal.
    pub fn reset(&self) {
        let _enter = self.span.enter();
        {
            let mut state = self.state();
            state.reinitialize();
            state.clear_banners();
        }
        tracing::info!("form reset");
        self.signals.reset.send(&FormReset);
    }

    /// Returns `true` while a submission is running.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Returns a snapshot of the current values.
    pub fn values(&self) -> ValueStore {
        self.state().values.clone()
    }

    /// Returns the current value of `name`.
    pub fn value(&self, name: &str) -> Option<FieldValue> {
        self.state().values.get(name).cloned()
    }

    /// Returns a snapshot of the current errors.
    pub fn errors(&self) -> FieldErrors {
        self.state().errors.clone()
    }

    /// Returns `true` if no field currently shows an error.
    pub fn is_valid(&self) -> bool {
        self.state().errors.is_empty()
    }

    /// Returns the form-level error banner, if shown.
    pub fn error_message(&self) -> Option<String> {
        self.state().error_message.clone()
    }

    /// Returns the success banner if it is still showing at `now`.
    pub fn success_message(&self, now: Instant) -> Option<String> {
        self.state().success_message(now).map(str::to_string)
    }

    /// Drops the success banner once it has expired at `now`.
    pub fn expire_banners(&self, now: Instant) {
        let mut state = self.state();
        if state.success.as_ref().is_some_and(|b| now >= b.expires_at) {
            state.success = None;
        }
    }

    /// Binds every field to its current value and error, in schema order.
    pub fn bound_fields(&self) -> Vec<BoundField> {
        let state = self.state();
        state
            .schema
            .iter()
            .map(|(name, field)| bind(&state, name, field))
            .collect()
    }

    /// Binds every field and partitions them into fieldsets.
    pub fn groups(&self) -> Vec<BoundGroup> {
        let state = self.state();
        partition(&state.schema)
            .into_iter()
            .map(|group| BoundGroup {
                name: group.name.map(str::to_string),
                fields: group
                    .fields
                    .iter()
                    .map(|f| bind(&state, f.name, f.field))
                    .collect(),
            })
            .collect()
    }

    /// Builds the JSON view model for an external template.
    pub fn as_context(&self) -> serde_json::Value {
        let groups: Vec<serde_json::Value> = self
            .groups()
            .iter()
            .map(|g| {
                json!({
                    "name": g.name,
                    "fields": g.fields.iter().map(BoundField::context).collect::<Vec<_>>(),
                })
            })
            .collect();

        let state = self.state();
        json!({
            "id": self.id,
            "groups": groups,
            "values": state.values,
            "errors": state.errors,
            "errorMessage": state.error_message,
            "successMessage": state.success_message(Instant::now()),
            "submitting": self.is_submitting(),
            "submitLabel": self.settings.submit_label,
            "resetLabel": self.settings.reset_label,
            "showReset": self.settings.show_reset,
        })
    }

    /// Renders the whole form as HTML.
    pub fn render_html(&self) -> String {
        let mut html = String::from(r#"<form class="autoform" novalidate>"#);

        {
            let state = self.state();
            if let Some(message) = &state.error_message {
                html.push_str(&format!(
                    r#"<div class="banner banner-error">{}</div>"#,
                    escape_html(message)
                ));
            }
            if let Some(message) = state.success_message(Instant::now()) {
                html.push_str(&format!(
                    r#"<div class="banner banner-success">{}</div>"#,
                    escape_html(message)
                ));
            }
        }

        for group in self.groups() {
            let rows: String = group.fields.iter().map(BoundField::render_row).collect();
            match &group.name {
                None => html.push_str(&rows),
                Some(name) => html.push_str(&format!(
                    "<fieldset><legend>{}</legend>{rows}</fieldset>",
                    escape_html(name)
                )),
            }
        }

        let disabled = if self.is_submitting() { " disabled" } else { "" };
        html.push_str(&format!(
            r#"<div class="actions"><button type="submit"{disabled}>{}</button>"#,
            escape_html(&self.settings.submit_label)
        ));
        if self.settings.show_reset {
            html.push_str(&format!(
                r#"<button type="reset">{}</button>"#,
                escape_html(&self.settings.reset_label)
            ));
        }
        html.push_str("</div></form>");
        html
    }
}

fn bind(state: &FormState, name: &str, field: &FieldSchema) -> BoundField {
    BoundField::new(
        name,
        field,
        state.values.get(name).cloned().unwrap_or_default(),
        state.errors.get(name).map(str::to_string),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;
    use autoform_core::PersistenceError;

    use crate::persistence::InMemoryRecordStore;
    use crate::submission::Payload;

    fn contact_schema() -> FormSchema {
        FormSchema::new()
            .field("name", FieldSchema::new("text").required(true))
            .field("email", FieldSchema::new("email").required(true))
            .field("age", FieldSchema::new("number").min(0.0))
    }

    fn fill(form: &AutoForm) {
        form.handle_input("name", "Ada").unwrap();
        form.handle_input("email", "ada@example.com").unwrap();
    }

    /// A record store that takes a while to answer.
    struct SlowStore;

    #[async_trait]
    impl RecordStore for SlowStore {
        async fn create_or_update(
            &self,
            _path: &str,
            _key: Option<&str>,
            _payload: &Payload,
        ) -> Result<String, PersistenceError> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok("slow-key".to_string())
        }

        async fn fetch(&self, _path: &str, _key: &str) -> Result<Option<Record>, PersistenceError> {
            Ok(None)
        }
    }

    #[test]
    fn test_handle_input_normalises_value() {
        let form = AutoForm::new(contact_schema(), FormSettings::default());
        assert_eq!(form.handle_input("age", "42").unwrap(), FieldValue::Number(42.0));
        assert_eq!(form.handle_input("age", "  ").unwrap(), FieldValue::from(""));
        assert_eq!(form.value("age"), Some(FieldValue::from("")));
    }

    #[test]
    fn test_handle_input_unknown_field() {
        let form = AutoForm::new(contact_schema(), FormSettings::default());
        let err = form.handle_input("nickname", "x").unwrap_err();
        assert!(matches!(err, AutoformError::UnknownField(name) if name == "nickname"));
    }

    #[test]
    fn test_input_does_not_validate_until_field_has_error() {
        let form = AutoForm::new(contact_schema(), FormSettings::default());
        form.handle_input("email", "bad").unwrap();
        assert!(form.errors().is_empty());

        assert_eq!(
            form.handle_blur("email").unwrap().as_deref(),
            Some("Please enter a valid email")
        );
        form.handle_input("email", "ada@example.com").unwrap();
        assert!(!form.errors().contains("email"));
    }

    #[test]
    fn test_validate_replaces_errors() {
        let form = AutoForm::new(contact_schema(), FormSettings::default());
        assert!(!form.validate());
        assert_eq!(form.errors().len(), 2);
        fill(&form);
        assert!(form.validate());
        assert!(form.is_valid());
    }

    #[test]
    fn test_set_record_reinitialises() {
        let form = AutoForm::new(contact_schema(), FormSettings::default());
        form.handle_input("name", "typed").unwrap();
        form.validate();

        let mut record = Record::new();
        record.insert("name".into(), "Grace".into());
        form.set_record(Some(record), Some("k1".into()));

        assert_eq!(form.value("name"), Some(FieldValue::from("Grace")));
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_set_schema_reinitialises() {
        let form = AutoForm::new(contact_schema(), FormSettings::default());
        form.handle_input("name", "typed").unwrap();
        form.set_schema(FormSchema::new().field("title", FieldSchema::new("text")));
        assert_eq!(form.values().len(), 1);
        assert_eq!(form.value("name"), None);
    }

    #[tokio::test]
    async fn test_submit_invalid_sets_errors() {
        let form = AutoForm::new(contact_schema(), FormSettings::default());
        form.handle_input("name", "Ada").unwrap();
        let outcome = form.submit().await;
        match outcome {
            SubmitOutcome::Invalid(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(form.errors().contains("email"));
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_submit_failure_sets_banner_and_keeps_values() {
        let records = Arc::new(InMemoryRecordStore::new());
        records.fail_with("offline").await;
        let settings = FormSettings::default().with_path("contacts");
        let form = AutoForm::new(contact_schema(), settings).with_store(records);
        fill(&form);

        assert_eq!(form.submit().await, SubmitOutcome::Failed("offline".into()));
        assert_eq!(form.error_message().as_deref(), Some("offline"));
        assert_eq!(form.value("name"), Some(FieldValue::from("Ada")));
    }

    #[tokio::test]
    async fn test_error_banner_clears_on_next_attempt() {
        let records = Arc::new(InMemoryRecordStore::new());
        records.fail_with("offline").await;
        let settings = FormSettings::default().with_path("contacts");
        let form = AutoForm::new(contact_schema(), settings).with_store(records.clone());
        fill(&form);
        form.submit().await;

        records.recover().await;
        assert!(form.submit().await.is_accepted());
        assert_eq!(form.error_message(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_while_busy() {
        let settings = FormSettings::default().with_path("contacts");
        let form = AutoForm::new(contact_schema(), settings).with_store(Arc::new(SlowStore));
        fill(&form);

        let (first, second) = tokio::join!(form.submit(), form.submit());
        assert!(first.is_accepted());
        assert_eq!(second, SubmitOutcome::Busy);
        assert!(!form.is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_banner_expires() {
        let settings = FormSettings::default().with_success_message("Saved!");
        let form = AutoForm::new(contact_schema(), settings);
        fill(&form);
        assert!(form.submit().await.is_accepted());

        assert_eq!(form.success_message(Instant::now()).as_deref(), Some("Saved!"));
        tokio::time::advance(Duration::from_millis(2999)).await;
        assert!(form.success_message(Instant::now()).is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(form.success_message(Instant::now()), None);
        form.expire_banners(Instant::now());
        assert!(!form.render_html().contains("banner-success"));
    }

    #[tokio::test]
    async fn test_reset_on_submit_keeps_success_banner() {
        let settings = FormSettings::default()
            .with_success_message("Saved!")
            .with_reset_on_submit(true);
        let form = AutoForm::new(contact_schema(), settings);

        let resets = Arc::new(AtomicUsize::new(0));
        let counter = resets.clone();
        form.signals().reset.connect(
            "count",
            Arc::new(move |_: &FormReset| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        fill(&form);
        assert!(form.submit().await.is_accepted());
        assert_eq!(resets.load(Ordering::SeqCst), 1);
        assert_eq!(form.value("name"), Some(FieldValue::from("")));
        assert!(form.success_message(Instant::now()).is_some());
    }

    #[tokio::test]
    async fn test_load_record() {
        let records = Arc::new(InMemoryRecordStore::new());
        let mut record = Record::new();
        record.insert("name".into(), "Grace".into());
        records.insert("contacts", "k1", record).await;

        let settings = FormSettings::default()
            .with_path("contacts")
            .with_record_key("k1");
        let form = AutoForm::new(contact_schema(), settings).with_store(records);
        assert!(form.load_record().await.unwrap());
        assert_eq!(form.value("name"), Some(FieldValue::from("Grace")));
    }

    #[tokio::test]
    async fn test_load_record_without_store_is_noop() {
        let settings = FormSettings::default().with_record_key("k1");
        let form = AutoForm::new(contact_schema(), settings);
        assert!(!form.load_record().await.unwrap());
    }

    #[test]
    fn test_render_html() {
        let schema = FormSchema::new()
            .field("id", FieldSchema::new("hidden"))
            .field("title", FieldSchema::new("text").group("Meta"));
        let settings = FormSettings {
            show_reset: true,
            ..FormSettings::default()
        };
        let form = AutoForm::new(schema, settings);
        let html = form.render_html();
        assert!(html.starts_with(r#"<form class="autoform" novalidate>"#));
        assert!(html.contains("<fieldset><legend>Meta</legend>"));
        assert!(html.find(r#"name="id""#) < html.find("<fieldset>"));
        assert!(html.contains(r#"<button type="submit">Submit</button>"#));
        assert!(html.contains(r#"<button type="reset">Reset</button>"#));
    }

    #[test]
    fn test_as_context() {
        let form = AutoForm::new(contact_schema(), FormSettings::default());
        form.handle_input("name", "Ada").unwrap();
        let ctx = form.as_context();
        assert_eq!(ctx["values"]["name"], "Ada");
        assert_eq!(ctx["groups"][0]["name"], serde_json::Value::Null);
        assert_eq!(ctx["groups"][0]["fields"][0]["name"], "name");
        assert_eq!(ctx["submitLabel"], "Submit");
        assert_eq!(ctx["submitting"], false);
    }
}
