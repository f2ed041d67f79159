//! The submission coordinator.
//!
//! A submission runs strictly in sequence: validate every field, build the
//! payload from the current values, then hand the payload to the record store
//! when one is configured. Each step either completes or ends the sequence
//! with a [`SubmitError`]; nothing is retried.
//!
//! The coordinator does not touch form state or emit notifications. The
//! [`AutoForm`](crate::form::AutoForm) that owns it applies the outcome.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

use autoform_core::{FieldValue, PersistenceError};

use crate::persistence::RecordStore;
use crate::schema::FormSchema;
use crate::store::{Record, ValueStore};
use crate::validation::{validate_all, FieldErrors};

/// Payload key carrying the last-modified timestamp.
pub const UPDATED_AT_KEY: &str = "updatedAt";
/// Payload key carrying the creation timestamp of a new record.
pub const CREATED_AT_KEY: &str = "createdAt";

/// Data assembled from a value store for submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    /// Submitted field values in schema order.
    pub fields: IndexMap<String, FieldValue>,
    /// When the payload was built.
    pub updated_at: DateTime<Utc>,
    /// Set only when the submission creates a new record.
    pub created_at: Option<DateTime<Utc>>,
}

impl Payload {
    /// Returns `true` if this payload creates a new record.
    pub const fn is_new(&self) -> bool {
        self.created_at.is_some()
    }

    /// Returns the value submitted for `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Flattens the payload into a JSON object: the field values followed by
    /// `updatedAt` and, for new records, `createdAt` as RFC 3339 strings.
    ///
    /// A field value already stored under a timestamp key is kept; schemas
    /// loaded from JSON cannot declare those names.
    pub fn to_json(&self) -> Record {
        let mut map: Record = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::from(v.clone())))
            .collect();
        map.entry(UPDATED_AT_KEY).or_insert_with(|| timestamp(self.updated_at));
        if let Some(created) = self.created_at {
            map.entry(CREATED_AT_KEY).or_insert_with(|| timestamp(created));
        }
        map
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn timestamp(at: DateTime<Utc>) -> serde_json::Value {
    serde_json::Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Builds the payload for the current values.
///
/// A field is included when its value is non-empty or the field is required.
pub fn build_payload(schema: &FormSchema, values: &ValueStore, is_new: bool) -> Payload {
    build_payload_at(schema, values, is_new, Utc::now())
}

/// [`build_payload`] with an explicit timestamp.
pub fn build_payload_at(
    schema: &FormSchema,
    values: &ValueStore,
    is_new: bool,
    now: DateTime<Utc>,
) -> Payload {
    let fields = schema
        .iter()
        .filter_map(|(name, field)| {
            let value = values.get(name)?;
            (field.required || !value.is_empty()).then(|| (name.to_string(), value.clone()))
        })
        .collect();

    Payload {
        fields,
        updated_at: now,
        created_at: is_new.then_some(now),
    }
}

/// Where a submission is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitTarget {
    /// Collection path in the record store.
    pub path: Option<String>,
    /// Key of the record being edited; `None` creates a new record.
    pub key: Option<String>,
}

impl SubmitTarget {
    /// Creates a target for `path` and an optional existing `key`.
    pub fn new(path: Option<String>, key: Option<String>) -> Self {
        Self { path, key }
    }
}

/// An accepted submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// The submitted payload.
    pub payload: Payload,
    /// The record key: the one the store returned, or the existing key when
    /// nothing was persisted.
    pub key: Option<String>,
    /// The configured path.
    pub path: Option<String>,
    /// Whether the record store was called.
    pub persisted: bool,
}

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// At least one field failed validation. No payload was built.
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),
    /// The record store rejected the payload.
    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Runs the validate, build, persist sequence for one form.
#[derive(Clone, Default)]
pub struct SubmissionCoordinator {
    records: Option<Arc<dyn RecordStore>>,
}

impl fmt::Debug for SubmissionCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionCoordinator")
            .field("records", &self.records.is_some())
            .finish()
    }
}

impl SubmissionCoordinator {
    /// Creates a coordinator that persists through `records`, if given.
    pub fn new(records: Option<Arc<dyn RecordStore>>) -> Self {
        Self { records }
    }

    /// Returns the configured record store.
    pub fn records(&self) -> Option<&Arc<dyn RecordStore>> {
        self.records.as_ref()
    }

    /// Returns `true` if submissions to `target` will be persisted.
    pub const fn persists(&self, target: &SubmitTarget) -> bool {
        self.records.is_some() && target.path.is_some()
    }

    /// Submits `values` for `schema`.
    ///
    /// Persistence runs only when both a record store and a target path are
    /// configured; otherwise the locally built payload is accepted as is.
    pub async fn submit(
        &self,
        schema: &FormSchema,
        values: &ValueStore,
        target: &SubmitTarget,
    ) -> Result<Submission, SubmitError> {
        let errors = validate_all(schema, values);
        if !errors.is_empty() {
            tracing::debug!(invalid = errors.len(), "submission rejected by validation");
            return Err(SubmitError::Validation(errors));
        }

        let payload = build_payload(schema, values, target.key.is_none());

        let (key, persisted) = match (&self.records, target.path.as_deref()) {
            (Some(records), Some(path)) => {
                let key = records
                    .create_or_update(path, target.key.as_deref(), &payload)
                    .await
                    .map_err(|err| {
                        tracing::warn!(path, error = %err, "failed to persist submission");
                        err
                    })?;
                (Some(key), true)
            }
            _ => (target.key.clone(), false),
        };

        tracing::info!(
            fields = payload.fields.len(),
            key = key.as_deref().unwrap_or(""),
            persisted,
            "submission accepted"
        );

        Ok(Submission {
            payload,
            key,
            path: target.path.clone(),
            persisted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryRecordStore;
    use crate::schema::FieldSchema;

    fn contact_schema() -> FormSchema {
        FormSchema::new()
            .field("name", FieldSchema::new("text").required(true))
            .field("email", FieldSchema::new("email").required(true))
            .field("notes", FieldSchema::new("textarea"))
    }

    fn filled(schema: &FormSchema) -> ValueStore {
        ValueStore::initialize(schema, None)
            .set("name", "Ada")
            .set("email", "ada@example.com")
    }

    #[test]
    fn test_payload_omits_optional_empty_fields() {
        let schema = contact_schema();
        let payload = build_payload(&schema, &filled(&schema), true);
        assert_eq!(
            payload.fields.keys().collect::<Vec<_>>(),
            vec!["name", "email"]
        );
    }

    #[test]
    fn test_payload_keeps_required_empty_fields() {
        let schema = contact_schema();
        let values = ValueStore::initialize(&schema, None);
        let payload = build_payload(&schema, &values, true);
        assert_eq!(payload.get("name"), Some(&FieldValue::from("")));
        assert!(payload.get("notes").is_none());
    }

    #[test]
    fn test_payload_keeps_false_and_zero() {
        let schema = FormSchema::new()
            .field("agree", FieldSchema::new("checkbox"))
            .field("count", FieldSchema::new("number").default_value(0));
        let payload = build_payload(&schema, &ValueStore::initialize(&schema, None), false);
        assert_eq!(payload.get("agree"), Some(&FieldValue::Bool(false)));
        assert_eq!(payload.get("count"), Some(&FieldValue::Number(0.0)));
    }

    #[test]
    fn test_payload_timestamps() {
        let schema = contact_schema();
        let now = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let created = build_payload_at(&schema, &filled(&schema), true, now).to_json();
        assert_eq!(created[UPDATED_AT_KEY], "2024-05-01T12:00:00.000Z");
        assert_eq!(created[CREATED_AT_KEY], "2024-05-01T12:00:00.000Z");

        let updated = build_payload_at(&schema, &filled(&schema), false, now).to_json();
        assert!(updated.contains_key(UPDATED_AT_KEY));
        assert!(!updated.contains_key(CREATED_AT_KEY));
    }

    #[test]
    fn test_timestamps_never_overwrite_field_values() {
        let schema = FormSchema::new()
            .field(CREATED_AT_KEY, FieldSchema::new("date").required(true));
        let values = ValueStore::initialize(&schema, None).set(CREATED_AT_KEY, "1999-01-01");
        let json = build_payload(&schema, &values, true).to_json();
        assert_eq!(json[CREATED_AT_KEY], "1999-01-01");
        assert!(json.contains_key(UPDATED_AT_KEY));
    }

    #[tokio::test]
    async fn test_submit_without_store_accepts_locally() {
        let schema = contact_schema();
        let coordinator = SubmissionCoordinator::default();
        let submission = coordinator
            .submit(&schema, &filled(&schema), &SubmitTarget::default())
            .await
            .unwrap();
        assert!(!submission.persisted);
        assert_eq!(submission.key, None);
        assert!(submission.payload.is_new());
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_values() {
        let schema = contact_schema();
        let values = ValueStore::initialize(&schema, None).set("name", "Ada");
        let err = SubmissionCoordinator::default()
            .submit(&schema, &values, &SubmitTarget::default())
            .await
            .unwrap_err();
        match err {
            SubmitError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.contains("email"));
            }
            SubmitError::Persistence(_) => panic!("expected validation failure"),
        }
    }

    #[tokio::test]
    async fn test_submit_persists_when_path_configured() {
        let schema = contact_schema();
        let records = Arc::new(InMemoryRecordStore::new());
        let coordinator = SubmissionCoordinator::new(Some(records.clone()));
        let target = SubmitTarget::new(Some("contacts".into()), None);

        let submission = coordinator
            .submit(&schema, &filled(&schema), &target)
            .await
            .unwrap();
        assert!(submission.persisted);
        let key = submission.key.unwrap();
        let stored = records.fetch("contacts", &key).await.unwrap().unwrap();
        assert_eq!(stored["name"], "Ada");
    }

    #[tokio::test]
    async fn test_submit_skips_store_without_path() {
        let schema = contact_schema();
        let records = Arc::new(InMemoryRecordStore::new());
        let coordinator = SubmissionCoordinator::new(Some(records.clone()));
        let target = SubmitTarget::new(None, Some("abc".into()));
        assert!(!coordinator.persists(&target));

        let submission = coordinator
            .submit(&schema, &filled(&schema), &target)
            .await
            .unwrap();
        assert!(!submission.persisted);
        assert_eq!(submission.key.as_deref(), Some("abc"));
        assert!(!submission.payload.is_new());
        assert_eq!(records.len().await, 0);
    }

    #[tokio::test]
    async fn test_submit_surfaces_persistence_failure() {
        let schema = contact_schema();
        let records = Arc::new(InMemoryRecordStore::new());
        records.fail_with("permission denied").await;
        let coordinator = SubmissionCoordinator::new(Some(records));
        let target = SubmitTarget::new(Some("contacts".into()), None);

        let err = coordinator
            .submit(&schema, &filled(&schema), &target)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SubmitError::Persistence(PersistenceError::new("permission denied"))
        );
    }
}
