//! The value store: current values for every field of one form.
//!
//! A [`ValueStore`] always holds exactly the fields of the schema it was
//! initialised from, in declaration order. Updates never mutate a store in
//! place; [`ValueStore::set`] returns a new store that shares nothing the
//! caller can observe, so two snapshots can be compared with `==`.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use autoform_core::FieldValue;

use crate::schema::FormSchema;

/// An existing record supplied for editing: field name to stored value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Current form values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueStore {
    values: Arc<IndexMap<String, FieldValue>>,
}

impl Serialize for ValueStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.as_ref().serialize(serializer)
    }
}

impl ValueStore {
    /// Builds the initial store for `schema`.
    ///
    /// Each field starts at its declared default, `false` for checkboxes, or
    /// the empty string. Values in `record` then override fields the schema
    /// declares; record keys outside the schema are ignored.
    pub fn initialize(schema: &FormSchema, record: Option<&Record>) -> Self {
        let mut values: IndexMap<String, FieldValue> = schema
            .iter()
            .map(|(name, field)| (name.to_string(), field.initial_value()))
            .collect();

        if let Some(record) = record {
            for (key, value) in record {
                if let Some(slot) = values.get_mut(key) {
                    *slot = FieldValue::from(value.clone());
                }
            }
        }

        tracing::debug!(
            fields = values.len(),
            from_record = record.is_some(),
            "value store initialised"
        );
        Self {
            values: Arc::new(values),
        }
    }

    /// Returns a store equal to this one except that `name` holds `value`.
    ///
    /// Names the store does not hold are ignored and an equal store is
    /// returned.
    #[must_use]
    pub fn set(&self, name: &str, value: impl Into<FieldValue>) -> Self {
        if !self.values.contains_key(name) {
            tracing::debug!(field = name, "ignoring value for undeclared field");
            return self.clone();
        }
        let mut next = self.clone();
        if let Some(slot) = Arc::make_mut(&mut next.values).get_mut(name) {
            *slot = value.into();
        }
        next
    }

    /// Returns the current value of `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Iterates `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of fields held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the store holds no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the values as a JSON object in schema order.
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::from(v.clone())))
            .collect()
    }
}
