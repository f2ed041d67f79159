//! Partitioning schema fields into fieldsets.
//!
//! Fields without a `group` are rendered directly; every other group renders
//! as a titled fieldset. [`partition`] puts the ungrouped bucket first and
//! the named buckets after it in the order their first field was declared.

use crate::schema::{FieldSchema, FormSchema};

/// One field inside a [`FieldGroup`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupedField<'a> {
    /// Position of the field in the schema's declaration order.
    pub index: usize,
    /// The field name.
    pub name: &'a str,
    /// The field definition.
    pub field: &'a FieldSchema,
}

/// A bucket of fields sharing a `group` value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGroup<'a> {
    /// The fieldset title, or `None` for ungrouped fields.
    pub name: Option<&'a str>,
    /// The bucket's fields in declaration order. Never empty.
    pub fields: Vec<GroupedField<'a>>,
}

impl FieldGroup<'_> {
    /// Returns `true` for the bucket of ungrouped fields.
    pub const fn is_ungrouped(&self) -> bool {
        self.name.is_none()
    }

    /// Iterates the names of the bucket's fields.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name)
    }
}

/// Partitions `schema` into its ungrouped bucket and named groups.
pub fn partition(schema: &FormSchema) -> Vec<FieldGroup<'_>> {
    let mut ungrouped = FieldGroup {
        name: None,
        fields: Vec::new(),
    };
    let mut named: Vec<FieldGroup<'_>> = Vec::new();

    for (index, (name, field)) in schema.iter().enumerate() {
        let entry = GroupedField { index, name, field };
        match field.group.as_deref() {
            None => ungrouped.fields.push(entry),
            Some(group) => {
                if let Some(bucket) = named.iter_mut().find(|g| g.name == Some(group)) {
                    bucket.fields.push(entry);
                } else {
                    named.push(FieldGroup {
                        name: Some(group),
                        fields: vec![entry],
                    });
                }
            }
        }
    }

    let mut groups = Vec::with_capacity(named.len() + 1);
    if !ungrouped.fields.is_empty() {
        groups.push(ungrouped);
    }
    groups.extend(named);
    groups
}

/// Flattens partitioned groups back into schema declaration order.
pub fn declaration_order<'a>(groups: &[FieldGroup<'a>]) -> Vec<&'a str> {
    let mut fields: Vec<GroupedField<'a>> = groups
        .iter()
        .flat_map(|g| g.fields.iter().copied())
        .collect();
    fields.sort_by_key(|f| f.index);
    fields.into_iter().map(|f| f.name).collect()
}
