//! # autoform-forms
//!
//! The schema-driven form engine for autoform-rs. A [`FormSchema`] declares
//! the fields; an [`AutoForm`] renders them, validates user input, and
//! submits the result through an optional [`RecordStore`].
//!
//! ## Modules
//!
//! - [`schema`] - Field and form schema types
//! - [`widgets`] - Resolving field types to controls and normalising input
//! - [`validation`] - Ordered per-field validation rules
//! - [`store`] - The copy-on-write value store
//! - [`groups`] - Partitioning fields into fieldsets
//! - [`persistence`] - The record store contract and an in-memory store
//! - [`submission`] - Payload building and the submission sequence
//! - [`bound_field`] - Fields bound to their value and error for rendering
//! - [`form`] - The [`AutoForm`] instance

pub mod bound_field;
pub mod form;
pub mod groups;
pub mod persistence;
pub mod schema;
pub mod store;
pub mod submission;
pub mod validation;
pub mod widgets;

pub use bound_field::BoundField;
pub use form::{AutoForm, BoundGroup, SubmitOutcome};
pub use groups::{declaration_order, partition, FieldGroup};
pub use persistence::{InMemoryRecordStore, RecordStore};
pub use schema::{FieldOption, FieldSchema, FieldType, FormSchema, Pattern};
pub use store::{Record, ValueStore};
pub use submission::{
    build_payload, Payload, Submission, SubmissionCoordinator, SubmitError, SubmitTarget,
};
pub use validation::{validate_all, validate_field, FieldErrors};
pub use widgets::{resolve, ControlDescriptor, ControlKind, RawInput};
