//! # autoform
//!
//! Schema-driven forms for Rust.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `autoform` to get the whole engine, or on the
//! individual crates for finer-grained control.
//!
//! ```
//! use autoform::prelude::*;
//!
//! # async fn run() -> AutoformResult<()> {
//! let schema = FormSchema::from_json_str(r#"{"email": {"type": "email", "required": true}}"#)?;
//! let form = AutoForm::new(schema, FormSettings::default());
//! form.handle_input("email", "ada@example.com")?;
//! assert!(form.submit().await.is_accepted());
//! # Ok(())
//! # }
//! ```

/// Value type, settings, error types, and logging setup.
pub use autoform_core as core;

/// Per-form signals for submit, failure, and reset notifications.
#[cfg(feature = "signals")]
pub use autoform_signals as signals;

/// The form engine: schema, widgets, validation, and submission.
#[cfg(feature = "forms")]
pub use autoform_forms as forms;

// Third-party re-exports
pub use async_trait;
pub use chrono;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
pub use tracing_subscriber;

/// The types most applications need.
pub mod prelude {
    pub use autoform_core::logging::setup_logging;
    pub use autoform_core::{
        AutoformError, AutoformResult, FieldValue, FormSettings, PersistenceError,
    };

    #[cfg(feature = "signals")]
    pub use autoform_signals::{FormReset, FormSignals, FormSubmitted, Signal, SubmitFailed};

    #[cfg(feature = "forms")]
    pub use autoform_forms::{
        AutoForm, FieldSchema, FieldType, FormSchema, InMemoryRecordStore, RawInput, Record,
        RecordStore, SubmitOutcome,
    };
}
