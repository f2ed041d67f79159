//! # autoform-core
//!
//! Core types, settings, and error types for the autoform-rs workspace.
//! This crate has no dependency on the form engine itself and provides the
//! foundation for the other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`value`] - The [`FieldValue`] type stored in forms and payloads
//! - [`settings`] - Per-form configuration
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use error::{AutoformError, AutoformResult, PersistenceError};
pub use settings::FormSettings;
pub use value::FieldValue;
