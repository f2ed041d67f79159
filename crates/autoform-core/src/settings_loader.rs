//! Settings loading from configuration files.
//!
//! This module provides functions to load [`FormSettings`] from TOML and JSON
//! documents and to apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (keys present override defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `AUTOFORM_PATH` | `path` |
//! | `AUTOFORM_RECORD_KEY` | `record_key` |
//! | `AUTOFORM_SUCCESS_MESSAGE` | `success_message` |
//! | `AUTOFORM_RESET_ON_SUBMIT` | `reset_on_submit` |
//! | `AUTOFORM_SHOW_RESET` | `show_reset` |
//! | `AUTOFORM_LOG_LEVEL` | `log_level` |
//! | `AUTOFORM_DEBUG` | `debug` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use autoform_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/contact_form.toml").unwrap();
//! let settings = settings_loader::from_json_file_with_env("config/contact_form.json").unwrap();
//! ```

use std::path::Path;

use crate::error::AutoformError;
use crate::settings::FormSettings;

/// Loads settings from a TOML string.
///
/// Keys missing from the document keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<FormSettings, AutoformError> {
    toml::from_str(toml_str)
        .map_err(|e| AutoformError::ConfigurationError(format!("Failed to parse TOML: {e}")))
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<FormSettings, AutoformError> {
    let content = read_config(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<FormSettings, AutoformError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<FormSettings, AutoformError> {
    serde_json::from_str(json_str)
        .map_err(|e| AutoformError::ConfigurationError(format!("Failed to parse JSON: {e}")))
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<FormSettings, AutoformError> {
    let content = read_config(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<FormSettings, AutoformError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> FormSettings {
    let mut settings = FormSettings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// Boolean variables accept "true"/"1"/"yes" (case-insensitive) as true and
/// anything else as false. An empty `AUTOFORM_PATH` or `AUTOFORM_RECORD_KEY`
/// clears the corresponding setting.
pub fn apply_env_overrides(settings: &mut FormSettings) {
    if let Ok(val) = std::env::var("AUTOFORM_PATH") {
        settings.path = non_empty(val);
    }

    if let Ok(val) = std::env::var("AUTOFORM_RECORD_KEY") {
        settings.record_key = non_empty(val);
    }

    if let Ok(val) = std::env::var("AUTOFORM_SUCCESS_MESSAGE") {
        settings.success_message = non_empty(val);
    }

    if let Ok(val) = std::env::var("AUTOFORM_RESET_ON_SUBMIT") {
        settings.reset_on_submit = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("AUTOFORM_SHOW_RESET") {
        settings.show_reset = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("AUTOFORM_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("AUTOFORM_DEBUG") {
        settings.debug = parse_flag(&val);
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, kind: &str) -> Result<String, AutoformError> {
    std::fs::read_to_string(path).map_err(|e| {
        AutoformError::ConfigurationError(format!(
            "Failed to read {kind} file '{}': {e}",
            path.display()
        ))
    })
}

fn parse_flag(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn non_empty(val: String) -> Option<String> {
    if val.is_empty() {
        None
    } else {
        Some(val)
    }
}
