//! Settings for a single form instance.
//!
//! [`FormSettings`] collects the configuration an embedding application
//! attaches to a form: where submissions are persisted, how the submit and
//! reset affordances are labelled, and what happens after a successful
//! submission. Every field has a default, so an empty configuration document
//! yields a purely client-side form.

use serde::{Deserialize, Serialize};

/// Default success banner lifetime in milliseconds.
pub const DEFAULT_BANNER_TIMEOUT_MS: u64 = 3000;

/// Configuration for one form instance.
///
/// # Examples
///
/// ```
/// use autoform_core::settings::FormSettings;
///
/// let settings = FormSettings::default();
/// assert!(settings.path.is_none());
/// assert_eq!(settings.submit_label, "Submit");
/// assert_eq!(settings.banner_timeout_ms, 3000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    // ── Persistence ──────────────────────────────────────────────────

    /// Collection path that submissions are written to. `None` keeps the
    /// form client-side only.
    pub path: Option<String>,
    /// Key of an existing record being edited. `None` means every
    /// submission creates a new record.
    pub record_key: Option<String>,

    // ── Presentation ─────────────────────────────────────────────────

    /// Label of the submit button.
    pub submit_label: String,
    /// Label of the reset button.
    pub reset_label: String,
    /// Whether a reset button is rendered.
    pub show_reset: bool,

    // ── Post-submit behaviour ────────────────────────────────────────

    /// Re-initialise the form after every accepted submission.
    pub reset_on_submit: bool,
    /// Banner text shown after an accepted submission.
    pub success_message: Option<String>,
    /// How long the success banner stays visible, in milliseconds.
    pub banner_timeout_ms: u64,

    // ── Logging ──────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            path: None,
            record_key: None,

            submit_label: "Submit".to_string(),
            reset_label: "Reset".to_string(),
            show_reset: false,

            reset_on_submit: false,
            success_message: None,
            banner_timeout_ms: DEFAULT_BANNER_TIMEOUT_MS,

            debug: true,
            log_level: "info".to_string(),
        }
    }
}

impl FormSettings {
    /// Sets the persistence path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the key of the record being edited.
    #[must_use]
    pub fn with_record_key(mut self, key: impl Into<String>) -> Self {
        self.record_key = Some(key.into());
        self
    }

    /// Sets the success banner message.
    #[must_use]
    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    /// Sets whether the form resets after an accepted submission.
    #[must_use]
    pub const fn with_reset_on_submit(mut self, reset: bool) -> Self {
        self.reset_on_submit = reset;
        self
    }

    /// Returns the success banner lifetime.
    pub const fn banner_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.banner_timeout_ms)
    }
}
