//! Logging integration for autoform-rs.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`FormSettings`](crate::settings::FormSettings) and for creating per-form spans.

use crate::settings::FormSettings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level` (e.g. "debug", "info",
/// "warn", "error"). In debug mode a pretty, human-readable format is used;
/// otherwise a structured JSON format is used. If a subscriber is already
/// installed this is a no-op.
pub fn setup_logging(settings: &FormSettings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one form instance.
///
/// Enter this span around form operations so that every log entry emitted
/// while validating or submitting carries the form's identifier.
///
/// # Examples
///
/// ```
/// use autoform_core::logging::form_span;
///
/// let span = form_span("contact");
/// let _guard = span.enter();
/// tracing::info!("validating");
/// ```
pub fn form_span(form_id: &str) -> tracing::Span {
    tracing::info_span!("form", id = form_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_twice_is_harmless() {
        let settings = FormSettings {
            log_level: "not a level ][".to_string(),
            ..FormSettings::default()
        };
        setup_logging(&settings);
        setup_logging(&FormSettings::default());
    }

    #[test]
    fn test_form_span_enter() {
        let span = form_span("signup");
        let _guard = span.enter();
        tracing::debug!("inside form span");
    }
}
