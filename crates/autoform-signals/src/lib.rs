//! # autoform-signals
//!
//! Signal dispatcher for autoform-rs. A form announces its outcomes through
//! signals instead of calling back into its embedding application directly:
//! a submission was accepted, a submission failed, or the form was reset.
//!
//! Signals are owned by the form instance that emits them. There is no
//! process-wide registry; an application that wants to observe a form
//! connects to that form's [`FormSignals`].
//!
//! ## Usage
//!
//! ```
//! use autoform_signals::{FormReset, FormSignals};
//! use std::sync::Arc;
//!
//! let signals = FormSignals::new();
//!
//! signals.reset.connect("log", Arc::new(|_: &FormReset| {
//!     println!("form was reset");
//! }));
//!
//! signals.reset.send(&FormReset);
//! assert_eq!(signals.reset.receiver_count(), 1);
//! ```

use std::sync::{Arc, RwLock};

use serde::Serialize;

/// The type signature for a signal receiver callback.
///
/// Receivers must be `Send + Sync` so that a form can be moved across
/// threads together with its observers. Notifications are fire-and-forget;
/// receivers return nothing.
pub type SignalReceiver<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A signal that can be connected to and dispatched.
///
/// Each signal carries a payload type `T`. Receivers are called in the order
/// they were connected.
///
/// # Examples
///
/// ```
/// use autoform_signals::Signal;
/// use std::sync::Arc;
///
/// let signal: Signal<String> = Signal::new();
///
/// signal.connect("logger", Arc::new(|msg: &String| {
///     println!("Received: {msg}");
/// }));
///
/// assert_eq!(signal.send(&"hello".to_string()), 1);
/// ```
pub struct Signal<T: 'static> {
    receivers: RwLock<Vec<(String, SignalReceiver<T>)>>,
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("receivers", &self.receiver_ids())
            .finish()
    }
}

impl<T: 'static> Signal<T> {
    /// Creates a new signal with no connected receivers.
    pub fn new() -> Self {
        Self {
            receivers: RwLock::new(Vec::new()),
        }
    }

    /// Connects a receiver to this signal.
    ///
    /// The `receiver_id` is used to identify the receiver for later disconnection.
    /// If a receiver with the same ID is already connected, it is replaced in place.
    pub fn connect(&self, receiver_id: impl Into<String>, callback: SignalReceiver<T>) {
        let id = receiver_id.into();
        let mut receivers = self.receivers.write().expect("signal lock poisoned");

        if let Some(entry) = receivers.iter_mut().find(|(rid, _)| *rid == id) {
            entry.1 = callback;
        } else {
            receivers.push((id, callback));
        }
    }

    /// Disconnects the receiver with the given ID.
    ///
    /// Returns `true` if a receiver was found and removed.
    pub fn disconnect(&self, receiver_id: &str) -> bool {
        let mut receivers = self.receivers.write().expect("signal lock poisoned");
        let len_before = receivers.len();
        receivers.retain(|(id, _)| id != receiver_id);
        receivers.len() < len_before
    }

    /// Sends the signal to all connected receivers, in connection order.
    ///
    /// Returns the number of receivers that were notified. The receiver list
    /// is snapshotted first, so a receiver may connect or disconnect others
    /// without deadlocking.
    pub fn send(&self, payload: &T) -> usize {
        let receivers: Vec<SignalReceiver<T>> = self
            .receivers
            .read()
            .expect("signal lock poisoned")
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in &receivers {
            callback(payload);
        }
        tracing::trace!(receivers = receivers.len(), "signal sent");
        receivers.len()
    }

    /// Returns the number of connected receivers.
    pub fn receiver_count(&self) -> usize {
        self.receivers.read().expect("signal lock poisoned").len()
    }

    /// Returns the IDs of connected receivers, in connection order.
    pub fn receiver_ids(&self) -> Vec<String> {
        self.receivers
            .read()
            .expect("signal lock poisoned")
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

// ── Form lifecycle notifications ─────────────────────────────────────

/// Sent after a submission has been accepted (and persisted, if configured).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSubmitted {
    /// The submitted payload as a flat JSON object.
    pub payload: serde_json::Map<String, serde_json::Value>,
    /// Key of the persisted record, if the submission was persisted.
    pub key: Option<String>,
    /// The configured persistence path, if any.
    pub path: Option<String>,
}

/// Sent when a submission could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitFailed {
    /// Human-readable failure message.
    pub message: String,
}

/// Sent after the form has been reset to its initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormReset;

/// The set of signals emitted by one form instance.
#[derive(Debug, Default)]
pub struct FormSignals {
    /// Fired when a submission is accepted.
    pub submitted: Signal<FormSubmitted>,
    /// Fired when persisting a submission fails.
    pub failed: Signal<SubmitFailed>,
    /// Fired when the form is reset.
    pub reset: Signal<FormReset>,
}

impl FormSignals {
    /// Creates a signal set with no receivers.
    pub fn new() -> Self {
        Self::default()
    }
}
