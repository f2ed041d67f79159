//! Integration tests for the signal dispatch system.
//!
//! Tests cover: payload delivery, connection ordering, disconnect from inside
//! a receiver, and the three form lifecycle notifications.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use autoform_signals::{FormReset, FormSignals, FormSubmitted, Signal, SubmitFailed};

// ═════════════════════════════════════════════════════════════════════
// 1. Handler receives the payload
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_signal_connect_and_send_receives_data() {
    let signal: Signal<SubmitFailed> = Signal::new();
    let received = Arc::new(Mutex::new(String::new()));
    let received_clone = received.clone();

    signal.connect(
        "capture",
        Arc::new(move |event: &SubmitFailed| {
            *received_clone.lock().unwrap() = event.message.clone();
        }),
    );

    signal.send(&SubmitFailed {
        message: "permission denied".to_string(),
    });
    assert_eq!(*received.lock().unwrap(), "permission denied");
}

// ═════════════════════════════════════════════════════════════════════
// 2. Receivers run in connection order
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_receivers_called_in_connection_order() {
    let signal: Signal<FormReset> = Signal::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    for name in ["banner", "analytics", "focus"] {
        let order = order.clone();
        signal.connect(
            name,
            Arc::new(move |_: &FormReset| {
                order.lock().unwrap().push(name);
            }),
        );
    }

    assert_eq!(signal.send(&FormReset), 3);
    assert_eq!(*order.lock().unwrap(), vec!["banner", "analytics", "focus"]);
}

// ═════════════════════════════════════════════════════════════════════
// 3. A receiver may disconnect itself while the signal is dispatching
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_receiver_can_disconnect_during_send() {
    let signal = Arc::new(Signal::<FormReset>::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let weak = Arc::downgrade(&signal);
    let c = calls.clone();
    signal.connect(
        "once",
        Arc::new(move |_: &FormReset| {
            c.fetch_add(1, Ordering::SeqCst);
            if let Some(signal) = weak.upgrade() {
                signal.disconnect("once");
            }
        }),
    );

    signal.send(&FormReset);
    signal.send(&FormReset);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(signal.receiver_count(), 0);
}

// ═════════════════════════════════════════════════════════════════════
// 4. Form lifecycle notifications
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_form_submitted_carries_payload_key_and_path() {
    let signals = FormSignals::new();
    let seen = Arc::new(Mutex::new(None));
    let seen_clone = seen.clone();

    signals.submitted.connect(
        "capture",
        Arc::new(move |event: &FormSubmitted| {
            *seen_clone.lock().unwrap() = Some(event.clone());
        }),
    );

    let mut payload = serde_json::Map::new();
    payload.insert("name".into(), serde_json::json!("Ada"));
    signals.submitted.send(&FormSubmitted {
        payload,
        key: Some("-Nabc".into()),
        path: Some("contacts".into()),
    });

    let event = seen.lock().unwrap().clone().unwrap();
    assert_eq!(event.payload["name"], "Ada");
    assert_eq!(event.key.as_deref(), Some("-Nabc"));
    assert_eq!(event.path.as_deref(), Some("contacts"));
}

#[test]
fn test_form_submitted_serializes_for_event_detail() {
    let event = FormSubmitted {
        payload: serde_json::Map::new(),
        key: None,
        path: None,
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"payload": {}, "key": null, "path": null})
    );
}
