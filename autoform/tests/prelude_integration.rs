//! Smoke tests for the facade crate's prelude.

use std::sync::Arc;

use autoform::prelude::*;

#[tokio::test]
async fn test_prelude_round_trip() {
    let schema = FormSchema::from_json_str(
        r#"{"name": {"required": true}, "tier": {"type": "select", "options": ["free", "pro"], "group": "Plan"}}"#,
    )
    .unwrap();
    let records = Arc::new(InMemoryRecordStore::new());
    let settings = FormSettings::default().with_path("signups");
    let form = AutoForm::new(schema, settings).with_store(records.clone());

    form.handle_input("name", "Ada").unwrap();
    form.handle_input("tier", "pro").unwrap();

    let outcome = form.submit().await;
    let key = outcome.submission().unwrap().key.clone().unwrap();
    let stored = records.fetch("signups", &key).await.unwrap().unwrap();
    assert_eq!(stored["tier"], "pro");
}

#[test]
fn test_settings_from_toml() {
    let settings = autoform::core::settings_loader::from_toml_str(
        "path = \"people\"\nsuccess_message = \"Thanks!\"\n",
    )
    .unwrap();
    let form = AutoForm::new(FormSchema::new(), settings);
    assert_eq!(form.settings().path.as_deref(), Some("people"));
    assert_eq!(form.settings().banner_timeout_ms, 3000);
}
