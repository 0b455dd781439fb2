// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle manager behavior against a temp store and a scripted provider.

use courier_core::{CourierError, MappingStatus};
use courier_service::InstanceInput;
use courier_test_utils::{CreateOutcome, MockProvider, ProviderCall, TestHarness};
use serde_json::json;

fn input(name: &str, contacts: &[&str], message: &str) -> InstanceInput {
    InstanceInput {
        name: name.to_string(),
        contacts: contacts.iter().map(|c| c.to_string()).collect(),
        message: message.to_string(),
        provider: None,
    }
}

#[tokio::test]
async fn create_round_trips_through_get() {
    let harness = TestHarness::builder().build().await.unwrap();
    let created = harness
        .service
        .lifecycle
        .create(input("Sales", &["5511900000001", "5511900000002"], "Olá!"))
        .await
        .unwrap();

    let fetched = harness.service.lifecycle.get(&created.instance.id).await.unwrap();
    assert_eq!(fetched.instance.name, "Sales");
    assert_eq!(fetched.instance.contacts, vec!["5511900000001", "5511900000002"]);
    assert_eq!(fetched.instance.message, "Olá!");
    assert_eq!(fetched.instance.provider, "remote");
    assert_eq!(fetched.api_status, Some(MappingStatus::Created));
    assert_eq!(fetched.api_instance_id.as_deref(), Some("mock-1"));
    assert!(fetched.api_error.is_none());
}

#[tokio::test]
async fn invalid_input_persists_nothing() {
    let harness = TestHarness::builder().build().await.unwrap();
    let lifecycle = &harness.service.lifecycle;

    let cases = [
        input("Sales", &[], "hi"),
        input(&"n".repeat(101), &["1"], "hi"),
        input("Sales", &["1"], &"m".repeat(1001)),
        input("", &["1"], "hi"),
    ];
    for case in cases {
        let err = lifecycle.create(case).await.unwrap_err();
        assert!(matches!(err, CourierError::Validation { .. }));
    }

    assert!(lifecycle.list().await.unwrap().is_empty());
    assert!(harness.provider.calls().await.is_empty());
}

#[tokio::test]
async fn soft_null_provisioning_keeps_instance_with_error_mapping() {
    let provider = MockProvider::new();
    provider.set_create_outcome(CreateOutcome::Unsupported).await;
    let harness = TestHarness::builder().with_provider(provider).build().await.unwrap();

    let view = harness
        .service
        .lifecycle
        .create(input("Sales", &["1"], "hi"))
        .await
        .unwrap();
    assert_eq!(view.api_status, Some(MappingStatus::Error));
    assert!(view.api_instance_id.is_none());
    assert!(view.api_error.is_some());

    let mappings = harness
        .storage
        .mappings_for_instance(&view.instance.id)
        .await
        .unwrap();
    assert_eq!(mappings.len(), 1);
}

#[tokio::test]
async fn failed_provisioning_surfaces_error_detail() {
    let provider = MockProvider::new();
    provider
        .set_create_outcome(CreateOutcome::Fail("connection refused".into()))
        .await;
    let harness = TestHarness::builder().with_provider(provider).build().await.unwrap();

    let view = harness
        .service
        .lifecycle
        .create(input("Sales", &["1"], "hi"))
        .await
        .unwrap();
    assert_eq!(view.api_status, Some(MappingStatus::Error));
    assert!(view.api_error.unwrap().contains("connection refused"));
}

#[tokio::test]
async fn create_extracts_remote_id_from_alternate_keys() {
    let provider = MockProvider::new();
    provider
        .set_create_outcome(CreateOutcome::Document(json!({"sessionId": "s-9"})))
        .await;
    let harness = TestHarness::builder().with_provider(provider).build().await.unwrap();

    let view = harness
        .service
        .lifecycle
        .create(input("Sales", &["1"], "hi"))
        .await
        .unwrap();
    assert_eq!(view.api_instance_id.as_deref(), Some("s-9"));
}

#[tokio::test]
async fn update_changes_fields_but_not_mapping() {
    let harness = TestHarness::builder().build().await.unwrap();
    let created = harness.create_instance("Sales", &["1"]).await.unwrap();
    let id = created.instance.id.clone();

    let updated = harness
        .service
        .lifecycle
        .update(&id, input("Support", &["2", "3"], "bye"))
        .await
        .unwrap();
    assert_eq!(updated.instance.name, "Support");
    assert_eq!(updated.instance.contacts, vec!["2", "3"]);
    assert_eq!(updated.api_instance_id, created.api_instance_id);
    assert_eq!(updated.api_status, created.api_status);

    let err = harness
        .service
        .lifecycle
        .update("missing", input("x", &["1"], "y"))
        .await
        .unwrap_err();
    assert!(matches!(err, CourierError::NotFound(_)));
}

#[tokio::test]
async fn delete_cascades_and_tears_down_remote() {
    let harness = TestHarness::builder().build().await.unwrap();
    let created = harness.create_instance("Sales", &["1"]).await.unwrap();
    let id = created.instance.id.clone();

    harness.service.lifecycle.delete(&id).await.unwrap();

    assert!(matches!(
        harness.service.lifecycle.get(&id).await.unwrap_err(),
        CourierError::NotFound(_)
    ));
    assert!(harness.storage.current_mapping(&id).await.unwrap().is_none());
    assert!(harness
        .provider
        .calls()
        .await
        .contains(&ProviderCall::Stop {
            remote_id: "mock-1".into()
        }));

    assert!(matches!(
        harness.service.lifecycle.delete(&id).await.unwrap_err(),
        CourierError::NotFound(_)
    ));
}

#[tokio::test]
async fn delete_survives_remote_teardown_failure() {
    let harness = TestHarness::builder().build().await.unwrap();
    let created = harness.create_instance("Sales", &["1"]).await.unwrap();
    harness.provider.fail_lifecycle(true).await;

    harness
        .service
        .lifecycle
        .delete(&created.instance.id)
        .await
        .unwrap();
    assert!(harness.service.lifecycle.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn start_and_stop_update_current_mapping_status() {
    let harness = TestHarness::builder().build().await.unwrap();
    let id = harness.create_instance("Sales", &["1"]).await.unwrap().instance.id;
    let lifecycle = &harness.service.lifecycle;

    let started = lifecycle.start(&id).await.unwrap();
    assert_eq!(started.status, MappingStatus::Starting);
    assert_eq!(lifecycle.get(&id).await.unwrap().api_status, Some(MappingStatus::Starting));

    let stopped = lifecycle.stop(&id).await.unwrap();
    assert_eq!(stopped.status, MappingStatus::Stopped);
    assert_eq!(lifecycle.get(&id).await.unwrap().api_status, Some(MappingStatus::Stopped));
}

#[tokio::test]
async fn start_without_remote_session_is_mapping_unavailable() {
    let provider = MockProvider::new();
    provider.set_create_outcome(CreateOutcome::Unsupported).await;
    let harness = TestHarness::builder().with_provider(provider).build().await.unwrap();
    let id = harness.create_instance("Sales", &["1"]).await.unwrap().instance.id;

    let err = harness.service.lifecycle.start(&id).await.unwrap_err();
    assert!(matches!(err, CourierError::MappingUnavailable(_)));

    let err = harness.service.lifecycle.get_qr("missing").await.unwrap_err();
    assert!(matches!(err, CourierError::MappingUnavailable(_)));
}

#[tokio::test]
async fn adapter_failure_leaves_status_unchanged() {
    let harness = TestHarness::builder().build().await.unwrap();
    let id = harness.create_instance("Sales", &["1"]).await.unwrap().instance.id;
    harness.provider.fail_lifecycle(true).await;

    let err = harness.service.lifecycle.start(&id).await.unwrap_err();
    assert!(matches!(err, CourierError::Adapter { .. }));
    let view = harness.service.lifecycle.get(&id).await.unwrap();
    assert_eq!(view.api_status, Some(MappingStatus::Created));
}

#[tokio::test]
async fn status_poll_persists_observation() {
    let harness = TestHarness::builder().build().await.unwrap();
    let id = harness.create_instance("Sales", &["1"]).await.unwrap().instance.id;
    let lifecycle = &harness.service.lifecycle;

    let first = lifecycle.get_status(&id).await.unwrap();
    let second = lifecycle.get_status(&id).await.unwrap();
    assert!(first.connected);
    assert_eq!(first.status, second.status);
    assert_eq!(lifecycle.get(&id).await.unwrap().api_status, Some(MappingStatus::Connected));

    harness
        .provider
        .set_status(json!({"connected": false, "status": "qr_pending"}))
        .await;
    let report = lifecycle.get_status(&id).await.unwrap();
    assert!(!report.connected);
    assert_eq!(report.status, "qr_pending");
    assert_eq!(
        lifecycle.get(&id).await.unwrap().api_status,
        Some(MappingStatus::Disconnected)
    );
}

#[tokio::test]
async fn list_is_newest_first() {
    let harness = TestHarness::builder().build().await.unwrap();
    let first = harness.create_instance("first", &["1"]).await.unwrap();
    let second = harness.create_instance("second", &["1"]).await.unwrap();

    let ids: Vec<String> = harness
        .service
        .lifecycle
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.instance.id)
        .collect();
    assert_eq!(ids, vec![second.instance.id, first.instance.id]);
}

#[tokio::test]
async fn send_now_goes_through_current_session() {
    let harness = TestHarness::builder().build().await.unwrap();
    let id = harness.create_instance("Sales", &["1"]).await.unwrap().instance.id;

    let result = harness
        .service
        .lifecycle
        .send_now(&id, "5511", "ping")
        .await
        .unwrap();
    assert_eq!(result["messageId"], "msg-5511");
    assert_eq!(harness.provider.sent().await, vec![("5511".into(), "ping".into())]);

    let err = harness
        .service
        .lifecycle
        .send_now(&id, "", "ping")
        .await
        .unwrap_err();
    assert!(matches!(err, CourierError::Validation { .. }));
}
