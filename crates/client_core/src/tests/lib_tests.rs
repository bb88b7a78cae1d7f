use serde_json::json;

use super::*;
use crate::test_support::{publisher_json, scenario_json, spawn_backend};

#[test]
fn from_settings_uses_file_token_store_when_configured() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = ClientSettings {
        api_base_url: "http://127.0.0.1:9/api".into(),
        token_path: Some(dir.path().join("storage.json")),
        ..ClientSettings::default()
    };

    let store = AppStore::from_settings(&settings).expect("store");
    store.api().tokens().store("persisted").expect("store token");

    let reopened = FileTokenStore::new(dir.path().join("storage.json"));
    assert_eq!(reopened.load().expect("load").as_deref(), Some("persisted"));
    assert_eq!(store.api().base_url().as_str(), "http://127.0.0.1:9/api/");
}

#[tokio::test]
async fn confirm_create_dialog_creates_and_closes() {
    let backend = spawn_backend().await;
    backend.reply("GET", "publisher/p1", publisher_json("p1", &[])).await;
    backend
        .reply("POST", "publisher/p1/scenario", scenario_json("s3", "Untitled scenario"))
        .await;
    let store = backend.store();
    store
        .publisher
        .fetch_publisher(&PublisherId::from("p1"))
        .await
        .expect("fetch");

    store.update_dialogs(DialogState::open_create_dialog).await;
    let created = store.confirm_create_dialog().await.expect("create");

    assert_eq!(created.id, ScenarioId::from("s3"));
    let dialogs = store.dialogs().await;
    assert!(!dialogs.any_open());
    assert!(!dialogs.is_loading());
    assert_eq!(store.publisher.state().await.scenarios_count(), 1);

    let requests = backend.requests().await;
    let create = requests
        .iter()
        .find(|r| r.path == "/publisher/p1/scenario")
        .expect("create request");
    assert_eq!(create.body, json!({ "name": "Untitled scenario" }));
}

#[tokio::test]
async fn failed_dialog_action_keeps_the_dialog_open() {
    let backend = spawn_backend().await;
    backend
        .reply("GET", "publisher/p1", publisher_json("p1", &["s1"]))
        .await;
    backend
        .reply("GET", "scenario/s1", scenario_json("s1", "Baseline"))
        .await;
    let store = backend.store();
    store
        .publisher
        .fetch_publisher(&PublisherId::from("p1"))
        .await
        .expect("fetch");
    let target = store.publisher.state().await.scenarios()[0].clone();

    store.update_dialogs(|d| d.open_copy_dialog(&target)).await;
    store.confirm_copy_dialog().await.expect_err("copy endpoint missing");

    let dialogs = store.dialogs().await;
    assert!(dialogs.is_copy_dialog_open());
    assert!(!dialogs.is_loading());
    assert_eq!(dialogs.new_name(), "Copy of Baseline");
}

#[tokio::test]
async fn confirm_delete_dialog_without_target_errors() {
    let backend = spawn_backend().await;
    let store = backend.store();

    let err = store.confirm_delete_dialog().await.expect_err("no target");
    assert!(matches!(err, ClientError::NoScenarioSelected));
}

#[tokio::test]
async fn confirm_rename_and_delete_dialogs() {
    let backend = spawn_backend().await;
    backend
        .reply("GET", "publisher/p1", publisher_json("p1", &["s1"]))
        .await;
    backend
        .reply("GET", "scenario/s1", scenario_json("s1", "Baseline"))
        .await;
    backend.echo("POST", "scenario/s1").await;
    backend.reply("DELETE", "scenario/s1", json!(null)).await;
    let store = backend.store();
    store
        .publisher
        .fetch_publisher(&PublisherId::from("p1"))
        .await
        .expect("fetch");
    let target = store.publisher.state().await.scenarios()[0].clone();

    store
        .update_dialogs(|d| {
            d.open_rename_dialog(&target);
            d.set_new_name("Renamed");
        })
        .await;
    let renamed = store.confirm_rename_dialog().await.expect("rename");
    assert_eq!(renamed.name(), "Renamed");

    store.update_dialogs(|d| d.open_delete_dialog(&renamed)).await;
    let deleted = store.confirm_delete_dialog().await.expect("delete");
    assert_eq!(deleted, ScenarioId::from("s1"));
    assert_eq!(store.publisher.state().await.scenarios_count(), 0);
}

#[tokio::test]
async fn leaving_a_publisher_resets_related_state() {
    let backend = spawn_backend().await;
    backend.reply("GET", "publisher/p1", publisher_json("p1", &[])).await;
    backend
        .reply("GET", "scenario/s1", scenario_json("s1", "Baseline"))
        .await;
    let store = backend.store();
    let id = PublisherId::from("p1");
    store.publisher.fetch_publisher(&id).await.expect("fetch");
    store
        .scenario
        .fetch_scenario(&ScenarioId::from("s1"))
        .await
        .expect("scenario");
    store.update_dialogs(DialogState::open_create_dialog).await;

    store.leave_publisher().await;

    assert_eq!(store.publisher.publisher_id().await, None);
    assert!(store.scenario.state().await.selected_scenario().is_none());
    assert!(!store.dialogs().await.any_open());

    store.publisher.fetch_publisher(&id).await.expect("fetch again");
    assert_eq!(backend.hits("GET", "publisher/p1").await, 2);
}
