use serde_json::json;

use super::*;
use crate::test_support::{scenario_json, spawn_backend};

fn hydrated(id: &str) -> Scenario {
    serde_json::from_value(scenario_json(id, "Baseline")).expect("scenario")
}

#[test]
fn selecting_a_scenario_computes_the_summary_digest() {
    let mut state = ScenarioState::default();
    state.set_selected_scenario(hydrated("s1"));
    assert_eq!(state.digest(), "38.5,1");

    state.clear_selected_scenario();
    assert_eq!(state.digest(), "");
    assert!(state.selected_scenario().is_none());
}

#[test]
fn subscription_edits_ignore_duplicates() {
    let mut state = ScenarioState::default();
    state.add_subr(Issnl::from("0000-0001"));
    assert!(state.selected_scenario().is_none());

    state.set_selected_scenario(hydrated("s1"));
    state.add_subr(Issnl::from("0000-0001"));
    state.add_subr(Issnl::from("0000-0001"));
    assert_eq!(state.selected_scenario().map(|s| s.subrs.len()), Some(2));

    state.remove_subr(&Issnl::from("0140-6736"));
    assert_eq!(
        state.selected_scenario().map(|s| s.subrs.clone()),
        Some(vec![Issnl::from("0000-0001")])
    );

    state.set_subrs(Vec::new());
    assert_eq!(state.selected_scenario().map(|s| s.subrs.len()), Some(0));
}

#[test]
fn table_columns_toggle() {
    let mut state = ScenarioState::default();
    assert_eq!(state.table_cols_to_show().len(), DEFAULT_TABLE_COLUMNS.len());

    state.toggle_table_col("usage");
    assert!(!state.table_cols_to_show().iter().any(|c| c == "usage"));
    state.toggle_table_col("usage");
    assert_eq!(state.table_cols_to_show().last().map(String::as_str), Some("usage"));

    state.show_table_col("cpu");
    state.show_table_col("cpu");
    assert_eq!(state.table_cols_to_show().iter().filter(|c| *c == "cpu").count(), 1);
    state.hide_table_col("cpu");
    assert!(!state.table_cols_to_show().iter().any(|c| c == "cpu"));
}

#[test]
fn zoom_opens_and_closes() {
    let mut state = ScenarioState::default();
    state.set_zoom_issnl(Issnl::from("0140-6736"));
    assert!(state.zoom_open());
    assert_eq!(state.zoom_issnl(), Some(&Issnl::from("0140-6736")));
    state.close_zoom();
    assert!(!state.zoom_open());
    assert_eq!(state.zoom_issnl(), None);
}

#[test]
fn staging_a_config_copies_metadata_and_current_value() {
    let mut state = ScenarioState::default();
    state.show_edit_config("cost_bigdeal");
    assert!(state.config_to_edit().is_none());
    assert!(!state.is_edit_config_shown());

    state.set_selected_scenario(hydrated("s1"));
    state.show_edit_config("cost_bigdeal");
    let edit = state.config_to_edit().expect("staged");
    assert_eq!(edit.value, json!(2100000));
    assert_eq!(edit.info.map(|i| i.display), Some("Big Deal cost"));
    assert!(state.is_edit_config_shown());

    state.set_edit_config_value(json!(1900000));
    assert_eq!(state.config_to_edit().map(|e| e.value.clone()), Some(json!(1900000)));
    // The scenario itself is untouched until saved.
    assert_eq!(state.config("cost_bigdeal"), Some(&json!(2100000)));

    state.clear_edit_config();
    assert!(state.config_to_edit().is_none());
    assert!(!state.is_edit_config_shown());
}

#[tokio::test]
async fn fetch_scenario_selects_it() {
    let backend = spawn_backend().await;
    backend.reply("GET", "scenario/s1", scenario_json("s1", "Baseline")).await;
    let store = backend.store();

    store
        .scenario
        .fetch_scenario(&ScenarioId::from("s1"))
        .await
        .expect("fetch");

    let state = store.scenario.state().await;
    assert_eq!(state.selected_scenario().map(|s| s.name()), Some("Baseline"));
    assert_eq!(state.digest(), "38.5,1");
}

#[tokio::test]
async fn set_config_waits_for_the_server_before_changing_state() {
    let backend = spawn_backend().await;
    backend.reply("GET", "scenario/s1", scenario_json("s1", "Baseline")).await;
    let mut authoritative = scenario_json("s1", "Baseline");
    authoritative["configs"]["cost_bigdeal"] = json!(2000000);
    authoritative["summary"]["cost_percent"] = json!(41.2);
    backend.reply("POST", "scenario/s1", authoritative).await;
    let (arrived, release) = backend.gate("POST", "scenario/s1").await;

    let store = backend.store();
    store
        .scenario
        .fetch_scenario(&ScenarioId::from("s1"))
        .await
        .expect("fetch");

    let task = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.scenario.set_config("cost_bigdeal", json!(1)).await })
    };

    let sent = arrived.await.expect("save request arrived");
    assert_eq!(sent["configs"]["cost_bigdeal"], json!(1));
    let pending = store.scenario.state().await;
    assert_eq!(pending.config("cost_bigdeal"), Some(&json!(2100000)));
    assert_eq!(pending.digest(), "38.5,1");

    release.send(()).expect("release");
    let saved = task.await.expect("join").expect("set config");
    assert_eq!(saved.configs.get("cost_bigdeal"), Some(&json!(2000000)));

    let state = store.scenario.state().await;
    assert_eq!(state.config("cost_bigdeal"), Some(&json!(2000000)));
    assert_eq!(state.digest(), "41.2,1");
    assert_eq!(state.configs_digest(), "2000000,true");
}

#[tokio::test]
async fn rejected_config_save_leaves_state_alone() {
    let backend = spawn_backend().await;
    backend.reply("GET", "scenario/s1", scenario_json("s1", "Baseline")).await;
    backend
        .reply_status("POST", "scenario/s1", 400, json!({ "msg": "bad value" }))
        .await;
    let store = backend.store();
    store
        .scenario
        .fetch_scenario(&ScenarioId::from("s1"))
        .await
        .expect("fetch");

    let err = store
        .scenario
        .set_config("cost_bigdeal", json!(-5))
        .await
        .expect_err("rejected");
    assert_eq!(err.status(), Some(reqwest::StatusCode::BAD_REQUEST));
    assert_eq!(
        store.scenario.state().await.config("cost_bigdeal"),
        Some(&json!(2100000))
    );
}

#[tokio::test]
async fn save_config_to_edit_posts_the_staged_value() {
    let backend = spawn_backend().await;
    backend.reply("GET", "scenario/s1", scenario_json("s1", "Baseline")).await;
    backend.echo("POST", "scenario/s1").await;
    let store = backend.store();

    assert!(store
        .scenario
        .save_config_to_edit()
        .await
        .expect("nothing staged")
        .is_none());

    store
        .scenario
        .fetch_scenario(&ScenarioId::from("s1"))
        .await
        .expect("fetch");
    store
        .scenario
        .update(|s| {
            s.show_edit_config("include_bronze");
            s.set_edit_config_value(json!(false));
        })
        .await;

    let saved = store
        .scenario
        .save_config_to_edit()
        .await
        .expect("save")
        .expect("staged");
    assert_eq!(saved.configs.get("include_bronze"), Some(&json!(false)));
    assert_eq!(
        store.scenario.state().await.config("include_bronze"),
        Some(&json!(false))
    );
    assert_eq!(backend.hits("POST", "scenario/s1").await, 1);
}

#[tokio::test]
async fn subscription_edits_are_applied_then_pushed() {
    let backend = spawn_backend().await;
    backend.reply("GET", "scenario/s1", scenario_json("s1", "Baseline")).await;
    backend
        .reply("POST", "scenario/subscriptions/s1", json!({ "ok": true }))
        .await;
    let store = backend.store();

    let err = store
        .scenario
        .add_subr(Issnl::from("0000-0001"))
        .await
        .expect_err("no scenario");
    assert!(matches!(err, ClientError::NoScenarioSelected));

    store
        .scenario
        .fetch_scenario(&ScenarioId::from("s1"))
        .await
        .expect("fetch");
    store
        .scenario
        .add_subr(Issnl::from("0000-0001"))
        .await
        .expect("add");
    store
        .scenario
        .remove_subr(&Issnl::from("0140-6736"))
        .await
        .expect("remove");

    let requests = backend.requests().await;
    let pushes: Vec<_> = requests
        .iter()
        .filter(|r| r.path == "/scenario/subscriptions/s1")
        .collect();
    assert_eq!(pushes.len(), 2);
    assert_eq!(pushes[0].body["subrs"], json!(["0140-6736", "0000-0001"]));
    assert_eq!(pushes[1].body["subrs"], json!(["0000-0001"]));
}

#[tokio::test]
async fn failed_subscription_push_keeps_the_optimistic_edit() {
    let backend = spawn_backend().await;
    backend.reply("GET", "scenario/s1", scenario_json("s1", "Baseline")).await;
    let store = backend.store();
    store
        .scenario
        .fetch_scenario(&ScenarioId::from("s1"))
        .await
        .expect("fetch");

    store
        .scenario
        .add_subr(Issnl::from("0000-0001"))
        .await
        .expect_err("endpoint missing");

    let state = store.scenario.state().await;
    assert_eq!(state.selected_scenario().map(|s| s.subrs.len()), Some(2));
}

#[tokio::test]
async fn subscription_push_accepts_an_empty_response() {
    let backend = spawn_backend().await;
    backend.reply("GET", "scenario/s1", scenario_json("s1", "Baseline")).await;
    backend.reply_empty("POST", "scenario/subscriptions/s1").await;
    let store = backend.store();
    store
        .scenario
        .fetch_scenario(&ScenarioId::from("s1"))
        .await
        .expect("fetch");

    store
        .scenario
        .add_subr(Issnl::from("0000-0001"))
        .await
        .expect("empty body is a success");
    assert_eq!(backend.hits("POST", "scenario/subscriptions/s1").await, 1);
}
