use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};
use unsub_shared::{
    domain::{Issnl, PublisherId, ScenarioId},
    protocol::{CreateScenarioRequest, JsonMap, Scenario},
};

use crate::{
    api::ApiClient,
    catalog::{scenario_config_info, ScenarioConfigInfo},
    error::{ClientError, Result},
    normalize::values_digest,
    StoreEvent,
};

pub const DEFAULT_TABLE_COLUMNS: &[&str] = &[
    "usage",
    "free_instant_usage_percent",
    "subscription_cost",
    "ncppu",
    "ncppu_rank",
];

pub(crate) async fn fetch_scenario(api: &ApiClient, id: &ScenarioId) -> Result<Scenario> {
    api.get(&format!("scenario/{id}")).await
}

pub(crate) async fn create_scenario(
    api: &ApiClient,
    publisher_id: &PublisherId,
    name: &str,
) -> Result<Scenario> {
    api.post(
        &format!("publisher/{publisher_id}/scenario"),
        &CreateScenarioRequest {
            name: name.to_string(),
        },
    )
    .await
}

pub(crate) async fn copy_scenario(
    api: &ApiClient,
    publisher_id: &PublisherId,
    source_id: &ScenarioId,
    name: &str,
) -> Result<Scenario> {
    api.post(
        &format!("publisher/{publisher_id}/scenario?copy={source_id}"),
        &CreateScenarioRequest {
            name: name.to_string(),
        },
    )
    .await
}

pub(crate) async fn save_scenario(api: &ApiClient, scenario: &Scenario) -> Result<Scenario> {
    api.post(&format!("scenario/{}", scenario.id), scenario).await
}

pub(crate) async fn delete_scenario(api: &ApiClient, id: &ScenarioId) -> Result<()> {
    api.delete(&format!("scenario/{id}")).await
}

/// A scenario setting staged in the edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEdit {
    pub name: String,
    pub info: Option<ScenarioConfigInfo>,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct ScenarioState {
    selected: Option<Scenario>,
    digest: String,
    configs_digest: String,
    zoom_issnl: Option<Issnl>,
    zoom_open: bool,
    table_cols_to_show: Vec<String>,
    show_edit_config: bool,
    config_to_edit: Option<ConfigEdit>,
}

impl Default for ScenarioState {
    fn default() -> Self {
        Self {
            selected: None,
            digest: String::new(),
            configs_digest: String::new(),
            zoom_issnl: None,
            zoom_open: false,
            table_cols_to_show: DEFAULT_TABLE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            show_edit_config: false,
            config_to_edit: None,
        }
    }
}

impl ScenarioState {
    pub fn set_selected_scenario(&mut self, scenario: Scenario) {
        self.digest = values_digest(&scenario.summary);
        self.selected = Some(scenario);
    }

    pub fn clear_selected_scenario(&mut self) {
        self.selected = None;
        self.digest.clear();
    }

    pub fn set_zoom_issnl(&mut self, issnl: Issnl) {
        self.zoom_issnl = Some(issnl);
        self.zoom_open = true;
    }

    pub fn close_zoom(&mut self) {
        self.zoom_issnl = None;
        self.zoom_open = false;
    }

    pub fn add_subr(&mut self, issnl: Issnl) {
        if let Some(selected) = self.selected.as_mut() {
            if !selected.subrs.contains(&issnl) {
                selected.subrs.push(issnl);
            }
        }
    }

    pub fn set_subrs(&mut self, issnls: Vec<Issnl>) {
        if let Some(selected) = self.selected.as_mut() {
            selected.subrs = issnls;
        }
    }

    pub fn remove_subr(&mut self, issnl: &Issnl) {
        if let Some(selected) = self.selected.as_mut() {
            selected.subrs.retain(|j| j != issnl);
        }
    }

    pub fn show_table_col(&mut self, column: &str) {
        if !self.table_cols_to_show.iter().any(|c| c == column) {
            self.table_cols_to_show.push(column.to_string());
        }
    }

    pub fn hide_table_col(&mut self, column: &str) {
        self.table_cols_to_show.retain(|c| c != column);
    }

    pub fn toggle_table_col(&mut self, column: &str) {
        if self.table_cols_to_show.iter().any(|c| c == column) {
            self.hide_table_col(column);
        } else {
            self.table_cols_to_show.push(column.to_string());
        }
    }

    /// Stages `key` for editing with its current value. Without a selected
    /// scenario nothing happens.
    pub fn show_edit_config(&mut self, key: &str) {
        let Some(selected) = self.selected.as_ref() else {
            return;
        };
        self.config_to_edit = Some(ConfigEdit {
            name: key.to_string(),
            info: scenario_config_info(key).copied(),
            value: selected.configs.get(key).cloned().unwrap_or(Value::Null),
        });
        self.show_edit_config = true;
    }

    pub fn clear_edit_config(&mut self) {
        self.show_edit_config = false;
        self.config_to_edit = None;
    }

    pub fn set_edit_config_value(&mut self, value: Value) {
        if let Some(edit) = self.config_to_edit.as_mut() {
            edit.value = value;
        }
    }

    pub fn selected_scenario(&self) -> Option<&Scenario> {
        self.selected.as_ref()
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn summary(&self) -> Option<&JsonMap> {
        self.selected.as_ref().map(|s| &s.summary)
    }

    pub fn configs_digest(&self) -> &str {
        &self.configs_digest
    }

    pub fn zoom_issnl(&self) -> Option<&Issnl> {
        self.zoom_issnl.as_ref()
    }

    pub fn zoom_open(&self) -> bool {
        self.zoom_open
    }

    pub fn configs(&self) -> Option<&JsonMap> {
        self.selected.as_ref().map(|s| &s.configs)
    }

    pub fn config(&self, key: &str) -> Option<&Value> {
        self.configs().and_then(|c| c.get(key))
    }

    pub fn is_edit_config_shown(&self) -> bool {
        self.show_edit_config
    }

    pub fn config_to_edit(&self) -> Option<&ConfigEdit> {
        self.config_to_edit.as_ref()
    }

    pub fn table_cols_to_show(&self) -> &[String] {
        &self.table_cols_to_show
    }
}

pub struct ScenarioStore {
    api: Arc<ApiClient>,
    inner: Mutex<ScenarioState>,
    events: broadcast::Sender<StoreEvent>,
}

impl ScenarioStore {
    pub(crate) fn new(api: Arc<ApiClient>, events: broadcast::Sender<StoreEvent>) -> Self {
        Self {
            api,
            inner: Mutex::new(ScenarioState::default()),
            events,
        }
    }

    pub async fn state(&self) -> ScenarioState {
        self.inner.lock().await.clone()
    }

    /// Runs a synchronous mutation against the state.
    pub async fn update<R>(&self, mutate: impl FnOnce(&mut ScenarioState) -> R) -> R {
        mutate(&mut *self.inner.lock().await)
    }

    pub async fn fetch_scenario(&self, id: &ScenarioId) -> Result<Scenario> {
        let scenario = fetch_scenario(&self.api, id).await?;
        self.inner
            .lock()
            .await
            .set_selected_scenario(scenario.clone());
        debug!(scenario_id = %id, "scenario selected");
        let _ = self.events.send(StoreEvent::ScenarioSelected(id.clone()));
        Ok(scenario)
    }

    /// Pushes the selected scenario's subscription list to the server.
    pub async fn update_subrs(&self) -> Result<()> {
        let scenario = self.selected().await?;
        self.api
            .post_ack(&format!("scenario/subscriptions/{}", scenario.id), &scenario)
            .await?;
        info!(scenario_id = %scenario.id, subrs = scenario.subrs.len(), "subscriptions saved");
        Ok(())
    }

    /// Subscribes locally right away, then saves.
    pub async fn add_subr(&self, issnl: Issnl) -> Result<()> {
        self.selected().await?;
        self.inner.lock().await.add_subr(issnl);
        self.update_subrs().await
    }

    pub async fn remove_subr(&self, issnl: &Issnl) -> Result<()> {
        self.selected().await?;
        self.inner.lock().await.remove_subr(issnl);
        self.update_subrs().await
    }

    /// Saves one setting on a copy of the selected scenario. Local state
    /// only changes to whatever the server answers with.
    pub async fn set_config(&self, key: &str, value: Value) -> Result<Scenario> {
        let mut scenario = self.selected().await?;
        scenario.configs.insert(key.to_string(), value);
        info!(scenario_id = %scenario.id, config = key, "saving scenario config");
        self.save_and_commit(scenario).await
    }

    /// Saves the staged config edit; `None` when nothing is staged.
    pub async fn save_config_to_edit(&self) -> Result<Option<Scenario>> {
        let (mut scenario, edit) = {
            let state = self.inner.lock().await;
            let Some(edit) = state.config_to_edit.clone() else {
                return Ok(None);
            };
            let scenario = state
                .selected
                .clone()
                .ok_or(ClientError::NoScenarioSelected)?;
            (scenario, edit)
        };
        scenario.configs.insert(edit.name.clone(), edit.value);
        info!(scenario_id = %scenario.id, config = %edit.name, "saving staged scenario config");
        self.save_and_commit(scenario).await.map(Some)
    }

    async fn save_and_commit(&self, scenario: Scenario) -> Result<Scenario> {
        let saved = save_scenario(&self.api, &scenario).await?;
        {
            let mut state = self.inner.lock().await;
            state.set_selected_scenario(saved.clone());
            state.configs_digest = values_digest(&saved.configs);
        }
        let _ = self
            .events
            .send(StoreEvent::ScenarioSelected(saved.id.clone()));
        Ok(saved)
    }

    async fn selected(&self) -> Result<Scenario> {
        self.inner
            .lock()
            .await
            .selected
            .clone()
            .ok_or(ClientError::NoScenarioSelected)
    }
}

#[cfg(test)]
#[path = "tests/scenario_tests.rs"]
mod tests;
