use std::{collections::BTreeMap, sync::Arc};

use futures::future::try_join_all;
use serde_json::Value;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use unsub_shared::{
    domain::{CounterVersion, PublisherId, ScenarioId},
    protocol::{ApcHeader, ApcPayload, DataFilePayload, JsonMap, PublisherPayload, Scenario},
};

use crate::{
    api::ApiClient,
    catalog::{currency_symbol, publisher_logo},
    error::{ClientError, Result},
    normalize::{
        make_data_file, make_publisher_journal, make_warning, DataFile, PublisherJournal, Warning,
    },
    scenario::{copy_scenario, create_scenario, delete_scenario, fetch_scenario, save_scenario},
    StoreEvent,
};

const DEFAULT_CURRENCY: &str = "USD";
const APC_PAPERS_HEADER: &str = "num_apc_papers";
const APC_FRACTIONAL_AUTHORS_HEADER: &str = "fractional_authorship";
const APC_COST_HEADER: &str = "cost_apc";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApcState {
    pub headers: Vec<ApcHeader>,
    pub journals: Vec<JsonMap>,
    pub papers_count: Option<f64>,
    pub authors_fractional_count: Option<f64>,
    pub cost: Option<f64>,
}

/// The selected publisher, normalized for display.
#[derive(Debug, Clone)]
pub struct PublisherState {
    selected: Option<PublisherPayload>,
    is_loading: bool,
    apc_is_loading: bool,
    tab_showing: usize,
    id: Option<PublisherId>,
    publisher: String,
    name: String,
    is_demo: bool,
    scenarios: Vec<Scenario>,
    journal_detail: Value,
    journals: Vec<PublisherJournal>,
    data_files: Vec<DataFile>,
    warnings: Vec<Warning>,
    counter_file_uploaded: bool,
    big_deal_cost: f64,
    is_owned_by_consortium: bool,
    currency: String,
    apc: ApcState,
}

impl Default for PublisherState {
    fn default() -> Self {
        Self {
            selected: None,
            is_loading: false,
            apc_is_loading: false,
            tab_showing: 0,
            id: None,
            publisher: String::new(),
            name: String::new(),
            is_demo: false,
            scenarios: Vec::new(),
            journal_detail: Value::Null,
            journals: Vec::new(),
            data_files: Vec::new(),
            warnings: Vec::new(),
            counter_file_uploaded: false,
            big_deal_cost: 0.0,
            is_owned_by_consortium: false,
            currency: DEFAULT_CURRENCY.to_string(),
            apc: ApcState::default(),
        }
    }
}

impl PublisherState {
    pub fn clear_publisher(&mut self) {
        let apc_is_loading = self.apc_is_loading;
        *self = Self::default();
        self.apc_is_loading = apc_is_loading;
    }

    pub fn clear_apc_data(&mut self) {
        self.apc = ApcState::default();
    }

    /// Replaces every normalized collection from one backend payload.
    pub fn set_selected_publisher(&mut self, payload: PublisherPayload) {
        self.id = Some(payload.id.clone());
        self.publisher = payload.publisher.clone();
        self.name = payload.name.clone();
        self.is_demo = payload.is_demo;
        self.scenarios = payload.scenarios.clone();
        self.journal_detail = payload.journal_detail.clone();
        self.journals = payload
            .journals
            .iter()
            .cloned()
            .map(make_publisher_journal)
            .collect();
        self.data_files = payload
            .data_files
            .iter()
            .cloned()
            .map(make_data_file)
            .collect();
        self.warnings = payload.warnings.iter().cloned().map(make_warning).collect();
        self.refresh_counter_flag();
        self.big_deal_cost = payload.cost_bigdeal.unwrap_or_default();
        self.is_owned_by_consortium = payload.is_owned_by_consortium;
        self.currency = payload
            .currency
            .clone()
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        self.selected = Some(payload);
    }

    pub fn start_loading(&mut self) {
        self.is_loading = true;
    }

    pub fn finish_loading(&mut self) {
        self.is_loading = false;
    }

    /// Swaps in a scenario with the same id, appending it when unknown.
    pub fn replace_scenario(&mut self, scenario: Scenario) {
        match self.scenarios.iter_mut().find(|s| s.id == scenario.id) {
            Some(slot) => *slot = scenario,
            None => self.scenarios.push(scenario),
        }
    }

    pub fn push_scenario(&mut self, scenario: Scenario) {
        self.scenarios.push(scenario);
    }

    pub fn remove_scenario(&mut self, id: &ScenarioId) -> Option<Scenario> {
        let index = self.scenarios.iter().position(|s| &s.id == id)?;
        Some(self.scenarios.remove(index))
    }

    pub fn set_publisher_id(&mut self, id: PublisherId) {
        self.id = Some(id);
    }

    pub fn set_tab_showing(&mut self, index: usize) {
        self.tab_showing = index;
    }

    pub fn set_apc_data(&mut self, payload: ApcPayload) {
        let header_raw = |value: &str| {
            payload
                .headers
                .iter()
                .find(|h| h.value == value)
                .and_then(|h| h.raw.as_f64())
        };
        self.apc = ApcState {
            papers_count: header_raw(APC_PAPERS_HEADER),
            authors_fractional_count: header_raw(APC_FRACTIONAL_AUTHORS_HEADER),
            cost: header_raw(APC_COST_HEADER),
            headers: payload.headers.clone(),
            journals: payload.journals,
        };
    }

    pub fn replace_data_file(&mut self, id: &str, file: DataFile) {
        match self.data_files.iter_mut().find(|f| f.id == id) {
            Some(slot) => *slot = file,
            None => self.data_files.push(file),
        }
        self.refresh_counter_flag();
    }

    fn refresh_counter_flag(&mut self) {
        self.counter_file_uploaded = self
            .data_files
            .iter()
            .any(|f| f.name == "counter" && f.uploaded);
    }

    pub fn selected_publisher(&self) -> Option<&PublisherPayload> {
        self.selected.as_ref()
    }

    pub fn id(&self) -> Option<&PublisherId> {
        self.id.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    pub fn logo(&self) -> Option<&'static str> {
        publisher_logo(&self.publisher)
    }

    pub fn tab_showing(&self) -> usize {
        self.tab_showing
    }

    pub fn journal_detail(&self) -> &Value {
        &self.journal_detail
    }

    pub fn journals(&self) -> &[PublisherJournal] {
        &self.journals
    }

    pub fn valid_journals(&self) -> impl Iterator<Item = &PublisherJournal> {
        self.journals.iter().filter(|j| j.is_valid)
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn scenarios_count(&self) -> usize {
        self.scenarios.len()
    }

    pub fn scenario(&self, id: &ScenarioId) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| &s.id == id)
    }

    /// True once no scenario is still a shallow reference.
    pub fn scenarios_are_all_loaded(&self) -> bool {
        self.scenarios.iter().all(Scenario::is_hydrated)
    }

    pub fn data_files(&self) -> &[DataFile] {
        &self.data_files
    }

    pub fn data_file(&self, id: &str) -> Option<&DataFile> {
        self.data_files.iter().find(|f| f.id == id)
    }

    pub fn files_dict(&self) -> BTreeMap<String, DataFile> {
        self.data_files
            .iter()
            .map(|f| (f.id.clone(), f.clone()))
            .collect()
    }

    pub fn counter_file_uploaded(&self) -> bool {
        self.counter_file_uploaded
    }

    fn files_with_version(&self, version: CounterVersion) -> impl Iterator<Item = &DataFile> {
        self.data_files
            .iter()
            .filter(move |f| f.counter_version == Some(version))
    }

    fn version_complete(&self, version: CounterVersion, done: impl Fn(&DataFile) -> bool) -> bool {
        let mut files = self.files_with_version(version).peekable();
        files.peek().is_some() && files.all(|f| done(f))
    }

    /// Newest COUNTER release with at least one uploaded report.
    pub fn counter_version(&self) -> Option<CounterVersion> {
        [CounterVersion::V5, CounterVersion::V4]
            .into_iter()
            .find(|v| self.files_with_version(*v).any(|f| f.uploaded))
    }

    /// Every report of some COUNTER release has been uploaded.
    pub fn counter_is_uploaded(&self) -> bool {
        [CounterVersion::V4, CounterVersion::V5]
            .into_iter()
            .any(|v| self.version_complete(v, |f| f.uploaded))
    }

    pub fn counter_version_is_live(&self, version: CounterVersion) -> bool {
        self.version_complete(version, |f| f.is_live)
    }

    /// Newest COUNTER release whose reports are all live.
    pub fn active_counter_version(&self) -> Option<CounterVersion> {
        [CounterVersion::V5, CounterVersion::V4]
            .into_iter()
            .find(|v| self.counter_version_is_live(*v))
    }

    pub fn is_demo(&self) -> bool {
        self.is_demo
    }

    pub fn big_deal_cost(&self) -> f64 {
        self.big_deal_cost
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn warnings_dismissed(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(|w| w.is_dismissed)
    }

    pub fn warnings_active(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(|w| !w.is_dismissed)
    }

    pub fn is_owned_by_consortium(&self) -> bool {
        self.is_owned_by_consortium
    }

    /// Consortium-owned packages are called feeders in newer screens.
    pub fn is_feeder(&self) -> bool {
        self.is_owned_by_consortium
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn currency_symbol(&self) -> Option<&'static str> {
        currency_symbol(&self.currency)
    }

    pub fn apc_is_loading(&self) -> bool {
        self.apc_is_loading
    }

    pub fn apc(&self) -> &ApcState {
        &self.apc
    }
}

pub struct PublisherStore {
    api: Arc<ApiClient>,
    inner: Mutex<PublisherState>,
    events: broadcast::Sender<StoreEvent>,
}

impl PublisherStore {
    pub(crate) fn new(api: Arc<ApiClient>, events: broadcast::Sender<StoreEvent>) -> Self {
        Self {
            api,
            inner: Mutex::new(PublisherState::default()),
            events,
        }
    }

    /// Snapshot of the current state for reading getters.
    pub async fn state(&self) -> PublisherState {
        self.inner.lock().await.clone()
    }

    pub async fn publisher_id(&self) -> Option<PublisherId> {
        self.inner.lock().await.id.clone()
    }

    pub async fn clear_publisher(&self) {
        self.inner.lock().await.clear_publisher();
        let _ = self.events.send(StoreEvent::PublisherCleared);
    }

    pub async fn set_tab_showing(&self, index: usize) {
        self.inner.lock().await.set_tab_showing(index);
    }

    /// Selects and loads a publisher. Asking again for the publisher that is
    /// already selected does nothing.
    pub async fn fetch_publisher(&self, id: &PublisherId) -> Result<()> {
        {
            let mut state = self.inner.lock().await;
            if state.id.as_ref() == Some(id) {
                debug!(publisher_id = %id, "publisher already selected");
                return Ok(());
            }
            state.clear_publisher();
            state.start_loading();
            state.set_publisher_id(id.clone());
        }
        let _ = self.events.send(StoreEvent::PublisherLoading(true));

        let result = self.fetch_publisher_main_data(id).await;

        // A newer selection owns the loading flag.
        let still_selected = {
            let mut state = self.inner.lock().await;
            let still_selected = state.id.as_ref() == Some(id);
            if still_selected {
                state.finish_loading();
                if result.is_err() && state.selected.is_none() {
                    state.id = None;
                }
            }
            still_selected
        };
        if still_selected {
            let _ = self.events.send(StoreEvent::PublisherLoading(false));
        }
        result
    }

    /// Loads the publisher without hydrating its scenarios.
    pub async fn fetch_publisher_lazy(&self, id: &PublisherId) -> Result<()> {
        self.inner.lock().await.start_loading();
        let result = self.api.get::<PublisherPayload>(&format!("publisher/{id}")).await;
        {
            let mut state = self.inner.lock().await;
            state.finish_loading();
            if let Ok(payload) = &result {
                state.set_selected_publisher(payload.clone());
            }
        }
        let payload = result?;
        let _ = self.events.send(StoreEvent::PublisherUpdated(payload.id));
        Ok(())
    }

    /// Reloads the selected publisher, scenarios included.
    pub async fn refresh_publisher(&self) -> Result<()> {
        let id = {
            let mut state = self.inner.lock().await;
            let id = state.id.clone().ok_or(ClientError::NoPublisherSelected)?;
            state.start_loading();
            id
        };
        let result = self.fetch_publisher_main_data(&id).await;
        self.inner.lock().await.finish_loading();
        result
    }

    async fn fetch_publisher_main_data(&self, id: &PublisherId) -> Result<()> {
        let mut payload: PublisherPayload = self.api.get(&format!("publisher/{id}")).await?;

        // Shallow commit first so the name shows while scenarios load.
        if !self.commit_publisher(id, payload.clone()).await {
            return Ok(());
        }

        info!(
            publisher_id = %id,
            scenarios = payload.scenarios.len(),
            "publisher loaded, hydrating scenarios"
        );
        let ids: Vec<ScenarioId> = payload.scenarios.iter().map(|s| s.id.clone()).collect();
        let hydrated = try_join_all(ids.iter().map(|sid| fetch_scenario(&self.api, sid))).await?;
        payload.scenarios = hydrated;
        info!(publisher_id = %id, "scenarios hydrated");

        self.commit_publisher(id, payload).await;
        Ok(())
    }

    /// Returns false when another publisher was selected meanwhile.
    async fn commit_publisher(&self, id: &PublisherId, payload: PublisherPayload) -> bool {
        {
            let mut state = self.inner.lock().await;
            if state.id.as_ref() != Some(id) {
                debug!(publisher_id = %id, "dropping response for deselected publisher");
                return false;
            }
            state.set_selected_publisher(payload);
        }
        let _ = self.events.send(StoreEvent::PublisherUpdated(id.clone()));
        true
    }

    /// Loads the APC breakdown. Request failures are logged and leave the
    /// previous APC data in place.
    pub async fn fetch_publisher_apc_data(&self, id: &PublisherId) -> Option<ApcPayload> {
        self.inner.lock().await.apc_is_loading = true;

        let result = self
            .api
            .get::<ApcPayload>(&format!("publisher/{id}/apc"))
            .await;

        let mut state = self.inner.lock().await;
        state.apc_is_loading = false;
        match result {
            Ok(payload) => {
                state.set_apc_data(payload.clone());
                drop(state);
                let _ = self.events.send(StoreEvent::ApcUpdated(id.clone()));
                Some(payload)
            }
            Err(err) => {
                drop(state);
                warn!(publisher_id = %id, error = %err, "failed to load publisher APC data");
                let _ = self.events.send(StoreEvent::Error(format!(
                    "failed to load APC data for publisher {id}: {err}"
                )));
                None
            }
        }
    }

    pub async fn refresh_publisher_scenario(&self, scenario_id: &ScenarioId) -> Result<Scenario> {
        let scenario = fetch_scenario(&self.api, scenario_id).await?;
        self.inner.lock().await.replace_scenario(scenario.clone());
        let _ = self
            .events
            .send(StoreEvent::ScenarioUpdated(scenario_id.clone()));
        Ok(scenario)
    }

    pub async fn create_scenario(&self, name: &str) -> Result<Scenario> {
        let publisher_id = self.require_publisher_id().await?;
        let scenario = create_scenario(&self.api, &publisher_id, name).await?;
        info!(publisher_id = %publisher_id, scenario_id = %scenario.id, "scenario created");
        self.push_scenario(scenario.clone()).await;
        Ok(scenario)
    }

    pub async fn copy_scenario(&self, id: &ScenarioId, new_name: &str) -> Result<Scenario> {
        let publisher_id = self.require_publisher_id().await?;
        let scenario = copy_scenario(&self.api, &publisher_id, id, new_name).await?;
        info!(
            publisher_id = %publisher_id,
            source_id = %id,
            scenario_id = %scenario.id,
            "scenario copied"
        );
        self.push_scenario(scenario.clone()).await;
        Ok(scenario)
    }

    pub async fn rename_scenario(&self, id: &ScenarioId, new_name: &str) -> Result<Scenario> {
        let known = self
            .inner
            .lock()
            .await
            .scenario(id)
            .filter(|s| s.is_hydrated())
            .cloned();
        let mut scenario = match known {
            Some(scenario) => scenario,
            None => fetch_scenario(&self.api, id).await?,
        };
        let record = scenario
            .saved
            .as_mut()
            .ok_or_else(|| ClientError::ScenarioNotHydrated(id.clone()))?;
        record.name = new_name.to_string();

        let saved = save_scenario(&self.api, &scenario).await?;
        self.inner.lock().await.replace_scenario(saved.clone());
        let _ = self.events.send(StoreEvent::ScenarioUpdated(id.clone()));
        Ok(saved)
    }

    pub async fn delete_scenario(&self, id: &ScenarioId) -> Result<()> {
        delete_scenario(&self.api, id).await?;
        self.inner.lock().await.remove_scenario(id);
        info!(scenario_id = %id, "scenario deleted");
        let _ = self.events.send(StoreEvent::ScenarioRemoved(id.clone()));
        Ok(())
    }

    /// Re-reads one data file's processing status.
    pub async fn refresh_data_file(&self, file_id: &str) -> Result<DataFile> {
        let (publisher_id, server_key) = {
            let state = self.inner.lock().await;
            let publisher_id = state.id.clone().ok_or(ClientError::NoPublisherSelected)?;
            let file = state
                .data_file(file_id)
                .ok_or_else(|| ClientError::UnknownDataFile(file_id.to_string()))?;
            let server_key = file
                .server_key
                .ok_or_else(|| ClientError::NoDataFileStatus(file_id.to_string()))?;
            (publisher_id, server_key)
        };

        let raw: DataFilePayload = self
            .api
            .get(&format!("publisher/{publisher_id}/{server_key}/status"))
            .await?;
        let file = make_data_file(raw);
        self.inner
            .lock()
            .await
            .replace_data_file(file_id, file.clone());
        let _ = self
            .events
            .send(StoreEvent::DataFileUpdated(file_id.to_string()));
        Ok(file)
    }

    async fn require_publisher_id(&self) -> Result<PublisherId> {
        self.publisher_id()
            .await
            .ok_or(ClientError::NoPublisherSelected)
    }

    async fn push_scenario(&self, scenario: Scenario) {
        let id = scenario.id.clone();
        self.inner.lock().await.push_scenario(scenario);
        let _ = self.events.send(StoreEvent::ScenarioUpdated(id));
    }
}

#[cfg(test)]
#[path = "tests/publisher_tests.rs"]
mod tests;
