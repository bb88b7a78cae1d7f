use std::{future::Future, sync::Arc};

use tokio::sync::{broadcast, Mutex};
use tracing::info;
use unsub_shared::{
    domain::{PublisherId, ScenarioId},
    protocol::Scenario,
};

pub mod api;
pub mod catalog;
pub mod config;
pub mod dialogs;
pub mod error;
pub mod normalize;
pub mod publisher;
pub mod scenario;
pub mod token;
pub mod user;

pub use api::ApiClient;
pub use config::{load_settings, ClientSettings};
pub use dialogs::DialogState;
pub use error::{ClientError, Result};
pub use publisher::{PublisherState, PublisherStore};
pub use scenario::{ScenarioState, ScenarioStore};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use user::{UserState, UserStore};

/// Published after every state commit so views know to re-read.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    PublisherLoading(bool),
    PublisherUpdated(PublisherId),
    PublisherCleared,
    ApcUpdated(PublisherId),
    DataFileUpdated(String),
    ScenarioUpdated(ScenarioId),
    ScenarioRemoved(ScenarioId),
    ScenarioSelected(ScenarioId),
    UserUpdated,
    LoggedOut,
    DialogsChanged,
    Error(String),
}

/// Root store wiring the publisher, scenario, user and dialog slices to one
/// backend client and one event channel.
pub struct AppStore {
    api: Arc<ApiClient>,
    pub publisher: PublisherStore,
    pub scenario: ScenarioStore,
    pub user: UserStore,
    dialogs: Mutex<DialogState>,
    events: broadcast::Sender<StoreEvent>,
}

impl AppStore {
    pub fn new(api: ApiClient) -> Arc<Self> {
        let api = Arc::new(api);
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            publisher: PublisherStore::new(Arc::clone(&api), events.clone()),
            scenario: ScenarioStore::new(Arc::clone(&api), events.clone()),
            user: UserStore::new(Arc::clone(&api), events.clone()),
            dialogs: Mutex::new(DialogState::default()),
            api,
            events,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Arc<Self>> {
        let tokens: Arc<dyn TokenStore> = match &settings.token_path {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        let api = ApiClient::new(&settings.api_base_url, tokens)?;
        Ok(Self::new(api))
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn dialogs(&self) -> DialogState {
        self.dialogs.lock().await.clone()
    }

    /// Runs a dialog mutation, e.g. `|d| d.open_create_dialog()`.
    pub async fn update_dialogs<R>(&self, mutate: impl FnOnce(&mut DialogState) -> R) -> R {
        let out = mutate(&mut *self.dialogs.lock().await);
        let _ = self.events.send(StoreEvent::DialogsChanged);
        out
    }

    /// Clears everything tied to the selected publisher.
    pub async fn leave_publisher(&self) {
        self.publisher.clear_publisher().await;
        self.scenario
            .update(|s| {
                s.clear_edit_config();
                s.close_zoom();
                s.clear_selected_scenario();
            })
            .await;
        self.update_dialogs(DialogState::close_all).await;
    }

    pub async fn confirm_create_dialog(&self) -> Result<Scenario> {
        self.run_dialog(|_, name| async move { self.publisher.create_scenario(&name).await })
            .await
    }

    pub async fn confirm_copy_dialog(&self) -> Result<Scenario> {
        self.run_dialog(|target, name| async move {
            let target = target.ok_or(ClientError::NoScenarioSelected)?;
            self.publisher.copy_scenario(&target.id, &name).await
        })
        .await
    }

    pub async fn confirm_rename_dialog(&self) -> Result<Scenario> {
        self.run_dialog(|target, name| async move {
            let target = target.ok_or(ClientError::NoScenarioSelected)?;
            self.publisher.rename_scenario(&target.id, &name).await
        })
        .await
    }

    pub async fn confirm_delete_dialog(&self) -> Result<ScenarioId> {
        self.run_dialog(|target, _| async move {
            let target = target.ok_or(ClientError::NoScenarioSelected)?;
            self.publisher.delete_scenario(&target.id).await?;
            Ok(target.id)
        })
        .await
    }

    /// Runs `action` with the dialog's target and name under the dialog
    /// loading flag; dialogs close only when it succeeds.
    async fn run_dialog<T, F, Fut>(&self, action: F) -> Result<T>
    where
        F: FnOnce(Option<Scenario>, String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let (target, name) = self
            .update_dialogs(|d| {
                d.loading_start();
                (d.scenario_to_edit().cloned(), d.new_name().to_string())
            })
            .await;

        let result = action(target, name).await;

        self.update_dialogs(|d| {
            d.loading_finish();
            if result.is_ok() {
                d.close_all();
            }
        })
        .await;
        if result.is_ok() {
            info!("scenario dialog confirmed");
        }
        result
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
