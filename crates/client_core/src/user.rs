use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};
use unsub_shared::{
    domain::UserId,
    protocol::{
        Credentials, DemoAccountRequest, InstitutionPermission, TokenResponse, UserPayload,
        UserUpdate,
    },
};

use crate::{api::ApiClient, error::Result, StoreEvent};

const GRAVATAR_PLACEHOLDER: &str = "placeholder@example.com";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
    id: Option<UserId>,
    name: String,
    username: String,
    email: String,
    is_password_set: bool,
    institutions: Vec<InstitutionPermission>,
}

impl UserState {
    pub fn set_from_api_resp(&mut self, payload: UserPayload) {
        self.id = Some(payload.id);
        self.name = payload.name.unwrap_or_default();
        self.email = payload.email.unwrap_or_default();
        self.username = payload.username.unwrap_or_default();
        self.is_password_set = payload.is_password_set;
        self.institutions = payload.user_permissions;
    }

    pub fn logout(&mut self) {
        *self = Self::default();
    }

    pub fn id(&self) -> Option<&UserId> {
        self.id.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Accounts created from an email address have no separate username.
    pub fn username(&self) -> Option<&str> {
        if self.username.contains('@') {
            return None;
        }
        Some(&self.username)
    }

    pub fn password_is_set(&self) -> bool {
        self.is_password_set
    }

    pub fn institutions(&self) -> &[InstitutionPermission] {
        &self.institutions
    }

    pub fn is_demo(&self) -> bool {
        match self.institutions.as_slice() {
            [only] => contains_word(&only.institution_name, "Demo"),
            _ => false,
        }
    }

    pub fn gravatar_str(&self) -> &str {
        if self.email.is_empty() {
            GRAVATAR_PLACEHOLDER
        } else {
            &self.email
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.id.is_some()
    }
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|w| w == word)
}

pub struct UserStore {
    api: Arc<ApiClient>,
    inner: Mutex<UserState>,
    events: broadcast::Sender<StoreEvent>,
}

impl UserStore {
    pub(crate) fn new(api: Arc<ApiClient>, events: broadcast::Sender<StoreEvent>) -> Self {
        Self {
            api,
            inner: Mutex::new(UserState::default()),
            events,
        }
    }

    pub async fn state(&self) -> UserState {
        self.inner.lock().await.clone()
    }

    pub fn token(&self) -> Result<Option<String>> {
        self.api.tokens().load()
    }

    pub async fn login(&self, creds: &Credentials) -> Result<()> {
        let resp: TokenResponse = self.api.post("user/login", creds).await?;
        info!(username = %creds.username, "logged in");
        self.start_session(&resp.access_token).await
    }

    pub async fn create_demo(&self, email: &str, password: &str, name: &str) -> Result<()> {
        let request = DemoAccountRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        let resp: TokenResponse = self.api.post("user/demo", &request).await?;
        info!("demo account created");
        self.start_session(&resp.access_token).await
    }

    /// Stores a fresh token and reloads the user it belongs to.
    async fn start_session(&self, token: &str) -> Result<()> {
        self.api.tokens().store(token)?;
        self.inner.lock().await.logout();
        self.fetch_user().await
    }

    /// Loads the signed-in user unless one is already loaded.
    pub async fn fetch_user(&self) -> Result<()> {
        if self.inner.lock().await.is_logged_in() {
            debug!("user already loaded");
            return Ok(());
        }
        let payload: UserPayload = self.api.get("user/me").await?;
        self.inner.lock().await.set_from_api_resp(payload);
        let _ = self.events.send(StoreEvent::UserUpdated);
        Ok(())
    }

    pub async fn change_name(&self, name: &str) -> Result<()> {
        self.post_profile(UserUpdate {
            name: Some(name.to_string()),
            ..UserUpdate::default()
        })
        .await?;
        self.inner.lock().await.name = name.to_string();
        let _ = self.events.send(StoreEvent::UserUpdated);
        Ok(())
    }

    pub async fn change_email(&self, email: &str) -> Result<()> {
        self.post_profile(UserUpdate {
            email: Some(email.to_string()),
            ..UserUpdate::default()
        })
        .await?;
        self.inner.lock().await.email = email.to_string();
        let _ = self.events.send(StoreEvent::UserUpdated);
        Ok(())
    }

    pub async fn change_password(&self, password: &str) -> Result<()> {
        self.post_profile(UserUpdate {
            password: Some(password.to_string()),
            ..UserUpdate::default()
        })
        .await?;
        self.inner.lock().await.is_password_set = true;
        let _ = self.events.send(StoreEvent::UserUpdated);
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.inner.lock().await.logout();
        self.api.tokens().clear()?;
        info!("logged out");
        let _ = self.events.send(StoreEvent::LoggedOut);
        Ok(())
    }

    async fn post_profile(&self, update: UserUpdate) -> Result<()> {
        self.api.post_ack("user/me", &update).await
    }
}

#[cfg(test)]
#[path = "tests/user_tests.rs"]
mod tests;
