use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{InstitutionId, Issnl, PublisherId, ScenarioId, UserId};

pub type JsonMap = Map<String, Value>;

/// Body of `GET publisher/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherPayload {
    pub id: PublisherId,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_demo: bool,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub journal_detail: Value,
    #[serde(default)]
    pub journals: Vec<JournalPayload>,
    #[serde(default)]
    pub data_files: Vec<DataFilePayload>,
    #[serde(default)]
    pub warnings: Vec<WarningPayload>,
    #[serde(default)]
    pub cost_bigdeal: Option<f64>,
    #[serde(default)]
    pub is_owned_by_consortium: bool,
    #[serde(default)]
    pub currency: Option<String>,
}

/// A scenario as the backend sends it. Publisher payloads carry shallow
/// entries (no `saved`); `GET scenario/{id}` returns the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved: Option<ScenarioSaved>,
    #[serde(default)]
    pub summary: JsonMap,
    #[serde(default)]
    pub configs: JsonMap,
    #[serde(default)]
    pub subrs: Vec<Issnl>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl Scenario {
    pub fn shallow(id: impl Into<ScenarioId>) -> Self {
        Self {
            id: id.into(),
            saved: None,
            summary: JsonMap::new(),
            configs: JsonMap::new(),
            subrs: Vec::new(),
            extra: JsonMap::new(),
        }
    }

    pub fn is_hydrated(&self) -> bool {
        self.saved.is_some()
    }

    /// Saved display name, empty until the scenario is hydrated.
    pub fn name(&self) -> &str {
        self.saved.as_ref().map(|s| s.name.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSaved {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub configs: JsonMap,
    #[serde(default)]
    pub subrs: Vec<Issnl>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalPayload {
    pub issnl: Issnl,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub issns: Vec<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFilePayload {
    pub name: String,
    #[serde(default)]
    pub uploaded: bool,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub rows_count: Option<u64>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningPayload {
    pub id: String,
    #[serde(default)]
    pub is_dismissed: bool,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// Body of `GET publisher/{id}/apc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApcPayload {
    #[serde(default)]
    pub headers: Vec<ApcHeader>,
    #[serde(default)]
    pub journals: Vec<JsonMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApcHeader {
    pub value: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub raw: Value,
    #[serde(default)]
    pub display: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScenarioRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoAccountRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Body of `GET user/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_password_set: bool,
    #[serde(default)]
    pub user_permissions: Vec<InstitutionPermission>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionPermission {
    pub institution_id: InstitutionId,
    #[serde(default)]
    pub institution_name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// Partial profile update for `POST user/me`; only set fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}
