use std::path::PathBuf;

use reqwest::{Method, StatusCode};
use thiserror::Error;
use unsub_shared::domain::ScenarioId;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid api url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("invalid response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("token storage at {path} failed: {source}")]
    TokenStorage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no publisher selected")]
    NoPublisherSelected,
    #[error("no scenario selected")]
    NoScenarioSelected,
    #[error("scenario {0} has no saved record")]
    ScenarioNotHydrated(ScenarioId),
    #[error("unknown data file {0}")]
    UnknownDataFile(String),
    #[error("data file {0} has no status endpoint")]
    NoDataFileStatus(String),
}

impl ClientError {
    /// HTTP status of a rejected request, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
