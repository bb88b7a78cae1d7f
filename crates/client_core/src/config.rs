use std::{collections::HashMap, fs, path::PathBuf};

use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub api_base_url: String,
    /// Where the session token is persisted; in memory only when unset.
    pub token_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5004/".into(),
            token_path: None,
            log_filter: "info".into(),
        }
    }
}

/// Defaults, then `client.toml` in the working directory, then environment.
pub fn load_settings() -> ClientSettings {
    let mut settings = ClientSettings::default();

    match fs::read_to_string(DEFAULT_SETTINGS_FILE) {
        Ok(raw) => apply_file_config(&mut settings, &raw),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!(error = %err, file = DEFAULT_SETTINGS_FILE, "ignoring unreadable settings file"),
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn apply_file_config(settings: &mut ClientSettings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, String>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(error = %err, "ignoring malformed settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("token_path") {
        settings.token_path = non_empty_path(v);
    }
    if let Some(v) = file_cfg.get("log_filter") {
        settings.log_filter = v.clone();
    }
}

pub fn apply_env(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("UNSUB_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("UNSUB_TOKEN_PATH") {
        settings.token_path = non_empty_path(&v);
    }
    if let Some(v) = lookup("APP__TOKEN_PATH") {
        settings.token_path = non_empty_path(&v);
    }

    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

fn non_empty_path(raw: &str) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        None
    } else {
        Some(PathBuf::from(raw))
    }
}
