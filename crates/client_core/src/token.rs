use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::RwLock,
};

use serde_json::{Map, Value};

use crate::error::{ClientError, Result};

/// Key the session token is kept under in persistent storage.
pub const TOKEN_STORAGE_KEY: &str = "token";

/// Persistent slot for the session token, kept outside the store state.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn store(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let guard = self.token.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn store(&self, token: &str) -> Result<()> {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        Ok(())
    }
}

/// JSON key-value file; other keys in the file are left alone.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_slots(&self) -> Result<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(self.storage_error(err)),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&raw)
            .map_err(|e| self.storage_error(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    fn write_slots(&self, slots: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.storage_error(e))?;
        }
        let raw = serde_json::to_string_pretty(slots)
            .map_err(|e| self.storage_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        fs::write(&self.path, raw).map_err(|e| self.storage_error(e))
    }

    fn storage_error(&self, source: io::Error) -> ClientError {
        ClientError::TokenStorage {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let slots = self.read_slots()?;
        Ok(slots
            .get(TOKEN_STORAGE_KEY)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn store(&self, token: &str) -> Result<()> {
        let mut slots = self.read_slots()?;
        slots.insert(TOKEN_STORAGE_KEY.to_string(), Value::from(token));
        self.write_slots(&slots)
    }

    fn clear(&self) -> Result<()> {
        let mut slots = self.read_slots()?;
        if slots.remove(TOKEN_STORAGE_KEY).is_some() {
            self.write_slots(&slots)?;
        }
        Ok(())
    }
}
