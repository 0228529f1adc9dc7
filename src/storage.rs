//! Durable token storage
//!
//! The bearer token survives restarts under a single fixed key. A missing
//! store, or a store without the key, means "logged out".

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{ClientError, Result};

/// Key under which the bearer token is stored
pub const TOKEN_KEY: &str = "token";

/// Synchronous key/value storage for the bearer token.
pub trait TokenStore {
    fn load(&self) -> Result<Option<String>>;
    fn save(&mut self, token: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

// ============================================================================
// FILE STORE
// ============================================================================

/// JSON document on disk: `{"token": "<bearer token>"}`.
///
/// Other keys in the document are preserved across writes.
#[derive(Debug, Clone)]
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

    fn read_document(&self) -> Result<Map<String, Value>> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Map::new()),
            Ok(text) => {
                serde_json::from_str(&text).map_err(|e| ClientError::storage(&self.path, e))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(ClientError::storage(&self.path, e)),
        }
    }

    fn write_document(&self, doc: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ClientError::storage(parent, e))?;
        }
        let text =
            serde_json::to_string_pretty(doc).map_err(|e| ClientError::storage(&self.path, e))?;
        fs::write(&self.path, text).map_err(|e| ClientError::storage(&self.path, e))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match self.read_document()?.remove(TOKEN_KEY) {
            Some(Value::String(token)) => Ok(Some(token)),
            _ => Ok(None),
        }
    }

    fn save(&mut self, token: &str) -> Result<()> {
        let mut doc = self.read_document().unwrap_or_default();
        doc.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_document(&doc)
    }

    fn clear(&mut self) -> Result<()> {
        let mut doc = match self.read_document() {
            Ok(doc) => doc,
            // Unreadable store: nothing worth keeping, start over
            Err(_) => Map::new(),
        };
        if doc.remove(TOKEN_KEY).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.write_document(&doc)
    }
}

// ============================================================================
// MEMORY STORE
// ============================================================================

/// Non-durable store for tests and one-shot sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Option<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.clone())
    }

    fn save(&mut self, token: &str) -> Result<()> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.token = None;
        Ok(())
    }
}
