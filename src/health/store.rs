//! Durable storage for health records.
//!
//! # Responsibilities
//! - Load the registry mapping at startup
//! - Write the whole mapping back after every mutation
//!
//! The file store treats one JSON document as a small key/value store and
//! keeps the registry under a fixed namespace key, leaving other keys alone.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::health::record::HealthRecord;

/// Namespace key under which the registry is persisted.
pub const STORAGE_NAMESPACE: &str = "playback.provider_health";

/// Provider id → health record, in stable order.
pub type HealthSnapshot = BTreeMap<String, HealthRecord>;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("health store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("health store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("health store write rejected")]
    Rejected,
}

/// Persistence backend for the health registry.
pub trait HealthStore: Send + Sync {
    fn load(&self) -> Result<HealthSnapshot, StoreError>;
    fn save(&self, snapshot: &HealthSnapshot) -> Result<(), StoreError>;
}

/// JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_document(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

impl HealthStore for JsonFileStore {
    fn load(&self) -> Result<HealthSnapshot, StoreError> {
        let mut document = self.read_document()?;
        match document.remove(STORAGE_NAMESPACE) {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(HealthSnapshot::new()),
        }
    }

    fn save(&self, snapshot: &HealthSnapshot) -> Result<(), StoreError> {
        // A corrupt document is replaced rather than blocking every write.
        let mut document = self.read_document().unwrap_or_default();
        document.insert(STORAGE_NAMESPACE.to_string(), serde_json::to_value(snapshot)?);

        let tmp = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(fs::File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, &document)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory store. Can be told to reject writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<HealthSnapshot>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Last persisted snapshot.
    pub fn persisted(&self) -> HealthSnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HealthStore for MemoryStore {
    fn load(&self) -> Result<HealthSnapshot, StoreError> {
        Ok(self.persisted())
    }

    fn save(&self, snapshot: &HealthSnapshot) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected);
        }
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
