//! Key-value settings store
//!
//! Two keys are used: `breakInterval` (positive minutes) and `snoozeEndTime`
//! (milliseconds since the Unix epoch). The file-backed store keeps them in a
//! single JSON object so the file stays readable and hand-editable.

use std::{
    collections::HashMap,
    io::ErrorKind,
    path::PathBuf,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};

use super::error::StoreError;
use crate::state::DEFAULT_BREAK_INTERVAL;

pub const BREAK_INTERVAL_KEY: &str = "breakInterval";
pub const SNOOZE_END_TIME_KEY: &str = "snoozeEndTime";

/// Asynchronous key-value store with durable writes
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Read the break interval, falling back to the default when the stored
    /// value is missing or not a positive integer
    async fn break_interval(&self) -> Result<u32, StoreError> {
        let Some(value) = self.get(BREAK_INTERVAL_KEY).await? else {
            return Ok(DEFAULT_BREAK_INTERVAL);
        };

        match value.as_u64().and_then(|minutes| u32::try_from(minutes).ok()) {
            Some(minutes) if minutes > 0 => Ok(minutes),
            _ => {
                warn!(
                    "Ignoring invalid {} value {}, using default of {} minutes",
                    BREAK_INTERVAL_KEY, value, DEFAULT_BREAK_INTERVAL
                );
                Ok(DEFAULT_BREAK_INTERVAL)
            }
        }
    }

    async fn set_break_interval(&self, minutes: u32) -> Result<(), StoreError> {
        if minutes == 0 {
            return Err(StoreError::InvalidInterval(0));
        }
        self.set(BREAK_INTERVAL_KEY, Value::from(minutes)).await
    }

    async fn snooze_end_time(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let Some(value) = self.get(SNOOZE_END_TIME_KEY).await? else {
            return Ok(None);
        };

        let deadline = value.as_i64().and_then(DateTime::from_timestamp_millis);
        if deadline.is_none() {
            warn!("Ignoring invalid {} value {}", SNOOZE_END_TIME_KEY, value);
        }
        Ok(deadline)
    }

    async fn set_snooze_end_time(&self, deadline: Option<DateTime<Utc>>) -> Result<(), StoreError> {
        match deadline {
            Some(deadline) => {
                self.set(SNOOZE_END_TIME_KEY, Value::from(deadline.timestamp_millis()))
                    .await
            }
            None => self.remove(SNOOZE_END_TIME_KEY).await,
        }
    }
}

/// Settings persisted as a JSON object on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing or empty file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let entries = match fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => Map::new(),
            Ok(contents) => match serde_json::from_str(&contents)? {
                Value::Object(map) => map,
                _ => return Err(StoreError::NotAnObject),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings file at {}, starting empty", path.display());
                Map::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    async fn persist(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(entries)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        // Write-then-rename so a crash never leaves a truncated file behind
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!("Settings written to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value);
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }
}

/// Non-durable store, used by tests and throwaway runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
