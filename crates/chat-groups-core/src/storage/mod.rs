//! Asynchronous key-value storage areas.
//!
//! # Overview
//!
//! A backend holds two independent areas, `local` and `sync`, each a flat
//! JSON object keyed by string. Facades never touch a backend directly other
//! than through [`StorageBackend`], so the memory and file backends are
//! interchangeable.
//!
//! # Change events
//!
//! Every mutation that alters at least one key emits one [`AreaChange`] on the
//! backend's [`ChangeBus`](crate::event_bus::ChangeBus), listing the changed
//! keys with their old and new values. No-op mutations emit nothing.

pub mod file;
pub mod memory;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::error::{StateError, StateResult};

pub use file::FileBackend;
pub use memory::MemoryBackend;

/// Contents of a single storage area.
pub type AreaMap = Map<String, Value>;

/// Changed keys mapped to their before/after values.
pub type StorageChanges = BTreeMap<String, StorageChange>;

/// Which storage area a facade reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    /// Persistent, this device only.
    #[default]
    Local,
    /// Synced across the user's devices.
    Sync,
}

impl StorageArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageArea::Local => "local",
            StorageArea::Sync => "sync",
        }
    }
}

impl fmt::Display for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageArea {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(StorageArea::Local),
            "sync" => Ok(StorageArea::Sync),
            other => Err(StateError::Config(format!("unknown storage area: {other}"))),
        }
    }
}

/// Before/after value of one key. `None` means the key was absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// A batch of changes applied to one area by one backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaChange {
    pub area: StorageArea,
    pub changes: StorageChanges,
}

impl AreaChange {
    pub fn new(area: StorageArea, changes: StorageChanges) -> Self {
        Self { area, changes }
    }
}

/// The storage capability consumed by [`StateManager`](crate::state::StateManager).
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read one key; `None` if unset.
    async fn get(&self, area: StorageArea, key: &str) -> StateResult<Option<Value>>;

    /// Overwrite one key.
    async fn set(&self, area: StorageArea, key: &str, value: Value) -> StateResult<()>;

    /// Remove one key. Removing an absent key succeeds.
    async fn remove(&self, area: StorageArea, key: &str) -> StateResult<()>;

    /// Remove every key in the area.
    async fn clear(&self, area: StorageArea) -> StateResult<()>;

    /// Subscribe to changes in all areas of this backend.
    fn subscribe(&self) -> broadcast::Receiver<AreaChange>;
}

// ============================================================================
// Area mutation helpers shared by backends
// ============================================================================

/// Set `key` in `map`, returning the resulting change set (empty if unchanged).
pub(crate) fn apply_set(map: &mut AreaMap, key: &str, value: Value) -> StorageChanges {
    let mut changes = StorageChanges::new();
    let old_value = map.insert(key.to_string(), value.clone());
    if old_value.as_ref() != Some(&value) {
        changes.insert(
            key.to_string(),
            StorageChange {
                old_value,
                new_value: Some(value),
            },
        );
    }
    changes
}

pub(crate) fn apply_remove(map: &mut AreaMap, key: &str) -> StorageChanges {
    let mut changes = StorageChanges::new();
    if let Some(old_value) = map.remove(key) {
        changes.insert(
            key.to_string(),
            StorageChange {
                old_value: Some(old_value),
                new_value: None,
            },
        );
    }
    changes
}

pub(crate) fn apply_clear(map: &mut AreaMap) -> StorageChanges {
    std::mem::take(map)
        .into_iter()
        .map(|(key, old_value)| {
            (
                key,
                StorageChange {
                    old_value: Some(old_value),
                    new_value: None,
                },
            )
        })
        .collect()
}
