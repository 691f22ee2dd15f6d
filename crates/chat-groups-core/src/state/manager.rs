//! StateManager - the single point of access to a storage area.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::keys::StateKey;
use crate::error::StateResult;
use crate::id_counter::IdCounter;
use crate::storage::{StorageArea, StorageBackend, StorageChanges};

/// Typed facade over one area of a [`StorageBackend`].
///
/// Construction runs setup: the persisted `chatGroupIdCounter` seeds the
/// manager's [`IdCounter`], or both are set to 0 when the stored value is
/// missing or not a non-negative integer. That is the only place the counter
/// is seeded.
pub struct StateManager {
    backend: Arc<dyn StorageBackend>,
    area: StorageArea,
    counter: Arc<IdCounter>,
}

impl StateManager {
    /// Build a manager over `area` of `backend` and run setup.
    pub async fn new(backend: Arc<dyn StorageBackend>, area: StorageArea) -> StateResult<Self> {
        let manager = Self {
            backend,
            area,
            counter: Arc::new(IdCounter::default()),
        };
        manager.setup().await?;
        Ok(manager)
    }

    async fn setup(&self) -> StateResult<()> {
        let stored = self.get_value(StateKey::ChatGroupIdCounter).await?;

        match stored.as_ref().and_then(Value::as_u64) {
            Some(seed) => {
                log::debug!("Seeding chat group id counter from {} storage: {seed}", self.area);
                self.counter.reset(seed);
            }
            None => {
                if let Some(invalid) = stored {
                    log::warn!("Ignoring invalid chatGroupIdCounter value: {invalid}");
                }
                self.counter.reset(0);
                self.set_state(StateKey::ChatGroupIdCounter, &0u64).await?;
            }
        }

        Ok(())
    }

    pub fn area(&self) -> StorageArea {
        self.area
    }

    /// Handle to the id counter owned by this manager.
    pub fn counter(&self) -> Arc<IdCounter> {
        Arc::clone(&self.counter)
    }

    pub(crate) fn id_counter(&self) -> &IdCounter {
        &self.counter
    }

    // ========================================================================
    // Raw values
    // ========================================================================

    /// Read the raw JSON stored under `key`.
    pub async fn get_value(&self, key: impl Into<StateKey>) -> StateResult<Option<Value>> {
        let key = key.into();
        self.backend.get(self.area, key.as_str()).await
    }

    pub async fn set_value(&self, key: impl Into<StateKey>, value: Value) -> StateResult<()> {
        let key = key.into();
        self.backend.set(self.area, key.as_str(), value).await
    }

    // ========================================================================
    // Typed state
    // ========================================================================

    /// Read and decode the value under `key`.
    ///
    /// Returns `None` when the key is unset or holds JSON `null`.
    pub async fn get_state<T: DeserializeOwned>(
        &self,
        key: impl Into<StateKey>,
    ) -> StateResult<Option<T>> {
        match self.get_value(key).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    /// Encode `value` and store it under `key`, overwriting any prior value.
    pub async fn set_state<T: Serialize + ?Sized>(
        &self,
        key: impl Into<StateKey>,
        value: &T,
    ) -> StateResult<()> {
        let value = serde_json::to_value(value)?;
        self.set_value(key, value).await
    }

    pub async fn remove_state(&self, key: impl Into<StateKey>) -> StateResult<()> {
        let key = key.into();
        self.backend.remove(self.area, key.as_str()).await
    }

    /// Remove every key in this manager's area.
    pub async fn clear_state(&self) -> StateResult<()> {
        self.backend.clear(self.area).await
    }

    // ========================================================================
    // Change notifications
    // ========================================================================

    /// Call `callback` for every change to this manager's area, whoever made it.
    ///
    /// The listener runs on a spawned tokio task and stays registered until the
    /// backend is dropped (or the returned handle is aborted). Must be called
    /// from within a tokio runtime.
    pub fn on_state_change<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: Fn(&StorageChanges) + Send + Sync + 'static,
    {
        let mut rx = self.backend.subscribe();
        let area = self.area;

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) if change.area == area => callback(&change.changes),
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        log::warn!("State change listener on {area} storage missed {missed} changes");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
