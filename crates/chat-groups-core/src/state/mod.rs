//! The state store facade and its process-wide instance.
//!
//! # Overview
//!
//! [`StateManager`] wraps one area of a storage backend. A process normally
//! uses a single manager, obtained through [`StateManager::get_instance`]:
//!
//! ```ignore
//! use chat_groups_core::state::StateManager;
//! use chat_groups_core::storage::StorageArea;
//!
//! let state = StateManager::get_instance(StorageArea::Local).await?;
//! let groups = state.get_groups().await?;
//! ```
//!
//! # Initialization
//!
//! The instance is created by a one-shot latch ([`StateManagerCell`]). Every
//! caller, including callers that arrive while setup is still running, awaits
//! the same setup and receives the same `Arc<StateManager>`. The area and
//! backend chosen by the first successful call are fixed for the process.
//! A failed setup leaves the latch empty, so the next caller retries.

pub mod keys;
pub mod manager;

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::StoreConfig;
use crate::error::StateResult;
use crate::storage::{StorageArea, StorageBackend};

pub use keys::StateKey;
pub use manager::StateManager;

static INSTANCE: StateManagerCell = StateManagerCell::new();

/// Lazily initialized, shared [`StateManager`].
pub struct StateManagerCell {
    cell: OnceCell<Arc<StateManager>>,
}

impl StateManagerCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Return the manager, running setup on first use.
    ///
    /// `open_backend` is only called when setup actually runs.
    pub async fn get_or_init<F>(&self, area: StorageArea, open_backend: F) -> StateResult<Arc<StateManager>>
    where
        F: FnOnce() -> StateResult<Arc<dyn StorageBackend>>,
    {
        let manager = self
            .cell
            .get_or_try_init(|| async move {
                let backend = open_backend()?;
                log::debug!("Initializing state manager on {area} storage");
                StateManager::new(backend, area).await.map(Arc::new)
            })
            .await?;

        if manager.area() != area {
            log::debug!(
                "State manager already bound to {} storage; ignoring request for {area}",
                manager.area()
            );
        }

        Ok(Arc::clone(manager))
    }

    /// The manager if setup has completed.
    pub fn get(&self) -> Option<Arc<StateManager>> {
        self.cell.get().cloned()
    }
}

impl Default for StateManagerCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StateManager {
    /// The process-wide manager, backed by the storage described by
    /// [`StoreConfig::from_env`].
    pub async fn get_instance(area: StorageArea) -> StateResult<Arc<StateManager>> {
        INSTANCE
            .get_or_init(area, || StoreConfig::from_env()?.open_backend())
            .await
    }

    /// The process-wide manager over an explicit backend.
    ///
    /// Ignored in favour of the existing instance once one is initialized.
    pub async fn get_instance_with(
        backend: Arc<dyn StorageBackend>,
        area: StorageArea,
    ) -> StateResult<Arc<StateManager>> {
        INSTANCE.get_or_init(area, move || Ok(backend)).await
    }
}
