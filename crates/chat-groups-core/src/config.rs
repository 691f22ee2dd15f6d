//! Storage configuration.
//!
//! Resolved from environment variables, falling back to defaults:
//!
//! | Variable                   | Values           | Default                      |
//! |----------------------------|------------------|------------------------------|
//! | `CHAT_GROUPS_STORAGE_AREA` | `local`, `sync`  | `local`                      |
//! | `CHAT_GROUPS_BACKEND`      | `file`, `memory` | `file`                       |
//! | `CHAT_GROUPS_DATA_DIR`     | any path         | `<home>/.config/chat-groups` |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};
use crate::paths::default_data_dir;
use crate::state::StateManager;
use crate::storage::{FileBackend, MemoryBackend, StorageArea, StorageBackend};

pub const ENV_STORAGE_AREA: &str = "CHAT_GROUPS_STORAGE_AREA";
pub const ENV_BACKEND: &str = "CHAT_GROUPS_BACKEND";
pub const ENV_DATA_DIR: &str = "CHAT_GROUPS_DATA_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON files in the data directory.
    #[default]
    File,
    /// Process memory only; nothing survives a restart.
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::File => f.write_str("file"),
            BackendKind::Memory => f.write_str("memory"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(BackendKind::File),
            "memory" => Ok(BackendKind::Memory),
            other => Err(StateError::Config(format!("unknown storage backend: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    pub area: StorageArea,
    pub backend: BackendKind,
    pub data_dir: PathBuf,
}

impl StoreConfig {
    pub fn from_env() -> StateResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> StateResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let area = match value(ENV_STORAGE_AREA) {
            Some(area) => area.parse::<StorageArea>()?,
            None => StorageArea::default(),
        };
        let backend = match value(ENV_BACKEND) {
            Some(kind) => kind.parse::<BackendKind>()?,
            None => BackendKind::default(),
        };
        let data_dir = match value(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            // Only needed for the file backend; a memory backend works without HOME.
            None if backend == BackendKind::Memory => PathBuf::new(),
            None => default_data_dir()?,
        };

        Ok(Self {
            area,
            backend,
            data_dir,
        })
    }

    pub fn open_backend(&self) -> StateResult<Arc<dyn StorageBackend>> {
        log::debug!("Opening {} storage backend", self.backend);
        let backend: Arc<dyn StorageBackend> = match self.backend {
            BackendKind::File => Arc::new(FileBackend::new(&self.data_dir)),
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
        };
        Ok(backend)
    }

    /// A fresh (non-global) manager over this config's backend and area.
    pub async fn open_manager(&self) -> StateResult<StateManager> {
        StateManager::new(self.open_backend()?, self.area).await
    }
}
