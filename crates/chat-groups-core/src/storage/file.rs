//! JSON file storage backend.
//!
//! # Files
//!
//! ```text
//! <data_dir>/
//! ├── storage-local.json   # "local" area
//! └── storage-sync.json    # "sync" area
//! ```
//!
//! Each file holds one JSON object with every key of its area. Writes go to
//! `<file>.tmp` first and are then renamed over the real file, so a crash
//! mid-write leaves the previous contents intact.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::{broadcast, Mutex};

use super::{apply_clear, apply_remove, apply_set, AreaChange, AreaMap, StorageArea, StorageBackend};
use crate::error::{StateError, StateResult};
use crate::event_bus::ChangeBus;

pub struct FileBackend {
    dir: PathBuf,
    // Serializes read-modify-write of the area files within this process.
    write_lock: Mutex<()>,
    bus: ChangeBus,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
            bus: ChangeBus::new(),
        }
    }

    /// Path of the file backing `area`.
    pub fn area_path(&self, area: StorageArea) -> PathBuf {
        self.dir.join(format!("storage-{}.json", area.as_str()))
    }

    async fn load_area(&self, area: StorageArea) -> StateResult<AreaMap> {
        let path = self.area_path(area);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AreaMap::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(AreaMap::new());
        }

        serde_json::from_str(&contents)
            .map_err(|e| StateError::StorageIo(format!("corrupt {}: {e}", path.display())))
    }

    async fn save_area(&self, area: StorageArea, map: &AreaMap) -> StateResult<()> {
        fs::create_dir_all(&self.dir).await?;

        let file_path = self.area_path(area);
        let temp_path = file_path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(map)?;
        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, &file_path).await?;

        Ok(())
    }

    async fn mutate<F>(&self, area: StorageArea, f: F) -> StateResult<()>
    where
        F: FnOnce(&mut AreaMap) -> super::StorageChanges + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_area(area).await?;
        let changes = f(&mut map);
        if changes.is_empty() {
            return Ok(());
        }
        self.save_area(area, &map).await?;
        self.bus.emit(AreaChange::new(area, changes));
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn get(&self, area: StorageArea, key: &str) -> StateResult<Option<Value>> {
        let mut map = self.load_area(area).await?;
        Ok(map.remove(key))
    }

    async fn set(&self, area: StorageArea, key: &str, value: Value) -> StateResult<()> {
        self.mutate(area, |map| apply_set(map, key, value)).await
    }

    async fn remove(&self, area: StorageArea, key: &str) -> StateResult<()> {
        self.mutate(area, |map| apply_remove(map, key)).await
    }

    async fn clear(&self, area: StorageArea) -> StateResult<()> {
        self.mutate(area, apply_clear).await
    }

    fn subscribe(&self) -> broadcast::Receiver<AreaChange> {
        self.bus.subscribe()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_files_read_as_empty() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        assert_eq!(backend.get(StorageArea::Local, "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_creates_area_file() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested"));

        backend
            .set(StorageArea::Local, "chatGroupIdCounter", json!(3))
            .await
            .unwrap();

        let path = dir.path().join("nested").join("storage-local.json");
        assert!(path.exists());
        assert!(!dir.path().join("nested").join("storage-local.json.tmp").exists());

        let contents: Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(contents, json!({"chatGroupIdCounter": 3}));
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let backend = FileBackend::new(dir.path());
            backend
                .set(StorageArea::Sync, "chatGroups", json!([{"id": 1}]))
                .await
                .unwrap();
        }

        let reopened = FileBackend::new(dir.path());
        assert_eq!(
            reopened.get(StorageArea::Sync, "chatGroups").await.unwrap(),
            Some(json!([{"id": 1}]))
        );
        assert_eq!(
            reopened.get(StorageArea::Local, "chatGroups").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        backend.set(StorageArea::Local, "a", json!(1)).await.unwrap();
        backend.set(StorageArea::Local, "b", json!(2)).await.unwrap();

        backend.remove(StorageArea::Local, "a").await.unwrap();
        assert_eq!(backend.get(StorageArea::Local, "a").await.unwrap(), None);
        assert_eq!(
            backend.get(StorageArea::Local, "b").await.unwrap(),
            Some(json!(2))
        );

        backend.clear(StorageArea::Local).await.unwrap();
        assert_eq!(backend.get(StorageArea::Local, "b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_is_storage_error() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        std::fs::write(backend.area_path(StorageArea::Local), "not json").unwrap();

        let err = backend.get(StorageArea::Local, "k").await.unwrap_err();
        assert!(matches!(err, StateError::StorageIo(_)));
    }

    #[tokio::test]
    async fn emits_changes_only_when_something_changed() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        let mut rx = backend.subscribe();

        backend.remove(StorageArea::Local, "absent").await.unwrap();
        backend.set(StorageArea::Local, "k", json!("v")).await.unwrap();

        let change = rx.recv().await.unwrap();
        assert_eq!(change.area, StorageArea::Local);
        assert_eq!(change.changes.len(), 1);
        assert_eq!(change.changes["k"].new_value, Some(json!("v")));
    }
}
