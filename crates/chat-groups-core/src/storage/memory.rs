//! In-memory storage backend.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use super::{apply_clear, apply_remove, apply_set, AreaChange, AreaMap, StorageArea, StorageBackend};
use crate::error::{StateError, StateResult};
use crate::event_bus::ChangeBus;

/// Both storage areas held in memory.
///
/// `set_failing(true)` makes every call fail with a storage IO error, which
/// stands in for a backend that rejects requests (quota, revoked permission).
#[derive(Default)]
pub struct MemoryBackend {
    local: RwLock<AreaMap>,
    sync: RwLock<AreaMap>,
    bus: ChangeBus,
    failing: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn area(&self, area: StorageArea) -> &RwLock<AreaMap> {
        match area {
            StorageArea::Local => &self.local,
            StorageArea::Sync => &self.sync,
        }
    }

    fn check(&self, op: &str, area: StorageArea) -> StateResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StateError::StorageIo(format!(
                "{op} rejected by {area} storage"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, area: StorageArea, key: &str) -> StateResult<Option<Value>> {
        self.check("get", area)?;
        Ok(self.area(area).read().await.get(key).cloned())
    }

    async fn set(&self, area: StorageArea, key: &str, value: Value) -> StateResult<()> {
        self.check("set", area)?;
        let changes = apply_set(&mut *self.area(area).write().await, key, value);
        self.bus.emit(AreaChange::new(area, changes));
        Ok(())
    }

    async fn remove(&self, area: StorageArea, key: &str) -> StateResult<()> {
        self.check("remove", area)?;
        let changes = apply_remove(&mut *self.area(area).write().await, key);
        self.bus.emit(AreaChange::new(area, changes));
        Ok(())
    }

    async fn clear(&self, area: StorageArea) -> StateResult<()> {
        self.check("clear", area)?;
        let changes = apply_clear(&mut *self.area(area).write().await);
        self.bus.emit(AreaChange::new(area, changes));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AreaChange> {
        self.bus.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn get_missing_returns_none() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get(StorageArea::Local, "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn areas_are_independent() {
        let backend = MemoryBackend::new();
        backend
            .set(StorageArea::Local, "k", json!("local"))
            .await
            .unwrap();
        backend
            .set(StorageArea::Sync, "k", json!("sync"))
            .await
            .unwrap();

        assert_eq!(
            backend.get(StorageArea::Local, "k").await.unwrap(),
            Some(json!("local"))
        );
        backend.clear(StorageArea::Local).await.unwrap();
        assert_eq!(backend.get(StorageArea::Local, "k").await.unwrap(), None);
        assert_eq!(
            backend.get(StorageArea::Sync, "k").await.unwrap(),
            Some(json!("sync"))
        );
    }

    #[tokio::test]
    async fn remove_deletes_key() {
        let backend = MemoryBackend::new();
        backend.set(StorageArea::Local, "k", json!(1)).await.unwrap();
        backend.remove(StorageArea::Local, "k").await.unwrap();
        assert_eq!(backend.get(StorageArea::Local, "k").await.unwrap(), None);
        // Removing again is fine
        backend.remove(StorageArea::Local, "k").await.unwrap();
    }

    #[tokio::test]
    async fn failing_backend_rejects_everything() {
        let backend = MemoryBackend::new();
        backend.set_failing(true);

        assert!(matches!(
            backend.get(StorageArea::Local, "k").await,
            Err(StateError::StorageIo(_))
        ));
        assert!(matches!(
            backend.set(StorageArea::Local, "k", json!(1)).await,
            Err(StateError::StorageIo(_))
        ));
        assert!(matches!(
            backend.clear(StorageArea::Sync).await,
            Err(StateError::StorageIo(_))
        ));

        backend.set_failing(false);
        assert!(backend.get(StorageArea::Local, "k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mutations_emit_changes() {
        let backend = MemoryBackend::new();
        let mut rx = backend.subscribe();

        backend.set(StorageArea::Sync, "k", json!(1)).await.unwrap();
        backend.remove(StorageArea::Sync, "k").await.unwrap();

        let set = rx.recv().await.unwrap();
        assert_eq!(set.area, StorageArea::Sync);
        assert_eq!(set.changes["k"].new_value, Some(json!(1)));

        let removed = rx.recv().await.unwrap();
        assert_eq!(removed.changes["k"].old_value, Some(json!(1)));
        assert_eq!(removed.changes["k"].new_value, None);
    }
}
