//! Monotonic chat group id allocation.
//!
//! One `IdCounter` exists per [`StateManager`](crate::state::StateManager); it is
//! seeded during facade setup from the persisted `chatGroupIdCounter` value and
//! handed to registry operations through an `Arc`.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{StateError, StateResult};
use crate::registry::types::GroupId;

#[derive(Debug, Default)]
pub struct IdCounter {
    current: AtomicU64,
}

impl IdCounter {
    /// Create a counter whose last allocated id is `seed`.
    pub fn new(seed: GroupId) -> Self {
        Self {
            current: AtomicU64::new(seed),
        }
    }

    /// The most recently allocated id (or the seed if nothing was allocated yet).
    pub fn current(&self) -> GroupId {
        self.current.load(Ordering::SeqCst)
    }

    /// Allocate the next id. A counter seeded with 0 hands out 1 first.
    ///
    /// Fails once `GroupId::MAX` has been handed out; the counter never wraps.
    pub fn next_id(&self) -> StateResult<GroupId> {
        self.current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
            .map(|previous| previous + 1)
            .map_err(StateError::IdsExhausted)
    }

    pub fn reset(&self, seed: GroupId) {
        self.current.store(seed, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn seeded_with_zero_starts_at_one() {
        let counter = IdCounter::new(0);
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.next_id().unwrap(), 1);
        assert_eq!(counter.current(), 1);
    }

    #[test]
    fn continues_from_seed() {
        let counter = IdCounter::new(41);
        assert_eq!(counter.next_id().unwrap(), 42);
        assert_eq!(counter.next_id().unwrap(), 43);
    }

    #[test]
    fn reset_replaces_current() {
        let counter = IdCounter::new(10);
        counter.reset(3);
        assert_eq!(counter.current(), 3);
        assert_eq!(counter.next_id().unwrap(), 4);
    }

    #[test]
    fn exhausted_counter_does_not_wrap() {
        let counter = IdCounter::new(GroupId::MAX - 1);
        assert_eq!(counter.next_id().unwrap(), GroupId::MAX);

        let err = counter.next_id().unwrap_err();
        assert!(matches!(err, StateError::IdsExhausted(u64::MAX)));
        assert_eq!(counter.current(), GroupId::MAX);
    }

    #[test]
    fn ids_are_unique_across_threads() {
        let counter = Arc::new(IdCounter::new(0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || (0..100).map(|_| counter.next_id().unwrap()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 400);
        assert_eq!(counter.current(), 400);
    }
}
