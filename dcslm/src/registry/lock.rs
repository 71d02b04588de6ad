//! Per-livery advisory locks.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

/// Set of livery ids currently being modified.
///
/// Install and optimization take the lock for their id; a second attempt on
/// the same id fails fast instead of waiting.
#[derive(Debug, Clone, Default)]
pub struct ItemLocks {
    held: Arc<Mutex<HashSet<u64>>>,
}

impl ItemLocks {
    /// Create an empty lock set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the lock for `id`.
    ///
    /// Returns `None` if another operation holds it. The lock is released when
    /// the guard is dropped.
    pub fn try_acquire(&self, id: u64) -> Option<ItemGuard> {
        let mut held = self.held.lock();
        if !held.insert(id) {
            return None;
        }
        Some(ItemGuard {
            id,
            held: Arc::clone(&self.held),
        })
    }

    /// Whether `id` is currently locked.
    pub fn is_locked(&self, id: u64) -> bool {
        self.held.lock().contains(&id)
    }
}

/// Held lock on one livery id.
#[derive(Debug)]
pub struct ItemGuard {
    id: u64,
    held: Arc<Mutex<HashSet<u64>>>,
}

impl ItemGuard {
    /// Locked id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for ItemGuard {
    fn drop(&mut self) {
        self.held.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails() {
        let locks = ItemLocks::new();
        let guard = locks.try_acquire(5).unwrap();
        assert!(locks.try_acquire(5).is_none());
        assert!(locks.try_acquire(6).is_some());
        assert_eq!(guard.id(), 5);
    }

    #[test]
    fn test_released_on_drop() {
        let locks = ItemLocks::new();
        {
            let _guard = locks.try_acquire(5).unwrap();
            assert!(locks.is_locked(5));
        }
        assert!(!locks.is_locked(5));
        assert!(locks.try_acquire(5).is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let locks = ItemLocks::new();
        let other = locks.clone();
        let _guard = locks.try_acquire(1).unwrap();
        assert!(other.try_acquire(1).is_none());
    }
}
