//! Prototype-cloning spawn pool
//!
//! A pool owns every instance of one spawnable type: actives are addressed
//! by key, released items wait in a free queue for reuse. Spawning clones
//! the prototype only when the free queue is empty, so steady-state play
//! allocates nothing.

use std::collections::VecDeque;

use ahash::AHashMap;
use tracing::debug;

/// Lifecycle hooks implemented by every pooled spawnable
pub trait PoolItem: Clone {
    /// Called each time the item is handed out, whether freshly cloned
    /// or reused; resets transient state from the previous life.
    fn on_spawn(&mut self);

    /// Called when the item returns to the free queue
    fn on_despawn(&mut self);
}

/// Key addressing an active item within its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpawnKey(u64);

#[derive(Debug)]
pub struct SpawnPool<T: PoolItem> {
    prototype: T,
    free: VecDeque<T>,
    active: AHashMap<SpawnKey, T>,
    next_key: u64,
    constructed: usize,
}

impl<T: PoolItem> SpawnPool<T> {
    pub fn new(prototype: T) -> Self {
        Self {
            prototype,
            free: VecDeque::new(),
            active: AHashMap::new(),
            next_key: 0,
            constructed: 0,
        }
    }

    /// Pre-clones `count` items into the free queue
    pub fn reserve(&mut self, count: usize) {
        for _ in 0..count {
            self.free.push_back(self.prototype.clone());
            self.constructed += 1;
        }
    }

    /// Hands out an item, reusing the free queue before cloning the
    /// prototype. Returns the key addressing it while active.
    pub fn spawn(&mut self) -> SpawnKey {
        let mut item = match self.free.pop_front() {
            Some(item) => item,
            None => {
                self.constructed += 1;
                self.prototype.clone()
            }
        };
        item.on_spawn();

        let key = SpawnKey(self.next_key);
        self.next_key += 1;
        self.active.insert(key, item);
        key
    }

    /// Returns an active item to the free queue
    ///
    /// Idempotent: a key that is not active (already released, discarded,
    /// or from a previous life) is ignored.
    pub fn release(&mut self, key: SpawnKey) -> bool {
        match self.active.remove(&key) {
            Some(mut item) => {
                item.on_despawn();
                self.free.push_back(item);
                true
            }
            None => {
                debug!(?key, "release of inactive pool key ignored");
                false
            }
        }
    }

    /// Removes an active item without recycling it, for entities that
    /// must not be reused. Idempotent like `release`.
    pub fn discard(&mut self, key: SpawnKey) -> bool {
        self.active.remove(&key).is_some()
    }

    /// Releases every active item back to the free queue
    pub fn release_all(&mut self) {
        let keys: Vec<SpawnKey> = self.active.keys().copied().collect();
        for key in keys {
            self.release(key);
        }
    }

    pub fn get(&self, key: SpawnKey) -> Option<&T> {
        self.active.get(&key)
    }

    pub fn get_mut(&mut self, key: SpawnKey) -> Option<&mut T> {
        self.active.get_mut(&key)
    }

    /// Active keys in spawn order, for deterministic iteration
    pub fn active_keys(&self) -> Vec<SpawnKey> {
        let mut keys: Vec<SpawnKey> = self.active.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (SpawnKey, &mut T)> {
        self.active.iter_mut().map(|(k, v)| (*k, v))
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Total prototype clones made over the pool's lifetime
    pub fn constructed_count(&self) -> usize {
        self.constructed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Counter {
        spawns: u32,
        despawns: u32,
    }

    impl Counter {
        fn new() -> Self {
            Self { spawns: 0, despawns: 0 }
        }
    }

    impl PoolItem for Counter {
        fn on_spawn(&mut self) {
            self.spawns += 1;
        }
        fn on_despawn(&mut self) {
            self.despawns += 1;
        }
    }

    #[test]
    fn test_reserve_then_spawn_reuses_before_cloning() {
        let mut pool = SpawnPool::new(Counter::new());
        pool.reserve(10);
        assert_eq!(pool.constructed_count(), 10);
        assert_eq!(pool.free_len(), 10);

        let keys: Vec<SpawnKey> = (0..12).map(|_| pool.spawn()).collect();
        assert_eq!(keys.len(), 12);
        assert_eq!(pool.active_len(), 12);
        assert_eq!(pool.free_len(), 0);
        // 10 reused from the reserve, 2 freshly cloned
        assert_eq!(pool.constructed_count(), 12);
    }

    #[test]
    fn test_release_all_returns_every_active() {
        let mut pool = SpawnPool::new(Counter::new());
        pool.reserve(10);
        for _ in 0..12 {
            pool.spawn();
        }

        pool.release_all();
        assert_eq!(pool.active_len(), 0);
        assert_eq!(pool.free_len(), 12);
    }

    #[test]
    fn test_double_release_is_noop() {
        let mut pool = SpawnPool::new(Counter::new());
        let key = pool.spawn();
        assert!(pool.release(key));
        assert!(!pool.release(key));
        assert_eq!(pool.free_len(), 1);
        assert_eq!(pool.active_len(), 0);
    }

    #[test]
    fn test_spawn_despawn_hooks_fire() {
        let mut pool = SpawnPool::new(Counter::new());
        let key = pool.spawn();
        assert_eq!(pool.get(key).map(|c| c.spawns), Some(1));

        pool.release(key);
        // The reused instance carries its lifecycle counters forward
        let key = pool.spawn();
        let item = pool.get(key).cloned();
        assert_eq!(item.as_ref().map(|c| c.spawns), Some(2));
        assert_eq!(item.map(|c| c.despawns), Some(1));
    }

    #[test]
    fn test_discard_does_not_recycle() {
        let mut pool = SpawnPool::new(Counter::new());
        let key = pool.spawn();
        assert!(pool.discard(key));
        assert_eq!(pool.active_len(), 0);
        assert_eq!(pool.free_len(), 0);
        assert!(!pool.release(key));
    }

    #[test]
    fn test_active_keys_in_spawn_order() {
        let mut pool = SpawnPool::new(Counter::new());
        let a = pool.spawn();
        let b = pool.spawn();
        let c = pool.spawn();
        pool.release(b);
        assert_eq!(pool.active_keys(), vec![a, c]);
    }

    #[test]
    fn test_keys_from_previous_life_stay_dead() {
        let mut pool = SpawnPool::new(Counter::new());
        let old = pool.spawn();
        pool.release(old);
        let fresh = pool.spawn();
        assert_ne!(old, fresh);
        assert!(pool.get(old).is_none());
        assert!(pool.get(fresh).is_some());
    }
}
