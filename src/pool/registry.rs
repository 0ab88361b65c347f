//! Per-session pool registry
//!
//! Maps spawnable type to its pool, creating pools lazily with a default
//! reserve on first request. The registry is an explicit handle owned by
//! the session, not process state; two sessions never share pools.

use std::any::{Any, TypeId};

use ahash::AHashMap;
use tracing::debug;

use crate::pool::spawn_pool::{PoolItem, SpawnPool};

/// Object-safe surface every typed pool exposes to the registry
trait AnyPool {
    fn release_all(&mut self);
    fn active_len(&self) -> usize;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: PoolItem + 'static> AnyPool for SpawnPool<T> {
    fn release_all(&mut self) {
        SpawnPool::release_all(self);
    }

    fn active_len(&self) -> usize {
        SpawnPool::active_len(self)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Default)]
pub struct PoolRegistry {
    pools: AHashMap<TypeId, Box<dyn AnyPool>>,
}

impl PoolRegistry {
    /// Items pre-cloned when a pool is first created
    pub const DEFAULT_RESERVE: usize = 10;

    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pool for `T`, creating and reserving it on first use
    ///
    /// `prototype` is only invoked when the pool does not exist yet.
    pub fn pool_with<T: PoolItem + 'static>(
        &mut self,
        prototype: impl FnOnce() -> T,
    ) -> &mut SpawnPool<T> {
        let entry = self.pools.entry(TypeId::of::<T>()).or_insert_with(|| {
            debug!(pool = std::any::type_name::<T>(), "creating spawn pool");
            let mut pool = SpawnPool::new(prototype());
            pool.reserve(Self::DEFAULT_RESERVE);
            Box::new(pool)
        });
        entry
            .as_any_mut()
            .downcast_mut::<SpawnPool<T>>()
            .expect("pool entry keyed by TypeId")
    }

    /// Returns the pool for `T` if it has been created
    pub fn pool<T: PoolItem + 'static>(&mut self) -> Option<&mut SpawnPool<T>> {
        self.pools
            .get_mut(&TypeId::of::<T>())
            .and_then(|p| p.as_any_mut().downcast_mut::<SpawnPool<T>>())
    }

    /// Releases every active item in every pool, then drops the pools
    pub fn clear_all_pools(&mut self) {
        for pool in self.pools.values_mut() {
            pool.release_all();
        }
        self.pools.clear();
    }

    /// Active items across all pools
    pub fn total_active(&self) -> usize {
        self.pools.values().map(|p| p.active_len()).sum()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Spark {
        lit: bool,
    }

    impl PoolItem for Spark {
        fn on_spawn(&mut self) {
            self.lit = true;
        }
        fn on_despawn(&mut self) {
            self.lit = false;
        }
    }

    #[derive(Clone)]
    struct Ember {
        heat: u32,
    }

    impl PoolItem for Ember {
        fn on_spawn(&mut self) {
            self.heat = 100;
        }
        fn on_despawn(&mut self) {
            self.heat = 0;
        }
    }

    #[test]
    fn test_lazy_creation_with_default_reserve() {
        let mut registry = PoolRegistry::new();
        assert_eq!(registry.pool_count(), 0);
        assert!(registry.pool::<Spark>().is_none());

        let pool = registry.pool_with(|| Spark { lit: false });
        assert_eq!(pool.free_len(), PoolRegistry::DEFAULT_RESERVE);
        assert_eq!(registry.pool_count(), 1);
    }

    #[test]
    fn test_prototype_not_rebuilt_on_reuse() {
        let mut registry = PoolRegistry::new();
        registry.pool_with(|| Spark { lit: false });

        let mut built_again = false;
        registry.pool_with(|| {
            built_again = true;
            Spark { lit: false }
        });
        assert!(!built_again);
    }

    #[test]
    fn test_pools_are_typed() {
        let mut registry = PoolRegistry::new();
        let spark = registry.pool_with(|| Spark { lit: false }).spawn();
        let ember = registry.pool_with(|| Ember { heat: 0 }).spawn();

        assert!(registry.pool::<Spark>().and_then(|p| p.get(spark)).is_some());
        assert_eq!(
            registry.pool::<Ember>().and_then(|p| p.get(ember)).map(|e| e.heat),
            Some(100)
        );
        assert_eq!(registry.pool_count(), 2);
    }

    #[test]
    fn test_clear_all_pools() {
        let mut registry = PoolRegistry::new();
        for _ in 0..3 {
            registry.pool_with(|| Spark { lit: false }).spawn();
        }
        registry.pool_with(|| Ember { heat: 0 }).spawn();
        assert_eq!(registry.total_active(), 4);

        registry.clear_all_pools();
        assert_eq!(registry.total_active(), 0);
        assert_eq!(registry.pool_count(), 0);
        assert!(registry.pool::<Spark>().is_none());
    }
}
