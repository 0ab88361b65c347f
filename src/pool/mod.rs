//! Spawn pooling: typed pools plus the per-session registry

pub mod registry;
pub mod spawn_pool;

pub use registry::PoolRegistry;
pub use spawn_pool::{PoolItem, SpawnKey, SpawnPool};
