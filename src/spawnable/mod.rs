//! Pooled spawnables and the prototype table that parameterizes them

pub mod burst;
pub mod projectile;

pub use burst::{BurstSpec, BurstStrike, BurstTick, EffectBurst, DAMAGE_EVENT};
pub use projectile::{Projectile, ProjectileAim, ProjectileOutcome, ProjectileSpec};

use ahash::AHashMap;

/// Data template a spawn resolves against
#[derive(Debug, Clone)]
pub enum SpawnPrototype {
    Projectile(ProjectileSpec),
    Burst(BurstSpec),
}

/// Name to prototype map owned by the session
///
/// Patterns and profiles reference prototypes by name; a missing name is
/// a configuration error handled by skipping the spawn.
#[derive(Debug, Clone, Default)]
pub struct PrototypeTable {
    entries: AHashMap<String, SpawnPrototype>,
}

impl PrototypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, prototype: SpawnPrototype) {
        self.entries.insert(name.into(), prototype);
    }

    pub fn projectile(&self, name: &str) -> Option<&ProjectileSpec> {
        match self.entries.get(name) {
            Some(SpawnPrototype::Projectile(spec)) => Some(spec),
            _ => None,
        }
    }

    pub fn burst(&self, name: &str) -> Option<&BurstSpec> {
        match self.entries.get(name) {
            Some(SpawnPrototype::Burst(spec)) => Some(spec),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{Timeline, TimelineFrame};

    #[test]
    fn test_lookup_is_kind_checked() {
        let mut table = PrototypeTable::new();
        table.insert("shot", SpawnPrototype::Projectile(ProjectileSpec::new(6.0, 1)));
        table.insert(
            "bolt",
            SpawnPrototype::Burst(BurstSpec::new(
                Timeline::new("bolt", vec![TimelineFrame::new("b", 0.1)]),
                1,
                0.5,
            )),
        );

        assert!(table.projectile("shot").is_some());
        assert!(table.burst("shot").is_none());
        assert!(table.burst("bolt").is_some());
        assert!(table.projectile("missing").is_none());
    }
}
