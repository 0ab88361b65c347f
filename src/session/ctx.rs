//! Mutable world surface passed down the tick call tree
//!
//! Bosses, profiles, and scheduled tasks never hold references into the
//! session; each tick they receive this context, spawn through it, and
//! record consequences on it. The session applies effects afterward, so
//! nothing mutates the target from under iteration.

use rand_chacha::ChaCha8Rng;
use tracing::warn;

use crate::boss::events::EncounterLog;
use crate::core::types::{FieldBounds, Vec2};
use crate::pool::PoolRegistry;
use crate::spawnable::{EffectBurst, Projectile, PrototypeTable};

/// Immutable view of the target for decision code
#[derive(Debug, Clone, Copy)]
pub struct TargetView {
    pub pos: Vec2,
    pub alive: bool,
}

/// Consequence recorded during a tick and applied by the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    DamageTarget { amount: i32 },
}

/// Per-tick context handed to bosses and scheduled tasks
pub struct SpawnCtx<'a> {
    /// Encounter clock in seconds
    pub now: f32,
    pub bounds: FieldBounds,
    pub target: TargetView,
    pub registry: &'a mut PoolRegistry,
    pub prototypes: &'a PrototypeTable,
    pub effects: &'a mut Vec<Effect>,
    pub log: &'a mut EncounterLog,
    /// Session RNG for environment spawn shapes; bosses roll on their own
    pub rng: &'a mut ChaCha8Rng,
}

impl SpawnCtx<'_> {
    /// Launches a pooled projectile aimed at the target's current position
    pub fn fire_at_target(&mut self, prototype: &str, origin: Vec2) -> bool {
        let dir = self.target.pos - origin;
        self.fire_along(prototype, origin, dir)
    }

    /// Launches a pooled projectile along `dir`
    pub fn fire_along(&mut self, prototype: &str, origin: Vec2, dir: Vec2) -> bool {
        let Some(spec) = self.prototypes.projectile(prototype) else {
            warn!(prototype, "projectile prototype missing, spawn skipped");
            return false;
        };
        let pool = self.registry.pool_with(Projectile::inert);
        let key = pool.spawn();
        if let Some(shot) = pool.get_mut(key) {
            shot.launch(spec, origin, dir);
        }
        true
    }

    /// Like [`fire_along`](Self::fire_along) but scales the prototype's
    /// flight speed, used by difficulty-buffed shooters
    pub fn fire_scaled(
        &mut self,
        prototype: &str,
        origin: Vec2,
        dir: Vec2,
        speed_scale: f32,
    ) -> bool {
        let Some(spec) = self.prototypes.projectile(prototype) else {
            warn!(prototype, "projectile prototype missing, spawn skipped");
            return false;
        };
        let mut spec = spec.clone();
        spec.speed *= speed_scale;
        let pool = self.registry.pool_with(Projectile::inert);
        let key = pool.spawn();
        if let Some(shot) = pool.get_mut(key) {
            shot.launch(&spec, origin, dir);
        }
        true
    }

    /// Places a pooled effect burst, optionally delayed
    pub fn place_burst(&mut self, prototype: &str, pos: Vec2, start_delay: f32) -> bool {
        let Some(spec) = self.prototypes.burst(prototype) else {
            warn!(prototype, "burst prototype missing, spawn skipped");
            return false;
        };
        let pool = self.registry.pool_with(EffectBurst::inert);
        let key = pool.spawn();
        if let Some(burst) = pool.get_mut(key) {
            burst.arm(spec, pos, start_delay);
        }
        true
    }

    /// Records damage against the target for the session to apply
    pub fn damage_target(&mut self, amount: i32) {
        self.effects.push(Effect::DamageTarget { amount });
    }

    /// Boss-target separation from `origin`
    pub fn distance_to_target(&self, origin: Vec2) -> f32 {
        origin.distance(&self.target.pos)
    }
}
