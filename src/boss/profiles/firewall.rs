//! Crush-wall cage profile
//!
//! A stationary boss flanking the arena with two vertical walls. Its
//! patterns run entirely through frame events: a crush slams both walls
//! inward and catches anything left in the swept band, a barrage fires
//! paired bullets from both walls, and a scan sweep fires from each wall
//! on an independent chance roll. Hits on either wall count against the
//! one shared health pool.

use rand::Rng;

use crate::boss::machine::BossBody;
use crate::boss::profile::BossProfile;
use crate::core::types::Vec2;
use crate::scheduler::PatternScheduler;
use crate::session::ctx::SpawnCtx;

pub struct FirewallProfile {
    bullet_prototype: String,
    /// Resting wall offset from the boss center
    open_width: f32,
    /// Wall offset at the bottom of a crush; the safe lane
    crush_width: f32,
    /// Bullets leave a wall at a random height within this band
    wall_half_height: f32,
    crush_damage: i32,
    /// Per-wall chance that a scan frame actually fires
    scan_chance: f32,
    difficulty: f32,
}

impl FirewallProfile {
    pub fn with_defaults() -> Self {
        Self {
            bullet_prototype: "wall_bullet".to_string(),
            open_width: 8.0,
            crush_width: 2.5,
            wall_half_height: 4.0,
            crush_damage: 15,
            scan_chance: 0.3,
            difficulty: 1.0,
        }
    }

    /// One bullet from the wall on `side`, flying inward
    fn fire_from_wall(&self, side: f32, body: &mut BossBody, ctx: &mut SpawnCtx) {
        let y = body.pos.y
            + body.rng.gen_range(-self.wall_half_height..=self.wall_half_height);
        let origin = Vec2::new(body.pos.x + self.open_width * side, y);
        let inward = Vec2::new(-side, 0.0);
        ctx.fire_scaled(&self.bullet_prototype, origin, inward, self.difficulty);
    }

    /// The crush has swept both walls from `open_width` in to
    /// `crush_width`; anything inside the swept band is caught. The
    /// center lane stays safe.
    fn crush(&self, body: &BossBody, ctx: &mut SpawnCtx) {
        if !ctx.target.alive {
            return;
        }
        let dx = (ctx.target.pos.x - body.pos.x).abs();
        if dx > self.crush_width && dx <= self.open_width {
            ctx.damage_target(self.crush_damage);
        }
    }
}

impl BossProfile for FirewallProfile {
    fn on_frame_event(
        &mut self,
        event: &str,
        body: &mut BossBody,
        _scheduler: &mut PatternScheduler,
        ctx: &mut SpawnCtx,
    ) {
        match event {
            "crush" => self.crush(body, ctx),
            "volley" => {
                for side in [-1.0f32, 1.0] {
                    self.fire_from_wall(side, body, ctx);
                }
            }
            "scan_shot" => {
                for side in [-1.0f32, 1.0] {
                    if body.rng.gen::<f32>() < self.scan_chance {
                        self.fire_from_wall(side, body, ctx);
                    }
                }
            }
            _ => {}
        }
    }

    fn apply_difficulty(&mut self, multiplier: f32, _body: &mut BossBody) {
        self.difficulty *= multiplier;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boss::catalog::TimelineCatalog;
    use crate::boss::events::EncounterLog;
    use crate::boss::machine::BossMachine;
    use crate::boss::profile::DefaultProfile;
    use crate::core::config::BossTuning;
    use crate::core::types::FieldBounds;
    use crate::pattern::PatternGraph;
    use crate::pool::PoolRegistry;
    use crate::session::ctx::{Effect, TargetView};
    use crate::spawnable::{Projectile, ProjectileSpec, PrototypeTable, SpawnPrototype};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn bullet_table() -> PrototypeTable {
        let mut table = PrototypeTable::new();
        table.insert(
            "wall_bullet",
            SpawnPrototype::Projectile(ProjectileSpec::new(6.0, 3)),
        );
        table
    }

    fn wall_body() -> BossBody {
        let machine = BossMachine::new(
            "firewall_test",
            BossTuning::default(),
            TimelineCatalog::new(),
            PatternGraph::empty(),
            Vec::new(),
            Box::new(DefaultProfile),
            ChaCha8Rng::seed_from_u64(21),
        );
        machine.body
    }

    struct Parts {
        registry: PoolRegistry,
        prototypes: PrototypeTable,
        effects: Vec<Effect>,
        log: EncounterLog,
        rng: ChaCha8Rng,
        target: Vec2,
    }

    impl Parts {
        fn at(target: Vec2) -> Self {
            Self {
                registry: PoolRegistry::new(),
                prototypes: bullet_table(),
                effects: Vec::new(),
                log: EncounterLog::new(),
                rng: ChaCha8Rng::seed_from_u64(0),
                target,
            }
        }

        fn ctx(&mut self) -> SpawnCtx<'_> {
            SpawnCtx {
                now: 0.0,
                bounds: FieldBounds::default(),
                target: TargetView { pos: self.target, alive: true },
                registry: &mut self.registry,
                prototypes: &self.prototypes,
                effects: &mut self.effects,
                log: &mut self.log,
                rng: &mut self.rng,
            }
        }
    }

    fn raise(profile: &mut FirewallProfile, event: &str, body: &mut BossBody, parts: &mut Parts) {
        let mut scheduler = PatternScheduler::new(1.0);
        let mut ctx = parts.ctx();
        profile.on_frame_event(event, body, &mut scheduler, &mut ctx);
    }

    #[test]
    fn test_crush_catches_target_in_swept_band() {
        let mut profile = FirewallProfile::with_defaults();
        let mut body = wall_body();

        let mut caught = Parts::at(Vec2::new(5.0, 0.0));
        raise(&mut profile, "crush", &mut body, &mut caught);
        assert_eq!(caught.effects, vec![Effect::DamageTarget { amount: 15 }]);
    }

    #[test]
    fn test_crush_spares_center_lane_and_outside() {
        let mut profile = FirewallProfile::with_defaults();
        let mut body = wall_body();

        // Inside the safe lane
        let mut safe = Parts::at(Vec2::new(1.0, 0.0));
        raise(&mut profile, "crush", &mut body, &mut safe);
        assert!(safe.effects.is_empty());

        // Beyond the walls entirely
        let mut outside = Parts::at(Vec2::new(9.5, 0.0));
        raise(&mut profile, "crush", &mut body, &mut outside);
        assert!(outside.effects.is_empty());
    }

    #[test]
    fn test_volley_fires_from_both_walls() {
        let mut profile = FirewallProfile::with_defaults();
        let mut body = wall_body();
        let mut parts = Parts::at(Vec2::ZERO);

        raise(&mut profile, "volley", &mut body, &mut parts);
        let pool = parts.registry.pool::<Projectile>().unwrap();
        assert_eq!(pool.active_len(), 2);
        let xs: Vec<f32> = pool.iter_active_mut().map(|(_, p)| p.pos.x).collect();
        assert!(xs.contains(&-8.0) && xs.contains(&8.0));
    }

    #[test]
    fn test_scan_fires_at_the_configured_rate() {
        let mut profile = FirewallProfile::with_defaults();
        let mut body = wall_body();
        let mut parts = Parts::at(Vec2::ZERO);

        for _ in 0..200 {
            raise(&mut profile, "scan_shot", &mut body, &mut parts);
        }
        // 400 per-wall rolls at 0.3 each
        let fired = parts.registry.pool::<Projectile>().unwrap().active_len();
        assert!((80..=160).contains(&fired), "fired {}", fired);
    }
}
