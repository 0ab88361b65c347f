//! Projectile artillery profile
//!
//! No melee at all: a skill loop fires shard volleys whose shape widens
//! with the phase, and a scheduler task rains shards in from the field
//! edge at a phase-driven cadence. Difficulty divides both cadences and
//! scales shard flight speed.

use tracing::debug;

use crate::boss::machine::BossBody;
use crate::boss::profile::BossProfile;
use crate::boss::state::{BossPhase, Mode};
use crate::core::types::Vec2;
use crate::scheduler::{EnvironmentPattern, PatternKind, PatternScheduler, TaskHandle};
use crate::session::ctx::SpawnCtx;

pub struct NullShardProfile {
    shard_prototype: String,
    /// Seconds between volleys, per phase
    volley_rates: [f32; 3],
    /// Seconds between edge shards, per phase
    edge_rates: [f32; 3],
    spread_step_deg: f32,
    pair_offset: f32,
    edge_distance: f32,
    difficulty: f32,
    edge_task: Option<TaskHandle>,
}

impl NullShardProfile {
    pub fn with_defaults() -> Self {
        Self {
            shard_prototype: "shard".to_string(),
            volley_rates: [2.5, 1.75, 1.0],
            edge_rates: [3.5, 2.5, 1.25],
            spread_step_deg: 15.0,
            pair_offset: 0.5,
            edge_distance: 10.0,
            difficulty: 1.0,
            edge_task: None,
        }
    }

    fn phase_index(phase: BossPhase) -> usize {
        match phase {
            BossPhase::Phase1 => 0,
            BossPhase::Phase2 => 1,
            BossPhase::Phase3 => 2,
        }
    }

    fn volley_rate(&self, phase: BossPhase) -> f32 {
        self.volley_rates[Self::phase_index(phase)] / self.difficulty
    }

    fn edge_rate(&self, phase: BossPhase) -> f32 {
        self.edge_rates[Self::phase_index(phase)] / self.difficulty
    }

    /// Replaces the running edge-rain task with one at the phase cadence
    fn reschedule_edge_rain(&mut self, body: &BossBody, scheduler: &mut PatternScheduler) {
        if let Some(handle) = self.edge_task.take() {
            scheduler.cancel(handle);
        }
        let pattern = EnvironmentPattern {
            prototype: self.shard_prototype.clone(),
            shape: PatternKind::EdgeShot {
                spawn_distance: self.edge_distance,
                aim: None,
            },
            interval: self.edge_rate(body.phase),
            enabled_in_session: true,
        };
        self.edge_task = Some(scheduler.schedule(body.id, pattern, 1.0));
        debug!(boss = %body.name, phase = ?body.phase, "edge rain rescheduled");
    }
}

impl BossProfile for NullShardProfile {
    fn on_hostile(
        &mut self,
        body: &mut BossBody,
        scheduler: &mut PatternScheduler,
        _ctx: &mut SpawnCtx,
    ) {
        body.set_skill_loop(self.volley_rate(body.phase));
        self.reschedule_edge_rain(body, scheduler);
    }

    fn on_phase_changed(
        &mut self,
        phase: BossPhase,
        body: &mut BossBody,
        scheduler: &mut PatternScheduler,
        _ctx: &mut SpawnCtx,
    ) {
        body.set_skill_loop(self.volley_rate(phase));
        self.reschedule_edge_rain(body, scheduler);
    }

    fn use_skill_pattern(&mut self, body: &mut BossBody, ctx: &mut SpawnCtx) {
        let origin = body.pos;
        let aim = ctx.target.pos - origin;
        match body.phase {
            BossPhase::Phase1 => {
                ctx.fire_scaled(&self.shard_prototype, origin, aim, self.difficulty);
            }
            BossPhase::Phase2 => {
                // parallel pair straddling the aim line
                let dir = aim.normalize();
                let perp = Vec2::new(-dir.y, dir.x);
                for side in [-1.0f32, 1.0] {
                    let muzzle = origin + perp * (self.pair_offset * side);
                    ctx.fire_scaled(&self.shard_prototype, muzzle, dir, self.difficulty);
                }
            }
            BossPhase::Phase3 => {
                // five-shot fan centered on the target
                let base = aim.y.atan2(aim.x);
                for step in -2..=2i32 {
                    let angle = base + step as f32 * self.spread_step_deg.to_radians();
                    let dir = Vec2::new(angle.cos(), angle.sin());
                    ctx.fire_scaled(&self.shard_prototype, origin, dir, self.difficulty);
                }
            }
        }
    }

    fn apply_difficulty(&mut self, multiplier: f32, body: &mut BossBody) {
        self.difficulty *= multiplier;
        // live cadences pick the new rate up on the next (re)arm; a boss
        // buffed mid-fight re-arms here
        if body.mode == Mode::Hostile && body.is_alive() {
            body.set_skill_loop(self.volley_rate(body.phase));
        }
    }
}
