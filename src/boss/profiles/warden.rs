//! Arena controller profile
//!
//! Fights from range by claiming space. Frame events summon pooled
//! hazards: sweeping waves from the field edge on the target's side, and
//! lightning bursts whose shape escalates with the phase, from a single
//! targeted bolt to diagonal lines to closing rings.

use std::f32::consts::TAU;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::boss::machine::BossBody;
use crate::boss::profile::BossProfile;
use crate::boss::state::BossPhase;
use crate::core::types::Vec2;
use crate::pattern::NodeId;
use crate::scheduler::PatternScheduler;
use crate::session::ctx::SpawnCtx;

pub struct WardenProfile {
    wave_prototype: String,
    bolt_prototype: String,
    /// Half-screen mark where waves materialize
    wave_x: f32,
    /// Share of opener picks going to the first listed opener; the rest
    /// split uniformly
    opener_bias: f32,
    ring_radius_step: f32,
    ring_bolts: usize,
    ring_waves: usize,
    ring_delay: f32,
    diagonal_spacing: f32,
    spawn_x: f32,
}

impl WardenProfile {
    pub fn with_defaults() -> Self {
        Self {
            wave_prototype: "sword_wave".to_string(),
            bolt_prototype: "lightning".to_string(),
            wave_x: 4.0,
            opener_bias: 0.625,
            ring_radius_step: 2.5,
            ring_bolts: 8,
            ring_waves: 3,
            ring_delay: 0.25,
            diagonal_spacing: 2.0,
            spawn_x: 9.0,
        }
    }

    /// Wave rises at the half-screen mark on the target's side
    fn summon_wave(&self, ctx: &mut SpawnCtx) {
        let x = if ctx.target.pos.x >= 0.0 { self.wave_x } else { -self.wave_x };
        let pos = Vec2::new(x, ctx.target.pos.y);
        ctx.place_burst(&self.wave_prototype, pos, 0.0);
    }

    fn summon_lightning(&self, phase: BossPhase, ctx: &mut SpawnCtx) {
        let target = ctx.target.pos;
        match phase {
            BossPhase::Phase1 => {
                ctx.place_burst(&self.bolt_prototype, target, 0.0);
            }
            BossPhase::Phase2 => {
                // two diagonal lines marching away from the target
                for layer in 0..2i32 {
                    for dir in [-1.0f32, 1.0] {
                        let offset = Vec2::new(
                            dir * self.diagonal_spacing * (layer + 1) as f32,
                            self.diagonal_spacing * layer as f32,
                        );
                        ctx.place_burst(
                            &self.bolt_prototype,
                            target + offset,
                            0.1 * layer as f32,
                        );
                    }
                }
            }
            BossPhase::Phase3 => {
                // rings closing in around the target, one wave at a time
                for wave in 0..self.ring_waves {
                    let radius = self.ring_radius_step * (self.ring_waves - wave) as f32;
                    let delay = self.ring_delay * wave as f32;
                    for i in 0..self.ring_bolts {
                        let angle = TAU * i as f32 / self.ring_bolts as f32;
                        let pos = target + Vec2::new(angle.cos(), angle.sin()) * radius;
                        ctx.place_burst(&self.bolt_prototype, pos, delay);
                    }
                }
            }
        }
    }
}

impl BossProfile for WardenProfile {
    fn select_opener(&mut self, body: &mut BossBody, ctx: &mut SpawnCtx) -> Option<NodeId> {
        let distance = ctx.distance_to_target(body.pos);
        let candidates = body.graph.openers_in_range(distance);
        match candidates.len() {
            0 => None,
            1 => Some(candidates[0]),
            n => {
                let roll: f32 = body.rng.gen();
                if roll < self.opener_bias {
                    Some(candidates[0])
                } else {
                    Some(candidates[body.rng.gen_range(1..n)])
                }
            }
        }
    }

    fn on_frame_event(
        &mut self,
        event: &str,
        body: &mut BossBody,
        _scheduler: &mut PatternScheduler,
        ctx: &mut SpawnCtx,
    ) {
        match event {
            "summon_wave" => self.summon_wave(ctx),
            "summon_lightning" => self.summon_lightning(body.phase, ctx),
            _ => {}
        }
    }

    fn spawn_position(&mut self, rng: &mut ChaCha8Rng) -> Option<Vec2> {
        let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        Some(Vec2::new(self.spawn_x * side, 0.0))
    }
}
