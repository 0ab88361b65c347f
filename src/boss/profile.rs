//! Behavior profiles
//!
//! A profile is the per-boss strategy layer on top of the shared state
//! machine: it picks openers, reacts to phase changes and frame events,
//! and drives the optional skill loop. The machine owns the lifecycle;
//! profiles only steer it through these hooks.

use rand_chacha::ChaCha8Rng;

use crate::boss::machine::BossBody;
use crate::boss::state::BossPhase;
use crate::core::types::Vec2;
use crate::pattern::NodeId;
use crate::scheduler::PatternScheduler;
use crate::session::ctx::SpawnCtx;

pub trait BossProfile {
    /// Picks the next pattern when an idle delay expires. The default is
    /// the distance-gated uniform pick over the pattern graph's openers.
    fn select_opener(&mut self, body: &mut BossBody, ctx: &mut SpawnCtx) -> Option<NodeId> {
        let distance = ctx.distance_to_target(body.pos);
        body.graph.select_opener(distance, &mut body.rng)
    }

    /// Called once when the boss becomes hostile, either when its intro
    /// timeline completes or when provocation resolves.
    fn on_hostile(
        &mut self,
        _body: &mut BossBody,
        _scheduler: &mut PatternScheduler,
        _ctx: &mut SpawnCtx,
    ) {
    }

    /// Called after the phase recomputes to a new value on damage.
    fn on_phase_changed(
        &mut self,
        _phase: BossPhase,
        _body: &mut BossBody,
        _scheduler: &mut PatternScheduler,
        _ctx: &mut SpawnCtx,
    ) {
    }

    /// Called for every named frame event the active timeline emits.
    fn on_frame_event(
        &mut self,
        _event: &str,
        _body: &mut BossBody,
        _scheduler: &mut PatternScheduler,
        _ctx: &mut SpawnCtx,
    ) {
    }

    /// Called on each skill loop expiry while the boss is alive and hostile.
    fn use_skill_pattern(&mut self, _body: &mut BossBody, _ctx: &mut SpawnCtx) {}

    /// Folds an encounter-wide difficulty multiplier into the profile's
    /// own rates. The machine has already scaled timeline playback.
    fn apply_difficulty(&mut self, _multiplier: f32, _body: &mut BossBody) {}

    /// Spawn position override; `None` falls back to the definition's.
    fn spawn_position(&mut self, _rng: &mut ChaCha8Rng) -> Option<Vec2> {
        None
    }
}

/// Profile with no behavior beyond the pattern graph. Data-only bosses
/// and most tests use this.
#[derive(Debug, Default)]
pub struct DefaultProfile;

impl BossProfile for DefaultProfile {}
