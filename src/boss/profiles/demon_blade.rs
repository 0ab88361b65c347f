//! Melee duelist profile
//!
//! Runs close-range pattern chains. Frame events drive the danger:
//! strike events run rectangular hit checks mirrored by facing, and a
//! blink event closes the gap mid-combo.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::boss::machine::BossBody;
use crate::boss::profile::BossProfile;
use crate::core::types::{Facing, Vec2};
use crate::scheduler::PatternScheduler;
use crate::session::ctx::SpawnCtx;

/// Facing-relative rectangular hit volume
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hitbox {
    /// Center offset from the boss, authored for a right-facing boss
    pub offset: Vec2,
    pub size: Vec2,
    pub damage: i32,
}

impl Hitbox {
    pub fn contains(&self, origin: Vec2, facing: Facing, point: Vec2) -> bool {
        let center = origin + facing.mirror(self.offset);
        (point.x - center.x).abs() <= self.size.x * 0.5
            && (point.y - center.y).abs() <= self.size.y * 0.5
    }
}

pub struct DemonBladeProfile {
    strikes: AHashMap<String, Hitbox>,
    blink_range: f32,
}

impl DemonBladeProfile {
    pub fn new(strikes: AHashMap<String, Hitbox>, blink_range: f32) -> Self {
        Self { strikes, blink_range }
    }

    pub fn with_defaults() -> Self {
        let mut strikes = AHashMap::new();
        strikes.insert(
            "strike_quick".to_string(),
            Hitbox { offset: Vec2::new(1.1, 0.0), size: Vec2::new(1.8, 1.2), damage: 8 },
        );
        strikes.insert(
            "strike_heavy".to_string(),
            Hitbox { offset: Vec2::new(1.4, 0.0), size: Vec2::new(2.2, 1.6), damage: 12 },
        );
        strikes.insert(
            "strike_spin".to_string(),
            Hitbox { offset: Vec2::ZERO, size: Vec2::new(3.0, 2.0), damage: 10 },
        );
        strikes.insert(
            "strike_lunge".to_string(),
            Hitbox { offset: Vec2::new(1.8, 0.0), size: Vec2::new(2.6, 1.2), damage: 14 },
        );
        Self::new(strikes, 5.0)
    }

    /// Short-range teleport toward the target: lands on it when it is
    /// ahead and in reach, otherwise covers the full blink range.
    fn blink(&self, body: &mut BossBody, ctx: &mut SpawnCtx) {
        let to_target = ctx.target.pos - body.pos;
        let ahead = Vec2::new(body.facing.sign(), 0.0).dot(&to_target) > 0.0;
        body.pos = if ahead && to_target.length() <= self.blink_range {
            ctx.target.pos
        } else {
            body.pos + to_target.normalize() * self.blink_range
        };
        body.facing = Facing::toward(body.pos, ctx.target.pos);
    }
}

impl BossProfile for DemonBladeProfile {
    fn on_frame_event(
        &mut self,
        event: &str,
        body: &mut BossBody,
        _scheduler: &mut PatternScheduler,
        ctx: &mut SpawnCtx,
    ) {
        if event == "blink" {
            self.blink(body, ctx);
            return;
        }
        if let Some(hitbox) = self.strikes.get(event) {
            if ctx.target.alive && hitbox.contains(body.pos, body.facing, ctx.target.pos) {
                ctx.damage_target(hitbox.damage);
            }
        }
    }
}
