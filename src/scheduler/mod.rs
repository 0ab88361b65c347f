//! Environment pattern scheduler
//!
//! Periodic hazard spawners expressed as plain task objects: each holds
//! its owner, cadence, and a cancellation flag, and one tick function
//! drives them all. Tasks never end themselves; a boss's death or the
//! session's teardown cancels them, and removal happens at the next tick
//! boundary.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::types::{ActorId, Vec2};
use crate::session::ctx::SpawnCtx;
use crate::spawnable::ProjectileAim;

fn default_interval() -> f32 {
    3.0
}

fn default_enabled() -> bool {
    true
}

/// Spawn shape fired when a task comes due
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternKind {
    /// One burst at a uniformly random field point
    RandomPoint,
    /// One burst at the target position plus an offset
    TargetedOffset { offset: Vec2 },
    /// One or two lines of bursts stepping across the field, staggered
    /// by a per-bolt delay
    LinearSweep {
        bolt_count: u32,
        spacing: f32,
        bolt_delay: f32,
    },
    /// A projectile from the field-bounds circle; without a fixed aim it
    /// rolls 50/50 between targeting and straight inward
    EdgeShot {
        spawn_distance: f32,
        #[serde(default)]
        aim: Option<ProjectileAim>,
    },
}

/// A periodic hazard spawner definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentPattern {
    /// Prototype table entry the spawns resolve against
    pub prototype: String,
    #[serde(flatten)]
    pub shape: PatternKind,
    /// Seconds between spawns before speed scaling
    #[serde(default = "default_interval")]
    pub interval: f32,
    /// Whether the session starts this pattern when its boss turns hostile
    #[serde(default = "default_enabled")]
    pub enabled_in_session: bool,
}

/// Cancellation handle; unique for the scheduler's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct ScheduledTask {
    handle: TaskHandle,
    owner: ActorId,
    pattern: EnvironmentPattern,
    speed_multiplier: f32,
    next_fire_in: f32,
    cancelled: bool,
}

impl ScheduledTask {
    fn cadence(&self) -> f32 {
        self.pattern.interval / self.speed_multiplier
    }
}

#[derive(Debug)]
pub struct PatternScheduler {
    tasks: Vec<ScheduledTask>,
    next_handle: u64,
    initial_delay: f32,
}

impl Default for PatternScheduler {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PatternScheduler {
    pub fn new(initial_delay: f32) -> Self {
        Self {
            tasks: Vec::new(),
            next_handle: 0,
            initial_delay: initial_delay.max(0.0),
        }
    }

    /// Registers a repeating task; the first spawn waits the scheduler's
    /// initial delay, later ones follow `interval / speed_multiplier`.
    pub fn schedule(
        &mut self,
        owner: ActorId,
        pattern: EnvironmentPattern,
        speed_multiplier: f32,
    ) -> TaskHandle {
        let speed = if speed_multiplier > 0.0 {
            speed_multiplier
        } else {
            warn!(%owner, speed_multiplier, "non-positive task speed clamped to 1");
            1.0
        };

        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        debug!(%owner, ?handle, pattern = %pattern.prototype, "pattern task scheduled");
        self.tasks.push(ScheduledTask {
            handle,
            owner,
            pattern,
            speed_multiplier: speed,
            next_fire_in: self.initial_delay,
            cancelled: false,
        });
        handle
    }

    /// Marks one task cancelled; unknown or dead handles are a no-op
    pub fn cancel(&mut self, handle: TaskHandle) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.handle == handle) {
            task.cancelled = true;
        }
    }

    /// Cancels every task belonging to `owner`
    pub fn cancel_owned_by(&mut self, owner: ActorId) {
        for task in self.tasks.iter_mut().filter(|t| t.owner == owner) {
            task.cancelled = true;
        }
    }

    pub fn cancel_all(&mut self) {
        for task in &mut self.tasks {
            task.cancelled = true;
        }
    }

    /// Live (not yet cancelled) task count
    pub fn live_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| !t.cancelled).count()
    }

    /// Advances every task; due tasks spawn and re-arm
    ///
    /// Cancelled tasks are removed here, at the tick boundary, so a task
    /// cancelled mid-tick never fires again. A task fires at most once
    /// per tick regardless of dt.
    pub fn tick(&mut self, dt: f32, ctx: &mut SpawnCtx) {
        self.tasks.retain(|t| !t.cancelled);

        for index in 0..self.tasks.len() {
            let task = &mut self.tasks[index];
            task.next_fire_in -= dt;
            if task.next_fire_in > 0.0 {
                continue;
            }
            task.next_fire_in = task.cadence();
            Self::fire(&self.tasks[index].pattern, ctx);
        }
    }

    fn fire(pattern: &EnvironmentPattern, ctx: &mut SpawnCtx) {
        use rand::Rng;

        match &pattern.shape {
            PatternKind::RandomPoint => {
                let pos = Vec2::new(
                    ctx.rng.gen_range(-ctx.bounds.half_width..=ctx.bounds.half_width),
                    ctx.rng.gen_range(-ctx.bounds.half_height..=ctx.bounds.half_height),
                );
                ctx.place_burst(&pattern.prototype, pos, 0.0);
            }
            PatternKind::TargetedOffset { offset } => {
                let pos = ctx.target.pos + *offset;
                ctx.place_burst(&pattern.prototype, pos, 0.0);
            }
            PatternKind::LinearSweep { bolt_count, spacing, bolt_delay } => {
                let lines = ctx.rng.gen_range(1..=2);
                for _ in 0..lines {
                    let side = ctx.rng.gen_range(0..4u8);
                    Self::sweep_line(pattern, side, *bolt_count, *spacing, *bolt_delay, ctx);
                }
            }
            PatternKind::EdgeShot { spawn_distance, aim } => {
                let angle = ctx.rng.gen_range(0.0..std::f32::consts::TAU);
                let origin = Vec2::new(angle.cos(), angle.sin()) * *spawn_distance;
                let aim = aim.unwrap_or_else(|| {
                    if ctx.rng.gen_bool(0.5) {
                        ProjectileAim::Targeting
                    } else {
                        ProjectileAim::Straight
                    }
                });
                match aim {
                    ProjectileAim::Targeting => {
                        ctx.fire_at_target(&pattern.prototype, origin);
                    }
                    ProjectileAim::Straight => {
                        // Straight shots head for the field center
                        ctx.fire_along(&pattern.prototype, origin, Vec2::ZERO - origin);
                    }
                }
            }
        }
    }

    /// One sweep line: bolts step across the field from the rolled side,
    /// each detonating `bolt_delay` after the previous
    fn sweep_line(
        pattern: &EnvironmentPattern,
        side: u8,
        bolt_count: u32,
        spacing: f32,
        bolt_delay: f32,
        ctx: &mut SpawnCtx,
    ) {
        let target = ctx.target.pos;
        let bounds = ctx.bounds;
        for i in 0..bolt_count {
            let step = (i as f32 + 0.5) * spacing;
            let pos = match side {
                0 => Vec2::new(-bounds.half_width + step, target.y),
                1 => Vec2::new(bounds.half_width - step, target.y),
                2 => Vec2::new(target.x, -bounds.half_height + step),
                _ => Vec2::new(target.x, bounds.half_height - step),
            };
            if !bounds.contains(pos) {
                continue;
            }
            ctx.place_burst(&pattern.prototype, pos, i as f32 * bolt_delay);
        }
    }
}
