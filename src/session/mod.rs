//! Combat session orchestration
//!
//! One session owns everything a fight needs: the boss machines, the
//! pattern scheduler, the spawn pools, the prototype table, the target's
//! state and the event log. The embedding loop calls [`CombatSession::tick`]
//! with wall-clock deltas and drains events; nothing in here runs its
//! own thread.
//!
//! Tick order is fixed: bosses act, newly actionable bosses start their
//! environment tasks, scheduled tasks fire, projectiles fly, bursts
//! resolve, deferred damage lands, finished bosses are torn down.

pub mod ctx;

pub use ctx::{Effect, SpawnCtx, TargetView};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::boss::events::{EncounterEvent, EncounterEventKind, EncounterLog};
use crate::boss::machine::BossMachine;
use crate::core::config::SessionConfig;
use crate::core::error::{EncounterError, Result};
use crate::core::types::{ActorId, RewardId, Vec2};
use crate::pool::PoolRegistry;
use crate::scheduler::{EnvironmentPattern, PatternScheduler};
use crate::spawnable::{EffectBurst, Projectile, ProjectileOutcome, PrototypeTable};

/// The single thing every boss is trying to destroy
#[derive(Debug, Clone)]
pub struct TargetState {
    pub pos: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
}

impl TargetState {
    pub fn new(pos: Vec2, max_health: i32) -> Self {
        Self {
            pos,
            health: max_health,
            max_health,
            alive: max_health > 0,
        }
    }

    fn view(&self) -> TargetView {
        TargetView {
            pos: self.pos,
            alive: self.alive,
        }
    }
}

struct BossSlot {
    machine: BossMachine,
    environment: Vec<EnvironmentPattern>,
    tasks_started: bool,
}

pub struct CombatSession {
    config: SessionConfig,
    slots: Vec<BossSlot>,
    registry: PoolRegistry,
    scheduler: PatternScheduler,
    prototypes: PrototypeTable,
    target: TargetState,
    log: EncounterLog,
    rng: ChaCha8Rng,
    elapsed: f32,
    rewards: Vec<RewardId>,
}

impl CombatSession {
    pub fn new(
        config: SessionConfig,
        prototypes: PrototypeTable,
        target: TargetState,
        seed: u64,
    ) -> Self {
        let scheduler = PatternScheduler::new(config.task_initial_delay);
        Self {
            config,
            slots: Vec::new(),
            registry: PoolRegistry::new(),
            scheduler,
            prototypes,
            target,
            log: EncounterLog::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            elapsed: 0.0,
            rewards: Vec::new(),
        }
    }

    /// Adds a boss that opens with its intro sequence already hostile.
    /// Environment tasks start once the intro completes.
    pub fn spawn_hostile(
        &mut self,
        mut machine: BossMachine,
        environment: Vec<EnvironmentPattern>,
        spawn_pos: Vec2,
    ) -> ActorId {
        machine.body.pos = spawn_pos;
        let id = machine.id();
        info!(boss = %machine.body.name, %id, "boss spawned hostile");
        let mut effects = Vec::new();
        {
            let mut ctx = SpawnCtx {
                now: self.elapsed,
                bounds: self.config.bounds,
                target: self.target.view(),
                registry: &mut self.registry,
                prototypes: &self.prototypes,
                effects: &mut effects,
                log: &mut self.log,
                rng: &mut self.rng,
            };
            machine.enter_intro(&mut self.scheduler, &mut ctx);
        }
        self.slots.push(BossSlot {
            machine,
            environment,
            tasks_started: false,
        });
        self.apply_effects(effects);
        id
    }

    /// Adds a boss that idles passively until damaged
    pub fn spawn_passive(
        &mut self,
        mut machine: BossMachine,
        environment: Vec<EnvironmentPattern>,
        spawn_pos: Vec2,
    ) -> ActorId {
        machine.body.pos = spawn_pos;
        let id = machine.id();
        info!(boss = %machine.body.name, %id, "boss spawned passive");
        let mut effects = Vec::new();
        {
            let mut ctx = SpawnCtx {
                now: self.elapsed,
                bounds: self.config.bounds,
                target: self.target.view(),
                registry: &mut self.registry,
                prototypes: &self.prototypes,
                effects: &mut effects,
                log: &mut self.log,
                rng: &mut self.rng,
            };
            machine.init_passive(&mut ctx);
        }
        self.slots.push(BossSlot {
            machine,
            environment,
            tasks_started: false,
        });
        self.apply_effects(effects);
        id
    }

    /// Routes damage to a boss. Unknown ids are an error; everything the
    /// hit triggers (phase volleys, death teardown) happens before this
    /// returns.
    pub fn hit_boss(&mut self, id: ActorId, amount: i32) -> Result<()> {
        let Some(index) = self.slots.iter().position(|s| s.machine.id() == id) else {
            return Err(EncounterError::BossNotFound(id));
        };
        let mut effects = Vec::new();
        {
            let mut ctx = SpawnCtx {
                now: self.elapsed,
                bounds: self.config.bounds,
                target: self.target.view(),
                registry: &mut self.registry,
                prototypes: &self.prototypes,
                effects: &mut effects,
                log: &mut self.log,
                rng: &mut self.rng,
            };
            self.slots[index]
                .machine
                .on_hit(amount, &mut self.scheduler, &mut ctx);
        }
        self.apply_effects(effects);
        Ok(())
    }

    /// Advances the whole session by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
        let mut effects: Vec<Effect> = Vec::new();

        // ===== PHASE 1: BOSSES =====
        for slot in &mut self.slots {
            let mut ctx = SpawnCtx {
                now: self.elapsed,
                bounds: self.config.bounds,
                target: self.target.view(),
                registry: &mut self.registry,
                prototypes: &self.prototypes,
                effects: &mut effects,
                log: &mut self.log,
                rng: &mut self.rng,
            };
            slot.machine.tick(dt, &mut self.scheduler, &mut ctx);
        }

        // ===== PHASE 2: ENVIRONMENT TASK START =====
        for slot in &mut self.slots {
            if slot.tasks_started || !slot.machine.in_combat() {
                continue;
            }
            slot.tasks_started = true;
            for pattern in &slot.environment {
                if pattern.enabled_in_session {
                    self.scheduler.schedule(
                        slot.machine.id(),
                        pattern.clone(),
                        self.config.speed_multiplier,
                    );
                }
            }
        }

        // ===== PHASE 3: SCHEDULED TASKS =====
        {
            let mut ctx = SpawnCtx {
                now: self.elapsed,
                bounds: self.config.bounds,
                target: self.target.view(),
                registry: &mut self.registry,
                prototypes: &self.prototypes,
                effects: &mut effects,
                log: &mut self.log,
                rng: &mut self.rng,
            };
            self.scheduler.tick(dt, &mut ctx);
        }

        // ===== PHASE 4: PROJECTILES =====
        if let Some(pool) = self.registry.pool::<Projectile>() {
            for key in pool.active_keys() {
                let Some(shot) = pool.get_mut(key) else { continue };
                match shot.advance(dt, self.config.bounds, self.target.pos, self.target.alive) {
                    ProjectileOutcome::Flying => {}
                    ProjectileOutcome::HitTarget { damage } => {
                        effects.push(Effect::DamageTarget { amount: damage });
                        pool.release(key);
                    }
                    ProjectileOutcome::Expired => {
                        pool.release(key);
                    }
                }
            }
        }

        // ===== PHASE 5: BURSTS =====
        if let Some(pool) = self.registry.pool::<EffectBurst>() {
            for key in pool.active_keys() {
                let Some(burst) = pool.get_mut(key) else { continue };
                let result = burst.advance(dt);
                if let Some(strike) = result.strike {
                    if self.target.alive
                        && strike.center.distance(&self.target.pos) <= strike.radius
                    {
                        effects.push(Effect::DamageTarget {
                            amount: strike.damage,
                        });
                    }
                }
                if result.finished {
                    pool.release(key);
                }
            }
        }

        // ===== PHASE 6: DEFERRED DAMAGE =====
        self.apply_effects(effects);

        // ===== PHASE 7: TEARDOWN =====
        self.teardown_finished();
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::DamageTarget { amount } => self.damage_target(amount),
            }
        }
    }

    fn damage_target(&mut self, amount: i32) {
        if !self.target.alive {
            return;
        }
        self.target.health = (self.target.health - amount).max(0);
        self.log.push(
            EncounterEventKind::TargetDamaged {
                amount,
                health: self.target.health,
            },
            format!("target took {} damage ({} left)", amount, self.target.health),
            self.elapsed,
        );
        if self.target.health == 0 {
            self.target.alive = false;
            self.log
                .push(EncounterEventKind::TargetDown, "target down".to_string(), self.elapsed);
        }
    }

    fn teardown_finished(&mut self) {
        for slot in &mut self.slots {
            if !slot.machine.is_finished() {
                continue;
            }
            let id = slot.machine.id();
            self.scheduler.cancel_owned_by(id);
            let rewards = std::mem::take(&mut slot.machine.body.unlocks);
            if !rewards.is_empty() {
                self.log.push(
                    EncounterEventKind::RewardsGranted {
                        boss: id,
                        rewards: rewards.clone(),
                    },
                    format!("{} dropped {} reward(s)", slot.machine.body.name, rewards.len()),
                    self.elapsed,
                );
                self.rewards.extend(rewards);
            }
            debug!(%id, "boss torn down");
        }
        self.slots.retain(|slot| !slot.machine.is_finished());
    }

    /// Scales every live boss and future task cadence by `multiplier`
    pub fn apply_difficulty(&mut self, multiplier: f32) {
        if multiplier <= 0.0 {
            return;
        }
        self.config.speed_multiplier *= multiplier;
        for slot in &mut self.slots {
            slot.machine.apply_difficulty(multiplier);
        }
    }

    /// Cancels every task and recycles every pooled spawnable. The
    /// session stays usable; bosses keep their state.
    pub fn stop(&mut self) {
        self.scheduler.cancel_all();
        self.registry.clear_all_pools();
    }

    pub fn move_target(&mut self, pos: Vec2) {
        self.target.pos = pos;
    }

    pub fn target(&self) -> &TargetState {
        &self.target
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn boss(&self, id: ActorId) -> Option<&BossMachine> {
        self.slots
            .iter()
            .map(|s| &s.machine)
            .find(|m| m.id() == id)
    }

    pub fn boss_ids(&self) -> Vec<ActorId> {
        self.slots.iter().map(|s| s.machine.id()).collect()
    }

    pub fn bosses_alive(&self) -> usize {
        self.slots.iter().filter(|s| s.machine.is_alive()).count()
    }

    pub fn scheduled_tasks(&self) -> usize {
        self.scheduler.live_tasks()
    }

    pub fn rewards(&self) -> &[RewardId] {
        &self.rewards
    }

    pub fn events(&self) -> &[EncounterEvent] {
        self.log.events()
    }

    /// Hands the accumulated events to the caller and clears the log
    pub fn drain_events(&mut self) -> Vec<EncounterEvent> {
        self.log.drain()
    }

    pub fn registry_mut(&mut self) -> &mut PoolRegistry {
        &mut self.registry
    }
}
