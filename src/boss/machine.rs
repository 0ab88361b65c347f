//! Boss state machine
//!
//! One machine per boss instance. The machine owns the lifecycle: state
//! transitions gated by the timeline catalog, the idle decision timer,
//! chase and entry movement, the provocation countdown, the skill loop
//! and death teardown. Per-variant behavior lives behind the
//! [`BossProfile`] hooks so the lifecycle code is written once.
//!
//! Failure philosophy throughout is degrade, never abort: a state with
//! no mapped timeline rejects the transition and logs, a missing pattern
//! node falls back to idle, and the fight keeps running.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::boss::catalog::TimelineCatalog;
use crate::boss::events::EncounterEventKind;
use crate::boss::profile::BossProfile;
use crate::boss::state::{BossPhase, BossState, Mode};
use crate::core::config::BossTuning;
use crate::core::types::{ActorId, Facing, RewardId, Vec2};
use crate::pattern::{NodeId, PatternGraph};
use crate::scheduler::PatternScheduler;
use crate::session::ctx::SpawnCtx;
use crate::timeline::{TimelineEvent, TimelinePlayer};

/// Scripted movement that runs alongside the active timeline
#[derive(Debug, Clone, Copy)]
enum Motion {
    /// Close on the target until in attack range or the window runs out
    Chase { remaining: f32 },
    /// Walk to a fixed point, used for intros and teleport returns
    Entry { to: Vec2 },
}

#[derive(Debug, Clone, Copy)]
struct SkillLoop {
    interval: f32,
    remaining: f32,
}

/// Everything about a boss except its strategy.
///
/// Split out from [`BossMachine`] so profile hooks can mutate the boss
/// while the machine still holds the profile itself.
pub struct BossBody {
    pub id: ActorId,
    pub name: String,
    pub tuning: BossTuning,
    pub catalog: TimelineCatalog,
    pub graph: PatternGraph,
    pub player: TimelinePlayer,
    pub rng: ChaCha8Rng,
    pub pos: Vec2,
    pub facing: Facing,
    pub mode: Mode,
    pub phase: BossPhase,
    pub state: BossState,
    pub health: i32,
    pub unlocks: Vec<RewardId>,
    combo_count: u32,
    current_node: Option<NodeId>,
    idle_timer: Option<f32>,
    invincible_for: f32,
    provoking: Option<f32>,
    skill_loop: Option<SkillLoop>,
    motion: Option<Motion>,
    in_transition: bool,
    alive: bool,
    finished: bool,
    combat_started: bool,
}

impl BossBody {
    fn new(
        name: impl Into<String>,
        tuning: BossTuning,
        catalog: TimelineCatalog,
        graph: PatternGraph,
        unlocks: Vec<RewardId>,
        rng: ChaCha8Rng,
    ) -> Self {
        let health = tuning.max_health;
        Self {
            id: ActorId::new(),
            name: name.into(),
            tuning,
            catalog,
            graph,
            player: TimelinePlayer::new(),
            rng,
            pos: Vec2::ZERO,
            facing: Facing::Left,
            mode: Mode::Passive,
            phase: BossPhase::Phase1,
            state: BossState::Idle,
            health,
            unlocks,
            combo_count: 0,
            current_node: None,
            idle_timer: None,
            invincible_for: 0.0,
            provoking: None,
            skill_loop: None,
            motion: None,
            in_transition: false,
            alive: true,
            finished: false,
            combat_started: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn combo_count(&self) -> u32 {
        self.combo_count
    }

    pub fn health_ratio(&self) -> f32 {
        if self.tuning.max_health <= 0 {
            return 0.0;
        }
        self.health as f32 / self.tuning.max_health as f32
    }

    /// (Re)arms the repeating skill loop. The first expiry honors the
    /// configured initial delay, later ones follow `interval`.
    pub fn set_skill_loop(&mut self, interval: f32) {
        if interval <= 0.0 {
            warn!(boss = %self.name, interval, "non-positive skill interval ignored");
            return;
        }
        self.skill_loop = Some(SkillLoop {
            interval,
            remaining: self.tuning.skill_initial_delay,
        });
    }

    pub fn stop_skill_loop(&mut self) {
        self.skill_loop = None;
    }

    fn arm_idle_timer(&mut self) {
        let lo = self.tuning.min_idle_delay;
        let hi = self.tuning.max_idle_delay;
        let delay = if hi > lo { self.rng.gen_range(lo..=hi) } else { lo };
        self.idle_timer = Some(delay);
    }
}

/// A boss instance: shared lifecycle plus a boxed strategy
pub struct BossMachine {
    pub body: BossBody,
    profile: Box<dyn BossProfile>,
}

impl BossMachine {
    pub fn new(
        name: impl Into<String>,
        tuning: BossTuning,
        catalog: TimelineCatalog,
        graph: PatternGraph,
        unlocks: Vec<RewardId>,
        profile: Box<dyn BossProfile>,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            body: BossBody::new(name, tuning, catalog, graph, unlocks, rng),
            profile,
        }
    }

    pub fn id(&self) -> ActorId {
        self.body.id
    }

    pub fn state(&self) -> BossState {
        self.body.state
    }

    pub fn phase(&self) -> BossPhase {
        self.body.phase
    }

    pub fn mode(&self) -> Mode {
        self.body.mode
    }

    pub fn is_alive(&self) -> bool {
        self.body.alive
    }

    /// True once the death sequence has fully resolved; the session
    /// removes finished machines at the end of the tick.
    pub fn is_finished(&self) -> bool {
        self.body.finished
    }

    /// True from the moment the boss is actionable: intro completed, or
    /// provocation resolved. Environment tasks wait for this.
    pub fn in_combat(&self) -> bool {
        self.body.combat_started
    }

    pub fn profile_mut(&mut self) -> &mut dyn BossProfile {
        self.profile.as_mut()
    }

    /// Starts a hostile encounter with the intro sequence. The boss walks
    /// to its entry mark while the intro timeline plays and becomes
    /// actionable when it completes.
    pub fn enter_intro(&mut self, scheduler: &mut PatternScheduler, ctx: &mut SpawnCtx) {
        self.body.mode = Mode::Hostile;
        if let Some(pos) = self.profile.spawn_position(&mut self.body.rng) {
            self.body.pos = pos;
        }
        self.body.facing = Facing::toward(self.body.pos, ctx.target.pos);
        if self.transition(BossState::Intro, ctx) {
            let side = if self.body.pos.x < 0.0 { -1.0 } else { 1.0 };
            let entry = Vec2::new(self.body.tuning.entry_x * side, self.body.pos.y);
            self.body.motion = Some(Motion::Entry { to: entry });
        } else {
            // no intro timeline: combat starts immediately
            self.re_idle(ctx);
            self.body.combat_started = true;
            self.profile.on_hostile(&mut self.body, scheduler, ctx);
        }
    }

    /// Places the boss as a passive setpiece. It idles and ignores the
    /// target until damaged, which starts the provocation countdown.
    pub fn init_passive(&mut self, ctx: &mut SpawnCtx) {
        self.body.mode = Mode::Passive;
        self.body.phase = BossPhase::Phase1;
        self.transition(BossState::Idle, ctx);
        // passive bosses pose, they do not decide
        self.body.idle_timer = None;
    }

    /// Applies a damage hit.
    ///
    /// Hostile bosses take damage unless the intro is still playing or an
    /// invincibility window is open. Passive bosses ignore the damage and
    /// start their provocation countdown instead.
    pub fn on_hit(&mut self, amount: i32, scheduler: &mut PatternScheduler, ctx: &mut SpawnCtx) {
        if !self.body.alive {
            return;
        }
        match self.body.mode {
            Mode::Hostile => self.hostile_hit(amount, scheduler, ctx),
            Mode::Passive => {
                if self.body.provoking.is_none() {
                    debug!(boss = %self.body.name, "provoked, hostility pending");
                    self.body.provoking = Some(self.body.tuning.provocation_delay);
                }
            }
        }
    }

    fn hostile_hit(&mut self, amount: i32, scheduler: &mut PatternScheduler, ctx: &mut SpawnCtx) {
        if self.body.state == BossState::Intro {
            debug!(boss = %self.body.name, "hit ignored during intro");
            return;
        }
        if self.body.invincible_for > 0.0 {
            return;
        }

        self.body.health = (self.body.health - amount).max(0);
        ctx.log.push(
            EncounterEventKind::BossDamaged {
                boss: self.body.id,
                amount,
                health: self.body.health,
            },
            format!("{} took {} damage ({} left)", self.body.name, amount, self.body.health),
            ctx.now,
        );

        let phase = BossPhase::for_ratio(
            self.body.health_ratio(),
            self.body.tuning.phase2_threshold,
            self.body.tuning.phase3_threshold,
        );
        if phase != self.body.phase {
            self.body.phase = phase;
            ctx.log.push(
                EncounterEventKind::PhaseChanged { boss: self.body.id, phase },
                format!("{} entered {:?}", self.body.name, phase),
                ctx.now,
            );
            self.profile.on_phase_changed(phase, &mut self.body, scheduler, ctx);
        }

        if self.body.health <= 0 {
            self.kill(scheduler, ctx);
        } else if self.body.catalog.contains(BossState::Hit)
            && self.transition(BossState::Hit, ctx)
        {
            self.body.invincible_for = self.body.tuning.invincibility_window;
        }
    }

    /// Advances the boss by `dt` seconds of encounter time.
    pub fn tick(&mut self, dt: f32, scheduler: &mut PatternScheduler, ctx: &mut SpawnCtx) {
        if self.body.finished {
            return;
        }
        if !self.body.alive && self.body.state != BossState::Die {
            return;
        }

        self.body.invincible_for = (self.body.invincible_for - dt).max(0.0);

        let provoked = match &mut self.body.provoking {
            Some(remaining) => {
                *remaining -= dt;
                *remaining <= 0.0
            }
            None => false,
        };
        if provoked {
            self.body.provoking = None;
            self.become_hostile(scheduler, ctx);
        }

        self.advance_motion(dt, ctx);

        let mut events = Vec::new();
        self.body.player.advance(dt, &mut events);
        self.route_events(events, scheduler, ctx);

        if self.body.state == BossState::Idle {
            let expired = match &mut self.body.idle_timer {
                Some(remaining) => {
                    *remaining -= dt;
                    *remaining <= 0.0
                }
                None => false,
            };
            if expired {
                self.body.idle_timer = None;
                self.decide_action(ctx);
            }
        }

        let skill_due = match &mut self.body.skill_loop {
            Some(skill) => {
                skill.remaining -= dt;
                if skill.remaining <= 0.0 {
                    skill.remaining = skill.interval;
                    true
                } else {
                    false
                }
            }
            None => false,
        };
        if skill_due && self.body.alive && self.body.mode == Mode::Hostile {
            self.profile.use_skill_pattern(&mut self.body, ctx);
        }
    }

    /// Folds an encounter-wide difficulty multiplier into playback speed
    /// and the profile's own rates.
    pub fn apply_difficulty(&mut self, multiplier: f32) {
        if multiplier <= 0.0 {
            warn!(boss = %self.body.name, multiplier, "non-positive difficulty ignored");
            return;
        }
        let speed = self.body.player.playback_speed() * multiplier;
        self.body.player.set_playback_speed(speed);
        self.profile.apply_difficulty(multiplier, &mut self.body);
    }

    // ===== TRANSITIONS =====

    /// Attempts a state change. Same-state requests and requests arriving
    /// while another transition is being applied are dropped, not queued.
    fn transition(&mut self, to: BossState, ctx: &mut SpawnCtx) -> bool {
        if self.body.in_transition {
            debug!(boss = %self.body.name, %to, "transition requested mid-transition, dropped");
            return false;
        }
        // same-state requests are dropped unless playback stopped, so a
        // fresh machine still starts its idle loop
        if self.body.state == to && self.body.player.is_playing() {
            return false;
        }
        let Some(timeline) = self.body.catalog.get(to) else {
            warn!(boss = %self.body.name, %to, "no timeline mapped for state, transition rejected");
            return false;
        };
        let timeline = timeline.clone();

        self.body.in_transition = true;
        let accepted = self.body.player.play(timeline, to == BossState::Die);
        if accepted {
            let from = self.body.state;
            self.body.state = to;
            self.body.motion = None;
            self.body.idle_timer = None;
            if to == BossState::Idle {
                self.body.combo_count = 0;
                self.body.current_node = None;
                self.body.arm_idle_timer();
            }
            if from != to {
                ctx.log.push(
                    EncounterEventKind::StateChanged { boss: self.body.id, from, to },
                    format!("{} state {} -> {}", self.body.name, from, to),
                    ctx.now,
                );
            }
        } else {
            debug!(boss = %self.body.name, %to, "transition blocked by locked timeline");
        }
        self.body.in_transition = false;
        accepted
    }

    /// Returns to idle, re-arming the decision timer even when the
    /// transition is rejected or the idle timeline is missing.
    fn re_idle(&mut self, ctx: &mut SpawnCtx) {
        if !self.transition(BossState::Idle, ctx) {
            self.body.state = BossState::Idle;
            self.body.combo_count = 0;
            self.body.current_node = None;
            self.body.arm_idle_timer();
        }
    }

    fn become_hostile(&mut self, scheduler: &mut PatternScheduler, ctx: &mut SpawnCtx) {
        if self.body.mode == Mode::Hostile {
            return;
        }
        self.body.mode = Mode::Hostile;
        ctx.log.push(
            EncounterEventKind::CombatStarted { boss: self.body.id },
            format!("{} engages", self.body.name),
            ctx.now,
        );
        self.re_idle(ctx);
        self.body.combat_started = true;
        self.profile.on_hostile(&mut self.body, scheduler, ctx);
    }

    fn kill(&mut self, scheduler: &mut PatternScheduler, ctx: &mut SpawnCtx) {
        self.body.alive = false;
        self.body.skill_loop = None;
        self.body.provoking = None;
        self.body.motion = None;
        scheduler.cancel_owned_by(self.body.id);
        self.transition(BossState::Die, ctx);
        if self.body.state != BossState::Die {
            // no death timeline to wait for
            self.finish_death(ctx);
        }
    }

    fn finish_death(&mut self, ctx: &mut SpawnCtx) {
        if self.body.finished {
            return;
        }
        self.body.finished = true;
        ctx.log.push(
            EncounterEventKind::Defeated { boss: self.body.id },
            format!("{} defeated", self.body.name),
            ctx.now,
        );
    }

    // ===== DECISIONS =====

    /// Idle expiry: roll teleport, then chase, then fall through to an
    /// attack opener.
    fn decide_action(&mut self, ctx: &mut SpawnCtx) {
        if !self.body.alive
            || self.body.mode != Mode::Hostile
            || self.body.state != BossState::Idle
        {
            return;
        }

        let teleport_roll: f32 = self.body.rng.gen();
        if teleport_roll < self.body.tuning.teleport_chance
            && self.body.catalog.contains(BossState::Teleport)
            && self.transition(BossState::Teleport, ctx)
        {
            return;
        }

        let chase_roll: f32 = self.body.rng.gen();
        if chase_roll < self.body.tuning.chase_chance
            && self.transition(BossState::Walk, ctx)
        {
            self.body.motion = Some(Motion::Chase {
                remaining: self.body.tuning.chase_duration,
            });
            self.body.facing = Facing::toward(self.body.pos, ctx.target.pos);
            return;
        }

        self.open_attack(ctx);
    }

    fn open_attack(&mut self, ctx: &mut SpawnCtx) {
        match self.profile.select_opener(&mut self.body, ctx) {
            Some(node_id) => self.start_pattern(node_id, ctx),
            None => self.re_idle(ctx),
        }
    }

    fn start_pattern(&mut self, node_id: NodeId, ctx: &mut SpawnCtx) {
        let Some(node) = self.body.graph.node(node_id) else {
            warn!(boss = %self.body.name, node = node_id.0, "pattern node missing, back to idle");
            self.re_idle(ctx);
            return;
        };
        let state = node.state;
        self.body.facing = Facing::toward(self.body.pos, ctx.target.pos);
        if self.transition(state, ctx) {
            self.body.current_node = Some(node_id);
            self.body.combo_count += 1;
        } else {
            self.re_idle(ctx);
        }
    }

    // ===== COMPLETIONS =====

    fn on_timeline_complete(&mut self, scheduler: &mut PatternScheduler, ctx: &mut SpawnCtx) {
        match self.body.state {
            BossState::Intro => {
                self.re_idle(ctx);
                self.body.combat_started = true;
                self.profile.on_hostile(&mut self.body, scheduler, ctx);
            }
            BossState::Attack(_) | BossState::Skill | BossState::Special => {
                self.resolve_chain(ctx);
            }
            BossState::Teleport => self.finish_teleport(ctx),
            BossState::Hit => {
                if self.body.alive {
                    self.re_idle(ctx);
                }
            }
            BossState::Die => self.finish_death(ctx),
            BossState::Idle | BossState::Walk => {}
        }
    }

    fn resolve_chain(&mut self, ctx: &mut SpawnCtx) {
        let Some(current) = self.body.current_node else {
            self.re_idle(ctx);
            return;
        };
        let next = self.body.graph.roll_chain(
            current,
            self.body.combo_count,
            self.body.tuning.max_combo_count,
            &mut self.body.rng,
        );
        match next {
            Some(node_id) => self.start_pattern(node_id, ctx),
            None => self.re_idle(ctx),
        }
    }

    /// Teleport timeline done: reappear offstage on a random side and
    /// walk back in to the entry mark.
    fn finish_teleport(&mut self, ctx: &mut SpawnCtx) {
        let t = &self.body.tuning;
        let (offstage_x, entry_x, min_y, max_y) =
            (t.offstage_x, t.entry_x, t.teleport_min_y, t.teleport_max_y);

        let side = if self.body.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let y = if max_y > min_y {
            self.body.rng.gen_range(min_y..=max_y)
        } else {
            min_y
        };
        self.body.pos = Vec2::new(offstage_x * side, y);
        self.body.facing = Facing::toward(self.body.pos, ctx.target.pos);

        let entry = Vec2::new(entry_x * side, y);
        if self.transition(BossState::Walk, ctx) {
            self.body.motion = Some(Motion::Entry { to: entry });
        } else {
            // no walk timeline: reappear at the entry mark directly
            self.body.pos = entry;
            self.re_idle(ctx);
        }
    }

    // ===== MOVEMENT =====

    fn advance_motion(&mut self, dt: f32, ctx: &mut SpawnCtx) {
        if !matches!(self.body.state, BossState::Walk | BossState::Intro) {
            return;
        }
        let Some(motion) = self.body.motion else {
            return;
        };
        match motion {
            Motion::Chase { remaining } => {
                let remaining = remaining - dt;
                let target = ctx.target.pos;
                let step = self.body.tuning.chase_speed * dt;
                self.body.pos = self.body.pos.move_towards(&target, step);
                self.body.facing = Facing::toward(self.body.pos, target);
                let in_range = self.body.pos.distance(&target)
                    <= self.body.tuning.optimal_attack_distance;
                if in_range || remaining <= 0.0 {
                    self.body.motion = None;
                    self.open_attack(ctx);
                } else {
                    self.body.motion = Some(Motion::Chase { remaining });
                }
            }
            Motion::Entry { to } => {
                let step = self.body.tuning.walk_speed * dt;
                self.body.pos = self.body.pos.move_towards(&to, step);
                if self.body.pos.distance(&to) < 1e-4 {
                    self.body.motion = None;
                    if self.body.state == BossState::Walk {
                        self.re_idle(ctx);
                    }
                }
            }
        }
    }

    fn route_events(
        &mut self,
        events: Vec<TimelineEvent>,
        scheduler: &mut PatternScheduler,
        ctx: &mut SpawnCtx,
    ) {
        for event in events {
            match event {
                TimelineEvent::Frame(name) => {
                    self.profile.on_frame_event(&name, &mut self.body, scheduler, ctx);
                }
                TimelineEvent::Completed => self.on_timeline_complete(scheduler, ctx),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boss::events::EncounterLog;
    use crate::boss::profile::DefaultProfile;
    use crate::core::types::FieldBounds;
    use crate::pattern::AttackPatternNode;
    use crate::pool::PoolRegistry;
    use crate::session::ctx::{Effect, TargetView};
    use crate::spawnable::PrototypeTable;
    use crate::timeline::{Timeline, TimelineFrame};
    use rand::SeedableRng;

    fn short(name: &str, sprite: &str) -> Timeline {
        Timeline::new(name, vec![TimelineFrame::new(sprite, 0.1)])
    }

    fn full_catalog() -> TimelineCatalog {
        let mut catalog = TimelineCatalog::new();
        catalog.insert(
            BossState::Idle,
            Timeline::new("idle", vec![TimelineFrame::new("idle_0", 0.1)]).looping(),
        );
        catalog.insert(
            BossState::Walk,
            Timeline::new("walk", vec![TimelineFrame::new("walk_0", 0.1)]).looping(),
        );
        catalog.insert(BossState::Intro, short("intro", "intro_0"));
        catalog.insert(BossState::Attack(1), short("attack1", "a1_0"));
        catalog.insert(BossState::Attack(2), short("attack2", "a2_0"));
        catalog.insert(BossState::Teleport, short("teleport", "tp_0"));
        catalog.insert(BossState::Hit, short("hit", "hit_0"));
        catalog.insert(BossState::Die, short("die", "die_0"));
        catalog
    }

    fn two_attack_graph() -> PatternGraph {
        PatternGraph::new(vec![
            AttackPatternNode::new(BossState::Attack(1))
                .with_successors(vec![NodeId(1)])
                .with_continuation(1.0),
            AttackPatternNode::new(BossState::Attack(2))
                .with_successors(vec![NodeId(0)])
                .with_continuation(1.0),
        ])
        .unwrap()
    }

    fn test_tuning() -> BossTuning {
        BossTuning {
            max_health: 10,
            min_idle_delay: 0.1,
            max_idle_delay: 0.1,
            ..BossTuning::default()
        }
    }

    fn machine(catalog: TimelineCatalog, graph: PatternGraph, tuning: BossTuning) -> BossMachine {
        BossMachine::new(
            "dummy",
            tuning,
            catalog,
            graph,
            Vec::new(),
            Box::new(DefaultProfile),
            ChaCha8Rng::seed_from_u64(7),
        )
    }

    struct Parts {
        registry: PoolRegistry,
        prototypes: PrototypeTable,
        effects: Vec<Effect>,
        log: EncounterLog,
        rng: ChaCha8Rng,
    }

    impl Parts {
        fn new() -> Self {
            Self {
                registry: PoolRegistry::new(),
                prototypes: PrototypeTable::new(),
                effects: Vec::new(),
                log: EncounterLog::new(),
                rng: ChaCha8Rng::seed_from_u64(99),
            }
        }

        fn ctx(&mut self) -> SpawnCtx<'_> {
            SpawnCtx {
                now: 0.0,
                bounds: FieldBounds::default(),
                target: TargetView {
                    pos: Vec2::new(2.0, 0.0),
                    alive: true,
                },
                registry: &mut self.registry,
                prototypes: &self.prototypes,
                effects: &mut self.effects,
                log: &mut self.log,
                rng: &mut self.rng,
            }
        }
    }

    fn hostile_without_intro() -> (BossMachine, PatternScheduler, Parts) {
        let mut catalog = full_catalog();
        let mut no_intro = TimelineCatalog::new();
        for state in [
            BossState::Idle,
            BossState::Walk,
            BossState::Attack(1),
            BossState::Attack(2),
            BossState::Teleport,
            BossState::Hit,
            BossState::Die,
        ] {
            if let Some(t) = catalog.get(state) {
                no_intro.insert_shared(state, t.clone());
            }
        }
        catalog = no_intro;
        let mut m = machine(catalog, two_attack_graph(), test_tuning());
        let mut scheduler = PatternScheduler::new(1.0);
        let mut parts = Parts::new();
        {
            let mut ctx = parts.ctx();
            m.enter_intro(&mut scheduler, &mut ctx);
        }
        (m, scheduler, parts)
    }

    #[test]
    fn test_intro_completes_into_idle() {
        let mut m = machine(full_catalog(), two_attack_graph(), test_tuning());
        let mut scheduler = PatternScheduler::new(1.0);
        let mut parts = Parts::new();
        let mut ctx = parts.ctx();

        m.enter_intro(&mut scheduler, &mut ctx);
        assert_eq!(m.state(), BossState::Intro);
        assert_eq!(m.mode(), Mode::Hostile);

        m.tick(0.1, &mut scheduler, &mut ctx);
        assert_eq!(m.state(), BossState::Idle);
    }

    #[test]
    fn test_intro_ignores_damage() {
        let mut m = machine(full_catalog(), two_attack_graph(), test_tuning());
        let mut scheduler = PatternScheduler::new(1.0);
        let mut parts = Parts::new();
        let mut ctx = parts.ctx();

        m.enter_intro(&mut scheduler, &mut ctx);
        m.on_hit(5, &mut scheduler, &mut ctx);
        assert_eq!(m.body.health, 10);
    }

    #[test]
    fn test_idle_expiry_opens_attack_and_chains_to_cap() {
        let (mut m, mut scheduler, mut parts) = hostile_without_intro();
        {
            let mut ctx = parts.ctx();
            // idle delay 0.1, each pattern 0.1; cap is 4 patterns
            for _ in 0..60 {
                m.tick(0.05, &mut scheduler, &mut ctx);
            }
        }
        let attacks = parts.log.count_matching(|k| {
            matches!(
                k,
                EncounterEventKind::StateChanged {
                    to: BossState::Attack(_),
                    ..
                }
            )
        });
        // the combo cap ends every chain at 4 patterns
        assert!(attacks >= 4);
        let idles = parts.log.count_matching(|k| {
            matches!(
                k,
                EncounterEventKind::StateChanged {
                    from: BossState::Attack(_),
                    to: BossState::Idle,
                    ..
                }
            )
        });
        assert!(idles >= 1, "chains must end back in idle");
    }

    #[test]
    fn test_combo_resets_on_idle() {
        let (mut m, mut scheduler, mut parts) = hostile_without_intro();
        let mut ctx = parts.ctx();
        // through one full chain and back to idle
        for _ in 0..14 {
            m.tick(0.05, &mut scheduler, &mut ctx);
        }
        if m.state() == BossState::Idle {
            assert_eq!(m.body.combo_count(), 0);
        }
    }

    #[test]
    fn test_phase_walk_through_tiers() {
        // no Hit timeline, so hits land without the invincibility window
        let mut catalog = TimelineCatalog::new();
        catalog.insert(
            BossState::Idle,
            Timeline::new("idle", vec![TimelineFrame::new("idle_0", 0.1)]).looping(),
        );
        catalog.insert(BossState::Die, short("die", "die_0"));
        let mut m = machine(catalog, PatternGraph::empty(), test_tuning());
        let mut scheduler = PatternScheduler::new(1.0);
        let mut parts = Parts::new();
        {
            let mut ctx = parts.ctx();
            m.enter_intro(&mut scheduler, &mut ctx);

            m.on_hit(4, &mut scheduler, &mut ctx);
            assert_eq!(m.phase(), BossPhase::Phase2);

            m.on_hit(4, &mut scheduler, &mut ctx);
            assert_eq!(m.phase(), BossPhase::Phase3);

            m.on_hit(2, &mut scheduler, &mut ctx);
            assert_eq!(m.state(), BossState::Die);
            assert!(!m.is_alive());

            m.tick(0.1, &mut scheduler, &mut ctx);
            assert!(m.is_finished());
        }
        let phase_changes = parts
            .log
            .count_matching(|k| matches!(k, EncounterEventKind::PhaseChanged { .. }));
        assert_eq!(phase_changes, 2);
        let defeats = parts
            .log
            .count_matching(|k| matches!(k, EncounterEventKind::Defeated { .. }));
        assert_eq!(defeats, 1);
    }

    #[test]
    fn test_hit_detour_opens_invincibility_window() {
        let (mut m, mut scheduler, mut parts) = hostile_without_intro();
        {
            let mut ctx = parts.ctx();
            m.on_hit(1, &mut scheduler, &mut ctx);
            assert_eq!(m.state(), BossState::Hit);
            // inside the window, the second hit is ignored
            m.on_hit(1, &mut scheduler, &mut ctx);
            assert_eq!(m.body.health, 9);

            // window is 0.5s; run it out
            for _ in 0..12 {
                m.tick(0.05, &mut scheduler, &mut ctx);
            }
            m.on_hit(1, &mut scheduler, &mut ctx);
            assert_eq!(m.body.health, 8);
        }
    }

    #[test]
    fn test_death_interrupts_locked_timeline_and_cancels_tasks() {
        let mut catalog = TimelineCatalog::new();
        catalog.insert(
            BossState::Idle,
            Timeline::new("idle", vec![TimelineFrame::new("idle_0", 0.1)]).looping(),
        );
        catalog.insert(
            BossState::Attack(1),
            Timeline::new("attack1", vec![TimelineFrame::new("a1_0", 10.0)]).uninterruptible(),
        );
        catalog.insert(BossState::Die, short("die", "die_0"));
        let graph =
            PatternGraph::new(vec![AttackPatternNode::new(BossState::Attack(1))]).unwrap();
        let mut m = machine(catalog, graph, test_tuning());
        let mut scheduler = PatternScheduler::new(1.0);
        let mut parts = Parts::new();
        let mut ctx = parts.ctx();

        m.enter_intro(&mut scheduler, &mut ctx);
        let pattern = crate::scheduler::EnvironmentPattern {
            prototype: "shard".into(),
            shape: crate::scheduler::PatternKind::RandomPoint,
            interval: 3.0,
            enabled_in_session: true,
        };
        scheduler.schedule(m.id(), pattern, 1.0);
        assert_eq!(scheduler.live_tasks(), 1);

        // into the long, locked attack
        for _ in 0..4 {
            m.tick(0.05, &mut scheduler, &mut ctx);
        }
        assert_eq!(m.state(), BossState::Attack(1));
        assert!(m.body.player.is_locked());

        m.on_hit(100, &mut scheduler, &mut ctx);
        assert_eq!(m.state(), BossState::Die);
        assert_eq!(scheduler.live_tasks(), 0);
    }

    #[test]
    fn test_passive_provocation_single_combat_start() {
        let mut m = machine(full_catalog(), two_attack_graph(), test_tuning());
        let mut scheduler = PatternScheduler::new(1.0);
        let mut parts = Parts::new();
        {
            let mut ctx = parts.ctx();
            m.init_passive(&mut ctx);
            assert_eq!(m.mode(), Mode::Passive);

            m.on_hit(5, &mut scheduler, &mut ctx);
            assert_eq!(m.body.health, 10, "passive bosses ignore damage");
            // a second poke must not restart the countdown
            m.on_hit(5, &mut scheduler, &mut ctx);

            // provocation delay is 2.0s
            for _ in 0..50 {
                m.tick(0.05, &mut scheduler, &mut ctx);
            }
            assert_eq!(m.mode(), Mode::Hostile);

            m.on_hit(4, &mut scheduler, &mut ctx);
            assert_eq!(m.body.health, 6);
        }
        let starts = parts
            .log
            .count_matching(|k| matches!(k, EncounterEventKind::CombatStarted { .. }));
        assert_eq!(starts, 1);
    }

    #[test]
    fn test_passive_idle_never_decides() {
        let mut m = machine(full_catalog(), two_attack_graph(), test_tuning());
        let mut scheduler = PatternScheduler::new(1.0);
        let mut parts = Parts::new();
        let mut ctx = parts.ctx();
        m.init_passive(&mut ctx);
        for _ in 0..40 {
            m.tick(0.05, &mut scheduler, &mut ctx);
        }
        assert_eq!(m.state(), BossState::Idle);
    }

    #[test]
    fn test_teleport_relocates_offstage_then_walks_back() {
        let tuning = BossTuning {
            teleport_chance: 1.0,
            ..test_tuning()
        };
        let mut catalog = TimelineCatalog::new();
        catalog.insert(
            BossState::Idle,
            Timeline::new("idle", vec![TimelineFrame::new("idle_0", 0.1)]).looping(),
        );
        catalog.insert(
            BossState::Walk,
            Timeline::new("walk", vec![TimelineFrame::new("walk_0", 0.1)]).looping(),
        );
        catalog.insert(BossState::Teleport, short("teleport", "tp_0"));
        let mut m = machine(catalog, PatternGraph::empty(), tuning);
        let mut scheduler = PatternScheduler::new(1.0);
        let mut parts = Parts::new();
        {
            let mut ctx = parts.ctx();
            m.enter_intro(&mut scheduler, &mut ctx);
            // idle expires at 0.1, teleport plays for 0.1
            m.tick(0.1, &mut scheduler, &mut ctx);
            assert_eq!(m.state(), BossState::Teleport);
            m.tick(0.1, &mut scheduler, &mut ctx);
            assert_eq!(m.state(), BossState::Walk);
            assert_eq!(m.body.pos.x.abs(), m.body.tuning.offstage_x);

            // walk speed 3.0 covers the 4 units back inside 2s
            for _ in 0..40 {
                m.tick(0.05, &mut scheduler, &mut ctx);
            }
        }
        let returned = parts.log.count_matching(|k| {
            matches!(
                k,
                EncounterEventKind::StateChanged {
                    from: BossState::Walk,
                    to: BossState::Idle,
                    ..
                }
            )
        });
        assert!(returned >= 1, "entry walk must end back in idle");
    }
}
