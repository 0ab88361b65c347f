//! Encounter definition schema and loading
//!
//! An encounter is authored as one TOML file: session settings, the
//! target, spawn prototypes and a list of bosses with their timelines,
//! pattern graphs and environment patterns. Loading validates the whole
//! definition before anything is built, so a bad file fails at startup
//! instead of mid-fight.
//!
//! The four shipped bosses are also available as in-code builders so
//! tests and the runner work without touching the filesystem.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::boss::catalog::TimelineCatalog;
use crate::boss::machine::BossMachine;
use crate::boss::profiles::profile_by_name;
use crate::boss::state::BossState;
use crate::core::config::{BossTuning, SessionConfig};
use crate::core::error::{EncounterError, Result};
use crate::core::types::{RewardId, Vec2};
use crate::pattern::{AttackPatternNode, NodeId, PatternGraph};
use crate::scheduler::{EnvironmentPattern, PatternKind};
use crate::session::{CombatSession, TargetState};
use crate::spawnable::{BurstSpec, PrototypeTable, ProjectileSpec, SpawnPrototype};
use crate::timeline::{SpriteRef, Timeline, TimelineFrame, TweenSpec};

fn default_burst_radius() -> f32 {
    0.8
}

/// Complete encounter definition as authored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterDef {
    pub name: String,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub target: TargetDef,
    #[serde(default)]
    pub prototypes: PrototypeDefs,
    pub bosses: Vec<BossDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetDef {
    pub max_health: i32,
    pub pos: Vec2,
}

impl Default for TargetDef {
    fn default() -> Self {
        Self {
            max_health: 100,
            pos: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrototypeDefs {
    #[serde(default)]
    pub projectiles: AHashMap<String, ProjectileSpec>,
    #[serde(default)]
    pub bursts: AHashMap<String, BurstDef>,
}

/// Burst prototype as authored: a timeline plus strike parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstDef {
    pub timeline: Timeline,
    pub damage: i32,
    #[serde(default = "default_burst_radius")]
    pub hit_radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossDef {
    pub name: String,
    /// Behavior profile name; empty means the plain graph-driven profile
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub tuning: BossTuning,
    /// Passive bosses idle until provoked instead of opening hostile
    #[serde(default)]
    pub passive: bool,
    #[serde(default)]
    pub spawn_pos: Vec2,
    #[serde(default)]
    pub unlocks: Vec<String>,
    pub timelines: AHashMap<BossState, Timeline>,
    #[serde(default)]
    pub patterns: Vec<AttackPatternNode>,
    #[serde(default)]
    pub environment: Vec<EnvironmentPattern>,
}

impl EncounterDef {
    /// Checks everything that can be checked without building: config
    /// ranges, state coverage, graph shape, prototype references.
    pub fn validate(&self) -> Result<()> {
        self.session
            .validate()
            .map_err(|e| EncounterError::InvalidDefinition(format!("{}: {}", self.name, e)))?;
        if self.target.max_health <= 0 {
            return Err(EncounterError::InvalidDefinition(format!(
                "{}: target max_health must be positive",
                self.name
            )));
        }
        if self.bosses.is_empty() {
            return Err(EncounterError::InvalidDefinition(format!(
                "{}: no bosses defined",
                self.name
            )));
        }
        for boss in &self.bosses {
            boss.validate(&self.prototypes)?;
        }
        Ok(())
    }
}

impl BossDef {
    fn validate(&self, prototypes: &PrototypeDefs) -> Result<()> {
        self.tuning
            .validate()
            .map_err(|e| EncounterError::InvalidDefinition(format!("{}: {}", self.name, e)))?;
        if !self.timelines.contains_key(&BossState::Idle) {
            return Err(EncounterError::InvalidDefinition(format!(
                "{}: no idle timeline",
                self.name
            )));
        }
        if profile_by_name(&self.profile).is_none() {
            return Err(EncounterError::InvalidDefinition(format!(
                "{}: unknown profile '{}'",
                self.name, self.profile
            )));
        }
        // graph shape errors surface here rather than at build time
        if !self.patterns.is_empty() {
            PatternGraph::new(self.patterns.clone())?;
            for node in &self.patterns {
                if !self.timelines.contains_key(&node.state) {
                    return Err(EncounterError::InvalidDefinition(format!(
                        "{}: pattern state '{}' has no timeline",
                        self.name, node.state
                    )));
                }
            }
        }
        for pattern in &self.environment {
            let known = prototypes.projectiles.contains_key(&pattern.prototype)
                || prototypes.bursts.contains_key(&pattern.prototype);
            if !known {
                return Err(EncounterError::InvalidDefinition(format!(
                    "{}: environment pattern references unknown prototype '{}'",
                    self.name, pattern.prototype
                )));
            }
        }
        Ok(())
    }
}

/// Reads and validates one encounter file
pub fn load_encounter(path: &Path) -> Result<EncounterDef> {
    let content = fs::read_to_string(path)?;
    let def: EncounterDef = toml::from_str(&content)?;
    def.validate()?;
    Ok(def)
}

/// Loads every `.toml` encounter in a directory, sorted by file name
pub fn load_encounter_dir(dir: &Path) -> Result<Vec<EncounterDef>> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map_or(false, |ext| ext == "toml"))
        .collect();
    paths.sort();
    paths.iter().map(|p| load_encounter(p)).collect()
}

pub fn build_prototypes(defs: &PrototypeDefs) -> PrototypeTable {
    let mut table = PrototypeTable::new();
    for (name, spec) in &defs.projectiles {
        table.insert(name.clone(), SpawnPrototype::Projectile(spec.clone()));
    }
    for (name, def) in &defs.bursts {
        table.insert(
            name.clone(),
            SpawnPrototype::Burst(BurstSpec::new(def.timeline.clone(), def.damage, def.hit_radius)),
        );
    }
    table
}

/// Builds a live machine from a definition. The seed fixes the boss's
/// private decision stream.
pub fn build_boss(def: &BossDef, seed: u64) -> Result<BossMachine> {
    let mut catalog = TimelineCatalog::new();
    for (state, timeline) in &def.timelines {
        catalog.insert(*state, timeline.clone());
    }
    let graph = if def.patterns.is_empty() {
        PatternGraph::empty()
    } else {
        PatternGraph::new(def.patterns.clone())?
    };
    let profile = profile_by_name(&def.profile).ok_or_else(|| {
        EncounterError::InvalidDefinition(format!("{}: unknown profile '{}'", def.name, def.profile))
    })?;
    let unlocks = def.unlocks.iter().map(RewardId::new).collect();
    Ok(BossMachine::new(
        def.name.as_str(),
        def.tuning.clone(),
        catalog,
        graph,
        unlocks,
        profile,
        ChaCha8Rng::seed_from_u64(seed),
    ))
}

/// Builds a ready-to-tick session from a validated definition
pub fn build_session(def: &EncounterDef, seed: u64) -> Result<CombatSession> {
    def.validate()?;
    let prototypes = build_prototypes(&def.prototypes);
    let target = TargetState::new(def.target.pos, def.target.max_health);
    let mut session = CombatSession::new(def.session.clone(), prototypes, target, seed);
    for (index, boss) in def.bosses.iter().enumerate() {
        let machine = build_boss(boss, seed.wrapping_add(index as u64 + 1))?;
        if boss.passive {
            session.spawn_passive(machine, boss.environment.clone(), boss.spawn_pos);
        } else {
            session.spawn_hostile(machine, boss.environment.clone(), boss.spawn_pos);
        }
    }
    Ok(session)
}

// === BUILT-IN BOSSES ===

fn looped(name: &str, stem: &str, count: usize, duration: f32) -> Timeline {
    let frames = (0..count)
        .map(|i| TimelineFrame::new(format!("{}_{}", stem, i), duration))
        .collect();
    Timeline::new(name, frames).looping()
}

fn shard_spec() -> ProjectileSpec {
    ProjectileSpec {
        speed: 4.0,
        damage: 6,
        hit_radius: 0.4,
        sprite: SpriteRef::new("shard"),
    }
}

fn lightning_def() -> BurstDef {
    BurstDef {
        timeline: Timeline::new(
            "lightning",
            vec![
                TimelineFrame::new("bolt_warn", 0.45),
                TimelineFrame::new("bolt_strike", 0.15).with_event("damage"),
                TimelineFrame::new("bolt_fade", 0.2),
            ],
        ),
        damage: 8,
        hit_radius: 0.8,
    }
}

fn sword_wave_def() -> BurstDef {
    BurstDef {
        timeline: Timeline::new(
            "sword_wave",
            vec![
                TimelineFrame::new("wave_rise", 0.3),
                TimelineFrame::new("wave_sweep", 0.2).with_event("damage"),
                TimelineFrame::new("wave_settle", 0.2),
            ],
        ),
        damage: 10,
        hit_radius: 1.0,
    }
}

fn wall_bullet_spec() -> ProjectileSpec {
    ProjectileSpec {
        speed: 6.0,
        damage: 3,
        hit_radius: 0.3,
        sprite: SpriteRef::new("wall_bullet"),
    }
}

fn shared_prototypes() -> PrototypeDefs {
    let mut defs = PrototypeDefs::default();
    defs.projectiles.insert("shard".to_string(), shard_spec());
    defs.projectiles.insert("wall_bullet".to_string(), wall_bullet_spec());
    defs.bursts.insert("lightning".to_string(), lightning_def());
    defs.bursts.insert("sword_wave".to_string(), sword_wave_def());
    defs
}

/// Melee duelist: short pattern chains, a gap-closing blink, no
/// environment hazards of its own
pub fn demon_blade_def() -> BossDef {
    let mut timelines = AHashMap::new();
    timelines.insert(BossState::Idle, looped("idle", "demon_idle", 4, 0.15));
    timelines.insert(BossState::Walk, looped("walk", "demon_walk", 4, 0.12));
    timelines.insert(
        BossState::Intro,
        Timeline::new(
            "intro",
            vec![
                TimelineFrame::new("demon_draw_0", 0.4),
                TimelineFrame::new("demon_draw_1", 0.3),
                TimelineFrame::new("demon_draw_2", 0.5),
            ],
        ),
    );
    timelines.insert(
        BossState::Attack(1),
        Timeline::new(
            "attack1",
            vec![
                TimelineFrame::new("demon_a1_windup", 0.18),
                TimelineFrame::new("demon_a1_slash", 0.1).with_event("strike_quick"),
                TimelineFrame::new("demon_a1_recover", 0.22),
            ],
        ),
    );
    timelines.insert(
        BossState::Attack(2),
        Timeline::new(
            "attack2",
            vec![
                TimelineFrame::new("demon_a2_windup", 0.3),
                TimelineFrame::new("demon_a2_slash", 0.12).with_event("strike_heavy"),
                TimelineFrame::new("demon_a2_recover", 0.3),
            ],
        ),
    );
    timelines.insert(
        BossState::Attack(3),
        Timeline::new(
            "attack3",
            vec![
                TimelineFrame::new("demon_spin_0", 0.12)
                    .with_rotation(TweenSpec::over(360.0, 0.44)),
                TimelineFrame::new("demon_spin_1", 0.1).with_event("strike_spin"),
                TimelineFrame::new("demon_spin_2", 0.12),
                TimelineFrame::new("demon_spin_3", 0.1).with_event("strike_spin"),
                TimelineFrame::new("demon_spin_recover", 0.2)
                    .with_rotation(TweenSpec::snap(0.0)),
            ],
        ),
    );
    timelines.insert(
        BossState::Attack(4),
        Timeline::new(
            "attack4",
            vec![
                TimelineFrame::new("demon_crouch", 0.25),
                TimelineFrame::new("demon_blink", 0.05).with_event("blink"),
                TimelineFrame::new("demon_lunge", 0.12).with_event("strike_lunge"),
                TimelineFrame::new("demon_lunge_recover", 0.35),
            ],
        )
        .uninterruptible(),
    );
    timelines.insert(
        BossState::Hit,
        Timeline::new(
            "hit",
            vec![
                TimelineFrame::new("demon_hit_0", 0.12),
                TimelineFrame::new("demon_hit_1", 0.18),
            ],
        ),
    );
    timelines.insert(
        BossState::Die,
        Timeline::new(
            "die",
            vec![
                TimelineFrame::new("demon_die_0", 0.3),
                TimelineFrame::new("demon_die_1", 0.3),
                TimelineFrame::new("demon_die_2", 0.4),
            ],
        )
        .with_fade_out(0.6),
    );

    BossDef {
        name: "demon_blade".to_string(),
        profile: "demon_blade".to_string(),
        tuning: BossTuning {
            max_health: 120,
            chase_chance: 0.6,
            chase_speed: 6.0,
            optimal_attack_distance: 1.4,
            ..BossTuning::default()
        },
        passive: false,
        spawn_pos: Vec2::new(6.0, 0.0),
        unlocks: vec!["trail_demon_edge".to_string()],
        timelines,
        patterns: vec![
            AttackPatternNode::new(BossState::Attack(1))
                .with_successors(vec![NodeId(1), NodeId(2)])
                .with_continuation(0.85)
                .with_range(0.0, 2.5),
            AttackPatternNode::new(BossState::Attack(2))
                .with_successors(vec![NodeId(2), NodeId(3)])
                .with_continuation(0.75)
                .with_range(0.0, 2.5),
            AttackPatternNode::new(BossState::Attack(3))
                .with_successors(vec![NodeId(0), NodeId(1)])
                .with_continuation(0.6)
                .with_range(0.0, 3.5),
            AttackPatternNode::new(BossState::Attack(4))
                .with_successors(vec![NodeId(0)])
                .with_continuation(0.5)
                .with_range(2.0, 8.0),
        ],
        environment: Vec::new(),
    }
}

/// Arena controller: summoned hazards, occasional teleports, a standing
/// lightning schedule
pub fn warden_def() -> BossDef {
    let mut timelines = AHashMap::new();
    timelines.insert(BossState::Idle, looped("idle", "warden_idle", 4, 0.2));
    timelines.insert(BossState::Walk, looped("walk", "warden_walk", 4, 0.15));
    timelines.insert(
        BossState::Intro,
        Timeline::new(
            "intro",
            vec![
                TimelineFrame::new("warden_rise_0", 0.5),
                TimelineFrame::new("warden_rise_1", 0.4),
                TimelineFrame::new("warden_rise_2", 0.4),
            ],
        ),
    );
    timelines.insert(
        BossState::Attack(1),
        Timeline::new(
            "attack1",
            vec![
                TimelineFrame::new("warden_raise", 0.25),
                TimelineFrame::new("warden_cast_0", 0.1).with_event("summon_wave"),
                TimelineFrame::new("warden_hold", 0.3),
                TimelineFrame::new("warden_cast_1", 0.1).with_event("summon_wave"),
                TimelineFrame::new("warden_recover", 0.25),
            ],
        ),
    );
    timelines.insert(
        BossState::Attack(2),
        Timeline::new(
            "attack2",
            vec![
                TimelineFrame::new("warden_charge", 0.4).with_scale(TweenSpec::over(1.3, 0.35)),
                TimelineFrame::new("warden_cast_bolt", 0.12).with_event("summon_lightning"),
                TimelineFrame::new("warden_recover", 0.3).with_scale(TweenSpec::over(1.0, 0.2)),
            ],
        ),
    );
    timelines.insert(
        BossState::Teleport,
        Timeline::new(
            "teleport",
            vec![
                TimelineFrame::new("warden_vanish_0", 0.15),
                TimelineFrame::new("warden_vanish_1", 0.15),
            ],
        ),
    );
    timelines.insert(
        BossState::Hit,
        Timeline::new(
            "hit",
            vec![
                TimelineFrame::new("warden_hit_0", 0.12),
                TimelineFrame::new("warden_hit_1", 0.15),
            ],
        ),
    );
    timelines.insert(
        BossState::Die,
        Timeline::new(
            "die",
            vec![
                TimelineFrame::new("warden_die_0", 0.35),
                TimelineFrame::new("warden_die_1", 0.35),
                TimelineFrame::new("warden_die_2", 0.4),
            ],
        )
        .with_fade_out(0.8),
    );

    BossDef {
        name: "warden".to_string(),
        profile: "warden".to_string(),
        tuning: BossTuning {
            max_health: 160,
            teleport_chance: 0.2,
            max_combo_count: 3,
            min_idle_delay: 0.6,
            max_idle_delay: 1.6,
            ..BossTuning::default()
        },
        passive: false,
        spawn_pos: Vec2::new(9.0, 0.0),
        unlocks: vec!["sigil_warden".to_string()],
        timelines,
        patterns: vec![
            AttackPatternNode::new(BossState::Attack(1))
                .with_successors(vec![NodeId(1)])
                .with_continuation(0.7),
            AttackPatternNode::new(BossState::Attack(2))
                .with_successors(vec![NodeId(0)])
                .with_continuation(0.7),
        ],
        environment: vec![
            EnvironmentPattern {
                prototype: "lightning".to_string(),
                shape: PatternKind::RandomPoint,
                interval: 7.0,
                enabled_in_session: true,
            },
            EnvironmentPattern {
                prototype: "lightning".to_string(),
                shape: PatternKind::LinearSweep {
                    bolt_count: 8,
                    spacing: 2.5,
                    bolt_delay: 0.12,
                },
                interval: 11.0,
                enabled_in_session: true,
            },
        ],
    }
}

/// Projectile artillery: no melee graph at all, the skill loop and the
/// edge rain carry the fight
pub fn null_shard_def() -> BossDef {
    let mut timelines = AHashMap::new();
    let idle = Timeline::new(
        "idle",
        vec![
            TimelineFrame::new("shard_hover_0", 0.18).with_scale(TweenSpec::over(1.05, 0.3)),
            TimelineFrame::new("shard_hover_1", 0.18),
            TimelineFrame::new("shard_hover_2", 0.18).with_scale(TweenSpec::over(0.95, 0.3)),
            TimelineFrame::new("shard_hover_3", 0.18),
        ],
    )
    .looping();
    timelines.insert(BossState::Idle, idle);
    timelines.insert(
        BossState::Intro,
        Timeline::new(
            "intro",
            vec![
                TimelineFrame::new("shard_form_0", 0.4),
                TimelineFrame::new("shard_form_1", 0.4),
                TimelineFrame::new("shard_form_2", 0.4),
            ],
        ),
    );
    timelines.insert(
        BossState::Hit,
        Timeline::new(
            "hit",
            vec![
                TimelineFrame::new("shard_flicker_0", 0.1),
                TimelineFrame::new("shard_flicker_1", 0.1),
            ],
        ),
    );
    timelines.insert(
        BossState::Die,
        Timeline::new(
            "die",
            vec![
                TimelineFrame::new("shard_shatter_0", 0.25),
                TimelineFrame::new("shard_shatter_1", 0.25),
                TimelineFrame::new("shard_shatter_2", 0.3),
            ],
        )
        .with_fade_out(0.5),
    );

    BossDef {
        name: "null_shard".to_string(),
        profile: "null_shard".to_string(),
        tuning: BossTuning {
            max_health: 100,
            min_idle_delay: 0.8,
            max_idle_delay: 1.6,
            ..BossTuning::default()
        },
        passive: false,
        spawn_pos: Vec2::new(7.0, 2.0),
        unlocks: vec!["core_null_fragment".to_string()],
        timelines,
        patterns: Vec::new(),
        environment: Vec::new(),
    }
}

/// Stationary crush-wall cage: no walking, no teleports, every pattern
/// delivered through wall frame events on a fixed decision cadence
pub fn firewall_def() -> BossDef {
    let mut timelines = AHashMap::new();
    timelines.insert(BossState::Idle, looped("idle", "firewall_hum", 4, 0.2));
    timelines.insert(
        BossState::Intro,
        Timeline::new(
            "intro",
            vec![
                TimelineFrame::new("firewall_part_0", 0.5),
                TimelineFrame::new("firewall_part_1", 0.5),
                TimelineFrame::new("firewall_part_2", 0.5),
            ],
        ),
    );
    timelines.insert(
        BossState::Attack(1),
        Timeline::new(
            "attack1",
            vec![
                TimelineFrame::new("wall_warn", 0.5),
                TimelineFrame::new("wall_close", 0.5),
                TimelineFrame::new("wall_slam", 0.1).with_event("crush"),
                TimelineFrame::new("wall_hold", 0.7),
                TimelineFrame::new("wall_reopen", 0.6),
            ],
        ),
    );
    timelines.insert(BossState::Attack(2), {
        let mut frames = vec![TimelineFrame::new("wall_prime", 0.3)];
        for i in 0..5 {
            frames.push(
                TimelineFrame::new(format!("wall_volley_{}", i), 0.3).with_event("volley"),
            );
        }
        frames.push(TimelineFrame::new("wall_settle", 0.3));
        Timeline::new("attack2", frames)
    });
    timelines.insert(BossState::Attack(3), {
        let mut frames = vec![TimelineFrame::new("wall_scan_rise", 0.3)];
        for i in 0..10 {
            frames.push(
                TimelineFrame::new(format!("wall_scan_{}", i), 0.2).with_event("scan_shot"),
            );
        }
        frames.push(TimelineFrame::new("wall_scan_settle", 0.4));
        Timeline::new("attack3", frames)
    });
    // no Hit timeline: the walls shrug hits without staggering, so no
    // post-hit invincibility window either
    timelines.insert(
        BossState::Die,
        Timeline::new(
            "die",
            vec![
                TimelineFrame::new("firewall_die_0", 0.3),
                TimelineFrame::new("firewall_die_1", 0.3),
                TimelineFrame::new("firewall_die_2", 0.4),
            ],
        )
        .with_fade_out(0.8),
    );

    BossDef {
        name: "firewall".to_string(),
        profile: "firewall".to_string(),
        tuning: BossTuning {
            max_health: 140,
            // one pattern every three seconds, like clockwork
            min_idle_delay: 3.0,
            max_idle_delay: 3.0,
            entry_x: 0.0,
            ..BossTuning::default()
        },
        passive: false,
        spawn_pos: Vec2::ZERO,
        unlocks: vec!["item_barrier".to_string()],
        timelines,
        patterns: vec![
            AttackPatternNode::new(BossState::Attack(1)).with_continuation(0.0),
            AttackPatternNode::new(BossState::Attack(2)).with_continuation(0.0),
            AttackPatternNode::new(BossState::Attack(3)).with_continuation(0.0),
        ],
        environment: Vec::new(),
    }
}

/// One-boss encounter around any built-in boss
pub fn builtin_encounter(boss: &str) -> Option<EncounterDef> {
    let boss_def = match boss {
        "demon_blade" => demon_blade_def(),
        "warden" => warden_def(),
        "null_shard" => null_shard_def(),
        "firewall" => firewall_def(),
        _ => return None,
    };
    Some(EncounterDef {
        name: format!("{}_encounter", boss),
        session: SessionConfig::default(),
        target: TargetDef::default(),
        prototypes: shared_prototypes(),
        bosses: vec![boss_def],
    })
}

pub fn builtin_boss_names() -> &'static [&'static str] {
    &["demon_blade", "warden", "null_shard", "firewall"]
}
