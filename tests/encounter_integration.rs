//! Full-session integration tests
//!
//! These run complete encounters through the public API the way an
//! embedding game loop would: build from a definition, tick with fixed
//! deltas, land scripted hits, and read the event log.

use std::path::Path;

use cursor_reboot::boss::{BossState, EncounterEventKind, Mode};
use cursor_reboot::core::types::Vec2;
use cursor_reboot::data::{build_session, builtin_encounter, load_encounter};
use cursor_reboot::session::CombatSession;
use cursor_reboot::spawnable::Projectile;

const DT: f32 = 1.0 / 60.0;

fn run_seconds(session: &mut CombatSession, seconds: f32) {
    let steps = (seconds / DT).ceil() as u32;
    for _ in 0..steps {
        session.tick(DT);
    }
}

#[test]
fn test_demon_blade_fight_to_defeat() {
    let def = builtin_encounter("demon_blade").unwrap();
    let mut session = build_session(&def, 7).unwrap();
    let boss_id = session.boss_ids()[0];

    // Swing every 0.7s for 10: outside the 0.5s post-hit immunity, so
    // every swing after the intro lands. 120 health falls in 12 swings.
    let mut next_swing = 1.5_f32;
    while !session.boss_ids().is_empty() && session.elapsed() < 90.0 {
        session.tick(DT);
        next_swing -= DT;
        if next_swing <= 0.0 {
            next_swing = 0.7;
            let _ = session.hit_boss(boss_id, 10);
        }
    }

    assert!(session.boss_ids().is_empty(), "boss should be torn down");
    assert_eq!(session.bosses_alive(), 0);
    assert!(
        session.rewards().iter().any(|r| r.0 == "trail_demon_edge"),
        "defeat should grant the configured unlock"
    );

    let events = session.events();
    let defeats = events
        .iter()
        .filter(|e| matches!(e.kind, EncounterEventKind::Defeated { .. }))
        .count();
    assert_eq!(defeats, 1);

    let grants = events
        .iter()
        .filter(|e| matches!(e.kind, EncounterEventKind::RewardsGranted { .. }))
        .count();
    assert_eq!(grants, 1);

    // 120 health crosses the 66% and 33% tiers exactly once each; the
    // killing blow stays inside the lowest tier.
    let phase_changes = events
        .iter()
        .filter(|e| matches!(e.kind, EncounterEventKind::PhaseChanged { .. }))
        .count();
    assert_eq!(phase_changes, 2);

    let intro_finished = events.iter().any(|e| {
        matches!(
            e.kind,
            EncounterEventKind::StateChanged {
                from: BossState::Intro,
                to: BossState::Idle,
                ..
            }
        )
    });
    assert!(intro_finished, "intro should complete into idle");
}

#[test]
fn test_firewall_fight_to_defeat() {
    let def = builtin_encounter("firewall").unwrap();
    let mut session = build_session(&def, 13).unwrap();
    let boss_id = session.boss_ids()[0];

    // The cage has no hit stagger and no invincibility window, so every
    // swing after the 1.5s intro lands. 140 health falls in 14 swings.
    let mut next_swing = 1.6_f32;
    while !session.boss_ids().is_empty() && session.elapsed() < 90.0 {
        session.tick(DT);
        next_swing -= DT;
        if next_swing <= 0.0 {
            next_swing = 0.7;
            let _ = session.hit_boss(boss_id, 10);
        }
    }

    assert!(session.boss_ids().is_empty(), "boss should be torn down");
    assert!(
        session.rewards().iter().any(|r| r.0 == "item_barrier"),
        "defeat should grant the barrier unlock"
    );

    let events = session.events();
    let defeats = events
        .iter()
        .filter(|e| matches!(e.kind, EncounterEventKind::Defeated { .. }))
        .count();
    assert_eq!(defeats, 1);

    let phase_changes = events
        .iter()
        .filter(|e| matches!(e.kind, EncounterEventKind::PhaseChanged { .. }))
        .count();
    assert_eq!(phase_changes, 2);

    // The fixed 3s decision cadence leaves room for at least one wall
    // pattern before the health runs out
    let attacks = events
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                EncounterEventKind::StateChanged { to: BossState::Attack(_), .. }
            )
        })
        .count();
    assert!(attacks >= 1, "expected at least one wall pattern, saw {}", attacks);
}

#[test]
fn test_twin_trial_bosses_tear_down_independently() {
    let def = load_encounter(Path::new("data/encounters/twin_trial.toml")).unwrap();
    assert_eq!(def.bosses.len(), 2);
    let mut session = build_session(&def, 11).unwrap();

    let find = |session: &CombatSession, name: &str| {
        session
            .boss_ids()
            .into_iter()
            .find(|id| session.boss(*id).map(|b| b.body.name == name).unwrap_or(false))
    };
    let shard_id = find(&session, "null_shard").unwrap();
    let warden_id = find(&session, "warden").unwrap();

    // Both intros finish inside 4s; the warden's two environment
    // schedules plus the shard's edge rain should all be live, and the
    // shard's projectiles flying.
    run_seconds(&mut session, 4.0);
    assert_eq!(session.scheduled_tasks(), 3);
    assert!(
        session.registry_mut().pool::<Projectile>().is_some(),
        "shard volleys should have fired by now"
    );

    // Kill only the shard
    let mut next_swing = 0.0_f32;
    while session.boss(shard_id).is_some() && session.elapsed() < 40.0 {
        session.tick(DT);
        next_swing -= DT;
        if next_swing <= 0.0 {
            next_swing = 0.6;
            let _ = session.hit_boss(shard_id, 25);
        }
    }

    assert!(session.boss(shard_id).is_none(), "shard should be torn down");
    assert!(session.boss(warden_id).is_some(), "warden should survive");
    assert_eq!(session.bosses_alive(), 1);

    // The shard's edge rain died with it; the warden's schedules remain
    assert_eq!(session.scheduled_tasks(), 2);
    assert!(session.rewards().iter().any(|r| r.0 == "core_null_fragment"));
    assert!(!session.rewards().iter().any(|r| r.0 == "sigil_warden"));
}

#[test]
fn test_gallery_boss_provokes_exactly_once() {
    let def = load_encounter(Path::new("data/encounters/gallery.toml")).unwrap();
    let mut session = build_session(&def, 3).unwrap();
    let id = session.boss_ids()[0];
    assert_eq!(session.boss(id).unwrap().mode(), Mode::Passive);

    // Posed exhibits never act on their own
    run_seconds(&mut session, 2.0);
    assert_eq!(session.boss(id).unwrap().state(), BossState::Idle);

    // Two quick strikes: one provocation beat, no damage taken
    session.hit_boss(id, 50).unwrap();
    session.hit_boss(id, 50).unwrap();
    run_seconds(&mut session, 2.5);

    let boss = session.boss(id).unwrap();
    assert_eq!(boss.mode(), Mode::Hostile);
    assert_eq!(boss.body.health_ratio(), 1.0, "provoking hits deal no damage");

    let starts = session
        .events()
        .iter()
        .filter(|e| matches!(e.kind, EncounterEventKind::CombatStarted { .. }))
        .count();
    assert_eq!(starts, 1);

    // Hostile now: damage lands
    session.hit_boss(id, 20).unwrap();
    assert!(session.boss(id).unwrap().body.health_ratio() < 1.0);
}

#[test]
fn test_difficulty_accelerates_playback() {
    let def = builtin_encounter("warden").unwrap();
    let mut base = build_session(&def, 5).unwrap();
    let mut fast = build_session(&def, 5).unwrap();
    fast.apply_difficulty(2.0);

    run_seconds(&mut base, 3.0);
    run_seconds(&mut fast, 3.0);

    let intro_done_at = |session: &CombatSession| {
        session.events().iter().find_map(|e| match e.kind {
            EncounterEventKind::StateChanged {
                from: BossState::Intro,
                to: BossState::Idle,
                ..
            } => Some(e.at),
            _ => None,
        })
    };
    let base_at = intro_done_at(&base).expect("authored-speed intro finishes within 3s");
    let fast_at = intro_done_at(&fast).expect("doubled-speed intro finishes within 3s");
    assert!(
        fast_at < base_at,
        "doubled playback should finish the intro sooner ({} vs {})",
        fast_at,
        base_at
    );
}

#[test]
fn test_stop_cancels_hazards_but_keeps_bosses() {
    let def = builtin_encounter("warden").unwrap();
    let mut session = build_session(&def, 9).unwrap();
    session.move_target(Vec2::new(-6.0, 0.0));

    run_seconds(&mut session, 6.0);
    assert_eq!(session.scheduled_tasks(), 2);

    session.stop();
    assert_eq!(session.scheduled_tasks(), 0);
    assert_eq!(session.registry_mut().total_active(), 0);
    assert_eq!(session.bosses_alive(), 1);

    // The session stays usable after a stop
    run_seconds(&mut session, 1.0);
    assert_eq!(session.bosses_alive(), 1);
}
