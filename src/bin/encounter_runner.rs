//! Headless Encounter Runner
//!
//! Runs a boss encounter against a scripted target and outputs a JSON
//! summary for balance tuning. The target circles the field and lands a
//! fixed hit on a cadence, which is crude but enough to compare pacing
//! and time-to-kill across tuning changes.

use std::path::Path;

use clap::Parser;
use cursor_reboot::core::types::Vec2;
use cursor_reboot::data::{build_session, builtin_boss_names, builtin_encounter, load_encounter};
use cursor_reboot::session::CombatSession;
use serde::Serialize;

/// Headless Encounter Runner - scripted target vs boss for balance runs
#[derive(Parser, Debug)]
#[command(name = "encounter_runner")]
#[command(about = "Run a boss encounter headless and output a JSON summary")]
struct Args {
    /// Built-in boss name (demon_blade, warden, null_shard, firewall)
    #[arg(long, default_value = "demon_blade")]
    boss: String,

    /// Encounter definition file; overrides --boss when set
    #[arg(long)]
    encounter: Option<String>,

    /// Simulation step in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Maximum simulated seconds before timeout
    #[arg(long, default_value_t = 180.0)]
    max_seconds: f32,

    /// Seconds between scripted hits on the boss
    #[arg(long, default_value_t = 0.8)]
    hit_interval: f32,

    /// Damage per scripted hit
    #[arg(long, default_value_t = 7)]
    hit_damage: i32,

    /// Cadence/playback multiplier applied after spawn (1.0 = authored)
    #[arg(long, default_value_t = 1.0)]
    difficulty: f32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print every encounter event to stderr as it happens
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct EncounterResult {
    encounter: String,
    outcome: String,
    elapsed_seconds: f32,
    ticks: u64,
    target_health_remaining: i32,
    bosses_defeated: usize,
    bosses_total: usize,
    rewards: Vec<String>,
    events_logged: usize,
    seed: u64,
}

fn main() {
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);

    let def = match &args.encounter {
        Some(path) => match load_encounter(Path::new(path)) {
            Ok(def) => def,
            Err(e) => {
                eprintln!("Failed to load encounter '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        None => match builtin_encounter(&args.boss) {
            Some(def) => def,
            None => {
                eprintln!(
                    "Unknown boss '{}'. Built-ins: {}",
                    args.boss,
                    builtin_boss_names().join(", ")
                );
                std::process::exit(1);
            }
        },
    };

    let encounter_name = def.name.clone();
    let bosses_total = def.bosses.len();

    let mut session = match build_session(&def, seed) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to build session: {}", e);
            std::process::exit(1);
        }
    };
    if args.difficulty != 1.0 {
        session.apply_difficulty(args.difficulty);
    }

    if args.verbose {
        eprintln!("=== Encounter Started ===");
        eprintln!(
            "{}: {} boss(es), seed {}, dt {:.4}s",
            encounter_name, bosses_total, seed, args.dt
        );
    }

    // Run loop: the scripted target orbits the center and swings on a
    // fixed cadence at whichever boss is still standing.
    let mut ticks: u64 = 0;
    let mut next_hit_in = args.hit_interval;
    let mut events_logged = 0usize;
    while session.elapsed() < args.max_seconds
        && session.target().alive
        && session.bosses_alive() > 0
    {
        session.tick(args.dt);
        ticks += 1;

        let orbit = session.elapsed() * 0.7;
        session.move_target(Vec2::new(orbit.cos() * 3.0, orbit.sin() * 1.5));

        next_hit_in -= args.dt;
        if next_hit_in <= 0.0 {
            next_hit_in = args.hit_interval;
            let living = session
                .boss_ids()
                .into_iter()
                .find(|id| session.boss(*id).map(|b| b.is_alive()).unwrap_or(false));
            if let Some(id) = living {
                // Misses against torn-down bosses just skip the swing
                let _ = session.hit_boss(id, args.hit_damage);
            }
        }

        let events = session.drain_events();
        events_logged += events.len();
        if args.verbose {
            for event in &events {
                eprintln!("  [{:6.2}s] {}", event.at, event.description);
            }
        }
    }

    // Let death timelines play out so teardown runs and rewards land
    // in the summary
    let mut grace = 5.0_f32;
    while session.bosses_alive() == 0 && !session.boss_ids().is_empty() && grace > 0.0 {
        session.tick(args.dt);
        ticks += 1;
        grace -= args.dt;
        let events = session.drain_events();
        events_logged += events.len();
        if args.verbose {
            for event in &events {
                eprintln!("  [{:6.2}s] {}", event.at, event.description);
            }
        }
    }

    let outcome = if !session.target().alive {
        "target_down"
    } else if session.bosses_alive() == 0 {
        "bosses_defeated"
    } else {
        "timeout"
    };

    let result = EncounterResult {
        encounter: encounter_name,
        outcome: outcome.to_string(),
        elapsed_seconds: session.elapsed(),
        ticks,
        target_health_remaining: session.target().health,
        bosses_defeated: bosses_total - session.bosses_alive(),
        bosses_total,
        rewards: session.rewards().iter().map(|r| r.to_string()).collect(),
        events_logged,
        seed,
    };

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result).unwrap());
        }
        "text" => {
            println!("Encounter Result");
            println!("================");
            println!("Encounter: {}", result.encounter);
            println!("Outcome: {}", result.outcome);
            println!("Elapsed: {:.1}s ({} ticks)", result.elapsed_seconds, result.ticks);
            println!("Target health remaining: {}", result.target_health_remaining);
            println!(
                "Bosses defeated: {}/{}",
                result.bosses_defeated, result.bosses_total
            );
            if !result.rewards.is_empty() {
                println!("Rewards: {}", result.rewards.join(", "));
            }
            println!("Events logged: {}", result.events_logged);
            println!("Seed: {}", result.seed);
        }
        _ => {
            eprintln!("Unknown format '{}', defaulting to json", args.format);
            println!("{}", serde_json::to_string_pretty(&result).unwrap());
        }
    }
}
