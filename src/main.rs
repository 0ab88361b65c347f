//! Cursor Reboot - Encounter Playground
//!
//! Interactive driver for poking at a combat session from a terminal:
//! load an encounter, tick it, land hits, move the target around and
//! watch the event log. The renderer-facing API is exercised end to end
//! without any renderer.

use std::io::{self, Write};
use std::path::Path;

use cursor_reboot::boss::BossState;
use cursor_reboot::core::error::Result;
use cursor_reboot::core::types::Vec2;
use cursor_reboot::data::{build_session, builtin_boss_names, builtin_encounter, load_encounter};
use cursor_reboot::session::CombatSession;

/// Seconds of simulated time per `tick` command
const STEP: f32 = 0.1;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("cursor_reboot=debug")
        .init();

    tracing::info!("Cursor Reboot playground starting...");

    let mut session = load_named("demon_blade", 42)?;

    println!("\n=== CURSOR REBOOT ===");
    println!("Boss encounter playground");
    println!();
    println!("Commands:");
    println!("  tick / t           - Advance the session by {:.1}s", STEP);
    println!("  run <seconds>      - Advance the session by that many seconds");
    println!("  hit <amount>       - Strike the first living boss");
    println!("  move <x> <y>       - Reposition the target");
    println!("  status / s         - Show detailed status");
    println!("  events / e         - Drain and print the event log");
    println!("  load <name|path>   - Load a built-in boss or an encounter file");
    println!("  quit / q           - Exit");
    println!();
    println!("Built-in bosses: {}", builtin_boss_names().join(", "));
    println!();

    loop {
        display_status(&session);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "tick" || input == "t" {
            session.tick(STEP);
            print_events(&mut session);
            continue;
        }

        if input == "status" || input == "s" {
            display_detailed_status(&session);
            continue;
        }

        if input == "events" || input == "e" {
            print_events(&mut session);
            continue;
        }

        if let Some(rest) = input.strip_prefix("run ") {
            if let Ok(seconds) = rest.trim().parse::<f32>() {
                let steps = (seconds / STEP).ceil() as u32;
                println!("Running {:.1}s ({} steps)...", seconds, steps);
                for _ in 0..steps {
                    session.tick(STEP);
                }
                print_events(&mut session);
            } else {
                println!("Usage: run <seconds>");
            }
            continue;
        }

        if let Some(rest) = input.strip_prefix("hit ") {
            if let Ok(amount) = rest.trim().parse::<i32>() {
                strike_first_living(&mut session, amount);
                print_events(&mut session);
            } else {
                println!("Usage: hit <amount>");
            }
            continue;
        }

        if let Some(rest) = input.strip_prefix("move ") {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            match (parts.first(), parts.get(1)) {
                (Some(x), Some(y)) => {
                    if let (Ok(x), Ok(y)) = (x.parse::<f32>(), y.parse::<f32>()) {
                        session.move_target(Vec2::new(x, y));
                        println!("Target moved to ({:.1}, {:.1})", x, y);
                    } else {
                        println!("Usage: move <x> <y>");
                    }
                }
                _ => println!("Usage: move <x> <y>"),
            }
            continue;
        }

        if let Some(rest) = input.strip_prefix("load ") {
            let name = rest.trim();
            match load_named(name, 42) {
                Ok(fresh) => {
                    session = fresh;
                    println!("Loaded '{}'", name);
                }
                Err(e) => println!("Could not load '{}': {}", name, e),
            }
            continue;
        }

        println!("Unknown command. Available: tick, run <s>, hit <n>, move <x> <y>, status, events, load <name>, quit");
    }

    println!(
        "\nGoodbye! Final state: {} boss(es) alive, {:.1}s elapsed, {} reward(s) earned.",
        session.bosses_alive(),
        session.elapsed(),
        session.rewards().len()
    );
    Ok(())
}

/// Builds a session from a built-in boss name or an encounter file path
fn load_named(name: &str, seed: u64) -> Result<CombatSession> {
    let def = match builtin_encounter(name) {
        Some(def) => def,
        None => load_encounter(Path::new(name))?,
    };
    build_session(&def, seed)
}

fn strike_first_living(session: &mut CombatSession, amount: i32) {
    let living = session
        .boss_ids()
        .into_iter()
        .find(|id| session.boss(*id).map(|b| b.is_alive()).unwrap_or(false));
    match living {
        Some(id) => {
            if let Err(e) = session.hit_boss(id, amount) {
                println!("Hit failed: {}", e);
            }
        }
        None => println!("No living boss to hit."),
    }
}

/// Display a brief status summary
fn display_status(session: &CombatSession) {
    println!();
    let target = session.target();
    println!(
        "--- {:.1}s | Target: {}/{} HP | Tasks: {} ---",
        session.elapsed(),
        target.health,
        target.max_health,
        session.scheduled_tasks()
    );

    for id in session.boss_ids() {
        if let Some(boss) = session.boss(id) {
            println!(
                "  {} - {:?} | state: {} | {:?} | HP {:.0}%",
                boss.body.name,
                boss.mode(),
                boss.state(),
                boss.phase(),
                boss.body.health_ratio() * 100.0
            );
        }
    }
    println!();
}

/// Display detailed status of the whole session
fn display_detailed_status(session: &CombatSession) {
    println!();
    println!("=== Detailed Status ({:.1}s) ===", session.elapsed());
    println!();

    let target = session.target();
    println!("Target");
    println!(
        "  Position: ({:.1}, {:.1}), Health: {}/{}, Alive: {}",
        target.pos.x, target.pos.y, target.health, target.max_health, target.alive
    );
    println!();

    for id in session.boss_ids() {
        let Some(boss) = session.boss(id) else { continue };
        println!("{}", boss.body.name);
        println!(
            "  Mode: {:?}, State: {}, Phase: {:?}",
            boss.mode(),
            boss.state(),
            boss.phase()
        );
        println!(
            "  Position: ({:.1}, {:.1}), Health: {:.0}%, Combo: {}",
            boss.body.pos.x,
            boss.body.pos.y,
            boss.body.health_ratio() * 100.0,
            boss.body.combo_count()
        );
        if boss.state() == BossState::Die {
            println!("  (death sequence playing)");
        }
        println!();
    }

    println!(
        "Scheduled tasks: {}, Rewards earned: {}",
        session.scheduled_tasks(),
        session.rewards().len()
    );
    if !session.rewards().is_empty() {
        for reward in session.rewards() {
            println!("  - {}", reward);
        }
    }
    println!();
}

fn print_events(session: &mut CombatSession) {
    for event in session.drain_events() {
        println!("  [{:6.2}s] {}", event.at, event.description);
    }
}
