//! Starstead - Entry Point
//!
//! Interactive shell around the engine: advance the clock, inspect claim
//! stakes, construct and upgrade buildings, grant resources. The shell
//! drives the engine with a synthetic wall clock so `tick` always means
//! one tick interval of game time, independent of typing speed.

use std::io::{self, Write};
use std::time::Instant;

use starstead::catalog::Catalog;
use starstead::core::config::EngineConfig;
use starstead::core::error::Result;
use starstead::core::types::{StakeId, Tier};
use starstead::engine::{Engine, InitialState, StakeSetup};
use starstead::stake::tags;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("starstead=info")
        .init();

    tracing::info!("Starstead starting...");

    let config = EngineConfig::default();
    let tick_interval = config.tick_interval;
    let mut engine = Engine::new(Catalog::with_defaults(), config);
    engine.start(demo_state())?;

    let mut now = Instant::now();
    engine.tick_at(now); // establish the clock baseline

    println!("\n=== STARSTEAD ===");
    println!("A colonization economy simulation");
    println!();
    println!("Commands:");
    println!("  tick / t                     - Advance one tick interval");
    println!("  run <n>                      - Advance n tick intervals");
    println!("  pause / resume               - Pause or resume the clock");
    println!("  speed <x>                    - Set the time-speed multiplier");
    println!("  status / s                   - Show all claim stakes");
    println!("  options <stake#>             - List buildable definitions");
    println!("  construct <stake#> <key>     - Build on a claim stake");
    println!("  upgrade <stake#> <building#> - Upgrade a built instance");
    println!("  give <stake#> <resource> <n> - Grant resources");
    println!("  quit / q                     - Exit");
    println!();

    loop {
        display_summary(&engine);

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
            now += tick_interval;
            let outcome = engine.tick_at(now);
            println!("Tick {} complete (dt={:.2}s).", outcome.tick, outcome.dt);
            continue;
        }

        if let Some(rest) = input.strip_prefix("run ") {
            if let Ok(n) = rest.trim().parse::<u32>() {
                for _ in 0..n {
                    now += tick_interval;
                    engine.tick_at(now);
                }
                println!("Completed {} ticks.", n);
            } else {
                println!("Usage: run <number>");
            }
            continue;
        }

        if input == "pause" {
            engine.set_paused(true);
            println!("Paused.");
            continue;
        }
        if input == "resume" {
            engine.set_paused(false);
            println!("Resumed.");
            continue;
        }

        if let Some(rest) = input.strip_prefix("speed ") {
            match rest.trim().parse::<f32>() {
                Ok(speed) => match engine.set_speed(speed) {
                    Ok(()) => println!("Speed set to {}x.", speed),
                    Err(e) => println!("{}", e),
                },
                Err(_) => println!("Usage: speed <multiplier>"),
            }
            continue;
        }

        if input == "status" || input == "s" {
            display_detailed_status(&engine);
            continue;
        }

        if let Some(rest) = input.strip_prefix("options ") {
            match resolve_stake(&engine, rest.trim()) {
                Some(stake) => display_options(&engine, stake),
                None => println!("Usage: options <stake#>"),
            }
            continue;
        }

        if let Some(rest) = input.strip_prefix("construct ") {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            if let (Some(stake), Some(key)) = (
                parts.first().and_then(|p| resolve_stake(&engine, p)),
                parts.get(1),
            ) {
                match engine.construct(key, stake) {
                    Ok(receipt) => println!(
                        "Built {} (instance {:?}).",
                        key,
                        receipt.instance.map(|i| i.0).unwrap_or(0)
                    ),
                    Err(failure) => print_failure(&failure),
                }
            } else {
                println!("Usage: construct <stake#> <building-key>");
            }
            continue;
        }

        if let Some(rest) = input.strip_prefix("upgrade ") {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            let stake = parts.first().and_then(|p| resolve_stake(&engine, p));
            let building = parts.get(1).and_then(|p| p.parse::<usize>().ok());
            if let (Some(stake), Some(index)) = (stake, building) {
                let instance = engine
                    .stake(stake)
                    .and_then(|s| s.instances.get(index))
                    .map(|i| i.id);
                match instance {
                    Some(instance) => match engine.upgrade(instance, stake) {
                        Ok(receipt) => {
                            println!("Upgraded; stake now has {} buildings.", receipt.stake.buildings.len())
                        }
                        Err(failure) => print_failure(&failure),
                    },
                    None => println!("No building #{} on that stake.", index),
                }
            } else {
                println!("Usage: upgrade <stake#> <building#>");
            }
            continue;
        }

        if let Some(rest) = input.strip_prefix("give ") {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            let stake = parts.first().and_then(|p| resolve_stake(&engine, p));
            let amount = parts.get(2).and_then(|p| p.parse::<f32>().ok());
            if let (Some(stake), Some(resource), Some(amount)) = (stake, parts.get(1), amount) {
                match engine.receive_resources(stake, &[(*resource, amount)]) {
                    Ok(_) => println!("Granted {:.1} {}.", amount, resource),
                    Err(failure) => print_failure(&failure),
                }
            } else {
                println!("Usage: give <stake#> <resource> <amount>");
            }
            continue;
        }

        println!("Unknown command. Try: tick, run <n>, pause, resume, speed <x>, status, options, construct, upgrade, give, quit");
    }

    let snapshot = engine.snapshot();
    println!(
        "\nGoodbye! Final state: {} claim stakes, {} ticks, {:.0}s of game time.",
        snapshot.claim_stakes.len(),
        snapshot.tick,
        snapshot.game_time
    );
    Ok(())
}

/// Demo world: an established terrestrial colony and a young volcanic one
fn demo_state() -> InitialState {
    InitialState::new()
        .with_stake(
            StakeSetup::new("terrestrial", Tier::T2)
                .with_building("central-hub-t1")
                .with_building("hydrogen-extractor-t1")
                .with_resource("steel", 250.0),
        )
        .with_stake(
            StakeSetup::new("volcanic", Tier::T1)
                .with_building("central-hub-t1")
                .with_building("iron-ore-extractor-t1")
                .with_resource("steel", 60.0),
        )
}

fn resolve_stake(engine: &Engine, index: &str) -> Option<StakeId> {
    let index: usize = index.parse().ok()?;
    engine.stake_ids().get(index).copied()
}

/// What the stake could build: open right now, or reachable after more
/// construction unlocks the missing tags
fn display_options(engine: &Engine, id: StakeId) {
    let Some(stake) = engine.stake(id) else {
        return;
    };
    let catalog = engine.catalog();
    println!();
    println!("Buildable on {}:", catalog.planet(stake.planet).key);
    for def in catalog.buildings() {
        if def.hub && stake.has_hub_of_family(catalog, &def.family, None) {
            continue;
        }
        let tags_open = def
            .required_tags
            .iter()
            .all(|tag| stake.unlocked_tags.contains(tag));
        if def.admits_stake_tier(stake.tier) && tags_open {
            println!("  {} ({})", def.key, def.name);
        } else if tags::eventually_constructible(stake, catalog, def) {
            println!("  {} ({}) - locked for now", def.key, def.name);
        }
    }
}

fn print_failure(failure: &starstead::stake::CommandFailure) {
    println!("Rejected:");
    for condition in &failure.conditions {
        println!("  - {}", condition);
    }
}

fn display_summary(engine: &Engine) {
    let snapshot = engine.snapshot();
    let state = if !engine.is_running() {
        "stopped"
    } else if engine.is_paused() {
        "paused"
    } else {
        "running"
    };
    println!();
    println!(
        "--- Tick {} | {} | {}x | {} stakes ---",
        snapshot.tick,
        state,
        engine.speed(),
        snapshot.claim_stakes.len()
    );

    for (index, id) in engine.stake_ids().iter().enumerate() {
        if let Some(stake) = snapshot.claim_stakes.get(id) {
            let mut resources: Vec<(&String, &f32)> = stake.resources.iter().collect();
            resources.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
            let top: Vec<String> = resources
                .iter()
                .take(3)
                .map(|(name, amount)| format!("{} {:.1}", name, amount))
                .collect();
            println!(
                "  [{}] {} {} - {} buildings, power {:+.0}, {}",
                index,
                stake.planet,
                Tier::from_u8(stake.tier).map(|t| t.to_string()).unwrap_or_default(),
                stake.buildings.len(),
                stake.power.net,
                if top.is_empty() {
                    "no resources".to_string()
                } else {
                    top.join(", ")
                }
            );
        }
    }
}

fn display_detailed_status(engine: &Engine) {
    let snapshot = engine.snapshot();
    println!();
    println!("=== Status (tick {}) ===", snapshot.tick);

    for (index, id) in engine.stake_ids().iter().enumerate() {
        let Some(stake) = snapshot.claim_stakes.get(id) else {
            continue;
        };
        println!();
        println!("[{}] {} stake on {}", index, Tier::from_u8(stake.tier).map(|t| t.to_string()).unwrap_or_default(), stake.planet);
        println!(
            "  Power: {:+.1} net ({:.1} gen / {:.1} use)  Crew: {}/{}  Storage: {:.0}",
            stake.power.net,
            stake.power.generation,
            stake.power.consumption,
            stake.crew.needed,
            stake.crew.slots,
            stake.storage.capacity
        );
        println!("  Buildings:");
        for (b_index, building) in stake.buildings.iter().enumerate() {
            println!(
                "    [{}] {} (T{}{})",
                b_index,
                building.name,
                building.tier,
                if building.hub { ", hub" } else { "" }
            );
        }
        if !stake.orders.is_empty() {
            println!("  Construction log:");
            for order in stake.orders.iter().rev().take(3) {
                println!("    {} at {:.0}s", order.building, order.completed_at);
            }
        }
        if !stake.resources.is_empty() {
            let mut resources: Vec<(&String, &f32)> = stake.resources.iter().collect();
            resources.sort_by(|a, b| a.0.cmp(b.0));
            println!("  Resources:");
            for (name, amount) in resources {
                println!("    {} {:.2}", name, amount);
            }
        }
        println!("  Unlocked: {}", stake.unlocked_tags.join(", "));
    }

    let mut global: Vec<(&String, &f32)> = snapshot.global_resources.iter().collect();
    global.sort_by(|a, b| a.0.cmp(b.0));
    println!();
    println!("Global pool:");
    for (name, amount) in global {
        println!("  {} {:.2}", name, amount);
    }
}
