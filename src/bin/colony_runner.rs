//! Headless Colony Runner
//!
//! Runs the economy engine for a fixed number of ticks and prints the
//! final state, either as a human-readable summary or as a JSON snapshot.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;

use starstead::catalog::Catalog;
use starstead::core::config::EngineConfig;
use starstead::core::types::Tier;
use starstead::engine::{Engine, InitialState, StakeSetup};

/// Headless Colony Runner - drive the economy engine without a UI
#[derive(Parser, Debug)]
#[command(name = "colony_runner")]
#[command(about = "Run the colonization economy engine headless")]
struct Args {
    /// Catalog TOML to load (defaults to the bundled catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 120)]
    ticks: u32,

    /// Wall-clock seconds represented by one tick
    #[arg(long, default_value_t = 1.0)]
    step_secs: f32,

    /// Time-speed multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Emit the final engine snapshot as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => Catalog::load_from_toml(path)?,
        None => Catalog::with_defaults(),
    };

    let mut engine = Engine::new(catalog, EngineConfig::default());
    engine.set_speed(args.speed)?;
    engine.start(demo_state())?;

    let step = Duration::from_secs_f32(args.step_secs.max(0.0));
    let mut now = Instant::now();
    engine.tick_at(now); // establish the clock baseline

    for _ in 0..args.ticks {
        now += step;
        engine.tick_at(now);
    }

    let snapshot = engine.snapshot();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!(
        "Simulated {} ticks ({:.0}s of game time) across {} claim stakes",
        args.ticks,
        snapshot.game_time,
        snapshot.claim_stakes.len()
    );
    for id in engine.stake_ids() {
        let Some(stake) = snapshot.claim_stakes.get(&id) else {
            continue;
        };
        println!();
        println!(
            "{} T{} - {} buildings, power {:+.1}, crew {}/{}",
            stake.planet,
            stake.tier,
            stake.buildings.len(),
            stake.power.net,
            stake.crew.needed,
            stake.crew.slots
        );
        let mut resources: Vec<(&String, &f32)> = stake.resources.iter().collect();
        resources.sort_by(|a, b| a.0.cmp(b.0));
        for (name, amount) in resources {
            println!("  {:<14} {:>10.2}", name, amount);
        }
    }

    let mut global: Vec<(&String, &f32)> = snapshot.global_resources.iter().collect();
    global.sort_by(|a, b| a.0.cmp(b.0));
    println!();
    println!("Global pool:");
    for (name, amount) in global {
        println!("  {:<14} {:>10.2}", name, amount);
    }

    Ok(())
}

/// Demo world: an established terrestrial colony and a young volcanic one
fn demo_state() -> InitialState {
    InitialState::new()
        .with_stake(
            StakeSetup::new("terrestrial", Tier::T2)
                .with_building("central-hub-t1")
                .with_building("hydrogen-extractor-t1")
                .with_building("fuel-processor-t1")
                .with_resource("steel", 250.0),
        )
        .with_stake(
            StakeSetup::new("volcanic", Tier::T1)
                .with_building("central-hub-t1")
                .with_building("iron-ore-extractor-t1")
                .with_resource("steel", 60.0),
        )
}
