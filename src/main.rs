//! Lane Battle Simulator
//!
//! Runs one headless match, then replays it to check determinism.
//!
//! Usage: `lane-battle-sim [config.json] [max_ticks]`

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use lane_battle::{
    core::hash::StateHash,
    game::sim::{BattleSim, MatchOutcome},
    SimConfig, TICK_RATE, VERSION,
};

/// Default tick cap (3 minutes at 60 Hz)
const DEFAULT_MAX_TICKS: u64 = 10_800;

/// Progress log interval in frames
const REPORT_INTERVAL: u64 = 600;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    info!("Lane Battle Simulator v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load(&path).with_context(|| format!("Failed to load {}", path))?,
        None => demo_config(),
    };
    let max_ticks = match args.next() {
        Some(raw) => raw.parse::<u64>().with_context(|| format!("Invalid max_ticks: {}", raw))?,
        None => DEFAULT_MAX_TICKS,
    };

    info!("=== Starting Match ===");
    let (outcome, frame, hash) = run_match(config.clone(), max_ticks, true)?;

    info!("=== Match Results ===");
    match outcome {
        MatchOutcome::Winner(side) => info!("Side {} wins at frame {}", side, frame),
        MatchOutcome::BothTowersDown => info!("Both towers fell at frame {}", frame),
        MatchOutcome::InProgress => info!("No winner after {} frames", frame),
    }
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let (_, replay_frame, replay_hash) = run_match(config, max_ticks, false)?;
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash || frame != replay_frame {
        bail!("DETERMINISM FAILURE: Hashes differ!");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");

    Ok(())
}

/// Stock tuning with a small opening wave on each side.
fn demo_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.melee.count_per_side = 3;
    config.archer.count_per_side = 2;
    config
}

/// Run until the match is decided or `max_ticks` elapse.
fn run_match(config: SimConfig, max_ticks: u64, verbose: bool) -> Result<(MatchOutcome, u64, StateHash)> {
    let mut sim = BattleSim::new(config)?;
    let mut total_events = 0usize;
    let mut total_despawns = 0usize;

    for _ in 0..max_ticks {
        let result = sim.tick();
        total_events += result.events.len();
        total_despawns += result.despawned.len();

        if verbose && result.frame % REPORT_INTERVAL == 0 {
            info!(
                "Frame {}: {} entities, tower HP {} / {}, {} events, {} despawns so far",
                result.frame,
                sim.entities().count(),
                sim.tower_hp(0),
                sim.tower_hp(1),
                total_events,
                total_despawns
            );
        }

        if sim.outcome().is_over() {
            break;
        }
    }

    let outcome = sim.outcome();
    if verbose && !outcome.is_over() {
        warn!("Tick cap of {} reached before a tower fell", max_ticks);
    }

    let snapshot = sim.build_snapshot();
    Ok((outcome, snapshot.frame, snapshot.state_hash()))
}
