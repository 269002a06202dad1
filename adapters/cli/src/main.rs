#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Ridgeline Defence level headlessly.
//!
//! The binary drives the same command and event loop a rendering frontend
//! would: every frame it ticks the world, recomputes targets, applies the
//! resulting fire commands, and hands the frame's event log to the
//! spawning and analytics systems. A simple autoplay strategy places
//! towers on buildable cells as credits allow, so a full run exercises
//! placement, combat, splits, and the economy end to end.

mod config;

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use rand::{seq::SliceRandom, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use ridgeline_defence_core::{
    config::{GameConfig, TileKind},
    CellCoord, Command, Event, PlacementError, TowerKind, TowerTarget,
};
use ridgeline_defence_system_analytics::Analytics;
use ridgeline_defence_system_spawning::{Config as SpawnConfig, Spawning, WavePhase};
use ridgeline_defence_system_tower_combat::TowerCombat;
use ridgeline_defence_system_tower_targeting::TowerTargeting;
use ridgeline_defence_world::{apply, query, World};

/// Simulated frame duration, close to sixty frames per second.
const FRAME_DT: Duration = Duration::from_micros(16_667);

/// Headless Ridgeline Defence runner.
#[derive(Debug, Parser)]
#[command(name = "ridgeline-defence", version)]
struct Args {
    /// Level file in TOML format. Runs the built-in level when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for every source of randomness in the run.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Fractional jitter applied to spawn intervals, clamped to [0, 0.9].
    #[arg(long, default_value_t = 0.15)]
    jitter: f32,
    /// Upper bound on simulated frames before the run is cut short.
    #[arg(long, default_value_t = 36_000)]
    max_frames: u64,
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    /// Every wave segment drained with lives to spare.
    Cleared,
    /// The base ran out of lives.
    Overrun,
    /// The frame budget elapsed before the wave resolved.
    OutOfFrames,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = config::load(args.config.as_deref())?;
    run(level, &args)
}

fn run(level: GameConfig, args: &Args) -> anyhow::Result<()> {
    let mut world =
        World::new(level.clone()).context("failed to construct world from level")?;
    println!("{}", query::welcome_banner(&world));

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let spawn_seed = rng.next_u64();
    let mut spawning = Spawning::new(SpawnConfig::new(
        level.level().segments().to_vec(),
        args.jitter,
        spawn_seed,
    ));
    let mut targeting = TowerTargeting::new();
    let mut combat = TowerCombat::new();
    let mut analytics = Analytics::new();
    let mut plan = build_plan(&level, &mut rng);

    let mut events: Vec<Event> = Vec::new();
    let mut spawn_commands: Vec<Command> = Vec::new();
    let mut fire_commands: Vec<Command> = Vec::new();
    let mut targets: Vec<TowerTarget> = Vec::new();
    let mut outcome = Outcome::OutOfFrames;

    for _ in 0..args.max_frames {
        events.clear();
        apply(&mut world, Command::Tick { dt: FRAME_DT }, &mut events);

        attempt_placement(&mut world, &mut plan, &mut events);

        {
            let towers = query::tower_view(&world);
            let enemies = query::enemy_view(&world);
            let cooldowns = query::cooldown_view(&world);
            targeting.handle(&towers, &enemies, query::height_view(&world), &mut targets);
            combat.handle(&targets, &cooldowns, &mut fire_commands);
        }
        for command in fire_commands.drain(..) {
            apply(&mut world, command, &mut events);
        }

        // The spawning system reads the full frame log so split
        // announcements from this frame's shots become child batches
        // without a frame of latency.
        spawning.handle(&events, &mut spawn_commands);
        for command in spawn_commands.drain(..) {
            apply(&mut world, command, &mut events);
        }

        analytics.handle(&events);

        if query::lives(&world) == 0 {
            outcome = Outcome::Overrun;
            break;
        }
        if spawning.phase(query::active_enemy_count(&world)) == WavePhase::Complete {
            outcome = Outcome::Cleared;
            break;
        }
    }

    print_summary(&world, outcome, &analytics);
    Ok(())
}

/// Pairs every buildable cell with a tower kind, in a seed-determined order.
///
/// Cells are shuffled so different seeds produce different defences, while
/// tower kinds rotate through the configured archetypes.
fn build_plan(level: &GameConfig, rng: &mut ChaCha8Rng) -> VecDeque<(TowerKind, CellCoord)> {
    let map = level.map();
    let mut cells: Vec<CellCoord> = map
        .tiles()
        .iter()
        .enumerate()
        .filter(|(_, tile)| **tile == TileKind::Buildable)
        .map(|(index, _)| {
            let column = index as u32 % map.columns();
            let row = index as u32 / map.columns();
            CellCoord::new(column, row)
        })
        .collect();
    cells.shuffle(rng);

    let kinds: Vec<TowerKind> = level.tower_kinds().cloned().collect();
    cells
        .into_iter()
        .zip(kinds.into_iter().cycle())
        .map(|(cell, kind)| (kind, cell))
        .collect()
}

/// Requests the next planned placement and advances the plan on the outcome.
///
/// A placement refused for lack of credits stays at the front of the plan
/// and is retried next frame; any other rejection discards the entry, since
/// retrying it would fail the same way forever.
fn attempt_placement(
    world: &mut World,
    plan: &mut VecDeque<(TowerKind, CellCoord)>,
    events: &mut Vec<Event>,
) {
    let Some((kind, cell)) = plan.front().cloned() else {
        return;
    };
    let before = events.len();
    apply(world, Command::PlaceTower { kind, cell }, events);
    for event in &events[before..] {
        match event {
            Event::TowerPlaced { .. } => {
                let _ = plan.pop_front();
            }
            Event::TowerPlacementRejected { reason, .. } => {
                if *reason != PlacementError::InsufficientCredits {
                    let _ = plan.pop_front();
                }
            }
            _ => {}
        }
    }
}

fn print_summary(world: &World, outcome: Outcome, analytics: &Analytics) {
    let report = analytics.report();
    let stats = query::economy_stats(world);
    let verdict = match outcome {
        Outcome::Cleared => "wave cleared",
        Outcome::Overrun => "base overrun",
        Outcome::OutOfFrames => "frame budget exhausted",
    };
    println!("result: {verdict}");
    println!(
        "lives {} | credits {} | ticks {}",
        query::lives(world),
        query::credits(world),
        query::tick_index(world),
    );
    println!(
        "kills {} | leaks {} | split children {} | shots {}",
        report.kills, report.leaks, report.split_children, report.shots_fired,
    );
    println!(
        "towers placed {} | sold {} | spent {} | refunded {}",
        report.towers_placed, report.towers_sold, report.credits_spent, report.refunds_received,
    );
    println!(
        "earned {} total ({} from kills, {} passive)",
        stats.total_earned, stats.total_from_kills, stats.total_from_passive,
    );
}
