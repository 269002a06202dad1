#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that drives the wave schedule.
//!
//! The system walks the level's wave segments, emitting one spawn command
//! per elapsed interval with an accumulator that catches up after long
//! ticks. It also answers split announcements with child spawn batches,
//! rolling the scatter positions itself so the world stays free of
//! randomness.

use std::time::Duration;

use ridgeline_defence_core::{config::WaveSegment, Command, Event, WorldPoint};

const RNG_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Distance in world units by which split children scatter around the
/// parent's death position.
const SPLIT_SCATTER_RADIUS: f32 = 4.0;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug)]
pub struct Config {
    segments: Vec<WaveSegment>,
    jitter_fraction: f32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration from the level's wave segments.
    ///
    /// `jitter_fraction` widens or shortens every spawn interval by up to
    /// that fraction, re-rolled per spawn; zero keeps the cadence exact.
    #[must_use]
    pub fn new(segments: Vec<WaveSegment>, jitter_fraction: f32, rng_seed: u64) -> Self {
        Self {
            segments,
            jitter_fraction: jitter_fraction.clamp(0.0, 0.9),
            rng_seed,
        }
    }
}

/// Wave progress as observed by adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// Segments remain and spawn commands are still being produced.
    Spawning,
    /// Every segment has been exhausted but enemies are still alive.
    Draining,
    /// The schedule is exhausted and the path is clear.
    Complete,
}

/// Pure system that deterministically emits enemy spawn commands.
#[derive(Debug)]
pub struct Spawning {
    segments: Vec<WaveSegment>,
    segment_index: usize,
    spawned_in_segment: u32,
    accumulator: Duration,
    next_delay: Duration,
    jitter_fraction: f32,
    rng_state: u64,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            segments: config.segments,
            segment_index: 0,
            spawned_in_segment: 0,
            accumulator: Duration::ZERO,
            // The first enemy of a wave spawns the moment time advances.
            next_delay: Duration::ZERO,
            jitter_fraction: config.jitter_fraction,
            rng_state: config.rng_seed,
        }
    }

    /// Reports the wave phase given the current number of live enemies.
    #[must_use]
    pub fn phase(&self, live_enemies: usize) -> WavePhase {
        if self.segment_index < self.segments.len() {
            WavePhase::Spawning
        } else if live_enemies > 0 {
            WavePhase::Draining
        } else {
            WavePhase::Complete
        }
    }

    /// Consumes world events and emits spawn commands.
    ///
    /// Elapsed time drives the wave schedule; split announcements are
    /// answered immediately with a scattered child batch.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    accumulated = accumulated.saturating_add(*dt);
                }
                Event::EnemySplit {
                    child_kind,
                    count,
                    position,
                    waypoint_index,
                    generation,
                    ..
                } => {
                    let positions: Vec<WorldPoint> = (0..*count)
                        .map(|_| self.scatter_around(*position))
                        .collect();
                    out.push(Command::SpawnSplitChildren {
                        kind: child_kind.clone(),
                        positions,
                        start_waypoint: *waypoint_index,
                        generation: *generation,
                    });
                }
                _ => {}
            }
        }

        if accumulated.is_zero() {
            return;
        }
        self.accumulator = self.accumulator.saturating_add(accumulated);

        while let Some(segment) = self.segments.get(self.segment_index) {
            if self.accumulator < self.next_delay {
                break;
            }
            self.accumulator -= self.next_delay;

            out.push(Command::SpawnEnemy {
                kind: segment.enemy().clone(),
            });
            self.spawned_in_segment += 1;

            let interval = if self.spawned_in_segment >= segment.count() {
                // The gap into the next segment uses that segment's cadence.
                self.segment_index += 1;
                self.spawned_in_segment = 0;
                match self.segments.get(self.segment_index) {
                    Some(next) => next.spawn_interval(),
                    None => break,
                }
            } else {
                segment.spawn_interval()
            };
            self.next_delay = self.jittered(interval);
        }
    }

    fn jittered(&mut self, interval: Duration) -> Duration {
        if self.jitter_fraction <= 0.0 {
            return interval;
        }
        let offset = (self.unit() * 2.0 - 1.0) * self.jitter_fraction;
        interval.mul_f32((1.0 + offset).max(0.1))
    }

    fn scatter_around(&mut self, origin: WorldPoint) -> WorldPoint {
        let dx = (self.unit() * 2.0 - 1.0) * SPLIT_SCATTER_RADIUS;
        let dy = (self.unit() * 2.0 - 1.0) * SPLIT_SCATTER_RADIUS;
        WorldPoint::new(origin.x() + dx, origin.y() + dy)
    }

    fn advance_rng(&mut self) -> u64 {
        self.rng_state = self.rng_state.wrapping_add(RNG_GAMMA);
        let mut mixed = self.rng_state;
        mixed = (mixed ^ (mixed >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        mixed = (mixed ^ (mixed >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        mixed ^ (mixed >> 31)
    }

    fn unit(&mut self) -> f32 {
        (self.advance_rng() >> 40) as f32 / (1u64 << 24) as f32
    }
}
