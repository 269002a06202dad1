//! Static configuration data consumed by the world at construction time.
//!
//! Level, map, tower, and enemy definitions are read-only inputs. The one
//! hard-failure point of the engine is [`GameConfig::validate`]: dangling
//! kind references or malformed grids indicate a data integrity bug rather
//! than a runtime player action, so construction refuses them outright.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{EnemyKind, TowerKind, WorldPoint};

/// Tier occupied by a tower. Towers start at [`TowerTier::One`] and may be
/// upgraded twice.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TowerTier {
    /// Base tier every tower starts at.
    One,
    /// First upgrade.
    Two,
    /// Second and final upgrade.
    Three,
}

impl TowerTier {
    /// Zero-based index into per-tier stat arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
            Self::Three => 2,
        }
    }

    /// One-based tier number for presentation.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Tier reached by upgrading once, if any remains.
    #[must_use]
    pub const fn next(self) -> Option<TowerTier> {
        match self {
            Self::One => Some(Self::Two),
            Self::Two => Some(Self::Three),
            Self::Three => None,
        }
    }
}

/// A configured run of enemies spawned at a fixed interval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveSegment {
    enemy: EnemyKind,
    count: u32,
    spawn_interval_ms: u64,
}

impl WaveSegment {
    /// Creates a new wave segment.
    #[must_use]
    pub const fn new(enemy: EnemyKind, count: u32, spawn_interval_ms: u64) -> Self {
        Self {
            enemy,
            count,
            spawn_interval_ms,
        }
    }

    /// Kind of enemy the segment spawns.
    #[must_use]
    pub const fn enemy(&self) -> &EnemyKind {
        &self.enemy
    }

    /// Number of enemies the segment spawns.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Interval between consecutive spawns within the segment.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }
}

/// Immutable level definition: starting economy, lives, and wave segments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    starting_credits: u32,
    passive_income_rate: f64,
    lives: u32,
    hp_scale: f32,
    segments: Vec<WaveSegment>,
}

impl LevelConfig {
    /// Creates a new level definition.
    #[must_use]
    pub const fn new(
        starting_credits: u32,
        passive_income_rate: f64,
        lives: u32,
        hp_scale: f32,
        segments: Vec<WaveSegment>,
    ) -> Self {
        Self {
            starting_credits,
            passive_income_rate,
            lives,
            hp_scale,
            segments,
        }
    }

    /// Credits the player starts the level with.
    #[must_use]
    pub const fn starting_credits(&self) -> u32 {
        self.starting_credits
    }

    /// Passive income accrued per simulated second.
    #[must_use]
    pub const fn passive_income_rate(&self) -> f64 {
        self.passive_income_rate
    }

    /// Lives the player starts the level with.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Multiplier applied to every enemy's base health.
    #[must_use]
    pub const fn hp_scale(&self) -> f32 {
        self.hp_scale
    }

    /// Ordered wave segments making up the level.
    #[must_use]
    pub fn segments(&self) -> &[WaveSegment] {
        &self.segments
    }
}

/// Combat statistics of a single tower tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierStats {
    damage: f32,
    range: f32,
    fire_rate: f32,
    #[serde(default)]
    splash_radius: f32,
    #[serde(default)]
    slow_factor: Option<f32>,
    #[serde(default)]
    slow_duration_ms: Option<u64>,
}

impl TierStats {
    /// Creates a stat block without splash or slow effects.
    #[must_use]
    pub const fn new(damage: f32, range: f32, fire_rate: f32) -> Self {
        Self {
            damage,
            range,
            fire_rate,
            splash_radius: 0.0,
            slow_factor: None,
            slow_duration_ms: None,
        }
    }

    /// Adds a splash radius to the stat block.
    #[must_use]
    pub const fn with_splash(mut self, splash_radius: f32) -> Self {
        self.splash_radius = splash_radius;
        self
    }

    /// Adds a slow effect to the stat block.
    #[must_use]
    pub const fn with_slow(mut self, factor: f32, duration_ms: u64) -> Self {
        self.slow_factor = Some(factor);
        self.slow_duration_ms = Some(duration_ms);
        self
    }

    /// Damage dealt per hit.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Targeting range before elevation adjustment, in world units.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Shots per second.
    #[must_use]
    pub const fn fire_rate(&self) -> f32 {
        self.fire_rate
    }

    /// Splash radius at the impact point. Zero disables splash.
    #[must_use]
    pub const fn splash_radius(&self) -> f32 {
        self.splash_radius
    }

    /// Slow multiplier applied to hit enemies, if the tier slows at all.
    #[must_use]
    pub const fn slow_factor(&self) -> Option<f32> {
        self.slow_factor
    }

    /// Duration of the slow effect, if the tier slows at all.
    #[must_use]
    pub fn slow_duration(&self) -> Option<Duration> {
        self.slow_duration_ms.map(Duration::from_millis)
    }
}

/// Immutable tower archetype definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerConfig {
    base_cost: u32,
    upgrade_costs: [u32; 2],
    #[serde(default)]
    upgrade_kills: [u32; 2],
    sell_refund_rate: f32,
    projectile_speed: f32,
    tiers: [TierStats; 3],
}

impl TowerConfig {
    /// Creates a new tower definition with no kill requirements.
    #[must_use]
    pub const fn new(
        base_cost: u32,
        upgrade_costs: [u32; 2],
        sell_refund_rate: f32,
        projectile_speed: f32,
        tiers: [TierStats; 3],
    ) -> Self {
        Self {
            base_cost,
            upgrade_costs,
            upgrade_kills: [0, 0],
            sell_refund_rate,
            projectile_speed,
            tiers,
        }
    }

    /// Gates each upgrade behind a minimum confirmed kill count.
    #[must_use]
    pub const fn with_upgrade_kills(mut self, upgrade_kills: [u32; 2]) -> Self {
        self.upgrade_kills = upgrade_kills;
        self
    }

    /// Build cost before the elevation surcharge.
    #[must_use]
    pub const fn base_cost(&self) -> u32 {
        self.base_cost
    }

    /// Fraction of invested credits refunded on sale.
    #[must_use]
    pub const fn sell_refund_rate(&self) -> f32 {
        self.sell_refund_rate
    }

    /// Projectile flight speed in world units per second. Zero marks an area
    /// tower that pulses every candidate instead of firing projectiles.
    #[must_use]
    pub const fn projectile_speed(&self) -> f32 {
        self.projectile_speed
    }

    /// Reports whether the tower damages all candidates simultaneously.
    #[must_use]
    pub fn is_area(&self) -> bool {
        self.projectile_speed == 0.0
    }

    /// Stat block of the provided tier.
    #[must_use]
    pub const fn tier_stats(&self, tier: TowerTier) -> &TierStats {
        &self.tiers[tier.index()]
    }

    /// Credits required to reach the provided tier from the one below it.
    ///
    /// Returns `None` for [`TowerTier::One`], which is never purchased as an
    /// upgrade.
    #[must_use]
    pub fn upgrade_cost(&self, target: TowerTier) -> Option<u32> {
        match target {
            TowerTier::One => None,
            TowerTier::Two => Some(self.upgrade_costs[0]),
            TowerTier::Three => Some(self.upgrade_costs[1]),
        }
    }

    /// Confirmed kills required before the provided tier may be purchased.
    #[must_use]
    pub fn required_kills(&self, target: TowerTier) -> Option<u32> {
        match target {
            TowerTier::One => None,
            TowerTier::Two => Some(self.upgrade_kills[0]),
            TowerTier::Three => Some(self.upgrade_kills[1]),
        }
    }
}

/// Special behaviour attached to an enemy archetype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpecialTrait {
    /// A regenerating secondary health pool absorbed before main health.
    Shield {
        /// Shield capacity expressed as a fraction of maximum health.
        shield_percent: f32,
        /// Hit-free time required before the shield snaps back to full.
        regen_delay_ms: u64,
    },
    /// On death the enemy splits into smaller children that continue the
    /// path.
    Split {
        /// Number of children spawned at the death position.
        count: u32,
        /// Kind of child enemy produced by the split.
        child: EnemyKind,
    },
}

/// Immutable enemy archetype definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    base_hp: f32,
    speed: f32,
    reward: u32,
    #[serde(default)]
    special: Option<SpecialTrait>,
}

impl EnemyConfig {
    /// Creates a new enemy definition without special behaviour.
    #[must_use]
    pub const fn new(base_hp: f32, speed: f32, reward: u32) -> Self {
        Self {
            base_hp,
            speed,
            reward,
            special: None,
        }
    }

    /// Attaches a special behaviour to the definition.
    #[must_use]
    pub fn with_special(mut self, special: SpecialTrait) -> Self {
        self.special = Some(special);
        self
    }

    /// Health before the level-wide scale multiplier.
    #[must_use]
    pub const fn base_hp(&self) -> f32 {
        self.base_hp
    }

    /// Movement speed in world units per second on flat ground.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Credits awarded when the enemy dies.
    #[must_use]
    pub const fn reward(&self) -> u32 {
        self.reward
    }

    /// Special behaviour attached to the archetype, if any.
    #[must_use]
    pub const fn special(&self) -> Option<&SpecialTrait> {
        self.special.as_ref()
    }
}

/// Role of a single map tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// Inert terrain.
    Ground,
    /// Part of the enemy path.
    Path,
    /// Terrain towers may be placed on.
    Buildable,
    /// Tile enemies enter the map from.
    Spawn,
    /// Tile enemies try to reach.
    Goal,
}

/// Immutable map definition: tile roles, heights, and the enemy path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    columns: u32,
    rows: u32,
    tile_length: f32,
    tiles: Vec<TileKind>,
    heights: Vec<i32>,
    waypoints: Vec<WorldPoint>,
    #[serde(default)]
    path_elevations: Vec<i32>,
}

impl MapConfig {
    /// Creates a new map definition.
    #[must_use]
    pub const fn new(
        columns: u32,
        rows: u32,
        tile_length: f32,
        tiles: Vec<TileKind>,
        heights: Vec<i32>,
        waypoints: Vec<WorldPoint>,
        path_elevations: Vec<i32>,
    ) -> Self {
        Self {
            columns,
            rows,
            tile_length,
            tiles,
            heights,
            waypoints,
            path_elevations,
        }
    }

    /// Number of tile columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a square tile in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Row-major tile roles.
    #[must_use]
    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    /// Row-major height levels, parallel to [`MapConfig::tiles`].
    #[must_use]
    pub fn heights(&self) -> &[i32] {
        &self.heights
    }

    /// Ordered waypoints of the enemy path in world space.
    #[must_use]
    pub fn waypoints(&self) -> &[WorldPoint] {
        &self.waypoints
    }

    /// Height level per waypoint. Empty when the path carries no elevation
    /// data.
    #[must_use]
    pub fn path_elevations(&self) -> &[i32] {
        &self.path_elevations
    }
}

/// Complete static input of one game: level, map, and archetype tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    level: LevelConfig,
    map: MapConfig,
    towers: BTreeMap<TowerKind, TowerConfig>,
    enemies: BTreeMap<EnemyKind, EnemyConfig>,
}

impl GameConfig {
    /// Bundles the provided definitions into a game configuration.
    #[must_use]
    pub const fn new(
        level: LevelConfig,
        map: MapConfig,
        towers: BTreeMap<TowerKind, TowerConfig>,
        enemies: BTreeMap<EnemyKind, EnemyConfig>,
    ) -> Self {
        Self {
            level,
            map,
            towers,
            enemies,
        }
    }

    /// Level definition.
    #[must_use]
    pub const fn level(&self) -> &LevelConfig {
        &self.level
    }

    /// Map definition.
    #[must_use]
    pub const fn map(&self) -> &MapConfig {
        &self.map
    }

    /// Resolves a tower archetype by kind.
    #[must_use]
    pub fn tower(&self, kind: &TowerKind) -> Option<&TowerConfig> {
        self.towers.get(kind)
    }

    /// Resolves an enemy archetype by kind.
    #[must_use]
    pub fn enemy(&self, kind: &EnemyKind) -> Option<&EnemyConfig> {
        self.enemies.get(kind)
    }

    /// Iterates over every tower archetype in deterministic order.
    pub fn tower_kinds(&self) -> impl Iterator<Item = &TowerKind> {
        self.towers.keys()
    }

    /// Checks the configuration for integrity errors.
    ///
    /// The world refuses to construct from a configuration that fails this
    /// check; every other failure in the engine is a recoverable rejection.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level.hp_scale <= 0.0 {
            return Err(ConfigError::NonPositiveHpScale);
        }

        for (index, segment) in self.level.segments.iter().enumerate() {
            if segment.count == 0 {
                return Err(ConfigError::EmptySegment { index });
            }
            if segment.spawn_interval_ms == 0 {
                return Err(ConfigError::ZeroSpawnInterval { index });
            }
            if !self.enemies.contains_key(&segment.enemy) {
                return Err(ConfigError::UnknownEnemyKind(segment.enemy.clone()));
            }
        }

        for (kind, enemy) in &self.enemies {
            if let Some(SpecialTrait::Split { child, .. }) = enemy.special() {
                if !self.enemies.contains_key(child) {
                    return Err(ConfigError::UnknownSplitChild {
                        parent: kind.clone(),
                        child: child.clone(),
                    });
                }
            }
        }

        for (kind, tower) in &self.towers {
            if !(0.0..=1.0).contains(&tower.sell_refund_rate) {
                return Err(ConfigError::RefundRateOutOfRange(kind.clone()));
            }
            for stats in &tower.tiers {
                if stats.fire_rate <= 0.0 {
                    return Err(ConfigError::NonPositiveFireRate(kind.clone()));
                }
            }
        }

        let expected_cells = self.map.columns as usize * self.map.rows as usize;
        if self.map.tiles.len() != expected_cells {
            return Err(ConfigError::TileGridShape {
                expected: expected_cells,
                found: self.map.tiles.len(),
            });
        }
        if self.map.heights.len() != expected_cells {
            return Err(ConfigError::HeightGridShape {
                expected: expected_cells,
                found: self.map.heights.len(),
            });
        }
        if self.map.waypoints.len() < 2 {
            return Err(ConfigError::ShortPath {
                found: self.map.waypoints.len(),
            });
        }
        if !self.map.path_elevations.is_empty()
            && self.map.path_elevations.len() != self.map.waypoints.len()
        {
            return Err(ConfigError::PathElevationShape {
                expected: self.map.waypoints.len(),
                found: self.map.path_elevations.len(),
            });
        }

        Ok(())
    }
}

/// Integrity errors surfaced by [`GameConfig::validate`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The level hp scale must be positive.
    #[error("hp scale must be positive")]
    NonPositiveHpScale,
    /// A wave segment spawns zero enemies.
    #[error("wave segment {index} must spawn at least one enemy")]
    EmptySegment {
        /// Index of the offending segment.
        index: usize,
    },
    /// A wave segment carries a zero spawn interval.
    #[error("wave segment {index} requires a positive spawn interval")]
    ZeroSpawnInterval {
        /// Index of the offending segment.
        index: usize,
    },
    /// A wave segment references an enemy kind missing from the table.
    #[error("unknown enemy kind `{0}` referenced by level segments")]
    UnknownEnemyKind(EnemyKind),
    /// A split behaviour references a child kind missing from the table.
    #[error("unknown enemy kind `{child}` referenced by split behaviour of `{parent}`")]
    UnknownSplitChild {
        /// Kind carrying the split behaviour.
        parent: EnemyKind,
        /// Missing child kind.
        child: EnemyKind,
    },
    /// A tower's refund rate lies outside `[0, 1]`.
    #[error("sell refund rate of tower `{0}` must lie within [0, 1]")]
    RefundRateOutOfRange(TowerKind),
    /// A tower tier carries a non-positive fire rate.
    #[error("tower `{0}` requires a positive fire rate on every tier")]
    NonPositiveFireRate(TowerKind),
    /// The tile grid length disagrees with the configured dimensions.
    #[error("map tile grid expects {expected} cells, found {found}")]
    TileGridShape {
        /// Cells implied by columns times rows.
        expected: usize,
        /// Cells actually provided.
        found: usize,
    },
    /// The height grid length disagrees with the configured dimensions.
    #[error("map height grid expects {expected} cells, found {found}")]
    HeightGridShape {
        /// Cells implied by columns times rows.
        expected: usize,
        /// Cells actually provided.
        found: usize,
    },
    /// The enemy path has fewer than two waypoints.
    #[error("enemy path requires at least two waypoints, found {found}")]
    ShortPath {
        /// Waypoints actually provided.
        found: usize,
    },
    /// The path elevation list disagrees with the waypoint count.
    #[error("path elevation list expects {expected} entries, found {found}")]
    PathElevationShape {
        /// Entries implied by the waypoint count.
        expected: usize,
        /// Entries actually provided.
        found: usize,
    },
}
