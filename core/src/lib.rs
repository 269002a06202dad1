#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Ridgeline Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod elevation;

use config::TowerTier;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Ridgeline Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new wave enemy join the path at its first waypoint.
    SpawnEnemy {
        /// Kind of enemy to create, resolved against the enemy config table.
        kind: EnemyKind,
    },
    /// Requests that split children continue the path of a dead parent.
    SpawnSplitChildren {
        /// Kind of child enemy to create.
        kind: EnemyKind,
        /// Pre-jittered spawn position of every child, rolled by the
        /// spawning system so the world stays free of randomness.
        positions: Vec<WorldPoint>,
        /// Last waypoint the parent had fully reached; children continue the
        /// path from here.
        start_waypoint: usize,
        /// Split ancestry depth of the children.
        generation: u32,
    },
    /// Requests placement of a tower on the provided grid cell.
    PlaceTower {
        /// Type of tower to construct, resolved against the tower config table.
        kind: TowerKind,
        /// Cell that should anchor the tower.
        cell: CellCoord,
    },
    /// Requests that an existing tower advance to its next tier.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Requests that an existing tower be sold for a partial refund.
    SellTower {
        /// Identifier of the tower to sell.
        tower: TowerId,
    },
    /// Requests that a tower launch a projectile at a single enemy.
    FireProjectile {
        /// Identifier of the firing tower.
        tower: TowerId,
        /// Enemy selected by the targeting system.
        target: EnemyId,
    },
    /// Requests that an area tower damage every listed enemy simultaneously.
    FireAreaBurst {
        /// Identifier of the firing tower.
        tower: TowerId,
        /// Enemies inside the tower's adjusted range this frame.
        targets: Vec<EnemyId>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the world.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy: EnemyId,
        /// Kind of enemy that spawned.
        kind: EnemyKind,
        /// Position the enemy occupies after spawning.
        position: WorldPoint,
    },
    /// Announces that a dying enemy requested split children.
    ///
    /// Always emitted before the matching [`Event::EnemyKilled`] so listeners
    /// observe the split before any kill bookkeeping.
    EnemySplit {
        /// Identifier of the enemy that died and split.
        parent: EnemyId,
        /// Kind of child the split produces.
        child_kind: EnemyKind,
        /// Number of children to spawn.
        count: u32,
        /// Death position where the children should appear.
        position: WorldPoint,
        /// Last waypoint the parent had fully reached.
        waypoint_index: usize,
        /// Split depth of the children (parent depth plus one).
        generation: u32,
    },
    /// Confirms that an enemy died from damage.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Credits awarded for the kill.
        reward: u32,
        /// Tower credited with the kill, if attributable.
        killer: Option<TowerId>,
    },
    /// Confirms that an enemy completed the path and reached the base.
    EnemyReachedBase {
        /// Identifier of the enemy that leaked through.
        enemy: EnemyId,
    },
    /// Reports how many split children entered the world this frame.
    SplitChildrenSpawned {
        /// Number of children spawned from a split.
        count: u32,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Credits deducted for the placement, including the elevation
        /// surcharge.
        cost: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower advanced to a new tier.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Tier the tower now occupies.
        tier: TowerTier,
        /// Credits deducted for the upgrade.
        cost: u32,
    },
    /// Reports that a tower upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier of the tower targeted for upgrade.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower was sold and removed from the world.
    TowerSold {
        /// Identifier of the tower that was sold.
        tower: TowerId,
        /// Credits refunded to the player.
        refund: u32,
    },
    /// Reports that a tower sale request was rejected.
    TowerSaleRejected {
        /// Identifier of the tower targeted for sale.
        tower: TowerId,
        /// Specific reason the sale failed.
        reason: RemovalError,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileSpawned {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired the projectile.
        tower: TowerId,
        /// Enemy the projectile is homing toward.
        target: EnemyId,
    },
    /// Reports the credit balance after it changed.
    CreditsChanged {
        /// Credits available after the change.
        balance: u32,
    },
    /// Reports the remaining lives after an enemy leaked through.
    LivesChanged {
        /// Lives remaining after the change.
        remaining: u32,
    },
}

/// Unique identifier assigned to an enemy.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an in-flight projectile.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Name of an enemy archetype resolved against the enemy config table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnemyKind(String);

impl EnemyKind {
    /// Creates a new enemy kind from its config-table key.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrows the config-table key backing the kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a tower archetype resolved against the tower config table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TowerKind(String);

impl TowerKind {
    /// Creates a new tower kind from its config-table key.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrows the config-table key backing the kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Continuous world-space point measured in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the point.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component of the point.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Computes the straight-line distance to another point.
    #[must_use]
    pub fn distance_to(&self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies beyond the configured grid bounds.
    OutOfBounds,
    /// The requested cell is not marked buildable on the map.
    NotBuildable,
    /// Another tower already occupies the requested cell.
    Occupied,
    /// The player cannot afford the elevation-adjusted build cost.
    InsufficientCredits,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    MissingTower,
    /// The tower already occupies its maximum tier.
    MaxTier,
    /// The tower has not recorded enough kills to unlock the next tier.
    InsufficientKills,
    /// The player cannot afford the upgrade cost.
    InsufficientCredits,
}

/// Reasons a tower sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// No tower with the provided identifier exists.
    MissingTower,
}

/// Immutable representation of a single live enemy used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// World-space position of the enemy.
    pub position: WorldPoint,
    /// Grid cell containing the enemy, used for line-of-sight checks.
    pub cell: CellCoord,
    /// Height level of the path segment the enemy currently travels.
    pub elevation: i32,
    /// Remaining health expressed as a fraction of maximum health.
    pub hp_fraction: f32,
    /// Indicates whether the enemy currently carries shield points.
    pub shield_active: bool,
    /// Fraction of the path completed, in `[0, 1]`.
    pub progress: f32,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of live enemies captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no live enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell the tower occupies.
    pub cell: CellCoord,
    /// World-space position of the tower's center.
    pub position: WorldPoint,
    /// Height level of the platform the tower stands on.
    pub elevation: i32,
    /// Tier the tower currently occupies.
    pub tier: TowerTier,
    /// Base targeting range of the active tier, before elevation adjustment.
    pub range: f32,
    /// Indicates an area tower that pulses all candidates instead of firing
    /// projectiles.
    pub area_mode: bool,
    /// Confirmed kills credited to the tower.
    pub kills: u32,
    /// Remaining cooldown expressed as a fraction of the full cooldown.
    pub cooldown_fraction: f32,
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Cooldown status of a single tower captured for the combat system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Identifier of the tower.
    pub tower: TowerId,
    /// Remaining time before the tower may fire again. Zero means ready.
    pub ready_in: Duration,
}

/// Read-only snapshot of every tower's cooldown, sorted by tower identifier.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Retrieves the cooldown recorded for the provided tower, if any.
    #[must_use]
    pub fn ready_in(&self, tower: TowerId) -> Option<Duration> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.tower)
            .ok()
            .map(|index| self.snapshots[index].ready_in)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an in-flight projectile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Current world-space position of the projectile.
    pub position: WorldPoint,
    /// Enemy the projectile is homing toward.
    pub target: EnemyId,
}

/// Read-only snapshot describing every projectile in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Target assignment computed by the targeting system for a single tower.
#[derive(Clone, Debug, PartialEq)]
pub enum TowerTarget {
    /// A projectile tower locked onto the most-advanced enemy in range.
    Single {
        /// Identifier of the firing tower.
        tower: TowerId,
        /// Enemy with the highest path progress inside the adjusted range.
        enemy: EnemyId,
    },
    /// An area tower covering every enemy inside its adjusted range.
    Area {
        /// Identifier of the firing tower.
        tower: TowerId,
        /// All enemies inside the adjusted range with line of sight.
        enemies: Vec<EnemyId>,
    },
}

impl TowerTarget {
    /// Identifier of the tower the assignment belongs to.
    #[must_use]
    pub fn tower(&self) -> TowerId {
        match self {
            Self::Single { tower, .. } | Self::Area { tower, .. } => *tower,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CellCoord, EnemyId, EnemyKind, PlacementError, RemovalError, TowerId, TowerKind,
        UpgradeError, WorldPoint,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&EnemyId::new(7));
        assert_round_trip(&TowerId::new(42));
    }

    #[test]
    fn kinds_round_trip_through_bincode() {
        assert_round_trip(&EnemyKind::new("grunt"));
        assert_round_trip(&TowerKind::new("laser"));
    }

    #[test]
    fn rejection_reasons_round_trip_through_bincode() {
        assert_round_trip(&PlacementError::Occupied);
        assert_round_trip(&UpgradeError::InsufficientKills);
        assert_round_trip(&RemovalError::MissingTower);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(5, 7));
    }

    #[test]
    fn world_point_distance_matches_expectation() {
        let origin = WorldPoint::new(0.0, 0.0);
        let other = WorldPoint::new(3.0, 4.0);
        assert!((origin.distance_to(other) - 5.0).abs() < f32::EPSILON);
        assert!((other.distance_to(origin) - 5.0).abs() < f32::EPSILON);
    }
}
