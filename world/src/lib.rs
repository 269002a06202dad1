#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Ridgeline Defence.
//!
//! The world owns every mutable gameplay entity: the live enemy collection,
//! placed towers, in-flight projectiles, the credit ledger and the life
//! counter. All mutation flows through [`apply`], which executes a single
//! [`Command`] deterministically and appends the resulting [`Event`]s.
//! Systems and adapters observe the world exclusively through the read-only
//! snapshots in [`query`].

use std::time::Duration;

use ridgeline_defence_core::{
    config::{ConfigError, GameConfig, TowerConfig},
    elevation, CellCoord, Command, EnemyId, Event, PlacementError, RemovalError, TowerId,
    TowerKind, UpgradeError, WELCOME_BANNER,
};

mod economy;
mod enemy;
mod path;
mod projectile;
mod spawner;
mod terrain;
mod towers;

pub use economy::EconomyStats;
pub use path::{PathError, PathFollower};

use economy::Economy;
use enemy::Enemy;
use projectile::{Impact, Projectiles};
use spawner::Spawner;
use terrain::Terrain;
use towers::Towers;

/// Deepest split ancestry the world will materialize. A child at this depth
/// dies without splitting further, which bounds the enemy population even
/// under misconfigured split chains.
const MAX_SPLIT_GENERATION: u32 = 8;

/// Represents the authoritative Ridgeline Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    terrain: Terrain,
    economy: Economy,
    spawner: Spawner,
    towers: Towers,
    projectiles: Projectiles,
    lives: u32,
    tick_index: u64,
}

impl World {
    /// Creates a new world from a validated game configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found while validating the
    /// configuration tables.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let terrain = Terrain::from_config(config.map());
        let economy = Economy::new(config.level().starting_credits());
        let lives = config.level().lives();
        Ok(Self {
            banner: WELCOME_BANNER,
            terrain,
            economy,
            spawner: Spawner::new(),
            towers: Towers::new(),
            projectiles: Projectiles::new(),
            lives,
            tick_index: 0,
            config,
        })
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        self.economy
            .update(self.config.level().passive_income_rate(), dt, out_events);

        let reached = self.spawner.update(dt, out_events);
        if reached > 0 {
            self.lives = self.lives.saturating_sub(reached);
            out_events.push(Event::LivesChanged {
                remaining: self.lives,
            });
        }

        self.towers.tick_cooldowns(dt);

        let mut impacts = Vec::new();
        {
            let spawner = &self.spawner;
            self.projectiles.update(
                dt,
                |enemy_id| {
                    spawner
                        .enemy(enemy_id)
                        .filter(|enemy| enemy.is_active())
                        .map(Enemy::position)
                },
                &mut impacts,
            );
        }
        for impact in impacts {
            self.resolve_impact(&impact, out_events);
        }

        self.spawner.prune();
    }

    fn resolve_impact(&mut self, impact: &Impact, out_events: &mut Vec<Event>) {
        if impact.splash_radius > 0.0 {
            // The set of enemies eligible for splash is frozen before any
            // damage lands so kills during resolution cannot shrink it.
            let snapshot = self.spawner.active_ids();
            for enemy_id in snapshot {
                let in_radius = self
                    .spawner
                    .enemy(enemy_id)
                    .map(|enemy| enemy.position().distance_to(impact.position) <= impact.splash_radius)
                    .unwrap_or(false);
                if in_radius {
                    self.damage_enemy(enemy_id, impact.damage, Some(impact.tower), out_events);
                }
            }
        } else {
            self.damage_enemy(impact.target, impact.damage, Some(impact.tower), out_events);
        }
    }

    /// Applies damage to one enemy and, if it dies right now, resolves the
    /// full kill: split announcement, kill event, reward payout and kill
    /// attribution. Hits on missing or terminal enemies are silently
    /// dropped.
    fn damage_enemy(
        &mut self,
        enemy_id: EnemyId,
        amount: f32,
        source: Option<TowerId>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(enemy) = self.spawner.enemy_mut(enemy_id) else {
            return;
        };
        if !enemy.is_active() || !enemy.take_damage(amount) {
            return;
        }

        let reward = enemy.reward();
        let position = enemy.position();
        let waypoint_index = enemy.last_reached_waypoint();
        let child_generation = enemy.generation().saturating_add(1);
        let split = enemy.split().cloned();

        if let Some(split) = split {
            if child_generation <= MAX_SPLIT_GENERATION {
                out_events.push(Event::EnemySplit {
                    parent: enemy_id,
                    child_kind: split.child,
                    count: split.count,
                    position,
                    waypoint_index,
                    generation: child_generation,
                });
            }
        }
        out_events.push(Event::EnemyKilled {
            enemy: enemy_id,
            reward,
            killer: source,
        });
        self.economy.add_credits(reward, out_events);
        if let Some(tower_id) = source {
            if let Some(tower) = self.towers.get_mut(tower_id) {
                tower.record_kill();
            }
        }
    }

    fn place_tower(&mut self, kind: TowerKind, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(tower_config) = self.config.tower(&kind) else {
            return;
        };

        let reason = if !self.terrain.in_bounds(cell) {
            Some(PlacementError::OutOfBounds)
        } else if !self.terrain.is_buildable(cell) {
            Some(PlacementError::NotBuildable)
        } else if self.towers.is_occupied(cell) {
            Some(PlacementError::Occupied)
        } else {
            None
        };
        if let Some(reason) = reason {
            out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
            return;
        }

        let height = self.terrain.height(cell);
        let cost = placement_cost(tower_config, height);
        if !self.economy.spend_credits(cost, out_events) {
            out_events.push(Event::TowerPlacementRejected {
                kind,
                cell,
                reason: PlacementError::InsufficientCredits,
            });
            return;
        }

        let position = self.terrain.cell_center(cell);
        let id = self.towers.place(kind.clone(), cell, position, height, cost);
        out_events.push(Event::TowerPlaced {
            tower: id,
            kind,
            cell,
            cost,
        });
    }

    fn upgrade_tower(&mut self, tower_id: TowerId, out_events: &mut Vec<Event>) {
        let reject = |reason| Event::TowerUpgradeRejected {
            tower: tower_id,
            reason,
        };

        let Some(tower) = self.towers.get(tower_id) else {
            out_events.push(reject(UpgradeError::MissingTower));
            return;
        };
        let Some(tower_config) = self.config.tower(tower.kind()) else {
            out_events.push(reject(UpgradeError::MissingTower));
            return;
        };
        let Some(target_tier) = tower.tier().next() else {
            out_events.push(reject(UpgradeError::MaxTier));
            return;
        };

        let required_kills = tower_config.required_kills(target_tier).unwrap_or(0);
        if tower.kills() < required_kills {
            out_events.push(reject(UpgradeError::InsufficientKills));
            return;
        }

        let cost = tower_config.upgrade_cost(target_tier).unwrap_or(0);
        if !self.economy.spend_credits(cost, out_events) {
            out_events.push(reject(UpgradeError::InsufficientCredits));
            return;
        }

        if let Some(tower) = self.towers.get_mut(tower_id) {
            tower.advance_tier(target_tier, cost);
        }
        out_events.push(Event::TowerUpgraded {
            tower: tower_id,
            tier: target_tier,
            cost,
        });
    }

    fn sell_tower(&mut self, tower_id: TowerId, out_events: &mut Vec<Event>) {
        let refund = match self.towers.get(tower_id) {
            Some(tower) => self
                .config
                .tower(tower.kind())
                .map(|config| tower.sell_value(config))
                .unwrap_or(0),
            None => {
                out_events.push(Event::TowerSaleRejected {
                    tower: tower_id,
                    reason: RemovalError::MissingTower,
                });
                return;
            }
        };

        let _ = self.towers.remove(tower_id);
        out_events.push(Event::TowerSold {
            tower: tower_id,
            refund,
        });
        self.economy.add_credits(refund, out_events);
    }

    fn fire_projectile(&mut self, tower_id: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let Some(tower) = self.towers.get(tower_id) else {
            return;
        };
        if !tower.is_ready() {
            return;
        }
        let Some(tower_config) = self.config.tower(tower.kind()) else {
            return;
        };
        if tower_config.is_area() {
            return;
        }
        let target_alive = self
            .spawner
            .enemy(target)
            .map(Enemy::is_active)
            .unwrap_or(false);
        if !target_alive {
            return;
        }

        let stats = tower_config.tier_stats(tower.tier());
        let origin = tower.position();
        let speed = tower_config.projectile_speed();
        let damage = stats.damage();
        let splash_radius = stats.splash_radius();

        let projectile = self
            .projectiles
            .spawn(tower_id, target, origin, speed, damage, splash_radius);
        if let Some(tower) = self.towers.get_mut(tower_id) {
            tower.reset_cooldown(tower_config);
        }
        out_events.push(Event::ProjectileSpawned {
            projectile,
            tower: tower_id,
            target,
        });
    }

    fn fire_area_burst(
        &mut self,
        tower_id: TowerId,
        targets: Vec<EnemyId>,
        out_events: &mut Vec<Event>,
    ) {
        if targets.is_empty() {
            return;
        }
        let Some(tower) = self.towers.get(tower_id) else {
            return;
        };
        if !tower.is_ready() {
            return;
        }
        let Some(tower_config) = self.config.tower(tower.kind()).cloned() else {
            return;
        };
        if !tower_config.is_area() {
            return;
        }

        let stats = tower_config.tier_stats(tower.tier()).clone();
        if let Some(tower) = self.towers.get_mut(tower_id) {
            tower.reset_cooldown(&tower_config);
        }

        for target in targets {
            let Some(enemy) = self.spawner.enemy_mut(target) else {
                continue;
            };
            if !enemy.is_active() {
                continue;
            }
            if let (Some(factor), Some(duration)) = (stats.slow_factor(), stats.slow_duration()) {
                enemy.apply_slow(factor, duration);
            }
            self.damage_enemy(target, stats.damage(), Some(tower_id), out_events);
        }
    }
}

/// Build cost of a tower on a platform at the provided height level.
fn placement_cost(config: &TowerConfig, height: i32) -> u32 {
    let multiplier = elevation::elevation_cost_multiplier(height);
    (config.base_cost() as f32 * multiplier).round() as u32
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SpawnEnemy { kind } => {
            let Some(enemy_config) = world.config.enemy(&kind).cloned() else {
                return;
            };
            let hp_scale = world.config.level().hp_scale();
            let _ = world.spawner.spawn(
                kind,
                &enemy_config,
                hp_scale,
                &world.terrain,
                0,
                None,
                0,
                out_events,
            );
        }
        Command::SpawnSplitChildren {
            kind,
            positions,
            start_waypoint,
            generation,
        } => {
            let Some(enemy_config) = world.config.enemy(&kind).cloned() else {
                return;
            };
            let hp_scale = world.config.level().hp_scale();
            let mut spawned = 0;
            for position in positions {
                if world
                    .spawner
                    .spawn(
                        kind.clone(),
                        &enemy_config,
                        hp_scale,
                        &world.terrain,
                        start_waypoint,
                        Some(position),
                        generation,
                        out_events,
                    )
                    .is_some()
                {
                    spawned += 1;
                }
            }
            if spawned > 0 {
                out_events.push(Event::SplitChildrenSpawned { count: spawned });
            }
        }
        Command::PlaceTower { kind, cell } => world.place_tower(kind, cell, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
        Command::SellTower { tower } => world.sell_tower(tower, out_events),
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::FireAreaBurst { tower, targets } => {
            world.fire_area_burst(tower, targets, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{EconomyStats, World};
    use ridgeline_defence_core::{
        elevation::HeightView, EnemySnapshot, EnemyView, ProjectileSnapshot, ProjectileView,
        TowerCooldownSnapshot, TowerCooldownView, TowerSnapshot, TowerView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Credits currently available to spend.
    #[must_use]
    pub fn credits(world: &World) -> u32 {
        world.economy.credits()
    }

    /// Lives remaining before the defence is overrun.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Number of ticks the world has processed.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Lifetime credit totals kept by the economy.
    #[must_use]
    pub fn economy_stats(world: &World) -> EconomyStats {
        world.economy.stats()
    }

    /// Number of enemies still alive on the path.
    #[must_use]
    pub fn active_enemy_count(world: &World) -> usize {
        world.spawner.active_count()
    }

    /// Captures a read-only view of every live enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world
            .spawner
            .iter_active()
            .map(|enemy| EnemySnapshot {
                id: enemy.id(),
                kind: enemy.kind().clone(),
                position: enemy.position(),
                cell: world.terrain.cell_at(enemy.position()),
                elevation: enemy.elevation(),
                hp_fraction: enemy.hp_fraction(),
                shield_active: enemy.shield_active(),
                progress: enemy.progress(),
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every placed tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let snapshots: Vec<TowerSnapshot> = world
            .towers
            .iter()
            .filter_map(|tower| {
                let config = world.config.tower(tower.kind())?;
                Some(TowerSnapshot {
                    id: tower.id(),
                    kind: tower.kind().clone(),
                    cell: tower.cell(),
                    position: tower.position(),
                    elevation: tower.elevation(),
                    tier: tower.tier(),
                    range: config.tier_stats(tower.tier()).range(),
                    area_mode: config.is_area(),
                    kills: tower.kills(),
                    cooldown_fraction: tower.cooldown_fraction(config),
                })
            })
            .collect();
        TowerView::from_snapshots(snapshots)
    }

    /// Captures the remaining cooldown of every placed tower.
    #[must_use]
    pub fn cooldown_view(world: &World) -> TowerCooldownView {
        let snapshots: Vec<TowerCooldownSnapshot> = world
            .towers
            .iter()
            .map(|tower| TowerCooldownSnapshot {
                tower: tower.id(),
                ready_in: tower.cooldown_remaining(),
            })
            .collect();
        TowerCooldownView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let snapshots: Vec<ProjectileSnapshot> = world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id(),
                position: projectile.position(),
                target: projectile.target(),
            })
            .collect();
        ProjectileView::from_snapshots(snapshots)
    }

    /// Exposes the terrain height grid for line-of-sight checks.
    #[must_use]
    pub fn height_view(world: &World) -> HeightView<'_> {
        world.terrain.height_view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    use ridgeline_defence_core::{
        config::{
            EnemyConfig, GameConfig, LevelConfig, MapConfig, SpecialTrait, TierStats, TileKind,
            TowerConfig, TowerTier, WaveSegment,
        },
        EnemyKind, WorldPoint,
    };

    fn grunt() -> EnemyKind {
        EnemyKind::new("grunt")
    }

    fn post() -> EnemyKind {
        EnemyKind::new("post")
    }

    fn splitter() -> EnemyKind {
        EnemyKind::new("splitter")
    }

    fn laser() -> TowerKind {
        TowerKind::new("laser")
    }

    fn frost() -> TowerKind {
        TowerKind::new("frost")
    }

    fn laser_config() -> TowerConfig {
        TowerConfig::new(
            50,
            [75, 100],
            0.5,
            300.0,
            [
                TierStats::new(5.0, 120.0, 2.0).with_splash(60.0),
                TierStats::new(9.0, 140.0, 2.5).with_splash(60.0),
                TierStats::new(14.0, 160.0, 3.0).with_splash(60.0),
            ],
        )
    }

    fn frost_config() -> TowerConfig {
        TowerConfig::new(
            40,
            [60, 80],
            0.5,
            0.0,
            [
                TierStats::new(12.0, 100.0, 1.0).with_slow(0.5, 2_000),
                TierStats::new(16.0, 110.0, 1.0).with_slow(0.4, 2_500),
                TierStats::new(20.0, 120.0, 1.0).with_slow(0.3, 3_000),
            ],
        )
    }

    fn fixture() -> GameConfig {
        fixture_with_laser(laser_config())
    }

    /// Five-by-three map: a buildable ridge along the top row with one cell
    /// raised to height two, the path through the middle row, plain ground
    /// along the bottom. The path runs 200 units left to right.
    fn fixture_with_laser(laser_tower: TowerConfig) -> GameConfig {
        let tiles = vec![
            TileKind::Buildable,
            TileKind::Buildable,
            TileKind::Buildable,
            TileKind::Buildable,
            TileKind::Buildable,
            TileKind::Spawn,
            TileKind::Path,
            TileKind::Path,
            TileKind::Path,
            TileKind::Goal,
            TileKind::Ground,
            TileKind::Ground,
            TileKind::Ground,
            TileKind::Ground,
            TileKind::Ground,
        ];
        let heights = vec![0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let waypoints = vec![WorldPoint::new(25.0, 75.0), WorldPoint::new(225.0, 75.0)];
        let map = MapConfig::new(5, 3, 50.0, tiles, heights, waypoints, vec![0, 0]);

        let level = LevelConfig::new(200, 0.0, 10, 1.0, vec![WaveSegment::new(grunt(), 3, 1_000)]);

        let mut towers = BTreeMap::new();
        let _ = towers.insert(laser(), laser_tower);
        let _ = towers.insert(frost(), frost_config());

        let mut enemies = BTreeMap::new();
        let _ = enemies.insert(grunt(), EnemyConfig::new(10.0, 50.0, 5));
        let _ = enemies.insert(post(), EnemyConfig::new(10.0, 0.0, 1));
        let _ = enemies.insert(
            splitter(),
            EnemyConfig::new(12.0, 0.0, 8).with_special(SpecialTrait::Split {
                count: 2,
                child: grunt(),
            }),
        );

        GameConfig::new(level, map, towers, enemies)
    }

    fn world() -> World {
        World::new(fixture()).expect("fixture config is valid")
    }

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    fn spawned_ids(events: &[Event]) -> Vec<EnemyId> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::EnemySpawned { enemy, .. } => Some(*enemy),
                _ => None,
            })
            .collect()
    }

    fn placed_tower(events: &[Event]) -> TowerId {
        events
            .iter()
            .find_map(|event| match event {
                Event::TowerPlaced { tower, .. } => Some(*tower),
                _ => None,
            })
            .expect("placement succeeded")
    }

    fn hp_fraction_of(world: &World, enemy: EnemyId) -> f32 {
        query::enemy_view(world)
            .iter()
            .find(|snapshot| snapshot.id == enemy)
            .expect("enemy is alive")
            .hp_fraction
    }

    #[test]
    fn placement_charges_the_elevation_surcharge() {
        let mut world = world();
        let events = run(
            &mut world,
            Command::PlaceTower {
                kind: laser(),
                cell: CellCoord::new(2, 0),
            },
        );

        let tower = placed_tower(&events);
        assert!(events.contains(&Event::TowerPlaced {
            tower,
            kind: laser(),
            cell: CellCoord::new(2, 0),
            cost: 75,
        }));
        assert_eq!(query::credits(&world), 125);

        let view = query::tower_view(&world);
        let snapshot = view.iter().next().expect("one tower");
        assert_eq!(snapshot.elevation, 2);
        assert_eq!(snapshot.tier, TowerTier::One);
    }

    #[test]
    fn placement_rejections_name_the_reason() {
        let mut world = world();

        let events = run(
            &mut world,
            Command::PlaceTower {
                kind: laser(),
                cell: CellCoord::new(9, 9),
            },
        );
        assert!(events.contains(&Event::TowerPlacementRejected {
            kind: laser(),
            cell: CellCoord::new(9, 9),
            reason: PlacementError::OutOfBounds,
        }));

        let events = run(
            &mut world,
            Command::PlaceTower {
                kind: laser(),
                cell: CellCoord::new(1, 1),
            },
        );
        assert!(events.contains(&Event::TowerPlacementRejected {
            kind: laser(),
            cell: CellCoord::new(1, 1),
            reason: PlacementError::NotBuildable,
        }));

        let _ = run(
            &mut world,
            Command::PlaceTower {
                kind: laser(),
                cell: CellCoord::new(0, 0),
            },
        );
        let events = run(
            &mut world,
            Command::PlaceTower {
                kind: laser(),
                cell: CellCoord::new(0, 0),
            },
        );
        assert!(events.contains(&Event::TowerPlacementRejected {
            kind: laser(),
            cell: CellCoord::new(0, 0),
            reason: PlacementError::Occupied,
        }));

        // 150 credits remain; the raised cell costs 75, so two more flat
        // placements drain the wallet below a third.
        let _ = run(
            &mut world,
            Command::PlaceTower {
                kind: laser(),
                cell: CellCoord::new(1, 0),
            },
        );
        let _ = run(
            &mut world,
            Command::PlaceTower {
                kind: laser(),
                cell: CellCoord::new(3, 0),
            },
        );
        assert_eq!(query::credits(&world), 50);
        let events = run(
            &mut world,
            Command::PlaceTower {
                kind: laser(),
                cell: CellCoord::new(2, 0),
            },
        );
        assert!(events.contains(&Event::TowerPlacementRejected {
            kind: laser(),
            cell: CellCoord::new(2, 0),
            reason: PlacementError::InsufficientCredits,
        }));
        assert_eq!(query::credits(&world), 50);
    }

    #[test]
    fn upgrade_and_sell_track_the_invested_total() {
        let mut world = world();
        let events = run(
            &mut world,
            Command::PlaceTower {
                kind: laser(),
                cell: CellCoord::new(0, 0),
            },
        );
        let tower = placed_tower(&events);
        assert_eq!(query::credits(&world), 150);

        let events = run(&mut world, Command::UpgradeTower { tower });
        assert!(events.contains(&Event::TowerUpgraded {
            tower,
            tier: TowerTier::Two,
            cost: 75,
        }));
        assert_eq!(query::credits(&world), 75);

        // floor((50 + 75) * 0.5) = 62.
        let events = run(&mut world, Command::SellTower { tower });
        assert!(events.contains(&Event::TowerSold { tower, refund: 62 }));
        assert_eq!(query::credits(&world), 137);
        assert!(query::tower_view(&world).iter().next().is_none());
    }

    #[test]
    fn upgrade_requires_recorded_kills() {
        let config = fixture_with_laser(laser_config().with_upgrade_kills([1, 2]));
        let mut world = World::new(config).expect("fixture config is valid");

        let events = run(
            &mut world,
            Command::PlaceTower {
                kind: laser(),
                cell: CellCoord::new(0, 0),
            },
        );
        let tower = placed_tower(&events);

        let events = run(&mut world, Command::UpgradeTower { tower });
        assert!(events.contains(&Event::TowerUpgradeRejected {
            tower,
            reason: UpgradeError::InsufficientKills,
        }));
        assert_eq!(query::credits(&world), 150);
    }

    #[test]
    fn missing_towers_reject_upgrades_and_sales() {
        let mut world = world();
        let ghost = TowerId::new(99);

        let events = run(&mut world, Command::UpgradeTower { tower: ghost });
        assert!(events.contains(&Event::TowerUpgradeRejected {
            tower: ghost,
            reason: UpgradeError::MissingTower,
        }));

        let events = run(&mut world, Command::SellTower { tower: ghost });
        assert!(events.contains(&Event::TowerSaleRejected {
            tower: ghost,
            reason: RemovalError::MissingTower,
        }));
    }

    #[test]
    fn splash_damage_respects_the_radius_boundary() {
        let mut world = world();

        // Stationary targets at 0, 59 and 61 units from the impact point.
        let events = run(
            &mut world,
            Command::SpawnSplitChildren {
                kind: post(),
                positions: vec![
                    WorldPoint::new(25.0, 75.0),
                    WorldPoint::new(84.0, 75.0),
                    WorldPoint::new(86.0, 75.0),
                ],
                start_waypoint: 0,
                generation: 0,
            },
        );
        let ids = spawned_ids(&events);
        assert_eq!(ids.len(), 3);
        assert!(events.contains(&Event::SplitChildrenSpawned { count: 3 }));

        let events = run(
            &mut world,
            Command::PlaceTower {
                kind: laser(),
                cell: CellCoord::new(0, 0),
            },
        );
        let tower = placed_tower(&events);

        let events = run(
            &mut world,
            Command::FireProjectile {
                tower,
                target: ids[0],
            },
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ProjectileSpawned { .. })));

        // One second at projectile speed 300 covers the 50 units from the
        // tower to the impact point.
        let _ = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
        );

        assert!((hp_fraction_of(&world, ids[0]) - 0.5).abs() < 1e-3);
        assert!((hp_fraction_of(&world, ids[1]) - 0.5).abs() < 1e-3);
        assert!((hp_fraction_of(&world, ids[2]) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn split_announcement_precedes_the_kill() {
        let mut world = world();
        let events = run(&mut world, Command::SpawnEnemy { kind: splitter() });
        let parent = spawned_ids(&events)[0];

        let events = run(
            &mut world,
            Command::PlaceTower {
                kind: frost(),
                cell: CellCoord::new(0, 0),
            },
        );
        let tower = placed_tower(&events);

        let events = run(
            &mut world,
            Command::FireAreaBurst {
                tower,
                targets: vec![parent],
            },
        );
        let split_index = events
            .iter()
            .position(|event| matches!(event, Event::EnemySplit { .. }))
            .expect("split announced");
        let kill_index = events
            .iter()
            .position(|event| matches!(event, Event::EnemyKilled { .. }))
            .expect("kill recorded");
        assert!(split_index < kill_index);
        assert!(events.contains(&Event::EnemySplit {
            parent,
            child_kind: grunt(),
            count: 2,
            position: WorldPoint::new(25.0, 75.0),
            waypoint_index: 0,
            generation: 1,
        }));
        assert!(events.contains(&Event::EnemyKilled {
            enemy: parent,
            reward: 8,
            killer: Some(tower),
        }));

        // Reward paid, kill attributed, cooldown running.
        assert_eq!(query::credits(&world), 168);
        let view = query::tower_view(&world);
        assert_eq!(view.iter().next().expect("tower").kills, 1);
        assert_eq!(
            query::cooldown_view(&world).ready_in(tower),
            Some(Duration::from_secs_f32(1.0)),
        );

        // The spawning system answers the split with a child batch.
        let events = run(
            &mut world,
            Command::SpawnSplitChildren {
                kind: grunt(),
                positions: vec![WorldPoint::new(21.0, 75.0), WorldPoint::new(29.0, 75.0)],
                start_waypoint: 0,
                generation: 1,
            },
        );
        assert!(events.contains(&Event::SplitChildrenSpawned { count: 2 }));
        let _ = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
        );
        assert_eq!(query::active_enemy_count(&world), 2);
    }

    #[test]
    fn split_chains_stop_at_the_generation_cap() {
        let mut world = world();
        let events = run(
            &mut world,
            Command::SpawnSplitChildren {
                kind: splitter(),
                positions: vec![WorldPoint::new(25.0, 75.0)],
                start_waypoint: 0,
                generation: MAX_SPLIT_GENERATION,
            },
        );
        let parent = spawned_ids(&events)[0];

        let events = run(
            &mut world,
            Command::PlaceTower {
                kind: frost(),
                cell: CellCoord::new(0, 0),
            },
        );
        let tower = placed_tower(&events);

        let events = run(
            &mut world,
            Command::FireAreaBurst {
                tower,
                targets: vec![parent],
            },
        );
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::EnemySplit { .. })));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::EnemyKilled { .. })));
    }

    #[test]
    fn leaked_enemy_costs_a_life() {
        let mut world = world();
        let events = run(&mut world, Command::SpawnEnemy { kind: grunt() });
        let enemy = spawned_ids(&events)[0];

        // The grunt covers 250 units in five seconds; the path is 200.
        let events = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(5),
            },
        );
        assert!(events.contains(&Event::EnemyReachedBase { enemy }));
        assert!(events.contains(&Event::LivesChanged { remaining: 9 }));
        assert_eq!(query::lives(&world), 9);
        assert_eq!(query::active_enemy_count(&world), 0);
    }

    #[test]
    fn stale_fire_commands_are_dropped() {
        let mut world = world();
        let events = run(
            &mut world,
            Command::PlaceTower {
                kind: laser(),
                cell: CellCoord::new(0, 0),
            },
        );
        let tower = placed_tower(&events);

        let events = run(
            &mut world,
            Command::FireProjectile {
                tower,
                target: EnemyId::new(404),
            },
        );
        assert!(events.is_empty());
        assert_eq!(
            query::cooldown_view(&world).ready_in(tower),
            Some(Duration::ZERO),
        );
    }
}
