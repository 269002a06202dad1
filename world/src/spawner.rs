//! Ownership of the live enemy collection.
//!
//! Terminal enemies are deactivated in place rather than removed so
//! identifiers stay stable and iteration never observes a shifting
//! collection mid-tick; pruning happens between ticks.

use std::time::Duration;

use ridgeline_defence_core::{config::EnemyConfig, EnemyId, EnemyKind, Event, WorldPoint};

use crate::enemy::Enemy;
use crate::path::PathFollower;
use crate::terrain::Terrain;

#[derive(Debug, Default)]
pub(crate) struct Spawner {
    enemies: Vec<Enemy>,
    next_id: u32,
}

impl Spawner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Creates an enemy continuing the path from `start_waypoint` and
    /// registers it with the roster. Returns `None` when the terrain path
    /// cannot seat a follower there, which validation rules out for
    /// well-formed configs.
    pub(crate) fn spawn(
        &mut self,
        kind: EnemyKind,
        config: &EnemyConfig,
        hp_scale: f32,
        terrain: &Terrain,
        start_waypoint: usize,
        position: Option<WorldPoint>,
        generation: u32,
        out_events: &mut Vec<Event>,
    ) -> Option<EnemyId> {
        let waypoints = terrain.waypoints().to_vec();
        let elevations = terrain.path_elevations().map(<[i32]>::to_vec);
        let follower = PathFollower::from_waypoint(waypoints, elevations, start_waypoint).ok()?;

        let spawn_position = position.unwrap_or_else(|| {
            terrain.waypoints()[start_waypoint.min(terrain.waypoints().len() - 1)]
        });

        let id = self.allocate_id();
        let enemy = Enemy::new(
            id,
            kind.clone(),
            config,
            hp_scale,
            spawn_position,
            follower,
            generation,
        );
        self.enemies.push(enemy);
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            position: spawn_position,
        });
        Some(id)
    }

    /// Ticks every live enemy, emitting reach-base events. Returns how many
    /// enemies leaked through this tick.
    pub(crate) fn update(&mut self, dt: Duration, out_events: &mut Vec<Event>) -> u32 {
        let mut reached = 0;
        for enemy in &mut self.enemies {
            if enemy.update(dt) {
                reached += 1;
                out_events.push(Event::EnemyReachedBase { enemy: enemy.id() });
            }
        }
        reached
    }

    /// Drops terminal enemies. Called between ticks, never mid-iteration.
    pub(crate) fn prune(&mut self) {
        self.enemies.retain(Enemy::is_active);
    }

    pub(crate) fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id() == id)
    }

    pub(crate) fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id() == id)
    }

    pub(crate) fn iter_active(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|enemy| enemy.is_active())
    }

    pub(crate) fn active_count(&self) -> usize {
        self.iter_active().count()
    }

    /// Captures the identifiers of every active enemy, used as the stable
    /// per-resolution snapshot for splash damage.
    pub(crate) fn active_ids(&self) -> Vec<EnemyId> {
        self.iter_active().map(Enemy::id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridgeline_defence_core::config::{MapConfig, TileKind};

    fn terrain() -> Terrain {
        Terrain::from_config(&MapConfig::new(
            4,
            1,
            50.0,
            vec![
                TileKind::Spawn,
                TileKind::Path,
                TileKind::Path,
                TileKind::Goal,
            ],
            vec![0, 0, 0, 0],
            vec![WorldPoint::new(25.0, 25.0), WorldPoint::new(175.0, 25.0)],
            Vec::new(),
        ))
    }

    #[test]
    fn spawning_emits_an_event_and_registers_the_enemy() {
        let mut spawner = Spawner::new();
        let mut events = Vec::new();
        let config = EnemyConfig::new(10.0, 30.0, 5);

        let id = spawner
            .spawn(
                EnemyKind::new("grunt"),
                &config,
                1.0,
                &terrain(),
                0,
                None,
                0,
                &mut events,
            )
            .expect("spawn");

        assert_eq!(spawner.active_count(), 1);
        assert!(matches!(
            events.as_slice(),
            [Event::EnemySpawned { enemy, .. }] if *enemy == id,
        ));
    }

    #[test]
    fn identifiers_are_unique_across_spawns() {
        let mut spawner = Spawner::new();
        let mut events = Vec::new();
        let config = EnemyConfig::new(10.0, 30.0, 5);
        let terrain = terrain();

        let first = spawner
            .spawn(
                EnemyKind::new("grunt"),
                &config,
                1.0,
                &terrain,
                0,
                None,
                0,
                &mut events,
            )
            .expect("spawn");
        let second = spawner
            .spawn(
                EnemyKind::new("grunt"),
                &config,
                1.0,
                &terrain,
                0,
                None,
                0,
                &mut events,
            )
            .expect("spawn");

        assert_ne!(first, second);
    }

    #[test]
    fn leaked_enemies_deactivate_and_prune() {
        let mut spawner = Spawner::new();
        let mut events = Vec::new();
        let config = EnemyConfig::new(10.0, 30.0, 5);

        let _ = spawner
            .spawn(
                EnemyKind::new("grunt"),
                &config,
                1.0,
                &terrain(),
                0,
                None,
                0,
                &mut events,
            )
            .expect("spawn");

        events.clear();
        // 150 units of path at speed 30: ten seconds overshoots comfortably.
        let reached = spawner.update(Duration::from_secs(10), &mut events);

        assert_eq!(reached, 1);
        assert_eq!(spawner.active_count(), 0);
        assert!(matches!(
            events.as_slice(),
            [Event::EnemyReachedBase { .. }],
        ));

        spawner.prune();
        assert!(spawner.enemy(EnemyId::new(0)).is_none());
    }
}
