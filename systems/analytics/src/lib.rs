#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic analytics system that folds the event stream into a
//! battle report.
//!
//! The system never touches world state; it only counts what the world
//! announces, so replaying the same event stream always produces the same
//! report.

use ridgeline_defence_core::Event;

/// Aggregated battle statistics accumulated over the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BattleReport {
    /// Enemies destroyed by towers.
    pub kills: u32,
    /// Enemies that reached the base.
    pub leaks: u32,
    /// Split children that entered the world.
    pub split_children: u32,
    /// Credits earned from kill rewards.
    pub rewards_earned: u64,
    /// Credits spent on placements and upgrades.
    pub credits_spent: u64,
    /// Credits recovered by selling towers.
    pub refunds_received: u64,
    /// Projectiles launched.
    pub shots_fired: u32,
    /// Towers placed into the world.
    pub towers_placed: u32,
    /// Towers sold back.
    pub towers_sold: u32,
}

/// Pure system that accumulates battle statistics from world events.
#[derive(Clone, Copy, Debug, Default)]
pub struct Analytics {
    report: BattleReport,
}

impl Analytics {
    /// Creates a new analytics system with a zeroed report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The report accumulated so far.
    #[must_use]
    pub fn report(&self) -> BattleReport {
        self.report
    }

    /// Folds one frame's events into the running report.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemyKilled { reward, .. } => {
                    self.report.kills += 1;
                    self.report.rewards_earned += u64::from(*reward);
                }
                Event::EnemyReachedBase { .. } => {
                    self.report.leaks += 1;
                }
                Event::SplitChildrenSpawned { count } => {
                    self.report.split_children += count;
                }
                Event::TowerPlaced { cost, .. } => {
                    self.report.towers_placed += 1;
                    self.report.credits_spent += u64::from(*cost);
                }
                Event::TowerUpgraded { cost, .. } => {
                    self.report.credits_spent += u64::from(*cost);
                }
                Event::TowerSold { refund, .. } => {
                    self.report.towers_sold += 1;
                    self.report.refunds_received += u64::from(*refund);
                }
                Event::ProjectileSpawned { .. } => {
                    self.report.shots_fired += 1;
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridgeline_defence_core::{
        config::TowerTier, CellCoord, EnemyId, ProjectileId, TowerId, TowerKind,
    };

    #[test]
    fn events_fold_into_the_report() {
        let mut analytics = Analytics::new();
        let tower = TowerId::new(1);

        analytics.handle(&[
            Event::TowerPlaced {
                tower,
                kind: TowerKind::new("laser"),
                cell: CellCoord::new(0, 0),
                cost: 50,
            },
            Event::ProjectileSpawned {
                projectile: ProjectileId::new(0),
                tower,
                target: EnemyId::new(3),
            },
            Event::EnemyKilled {
                enemy: EnemyId::new(3),
                reward: 5,
                killer: Some(tower),
            },
        ]);
        analytics.handle(&[
            Event::TowerUpgraded {
                tower,
                tier: TowerTier::Two,
                cost: 75,
            },
            Event::SplitChildrenSpawned { count: 2 },
            Event::EnemyReachedBase {
                enemy: EnemyId::new(9),
            },
            Event::TowerSold { tower, refund: 62 },
        ]);

        assert_eq!(
            analytics.report(),
            BattleReport {
                kills: 1,
                leaks: 1,
                split_children: 2,
                rewards_earned: 5,
                credits_spent: 125,
                refunds_received: 62,
                shots_fired: 1,
                towers_placed: 1,
                towers_sold: 1,
            },
        );
    }

    #[test]
    fn replaying_the_same_stream_is_idempotent_per_instance() {
        let events = vec![Event::EnemyKilled {
            enemy: EnemyId::new(1),
            reward: 5,
            killer: None,
        }];

        let mut first = Analytics::new();
        let mut second = Analytics::new();
        first.handle(&events);
        second.handle(&events);

        assert_eq!(first.report(), second.report());
    }
}
