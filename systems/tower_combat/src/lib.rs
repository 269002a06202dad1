#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns target assignments into firing commands.
//!
//! Cooldown gating lives here so the targeting system stays oblivious to
//! time: a tower with an assignment fires only when its cooldown snapshot
//! reads zero. Towers that merely lack a target keep their cooldown state
//! untouched.

use ridgeline_defence_core::{Command, TowerCooldownView, TowerTarget};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a firing command for every assigned tower whose cooldown has
    /// fully elapsed.
    pub fn handle(
        &mut self,
        tower_targets: &[TowerTarget],
        tower_cooldowns: &TowerCooldownView,
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            let ready = tower_cooldowns
                .ready_in(target.tower())
                .map(|remaining| remaining.is_zero())
                .unwrap_or(false);
            if !ready {
                continue;
            }

            match target {
                TowerTarget::Single { tower, enemy } => {
                    self.scratch.push(Command::FireProjectile {
                        tower: *tower,
                        target: *enemy,
                    });
                }
                TowerTarget::Area { tower, enemies } => {
                    self.scratch.push(Command::FireAreaBurst {
                        tower: *tower,
                        targets: enemies.clone(),
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridgeline_defence_core::{EnemyId, TowerCooldownSnapshot, TowerId};
    use std::time::Duration;

    fn snapshot(tower: u32, ready_in: Duration) -> TowerCooldownSnapshot {
        TowerCooldownSnapshot {
            tower: TowerId::new(tower),
            ready_in,
        }
    }

    fn single(tower: u32, enemy: u32) -> TowerTarget {
        TowerTarget::Single {
            tower: TowerId::new(tower),
            enemy: EnemyId::new(enemy),
        }
    }

    #[test]
    fn ready_towers_fire_in_assignment_order() {
        let mut system = TowerCombat::new();
        let cooldowns = TowerCooldownView::from_snapshots(vec![
            snapshot(2, Duration::ZERO),
            snapshot(5, Duration::ZERO),
        ]);
        let targets = vec![single(2, 4), single(5, 1)];
        let mut out = Vec::new();

        system.handle(&targets, &cooldowns, &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireProjectile {
                    tower: TowerId::new(2),
                    target: EnemyId::new(4),
                },
                Command::FireProjectile {
                    tower: TowerId::new(5),
                    target: EnemyId::new(1),
                },
            ],
        );
    }

    #[test]
    fn cooling_or_missing_towers_are_skipped() {
        let mut system = TowerCombat::new();
        let cooldowns = TowerCooldownView::from_snapshots(vec![
            snapshot(3, Duration::from_millis(250)),
            snapshot(8, Duration::ZERO),
        ]);
        let targets = vec![single(3, 9), single(8, 2), single(42, 3)];
        let mut out = Vec::new();

        system.handle(&targets, &cooldowns, &mut out);

        assert_eq!(
            out,
            vec![Command::FireProjectile {
                tower: TowerId::new(8),
                target: EnemyId::new(2),
            }],
        );
    }

    #[test]
    fn area_assignments_become_burst_commands() {
        let mut system = TowerCombat::new();
        let cooldowns = TowerCooldownView::from_snapshots(vec![snapshot(1, Duration::ZERO)]);
        let targets = vec![TowerTarget::Area {
            tower: TowerId::new(1),
            enemies: vec![EnemyId::new(3), EnemyId::new(7)],
        }];
        let mut out = Vec::new();

        system.handle(&targets, &cooldowns, &mut out);

        assert_eq!(
            out,
            vec![Command::FireAreaBurst {
                tower: TowerId::new(1),
                targets: vec![EnemyId::new(3), EnemyId::new(7)],
            }],
        );
    }

    #[test]
    fn no_assignments_leave_the_output_untouched() {
        let mut system = TowerCombat::new();
        let cooldowns = TowerCooldownView::from_snapshots(vec![snapshot(1, Duration::ZERO)]);
        let mut out = vec![Command::FireProjectile {
            tower: TowerId::new(9),
            target: EnemyId::new(9),
        }];

        system.handle(&[], &cooldowns, &mut out);

        assert_eq!(out.len(), 1);
    }
}
