#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.
//!
//! For every tower the system filters live enemies by elevation-adjusted
//! range and grid line-of-sight, then either hands an area tower the whole
//! candidate list or picks the single enemy closest to the base for a
//! projectile tower.

use ridgeline_defence_core::{
    elevation::{effective_range, line_of_sight, HeightView},
    EnemyId, EnemyView, TowerTarget, TowerView,
};

/// Tower targeting system that reuses a scratch buffer to avoid repeated
/// allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidate_scratch: Vec<EnemyId>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Towers with no candidate in range contribute nothing.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        enemies: &EnemyView,
        heights: HeightView<'_>,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if towers.iter().next().is_none() || enemies.is_empty() {
            return;
        }

        for tower in towers.iter() {
            self.candidate_scratch.clear();
            let mut best: Option<(EnemyId, f32)> = None;

            for enemy in enemies.iter() {
                let range = effective_range(tower.range, tower.elevation, enemy.elevation);
                if tower.position.distance_to(enemy.position) > range {
                    continue;
                }
                if !line_of_sight(heights, tower.cell, tower.elevation, enemy.cell, enemy.elevation)
                {
                    continue;
                }

                if tower.area_mode {
                    self.candidate_scratch.push(enemy.id);
                } else {
                    // Strictly-greater keeps the first-encountered candidate
                    // on equal progress, which is the lowest id since the
                    // view iterates in id order.
                    let replace = match best {
                        Some((_, progress)) => enemy.progress > progress,
                        None => true,
                    };
                    if replace {
                        best = Some((enemy.id, enemy.progress));
                    }
                }
            }

            if tower.area_mode {
                if !self.candidate_scratch.is_empty() {
                    out.push(TowerTarget::Area {
                        tower: tower.id,
                        enemies: self.candidate_scratch.clone(),
                    });
                }
            } else if let Some((enemy, _)) = best {
                out.push(TowerTarget::Single {
                    tower: tower.id,
                    enemy,
                });
            }
        }
    }
}
