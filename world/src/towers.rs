//! Ownership of placed towers: occupancy, tiers, kills, cooldowns.

use std::time::Duration;

use ridgeline_defence_core::{
    config::{TowerConfig, TowerTier},
    CellCoord, TowerId, TowerKind, WorldPoint,
};

#[derive(Clone, Debug)]
pub(crate) struct Tower {
    id: TowerId,
    kind: TowerKind,
    cell: CellCoord,
    position: WorldPoint,
    elevation: i32,
    tier: TowerTier,
    invested: u32,
    kills: u32,
    cooldown_remaining: Duration,
}

impl Tower {
    pub(crate) fn id(&self) -> TowerId {
        self.id
    }

    pub(crate) fn kind(&self) -> &TowerKind {
        &self.kind
    }

    pub(crate) fn cell(&self) -> CellCoord {
        self.cell
    }

    pub(crate) fn position(&self) -> WorldPoint {
        self.position
    }

    pub(crate) fn elevation(&self) -> i32 {
        self.elevation
    }

    pub(crate) fn tier(&self) -> TowerTier {
        self.tier
    }

    #[cfg(test)]
    pub(crate) fn invested(&self) -> u32 {
        self.invested
    }

    pub(crate) fn kills(&self) -> u32 {
        self.kills
    }

    pub(crate) fn cooldown_remaining(&self) -> Duration {
        self.cooldown_remaining
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.cooldown_remaining.is_zero()
    }

    pub(crate) fn tick_cooldown(&mut self, dt: Duration) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(dt);
    }

    /// Restarts the cooldown after an actual fire. Never called when the
    /// tower merely had nothing to shoot.
    pub(crate) fn reset_cooldown(&mut self, config: &TowerConfig) {
        let fire_rate = config.tier_stats(self.tier).fire_rate();
        self.cooldown_remaining = Duration::from_secs_f32(1.0 / fire_rate);
    }

    /// Fraction of the full cooldown still remaining, for presentation.
    pub(crate) fn cooldown_fraction(&self, config: &TowerConfig) -> f32 {
        let fire_rate = config.tier_stats(self.tier).fire_rate();
        let full = 1.0 / fire_rate;
        if full <= 0.0 {
            return 0.0;
        }
        (self.cooldown_remaining.as_secs_f32() / full).clamp(0.0, 1.0)
    }

    pub(crate) fn advance_tier(&mut self, target: TowerTier, cost: u32) {
        self.tier = target;
        self.invested = self.invested.saturating_add(cost);
    }

    pub(crate) fn record_kill(&mut self) {
        self.kills = self.kills.saturating_add(1);
    }

    /// Credits returned on sale: a fixed fraction of everything actually
    /// paid, rounded down.
    pub(crate) fn sell_value(&self, config: &TowerConfig) -> u32 {
        (self.invested as f32 * config.sell_refund_rate()).floor() as u32
    }
}

#[derive(Debug, Default)]
pub(crate) struct Towers {
    towers: Vec<Tower>,
    next_id: u32,
}

impl Towers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.towers.iter().any(|tower| tower.cell == cell)
    }

    /// Registers a freshly purchased tower. Callers check occupancy and
    /// affordability first; this only allocates the identifier and stores
    /// the record.
    pub(crate) fn place(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
        position: WorldPoint,
        elevation: i32,
        paid: u32,
    ) -> TowerId {
        let id = TowerId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.towers.push(Tower {
            id,
            kind,
            cell,
            position,
            elevation,
            tier: TowerTier::One,
            invested: paid,
            kills: 0,
            cooldown_remaining: Duration::ZERO,
        });
        id
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<Tower> {
        let index = self.towers.iter().position(|tower| tower.id == id)?;
        Some(self.towers.remove(index))
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&Tower> {
        self.towers.iter().find(|tower| tower.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.towers.iter_mut().find(|tower| tower.id == id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.towers.iter()
    }

    pub(crate) fn tick_cooldowns(&mut self, dt: Duration) {
        for tower in &mut self.towers {
            tower.tick_cooldown(dt);
        }
    }
}
