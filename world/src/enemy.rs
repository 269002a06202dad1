//! Per-enemy state machine: health, shield, slow, and path progress.

use std::time::Duration;

use ridgeline_defence_core::{
    config::{EnemyConfig, SpecialTrait},
    elevation::slope_speed_modifier,
    EnemyId, EnemyKind, WorldPoint,
};

use crate::path::PathFollower;

/// Lifecycle state of an enemy. Both terminal states are entered exactly
/// once; afterwards every mutation is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnemyState {
    Alive,
    Dead,
    ReachedBase,
}

/// Secondary health pool absorbed before main health, snapping back to full
/// after a hit-free delay.
#[derive(Clone, Debug)]
struct Shield {
    max: f32,
    current: f32,
    regen_delay: Duration,
    since_last_hit: Duration,
}

/// Split behaviour carried by an enemy, resolved at death.
#[derive(Clone, Debug)]
pub(crate) struct SplitBehaviour {
    pub(crate) count: u32,
    pub(crate) child: EnemyKind,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    max_hp: f32,
    hp: f32,
    shield: Option<Shield>,
    base_speed: f32,
    slow_factor: f32,
    slow_remaining: Duration,
    reward: u32,
    split: Option<SplitBehaviour>,
    generation: u32,
    position: WorldPoint,
    follower: PathFollower,
    state: EnemyState,
}

impl Enemy {
    pub(crate) fn new(
        id: EnemyId,
        kind: EnemyKind,
        config: &EnemyConfig,
        hp_scale: f32,
        position: WorldPoint,
        follower: PathFollower,
        generation: u32,
    ) -> Self {
        let max_hp = (config.base_hp() * hp_scale).round();
        let mut shield = None;
        let mut split = None;
        match config.special() {
            Some(SpecialTrait::Shield {
                shield_percent,
                regen_delay_ms,
            }) => {
                let capacity = max_hp * shield_percent;
                shield = Some(Shield {
                    max: capacity,
                    current: capacity,
                    regen_delay: Duration::from_millis(*regen_delay_ms),
                    since_last_hit: Duration::ZERO,
                });
            }
            Some(SpecialTrait::Split { count, child }) => {
                split = Some(SplitBehaviour {
                    count: *count,
                    child: child.clone(),
                });
            }
            None => {}
        }

        Self {
            id,
            kind,
            max_hp,
            hp: max_hp,
            shield,
            base_speed: config.speed(),
            slow_factor: 1.0,
            slow_remaining: Duration::ZERO,
            reward: config.reward(),
            split,
            generation,
            position,
            follower,
            state: EnemyState::Alive,
        }
    }

    pub(crate) fn id(&self) -> EnemyId {
        self.id
    }

    pub(crate) fn kind(&self) -> &EnemyKind {
        &self.kind
    }

    pub(crate) fn is_active(&self) -> bool {
        self.state == EnemyState::Alive
    }

    pub(crate) fn position(&self) -> WorldPoint {
        self.position
    }

    pub(crate) fn elevation(&self) -> i32 {
        self.follower.elevation()
    }

    pub(crate) fn progress(&self) -> f32 {
        self.follower.progress()
    }

    pub(crate) fn reward(&self) -> u32 {
        self.reward
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }

    pub(crate) fn split(&self) -> Option<&SplitBehaviour> {
        self.split.as_ref()
    }

    pub(crate) fn last_reached_waypoint(&self) -> usize {
        self.follower.last_reached_waypoint()
    }

    pub(crate) fn hp_fraction(&self) -> f32 {
        if self.max_hp <= 0.0 {
            return 0.0;
        }
        (self.hp / self.max_hp).clamp(0.0, 1.0)
    }

    pub(crate) fn shield_active(&self) -> bool {
        self.shield
            .as_ref()
            .map_or(false, |shield| shield.current > 0.0)
    }

    #[cfg(test)]
    pub(crate) fn hp(&self) -> f32 {
        self.hp
    }

    #[cfg(test)]
    pub(crate) fn shield_points(&self) -> f32 {
        self.shield.as_ref().map_or(0.0, |shield| shield.current)
    }

    /// Applies damage, shield first. Returns `true` only on the tick the
    /// enemy transitions from alive to dead, so callers can attribute the
    /// kill exactly once.
    pub(crate) fn take_damage(&mut self, amount: f32) -> bool {
        if self.state != EnemyState::Alive || amount <= 0.0 {
            return false;
        }

        let mut overflow = amount;
        if let Some(shield) = &mut self.shield {
            // Any hit restarts the regeneration countdown, even when the
            // shield is already down.
            shield.since_last_hit = Duration::ZERO;
            if shield.current > 0.0 {
                let absorbed = shield.current.min(overflow);
                shield.current -= absorbed;
                overflow -= absorbed;
            }
        }

        if overflow > 0.0 {
            self.hp -= overflow;
            if self.hp <= 0.0 {
                self.hp = 0.0;
                self.state = EnemyState::Dead;
                return true;
            }
        }

        false
    }

    /// Applies a slow effect. Repeated slows never stack additively: the
    /// stronger factor wins and the longer remaining duration wins.
    pub(crate) fn apply_slow(&mut self, factor: f32, duration: Duration) {
        if self.state != EnemyState::Alive {
            return;
        }
        self.slow_factor = self.slow_factor.min(factor);
        self.slow_remaining = self.slow_remaining.max(duration);
    }

    /// Advances timers and movement. Returns `true` only on the tick the
    /// enemy transitions from alive to reached-base.
    pub(crate) fn update(&mut self, dt: Duration) -> bool {
        if self.state != EnemyState::Alive {
            return false;
        }

        if !self.slow_remaining.is_zero() {
            self.slow_remaining = self.slow_remaining.saturating_sub(dt);
            if self.slow_remaining.is_zero() {
                self.slow_factor = 1.0;
            }
        }

        if let Some(shield) = &mut self.shield {
            if shield.current < shield.max {
                shield.since_last_hit = shield.since_last_hit.saturating_add(dt);
                if shield.since_last_hit >= shield.regen_delay {
                    // The shield snaps back to full in one step rather than
                    // trickling.
                    shield.current = shield.max;
                    shield.since_last_hit = Duration::ZERO;
                }
            }
        }

        let slope = slope_speed_modifier(
            self.follower.elevation(),
            self.follower.target_elevation(),
        );
        let speed = self.base_speed * self.slow_factor * slope;
        self.position = self.follower.advance(self.position, speed, dt);

        if self.follower.is_finished() {
            self.state = EnemyState::ReachedBase;
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridgeline_defence_core::config::EnemyConfig;

    fn follower() -> PathFollower {
        PathFollower::new(
            vec![WorldPoint::new(0.0, 0.0), WorldPoint::new(1_000.0, 0.0)],
            None,
        )
        .expect("path")
    }

    fn plain_enemy(hp: f32) -> Enemy {
        Enemy::new(
            EnemyId::new(1),
            EnemyKind::new("grunt"),
            &EnemyConfig::new(hp, 10.0, 5),
            1.0,
            WorldPoint::new(0.0, 0.0),
            follower(),
            0,
        )
    }

    fn shielded_enemy() -> Enemy {
        let config = EnemyConfig::new(100.0, 10.0, 5).with_special(SpecialTrait::Shield {
            shield_percent: 0.5,
            regen_delay_ms: 2_000,
        });
        Enemy::new(
            EnemyId::new(2),
            EnemyKind::new("warden"),
            &config,
            1.0,
            WorldPoint::new(0.0, 0.0),
            follower(),
            0,
        )
    }

    #[test]
    fn hp_scale_rounds_to_whole_points() {
        let enemy = Enemy::new(
            EnemyId::new(3),
            EnemyKind::new("grunt"),
            &EnemyConfig::new(10.0, 10.0, 5),
            1.25,
            WorldPoint::new(0.0, 0.0),
            follower(),
            0,
        );
        assert!((enemy.hp() - 13.0).abs() < f32::EPSILON);
    }

    #[test]
    fn shield_absorbs_before_health() {
        let mut enemy = shielded_enemy();
        let killed = enemy.take_damage(70.0);

        assert!(!killed);
        assert!((enemy.shield_points() - 0.0).abs() < f32::EPSILON);
        assert!((enemy.hp() - 80.0).abs() < f32::EPSILON);
    }

    #[test]
    fn shield_snaps_back_after_quiet_delay() {
        let mut enemy = shielded_enemy();
        let _ = enemy.take_damage(70.0);
        assert!(!enemy.shield_active());

        enemy_update_for(&mut enemy, Duration::from_millis(2_100));
        assert!(enemy.shield_active());
        assert!((enemy.shield_points() - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn hits_reset_the_regen_countdown() {
        let mut enemy = shielded_enemy();
        let _ = enemy.take_damage(70.0);
        enemy_update_for(&mut enemy, Duration::from_millis(1_500));

        // A fresh hit inside the delay restarts the countdown.
        let _ = enemy.take_damage(1.0);
        enemy_update_for(&mut enemy, Duration::from_millis(1_500));
        assert!(!enemy.shield_active());

        enemy_update_for(&mut enemy, Duration::from_millis(600));
        assert!(enemy.shield_active());
    }

    fn enemy_update_for(enemy: &mut Enemy, total: Duration) {
        let step = Duration::from_millis(100);
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            let _ = enemy.update(step);
            elapsed += step;
        }
    }

    #[test]
    fn lethal_damage_reports_the_kill_once() {
        let mut enemy = plain_enemy(10.0);
        assert!(enemy.take_damage(15.0));
        assert!(!enemy.is_active());
        // Overkill on a corpse never re-reports the kill.
        assert!(!enemy.take_damage(15.0));
        assert!((enemy.hp() - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn terminal_states_ignore_updates() {
        let mut enemy = plain_enemy(10.0);
        let _ = enemy.take_damage(15.0);
        let before = enemy.position();
        assert!(!enemy.update(Duration::from_secs(5)));
        assert_eq!(enemy.position(), before);
    }

    #[test]
    fn slows_keep_the_stronger_factor_and_longer_duration() {
        let mut enemy = plain_enemy(10.0);
        enemy.apply_slow(0.5, Duration::from_secs(2));
        enemy.apply_slow(0.8, Duration::from_secs(5));

        assert!((enemy.slow_factor - 0.5).abs() < f32::EPSILON);
        assert_eq!(enemy.slow_remaining, Duration::from_secs(5));
    }

    #[test]
    fn expired_slow_restores_full_speed() {
        let mut enemy = plain_enemy(10.0);
        enemy.apply_slow(0.5, Duration::from_secs(1));
        let _ = enemy.update(Duration::from_secs(2));
        assert!((enemy.slow_factor - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn path_completion_reports_reached_base_once() {
        let mut enemy = plain_enemy(10.0);
        // Speed 10 over 1000 units: force completion with a huge delta.
        assert!(enemy.update(Duration::from_secs(200)));
        assert!(!enemy.is_active());
        assert!(!enemy.update(Duration::from_secs(1)));
    }
}
