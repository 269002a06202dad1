//! In-flight projectile tracking and homing motion.

use std::time::Duration;

use ridgeline_defence_core::{EnemyId, ProjectileId, TowerId, WorldPoint};

/// Distance at which a projectile is considered to have struck its target.
const ARRIVAL_THRESHOLD: f32 = 1.0;

/// Projectiles that chase a long-dead or unreachable target are discarded
/// after this long in the air.
const MAX_AGE: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    id: ProjectileId,
    tower: TowerId,
    target: EnemyId,
    position: WorldPoint,
    speed: f32,
    damage: f32,
    splash_radius: f32,
    age: Duration,
}

impl Projectile {
    pub(crate) fn id(&self) -> ProjectileId {
        self.id
    }

    pub(crate) fn position(&self) -> WorldPoint {
        self.position
    }

    pub(crate) fn target(&self) -> EnemyId {
        self.target
    }
}

/// Outcome of one motion step for a single projectile.
pub(crate) enum FlightStep {
    /// Still in the air.
    InFlight,
    /// Close enough to the target to resolve damage this frame.
    Hit,
    /// Target vanished or the projectile outlived its welcome.
    Expired,
}

/// A projectile that finished its flight this frame, ready for damage
/// resolution.
pub(crate) struct Impact {
    pub(crate) tower: TowerId,
    pub(crate) target: EnemyId,
    pub(crate) position: WorldPoint,
    pub(crate) damage: f32,
    pub(crate) splash_radius: f32,
}

#[derive(Debug, Default)]
pub(crate) struct Projectiles {
    projectiles: Vec<Projectile>,
    next_id: u32,
}

impl Projectiles {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn spawn(
        &mut self,
        tower: TowerId,
        target: EnemyId,
        origin: WorldPoint,
        speed: f32,
        damage: f32,
        splash_radius: f32,
    ) -> ProjectileId {
        let id = ProjectileId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.projectiles.push(Projectile {
            id,
            tower,
            target,
            position: origin,
            speed,
            damage,
            splash_radius,
            age: Duration::ZERO,
        });
        id
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    /// Advances every projectile toward the live position of its target,
    /// draining the ones that hit into `impacts`. A projectile whose
    /// target has died or despawned is discarded without dealing damage.
    pub(crate) fn update(
        &mut self,
        dt: Duration,
        target_position: impl Fn(EnemyId) -> Option<WorldPoint>,
        impacts: &mut Vec<Impact>,
    ) {
        self.projectiles.retain_mut(|projectile| {
            let step = step_flight(projectile, dt, &target_position);
            match step {
                FlightStep::InFlight => true,
                FlightStep::Hit => {
                    impacts.push(Impact {
                        tower: projectile.tower,
                        target: projectile.target,
                        position: projectile.position,
                        damage: projectile.damage,
                        splash_radius: projectile.splash_radius,
                    });
                    false
                }
                FlightStep::Expired => false,
            }
        });
    }
}

fn step_flight(
    projectile: &mut Projectile,
    dt: Duration,
    target_position: &impl Fn(EnemyId) -> Option<WorldPoint>,
) -> FlightStep {
    projectile.age += dt;
    if projectile.age >= MAX_AGE {
        return FlightStep::Expired;
    }

    let Some(destination) = target_position(projectile.target) else {
        return FlightStep::Expired;
    };

    let dx = destination.x() - projectile.position.x();
    let dy = destination.y() - projectile.position.y();
    let distance = projectile.position.distance_to(destination);
    let travel = projectile.speed * dt.as_secs_f32();

    if distance <= ARRIVAL_THRESHOLD || travel >= distance {
        projectile.position = destination;
        return FlightStep::Hit;
    }

    let scale = travel / distance;
    projectile.position = WorldPoint::new(
        projectile.position.x() + dx * scale,
        projectile.position.y() + dy * scale,
    );
    FlightStep::InFlight
}
