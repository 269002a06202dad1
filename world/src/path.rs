//! Progress tracking along the enemy path polyline.

use std::time::Duration;

use ridgeline_defence_core::WorldPoint;
use thiserror::Error;

/// Errors raised when constructing a [`PathFollower`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// A path needs at least two waypoints to describe a segment.
    #[error("a path requires at least two waypoints, found {found}")]
    TooFewWaypoints {
        /// Waypoints actually provided.
        found: usize,
    },
    /// The elevation list must pair one entry with every waypoint.
    #[error("path elevations expect {expected} entries, found {found}")]
    ElevationMismatch {
        /// Entries implied by the waypoint count.
        expected: usize,
        /// Entries actually provided.
        found: usize,
    },
}

/// Tracks an entity's progress along a polyline of waypoints.
///
/// Positions produced by [`PathFollower::advance`] always lie on the
/// polyline; the follower never overshoots the final waypoint. Elevation is
/// stepped discretely per segment: between two waypoints the effective
/// elevation is the departure waypoint's value.
#[derive(Clone, Debug)]
pub struct PathFollower {
    waypoints: Vec<WorldPoint>,
    elevations: Option<Vec<i32>>,
    total_length: f32,
    next_waypoint: usize,
    distance_traveled: f32,
    finished: bool,
}

impl PathFollower {
    /// Creates a follower starting at the first waypoint.
    pub fn new(
        waypoints: Vec<WorldPoint>,
        elevations: Option<Vec<i32>>,
    ) -> Result<Self, PathError> {
        Self::from_waypoint(waypoints, elevations, 0)
    }

    /// Creates a follower continuing the path from the provided waypoint.
    ///
    /// Used by split children inheriting their parent's progress. Distance
    /// already covered by the skipped segments counts as traveled. A start
    /// index at or beyond the final waypoint produces an immediately
    /// finished follower.
    pub fn from_waypoint(
        waypoints: Vec<WorldPoint>,
        elevations: Option<Vec<i32>>,
        start_waypoint: usize,
    ) -> Result<Self, PathError> {
        if waypoints.len() < 2 {
            return Err(PathError::TooFewWaypoints {
                found: waypoints.len(),
            });
        }
        if let Some(elevations) = &elevations {
            if elevations.len() != waypoints.len() {
                return Err(PathError::ElevationMismatch {
                    expected: waypoints.len(),
                    found: elevations.len(),
                });
            }
        }

        let total_length: f32 = waypoints
            .windows(2)
            .map(|pair| pair[0].distance_to(pair[1]))
            .sum();

        let finished = start_waypoint + 1 >= waypoints.len();
        let distance_traveled = if finished {
            total_length
        } else {
            waypoints
                .windows(2)
                .take(start_waypoint)
                .map(|pair| pair[0].distance_to(pair[1]))
                .sum()
        };
        let next_waypoint = if finished {
            waypoints.len()
        } else {
            start_waypoint + 1
        };

        Ok(Self {
            waypoints,
            elevations,
            total_length,
            next_waypoint,
            distance_traveled,
            finished,
        })
    }

    /// Moves the provided position along the path by `speed * dt`.
    ///
    /// Consumes the movement budget in a loop so a single large delta can
    /// cross several waypoints without leaving the polyline. A finished
    /// follower returns the input position unchanged.
    pub fn advance(&mut self, position: WorldPoint, speed: f32, dt: Duration) -> WorldPoint {
        if self.finished {
            return position;
        }

        let mut budget = speed * dt.as_secs_f32();
        let mut current = position;

        while budget > 0.0 && !self.finished {
            let target = self.waypoints[self.next_waypoint];
            let distance = current.distance_to(target);

            if distance <= budget {
                current = target;
                budget -= distance;
                self.distance_traveled = (self.distance_traveled + distance).min(self.total_length);
                self.next_waypoint += 1;
                if self.next_waypoint >= self.waypoints.len() {
                    self.finished = true;
                    self.distance_traveled = self.total_length;
                }
            } else {
                let fraction = budget / distance;
                current = WorldPoint::new(
                    current.x() + (target.x() - current.x()) * fraction,
                    current.y() + (target.y() - current.y()) * fraction,
                );
                self.distance_traveled = (self.distance_traveled + budget).min(self.total_length);
                budget = 0.0;
            }
        }

        current
    }

    /// Fraction of the path completed, clamped to `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.total_length <= 0.0 {
            return 1.0;
        }
        (self.distance_traveled / self.total_length).clamp(0.0, 1.0)
    }

    /// Reports whether the follower reached the final waypoint.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Total distance covered so far. Never decreases and never exceeds
    /// [`PathFollower::total_length`].
    #[must_use]
    pub fn distance_traveled(&self) -> f32 {
        self.distance_traveled
    }

    /// Sum of all segment lengths.
    #[must_use]
    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    /// Index of the last waypoint that was fully reached.
    #[must_use]
    pub fn last_reached_waypoint(&self) -> usize {
        self.next_waypoint.saturating_sub(1).min(self.waypoints.len() - 1)
    }

    /// Effective elevation of the current segment: the departure waypoint's
    /// level. Zero when the path carries no elevation data.
    #[must_use]
    pub fn elevation(&self) -> i32 {
        match &self.elevations {
            Some(elevations) => elevations[self.last_reached_waypoint()],
            None => 0,
        }
    }

    /// Elevation of the waypoint the follower moves toward. Falls back to the
    /// current segment's elevation once finished or without elevation data.
    #[must_use]
    pub fn target_elevation(&self) -> i32 {
        match &self.elevations {
            Some(elevations) => {
                let index = self.next_waypoint.min(elevations.len() - 1);
                elevations[index]
            }
            None => 0,
        }
    }
}
