//! Pure elevation arithmetic and grid line-of-sight.
//!
//! Height advantage stretches tower range, slopes speed enemies up or down,
//! and tall platforms cost more to build on. All functions are deterministic
//! and free of world state so both the world and the targeting system share
//! one set of rules.

use crate::CellCoord;

/// Range gained or lost per level of height difference.
pub const RANGE_PER_LEVEL: f32 = 0.15;
/// Lower bound of the range multiplier when shooting uphill.
pub const RANGE_FLOOR: f32 = 0.5;
/// Speed gained or lost per level of slope.
pub const SLOPE_PER_LEVEL: f32 = 0.1;
/// Lower bound of the slope speed multiplier on steep climbs.
pub const SLOPE_FLOOR: f32 = 0.3;
/// Build cost surcharge per level of platform height.
pub const COST_PER_LEVEL: f32 = 0.25;

/// Computes a tower's effective range against a target at another height.
///
/// Height advantage extends range linearly; disadvantage shrinks it, clamped
/// so the effective range never drops below half the base range.
#[must_use]
pub fn effective_range(base_range: f32, observer_elevation: i32, target_elevation: i32) -> f32 {
    let delta = (observer_elevation - target_elevation) as f32;
    let multiplier = (1.0 + RANGE_PER_LEVEL * delta).max(RANGE_FLOOR);
    base_range * multiplier
}

/// Computes the speed multiplier for moving between two heights.
///
/// Downhill movement is faster, uphill slower. The multiplier is floored so
/// even an extreme climb never stalls an enemy outright.
#[must_use]
pub fn slope_speed_modifier(from_elevation: i32, to_elevation: i32) -> f32 {
    let delta = (from_elevation - to_elevation) as f32;
    (1.0 + SLOPE_PER_LEVEL * delta).max(SLOPE_FLOOR)
}

/// Computes the build cost multiplier for a platform at the given height.
#[must_use]
pub fn elevation_cost_multiplier(elevation: i32) -> f32 {
    1.0 + COST_PER_LEVEL * elevation as f32
}

/// Read-only view of the map's height grid.
#[derive(Clone, Copy, Debug)]
pub struct HeightView<'a> {
    cells: &'a [i32],
    columns: u32,
    rows: u32,
}

impl<'a> HeightView<'a> {
    /// Captures a new height view backed by the provided row-major slice.
    #[must_use]
    pub const fn new(cells: &'a [i32], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Height level of the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn height(&self, cell: CellCoord) -> Option<i32> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.cells.get(index).copied()
    }

    /// Dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

/// Reports whether terrain blocks the straight line between two cells.
///
/// Walks the Bresenham line from `from` to `to`. A strictly intermediate cell
/// blocks sight only if its height strictly exceeds the higher of the two
/// endpoint elevations; cells at or below that threshold, and the endpoints
/// themselves, never block.
#[must_use]
pub fn line_of_sight(
    heights: HeightView<'_>,
    from: CellCoord,
    from_elevation: i32,
    to: CellCoord,
    to_elevation: i32,
) -> bool {
    let threshold = from_elevation.max(to_elevation);

    let mut x = i64::from(from.column());
    let mut y = i64::from(from.row());
    let target_x = i64::from(to.column());
    let target_y = i64::from(to.row());

    let dx = (target_x - x).abs();
    let dy = -(target_y - y).abs();
    let step_x = if target_x > x { 1 } else { -1 };
    let step_y = if target_y > y { 1 } else { -1 };
    let mut error = dx + dy;

    loop {
        if x == target_x && y == target_y {
            return true;
        }

        let doubled = error * 2;
        if doubled >= dy {
            error += dy;
            x += step_x;
        }
        if doubled <= dx {
            error += dx;
            y += step_y;
        }

        if x == target_x && y == target_y {
            return true;
        }

        let cell = CellCoord::new(x as u32, y as u32);
        if let Some(height) = heights.height(cell) {
            if height > threshold {
                return false;
            }
        }
    }
}
