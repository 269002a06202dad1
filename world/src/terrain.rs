//! Static terrain derived from the map configuration.

use ridgeline_defence_core::{
    config::{MapConfig, TileKind},
    elevation::HeightView,
    CellCoord, WorldPoint,
};

/// Tile roles, heights, and the enemy path frozen at world construction.
#[derive(Clone, Debug)]
pub(crate) struct Terrain {
    columns: u32,
    rows: u32,
    tile_length: f32,
    tiles: Vec<TileKind>,
    heights: Vec<i32>,
    waypoints: Vec<WorldPoint>,
    path_elevations: Vec<i32>,
}

impl Terrain {
    pub(crate) fn from_config(map: &MapConfig) -> Self {
        Self {
            columns: map.columns(),
            rows: map.rows(),
            tile_length: map.tile_length(),
            tiles: map.tiles().to_vec(),
            heights: map.heights().to_vec(),
            waypoints: map.waypoints().to_vec(),
            path_elevations: map.path_elevations().to_vec(),
        }
    }

    pub(crate) fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some(cell.row() as usize * self.columns as usize + cell.column() as usize)
    }

    pub(crate) fn is_buildable(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(false, |index| self.tiles[index] == TileKind::Buildable)
    }

    pub(crate) fn height(&self, cell: CellCoord) -> i32 {
        self.index(cell).map_or(0, |index| self.heights[index])
    }

    pub(crate) fn cell_center(&self, cell: CellCoord) -> WorldPoint {
        WorldPoint::new(
            (cell.column() as f32 + 0.5) * self.tile_length,
            (cell.row() as f32 + 0.5) * self.tile_length,
        )
    }

    /// Maps a world-space point back onto the grid, clamped to the borders.
    pub(crate) fn cell_at(&self, point: WorldPoint) -> CellCoord {
        let column = (point.x() / self.tile_length)
            .floor()
            .clamp(0.0, self.columns.saturating_sub(1) as f32) as u32;
        let row = (point.y() / self.tile_length)
            .floor()
            .clamp(0.0, self.rows.saturating_sub(1) as f32) as u32;
        CellCoord::new(column, row)
    }

    pub(crate) fn height_view(&self) -> HeightView<'_> {
        HeightView::new(&self.heights, self.columns, self.rows)
    }

    pub(crate) fn waypoints(&self) -> &[WorldPoint] {
        &self.waypoints
    }

    pub(crate) fn path_elevations(&self) -> Option<&[i32]> {
        if self.path_elevations.is_empty() {
            None
        } else {
            Some(&self.path_elevations)
        }
    }
}
