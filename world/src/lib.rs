#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Karel simulator.
//!
//! The world stores its cells at double resolution: a world of `W x H`
//! corners is encoded as a `(2W - 1) x (2H - 1)` grid in which corners occupy
//! the cells with even column and even row, and the cells in between hold
//! the wall segments that separate neighbouring corners.

mod grid;

use karel_core::{
    Cell, ConstructionError, GridCoord, MarkerDirective, MarkerError, WallDirective,
    MAX_GRID_EXTENT,
};
use tracing::debug;

use self::grid::CellGrid;

/// Represents the authoritative Karel world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct World {
    avenues: u32,
    streets: u32,
    grid: CellGrid,
}

impl World {
    /// Builds a world from ordered wall and marker directives.
    ///
    /// Directives are applied in order. Any invalid directive aborts the
    /// construction and no partially built world is returned.
    pub fn new(
        avenues: u32,
        streets: u32,
        walls: &[WallDirective],
        markers: &[MarkerDirective],
    ) -> Result<Self, ConstructionError> {
        let geometry = ConstructionError::InvalidGeometry { avenues, streets };
        let columns = doubled_extent(avenues).ok_or_else(|| geometry.clone())?;
        let rows = doubled_extent(streets).ok_or(geometry)?;

        let mut world = Self {
            avenues,
            streets,
            grid: CellGrid::new(columns, rows),
        };
        for directive in walls {
            world.place_wall(*directive)?;
        }
        for directive in markers {
            world.place_markers(*directive)?;
        }

        debug!(
            avenues,
            streets,
            walls = walls.len(),
            markers = markers.len(),
            "world_constructed"
        );
        Ok(world)
    }

    /// Number of avenues (logical columns).
    #[must_use]
    pub const fn avenues(&self) -> u32 {
        self.avenues
    }

    /// Number of streets (logical rows).
    #[must_use]
    pub const fn streets(&self) -> u32 {
        self.streets
    }

    /// Dimensions of the doubled grid as `(columns, rows)`.
    #[must_use]
    pub fn extent(&self) -> (u32, u32) {
        self.grid.dimensions()
    }

    /// Reports whether the coordinate lies inside the doubled grid.
    #[must_use]
    pub fn contains(&self, coord: GridCoord) -> bool {
        self.grid.contains(coord)
    }

    /// Content of the cell at the coordinate, or `None` outside the grid.
    #[must_use]
    pub fn cell_at(&self, coord: GridCoord) -> Option<Cell> {
        self.grid.get(coord)
    }

    /// Reports whether the cell holds a wall; cells outside the grid do not.
    #[must_use]
    pub fn is_wall(&self, coord: GridCoord) -> bool {
        self.cell_at(coord).is_some_and(Cell::is_wall)
    }

    /// Number of markers stacked at the coordinate.
    #[must_use]
    pub fn markers_at(&self, coord: GridCoord) -> u32 {
        self.cell_at(coord).map_or(0, Cell::markers)
    }

    /// Adds one marker to a corner and returns the new count.
    ///
    /// A full corner is left untouched.
    pub fn deposit_marker(&mut self, coord: GridCoord) -> Result<u32, MarkerError> {
        let slot = self.corner_mut(coord)?;
        let count = slot.markers().checked_add(1).ok_or(MarkerError::CornerFull)?;
        *slot = Cell::Markers(count);
        Ok(count)
    }

    /// Removes one marker from a corner and returns the new count.
    pub fn remove_marker(&mut self, coord: GridCoord) -> Result<u32, MarkerError> {
        let slot = self.corner_mut(coord)?;
        let count = slot.markers().checked_sub(1).ok_or(MarkerError::NoMarker)?;
        *slot = Cell::Markers(count);
        Ok(count)
    }

    fn corner_mut(&mut self, coord: GridCoord) -> Result<&mut Cell, MarkerError> {
        let not_a_corner = MarkerError::NotACorner {
            column: coord.column(),
            row: coord.row(),
        };
        if !coord.is_corner() {
            return Err(not_a_corner);
        }
        self.grid.get_mut(coord).ok_or(not_a_corner)
    }

    fn place_wall(&mut self, directive: WallDirective) -> Result<(), ConstructionError> {
        let invalid = || ConstructionError::InvalidWallPlacement {
            avenue: directive.corner.avenue(),
            street: directive.corner.street(),
            side: directive.side.letter(),
        };

        let corner = directive
            .corner
            .to_grid()
            .filter(|corner| self.grid.contains(*corner))
            .ok_or_else(invalid)?;
        let (dx, dy) = directive.side.heading().to_vector();
        let seam = corner
            .offset(dx, dy)
            .filter(|seam| self.grid.contains(*seam) && !seam.is_corner())
            .ok_or_else(invalid)?;

        self.grid.set(seam, Cell::Wall);

        // Vertical seams extend along the column, horizontal ones along the row.
        let (mx, my) = if seam.column() % 2 == 1 { (0, 1) } else { (1, 0) };
        for mirror in [seam.offset(mx, my), seam.offset(-mx, -my)]
            .into_iter()
            .flatten()
        {
            self.grid.set(mirror, Cell::Wall);
        }
        Ok(())
    }

    fn place_markers(&mut self, directive: MarkerDirective) -> Result<(), ConstructionError> {
        let corner = directive
            .corner
            .to_grid()
            .filter(|corner| self.grid.contains(*corner))
            .ok_or(ConstructionError::InvalidMarkerPlacement {
                avenue: directive.corner.avenue(),
                street: directive.corner.street(),
            })?;
        self.grid.set(corner, Cell::Markers(directive.count));
        Ok(())
    }
}

fn doubled_extent(corners: u32) -> Option<u32> {
    corners
        .checked_mul(2)
        .and_then(|doubled| doubled.checked_sub(1))
        .filter(|extent| (1..=MAX_GRID_EXTENT).contains(extent))
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use karel_core::{Cell, Corner, GridCoord};

    /// Iterates every doubled-grid cell in row-major order, southern row first.
    pub fn cells(world: &World) -> impl Iterator<Item = (GridCoord, Cell)> + '_ {
        world.grid.iter()
    }

    /// Iterates the logical corners together with their marker counts.
    pub fn corners(world: &World) -> impl Iterator<Item = (Corner, u32)> + '_ {
        cells(world).filter_map(|(coord, cell)| Some((coord.corner()?, cell.markers())))
    }

    /// Iterates the coordinates of every wall cell.
    pub fn walls(world: &World) -> impl Iterator<Item = GridCoord> + '_ {
        cells(world)
            .filter(|(_, cell)| cell.is_wall())
            .map(|(coord, _)| coord)
    }

    /// Sum of the markers lying on every corner of the world.
    #[must_use]
    pub fn total_markers(world: &World) -> u64 {
        corners(world).map(|(_, count)| u64::from(count)).sum()
    }
}
