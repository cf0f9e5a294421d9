//! Dense doubled-resolution cell storage used by the world crate.

use karel_core::{Cell, GridCoord};

/// Row-major cell buffer; row zero is the southern edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CellGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl CellGrid {
    /// Allocates an empty grid with the provided doubled extent.
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![Cell::EMPTY; capacity],
        }
    }

    pub(crate) fn contains(&self, coord: GridCoord) -> bool {
        coord.column() < self.columns && coord.row() < self.rows
    }

    pub(crate) fn get(&self, coord: GridCoord) -> Option<Cell> {
        self.index(coord)
            .and_then(|index| self.cells.get(index).copied())
    }

    pub(crate) fn get_mut(&mut self, coord: GridCoord) -> Option<&mut Cell> {
        let index = self.index(coord)?;
        self.cells.get_mut(index)
    }

    /// Overwrites the cell, ignoring coordinates outside the grid.
    pub(crate) fn set(&mut self, coord: GridCoord, cell: Cell) {
        if let Some(slot) = self.get_mut(coord) {
            *slot = cell;
        }
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (GridCoord, Cell)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            (GridCoord::new(index % columns, index / columns), *cell)
        })
    }

    fn index(&self, coord: GridCoord) -> Option<usize> {
        if self.contains(coord) {
            let row = usize::try_from(coord.row()).ok()?;
            let column = usize::try_from(coord.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
