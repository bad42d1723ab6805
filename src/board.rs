//! Play field and the pure collision, merge and line-clear rules over it.
//!
//! Every function here takes the grid by reference and never mutates it;
//! callers replace their grid with the returned value.

use crate::tetromino::{Shape, TetrominoType};

// ============================================================================
// Configuration
// ============================================================================

pub const GRID_WIDTH: usize = 10;
pub const GRID_HEIGHT: usize = 20;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    #[default]
    Empty,
    Filled(TetrominoType),
}

impl CellState {
    /// Color-class id of the cell: 0 when empty, 1..=7 otherwise.
    pub fn value(&self) -> u8 {
        match self {
            CellState::Empty => 0,
            CellState::Filled(kind) => kind.color(),
        }
    }

    pub fn is_filled(&self) -> bool {
        !matches!(self, CellState::Empty)
    }
}

pub type Grid = Vec<Vec<CellState>>;

pub fn empty_grid() -> Grid {
    vec![empty_row(); GRID_HEIGHT]
}

fn empty_row() -> Vec<CellState> {
    vec![CellState::Empty; GRID_WIDTH]
}

// ============================================================================
// Rules
// ============================================================================

/// Whether `shape` fits with its bounding box's top-left corner at `(x, y)`.
///
/// Cells above the visible board (`y + row < 0`) are always allowed so a
/// piece can spawn partially hidden. Everything else must be inside the
/// walls, above the floor and on an empty cell.
pub fn is_valid_move(grid: &Grid, shape: &Shape, x: i16, y: i16) -> bool {
    for (col, row) in shape.cells() {
        let nx = x + col;
        let ny = y + row;
        if nx < 0 || nx >= GRID_WIDTH as i16 || ny >= GRID_HEIGHT as i16 {
            return false;
        }
        if ny >= 0 && grid[ny as usize][nx as usize].is_filled() {
            return false;
        }
    }
    true
}

/// Returns a copy of `grid` with the shape's cells written in as `kind`.
///
/// Cells that land above the board are dropped.
pub fn merge(grid: &Grid, shape: &Shape, x: i16, y: i16, kind: TetrominoType) -> Grid {
    let mut merged = grid.clone();
    for (col, row) in shape.cells() {
        let nx = x + col;
        let ny = y + row;
        if ny >= 0 && ny < GRID_HEIGHT as i16 && nx >= 0 && nx < GRID_WIDTH as i16 {
            merged[ny as usize][nx as usize] = CellState::Filled(kind);
        }
    }
    merged
}

/// Removes every full row and pads the top with empty rows.
///
/// Returns the new grid together with the number of rows removed.
pub fn clear_lines(grid: &Grid) -> (Grid, u32) {
    let kept: Vec<Vec<CellState>> = grid
        .iter()
        .filter(|row| !is_row_full(row))
        .cloned()
        .collect();
    let cleared = (grid.len() - kept.len()) as u32;

    let mut cleared_grid = Vec::with_capacity(GRID_HEIGHT);
    while cleared_grid.len() + kept.len() < GRID_HEIGHT {
        cleared_grid.push(empty_row());
    }
    cleared_grid.extend(kept);

    (cleared_grid, cleared)
}

pub fn is_row_full(row: &[CellState]) -> bool {
    row.iter().all(CellState::is_filled)
}
