use tetramaster::board::{
    clear_lines, empty_grid, is_valid_move, merge, CellState, GRID_HEIGHT, GRID_WIDTH,
};
use tetramaster::game::test_helpers::{fill_row, fill_row_with_gap};
use tetramaster::tetromino::TetrominoType;

// ============================================================================
// Collision Tests
// ============================================================================

mod collision {
    use super::*;

    #[test]
    fn o_piece_fits_at_every_corner() {
        let grid = empty_grid();
        let shape = TetrominoType::O.shape();
        let corners = [
            (0, 0),
            (GRID_WIDTH as i16 - 2, 0),
            (0, GRID_HEIGHT as i16 - 2),
            (GRID_WIDTH as i16 - 2, GRID_HEIGHT as i16 - 2),
        ];

        for (x, y) in corners {
            assert!(is_valid_move(&grid, &shape, x, y), "({x}, {y}) should be valid");
        }
    }

    #[test]
    fn rejects_cells_outside_walls_and_floor() {
        let grid = empty_grid();
        let shape = TetrominoType::O.shape();

        assert!(!is_valid_move(&grid, &shape, -1, 5));
        assert!(!is_valid_move(&grid, &shape, GRID_WIDTH as i16 - 1, 5));
        assert!(!is_valid_move(&grid, &shape, 4, GRID_HEIGHT as i16 - 1));
    }

    #[test]
    fn empty_rows_of_bounding_box_may_hang_outside() {
        let grid = empty_grid();
        // I occupies only matrix row 1, so rows 2 and 3 may sit below the floor
        let shape = TetrominoType::I.shape();

        assert!(is_valid_move(&grid, &shape, 0, GRID_HEIGHT as i16 - 2));
        assert!(!is_valid_move(&grid, &shape, 0, GRID_HEIGHT as i16 - 1));
    }

    #[test]
    fn cells_above_board_are_always_permitted() {
        let mut grid = empty_grid();
        fill_row(&mut grid, 0);
        let shape = TetrominoType::O.shape();

        assert!(is_valid_move(&grid, &shape, 4, -2));
        assert!(!is_valid_move(&grid, &shape, 4, -1));
    }

    #[test]
    fn horizontal_bounds_apply_above_board() {
        let grid = empty_grid();
        let shape = TetrominoType::O.shape();

        assert!(!is_valid_move(&grid, &shape, -1, -2));
        assert!(!is_valid_move(&grid, &shape, GRID_WIDTH as i16 - 1, -2));
    }

    #[test]
    fn rejects_overlap_with_filled_cell() {
        let mut grid = empty_grid();
        grid[10][5] = CellState::Filled(TetrominoType::Z);
        let shape = TetrominoType::T.shape();

        // T row 1 spans columns x..x+2 at y+1
        assert!(!is_valid_move(&grid, &shape, 3, 9));
        assert!(is_valid_move(&grid, &shape, 6, 9));
    }
}

// ============================================================================
// Merge Tests
// ============================================================================

mod merging {
    use super::*;

    #[test]
    fn merge_writes_color_without_touching_input() {
        let grid = empty_grid();
        let shape = TetrominoType::S.shape();

        let merged = merge(&grid, &shape, 2, 10, TetrominoType::S);

        assert_eq!(grid, empty_grid());
        assert_eq!(merged[10][3], CellState::Filled(TetrominoType::S));
        assert_eq!(merged[10][4], CellState::Filled(TetrominoType::S));
        assert_eq!(merged[11][2], CellState::Filled(TetrominoType::S));
        assert_eq!(merged[11][3], CellState::Filled(TetrominoType::S));
        assert_eq!(merged.iter().flatten().filter(|c| c.is_filled()).count(), 4);
        assert_eq!(merged[10][3].value(), 4);
    }

    #[test]
    fn merge_drops_cells_above_board() {
        let grid = empty_grid();
        let shape = TetrominoType::O.shape();

        let merged = merge(&grid, &shape, 4, -1, TetrominoType::O);

        assert_eq!(merged[0][4], CellState::Filled(TetrominoType::O));
        assert_eq!(merged[0][5], CellState::Filled(TetrominoType::O));
        assert_eq!(merged.iter().flatten().filter(|c| c.is_filled()).count(), 2);
    }
}

// ============================================================================
// Line Clearing Tests
// ============================================================================

mod line_clearing {
    use super::*;

    #[test]
    fn board_without_full_rows_is_unchanged() {
        let mut grid = empty_grid();
        fill_row_with_gap(&mut grid, GRID_HEIGHT - 1, 5);
        grid[7][2] = CellState::Filled(TetrominoType::L);

        let (cleared_grid, cleared) = clear_lines(&grid);

        assert_eq!(cleared, 0);
        assert_eq!(cleared_grid, grid);
    }

    #[test]
    fn rows_above_cleared_line_fall_down() {
        let mut grid = empty_grid();
        fill_row(&mut grid, GRID_HEIGHT - 1);
        grid[GRID_HEIGHT - 2][0] = CellState::Filled(TetrominoType::J);
        grid[GRID_HEIGHT - 2][1] = CellState::Filled(TetrominoType::J);

        let (cleared_grid, cleared) = clear_lines(&grid);

        assert_eq!(cleared, 1);
        assert_eq!(cleared_grid[GRID_HEIGHT - 1][0], CellState::Filled(TetrominoType::J));
        assert_eq!(cleared_grid[GRID_HEIGHT - 1][1], CellState::Filled(TetrominoType::J));
        assert_eq!(cleared_grid[GRID_HEIGHT - 1][2], CellState::Empty);
        assert_eq!(cleared_grid[0], vec![CellState::Empty; GRID_WIDTH]);
    }

    #[test]
    fn non_contiguous_rows_cleared_in_order() {
        let mut grid = empty_grid();
        fill_row(&mut grid, GRID_HEIGHT - 1);
        grid[GRID_HEIGHT - 2][7] = CellState::Filled(TetrominoType::I);
        fill_row(&mut grid, GRID_HEIGHT - 3);
        grid[GRID_HEIGHT - 4][2] = CellState::Filled(TetrominoType::Z);

        let (cleared_grid, cleared) = clear_lines(&grid);

        assert_eq!(cleared, 2);
        assert_eq!(cleared_grid[GRID_HEIGHT - 1][7], CellState::Filled(TetrominoType::I));
        assert_eq!(cleared_grid[GRID_HEIGHT - 2][2], CellState::Filled(TetrominoType::Z));
    }

    #[test]
    fn all_rows_filled_and_cleared() {
        let mut grid = empty_grid();
        for y in 0..GRID_HEIGHT {
            fill_row(&mut grid, y);
        }

        let (cleared_grid, cleared) = clear_lines(&grid);

        assert_eq!(cleared, GRID_HEIGHT as u32);
        assert_eq!(cleared_grid, empty_grid());
    }

    #[test]
    fn clearing_keeps_dimensions() {
        let mut grid = empty_grid();
        fill_row(&mut grid, 0);
        fill_row(&mut grid, 12);

        let (cleared_grid, _) = clear_lines(&grid);

        assert_eq!(cleared_grid.len(), GRID_HEIGHT);
        assert!(cleared_grid.iter().all(|row| row.len() == GRID_WIDTH));
    }
}
