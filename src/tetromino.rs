use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TetrominoType {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl TetrominoType {
    pub const ALL: [TetrominoType; 7] = [
        TetrominoType::I,
        TetrominoType::O,
        TetrominoType::T,
        TetrominoType::S,
        TetrominoType::Z,
        TetrominoType::J,
        TetrominoType::L,
    ];

    /// Zero-based kind index, in `ALL` order.
    pub fn index(&self) -> usize {
        match self {
            TetrominoType::I => 0,
            TetrominoType::O => 1,
            TetrominoType::T => 2,
            TetrominoType::S => 3,
            TetrominoType::Z => 4,
            TetrominoType::J => 5,
            TetrominoType::L => 6,
        }
    }

    /// Color-class id stored in the board, 1..=7.
    pub fn color(&self) -> u8 {
        self.index() as u8 + 1
    }

    /// Spawn orientation as a square 0/1 matrix.
    fn template(&self) -> &'static [&'static [u8]] {
        match self {
            TetrominoType::I => &[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]],
            TetrominoType::O => &[&[1, 1], &[1, 1]],
            TetrominoType::T => &[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]],
            TetrominoType::S => &[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]],
            TetrominoType::Z => &[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]],
            TetrominoType::J => &[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]],
            TetrominoType::L => &[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]],
        }
    }

    /// A fresh copy of the spawn shape; never shares storage with the template.
    pub fn shape(&self) -> Shape {
        Shape::from_rows(
            self.template()
                .iter()
                .map(|row| row.iter().map(|&cell| cell != 0).collect())
                .collect(),
        )
    }
}

/// Square occupancy matrix of a piece, indexed `[row][col]`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    /// Builds a shape from its rows. Rotation is only defined for square
    /// matrices, so callers must pass N rows of N cells.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == rows.len()));
        Self { rows }
    }

    /// Side length of the bounding box.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Width of the bounding box, used to center the piece at spawn.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    pub fn is_occupied(&self, col: usize, row: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Offsets `(col, row)` of the occupied cells, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(col, _)| (col as i16, row as i16))
        })
    }

    /// 90 degrees clockwise: `result[col][n - 1 - row] = self[row][col]`.
    pub fn rotated_cw(&self) -> Shape {
        let n = self.size();
        let mut rows = vec![vec![false; n]; n];
        for (row, cells) in self.rows.iter().enumerate() {
            for (col, &filled) in cells.iter().enumerate() {
                rows[col][n - 1 - row] = filled;
            }
        }
        Shape { rows }
    }

    /// Three clockwise turns.
    pub fn rotated_ccw(&self) -> Shape {
        self.rotated_cw().rotated_cw().rotated_cw()
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tetromino {
    pub tetromino_type: TetrominoType,
    pub shape: Shape,
}

impl Tetromino {
    pub fn new(tetromino_type: TetrominoType) -> Self {
        Self {
            tetromino_type,
            shape: tetromino_type.shape(),
        }
    }

    pub fn color(&self) -> u8 {
        self.tetromino_type.color()
    }
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

/// Source of upcoming piece kinds. The engine draws from it at start,
/// at every lock and on restart.
pub trait PieceProvider {
    fn next_piece(&mut self) -> TetrominoType;
}

/// Uniform choice over the seven kinds.
pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        TetrominoType::ALL[self.rng.gen_range(0..TetrominoType::ALL.len())]
    }
}

/// Replays a fixed list of kinds, cycling when it runs out.
pub struct SequencePieceProvider {
    pieces: Vec<TetrominoType>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<TetrominoType>) -> Self {
        assert!(!pieces.is_empty(), "piece sequence must not be empty");
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}
