use log::{debug, info};

use crate::board::{self, CellState, Grid, GRID_HEIGHT, GRID_WIDTH};
use crate::tetromino::{PieceProvider, RandomPieceProvider, Shape, Tetromino};

// ============================================================================
// Configuration
// ============================================================================

pub const LINES_PER_LEVEL: u32 = 10;

/// Where the very first piece of a game appears.
pub const INITIAL_POSITION: Position = Position { x: 3, y: -2 };
/// Row at which promoted pieces spawn, two rows above the visible board.
pub const SPAWN_Y: i16 = -2;

// Scoring, multiplied by (level + 1)
pub const SCORE_SINGLE: u32 = 40;
pub const SCORE_DOUBLE: u32 = 100;
pub const SCORE_TRIPLE: u32 = 300;
pub const SCORE_TETRIS: u32 = 1200;

// ============================================================================
// Types
// ============================================================================

/// Top-left corner of the active piece's bounding box in board coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Running,
    GameOver,
}

/// Discrete inputs the engine understands. The gravity clock feeds
/// `GravityTick` through the same path as player input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCw,
    RotateCcw,
    GravityTick,
    Restart,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    LevelUp(u32),
    GameRestarted,
    GameOver,
}

/// Read-only view handed to the renderer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Snapshot {
    /// Board with the active piece drawn in.
    pub grid: Grid,
    pub next: Tetromino,
    pub score: u32,
    /// One-based level for display.
    pub level: u32,
    pub lines_cleared: u32,
    pub game_over: bool,
}

/// Points for clearing `lines` rows at once while on `level`.
pub fn score_for_lines(lines: u32, level: u32) -> u32 {
    let base = match lines {
        0 => 0,
        1 => SCORE_SINGLE,
        2 => SCORE_DOUBLE,
        3 => SCORE_TRIPLE,
        _ => SCORE_TETRIS,
    };
    base * (level + 1)
}

/// Horizontally centered spawn point for a promoted piece.
pub fn spawn_position(shape: &Shape) -> Position {
    Position {
        x: (GRID_WIDTH as i16 - shape.width() as i16).div_euclid(2),
        y: SPAWN_Y,
    }
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub grid: Grid,
    pub current: Tetromino,
    pub position: Position,
    pub next: Tetromino,
    pub score: u32,
    pub lines_cleared: u32,
    pub level: u32,
    pub state: GameState,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new() -> Self {
        Self::with_provider(Box::new(RandomPieceProvider::from_entropy()))
    }

    /// Starts a game drawing pieces from `provider`: first the current
    /// piece, then the next one.
    pub fn with_provider(mut provider: Box<dyn PieceProvider>) -> Self {
        let current = Tetromino::new(provider.next_piece());
        let next = Tetromino::new(provider.next_piece());

        Self {
            grid: board::empty_grid(),
            current,
            position: INITIAL_POSITION,
            next,
            score: 0,
            lines_cleared: 0,
            level: 0,
            state: GameState::Running,
            piece_provider: provider,
            events: Vec::new(),
        }
    }

    /// Starts from a prepared board with `piece` active at `position`.
    pub fn with_grid(grid: Grid, piece: Tetromino, position: Position) -> Self {
        let mut game = Self::new();
        game.grid = grid;
        game.current = piece;
        game.position = position;
        game
    }

    /// Applies one command against the current state.
    ///
    /// Everything but `Restart` is ignored once the game is over.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::MoveLeft => {
                self.move_piece(-1, 0);
            }
            Command::MoveRight => {
                self.move_piece(1, 0);
            }
            Command::SoftDrop => self.soft_drop(),
            Command::HardDrop => self.hard_drop(),
            Command::RotateCw => {
                self.rotate_piece(true);
            }
            Command::RotateCcw => {
                self.rotate_piece(false);
            }
            Command::GravityTick => self.tick(),
            Command::Restart => self.restart(),
        }
    }

    pub fn can_place(&self, shape: &Shape, x: i16, y: i16) -> bool {
        board::is_valid_move(&self.grid, shape, x, y)
    }

    pub fn move_piece(&mut self, dx: i16, dy: i16) -> bool {
        if self.state != GameState::Running {
            return false;
        }
        let x = self.position.x + dx;
        let y = self.position.y + dy;
        if self.can_place(&self.current.shape, x, y) {
            self.position = Position { x, y };
            self.events.push(GameEvent::PieceMoved);
            true
        } else {
            false
        }
    }

    /// Rotates in place. There is no kick search: a rotation that collides
    /// at the current position is rejected.
    pub fn rotate_piece(&mut self, clockwise: bool) -> bool {
        if self.state != GameState::Running {
            return false;
        }
        let rotated = if clockwise {
            self.current.shape.rotated_cw()
        } else {
            self.current.shape.rotated_ccw()
        };
        if self.can_place(&rotated, self.position.x, self.position.y) {
            self.current.shape = rotated;
            self.events.push(GameEvent::PieceRotated);
            true
        } else {
            false
        }
    }

    pub fn hard_drop(&mut self) {
        if self.state != GameState::Running {
            return;
        }
        let mut drop_y = self.position.y;
        while self.can_place(&self.current.shape, self.position.x, drop_y + 1) {
            drop_y += 1;
        }
        self.lock(self.position.x, drop_y);
    }

    /// One forced step down; locks in place when the step is blocked.
    pub fn soft_drop(&mut self) {
        self.step_down();
    }

    /// Gravity step driven by the clock.
    pub fn tick(&mut self) {
        self.step_down();
    }

    fn step_down(&mut self) {
        if self.state != GameState::Running {
            return;
        }
        if !self.move_piece(0, 1) {
            self.lock(self.position.x, self.position.y);
        }
    }

    /// Commits the active piece at `(x, y)`, scores cleared rows and
    /// promotes the next piece.
    ///
    /// A piece that comes to rest entirely above the visible board cannot
    /// lock: the game ends and nothing is committed.
    fn lock(&mut self, x: i16, y: i16) {
        if self.current.shape.cells().all(|(_, row)| y + row < 0) {
            self.end_game();
            return;
        }

        let merged = board::merge(
            &self.grid,
            &self.current.shape,
            x,
            y,
            self.current.tetromino_type,
        );
        self.events.push(GameEvent::PieceLocked);

        let (grid, cleared) = board::clear_lines(&merged);
        debug!(
            "locked {:?} at ({x}, {y}), cleared {cleared}",
            self.current.tetromino_type
        );
        if cleared > 0 {
            self.events.push(GameEvent::LinesCleared(cleared));
        }
        self.add_score(cleared);

        let upcoming = Tetromino::new(self.piece_provider.next_piece());
        self.current = std::mem::replace(&mut self.next, upcoming);
        let spawn = spawn_position(&self.current.shape);

        if !board::is_valid_move(&grid, &self.current.shape, spawn.x, spawn.y) {
            self.end_game();
        }

        self.grid = grid;
        self.position = spawn;
    }

    fn end_game(&mut self) {
        self.state = GameState::GameOver;
        self.events.push(GameEvent::GameOver);
        info!(
            "game over: score {}, lines {}, level {}",
            self.score,
            self.lines_cleared,
            self.level + 1
        );
    }

    /// Adds points for `lines` cleared rows and advances the level.
    ///
    /// The level rises by at most one per call even if several thresholds
    /// were crossed.
    pub fn add_score(&mut self, lines: u32) {
        self.score += score_for_lines(lines, self.level);
        self.lines_cleared += lines;

        if self.lines_cleared / LINES_PER_LEVEL > self.level {
            self.level += 1;
            self.events.push(GameEvent::LevelUp(self.level));
            info!("level up: {}", self.level + 1);
        }
    }

    pub fn restart(&mut self) {
        self.grid = board::empty_grid();
        self.current = Tetromino::new(self.piece_provider.next_piece());
        self.next = Tetromino::new(self.piece_provider.next_piece());
        self.position = INITIAL_POSITION;

        self.score = 0;
        self.lines_cleared = 0;
        self.level = 0;
        self.state = GameState::Running;

        self.events.clear();
        self.events.push(GameEvent::GameRestarted);
        info!("game restarted");
    }

    /// Returns the visual grid state with the current piece overlaid
    pub fn render_grid(&self) -> Grid {
        let mut visual_grid = self.grid.clone();

        for (col, row) in self.current.shape.cells() {
            let x = self.position.x + col;
            let y = self.position.y + row;
            if y >= 0 && y < GRID_HEIGHT as i16 && x >= 0 && x < GRID_WIDTH as i16 {
                visual_grid[y as usize][x as usize] =
                    CellState::Filled(self.current.tetromino_type);
            }
        }

        visual_grid
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.render_grid(),
            next: self.next.clone(),
            score: self.score,
            level: self.level + 1,
            lines_cleared: self.lines_cleared,
            game_over: self.is_game_over(),
        }
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn total_filled_cells(&self) -> usize {
        self.grid.iter().flatten().filter(|cell| cell.is_filled()).count()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::tetromino::{SequencePieceProvider, TetrominoType};

    pub use crate::board::empty_grid;

    pub fn fill_row(grid: &mut Grid, y: usize) {
        for x in 0..GRID_WIDTH {
            grid[y][x] = CellState::Filled(TetrominoType::T);
        }
    }

    pub fn fill_row_with_gap(grid: &mut Grid, y: usize, gap_x: usize) {
        for x in 0..GRID_WIDTH {
            if x != gap_x {
                grid[y][x] = CellState::Filled(TetrominoType::T);
            }
        }
    }

    /// Game whose pieces come from `pieces` in order, cycling.
    pub fn sequence_game(pieces: Vec<TetrominoType>) -> Game {
        Game::with_provider(Box::new(SequencePieceProvider::new(pieces)))
    }
}
