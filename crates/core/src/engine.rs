//! Engine module - the only place game state is mutated
//!
//! Ties the grid, the falling piece, the round-robin cursor and scoring
//! together. Every transition builds a candidate piece, validates it against
//! the grid and commits it only on success, so a failed action leaves the
//! engine untouched.

use std::fmt;

use tracing::debug;

use crate::grid::Grid;
use crate::piece::Piece;
use crate::scoring::{clamp_chosen_level, line_clear_points, progression};
use crate::snapshot::{GameSnapshot, PieceSnapshot};
use crate::types::{fall_interval_ms, Action, PieceKind};

/// Which attempted move was illegal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Left,
    Right,
    Rotate,
}

/// Why a game-over was reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOverCause {
    /// The game had already ended before the action
    Finished,
    /// A lock left no room for the next piece
    SpawnBlocked,
}

/// Failure of a single engine action
///
/// Both kinds are recoverable: the engine state after the failure is still
/// consistent and can be snapshotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineError {
    InvalidMove(Move),
    GameOver(GameOverCause),
}

impl EngineError {
    pub fn is_game_over(&self) -> bool {
        matches!(self, EngineError::GameOver(_))
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidMove(Move::Left) => write!(f, "invalid move: left"),
            EngineError::InvalidMove(Move::Right) => write!(f, "invalid move: right"),
            EngineError::InvalidMove(Move::Rotate) => write!(f, "invalid rotation"),
            EngineError::GameOver(GameOverCause::Finished) => write!(f, "game over"),
            EngineError::GameOver(GameOverCause::SpawnBlocked) => {
                write!(f, "no room for a new piece: game over")
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Emitted when a piece locks into the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub kind: PieceKind,
    pub lines_cleared: u32,
    pub points: u32,
}

/// Result of a successful drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The piece moved down one row
    Fell,
    /// The piece could not fall, locked, and the next piece spawned
    Locked(LockEvent),
}

/// Complete game state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEngine {
    grid: Grid,
    piece: Piece,
    cursor: u8,
    score: u32,
    lines_cleared: u32,
    chosen_level: u32,
    current_level: u32,
    fall_interval_ms: u32,
    game_over: bool,
}

impl GameEngine {
    /// Fresh game: empty grid, first alphabet piece at spawn
    ///
    /// `chosen_level` is clamped into the playable range.
    pub fn new(chosen_level: u32) -> Self {
        let chosen_level = clamp_chosen_level(chosen_level);
        Self {
            grid: Grid::new(),
            piece: Piece::new(PieceKind::from_index(0)),
            cursor: 0,
            score: 0,
            lines_cleared: 0,
            chosen_level,
            current_level: chosen_level,
            fall_interval_ms: fall_interval_ms(chosen_level),
            game_over: false,
        }
    }

    /// Rebuild an engine from a snapshot, field for field
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        Self {
            grid: Grid::from_rows(&snapshot.grid),
            piece: Piece::from(snapshot.piece),
            cursor: snapshot.cursor,
            score: snapshot.score,
            lines_cleared: snapshot.lines_cleared,
            chosen_level: snapshot.chosen_level,
            current_level: snapshot.current_level,
            fall_interval_ms: snapshot.fall_interval_ms,
            game_over: snapshot.game_over,
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.grid.write_rows(&mut out.grid);
        out.piece = PieceSnapshot::from(self.piece);
        out.cursor = self.cursor;
        out.score = self.score;
        out.lines_cleared = self.lines_cleared;
        out.chosen_level = self.chosen_level;
        out.current_level = self.current_level;
        out.fall_interval_ms = self.fall_interval_ms;
        out.game_over = self.game_over;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut out = GameSnapshot {
            grid: [[None; crate::types::COLS]; crate::types::ROWS],
            piece: PieceSnapshot::from(self.piece),
            cursor: 0,
            score: 0,
            lines_cleared: 0,
            chosen_level: 0,
            current_level: 0,
            fall_interval_ms: 0,
            game_over: false,
        };
        self.snapshot_into(&mut out);
        out
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[cfg(test)]
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn cursor(&self) -> u8 {
        self.cursor
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn chosen_level(&self) -> u32 {
        self.chosen_level
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn fall_interval_ms(&self) -> u32 {
        self.fall_interval_ms
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    fn ensure_playable(&self) -> Result<(), EngineError> {
        if self.game_over {
            return Err(EngineError::GameOver(GameOverCause::Finished));
        }
        Ok(())
    }

    /// Commit `candidate` if the grid accepts it
    fn try_commit(&mut self, candidate: Piece, attempted: Move) -> Result<(), EngineError> {
        if !self.grid.is_valid_position(&candidate) {
            return Err(EngineError::InvalidMove(attempted));
        }
        self.piece = candidate;
        Ok(())
    }

    pub fn move_left(&mut self) -> Result<(), EngineError> {
        self.ensure_playable()?;
        self.try_commit(self.piece.moved(-1, 0), Move::Left)
    }

    pub fn move_right(&mut self) -> Result<(), EngineError> {
        self.ensure_playable()?;
        self.try_commit(self.piece.moved(1, 0), Move::Right)
    }

    pub fn rotate(&mut self) -> Result<(), EngineError> {
        self.ensure_playable()?;
        self.try_commit(self.piece.rotated(), Move::Rotate)
    }

    /// Move the piece down one row, locking it when it cannot fall
    ///
    /// A lock places the piece, clears full lines, updates score, lines and
    /// level, then spawns the next letter. If that piece does not fit the game
    /// ends and `GameOver(SpawnBlocked)` is returned; the lock stays applied.
    pub fn soft_drop(&mut self) -> Result<DropOutcome, EngineError> {
        self.ensure_playable()?;

        let fallen = self.piece.moved(0, 1);
        if self.grid.is_valid_position(&fallen) {
            self.piece = fallen;
            return Ok(DropOutcome::Fell);
        }

        let event = self.lock_piece();
        if self.spawn_next() {
            Ok(DropOutcome::Locked(event))
        } else {
            Err(EngineError::GameOver(GameOverCause::SpawnBlocked))
        }
    }

    /// Apply one action
    pub fn apply(&mut self, action: Action) -> Result<(), EngineError> {
        match action {
            Action::Left => self.move_left(),
            Action::Right => self.move_right(),
            Action::Rotate => self.rotate(),
            Action::Drop => self.soft_drop().map(|_| ()),
        }
    }

    /// Lock the active piece at its resting row and score the clear
    fn lock_piece(&mut self) -> LockEvent {
        self.grid.place(&self.piece);

        let lines = self.grid.clear_full_lines() as u32;
        let points = line_clear_points(lines);
        self.score = self.score.saturating_add(points);
        self.lines_cleared = self.lines_cleared.saturating_add(lines);

        let (level, interval) = progression(self.chosen_level, self.lines_cleared);
        self.current_level = level;
        self.fall_interval_ms = interval;

        debug!(
            kind = self.piece.kind.as_str(),
            x = self.piece.x,
            y = self.piece.y,
            lines,
            score = self.score,
            level,
            "piece locked"
        );

        LockEvent {
            kind: self.piece.kind,
            lines_cleared: lines,
            points,
        }
    }

    /// Advance the cursor and spawn its piece
    ///
    /// Returns false (and ends the game) if the new piece has no valid position.
    fn spawn_next(&mut self) -> bool {
        self.cursor = ((self.cursor as usize + 1) % PieceKind::ALPHABET.len()) as u8;
        self.piece = Piece::new(PieceKind::from_index(self.cursor as usize));

        if !self.grid.is_valid_position(&self.piece) {
            self.game_over = true;
            debug!(kind = self.piece.kind.as_str(), score = self.score, "spawn blocked, game over");
            return false;
        }
        true
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(1)
    }
}
