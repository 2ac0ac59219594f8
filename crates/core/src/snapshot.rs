//! Detached, plain-data copy of an engine
//!
//! A [`GameSnapshot`] shares nothing with the engine that produced it, so a
//! session store can keep it between requests and rebuild an engine from it
//! later. Decoding a snapshot into an engine and encoding it again yields an
//! identical snapshot.

use crate::piece::{Piece, Shape};
use crate::types::{Cell, PieceKind, COLS, ROWS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSnapshot {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl From<Piece> for PieceSnapshot {
    fn from(value: Piece) -> Self {
        Self {
            kind: value.kind,
            shape: value.shape,
            x: value.x,
            y: value.y,
        }
    }
}

impl From<PieceSnapshot> for Piece {
    fn from(value: PieceSnapshot) -> Self {
        Self {
            kind: value.kind,
            shape: value.shape,
            x: value.x,
            y: value.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub grid: [[Cell; COLS]; ROWS],
    pub piece: PieceSnapshot,
    /// Round-robin position of the active piece in `PieceKind::ALPHABET`
    pub cursor: u8,
    pub score: u32,
    pub lines_cleared: u32,
    pub chosen_level: u32,
    pub current_level: u32,
    pub fall_interval_ms: u32,
    pub game_over: bool,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        !self.game_over
    }

    /// Letter of the next piece the cursor will spawn
    pub fn next_kind(&self) -> PieceKind {
        PieceKind::from_index(self.cursor as usize + 1)
    }

    /// Number of occupied grid cells
    pub fn filled_cells(&self) -> usize {
        self.grid.iter().flatten().filter(|c| c.is_some()).count()
    }
}
