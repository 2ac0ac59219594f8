//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data with no external dependencies, making them usable
//! from the engine, the session store and the wire protocol alike.
//!
//! # Grid Dimensions
//!
//! - **Columns**: 10 (indexed 0-9, left to right)
//! - **Rows**: 20 (indexed 0-19, top to bottom)
//! - **Spawn position**: (3, 0) for every piece
//!
//! # Levels
//!
//! The player picks a base level in `1..=3`. The current level rises by one
//! for every 10 cleared lines and is capped at [`MAX_LEVEL`]:
//!
//! | Level | Fall interval |
//! |-------|---------------|
//! | 1 | 1000ms |
//! | 2 | 600ms |
//! | 3 | 200ms |
//! | other | 300ms |
//!
//! # Examples
//!
//! ```
//! use session_tetris_types::{Action, PieceKind, COLS, ROWS};
//!
//! // Round-robin order starts at I
//! assert_eq!(PieceKind::ALPHABET[0], PieceKind::I);
//! assert_eq!(PieceKind::I.next(), PieceKind::O);
//! assert_eq!(PieceKind::J.next(), PieceKind::I);
//!
//! // Letters parse case-insensitively
//! assert_eq!(PieceKind::from_char('t'), Some(PieceKind::T));
//!
//! // Host directions map onto engine actions
//! assert_eq!(Action::from_str("down"), Some(Action::Drop));
//!
//! assert_eq!(COLS, 10);
//! assert_eq!(ROWS, 20);
//! ```

/// Grid width in cells (10 columns)
pub const COLS: usize = 10;

/// Grid height in cells (20 rows)
pub const ROWS: usize = 20;

/// Column where every new piece spawns
pub const SPAWN_X: i8 = 3;

/// Row where every new piece spawns
pub const SPAWN_Y: i8 = 0;

/// Largest side of a piece occupancy matrix
pub const MAX_SHAPE_SIDE: usize = 4;

/// Lowest level a player may choose
pub const MIN_LEVEL: u32 = 1;

/// Highest reachable level
pub const MAX_LEVEL: u32 = 3;

/// Lines needed to advance one level
pub const LINES_PER_LEVEL: u32 = 10;

/// Points awarded per cleared line
pub const POINTS_PER_LINE: u32 = 100;

/// Fall interval for levels missing from [`LEVEL_INTERVALS_MS`]
pub const DEFAULT_FALL_INTERVAL_MS: u32 = 300;

/// Fall interval per level, as `(level, milliseconds)`
pub const LEVEL_INTERVALS_MS: [(u32, u32); 3] = [(1, 1000), (2, 600), (3, 200)];

/// The seven tetromino letters
///
/// Declaration order is the round-robin spawn order:
/// I, O, T, S, Z, L, J.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    L,
    J,
}

impl PieceKind {
    /// Spawn order of the round-robin cursor
    pub const ALPHABET: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::L,
        PieceKind::J,
    ];

    /// Piece at a cursor position (wraps around the alphabet)
    pub fn from_index(index: usize) -> Self {
        Self::ALPHABET[index % Self::ALPHABET.len()]
    }

    /// Cursor position of this piece in [`PieceKind::ALPHABET`]
    pub fn index(self) -> usize {
        match self {
            PieceKind::I => 0,
            PieceKind::O => 1,
            PieceKind::T => 2,
            PieceKind::S => 3,
            PieceKind::Z => 4,
            PieceKind::L => 5,
            PieceKind::J => 6,
        }
    }

    /// Next piece in round-robin order
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Parse piece letter (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use session_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('l'), Some(PieceKind::L));
    /// assert_eq!(PieceKind::from_char('.'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'L' => Some(PieceKind::L),
            'J' => Some(PieceKind::J),
            _ => None,
        }
    }

    /// Parse a one-letter string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    /// Uppercase letter of this piece
    pub fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::L => 'L',
            PieceKind::J => 'J',
        }
    }

    /// Uppercase letter as a static string
    pub fn as_str(self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::L => "L",
            PieceKind::J => "J",
        }
    }
}

/// Player actions accepted by the engine
///
/// Each request applies exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move piece one column left
    Left,
    /// Move piece one column right
    Right,
    /// Move piece one row down, locking it when it cannot fall
    Drop,
    /// Rotate piece 90° clockwise
    Rotate,
}

impl Action {
    /// Parse action from a host direction string
    ///
    /// `down` is the direction name used by clients; `drop` is accepted too.
    ///
    /// # Examples
    ///
    /// ```
    /// use session_tetris_types::Action;
    ///
    /// assert_eq!(Action::from_str("left"), Some(Action::Left));
    /// assert_eq!(Action::from_str("DOWN"), Some(Action::Drop));
    /// assert_eq!(Action::from_str("drop"), Some(Action::Drop));
    /// assert_eq!(Action::from_str("hold"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Some(Action::Left),
            "right" => Some(Action::Right),
            "down" | "drop" => Some(Action::Drop),
            "rotate" => Some(Action::Rotate),
            _ => None,
        }
    }

    /// Convert to the lowercase engine name
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Left => "left",
            Action::Right => "right",
            Action::Drop => "drop",
            Action::Rotate => "rotate",
        }
    }
}

/// A cell on the grid
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Cell filled by a locked piece of that letter
pub type Cell = Option<PieceKind>;

/// Fall interval in milliseconds for a level
///
/// # Examples
///
/// ```
/// use session_tetris_types::fall_interval_ms;
///
/// assert_eq!(fall_interval_ms(1), 1000);
/// assert_eq!(fall_interval_ms(3), 200);
/// assert_eq!(fall_interval_ms(7), 300);
/// ```
pub fn fall_interval_ms(level: u32) -> u32 {
    LEVEL_INTERVALS_MS
        .iter()
        .find(|&&(l, _)| l == level)
        .map(|&(_, ms)| ms)
        .unwrap_or(DEFAULT_FALL_INTERVAL_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_round_robin() {
        let mut kind = PieceKind::I;
        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(kind);
            kind = kind.next();
        }
        assert_eq!(seen, PieceKind::ALPHABET.to_vec());
        assert_eq!(kind, PieceKind::I);
    }

    #[test]
    fn test_index_matches_alphabet() {
        for (i, kind) in PieceKind::ALPHABET.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(PieceKind::from_index(i), *kind);
        }
        assert_eq!(PieceKind::from_index(7), PieceKind::I);
    }

    #[test]
    fn test_letter_roundtrip() {
        for kind in PieceKind::ALPHABET {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
            assert_eq!(PieceKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(PieceKind::from_str("IO"), None);
        assert_eq!(PieceKind::from_str(""), None);
    }

    #[test]
    fn test_level_table() {
        assert_eq!(fall_interval_ms(1), 1000);
        assert_eq!(fall_interval_ms(2), 600);
        assert_eq!(fall_interval_ms(3), 200);
        assert_eq!(fall_interval_ms(0), DEFAULT_FALL_INTERVAL_MS);
        assert_eq!(fall_interval_ms(4), DEFAULT_FALL_INTERVAL_MS);
    }

    #[test]
    fn test_action_names() {
        for action in [Action::Left, Action::Right, Action::Drop, Action::Rotate] {
            assert_eq!(Action::from_str(action.as_str()), Some(action));
        }
    }
}
