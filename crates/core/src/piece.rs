//! Piece module - tetromino shape table and rotation
//!
//! Every letter is drawn once in a padded 5x5 pattern. A spawned piece carries
//! the square sub-window of that pattern that bounds its minos, so rotating it
//! (transpose of the row-reversed matrix) keeps the piece inside the window.
//! Coordinates are (x, y) offsets from the piece origin, y growing downwards.

use arrayvec::ArrayVec;

use crate::types::{PieceKind, MAX_SHAPE_SIDE, SPAWN_X, SPAWN_Y};

/// Offset of a single occupied cell relative to the piece origin
pub type MinoOffset = (i8, i8);

/// Occupied offsets of a shape, row-major order
pub type MinoList = ArrayVec<MinoOffset, { MAX_SHAPE_SIDE * MAX_SHAPE_SIDE }>;

/// Side of the padded canonical patterns
const PATTERN_SIDE: usize = 5;

/// Canonical patterns, one per letter
fn pattern(kind: PieceKind) -> [&'static str; PATTERN_SIDE] {
    match kind {
        PieceKind::I => [".....", "..I..", "..I..", "..I..", "..I.."],
        PieceKind::O => [".....", "..OO.", "..OO.", ".....", "....."],
        PieceKind::T => [".....", "..T..", ".TTT.", ".....", "....."],
        PieceKind::S => [".....", "..SS.", ".SS..", ".....", "....."],
        PieceKind::Z => [".....", ".ZZ..", "..ZZ.", ".....", "....."],
        PieceKind::L => [".....", "..L..", "..L..", "..LL.", "....."],
        PieceKind::J => [".....", "..J..", "..J..", ".JJ..", "....."],
    }
}

/// Rectangular occupancy matrix of a piece
///
/// Stored inline (no heap). Cells outside `width x height` are always empty,
/// so derived equality and hashing compare only the visible matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    width: u8,
    height: u8,
    cells: [[bool; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE],
}

impl Shape {
    /// Spawn matrix for a piece letter
    ///
    /// Takes the square window anchored at the top-left of the pattern's
    /// occupied bounding box, sized by the box's larger side.
    ///
    /// This is not a fixed crop of the pattern: every spawn matrix starts at
    /// its first occupied row and column, so the I spawns on rows 0-3 (not
    /// 1-4) and no letter loses cells to the window edge.
    pub fn canonical(kind: PieceKind) -> Self {
        let rows = pattern(kind);
        let occupied = |r: usize, c: usize| -> bool {
            rows.get(r)
                .and_then(|row| row.as_bytes().get(c))
                .map(|&b| b != b'.')
                .unwrap_or(false)
        };

        let (mut top, mut left) = (PATTERN_SIDE, PATTERN_SIDE);
        let (mut bottom, mut right) = (0, 0);
        for r in 0..PATTERN_SIDE {
            for c in 0..PATTERN_SIDE {
                if occupied(r, c) {
                    top = top.min(r);
                    left = left.min(c);
                    bottom = bottom.max(r);
                    right = right.max(c);
                }
            }
        }

        let side = (bottom - top + 1).max(right - left + 1);
        let mut cells = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (r, row) in cells.iter_mut().enumerate().take(side) {
            for (c, cell) in row.iter_mut().enumerate().take(side) {
                *cell = occupied(top + r, left + c);
            }
        }

        Self {
            width: side as u8,
            height: side as u8,
            cells,
        }
    }

    /// Build from explicit rows
    ///
    /// Returns None if the matrix is empty, ragged, or larger than
    /// `MAX_SHAPE_SIDE` in either dimension.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if height == 0 || width == 0 || height > MAX_SHAPE_SIDE || width > MAX_SHAPE_SIDE {
            return None;
        }

        let mut cells = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return None;
            }
            cells[r][..width].copy_from_slice(row);
        }

        Some(Self {
            width: width as u8,
            height: height as u8,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    /// Occupancy at (row, col); false outside the matrix
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.height() && col < self.width() && self.cells[row][col]
    }

    /// Iterate the rows of the matrix
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.cells[..self.height()]
            .iter()
            .map(move |row| &row[..self.width()])
    }

    /// Matrix rotated 90° clockwise (transpose of the row-reversed matrix)
    pub fn rotated_cw(&self) -> Self {
        let (h, w) = (self.height(), self.width());
        let mut cells = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (r, row) in cells.iter_mut().enumerate().take(w) {
            for (c, cell) in row.iter_mut().enumerate().take(h) {
                *cell = self.cells[h - 1 - c][r];
            }
        }

        Self {
            width: self.height,
            height: self.width,
            cells,
        }
    }

    /// Offsets (dx, dy) of every occupied cell
    pub fn minos(&self) -> MinoList {
        let mut out = MinoList::new();
        for (r, row) in self.rows().enumerate() {
            for (c, &filled) in row.iter().enumerate() {
                if filled {
                    out.push((c as i8, r as i8));
                }
            }
        }
        out
    }
}

/// The falling piece: letter, current matrix and origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl Piece {
    /// Create a new piece at the spawn position
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: Shape::canonical(kind),
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }

    /// Rotate the matrix clockwise in place (no bounds check)
    pub fn rotate(&mut self) {
        self.shape = self.shape.rotated_cw();
    }

    /// Translate the origin (no bounds check)
    ///
    /// Saturates at the i8 limits; such origins are never valid positions.
    pub fn move_by(&mut self, dx: i8, dy: i8) {
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
    }

    /// Copy of this piece translated by (dx, dy)
    pub fn moved(&self, dx: i8, dy: i8) -> Self {
        let mut p = *self;
        p.move_by(dx, dy);
        p
    }

    /// Copy of this piece rotated clockwise
    pub fn rotated(&self) -> Self {
        let mut p = *self;
        p.rotate();
        p
    }

    /// Absolute grid coordinates (x, y) of every occupied cell
    ///
    /// Computed in i16 so origins near the i8 limits cannot overflow.
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16)> {
        let (x, y) = (self.x as i16, self.y as i16);
        self.shape
            .minos()
            .into_iter()
            .map(move |(dx, dy)| (x + dx as i16, y + dy as i16))
    }
}
