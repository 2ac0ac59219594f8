//! Grid module - the 20x10 playfield
//!
//! Each cell is empty or holds the letter of the piece that locked there.
//! Uses a flat array for cache locality and zero allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom).
//! Pieces may extend above row 0 while spawning or rotating; those cells are
//! never checked against the grid.

use crate::piece::Piece;
use crate::types::{Cell, COLS, ROWS};

/// Total number of cells on the grid
const GRID_SIZE: usize = COLS * ROWS;

/// The playfield - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    /// Flat array of cells, row-major order (y * COLS + x)
    cells: [Cell; GRID_SIZE],
}

impl Grid {
    /// Create a new empty grid
    pub fn new() -> Self {
        Self {
            cells: [None; GRID_SIZE],
        }
    }

    /// Build a grid from row-major rows
    pub fn from_rows(rows: &[[Cell; COLS]; ROWS]) -> Self {
        let mut grid = Self::new();
        for (y, row) in rows.iter().enumerate() {
            grid.cells[y * COLS..(y + 1) * COLS].copy_from_slice(row);
        }
        grid
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i16, y: i16) -> Option<usize> {
        if x < 0 || x >= COLS as i16 || y < 0 || y >= ROWS as i16 {
            return None;
        }
        Some((y as usize) * COLS + (x as usize))
    }

    pub fn width(&self) -> usize {
        COLS
    }

    pub fn height(&self) -> usize {
        ROWS
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i16, y: i16) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i16, y: i16, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i16, y: i16) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check whether every cell of `piece` may sit where it is
    ///
    /// A cell must be inside the column range and above the floor. Cells with
    /// a negative row are accepted unconditionally; only cells already inside
    /// the visible grid are tested for collisions.
    pub fn is_valid_position(&self, piece: &Piece) -> bool {
        piece.cells().all(|(x, y)| {
            if x < 0 || x >= COLS as i16 || y >= ROWS as i16 {
                return false;
            }
            y < 0 || !self.is_occupied(x, y)
        })
    }

    /// Write the piece letter into every cell it covers
    ///
    /// The caller must have validated the position. Cells outside the grid
    /// are skipped.
    pub fn place(&mut self, piece: &Piece) {
        for (x, y) in piece.cells() {
            self.set(x, y, Some(piece.kind));
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= ROWS {
            return false;
        }
        let start = y * COLS;
        self.cells[start..start + COLS].iter().all(|cell| cell.is_some())
    }

    /// Remove every full row in one pass and return how many were removed
    ///
    /// Rows above a cleared row shift down; empty rows fill the top.
    /// Two-pointer compaction from the bottom, no allocation.
    pub fn clear_full_lines(&mut self) -> usize {
        let mut cleared = 0;
        let mut write_y = ROWS;

        for read_y in (0..ROWS).rev() {
            if self.is_row_full(read_y) {
                cleared += 1;
            } else {
                write_y -= 1;
                if write_y != read_y {
                    // copy_within handles the overlap
                    let src_start = read_y * COLS;
                    self.cells
                        .copy_within(src_start..src_start + COLS, write_y * COLS);
                }
            }
        }

        for cell in &mut self.cells[..write_y * COLS] {
            *cell = None;
        }

        cleared
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks_exact(COLS)
    }

    /// Copy the grid into a row-major array
    pub fn write_rows(&self, out: &mut [[Cell; COLS]; ROWS]) {
        for (dst, src) in out.iter_mut().zip(self.rows()) {
            dst.copy_from_slice(src);
        }
    }

    /// Number of occupied cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
