//! Grid tests - placement, validity and line clearing

use session_tetris::core::{Grid, Piece};
use session_tetris::types::{PieceKind, COLS, ROWS};

fn fill_row(grid: &mut Grid, y: i16) {
    for x in 0..COLS as i16 {
        grid.set(x, y, Some(PieceKind::O));
    }
}

#[test]
fn test_grid_new_empty() {
    let grid = Grid::new();
    assert_eq!(grid.width(), COLS);
    assert_eq!(grid.height(), ROWS);

    for y in 0..ROWS as i16 {
        for x in 0..COLS as i16 {
            assert_eq!(grid.get(x, y), Some(None));
        }
    }
}

#[test]
fn test_grid_get_out_of_bounds() {
    let grid = Grid::new();

    assert_eq!(grid.get(-1, 0), None);
    assert_eq!(grid.get(0, -1), None);
    assert_eq!(grid.get(COLS as i16, 0), None);
    assert_eq!(grid.get(0, ROWS as i16), None);
}

#[test]
fn test_grid_set_out_of_bounds() {
    let mut grid = Grid::new();

    assert!(!grid.set(-1, 0, Some(PieceKind::T)));
    assert!(!grid.set(0, ROWS as i16, Some(PieceKind::T)));
    assert_eq!(grid.filled_count(), 0);
}

#[test]
fn test_clear_full_empty_full() {
    // Bottom three rows: full, partial, full
    let mut grid = Grid::new();
    fill_row(&mut grid, 17);
    grid.set(6, 18, Some(PieceKind::T));
    fill_row(&mut grid, 19);

    assert_eq!(grid.clear_full_lines(), 2);

    // The partial row lands at the bottom, everything above is empty
    for x in 0..COLS as i16 {
        let expected = if x == 6 { Some(PieceKind::T) } else { None };
        assert_eq!(grid.get(x, 19), Some(expected));
    }
    assert_eq!(grid.filled_count(), 1);
}

#[test]
fn test_clear_four_lines() {
    let mut grid = Grid::new();
    for y in 16..20 {
        fill_row(&mut grid, y);
    }
    grid.set(0, 15, Some(PieceKind::J));

    assert_eq!(grid.clear_full_lines(), 4);
    assert_eq!(grid.get(0, 19), Some(Some(PieceKind::J)));
    assert_eq!(grid.filled_count(), 1);
}

#[test]
fn test_place_after_validation() {
    let mut grid = Grid::new();
    let mut piece = Piece::new(PieceKind::T);
    piece.y = (ROWS - 2) as i8;

    assert!(grid.is_valid_position(&piece));
    grid.place(&piece);

    assert_eq!(grid.get(4, 18), Some(Some(PieceKind::T)));
    for x in 3..6 {
        assert_eq!(grid.get(x, 19), Some(Some(PieceKind::T)));
    }
    assert!(!grid.is_valid_position(&piece));
}

#[test]
fn test_piece_above_grid_is_valid_over_full_top_row() {
    let mut grid = Grid::new();
    fill_row(&mut grid, 0);

    let mut piece = Piece::new(PieceKind::O);
    piece.y = -2;
    assert!(grid.is_valid_position(&piece));

    piece.y = -1;
    assert!(!grid.is_valid_position(&piece));
}
