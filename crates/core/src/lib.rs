//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds every game rule and all state transitions. It has no
//! dependencies on networking, storage or serialization, so the same engine
//! runs behind the session server, in tests and in benchmarks.
//!
//! # Module Structure
//!
//! - [`grid`]: 10x20 playfield with collision checks and line clearing
//! - [`piece`]: Letter shapes and clockwise matrix rotation
//! - [`engine`]: The mutable game: moves, drops, locking, spawning, game over
//! - [`scoring`]: Line points and level progression
//! - [`snapshot`]: Plain-data copy of a game for persistence
//! - [`session`]: Stateless snapshot-in/snapshot-out operations for hosts
//!
//! # Game Rules
//!
//! - **Round-robin spawning**: Pieces come in the fixed order I, O, T, S, Z, L, J
//! - **Plain rotation**: 90° clockwise matrix rotation, no wall kicks
//! - **Gravity by request**: A drop moves the piece one row or locks it
//! - **Scoring**: 100 points per cleared line
//! - **Levels**: One level per 10 lines, from the chosen level up to 3
//!
//! # Example
//!
//! ```
//! use session_tetris_core::{session, types::{Action, PieceKind}};
//!
//! let snap = session::new_game(1);
//! assert_eq!(snap.piece.kind, PieceKind::I);
//!
//! let outcome = session::apply_action(&snap, Action::Right);
//! assert!(outcome.success());
//! assert_eq!(outcome.snapshot.piece.x, 4);
//!
//! // Failed moves keep the state
//! let mut wall = snap;
//! wall.piece.x = 0;
//! let outcome = session::apply_action(&wall, Action::Left);
//! assert!(!outcome.success());
//! assert_eq!(outcome.snapshot, wall);
//! ```

pub mod engine;
pub mod grid;
pub mod piece;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use session_tetris_types as types;

// Re-export commonly used types for convenience
pub use engine::{DropOutcome, EngineError, GameEngine, GameOverCause, LockEvent, Move};
pub use grid::Grid;
pub use piece::{Piece, Shape};
pub use scoring::{level_for, line_clear_points, progression};
pub use session::{apply_action, get_snapshot, new_game, tick, ActionOutcome};
pub use snapshot::{GameSnapshot, PieceSnapshot};
