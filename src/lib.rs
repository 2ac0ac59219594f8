//! Session Tetris (workspace facade crate).
//!
//! Re-exports the workspace crates as `session_tetris::{core,adapter,types}`;
//! the implementation lives in dedicated crates under `crates/`.

pub use session_tetris_adapter as adapter;
pub use session_tetris_core as core;
pub use session_tetris_types as types;
