//! Session operations over detached snapshots
//!
//! These are the stateless entry points a host calls per request: rebuild an
//! engine from the stored snapshot, apply one action, and hand back the
//! snapshot to persist. The returned snapshot is always the one to store,
//! whether or not the action succeeded.

use crate::engine::{EngineError, GameEngine};
use crate::snapshot::GameSnapshot;
use crate::types::Action;

/// Result of applying one action to a stored game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Set when the action was rejected or ended the game
    pub error: Option<EngineError>,
    /// State to persist
    pub snapshot: GameSnapshot,
}

impl ActionOutcome {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Human-readable failure message, if any
    pub fn message(&self) -> Option<String> {
        self.error.map(|e| e.to_string())
    }
}

/// Snapshot of a fresh game at `chosen_level`
pub fn new_game(chosen_level: u32) -> GameSnapshot {
    GameEngine::new(chosen_level).snapshot()
}

/// Apply `action` to the game stored in `snapshot`
pub fn apply_action(snapshot: &GameSnapshot, action: Action) -> ActionOutcome {
    let mut engine = GameEngine::from_snapshot(snapshot);
    let error = engine.apply(action).err();
    ActionOutcome {
        error,
        snapshot: engine.snapshot(),
    }
}

/// Current state as stored, with no action applied
pub fn get_snapshot(snapshot: &GameSnapshot) -> GameSnapshot {
    *snapshot
}

/// Gravity tick: one drop
pub fn tick(snapshot: &GameSnapshot) -> ActionOutcome {
    apply_action(snapshot, Action::Drop)
}
