//! In-memory session store
//!
//! Maps a session key to the last persisted snapshot. Shared by every
//! connection; a session lives until the process exits or it is removed.
//! Read-modify-write happens under the write lock, so two actions on the same
//! session never lose an update.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::{apply_action, new_game, ActionOutcome, GameSnapshot};
use crate::types::Action;

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, GameSnapshot>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session's game with a fresh one
    pub async fn start(&self, key: &str, level: u32) -> GameSnapshot {
        let snapshot = new_game(level);
        self.sessions
            .write()
            .await
            .insert(key.to_string(), snapshot);
        snapshot
    }

    pub async fn get(&self, key: &str) -> Option<GameSnapshot> {
        self.sessions.read().await.get(key).copied()
    }

    /// Run `f` on the stored snapshot and persist the snapshot it returns
    ///
    /// Returns None when the session has no game.
    pub async fn update<F>(&self, key: &str, f: F) -> Option<ActionOutcome>
    where
        F: FnOnce(&GameSnapshot) -> ActionOutcome,
    {
        let mut sessions = self.sessions.write().await;
        let slot = sessions.get_mut(key)?;
        let outcome = f(slot);
        *slot = outcome.snapshot;
        Some(outcome)
    }

    /// Apply one action to the session's game
    pub async fn apply(&self, key: &str, action: Action) -> Option<ActionOutcome> {
        self.update(key, |snap| apply_action(snap, action)).await
    }

    pub async fn remove(&self, key: &str) -> Option<GameSnapshot> {
        self.sessions.write().await.remove(key)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
