//! Per-session conversation memory.
//!
//! The [`SessionStore`] trait is the memory contract used by the assistant:
//! sessions are created lazily, hold at most `max_turns` turns (oldest
//! dropped first), and are removed only by an explicit [`clear`].
//!
//! [`InMemorySessionStore`] keeps every session in one `HashMap` behind a
//! single `Mutex`, so concurrent requests for the same session id cannot
//! lose updates during truncation.
//!
//! [`clear`]: SessionStore::clear

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Default number of turns retained per session.
pub const MAX_HISTORY_TURNS: usize = 10;

/// One exchange: the user's message and the assistant's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

/// Summary of one session, as returned by `GET /session_info/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub message_count: usize,
    pub exchange_count: usize,
    pub active: bool,
}

/// Totals across all resident sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MemoryStats {
    pub active_sessions: usize,
    pub total_messages: usize,
}

/// Bounded, keyed conversation history.
pub trait SessionStore: Send + Sync {
    /// History of `session_id`, oldest first. Creates an empty session on
    /// first reference.
    fn get_history(&self, session_id: &str) -> Vec<Turn>;

    /// Append a turn, then drop the oldest turns beyond the bound.
    fn add_turn(&self, session_id: &str, user: &str, assistant: &str);

    /// Remove a session. Returns `false` if it did not exist.
    fn clear(&self, session_id: &str) -> bool;

    /// Describe a session without creating it.
    fn session_info(&self, session_id: &str) -> SessionInfo;

    fn stats(&self) -> MemoryStats;
}

/// Process-lifetime session map guarded by one mutex.
pub struct InMemorySessionStore {
    max_turns: usize,
    sessions: Mutex<HashMap<String, Vec<Turn>>>,
}

impl InMemorySessionStore {
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns: max_turns.max(1),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Turn>>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(MAX_HISTORY_TURNS)
    }
}

impl SessionStore for InMemorySessionStore {
    fn get_history(&self, session_id: &str) -> Vec<Turn> {
        self.lock()
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    fn add_turn(&self, session_id: &str, user: &str, assistant: &str) {
        let mut sessions = self.lock();
        let history = sessions.entry(session_id.to_string()).or_default();
        history.push(Turn::new(user, assistant));
        if history.len() > self.max_turns {
            let excess = history.len() - self.max_turns;
            history.drain(..excess);
        }
    }

    fn clear(&self, session_id: &str) -> bool {
        self.lock().remove(session_id).is_some()
    }

    fn session_info(&self, session_id: &str) -> SessionInfo {
        let turns = self.lock().get(session_id).map(Vec::len).unwrap_or(0);
        SessionInfo {
            session_id: session_id.to_string(),
            message_count: turns * 2,
            exchange_count: turns,
            active: turns > 0,
        }
    }

    fn stats(&self) -> MemoryStats {
        let sessions = self.lock();
        MemoryStats {
            active_sessions: sessions.len(),
            total_messages: sessions.values().map(|h| h.len() * 2).sum(),
        }
    }
}
