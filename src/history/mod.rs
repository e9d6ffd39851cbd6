//! Per-session chat history held in process memory.
//!
//! Each session owns its own async mutex. A caller holding a [`SessionGuard`]
//! has exclusive access to that session's turns until the guard is dropped,
//! so read-modify-append sequences for one session never interleave while
//! other sessions proceed independently.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::llm::types::ChatMessage;

type SessionSlot = Arc<Mutex<Vec<ChatMessage>>>;

#[derive(Clone, Default)]
pub struct HistoryStore {
    sessions: Arc<RwLock<HashMap<String, SessionSlot>>>,
    /// Sessions holding at least one exchange.
    populated: Arc<AtomicUsize>,
}

/// Exclusive access to one session's turns.
pub struct SessionGuard {
    turns: OwnedMutexGuard<Vec<ChatMessage>>,
    populated: Arc<AtomicUsize>,
}

impl SessionGuard {
    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    /// Appends a user message and the assistant reply, in that order.
    pub fn append_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        if self.turns.is_empty() {
            self.populated.fetch_add(1, Ordering::Relaxed);
        }
        self.turns.push(ChatMessage::user(user));
        self.turns.push(ChatMessage::assistant(assistant));
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the session, creating an empty history on first use.
    pub async fn lock(&self, session_id: &str) -> SessionGuard {
        let slot = self.slot(session_id).await;
        SessionGuard {
            turns: slot.lock_owned().await,
            populated: self.populated.clone(),
        }
    }

    /// Snapshot of a session's turns; empty for unknown sessions.
    pub async fn get_history(&self, session_id: &str) -> Vec<ChatMessage> {
        let slot = self.sessions.read().await.get(session_id).cloned();
        match slot {
            Some(slot) => slot.lock().await.clone(),
            None => Vec::new(),
        }
    }

    /// Number of sessions with at least one exchange.
    pub fn session_count(&self) -> usize {
        self.populated.load(Ordering::Relaxed)
    }

    /// Drops the session's slot if it never received an exchange and nobody
    /// else holds or waits on it.
    pub async fn discard_if_empty(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        let Some(slot) = sessions.get(session_id) else {
            return;
        };
        if Arc::strong_count(slot) > 1 {
            return;
        }
        let empty = slot.try_lock().map(|turns| turns.is_empty()).unwrap_or(false);
        if empty {
            sessions.remove(session_id);
            tracing::debug!("Discarded empty history for session {}", session_id);
        }
    }

    #[cfg(test)]
    async fn slot_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn slot(&self, session_id: &str) -> SessionSlot {
        if let Some(slot) = self.sessions.read().await.get(session_id) {
            return slot.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!("Created history for session {}", session_id);
                Arc::new(Mutex::new(Vec::new()))
            })
            .clone()
    }
}
