//! Per-user conversation sessions and the store that holds them.
//!
//! A session is always read, modified as a value, and written back whole.
//! There is no partial-update API.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use stepflow_core::UserId;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::Step;

/// Where a user currently is in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    AwaitingReply,
}

/// Conversation state for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Step name → last reply recorded for it.
    pub accumulated_data: IndexMap<String, String>,
    /// Step the next text reply belongs to. Ignored once `completed`.
    pub awaiting_step: Option<Arc<Step>>,
    pub completed: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            accumulated_data: IndexMap::new(),
            awaiting_step: None,
            completed: true,
        }
    }
}

impl Session {
    /// A fresh interaction waiting for a reply to `step`.
    pub fn awaiting(step: Arc<Step>) -> Self {
        Self {
            accumulated_data: IndexMap::new(),
            awaiting_step: Some(step),
            completed: false,
        }
    }

    pub fn state(&self) -> SessionState {
        match (&self.awaiting_step, self.completed) {
            (Some(_), false) => SessionState::AwaitingReply,
            _ => SessionState::Idle,
        }
    }

    /// The step a text reply should resume, if any.
    pub fn current_step(&self) -> Option<&Arc<Step>> {
        match self.state() {
            SessionState::AwaitingReply => self.awaiting_step.as_ref(),
            SessionState::Idle => None,
        }
    }
}

/// Process-wide mapping from user identity to session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current session, or a fresh completed one if none is stored.
    async fn get(&self, user_id: UserId) -> Session;

    /// Replace the stored session for `user_id`.
    async fn put(&self, user_id: UserId, session: Session);
}

struct StoredSession {
    session: Session,
    touched: Instant,
}

/// In-memory store, optionally expiring sessions that sit idle too long.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<UserId, StoredSession>>,
    idle_timeout: Option<Duration>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions untouched for longer than `timeout` read as fresh.
    pub fn with_idle_timeout(timeout: Duration) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), idle_timeout: Some(timeout) }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop expired sessions to free memory. Returns how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        let Some(timeout) = self.idle_timeout else { return 0 };
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, stored| now.duration_since(stored.touched) < timeout);
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, "Swept expired sessions");
        }
        removed
    }

    fn is_expired(&self, stored: &StoredSession) -> bool {
        self.idle_timeout
            .map(|timeout| stored.touched.elapsed() >= timeout)
            .unwrap_or(false)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: UserId) -> Session {
        let sessions = self.sessions.read().await;
        match sessions.get(&user_id) {
            Some(stored) if self.is_expired(stored) => {
                debug!(user_id, "Session expired; starting fresh");
                Session::default()
            }
            Some(stored) => stored.session.clone(),
            None => Session::default(),
        }
    }

    async fn put(&self, user_id: UserId, session: Session) {
        let stored = StoredSession { session, touched: Instant::now() };
        self.sessions.write().await.insert(user_id, stored);
    }
}
