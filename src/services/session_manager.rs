// src/services/session_manager.rs
use std::{collections::HashMap, fmt::Debug, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Per-client statistics, keyed by client IP. Display only.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientSession {
    pub session_id: String,
    pub ip: String,
    pub user_agent: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub message_count: u64,
}

impl ClientSession {
    pub fn new(session_id: impl Into<String>, ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            ip: ip.into(),
            user_agent: user_agent.into(),
            first_seen: now,
            last_seen: now,
            message_count: 0,
        }
    }
}

/// One sighting of a client.
#[derive(Clone, Debug)]
pub struct Visit {
    pub ip: String,
    pub user_agent: String,
    pub session_id: Option<String>,
    /// Whether this visit carried a chat message.
    pub is_message: bool,
}

#[derive(Clone, Default)]
pub struct SessionManager {
    inner: Arc<RwLock<HashMap<String, ClientSession>>>,
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tracked sessions, e.g. with a snapshot loaded from disk.
    pub async fn restore(&self, sessions: Vec<ClientSession>) {
        let mut guard = self.inner.write().await;
        *guard = sessions.into_iter().map(|s| (s.ip.clone(), s)).collect();
    }

    /// Insert or refresh the session for `visit.ip` and return its new value.
    pub async fn upsert(&self, visit: &Visit) -> ClientSession {
        let mut guard = self.inner.write().await;
        let entry = guard.entry(visit.ip.clone()).or_insert_with(|| {
            let id = visit
                .session_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            ClientSession::new(id, visit.ip.clone(), visit.user_agent.clone())
        });
        entry.last_seen = Utc::now();
        if !visit.user_agent.is_empty() {
            entry.user_agent = visit.user_agent.clone();
        }
        if visit.is_message {
            entry.message_count += 1;
        }
        entry.clone()
    }

    pub async fn get(&self, ip: &str) -> Option<ClientSession> {
        let guard = self.inner.read().await;
        guard.get(ip).cloned()
    }

    /// All sessions, most recently seen first.
    pub async fn list(&self) -> Vec<ClientSession> {
        let guard = self.inner.read().await;
        let mut sessions: Vec<ClientSession> = guard.values().cloned().collect();
        sessions.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        sessions
    }

    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
