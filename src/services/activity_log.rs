//! Best-effort activity logging.
//!
//! `ActivityLogger` is created once at startup and shared through `AppState`.
//! Every write goes through [`ActivityLogger::record`], which never fails:
//! store errors are logged and dropped so they cannot reach a chat response.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::session_manager::{ClientSession, SessionManager, Visit};

const ACTIVITY_FILE: &str = "activity.jsonl";
const SESSIONS_FILE: &str = "sessions.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("activity store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("activity store encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("activity store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Connect,
    Message,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Connect => "connect",
            Action::Message => "message",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub ip: String,
    pub user_agent: String,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Who is talking to us, as far as the request tells.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: String,
}

/// Storage backend for activity records and client sessions.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn append(&self, record: &ActivityRecord) -> Result<(), StoreError>;

    async fn upsert_session(&self, visit: &Visit) -> Result<ClientSession, StoreError>;

    /// Most recent records, newest last.
    async fn recent(&self, limit: usize) -> Result<Vec<ActivityRecord>, StoreError>;

    async fn sessions(&self) -> Result<Vec<ClientSession>, StoreError>;
}

/// JSON-lines activity log plus a sessions snapshot, both under one directory.
pub struct FileStore {
    activity_path: PathBuf,
    sessions_path: PathBuf,
    sessions: SessionManager,
    // Serializes file writes so appended lines and snapshots never interleave.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;

        let store = Self {
            activity_path: dir.join(ACTIVITY_FILE),
            sessions_path: dir.join(SESSIONS_FILE),
            sessions: SessionManager::new(),
            write_lock: Mutex::new(()),
        };

        match fs::read_to_string(&store.sessions_path).await {
            Ok(content) if !content.trim().is_empty() => {
                let saved: Vec<ClientSession> = serde_json::from_str(&content)?;
                tracing::debug!(count = saved.len(), "restored client sessions");
                store.sessions.restore(saved).await;
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(store)
    }
}

#[async_trait]
impl ActivitySink for FileStore {
    async fn append(&self, record: &ActivityRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.activity_path)
            .await?;
        file.write_all(&line).await?;
        Ok(())
    }

    async fn upsert_session(&self, visit: &Visit) -> Result<ClientSession, StoreError> {
        let session = self.sessions.upsert(visit).await;

        let _guard = self.write_lock.lock().await;
        let snapshot = serde_json::to_vec_pretty(&self.sessions.list().await)?;
        fs::write(&self.sessions_path, snapshot).await?;
        Ok(session)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ActivityRecord>, StoreError> {
        let content = match fs::read_to_string(&self.activity_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let records: Vec<ActivityRecord> = content
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();
        let skip = records.len().saturating_sub(limit);
        Ok(records.into_iter().skip(skip).collect())
    }

    async fn sessions(&self) -> Result<Vec<ClientSession>, StoreError> {
        Ok(self.sessions.list().await)
    }
}

/// Handle to the optional activity store.
#[derive(Clone, Default)]
pub struct ActivityLogger {
    sink: Option<Arc<dyn ActivitySink>>,
}

impl ActivityLogger {
    /// A logger that drops everything.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn with_sink(sink: Arc<dyn ActivitySink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Open the store configured at `log_dir`. Any problem leaves logging
    /// disabled instead of failing startup.
    pub async fn connect(log_dir: Option<&Path>) -> Self {
        let Some(dir) = log_dir else {
            tracing::warn!("LOG_DIR not set - activity logging disabled");
            return Self::disabled();
        };

        match FileStore::open(dir).await {
            Ok(store) => {
                tracing::info!(dir = %dir.display(), "activity store opened");
                Self::with_sink(Arc::new(store))
            }
            Err(e) => {
                tracing::error!(dir = %dir.display(), error = %e, "activity store unavailable - logging disabled");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Append an activity record and upsert the client session. Errors are
    /// logged and swallowed. Returns the updated session when the store
    /// accepted it.
    pub async fn record(
        &self,
        client: &ClientInfo,
        action: Action,
        session_id: Option<&str>,
        message: Option<&str>,
        response: Option<&str>,
    ) -> Option<ClientSession> {
        let sink = self.sink.as_ref()?;

        let visit = Visit {
            ip: client.ip.clone(),
            user_agent: client.user_agent.clone(),
            session_id: session_id.map(str::to_string),
            is_message: action == Action::Message,
        };
        let session = match sink.upsert_session(&visit).await {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, ip = %client.ip, "failed to update client session");
                None
            }
        };

        let record = ActivityRecord {
            ip: client.ip.clone(),
            user_agent: client.user_agent.clone(),
            action,
            message: message.map(str::to_string),
            response: response.map(str::to_string),
            session_id: session_id
                .map(str::to_string)
                .or_else(|| session.as_ref().map(|s| s.session_id.clone()))
                .unwrap_or_default(),
            timestamp: Utc::now(),
        };
        if let Err(e) = sink.append(&record).await {
            tracing::warn!(error = %e, action = action.as_str(), "failed to append activity record");
        }

        session
    }

    /// Run [`record`](Self::record) on a background task so the caller never
    /// waits on the store. Returns `None` when logging is disabled.
    pub fn spawn_record(
        &self,
        client: ClientInfo,
        action: Action,
        session_id: Option<String>,
        message: Option<String>,
        response: Option<String>,
    ) -> Option<JoinHandle<()>> {
        if !self.is_enabled() {
            return None;
        }
        let logger = self.clone();
        Some(tokio::spawn(async move {
            logger
                .record(
                    &client,
                    action,
                    session_id.as_deref(),
                    message.as_deref(),
                    response.as_deref(),
                )
                .await;
        }))
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<ActivityRecord>, StoreError> {
        match &self.sink {
            Some(sink) => sink.recent(limit).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn sessions(&self) -> Result<Vec<ClientSession>, StoreError> {
        match &self.sink {
            Some(sink) => sink.sessions().await,
            None => Ok(Vec::new()),
        }
    }
}
