use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use super::client::AdminGuard;
use crate::{
    error::AppError,
    services::{
        activity_log::ActivityRecord, metrics_manager::MetricsData, session_manager::ClientSession,
    },
    state::SharedState,
};

const DEFAULT_ACTIVITY_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

pub async fn get_activity_handler(
    _admin: AdminGuard,
    State(state): State<SharedState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityRecord>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    let records = state
        .activity
        .recent(limit)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(records))
}

pub async fn get_sessions_handler(
    _admin: AdminGuard,
    State(state): State<SharedState>,
) -> Result<Json<Vec<ClientSession>>, AppError> {
    let sessions = state
        .activity
        .sessions()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(sessions))
}

pub async fn get_metrics_handler(
    _admin: AdminGuard,
    State(state): State<SharedState>,
) -> Json<MetricsData> {
    Json(state.metrics.get_metrics().await)
}
