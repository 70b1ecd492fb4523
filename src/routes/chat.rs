use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use std::time::Duration;
use uuid::Uuid;

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse, ConnectRequest, RenderRequest, RenderResponse},
    services::{
        activity_log::{Action, ClientInfo},
        markdown,
        session_manager::ClientSession,
    },
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    client: ClientInfo,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatResponse>), AppError> {
    let Json(payload) = payload?;
    let message = payload
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(AppError::missing_message)?;

    let outcome = state.webhook.dispatch(&message).await;

    state.metrics.record_outcome(outcome.label()).await;
    state.activity.spawn_record(
        client,
        Action::Message,
        payload.session_id,
        Some(message),
        Some(outcome.reply.clone()),
    );

    Ok((outcome.status, Json(ChatResponse { reply: outcome.reply })))
}

pub async fn render_handler(Json(payload): Json<RenderRequest>) -> Json<RenderResponse> {
    Json(RenderResponse {
        html: markdown::render(&payload.text),
    })
}

const CONNECT_LOG_WAIT: Duration = Duration::from_secs(2);

// The body is optional; anything unparseable is treated as empty.
pub async fn connect_handler(
    State(state): State<SharedState>,
    client: ClientInfo,
    body: Bytes,
) -> Json<ClientSession> {
    let request: ConnectRequest = serde_json::from_slice(&body).unwrap_or_default();

    let session = tokio::time::timeout(
        CONNECT_LOG_WAIT,
        state
            .activity
            .record(&client, Action::Connect, request.session_id.as_deref(), None, None),
    )
    .await
    .unwrap_or_else(|_| {
        tracing::warn!(ip = %client.ip, "activity store too slow, answering connect without it");
        None
    });

    Json(session.unwrap_or_else(|| {
        let id = request
            .session_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        ClientSession::new(id, client.ip, client.user_agent)
    }))
}
