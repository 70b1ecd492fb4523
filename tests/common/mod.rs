#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    routing::get,
};
use serde_json::json;

/// Start a fake n8n webhook on an ephemeral port and return its base URL.
pub async fn spawn_fake_n8n() -> String {
    let app = Router::new()
        .route("/array", get(|| async { r#"[{"text":"hi"}]"# }))
        .route("/object", get(|| async { r#"{"output":"ok"}"# }))
        .route("/unknown", get(|| async { r#"{"foo":"bar"}"# }))
        .route("/empty", get(|| async { "" }))
        .route("/plain", get(|| async { "plain text" }))
        .route(
            "/echo",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({ "reply": params.get("message").cloned().unwrap_or_default() }))
            }),
        )
        .route(
            "/fail",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "workflow crashed") }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(120)).await;
                "too late"
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake n8n");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

/// A URL on a port nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    let port = listener.local_addr().expect("local_addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}/webhook/chat", port)
}

pub fn temp_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("n8n-relay-test-{}", uuid::Uuid::new_v4()))
}
