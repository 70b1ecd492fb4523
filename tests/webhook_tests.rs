mod common;

use std::time::{Duration, Instant};

use n8n_chat_relay::services::normalizer::EMPTY_RESPONSE_NOTICE;
use n8n_chat_relay::services::webhook::{
    TIMEOUT_REPLY, UNREACHABLE_REPLY, WebhookClient, WebhookError,
};
use reqwest::StatusCode;

fn client(url: String) -> WebhookClient {
    WebhookClient::new(url, Duration::from_secs(30)).unwrap()
}

#[tokio::test]
async fn reply_shapes_are_normalized() {
    let base = common::spawn_fake_n8n().await;

    let cases = [
        ("array", "hi"),
        ("object", "ok"),
        ("plain", "plain text"),
        ("empty", EMPTY_RESPONSE_NOTICE),
    ];
    for (path, expected) in cases {
        let outcome = client(format!("{base}/{path}")).dispatch("hello").await;
        assert_eq!(outcome.status, StatusCode::OK, "path {path}");
        assert_eq!(outcome.reply, expected, "path {path}");
    }

    let outcome = client(format!("{base}/unknown")).dispatch("hello").await;
    assert_eq!(outcome.status, StatusCode::OK);
    assert!(outcome.reply.contains("\"foo\""));
    assert!(outcome.reply.contains("\"bar\""));
}

#[tokio::test]
async fn message_reaches_webhook_intact() {
    let base = common::spawn_fake_n8n().await;
    let text = "what's 2 + 2? & why (really)";

    let outcome = client(format!("{base}/echo")).dispatch(text).await;

    assert_eq!(outcome.status, StatusCode::OK);
    assert_eq!(outcome.reply, text);
}

#[tokio::test]
async fn non_success_status_is_a_failure() {
    let base = common::spawn_fake_n8n().await;

    let err = client(format!("{base}/fail"))
        .fetch_reply("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, WebhookError::Status(StatusCode::INTERNAL_SERVER_ERROR)));

    let outcome = client(format!("{base}/fail")).dispatch("hello").await;
    assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        outcome.reply,
        "[ERROR] Failed to process message: n8n webhook returned 500"
    );
}

#[tokio::test]
async fn unreachable_webhook_yields_503() {
    let outcome = client(common::unreachable_url()).dispatch("hello").await;

    assert_eq!(outcome.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(outcome.reply, UNREACHABLE_REPLY);
}

#[tokio::test]
async fn short_timeout_yields_504() {
    let base = common::spawn_fake_n8n().await;
    let webhook = WebhookClient::new(format!("{base}/slow"), Duration::from_millis(200)).unwrap();

    let started = Instant::now();
    let outcome = webhook.dispatch("hello").await;

    assert_eq!(outcome.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(outcome.reply, TIMEOUT_REPLY);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn default_timeout_is_thirty_seconds() {
    let base = common::spawn_fake_n8n().await;
    let webhook = client(format!("{base}/slow"));

    let started = Instant::now();
    let outcome = tokio::time::timeout(Duration::from_secs(35), webhook.dispatch("hello"))
        .await
        .expect("dispatch should give up on its own");

    assert_eq!(outcome.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(outcome.reply, TIMEOUT_REPLY);
    assert!(started.elapsed() >= Duration::from_secs(30));
}
