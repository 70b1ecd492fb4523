//! Outbound n8n webhook call and failure classification.

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;

use super::normalizer::normalize;

/// Characters left alone by JavaScript's `encodeURIComponent`, which is what
/// n8n webhook URLs are usually written against.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const TIMEOUT_REPLY: &str = "[ERROR] Request timeout - n8n webhook took too long to respond.";
pub const UNREACHABLE_REPLY: &str =
    "[ERROR] Cannot connect to n8n. Make sure n8n is running on port 5678.";
pub const FAILURE_PREFIX: &str = "[ERROR] Failed to process message: ";

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("n8n webhook timed out")]
    Timeout,
    #[error("{0}")]
    Unreachable(String),
    #[error("n8n webhook returned {}", .0.as_u16())]
    Status(StatusCode),
    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for WebhookError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WebhookError::Timeout
        } else if err.is_connect() {
            WebhookError::Unreachable(err.to_string())
        } else {
            WebhookError::Request(err.to_string())
        }
    }
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            WebhookError::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            WebhookError::Status(_) | WebhookError::Request(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing reply for this failure.
    pub fn reply(&self) -> String {
        match self {
            WebhookError::Timeout => TIMEOUT_REPLY.to_string(),
            WebhookError::Unreachable(_) => UNREACHABLE_REPLY.to_string(),
            other => format!("{}{}", FAILURE_PREFIX, other),
        }
    }

    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            WebhookError::Timeout => "timeout",
            WebhookError::Unreachable(_) => "unreachable",
            WebhookError::Status(_) | WebhookError::Request(_) => "failed",
        }
    }
}

/// What the chat endpoint sends back: a status and a reply, always both.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub status: StatusCode,
    pub reply: String,
}

impl ChatOutcome {
    pub fn label(&self) -> &'static str {
        match self.status {
            StatusCode::OK => "ok",
            StatusCode::GATEWAY_TIMEOUT => "timeout",
            StatusCode::SERVICE_UNAVAILABLE => "unreachable",
            _ => "failed",
        }
    }
}

/// Append `message` to the webhook base URL as a percent-encoded query parameter.
pub fn build_url(base_url: &str, message: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}message={}",
        base_url,
        separator,
        utf8_percent_encode(message, URI_COMPONENT)
    )
}

#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl WebhookClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            base_url: base_url.into(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call the webhook and classify the result. Never fails.
    pub async fn dispatch(&self, message: &str) -> ChatOutcome {
        match self.fetch_reply(message).await {
            Ok(reply) => ChatOutcome {
                status: StatusCode::OK,
                reply,
            },
            Err(e) => {
                tracing::error!(error = %e, kind = e.label(), "error calling n8n webhook");
                ChatOutcome {
                    status: e.status(),
                    reply: e.reply(),
                }
            }
        }
    }

    /// Fetch and normalize the reply. The timeout covers connect, headers and
    /// body; on expiry the request future is dropped along with its connection.
    pub async fn fetch_reply(&self, message: &str) -> Result<String, WebhookError> {
        let url = build_url(&self.base_url, message);
        tracing::debug!(%url, "forwarding message to n8n");

        let body = tokio::time::timeout(self.timeout, self.fetch_body(&url))
            .await
            .map_err(|_| WebhookError::Timeout)??;
        Ok(normalize(&body))
    }

    async fn fetch_body(&self, url: &str) -> Result<String, WebhookError> {
        let res = self.client.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(WebhookError::Status(status));
        }
        Ok(res.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_percent_encoded_like_uri_component() {
        assert_eq!(
            build_url("http://localhost:5678/webhook/chat", "hello world & more?"),
            "http://localhost:5678/webhook/chat?message=hello%20world%20%26%20more%3F"
        );
        assert_eq!(
            build_url("http://h/w", "a-b_c.d!e~f*g'h(i)"),
            "http://h/w?message=a-b_c.d!e~f*g'h(i)"
        );
        assert_eq!(build_url("http://h/w", "é"), "http://h/w?message=%C3%A9");
    }

    #[test]
    fn existing_query_is_extended() {
        assert_eq!(
            build_url("http://h/w?token=abc", "hi"),
            "http://h/w?token=abc&message=hi"
        );
    }

    #[test]
    fn errors_map_to_status_and_reply() {
        assert_eq!(WebhookError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(WebhookError::Timeout.reply(), TIMEOUT_REPLY);

        let unreachable = WebhookError::Unreachable("refused".into());
        assert_eq!(unreachable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(unreachable.reply(), UNREACHABLE_REPLY);

        let upstream = WebhookError::Status(StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            upstream.reply(),
            "[ERROR] Failed to process message: n8n webhook returned 502"
        );
    }
}
