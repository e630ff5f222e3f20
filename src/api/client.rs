//! [`ApiClient`]: reqwest transport with bounded retry.

use super::retry::RetryPolicy;
use super::{completions, ModelClient};
use crate::config::ModelConfig;
use crate::error::ApiError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Client for OpenAI-compatible chat-completions APIs.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry_policy: RetryPolicy,
}

impl ApiClient {
    pub fn new(config: &ModelConfig) -> Self {
        Self::with_retry_policy(config, RetryPolicy::default())
    }

    fn with_retry_policy(config: &ModelConfig, retry_policy: RetryPolicy) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        // Fall back to reqwest defaults if the builder fails.
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            retry_policy,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let mut attempt: u32 = 0;
        loop {
            match completions::request(&self.http, &self.base_url, request, &self.api_key).await {
                Ok(response) => return Ok(response),
                Err(err) if self.retry_policy.should_retry(&err, attempt) => {
                    let delay = self.retry_policy.delay_for(attempt);
                    warn!(error = %err, attempt, ?delay, "model request failed; retrying");
                    attempt = attempt.saturating_add(1);
                    sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl ModelClient for ApiClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        ApiClient::chat(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn request() -> ChatRequest {
        ChatRequest {
            model: "dummy-model".to_string(),
            messages: vec![Message::user("hello")],
            tools: None,
            temperature: None,
            max_tokens: None,
        }
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[tokio::test]
    async fn retries_transient_429_then_succeeds() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let _server = tokio::spawn(async move {
            for attempt in 0..2 {
                let (mut stream, _) = listener.accept().await.expect("accept");
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let reply = if attempt == 0 {
                    http_response("429 Too Many Requests", r#"{"error":"rate"}"#)
                } else {
                    http_response(
                        "200 OK",
                        r#"{"id":"ok","choices":[{"index":0,"message":{"role":"assistant","content":"done"},"finish_reason":"stop"}]}"#,
                    )
                };
                let _ = stream.write_all(reply.as_bytes()).await;
            }
        });

        let config = ModelConfig {
            base_url: format!("http://{addr}/"),
            api_key: "test-key".to_string(),
            ..ModelConfig::default()
        };
        let client = ApiClient::with_retry_policy(
            &config,
            RetryPolicy {
                max_attempts: 2,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(5),
            },
        );
        assert_eq!(client.base_url(), format!("http://{addr}"));
        let response = client.chat(&request()).await.expect("retry should recover");
        assert_eq!(response.choices[0].message.text(), "done");
    }

    #[tokio::test]
    async fn non_retryable_status_is_returned_with_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let _server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let reply = http_response("401 Unauthorized", r#"{"error":"bad key"}"#);
            let _ = stream.write_all(reply.as_bytes()).await;
        });

        let config = ModelConfig {
            base_url: format!("http://{addr}"),
            ..ModelConfig::default()
        };
        let err = ApiClient::new(&config)
            .chat(&request())
            .await
            .expect_err("401 expected");
        assert_eq!(err.status_code(), Some(401));
        assert!(err.to_string().contains("bad key"));
    }
}
