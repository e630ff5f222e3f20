//! Chat-completions client for OpenAI-compatible endpoints.
//!
//! - `completions`: one `POST /chat/completions` round-trip
//! - `retry`: bounded retry with exponential backoff
//! - `client`: the [`ApiClient`] facade tying them together

use crate::error::ApiError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;

mod client;
mod completions;
mod retry;

pub use client::ApiClient;

/// Minimal model API interface used by the agent loop.
///
/// Tests supply scripted responses through this trait instead of the network.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError>;
}
