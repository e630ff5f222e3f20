//! `/chat/completions` request helper.

use crate::error::ApiError;
use crate::types::{ChatRequest, ChatResponse};

/// Send one request and parse the response payload.
pub(super) async fn request(
    http: &reqwest::Client,
    base_url: &str,
    request: &ChatRequest,
    api_key: &str,
) -> Result<ChatResponse, ApiError> {
    let url = format!("{base_url}/chat/completions");
    let mut req = http.post(&url).json(request);
    if !api_key.trim().is_empty() {
        req = req.bearer_auth(api_key.trim());
    }

    let response = req.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            code: status.as_u16(),
            body,
        });
    }

    let parsed = response.json::<ChatResponse>().await?;
    if parsed.choices.is_empty() {
        return Err(ApiError::InvalidResponse(
            "response contained no choices".to_string(),
        ));
    }
    Ok(parsed)
}
