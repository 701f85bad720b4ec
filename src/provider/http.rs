use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::provider::ProviderError;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 6;
const BODY_PREVIEW_CHARS: usize = 180;

pub fn build_client(timeout_secs: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .user_agent(concat!("ecosafe/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .build()
        .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {e}")))
}

pub async fn get_json(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<(StatusCode, Value), ProviderError> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| ProviderError::Transport(format!("failed GET request {url}: {e}")))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::Transport(format!("failed reading response body: {e}")))?;
    match serde_json::from_str(&body) {
        Ok(value) => Ok((status, value)),
        Err(_) if !status.is_success() => Err(ProviderError::Rejected {
            status: status.as_u16(),
            message: preview(&body),
        }),
        Err(e) => Err(ProviderError::InvalidResponse(format!(
            "invalid JSON from {url}: {e}"
        ))),
    }
}

pub fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

pub fn text_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = value;
    for segment in path {
        current = current.get(segment)?;
    }
    current.as_str()
}
