use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::modes::TransportMode;
use crate::provider::http::{build_client, get_json};
use crate::provider::{ProviderError, RouteLeg, RouteProvider};

pub struct ProxyRouteProvider {
    client: Result<Client, String>,
    base_url: String,
}

impl ProxyRouteProvider {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs).map_err(|e| e.to_string()),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/directions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RouteProvider for ProxyRouteProvider {
    fn name(&self) -> &str {
        "proxy"
    }

    async fn fetch_route(
        &self,
        origin: &str,
        destination: &str,
        mode: TransportMode,
    ) -> Result<RouteLeg, ProviderError> {
        let client = self
            .client
            .as_ref()
            .map_err(|e| ProviderError::NotConfigured(e.clone()))?;
        let (status, body) = get_json(
            client,
            &self.endpoint(),
            &[
                ("origin", origin),
                ("destination", destination),
                ("mode", mode.as_slug()),
            ],
        )
        .await?;
        parse_proxy_response(status, body, mode)
    }
}

pub fn parse_proxy_response(
    status: StatusCode,
    body: Value,
    mode: TransportMode,
) -> Result<RouteLeg, ProviderError> {
    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("route lookup failed")
            .to_string();
        if status == StatusCode::BAD_REQUEST {
            return Err(ProviderError::NoRoute {
                mode,
                detail: message,
            });
        }
        return Err(ProviderError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    serde_json::from_value(body).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}
