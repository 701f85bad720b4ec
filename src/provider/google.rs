use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::modes::TransportMode;
use crate::provider::http::{build_client, get_json, text_at};
use crate::provider::{ProviderError, RouteLeg, RouteProvider};

pub const DEFAULT_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

pub struct GoogleRouteProvider {
    client: Result<Client, String>,
    url: String,
    api_key: Option<String>,
}

impl GoogleRouteProvider {
    pub fn new(url: impl Into<String>, api_key: Option<String>, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs).map_err(|e| e.to_string()),
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl RouteProvider for GoogleRouteProvider {
    fn name(&self) -> &str {
        "google"
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
        let Some(key) = self.api_key.as_deref() else {
            return Err(ProviderError::NotConfigured(
                "directions API key is missing".to_string(),
            ));
        };
        let (status, body) = get_json(
            client,
            &self.url,
            &[
                ("origin", origin),
                ("destination", destination),
                ("mode", mode.as_slug()),
                ("key", key),
            ],
        )
        .await?;
        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message: error_detail(&body),
            });
        }
        debug!("directions lookup for {mode} returned {status}");
        parse_directions_response(&body, mode)
    }
}

pub fn parse_directions_response(body: &Value, mode: TransportMode) -> Result<RouteLeg, ProviderError> {
    let status = body.get("status").and_then(Value::as_str).unwrap_or("");
    let leg = body
        .get("routes")
        .and_then(Value::as_array)
        .and_then(|routes| routes.first())
        .and_then(|route| route.get("legs"))
        .and_then(Value::as_array)
        .and_then(|legs| legs.first());
    let leg = match leg {
        Some(leg) if status == "OK" => leg,
        _ => {
            return Err(ProviderError::NoRoute {
                mode,
                detail: error_detail(body),
            })
        }
    };

    let field = |path: &[&str]| -> Result<String, ProviderError> {
        text_at(leg, path)
            .map(str::to_string)
            .ok_or_else(|| ProviderError::InvalidResponse(format!("missing {}", path.join("."))))
    };
    Ok(RouteLeg {
        distance_text: field(&["distance", "text"])?,
        duration_text: field(&["duration", "text"])?,
        start_address: field(&["start_address"])?,
        end_address: field(&["end_address"])?,
        distance_km: None,
        duration_min: None,
    })
}

fn error_detail(body: &Value) -> String {
    let status = body.get("status").and_then(Value::as_str).unwrap_or("UNKNOWN");
    match body.get("error_message").and_then(Value::as_str) {
        Some(message) => format!("{status}: {message}"),
        None => status.to_string(),
    }
}
