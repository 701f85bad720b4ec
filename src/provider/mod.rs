pub mod google;
pub mod http;
pub mod mock;
pub mod proxy;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Config, ProviderKind};
use crate::metrics::RouteQuote;
use crate::modes::TransportMode;
use crate::provider::google::GoogleRouteProvider;
use crate::provider::mock::MockRouteProvider;
use crate::provider::proxy::ProxyRouteProvider;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub distance_text: String,
    pub duration_text: String,
    pub start_address: String,
    pub end_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<f64>,
}

impl RouteLeg {
    /// Prefers the exact figures and falls back to parsing the display text.
    pub fn quote(&self, mode: TransportMode) -> RouteQuote {
        let parsed = RouteQuote::from_text(mode, &self.distance_text, &self.duration_text);
        RouteQuote {
            mode,
            distance_km: self.distance_km.unwrap_or(parsed.distance_km),
            duration_min: self.duration_min.unwrap_or(parsed.duration_min),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("No route found for {mode}: {detail}")]
    NoRoute { mode: TransportMode, detail: String },
    #[error("route provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("route provider request failed: {0}")]
    Transport(String),
    #[error("route provider returned an unexpected payload: {0}")]
    InvalidResponse(String),
    #[error("route provider is not configured: {0}")]
    NotConfigured(String),
}

#[async_trait]
pub trait RouteProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_route(
        &self,
        origin: &str,
        destination: &str,
        mode: TransportMode,
    ) -> Result<RouteLeg, ProviderError>;
}

pub fn provider_from_config(
    config: &Config,
    mock_distance_km: Option<f64>,
) -> Arc<dyn RouteProvider> {
    if let Some(km) = mock_distance_km {
        return Arc::new(MockRouteProvider::new(km));
    }
    match config.provider.kind {
        ProviderKind::Mock => Arc::new(MockRouteProvider::new(config.provider.mock_distance_km)),
        ProviderKind::Proxy => Arc::new(ProxyRouteProvider::new(
            config.provider.endpoint(),
            config.provider.timeout_secs,
        )),
        ProviderKind::Google => Arc::new(GoogleRouteProvider::new(
            config.provider.endpoint(),
            config.resolved_api_key(),
            config.provider.timeout_secs,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_mock_distance_overrides_configured_kind() {
        let mut config = Config::default();
        config.provider.kind = ProviderKind::Google;
        assert_eq!(provider_from_config(&config, Some(3.0)).name(), "mock");
        assert_eq!(provider_from_config(&config, None).name(), "google");
    }

    #[test]
    fn quote_prefers_exact_figures_over_text() {
        let mut leg = RouteLeg {
            distance_text: "12.3 km".to_string(),
            duration_text: "49 mins".to_string(),
            start_address: "A".to_string(),
            end_address: "B".to_string(),
            distance_km: None,
            duration_min: None,
        };
        let parsed = leg.quote(TransportMode::Bicycling);
        assert_eq!(parsed.distance_km, 12.3);
        assert_eq!(parsed.duration_min, 49.0);

        leg.distance_km = Some(12.34);
        leg.duration_min = Some(49.36);
        let exact = leg.quote(TransportMode::Bicycling);
        assert_eq!(exact.distance_km, 12.34);
        assert_eq!(exact.duration_min, 49.36);

        let wire = serde_json::to_value(&leg).unwrap();
        assert_eq!(wire["distanceKm"], 12.34);
    }

    #[test]
    fn no_route_message_names_the_mode() {
        let err = ProviderError::NoRoute {
            mode: TransportMode::Transit,
            detail: "ZERO_RESULTS".to_string(),
        };
        assert_eq!(err.to_string(), "No route found for Bus: ZERO_RESULTS");
    }
}
