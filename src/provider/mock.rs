use async_trait::async_trait;

use crate::modes::TransportMode;
use crate::provider::{ProviderError, RouteLeg, RouteProvider};
use crate::units::{format_distance, format_duration};

#[derive(Debug, Clone, Copy)]
pub struct MockRouteProvider {
    distance_km: f64,
}

impl MockRouteProvider {
    pub fn new(distance_km: f64) -> Self {
        Self { distance_km }
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn exact_minutes(&self, mode: TransportMode) -> f64 {
        self.distance_km.max(0.0) / mode.profile().mock_speed_kmh * 60.0
    }

    pub fn estimate_minutes(&self, mode: TransportMode) -> u32 {
        self.exact_minutes(mode).round() as u32
    }
}

#[async_trait]
impl RouteProvider for MockRouteProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_route(
        &self,
        origin: &str,
        destination: &str,
        mode: TransportMode,
    ) -> Result<RouteLeg, ProviderError> {
        if !self.distance_km.is_finite() || self.distance_km <= 0.0 {
            return Err(ProviderError::NoRoute {
                mode,
                detail: "mock distance must be greater than zero".to_string(),
            });
        }
        Ok(RouteLeg {
            distance_text: format_distance(self.distance_km),
            duration_text: format_duration(self.estimate_minutes(mode)),
            start_address: origin.to_string(),
            end_address: destination.to_string(),
            distance_km: Some(self.distance_km),
            duration_min: Some(self.exact_minutes(mode)),
        })
    }
}
