use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::impact::{baseline_deltas, compute_impact_with_frequency, BaselineDelta, ImpactSummary};
use crate::metrics::ModeResult;
use crate::modes::{dedupe_modes, TransportMode};
use crate::provider::RouteProvider;
use crate::ranking::{select_best, Preference};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub origin: String,
    pub destination: String,
    pub modes: Vec<TransportMode>,
    #[serde(default)]
    pub preference: Preference,
    #[serde(default = "default_trips_per_week")]
    pub trips_per_week: f64,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ComparisonError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    AllModesFailed(String),
}

impl ComparisonError {
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(m) | Self::AllModesFailed(m) => m,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeFailure {
    pub mode: TransportMode,
    pub message: String,
}

/// At most one result per mode, in request order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonSet {
    results: Vec<ModeResult>,
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, result: ModeResult) {
        match self.results.iter_mut().find(|r| r.mode == result.mode) {
            Some(existing) => *existing = result,
            None => self.results.push(result),
        }
    }

    pub fn results(&self) -> &[ModeResult] {
        &self.results
    }

    pub fn baseline(&self) -> Option<&ModeResult> {
        self.results
            .iter()
            .find(|r| r.mode == TransportMode::Driving)
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}

impl FromIterator<ModeResult> for ComparisonSet {
    fn from_iter<I: IntoIterator<Item = ModeResult>>(iter: I) -> Self {
        let mut set = Self::new();
        for result in iter {
            set.insert(result);
        }
        set
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub origin: String,
    pub destination: String,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
    pub preference: Preference,
    pub set: ComparisonSet,
    pub failures: Vec<ModeFailure>,
    pub best: Option<ModeResult>,
    pub impact: Option<ImpactSummary>,
    pub baseline_deltas: Vec<BaselineDelta>,
}

pub fn validate_request(request: &ComparisonRequest) -> Result<Vec<TransportMode>, ComparisonError> {
    if request.origin.trim().is_empty() || request.destination.trim().is_empty() {
        return Err(ComparisonError::InvalidInput(
            "Please enter both a start and a destination.".to_string(),
        ));
    }
    let modes = dedupe_modes(&request.modes);
    if modes.is_empty() {
        return Err(ComparisonError::InvalidInput(
            "Select at least one transport option.".to_string(),
        ));
    }
    Ok(modes)
}

pub fn validate_mock_distance(distance_km: f64) -> Result<(), ComparisonError> {
    if distance_km.is_finite() && distance_km > 0.0 {
        Ok(())
    } else {
        Err(ComparisonError::InvalidInput(
            "Distance must be a positive number of kilometres.".to_string(),
        ))
    }
}

pub async fn run_comparison(
    provider: &dyn RouteProvider,
    request: &ComparisonRequest,
) -> Result<ComparisonReport, ComparisonError> {
    let modes = validate_request(request)?;
    let origin = request.origin.trim();
    let destination = request.destination.trim();

    let mut set = ComparisonSet::new();
    let mut failures = Vec::new();
    let mut addresses: Option<(String, String)> = None;
    for mode in modes {
        match provider.fetch_route(origin, destination, mode).await {
            Ok(leg) => {
                let result = leg.quote(mode).metrics();
                if !result.available {
                    warn!(
                        "could not parse distance {:?} for {mode}",
                        leg.distance_text
                    );
                }
                set.insert(result);
                addresses.get_or_insert((leg.start_address, leg.end_address));
            }
            Err(err) => {
                warn!("route lookup via {} failed for {mode}: {err}", provider.name());
                failures.push(ModeFailure {
                    mode,
                    message: err.to_string(),
                });
            }
        }
    }

    if set.is_empty() {
        let message = failures
            .first()
            .map(|f| f.message.clone())
            .unwrap_or_else(|| "No route could be computed.".to_string());
        return Err(ComparisonError::AllModesFailed(message));
    }

    let report = build_report(
        origin,
        destination,
        addresses,
        set,
        failures,
        request.preference,
        request.trips_per_week,
    );
    info!(
        "compared {} modes ({} failed), best: {}",
        report.set.len(),
        report.failures.len(),
        report
            .best
            .map(|b| b.mode.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    Ok(report)
}

pub fn build_report(
    origin: &str,
    destination: &str,
    addresses: Option<(String, String)>,
    set: ComparisonSet,
    failures: Vec<ModeFailure>,
    preference: Preference,
    trips_per_week: f64,
) -> ComparisonReport {
    let best = select_best(set.results(), preference).copied();
    let impact = best
        .as_ref()
        .map(|alt| compute_impact_with_frequency(set.baseline(), alt, trips_per_week));
    let deltas = baseline_deltas(set.results());
    let (start_address, end_address) = match addresses {
        Some((start, end)) => (Some(start), Some(end)),
        None => (None, None),
    };
    ComparisonReport {
        origin: origin.to_string(),
        destination: destination.to_string(),
        start_address,
        end_address,
        preference,
        set,
        failures,
        best,
        impact,
        baseline_deltas: deltas,
    }
}

fn default_trips_per_week() -> f64 {
    crate::impact::DEFAULT_TRIPS_PER_WEEK
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::provider::mock::MockRouteProvider;
    use crate::provider::{ProviderError, RouteLeg};

    struct FlakyProvider {
        failing: Vec<TransportMode>,
        distance_text: &'static str,
    }

    #[async_trait]
    impl RouteProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn fetch_route(
            &self,
            origin: &str,
            destination: &str,
            mode: TransportMode,
        ) -> Result<RouteLeg, ProviderError> {
            if self.failing.contains(&mode) {
                return Err(ProviderError::NoRoute {
                    mode,
                    detail: "ZERO_RESULTS".to_string(),
                });
            }
            Ok(RouteLeg {
                distance_text: self.distance_text.to_string(),
                duration_text: "25 mins".to_string(),
                start_address: origin.to_string(),
                end_address: destination.to_string(),
                distance_km: None,
                duration_min: None,
            })
        }
    }

    fn request(modes: Vec<TransportMode>) -> ComparisonRequest {
        ComparisonRequest {
            origin: "Town Hall".to_string(),
            destination: "Beach".to_string(),
            modes,
            preference: Preference::Greenest,
            trips_per_week: 1.0,
        }
    }

    #[tokio::test]
    async fn compares_all_modes_with_mock_distance() {
        let provider = MockRouteProvider::new(5.0);
        let report = run_comparison(&provider, &request(TransportMode::ALL.to_vec()))
            .await
            .unwrap();
        assert_eq!(report.set.len(), 4);
        assert!(report.failures.is_empty());
        let best = report.best.unwrap();
        assert_eq!(best.mode, TransportMode::Bicycling);
        let impact = report.impact.unwrap();
        assert!((impact.co2_saved_kg - 0.855).abs() < 0.01);
        assert!(impact.active_kcal > 0);
        assert_eq!(report.baseline_deltas.len(), 3);
        assert_eq!(report.start_address.as_deref(), Some("Town Hall"));
    }

    #[tokio::test]
    async fn mock_distance_keeps_full_precision() {
        let provider = MockRouteProvider::new(12.34);
        let report = run_comparison(&provider, &request(vec![TransportMode::Driving]))
            .await
            .unwrap();
        let driving = report.set.baseline().copied().unwrap();
        let direct = crate::metrics::compute_metrics(
            TransportMode::Driving,
            12.34,
            provider.exact_minutes(TransportMode::Driving),
        );
        assert_eq!(driving.co2_kg, 2.11);
        assert_eq!(driving, direct);
    }

    #[tokio::test]
    async fn partial_failures_are_reported_per_mode() {
        let provider = FlakyProvider {
            failing: vec![TransportMode::Transit],
            distance_text: "4 km",
        };
        let report = run_comparison(
            &provider,
            &request(vec![TransportMode::Driving, TransportMode::Transit, TransportMode::Walking]),
        )
        .await
        .unwrap();
        assert_eq!(report.set.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].mode, TransportMode::Transit);
    }

    #[tokio::test]
    async fn total_failure_surfaces_first_error() {
        let provider = FlakyProvider {
            failing: TransportMode::ALL.to_vec(),
            distance_text: "4 km",
        };
        let err = run_comparison(
            &provider,
            &request(vec![TransportMode::Walking, TransportMode::Driving]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ComparisonError::AllModesFailed(_)));
        assert!(err.message().contains("Walk"));
    }

    #[tokio::test]
    async fn rejects_blank_endpoints_and_empty_modes() {
        let provider = MockRouteProvider::new(5.0);
        let mut blank = request(vec![TransportMode::Walking]);
        blank.destination = "   ".to_string();
        let err = run_comparison(&provider, &blank).await.unwrap_err();
        assert!(matches!(err, ComparisonError::InvalidInput(_)));

        let err = run_comparison(&provider, &request(Vec::new())).await.unwrap_err();
        assert_eq!(err.message(), "Select at least one transport option.");
    }

    #[tokio::test]
    async fn unparsable_distance_never_counts_as_zero_emission_win() {
        let provider = FlakyProvider {
            failing: Vec::new(),
            distance_text: "3 furlongs",
        };
        let report = run_comparison(
            &provider,
            &request(vec![TransportMode::Driving, TransportMode::Walking]),
        )
        .await
        .unwrap();
        assert!(report.set.results().iter().all(|r| !r.available));
        assert!(report.best.is_none());
        assert!(report.impact.is_none());
    }

    #[test]
    fn mock_distance_must_be_positive() {
        assert!(validate_mock_distance(2.5).is_ok());
        assert!(validate_mock_distance(0.0).is_err());
        assert!(validate_mock_distance(f64::NAN).is_err());
    }

    #[test]
    fn duplicate_modes_collapse() {
        let modes = validate_request(&request(vec![
            TransportMode::Walking,
            TransportMode::Walking,
            TransportMode::Driving,
        ]))
        .unwrap();
        assert_eq!(modes, vec![TransportMode::Walking, TransportMode::Driving]);
    }

    #[test]
    fn set_keeps_one_result_per_mode() {
        let first = ModeResult {
            mode: TransportMode::Walking,
            time_min: 10,
            co2_kg: 0.0,
            kcal: 41,
            available: true,
        };
        let second = ModeResult { time_min: 12, ..first };
        let set: ComparisonSet = vec![first, second].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(set.results()[0].time_min, 12);
        assert!(set.baseline().is_none());
    }
}
