use serde::{Deserialize, Serialize};

use crate::modes::{TransportMode, AVERAGE_BODY_WEIGHT_KG};
use crate::units::{parse_distance, parse_duration};

const MINUTES_PER_HOUR: f64 = 60.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RouteQuote {
    pub mode: TransportMode,
    /// `NaN` when the provider text could not be parsed.
    pub distance_km: f64,
    pub duration_min: f64,
}

impl RouteQuote {
    pub fn from_text(mode: TransportMode, distance_text: &str, duration_text: &str) -> Self {
        Self {
            mode,
            distance_km: parse_distance(distance_text),
            duration_min: f64::from(parse_duration(duration_text)),
        }
    }

    pub fn metrics(&self) -> ModeResult {
        compute_metrics(self.mode, self.distance_km, self.duration_min)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ModeResult {
    pub mode: TransportMode,
    pub time_min: u32,
    pub co2_kg: f64,
    pub kcal: u32,
    /// False when the route distance was unusable, so a zero `co2_kg` is
    /// not a real zero-emission figure.
    pub available: bool,
}

pub fn compute_metrics(mode: TransportMode, distance_km: f64, duration_min: f64) -> ModeResult {
    let profile = mode.profile();
    let available = distance_km.is_finite();

    let co2_kg = if available {
        round2(distance_km.max(0.0) * profile.emission_factor)
    } else {
        0.0
    };

    let duration = if duration_min.is_finite() {
        duration_min.max(0.0)
    } else {
        0.0
    };
    let kcal = if duration > 0.0 {
        let raw = profile.met_factor * AVERAGE_BODY_WEIGHT_KG * duration / MINUTES_PER_HOUR;
        // Settle float noise first so exact halves round up.
        round2(raw).round() as u32
    } else {
        0
    };

    ModeResult {
        mode,
        time_min: duration.round() as u32,
        co2_kg,
        kcal,
        available,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walking_scenario_matches_met_model() {
        let quote = RouteQuote::from_text(TransportMode::Walking, "12.3 km", "20 mins");
        assert!((quote.distance_km - 12.3).abs() < 1e-9);
        assert_eq!(quote.duration_min, 20.0);

        let result = quote.metrics();
        assert_eq!(result.co2_kg, 0.0);
        // 3.3 MET * 75 kg * 20/60 h = 82.5
        assert_eq!(result.kcal, 83);
        assert_eq!(result.time_min, 20);
        assert!(result.available);
    }

    #[test]
    fn zero_emission_modes_stay_zero_for_any_distance() {
        for km in [0.0, 0.4, 12.0, 950.5] {
            assert_eq!(compute_metrics(TransportMode::Walking, km, 30.0).co2_kg, 0.0);
            assert_eq!(compute_metrics(TransportMode::Bicycling, km, 30.0).co2_kg, 0.0);
        }
    }

    #[test]
    fn driving_emissions_round_to_two_decimals() {
        let result = compute_metrics(TransportMode::Driving, 12.0, 18.0);
        assert_eq!(result.co2_kg, 2.05);
        assert_eq!(result.time_min, 18);
    }

    #[test]
    fn unparsed_distance_is_flagged_unavailable() {
        let result = compute_metrics(TransportMode::Driving, f64::NAN, 25.0);
        assert_eq!(result.co2_kg, 0.0);
        assert!(!result.available);
        assert!(result.kcal > 0);
    }

    #[test]
    fn negative_inputs_are_clamped() {
        let result = compute_metrics(TransportMode::Driving, -4.0, -10.0);
        assert_eq!(result.co2_kg, 0.0);
        assert_eq!(result.kcal, 0);
        assert_eq!(result.time_min, 0);
    }

    #[test]
    fn zero_duration_burns_nothing() {
        assert_eq!(compute_metrics(TransportMode::Bicycling, 3.0, 0.0).kcal, 0);
    }
}
