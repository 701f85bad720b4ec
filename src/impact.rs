use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::{round2, ModeResult};
use crate::modes::TransportMode;

pub const TREE_ABSORPTION_PER_YEAR_KG: f64 = 21.0;
pub const DEFAULT_TRIPS_PER_WEEK: f64 = 1.0;

const CO2_SAVED_CAP_KG: f64 = 2.0;
const TRIPS_PER_WEEK_CAP: f64 = 10.0;
const ACTIVE_KCAL_CAP: f64 = 300.0;

const CO2_WEIGHT: f64 = 0.5;
const FREQUENCY_WEIGHT: f64 = 0.3;
const CALORIE_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpactSummary {
    pub mode: TransportMode,
    pub co2_saved_kg: f64,
    pub trees_equivalent: f64,
    pub trees_text: String,
    pub active_kcal: u32,
    pub score: u8,
    pub recommendation: String,
    pub available: bool,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidImpact {
    #[error("co2_saved_kg must be a non-negative number")]
    Co2Saved,
    #[error("trees_equivalent must be a non-negative number")]
    TreesEquivalent,
    #[error("score must be between 0 and 100")]
    Score,
    #[error("{0} cannot save CO2 against the driving baseline")]
    BaselineSavings(TransportMode),
    #[error("{0} burns no active calories")]
    InactiveCalories(TransportMode),
    #[error("an unavailable impact must carry no savings")]
    UnavailableSavings,
}

impl ImpactSummary {
    pub fn is_sustainable(&self) -> bool {
        self.co2_saved_kg > 0.0 || self.active_kcal > 0
    }

    pub fn validate(&self) -> Result<(), InvalidImpact> {
        if !self.co2_saved_kg.is_finite() || self.co2_saved_kg < 0.0 {
            return Err(InvalidImpact::Co2Saved);
        }
        if !self.trees_equivalent.is_finite() || self.trees_equivalent < 0.0 {
            return Err(InvalidImpact::TreesEquivalent);
        }
        if self.score > 100 {
            return Err(InvalidImpact::Score);
        }
        if self.mode == TransportMode::Driving && self.co2_saved_kg > 0.0 {
            return Err(InvalidImpact::BaselineSavings(self.mode));
        }
        if !self.mode.is_active() && self.active_kcal > 0 {
            return Err(InvalidImpact::InactiveCalories(self.mode));
        }
        if !self.available && self.is_sustainable() {
            return Err(InvalidImpact::UnavailableSavings);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaselineDelta {
    pub mode: TransportMode,
    pub time_delta_min: i64,
    pub co2_saved_kg: f64,
    pub kcal_delta: i64,
}

pub fn compute_impact(baseline: Option<&ModeResult>, alternative: &ModeResult) -> ImpactSummary {
    compute_impact_with_frequency(baseline, alternative, DEFAULT_TRIPS_PER_WEEK)
}

pub fn compute_impact_with_frequency(
    baseline: Option<&ModeResult>,
    alternative: &ModeResult,
    trips_per_week: f64,
) -> ImpactSummary {
    if !alternative.available {
        return ImpactSummary {
            mode: alternative.mode,
            co2_saved_kg: 0.0,
            trees_equivalent: 0.0,
            trees_text: trees_text(0.0),
            active_kcal: 0,
            score: 0,
            recommendation: format!(
                "Route data for {} is unavailable, so no savings can be shown.",
                alternative.mode.label()
            ),
            available: false,
        };
    }

    let baseline = baseline.filter(|b| b.available);
    let co2_saved_kg = match baseline {
        Some(base) if alternative.mode != TransportMode::Driving => {
            round2((base.co2_kg - alternative.co2_kg).max(0.0))
        }
        _ => 0.0,
    };
    let trees_equivalent = if co2_saved_kg > 0.0 {
        co2_saved_kg / TREE_ABSORPTION_PER_YEAR_KG
    } else {
        0.0
    };
    let active_kcal = if alternative.mode.is_active() {
        alternative.kcal
    } else {
        0
    };

    ImpactSummary {
        mode: alternative.mode,
        co2_saved_kg,
        trees_equivalent,
        trees_text: trees_text(trees_equivalent),
        active_kcal,
        score: sustainability_score(co2_saved_kg, active_kcal, trips_per_week),
        recommendation: recommendation(alternative.mode, co2_saved_kg),
        available: true,
    }
}

/// Frequency only counts for trips that save CO2 or burn active calories.
pub fn sustainability_score(co2_saved_kg: f64, active_kcal: u32, trips_per_week: f64) -> u8 {
    let co2 = normalize(co2_saved_kg, CO2_SAVED_CAP_KG);
    let calories = normalize(f64::from(active_kcal), ACTIVE_KCAL_CAP);
    let frequency = if co2 > 0.0 || calories > 0.0 {
        normalize(trips_per_week, TRIPS_PER_WEEK_CAP)
    } else {
        0.0
    };
    let weighted = CO2_WEIGHT * co2 + FREQUENCY_WEIGHT * frequency + CALORIE_WEIGHT * calories;
    (100.0 * weighted).round().clamp(0.0, 100.0) as u8
}

pub fn baseline_deltas(results: &[ModeResult]) -> Vec<BaselineDelta> {
    let Some(car) = results
        .iter()
        .find(|r| r.mode == TransportMode::Driving && r.available)
    else {
        return Vec::new();
    };
    results
        .iter()
        .filter(|r| r.mode != TransportMode::Driving && r.available)
        .map(|r| BaselineDelta {
            mode: r.mode,
            time_delta_min: i64::from(r.time_min) - i64::from(car.time_min),
            co2_saved_kg: round2((car.co2_kg - r.co2_kg).max(0.0)),
            kcal_delta: i64::from(r.kcal) - i64::from(car.kcal),
        })
        .collect()
}

fn normalize(value: f64, cap: f64) -> f64 {
    if !value.is_finite() || cap <= 0.0 {
        return 0.0;
    }
    (value / cap).clamp(0.0, 1.0)
}

fn recommendation(mode: TransportMode, co2_saved_kg: f64) -> String {
    if mode == TransportMode::Driving {
        "Driving has the highest footprint here. Try walking or cycling where possible to cut CO\u{2082}."
            .to_string()
    } else if co2_saved_kg > 0.0 {
        format!(
            "Nice choice: {} saves {co2_saved_kg:.2} kg CO\u{2082} compared to driving.",
            mode.label()
        )
    } else {
        format!("{} is already a low-carbon option for this route.", mode.label())
    }
}

fn trees_text(trees: f64) -> String {
    if trees <= 0.0 {
        "-".to_string()
    } else {
        format!("{trees:.2} trees/yr")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(mode: TransportMode, time_min: u32, co2_kg: f64, kcal: u32) -> ModeResult {
        ModeResult {
            mode,
            time_min,
            co2_kg,
            kcal,
            available: true,
        }
    }

    #[test]
    fn walking_against_driving_scenario() {
        let car = result(TransportMode::Driving, 18, 2.05, 29);
        let walk = result(TransportMode::Walking, 144, 0.0, 594);
        let impact = compute_impact(Some(&car), &walk);
        assert_eq!(impact.co2_saved_kg, 2.05);
        assert!((impact.trees_equivalent - 0.0976).abs() < 1e-3);
        assert_eq!(impact.active_kcal, 594);
        // 0.5 * 1.0 + 0.3 * 0.1 + 0.2 * 1.0
        assert_eq!(impact.score, 73);
        assert!(impact.is_sustainable());
    }

    #[test]
    fn savings_never_go_negative() {
        let cheap = result(TransportMode::Driving, 10, 0.2, 10);
        let bus = result(TransportMode::Transit, 20, 0.9, 20);
        let impact = compute_impact(Some(&cheap), &bus);
        assert_eq!(impact.co2_saved_kg, 0.0);
        assert_eq!(impact.trees_equivalent, 0.0);
    }

    #[test]
    fn driving_alternative_saves_nothing_and_suggests_switching() {
        let car = result(TransportMode::Driving, 10, 1.5, 15);
        let impact = compute_impact(Some(&car), &car);
        assert_eq!(impact.co2_saved_kg, 0.0);
        assert_eq!(impact.active_kcal, 0);
        assert_eq!(impact.score, 0);
        assert!(impact.recommendation.contains("walking or cycling"));
    }

    #[test]
    fn no_baseline_means_no_savings() {
        let bike = result(TransportMode::Bicycling, 20, 0.0, 170);
        let impact = compute_impact(None, &bike);
        assert_eq!(impact.co2_saved_kg, 0.0);
        assert_eq!(impact.active_kcal, 170);
        assert!(impact.recommendation.contains("low-carbon"));
    }

    #[test]
    fn transit_calories_are_not_active() {
        let car = result(TransportMode::Driving, 10, 1.0, 16);
        let bus = result(TransportMode::Transit, 14, 0.52, 23);
        let impact = compute_impact(Some(&car), &bus);
        assert_eq!(impact.active_kcal, 0);
        assert_eq!(impact.co2_saved_kg, 0.48);
        assert!(impact.recommendation.contains("saves 0.48"));
    }

    #[test]
    fn score_stays_in_bounds() {
        assert_eq!(sustainability_score(0.0, 0, 1.0), 0);
        assert_eq!(sustainability_score(0.0, 0, 50.0), 0);
        assert_eq!(sustainability_score(100.0, 10_000, 100.0), 100);
        assert_eq!(sustainability_score(f64::NAN, 0, f64::INFINITY), 0);
        for saved in [0.0, 0.3, 1.9, 2.0, 8.0] {
            for kcal in [0, 50, 300, 900] {
                for trips in [0.0, 1.0, 10.0, 40.0] {
                    assert!(sustainability_score(saved, kcal, trips) <= 100);
                }
            }
        }
    }

    #[test]
    fn unavailable_alternative_scores_zero() {
        let car = result(TransportMode::Driving, 10, 1.0, 16);
        let mut walk = result(TransportMode::Walking, 0, 0.0, 0);
        walk.available = false;
        let impact = compute_impact(Some(&car), &walk);
        assert!(!impact.available);
        assert_eq!(impact.co2_saved_kg, 0.0);
        assert_eq!(impact.score, 0);
    }

    #[test]
    fn unavailable_baseline_is_ignored() {
        let mut car = result(TransportMode::Driving, 10, 0.0, 16);
        car.available = false;
        let bike = result(TransportMode::Bicycling, 20, 0.0, 170);
        assert_eq!(compute_impact(Some(&car), &bike).co2_saved_kg, 0.0);
    }

    #[test]
    fn computed_impacts_pass_validation() {
        let car = result(TransportMode::Driving, 18, 2.05, 29);
        for alt in [
            car,
            result(TransportMode::Transit, 22, 1.07, 40),
            result(TransportMode::Walking, 144, 0.0, 594),
        ] {
            assert_eq!(compute_impact(Some(&car), &alt).validate(), Ok(()));
        }
    }

    #[test]
    fn hand_built_impacts_breaking_invariants_are_rejected() {
        let car = result(TransportMode::Driving, 18, 2.05, 29);
        let walk = compute_impact(Some(&car), &result(TransportMode::Walking, 144, 0.0, 594));

        let negative = ImpactSummary {
            co2_saved_kg: -1.0,
            ..walk.clone()
        };
        assert_eq!(negative.validate(), Err(InvalidImpact::Co2Saved));

        let sweaty_car = ImpactSummary {
            mode: TransportMode::Driving,
            co2_saved_kg: 0.0,
            active_kcal: 40,
            ..walk.clone()
        };
        assert_eq!(
            sweaty_car.validate(),
            Err(InvalidImpact::InactiveCalories(TransportMode::Driving))
        );

        let saving_car = ImpactSummary {
            mode: TransportMode::Driving,
            active_kcal: 0,
            ..walk.clone()
        };
        assert!(matches!(
            saving_car.validate(),
            Err(InvalidImpact::BaselineSavings(_))
        ));

        let overscored = ImpactSummary {
            score: 101,
            ..walk.clone()
        };
        assert_eq!(overscored.validate(), Err(InvalidImpact::Score));

        let unavailable = ImpactSummary {
            available: false,
            ..walk
        };
        assert_eq!(unavailable.validate(), Err(InvalidImpact::UnavailableSavings));
    }

    #[test]
    fn deltas_compare_alternatives_to_driving() {
        let results = vec![
            result(TransportMode::Driving, 12, 1.37, 17),
            result(TransportMode::Walking, 96, 0.0, 396),
        ];
        let deltas = baseline_deltas(&results);
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].mode, TransportMode::Walking);
        assert_eq!(deltas[0].time_delta_min, 84);
        assert_eq!(deltas[0].co2_saved_kg, 1.37);
        assert_eq!(deltas[0].kcal_delta, 379);

        assert!(baseline_deltas(&results[1..]).is_empty());
    }
}
