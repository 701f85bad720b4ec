use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::ModeResult;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    Fastest,
    #[default]
    Greenest,
    Healthiest,
}

impl Preference {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Fastest => "fastest",
            Self::Greenest => "greenest",
            Self::Healthiest => "healthiest",
        }
    }
}

impl Display for Preference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Fastest => "Fastest",
            Self::Greenest => "Greenest",
            Self::Healthiest => "Healthiest",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown preference: {0}")]
pub struct PreferenceParseError(pub String);

impl FromStr for Preference {
    type Err = PreferenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "fastest" | "fast" => Ok(Self::Fastest),
            "greenest" | "green" => Ok(Self::Greenest),
            "healthiest" | "health" => Ok(Self::Healthiest),
            _ => Err(PreferenceParseError(s.to_string())),
        }
    }
}

/// Results flagged unavailable never win. Fastest and Healthiest keep the
/// first candidate on ties; Greenest breaks equal CO2 by lower travel time.
pub fn select_best(results: &[ModeResult], preference: Preference) -> Option<&ModeResult> {
    let mut candidates = results.iter().filter(|r| r.available);
    let first = candidates.next()?;
    let best = candidates.fold(first, |best, next| {
        let better = match preference {
            Preference::Fastest => next.time_min < best.time_min,
            Preference::Healthiest => next.kcal > best.kcal,
            Preference::Greenest => {
                next.co2_kg < best.co2_kg
                    || (next.co2_kg == best.co2_kg && next.time_min < best.time_min)
            }
        };
        if better {
            next
        } else {
            best
        }
    });
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::TransportMode;

    fn result(mode: TransportMode, time_min: u32, co2_kg: f64, kcal: u32) -> ModeResult {
        ModeResult {
            mode,
            time_min,
            co2_kg,
            kcal,
            available: true,
        }
    }

    fn sample() -> Vec<ModeResult> {
        vec![
            result(TransportMode::Driving, 12, 1.37, 17),
            result(TransportMode::Transit, 16, 0.71, 22),
            result(TransportMode::Bicycling, 32, 0.0, 272),
            result(TransportMode::Walking, 96, 0.0, 396),
        ]
    }

    #[test]
    fn empty_input_has_no_best() {
        assert!(select_best(&[], Preference::Greenest).is_none());
    }

    #[test]
    fn greenest_breaks_zero_co2_tie_by_time() {
        let results = sample();
        let best = select_best(&results, Preference::Greenest).unwrap();
        assert_eq!(best.mode, TransportMode::Bicycling);

        let mut reversed = sample();
        reversed.reverse();
        let best = select_best(&reversed, Preference::Greenest).unwrap();
        assert_eq!(best.mode, TransportMode::Bicycling);
    }

    #[test]
    fn fastest_and_healthiest_pick_extremes() {
        let results = sample();
        assert_eq!(
            select_best(&results, Preference::Fastest).unwrap().mode,
            TransportMode::Driving
        );
        assert_eq!(
            select_best(&results, Preference::Healthiest).unwrap().mode,
            TransportMode::Walking
        );
    }

    #[test]
    fn fastest_tie_keeps_first_encountered() {
        let results = vec![
            result(TransportMode::Transit, 10, 0.5, 10),
            result(TransportMode::Driving, 10, 1.0, 10),
        ];
        assert_eq!(
            select_best(&results, Preference::Fastest).unwrap().mode,
            TransportMode::Transit
        );
        assert_eq!(
            select_best(&results, Preference::Healthiest).unwrap().mode,
            TransportMode::Transit
        );
    }

    #[test]
    fn unavailable_results_never_win() {
        let mut results = sample();
        results[2].available = false;
        results[3].available = false;
        let best = select_best(&results, Preference::Greenest).unwrap();
        assert_eq!(best.mode, TransportMode::Transit);

        for r in &mut results {
            r.available = false;
        }
        assert!(select_best(&results, Preference::Fastest).is_none());
    }

    #[test]
    fn returns_reference_into_input() {
        let results = sample();
        let best = select_best(&results, Preference::Healthiest).unwrap();
        assert!(std::ptr::eq(best, &results[3]));
    }

    #[test]
    fn parses_preference_aliases() {
        assert_eq!("fast".parse::<Preference>().unwrap(), Preference::Fastest);
        assert_eq!("Healthiest".parse::<Preference>().unwrap(), Preference::Healthiest);
        assert!("cheapest".parse::<Preference>().is_err());
    }
}
