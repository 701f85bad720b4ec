use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const AVERAGE_BODY_WEIGHT_KG: f64 = 75.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Driving,
    Transit,
    Bicycling,
    Walking,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeProfile {
    pub label: &'static str,
    pub emission_factor: f64,
    pub met_factor: f64,
    pub mock_speed_kmh: f64,
    pub active: bool,
}

const DRIVING: ModeProfile = ModeProfile {
    label: "Car",
    emission_factor: 0.171,
    met_factor: 1.3,
    mock_speed_kmh: 40.0,
    active: false,
};

const TRANSIT: ModeProfile = ModeProfile {
    label: "Bus",
    emission_factor: 0.089,
    met_factor: 1.3,
    mock_speed_kmh: 30.0,
    active: false,
};

const BICYCLING: ModeProfile = ModeProfile {
    label: "Bike",
    emission_factor: 0.0,
    met_factor: 6.8,
    mock_speed_kmh: 15.0,
    active: true,
};

const WALKING: ModeProfile = ModeProfile {
    label: "Walk",
    emission_factor: 0.0,
    met_factor: 3.3,
    mock_speed_kmh: 5.0,
    active: true,
};

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Driving,
        TransportMode::Transit,
        TransportMode::Bicycling,
        TransportMode::Walking,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Transit => "transit",
            Self::Bicycling => "bicycling",
            Self::Walking => "walking",
        }
    }

    pub fn profile(&self) -> &'static ModeProfile {
        match self {
            Self::Driving => &DRIVING,
            Self::Transit => &TRANSIT,
            Self::Bicycling => &BICYCLING,
            Self::Walking => &WALKING,
        }
    }

    pub fn label(&self) -> &'static str {
        self.profile().label
    }

    pub fn is_active(&self) -> bool {
        self.profile().active
    }
}

impl Display for TransportMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown transport mode: {0}")]
pub struct ModeParseError(pub String);

impl FromStr for TransportMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "driving" | "car" | "drive" => Ok(Self::Driving),
            "transit" | "bus" | "public_transport" => Ok(Self::Transit),
            "bicycling" | "bike" | "cycling" => Ok(Self::Bicycling),
            "walking" | "walk" => Ok(Self::Walking),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

/// Parses a comma separated mode list, dropping duplicates but keeping
/// first-seen order.
pub fn parse_mode_list(raw: &str) -> Result<Vec<TransportMode>, ModeParseError> {
    let mut out = Vec::new();
    for piece in raw.split(',') {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        out.push(TransportMode::from_str(trimmed)?);
    }
    Ok(dedupe_modes(&out))
}

pub fn dedupe_modes(modes: &[TransportMode]) -> Vec<TransportMode> {
    let mut out: Vec<TransportMode> = Vec::with_capacity(modes.len());
    for mode in modes {
        if !out.contains(mode) {
            out.push(*mode);
        }
    }
    out
}
