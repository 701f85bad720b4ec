use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::impact::ImpactSummary;
use crate::metrics::round2;
use crate::modes::TransportMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub journeys: u32,
    pub total_kcal: f64,
    pub total_co2_saved_kg: f64,
    pub streak: u32,
    pub last_sustainable_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DedupKey {
    pub mode: TransportMode,
    pub co2_saved_kg: f64,
    pub active_kcal: u32,
}

impl DedupKey {
    pub fn from_impact(impact: &ImpactSummary) -> Self {
        Self {
            mode: impact.mode,
            co2_saved_kg: impact.co2_saved_kg,
            active_kcal: impact.active_kcal,
        }
    }

    pub fn marker(&self) -> String {
        format!(
            "{}|{:.2}|{}",
            self.mode.as_slug(),
            self.co2_saved_kg,
            self.active_kcal
        )
    }
}

impl ProgressState {
    /// Streak as seen on `today`: a run lapses once a whole day passes
    /// without a sustainable trip.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        match (self.last_sustainable_date, today.pred_opt()) {
            (Some(last), Some(yesterday)) if last < yesterday => 0,
            _ => self.streak,
        }
    }

    pub fn as_of(&self, today: NaiveDate) -> Self {
        Self {
            streak: self.current_streak(today),
            ..self.clone()
        }
    }

    pub fn apply_journey(&mut self, co2_saved_kg: f64, active_kcal: u32, today: NaiveDate) {
        self.journeys = self.journeys.saturating_add(1);
        self.total_kcal += f64::from(active_kcal);
        self.total_co2_saved_kg = round2(self.total_co2_saved_kg + co2_saved_kg.max(0.0));
        let sustainable = co2_saved_kg > 0.0 || active_kcal > 0;
        self.advance_streak(sustainable, today);
    }

    pub fn advance_streak(&mut self, sustainable: bool, today: NaiveDate) {
        if !sustainable {
            self.streak = 0;
            return;
        }
        match self.last_sustainable_date {
            Some(last) if last == today => {}
            Some(last) if today.pred_opt() == Some(last) => {
                self.streak = self.streak.saturating_add(1);
                self.last_sustainable_date = Some(today);
            }
            _ => {
                self.streak = 1;
                self.last_sustainable_date = Some(today);
            }
        }
    }
}
