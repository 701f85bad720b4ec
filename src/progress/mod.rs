pub mod achievements;
pub mod events;
pub mod state;
pub mod store;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::impact::ImpactSummary;
use crate::progress::events::{ProgressEvent, ProgressListener};
use crate::progress::state::DedupKey;
use crate::progress::store::StateStore;

pub use achievements::{
    achievement_progress, achievements_for, newly_unlocked, tree_progress, Achievement,
    AchievementProgress, TreeProgress, TreeStage,
};
pub use state::ProgressState;

pub const STATS_KEY: &str = "impact_stats_v1";
pub const LAST_COUNTED_KEY: &str = "impact_last_counted_v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", content = "state", rename_all = "snake_case")]
pub enum RecordOutcome {
    Counted(ProgressState),
    Duplicate(ProgressState),
    Skipped(ProgressState),
}

impl RecordOutcome {
    pub fn state(&self) -> &ProgressState {
        match self {
            Self::Counted(s) | Self::Duplicate(s) | Self::Skipped(s) => s,
        }
    }

    pub fn counted(&self) -> bool {
        matches!(self, Self::Counted(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressSummary {
    pub state: ProgressState,
    pub tree: TreeProgress,
    pub achievements: Vec<AchievementProgress>,
}

impl ProgressSummary {
    pub fn as_of(state: &ProgressState, today: NaiveDate) -> Self {
        let state = state.as_of(today);
        Self {
            tree: tree_progress(&state),
            achievements: achievement_progress(&state),
            state,
        }
    }

    pub fn unlocked(&self) -> impl Iterator<Item = Achievement> + '_ {
        self.achievements
            .iter()
            .filter(|a| a.unlocked)
            .map(|a| a.achievement)
    }
}

pub struct ProgressTracker<S: StateStore> {
    store: S,
    listeners: Vec<Box<dyn ProgressListener>>,
}

impl<S: StateStore> ProgressTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            listeners: Vec::new(),
        }
    }

    pub fn with_listener(mut self, listener: impl ProgressListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn add_listener(&mut self, listener: Box<dyn ProgressListener>) {
        self.listeners.push(listener);
    }

    /// Current state; unreadable or malformed records fall back to zeros.
    pub fn load(&self) -> ProgressState {
        let raw = match self.store.get(STATS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ProgressState::default(),
            Err(err) => {
                warn!("failed reading progress state, starting fresh: {err}");
                return ProgressState::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(err) => {
                warn!("stored progress state is malformed, starting fresh: {err}");
                ProgressState::default()
            }
        }
    }

    pub fn summary(&self, today: NaiveDate) -> ProgressSummary {
        ProgressSummary::as_of(&self.load(), today)
    }

    pub fn summary_today(&self) -> ProgressSummary {
        self.summary(local_today())
    }

    pub fn record_today(&self, impact: &ImpactSummary) -> Result<RecordOutcome> {
        self.record(impact, local_today())
    }

    pub fn record(&self, impact: &ImpactSummary, today: NaiveDate) -> Result<RecordOutcome> {
        let before = self.load().as_of(today);
        if !impact.available {
            debug!("skipping progress record for unavailable {} route", impact.mode);
            return Ok(RecordOutcome::Skipped(before));
        }

        let marker = DedupKey::from_impact(impact).marker();
        if self.last_counted()?.as_deref() == Some(marker.as_str()) {
            debug!("comparison {marker} already counted");
            return Ok(RecordOutcome::Duplicate(before));
        }

        let mut after = before.clone();
        after.apply_journey(impact.co2_saved_kg, impact.active_kcal, today);
        let encoded = serde_json::to_string(&after)?;
        self.store
            .set_many(&[(STATS_KEY, encoded.as_str()), (LAST_COUNTED_KEY, marker.as_str())])?;

        self.notify(&ProgressEvent::Recorded {
            before,
            after: after.clone(),
        });
        Ok(RecordOutcome::Counted(after))
    }

    pub fn reset(&self) -> Result<ProgressState> {
        let before = self.load();
        self.store.remove_many(&[STATS_KEY, LAST_COUNTED_KEY])?;
        self.notify(&ProgressEvent::Reset { before });
        Ok(ProgressState::default())
    }

    fn last_counted(&self) -> Result<Option<String>> {
        self.store.get(LAST_COUNTED_KEY)
    }

    fn notify(&self, event: &ProgressEvent) {
        for listener in &self.listeners {
            listener.on_progress(event);
        }
    }
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
