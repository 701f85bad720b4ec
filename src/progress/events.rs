use serde::{Deserialize, Serialize};
use tracing::info;

use crate::progress::achievements::newly_unlocked;
use crate::progress::state::ProgressState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressEvent {
    Recorded {
        before: ProgressState,
        after: ProgressState,
    },
    Reset {
        before: ProgressState,
    },
}

pub trait ProgressListener: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

pub struct LogListener;

impl ProgressListener for LogListener {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Recorded { after, .. } => info!(
                journeys = after.journeys,
                streak = after.streak,
                total_co2_saved_kg = after.total_co2_saved_kg,
                "journey recorded"
            ),
            ProgressEvent::Reset { before } => {
                info!(journeys = before.journeys, "progress reset")
            }
        }
    }
}

pub struct StdoutListener;

impl ProgressListener for StdoutListener {
    fn on_progress(&self, event: &ProgressEvent) {
        if let ProgressEvent::Recorded { before, after } = event {
            for achievement in newly_unlocked(before, after) {
                println!(
                    "Achievement unlocked: {achievement} - {}",
                    achievement.description()
                );
            }
        }
    }
}
