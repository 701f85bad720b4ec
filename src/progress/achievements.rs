use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::progress::state::ProgressState;

const MAX_LEAVES: u32 = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    Commuter,
    CalorieBurner,
    CarbonCutter,
    StreakStarter,
    WeekStreak,
    MonthStreak,
}

impl Achievement {
    pub const ALL: [Achievement; 6] = [
        Achievement::Commuter,
        Achievement::CalorieBurner,
        Achievement::CarbonCutter,
        Achievement::StreakStarter,
        Achievement::WeekStreak,
        Achievement::MonthStreak,
    ];

    pub fn threshold(&self) -> f64 {
        match self {
            Self::Commuter => 5.0,
            Self::CalorieBurner => 1000.0,
            Self::CarbonCutter => 20.0,
            Self::StreakStarter => 3.0,
            Self::WeekStreak => 7.0,
            Self::MonthStreak => 30.0,
        }
    }

    pub fn current(&self, state: &ProgressState) -> f64 {
        match self {
            Self::Commuter => f64::from(state.journeys),
            Self::CalorieBurner => state.total_kcal,
            Self::CarbonCutter => state.total_co2_saved_kg,
            Self::StreakStarter | Self::WeekStreak | Self::MonthStreak => {
                f64::from(state.streak)
            }
        }
    }

    pub fn is_unlocked(&self, state: &ProgressState) -> bool {
        self.current(state) >= self.threshold()
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Commuter => "Compare 5 journeys",
            Self::CalorieBurner => "Burn 1000 active kcal",
            Self::CarbonCutter => "Save 20 kg of CO\u{2082}",
            Self::StreakStarter => "Travel sustainably 3 days in a row",
            Self::WeekStreak => "Travel sustainably 7 days in a row",
            Self::MonthStreak => "Travel sustainably 30 days in a row",
        }
    }
}

impl Display for Achievement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Commuter => "Commuter",
            Self::CalorieBurner => "Calorie Burner",
            Self::CarbonCutter => "Carbon Cutter",
            Self::StreakStarter => "Streak Starter",
            Self::WeekStreak => "Week Streak",
            Self::MonthStreak => "Month Streak",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AchievementProgress {
    pub achievement: Achievement,
    pub unlocked: bool,
    pub current: f64,
    pub threshold: f64,
}

pub fn achievements_for(state: &ProgressState) -> Vec<Achievement> {
    Achievement::ALL
        .iter()
        .copied()
        .filter(|a| a.is_unlocked(state))
        .collect()
}

pub fn achievement_progress(state: &ProgressState) -> Vec<AchievementProgress> {
    Achievement::ALL
        .iter()
        .map(|a| AchievementProgress {
            achievement: *a,
            unlocked: a.is_unlocked(state),
            current: a.current(state),
            threshold: a.threshold(),
        })
        .collect()
}

pub fn newly_unlocked(before: &ProgressState, after: &ProgressState) -> Vec<Achievement> {
    Achievement::ALL
        .iter()
        .copied()
        .filter(|a| !a.is_unlocked(before) && a.is_unlocked(after))
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TreeStage {
    Seedling,
    Sprouting,
    Growing,
    Flourishing,
}

impl TreeStage {
    pub fn for_journeys(journeys: u32) -> Self {
        match journeys {
            0 => Self::Seedling,
            1..=9 => Self::Sprouting,
            10..=29 => Self::Growing,
            _ => Self::Flourishing,
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Self::Seedling => "Compare a route to start growing your tree.",
            Self::Sprouting => "Nice start, each journey grows the tree.",
            Self::Growing => "Keep comparing routes to unlock more leaves.",
            Self::Flourishing => "You're building a strong habit. Good job!",
        }
    }
}

impl Display for TreeStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Seedling => "Seedling",
            Self::Sprouting => "Sprouting",
            Self::Growing => "Growing",
            Self::Flourishing => "Flourishing",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeProgress {
    pub stage: TreeStage,
    pub leaves: u32,
    pub max_leaves: u32,
}

pub fn tree_progress(state: &ProgressState) -> TreeProgress {
    TreeProgress {
        stage: TreeStage::for_journeys(state.journeys),
        leaves: state.journeys.min(MAX_LEAVES),
        max_leaves: MAX_LEAVES,
    }
}
