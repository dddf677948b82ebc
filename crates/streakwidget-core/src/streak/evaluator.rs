//! Streak danger evaluation.
//!
//! Maps the upstream streak count and the last activity date to the state a
//! display surface should show. Pure and total: no clock, no I/O.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Visual tier of the streak flame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualTier {
    /// Streak broke: two or more calendar days without activity
    Lost,
    /// No streak yet
    Inactive,
    /// One day
    Weak,
    /// Two days or more
    Active,
}

/// Text shown next to the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreakLabel {
    #[serde(rename = "no streak")]
    NoStreak,
    #[serde(rename = "day streak")]
    DayStreak,
    #[serde(rename = "days streak")]
    DaysStreak,
}

impl StreakLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreakLabel::NoStreak => "no streak",
            StreakLabel::DayStreak => "day streak",
            StreakLabel::DaysStreak => "days streak",
        }
    }

    fn for_count(count: i64) -> Self {
        if count == 1 {
            StreakLabel::DayStreak
        } else {
            StreakLabel::DaysStreak
        }
    }
}

impl std::fmt::Display for StreakLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the display surfaces render after one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    pub count: u64,
    pub label: StreakLabel,
    pub visual_tier: VisualTier,
}

impl DisplayState {
    /// The state shown once the streak has broken.
    pub const LOST: DisplayState = DisplayState {
        count: 0,
        label: StreakLabel::NoStreak,
        visual_tier: VisualTier::Lost,
    };
}

/// Inputs written by the app whenever the user is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakRecord {
    pub streak_count: i64,
    pub last_activity_date: Option<NaiveDate>,
}

impl StreakRecord {
    pub fn evaluate(&self, today: NaiveDate) -> DisplayState {
        evaluate(self.streak_count, self.last_activity_date, today)
    }
}

/// Whether the gap since `last_activity` has broken the streak.
///
/// Only activity today or yesterday keeps a streak alive, so a date in the
/// future counts as broken as well.
pub fn is_in_danger(last_activity: Option<NaiveDate>, today: NaiveDate) -> bool {
    let Some(last) = last_activity else {
        return false;
    };
    let yesterday = today.checked_sub_days(Days::new(1));
    last != today && Some(last) != yesterday
}

/// Evaluate the display state for a stored streak.
///
/// Dates must already be normalized to the local calendar; see
/// [`parse_activity_date`](super::parse_activity_date).
pub fn evaluate(
    streak_count: i64,
    last_activity_date: Option<NaiveDate>,
    today: NaiveDate,
) -> DisplayState {
    if is_in_danger(last_activity_date, today) {
        return DisplayState::LOST;
    }

    let visual_tier = match streak_count {
        n if n >= 2 => VisualTier::Active,
        1 => VisualTier::Weak,
        _ => VisualTier::Inactive,
    };

    DisplayState {
        count: u64::try_from(streak_count).unwrap_or(0),
        label: StreakLabel::for_count(streak_count),
        visual_tier,
    }
}
