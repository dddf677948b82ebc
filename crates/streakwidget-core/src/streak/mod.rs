mod date;
mod evaluator;

pub use date::parse_activity_date;
pub use evaluator::{evaluate, is_in_danger, DisplayState, StreakLabel, StreakRecord, VisualTier};
