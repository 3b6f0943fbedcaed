use super::types::PriorityLevel;

pub const HIGH_PRIORITY_THRESHOLD: f64 = 25.0;
pub const MEDIUM_PRIORITY_THRESHOLD: f64 = 15.0;

/// Maps a priority score to a tier. Lower bounds are inclusive.
pub fn classify(priority: f64) -> PriorityLevel {
    if priority >= HIGH_PRIORITY_THRESHOLD {
        PriorityLevel::High
    } else if priority >= MEDIUM_PRIORITY_THRESHOLD {
        PriorityLevel::Medium
    } else {
        PriorityLevel::Low
    }
}
