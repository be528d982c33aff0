//! Scoring engine.
//!
//! Pure functions: a correct answer is worth [`BASE_POINTS`] plus one bonus
//! point for every two whole seconds left on the clock. The elapsed time is
//! always measured on the server from the question's start timestamp.

use super::value_object::Timestamp;

/// Points for any correct answer, before the speed bonus.
pub const BASE_POINTS: u32 = 10;

/// Result of scoring a single answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub is_correct: bool,
    pub points: u32,
}

/// Score one answer.
///
/// `elapsed_seconds` must come from [`elapsed_seconds`]; a client-declared
/// duration is never accepted here.
pub fn score_answer(
    selected_index: usize,
    correct_index: usize,
    time_limit_seconds: u32,
    elapsed_seconds: f64,
) -> ScoreOutcome {
    if selected_index != correct_index {
        return ScoreOutcome {
            is_correct: false,
            points: 0,
        };
    }

    let remaining = f64::from(time_limit_seconds) - elapsed_seconds;
    let bonus = (remaining / 2.0).floor().max(0.0) as u32;

    ScoreOutcome {
        is_correct: true,
        points: BASE_POINTS + bonus,
    }
}

/// Seconds between `started_at` and `now`, rounded to one decimal place.
///
/// Clock skew that would yield a negative value is clamped to zero.
pub fn elapsed_seconds(started_at: Timestamp, now: Timestamp) -> f64 {
    let millis = now.millis_since(started_at).max(0);
    (millis as f64 / 100.0).round() / 10.0
}
