//! Leaderboard ranking.
//!
//! Players are ranked by score, highest first. Ties keep join order, which
//! falls out of a stable sort over the room's player list.

use super::entity::Player;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub display_name: String,
    pub score: u32,
    pub answered_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalStanding {
    pub display_name: String,
    pub score: u32,
    pub correct_answers: usize,
    pub total_answers: usize,
    /// Rounded percentage, 0 when the player never answered.
    pub accuracy: u32,
}

/// Running leaderboard, `players` in join order.
pub fn rank(players: &[Player]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = players
        .iter()
        .map(|p| LeaderboardEntry {
            display_name: p.display_name().to_string(),
            score: p.score(),
            answered_count: p.answers().len(),
        })
        .collect();
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries
}

/// Final results with per-player accuracy, `players` in join order.
pub fn final_standings(players: &[Player]) -> Vec<FinalStanding> {
    let mut standings: Vec<FinalStanding> = players
        .iter()
        .map(|p| FinalStanding {
            display_name: p.display_name().to_string(),
            score: p.score(),
            correct_answers: p.correct_count(),
            total_answers: p.answers().len(),
            accuracy: p.accuracy_percent(),
        })
        .collect();
    standings.sort_by(|a, b| b.score.cmp(&a.score));
    standings
}
