//! The fixed prize ladder and the difficulty layout of a game.

use crate::model::Difficulty;

/// Number of questions in one game.
pub const GAME_LENGTH: usize = 10;

/// Display labels for positions 1..=10. Presentation only, never awarded.
pub const PRIZE_LADDER: [&str; GAME_LENGTH] = [
    "100 ₼",
    "200 ₼",
    "300 ₼",
    "500 ₼",
    "1,000 ₼",
    "2,000 ₼",
    "4,000 ₼",
    "8,000 ₼",
    "16,000 ₼",
    "1,000,000 ₼",
];

/// How many questions each difficulty contributes, in play order.
pub const DIFFICULTY_PLAN: [(Difficulty, usize); 3] = [
    (Difficulty::Easy, 4),
    (Difficulty::Medium, 3),
    (Difficulty::Hard, 3),
];

const MILESTONES: [usize; 3] = [4, 8, 9];

/// Prize label for a zero-based position.
#[must_use]
pub fn prize_for(index: usize) -> Option<&'static str> {
    PRIZE_LADDER.get(index).copied()
}

/// Milestone rungs are highlighted on the ladder.
#[must_use]
pub fn is_milestone(index: usize) -> bool {
    MILESTONES.contains(&index)
}

/// Questions required from `difficulty` for one game.
#[must_use]
pub fn required_for(difficulty: Difficulty) -> usize {
    DIFFICULTY_PLAN
        .iter()
        .find(|(d, _)| *d == difficulty)
        .map_or(0, |(_, count)| *count)
}
