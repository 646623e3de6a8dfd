//! Points awarded when a game ends.

/// Points per question cleared on a winning run.
pub const POINTS_PER_LEVEL: u64 = 100;

/// Flat bonus for clearing every question.
pub const WIN_BONUS: u64 = 5_000;

/// Points per question cleared before a loss.
pub const PARTIAL_POINTS_PER_LEVEL: u64 = 50;

/// Score for answering the question at `index` correctly as the last one.
#[must_use]
pub fn points_for_win(index: usize) -> u64 {
    (index as u64 + 1) * POINTS_PER_LEVEL + WIN_BONUS
}

/// Score for losing on the question at `index`; only earlier questions count.
#[must_use]
pub fn points_for_loss(index: usize) -> u64 {
    index as u64 * PARTIAL_POINTS_PER_LEVEL
}
