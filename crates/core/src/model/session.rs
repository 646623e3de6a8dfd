use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Topic;
use crate::scoring::{points_for_loss, points_for_win};

/// Why a game was lost. Display only; scoring is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LossReason {
    Timeout,
    Wrong,
}

impl fmt::Display for LossReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LossReason::Timeout => "timeout",
            LossReason::Wrong => "wrong",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Won,
    Lost(LossReason),
}

/// Terminal result of one game, ready to be applied to the player's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    topic: Topic,
    result: GameResult,
    index: usize,
    points: u64,
}

impl GameOutcome {
    /// The question at `index` was answered correctly and was the last one.
    #[must_use]
    pub fn won(topic: Topic, index: usize) -> Self {
        Self {
            topic,
            result: GameResult::Won,
            index,
            points: points_for_win(index),
        }
    }

    /// The game ended on the question at `index`.
    #[must_use]
    pub fn lost(topic: Topic, index: usize, reason: LossReason) -> Self {
        Self {
            topic,
            result: GameResult::Lost(reason),
            index,
            points: points_for_loss(index),
        }
    }

    #[must_use]
    pub fn topic(&self) -> Topic {
        self.topic
    }

    #[must_use]
    pub fn result(&self) -> GameResult {
        self.result
    }

    /// Zero-based index of the question the game ended on.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn points(&self) -> u64 {
        self.points
    }

    #[must_use]
    pub fn is_won(&self) -> bool {
        matches!(self.result, GameResult::Won)
    }

    /// The topic to mark completed, if any.
    #[must_use]
    pub fn completed_topic(&self) -> Option<Topic> {
        self.is_won().then_some(self.topic)
    }

    #[must_use]
    pub fn loss_reason(&self) -> Option<LossReason> {
        match self.result {
            GameResult::Won => None,
            GameResult::Lost(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_completes_the_topic() {
        let outcome = GameOutcome::won(Topic::Din, 9);
        assert_eq!(outcome.points(), 6_000);
        assert_eq!(outcome.completed_topic(), Some(Topic::Din));
        assert_eq!(outcome.loss_reason(), None);
    }

    #[test]
    fn losses_keep_their_reason() {
        let wrong = GameOutcome::lost(Topic::Film, 3, LossReason::Wrong);
        assert_eq!(wrong.points(), 150);
        assert_eq!(wrong.completed_topic(), None);

        let timeout = GameOutcome::lost(Topic::Film, 0, LossReason::Timeout);
        assert_eq!(timeout.points(), 0);
        assert_eq!(timeout.loss_reason(), Some(LossReason::Timeout));
    }
}
