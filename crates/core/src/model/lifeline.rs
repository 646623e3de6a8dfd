use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::question::OPTION_COUNT;

/// Single-use aids available once per game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifeline {
    FiftyFifty,
    AskAudience,
    AskAi,
}

impl fmt::Display for Lifeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lifeline::FiftyFifty => "50:50",
            Lifeline::AskAudience => "ask the audience",
            Lifeline::AskAi => "ask AI",
        })
    }
}

/// Availability flags. Each flag only ever goes from `true` to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifelines {
    fifty_fifty: bool,
    ask_audience: bool,
    ask_ai: bool,
}

impl Default for Lifelines {
    fn default() -> Self {
        Self {
            fifty_fifty: true,
            ask_audience: true,
            ask_ai: true,
        }
    }
}

impl Lifelines {
    #[must_use]
    pub fn is_available(&self, lifeline: Lifeline) -> bool {
        match lifeline {
            Lifeline::FiftyFifty => self.fifty_fifty,
            Lifeline::AskAudience => self.ask_audience,
            Lifeline::AskAi => self.ask_ai,
        }
    }

    /// Marks the lifeline used. Returns `false` if it was already gone.
    pub fn consume(&mut self, lifeline: Lifeline) -> bool {
        let flag = match lifeline {
            Lifeline::FiftyFifty => &mut self.fifty_fifty,
            Lifeline::AskAudience => &mut self.ask_audience,
            Lifeline::AskAi => &mut self.ask_ai,
        };
        std::mem::replace(flag, false)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AudiencePollError {
    #[error("audience shares add up to {0}, expected 100")]
    BadTotal(u32),
}

/// Percentage of the audience voting for each option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudiencePoll {
    shares: [u8; OPTION_COUNT],
}

impl AudiencePoll {
    /// # Errors
    ///
    /// Returns `AudiencePollError::BadTotal` unless the shares sum to 100.
    pub fn new(shares: [u8; OPTION_COUNT]) -> Result<Self, AudiencePollError> {
        let total: u32 = shares.iter().map(|s| u32::from(*s)).sum();
        if total != 100 {
            return Err(AudiencePollError::BadTotal(total));
        }
        Ok(Self { shares })
    }

    #[must_use]
    pub fn share(&self, index: usize) -> u8 {
        self.shares.get(index).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn shares(&self) -> [u8; OPTION_COUNT] {
        self.shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_is_one_shot() {
        let mut lifelines = Lifelines::default();
        assert!(lifelines.consume(Lifeline::AskAi));
        assert!(!lifelines.consume(Lifeline::AskAi));
        assert!(!lifelines.is_available(Lifeline::AskAi));
        assert!(lifelines.is_available(Lifeline::FiftyFifty));
    }

    #[test]
    fn poll_must_total_one_hundred() {
        assert!(AudiencePoll::new([60, 20, 10, 10]).is_ok());
        assert_eq!(
            AudiencePoll::new([60, 20, 10, 5]).unwrap_err(),
            AudiencePollError::BadTotal(95)
        );
    }
}
