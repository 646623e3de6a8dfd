//! Static per-topic, per-difficulty question pools.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::ladder::required_for;
use crate::model::{Difficulty, OPTION_COUNT, Question, Topic};

const BUILTIN_QUESTIONS: &str = include_str!("../data/questions.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("question bank data is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{topic:?}: question text cannot be empty")]
    EmptyText { topic: Topic },

    #[error("{topic:?}: correct index {index} out of range for {text:?}")]
    CorrectIndexOutOfRange {
        topic: Topic,
        text: String,
        index: usize,
    },

    #[error("{topic:?}: duplicate question text {text:?}")]
    DuplicateText { topic: Topic, text: String },

    #[error("{topic:?}/{difficulty}: {available} questions, a game needs {required}")]
    PoolTooSmall {
        topic: Topic,
        difficulty: Difficulty,
        available: usize,
        required: usize,
    },
}

/// One entry in the bank, before it is drawn into a game.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BankEntry {
    pub topic: Topic,
    pub difficulty: Difficulty,
    pub text: String,
    pub options: [String; OPTION_COUNT],
    #[serde(rename = "correct")]
    pub correct_index: usize,
}

/// A pooled question template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankQuestion {
    text: String,
    options: [String; OPTION_COUNT],
    correct_index: usize,
}

impl BankQuestion {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Place this template on the ladder at `position` (1-based).
    #[must_use]
    pub fn draw(&self, position: u8, prize: &'static str, difficulty: Difficulty) -> Question {
        Question::new(
            position,
            self.text.clone(),
            self.options.clone(),
            self.correct_index,
            prize,
            difficulty,
        )
    }
}

#[derive(Debug, Clone, Default)]
struct TopicPools {
    easy: Vec<BankQuestion>,
    medium: Vec<BankQuestion>,
    hard: Vec<BankQuestion>,
}

impl TopicPools {
    fn pool(&self, difficulty: Difficulty) -> &[BankQuestion] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    fn pool_mut(&mut self, difficulty: Difficulty) -> &mut Vec<BankQuestion> {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }
}

/// Validated question bank covering every topic.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    topics: HashMap<Topic, TopicPools>,
}

impl QuestionBank {
    /// The bank shipped with the game.
    ///
    /// # Errors
    ///
    /// Returns `BankError` if the embedded data fails to parse or validate.
    pub fn builtin() -> Result<Self, BankError> {
        Self::from_json(BUILTIN_QUESTIONS)
    }

    /// # Errors
    ///
    /// Returns `BankError::Parse` for malformed JSON, or any validation error
    /// from [`QuestionBank::from_entries`].
    pub fn from_json(raw: &str) -> Result<Self, BankError> {
        let entries: Vec<BankEntry> = serde_json::from_str(raw)?;
        Self::from_entries(entries)
    }

    /// Build and validate a bank.
    ///
    /// Question text must be unique within a topic, across difficulties, since
    /// the text is what accounts remember as "seen".
    ///
    /// # Errors
    ///
    /// Returns the first `BankError` found.
    pub fn from_entries(entries: impl IntoIterator<Item = BankEntry>) -> Result<Self, BankError> {
        let mut topics: HashMap<Topic, TopicPools> = HashMap::new();
        let mut texts: HashMap<Topic, HashSet<String>> = HashMap::new();

        for entry in entries {
            let text = entry.text.trim().to_string();
            if text.is_empty() {
                return Err(BankError::EmptyText { topic: entry.topic });
            }
            if entry.correct_index >= OPTION_COUNT {
                return Err(BankError::CorrectIndexOutOfRange {
                    topic: entry.topic,
                    text,
                    index: entry.correct_index,
                });
            }
            if !texts.entry(entry.topic).or_default().insert(text.clone()) {
                return Err(BankError::DuplicateText {
                    topic: entry.topic,
                    text,
                });
            }

            topics
                .entry(entry.topic)
                .or_default()
                .pool_mut(entry.difficulty)
                .push(BankQuestion {
                    text,
                    options: entry.options,
                    correct_index: entry.correct_index,
                });
        }

        for topic in Topic::ALL {
            let pools = topics.get(&topic);
            for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
                let available = pools.map_or(0, |p| p.pool(difficulty).len());
                let required = required_for(difficulty);
                if available < required {
                    return Err(BankError::PoolTooSmall {
                        topic,
                        difficulty,
                        available,
                        required,
                    });
                }
            }
        }

        Ok(Self { topics })
    }

    /// All templates for a topic and difficulty.
    #[must_use]
    pub fn pool(&self, topic: Topic, difficulty: Difficulty) -> &[BankQuestion] {
        self.topics
            .get(&topic)
            .map(|pools| pools.pool(difficulty))
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.topics
            .values()
            .map(|p| p.easy.len() + p.medium.len() + p.hard.len())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(topic: Topic, difficulty: Difficulty, text: &str) -> BankEntry {
        BankEntry {
            topic,
            difficulty,
            text: text.into(),
            options: ["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 0,
        }
    }

    fn minimal_entries() -> Vec<BankEntry> {
        let mut out = Vec::new();
        for topic in Topic::ALL {
            for (difficulty, count) in crate::ladder::DIFFICULTY_PLAN {
                for n in 0..count {
                    out.push(entry(topic, difficulty, &format!("{topic:?} {difficulty} {n}")));
                }
            }
        }
        out
    }

    #[test]
    fn builtin_bank_loads_every_topic() {
        let bank = QuestionBank::builtin().unwrap();
        assert_eq!(bank.len(), 143);
        for topic in Topic::ALL {
            for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
                assert!(bank.pool(topic, difficulty).len() >= 7, "{topic:?} {difficulty}");
            }
        }
    }

    #[test]
    fn minimal_bank_is_accepted() {
        let bank = QuestionBank::from_entries(minimal_entries()).unwrap();
        assert_eq!(bank.pool(Topic::Film, Difficulty::Easy).len(), 4);
    }

    #[test]
    fn rejects_duplicate_text_within_topic() {
        let mut entries = minimal_entries();
        entries.push(entry(Topic::Din, Difficulty::Hard, "Din easy 0"));
        let err = QuestionBank::from_entries(entries).unwrap_err();
        assert!(matches!(err, BankError::DuplicateText { topic: Topic::Din, .. }));
    }

    #[test]
    fn same_text_in_another_topic_is_allowed() {
        let mut entries = minimal_entries();
        entries.push(entry(Topic::Film, Difficulty::Hard, "Din easy 0"));
        assert!(QuestionBank::from_entries(entries).is_ok());
    }

    #[test]
    fn rejects_short_pools() {
        let entries: Vec<_> = minimal_entries()
            .into_iter()
            .filter(|e| !(e.topic == Topic::Tarix && e.text.ends_with("medium 0")))
            .collect();
        let err = QuestionBank::from_entries(entries).unwrap_err();
        assert!(matches!(
            err,
            BankError::PoolTooSmall {
                topic: Topic::Tarix,
                difficulty: Difficulty::Medium,
                available: 2,
                required: 3,
            }
        ));
    }

    #[test]
    fn rejects_bad_correct_index() {
        let mut entries = minimal_entries();
        let mut bad = entry(Topic::Film, Difficulty::Easy, "extra");
        bad.correct_index = 4;
        entries.push(bad);
        assert!(matches!(
            QuestionBank::from_entries(entries).unwrap_err(),
            BankError::CorrectIndexOutOfRange { index: 4, .. }
        ));
    }
}
