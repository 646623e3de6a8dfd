use serde::{Deserialize, Serialize};
use std::fmt;

/// Every question has exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// Letter shown next to an option (`A`..`D`).
#[must_use]
pub fn option_label(index: usize) -> char {
    match index {
        0 => 'A',
        1 => 'B',
        2 => 'C',
        _ => 'D',
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        })
    }
}

/// A question drawn into a game. Immutable once drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: u8,
    text: String,
    options: [String; OPTION_COUNT],
    correct_index: usize,
    prize: &'static str,
    difficulty: Difficulty,
}

impl Question {
    /// Callers guarantee `correct_index < OPTION_COUNT`; the bank validates it on load.
    #[must_use]
    pub fn new(
        id: u8,
        text: String,
        options: [String; OPTION_COUNT],
        correct_index: usize,
        prize: &'static str,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id,
            text,
            options,
            correct_index,
            prize,
            difficulty,
        }
    }

    /// Position on the ladder, starting at 1.
    #[must_use]
    pub fn id(&self) -> u8 {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn prize(&self) -> &'static str {
        self.prize
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }

    /// Indices of the three wrong options, ascending.
    #[must_use]
    pub fn wrong_indices(&self) -> [usize; OPTION_COUNT - 1] {
        let mut wrong = [0; OPTION_COUNT - 1];
        let mut slot = 0;
        for index in (0..OPTION_COUNT).filter(|i| *i != self.correct_index) {
            if let Some(cell) = wrong.get_mut(slot) {
                *cell = index;
            }
            slot += 1;
        }
        wrong
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question::new(
            1,
            "Azərbaycanın paytaxtı haradır?".into(),
            ["Gəncə".into(), "Bakı".into(), "Sumqayıt".into(), "Lənkəran".into()],
            1,
            "100 ₼",
            Difficulty::Easy,
        )
    }

    #[test]
    fn wrong_indices_skip_the_answer() {
        assert_eq!(sample().wrong_indices(), [0, 2, 3]);
        assert!(sample().is_correct(1));
        assert!(!sample().is_correct(0));
    }

    #[test]
    fn labels_options_by_letter() {
        assert_eq!(option_label(0), 'A');
        assert_eq!(option_label(3), 'D');
    }
}
