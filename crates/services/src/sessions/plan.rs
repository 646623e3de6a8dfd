use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;

use quiz_core::bank::{BankQuestion, QuestionBank};
use quiz_core::ladder::{DIFFICULTY_PLAN, GAME_LENGTH, prize_for};
use quiz_core::model::{Difficulty, Question, Topic};

/// Selection result for one game.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    /// Ten questions in ladder order: easy, then medium, then hard.
    pub questions: Vec<Question>,
    /// Difficulties whose unseen pool was too small, so seen questions were
    /// drawn back in.
    pub fallback: Vec<Difficulty>,
}

/// Draws a game's questions from the bank, preferring ones the player has not
/// answered correctly before.
pub struct QuestionSelector<'a> {
    bank: &'a QuestionBank,
}

impl<'a> QuestionSelector<'a> {
    #[must_use]
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self { bank }
    }

    /// Build the plan for `topic`.
    ///
    /// Each difficulty pool is filtered to unseen questions. When fewer than
    /// the required count remain, the full pool is used instead. Candidates are
    /// shuffled uniformly before taking the required count, and positions get
    /// sequential ids and prize labels.
    pub fn select<R: Rng + ?Sized>(
        &self,
        topic: Topic,
        seen: &BTreeSet<String>,
        rng: &mut R,
    ) -> SessionPlan {
        let mut questions = Vec::with_capacity(GAME_LENGTH);
        let mut fallback = Vec::new();

        for (difficulty, required) in DIFFICULTY_PLAN {
            let pool = self.bank.pool(topic, difficulty);
            let mut candidates: Vec<&BankQuestion> =
                pool.iter().filter(|q| !seen.contains(q.text())).collect();
            if candidates.len() < required {
                fallback.push(difficulty);
                candidates = pool.iter().collect();
            }

            candidates.shuffle(rng);
            for template in candidates.into_iter().take(required) {
                let index = questions.len();
                let position = u8::try_from(index + 1).unwrap_or(u8::MAX);
                let prize = prize_for(index).unwrap_or_default();
                questions.push(template.draw(position, prize, difficulty));
            }
        }

        SessionPlan {
            questions,
            fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::ladder::PRIZE_LADDER;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn bank() -> QuestionBank {
        QuestionBank::builtin().unwrap()
    }

    #[test]
    fn every_topic_yields_ten_questions_in_ladder_order() {
        let bank = bank();
        let selector = QuestionSelector::new(&bank);
        let mut rng = StdRng::seed_from_u64(7);

        for topic in Topic::ALL {
            let plan = selector.select(topic, &BTreeSet::new(), &mut rng);
            assert_eq!(plan.questions.len(), GAME_LENGTH);
            assert!(plan.fallback.is_empty());

            let difficulties: Vec<_> = plan.questions.iter().map(Question::difficulty).collect();
            assert_eq!(&difficulties[..4], &[Difficulty::Easy; 4]);
            assert_eq!(&difficulties[4..7], &[Difficulty::Medium; 3]);
            assert_eq!(&difficulties[7..], &[Difficulty::Hard; 3]);

            for (index, question) in plan.questions.iter().enumerate() {
                assert_eq!(usize::from(question.id()), index + 1);
                assert_eq!(question.prize(), PRIZE_LADDER[index]);
            }
        }
    }

    #[test]
    fn no_question_repeats_within_a_game() {
        let bank = bank();
        let selector = QuestionSelector::new(&bank);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = selector.select(Topic::Cografiya, &BTreeSet::new(), &mut rng);
            let texts: HashSet<_> = plan.questions.iter().map(Question::text).collect();
            assert_eq!(texts.len(), GAME_LENGTH);
        }
    }

    #[test]
    fn unseen_questions_are_preferred() {
        let bank = bank();
        let selector = QuestionSelector::new(&bank);
        let pool = bank.pool(Topic::Tarix, Difficulty::Easy);
        // Leave exactly four easy questions unseen.
        let seen: BTreeSet<String> = pool
            .iter()
            .skip(4)
            .map(|q| q.text().to_string())
            .collect();
        let unseen: HashSet<&str> = pool.iter().take(4).map(BankQuestion::text).collect();

        let mut rng = StdRng::seed_from_u64(3);
        let plan = selector.select(Topic::Tarix, &seen, &mut rng);
        assert!(plan.fallback.is_empty());
        for question in &plan.questions[..4] {
            assert!(unseen.contains(question.text()));
        }
    }

    #[test]
    fn exhausted_pool_falls_back_to_full_pool() {
        let bank = bank();
        let selector = QuestionSelector::new(&bank);
        let seen: BTreeSet<String> = bank
            .pool(Topic::Film, Difficulty::Hard)
            .iter()
            .map(|q| q.text().to_string())
            .collect();

        let mut rng = StdRng::seed_from_u64(11);
        let plan = selector.select(Topic::Film, &seen, &mut rng);
        assert_eq!(plan.fallback, vec![Difficulty::Hard]);
        assert_eq!(plan.questions.len(), GAME_LENGTH);
        let hard: HashSet<_> = plan.questions[7..].iter().map(Question::text).collect();
        assert_eq!(hard.len(), 3);
    }
}
