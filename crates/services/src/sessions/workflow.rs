use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use quiz_core::bank::QuestionBank;
use quiz_core::model::{Account, GameOutcome, Topic};
use storage::repository::AccountRepository;

use super::plan::QuestionSelector;
use super::service::{GameEvent, GameSession};
use crate::Clock;
use crate::error::GameError;
use crate::hint_service::HintProvider;

/// What one [`GameLoopService::poll`] produced.
///
/// Events are always delivered, even when recording the outcome failed.
#[derive(Debug)]
pub struct PollReport {
    pub events: Vec<GameEvent>,
    /// Set when the finished game could not be written; the next poll retries.
    pub record_error: Option<GameError>,
}

/// Orchestrates game start, timed transitions and persisted results.
#[derive(Clone)]
pub struct GameLoopService {
    clock: Clock,
    bank: Arc<QuestionBank>,
    accounts: Arc<dyn AccountRepository>,
    hints: Arc<dyn HintProvider>,
    seed: Option<u64>,
}

impl GameLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        bank: Arc<QuestionBank>,
        accounts: Arc<dyn AccountRepository>,
        hints: Arc<dyn HintProvider>,
    ) -> Self {
        Self {
            clock,
            bank,
            accounts,
            hints,
            seed: None,
        }
    }

    /// Make question selection and lifeline randomness reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Start a new game for `username` on `topic`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::AccountNotFound` for unknown users,
    /// `GameError::TopicCompleted` if the topic was already won,
    /// `GameError::NoQuestions` if the bank has nothing for the topic,
    /// or `GameError::Storage` on backend failures.
    pub async fn start_game(&self, username: &str, topic: Topic) -> Result<GameSession, GameError> {
        let account = self.load_account(username).await?;
        if account.has_completed(topic) {
            return Err(GameError::TopicCompleted(topic));
        }

        let mut rng = self.session_rng();
        let plan = QuestionSelector::new(&self.bank).select(
            topic,
            account.seen_questions(),
            &mut rng,
        );
        if !plan.fallback.is_empty() {
            tracing::debug!(
                username,
                %topic,
                fallback = ?plan.fallback,
                "unseen pool exhausted, reusing seen questions"
            );
        }

        let session = GameSession::start(username, topic, plan.questions, rng, self.clock.now())?;
        tracing::info!(session_id = %session.id(), username, %topic, "game started");
        Ok(session)
    }

    /// # Errors
    ///
    /// See [`GameSession::select_answer`].
    pub fn select_answer(&self, session: &mut GameSession, index: usize) -> Result<(), GameError> {
        session.select_answer(index, self.clock.now())
    }

    /// # Errors
    ///
    /// See [`GameSession::use_fifty_fifty`].
    pub fn use_fifty_fifty(&self, session: &mut GameSession) -> Result<[usize; 2], GameError> {
        session.use_fifty_fifty()
    }

    /// # Errors
    ///
    /// See [`GameSession::ask_audience`].
    pub fn ask_audience(&self, session: &mut GameSession) -> Result<(), GameError> {
        session.ask_audience(self.clock.now())
    }

    /// Ask the hint provider about the current question.
    ///
    /// A failing provider is logged and leaves the session without a hint;
    /// the lifeline stays consumed either way.
    ///
    /// # Errors
    ///
    /// Returns `GameError` if the lifeline cannot be used right now.
    pub async fn ask_ai(&self, session: &mut GameSession) -> Result<Option<String>, GameError> {
        let request = session.begin_hint(self.clock.now())?;
        let hint = match self.hints.hint(&request.question, &request.options).await {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(session_id = %session.id(), %err, "hint request failed");
                None
            }
        };
        session.finish_hint(hint, self.clock.now());
        Ok(session.hint().map(str::to_owned))
    }

    /// # Errors
    ///
    /// Returns `GameError::Finished` once the game is over.
    pub fn pause(&self, session: &mut GameSession) -> Result<(), GameError> {
        session.pause(self.clock.now())
    }

    /// # Errors
    ///
    /// Returns `GameError::Finished` once the game is over.
    pub fn resume(&self, session: &mut GameSession) -> Result<(), GameError> {
        session.resume(self.clock.now())
    }

    /// Advance the session to the clock's current time.
    pub async fn poll(&self, session: &mut GameSession) -> PollReport {
        self.poll_at(session, self.clock.now()).await
    }

    /// Fire everything due by `now`, persisting newly seen questions and the
    /// final outcome as they happen.
    ///
    /// Seen questions stay on the session until a write succeeds, so a
    /// failed write is retried on the next poll. A failed outcome write is
    /// reported alongside the events; the session keeps the outcome so the
    /// next poll or [`GameLoopService::finalize_outcome`] can retry it.
    pub async fn poll_at(&self, session: &mut GameSession, now: DateTime<Utc>) -> PollReport {
        let events = session.poll(now);

        let mut record_error = None;
        if session.is_finished() && !session.is_outcome_recorded() {
            record_error = self.finalize_outcome(session).await.err();
        } else {
            self.flush_seen(session).await;
        }
        PollReport {
            events,
            record_error,
        }
    }

    /// Fold the finished game into the account, exactly once.
    ///
    /// Questions answered correctly but not yet saved go into the same write.
    /// Calling this again after success returns the same outcome without
    /// touching storage.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NotFinished` if the game is still running,
    /// `GameError::AccountNotFound` if the account vanished,
    /// or `GameError::Storage` if persistence fails.
    pub async fn finalize_outcome(
        &self,
        session: &mut GameSession,
    ) -> Result<GameOutcome, GameError> {
        let outcome = session.outcome().cloned().ok_or(GameError::NotFinished)?;
        if session.is_outcome_recorded() {
            return Ok(outcome);
        }

        let mut account = self.load_account(session.username()).await?;
        for text in session.unsaved_seen() {
            account.record_seen(text);
        }
        account.apply_outcome(&outcome);
        self.accounts.update(&account).await?;
        session.clear_unsaved_seen();
        session.mark_outcome_recorded();

        tracing::info!(
            session_id = %session.id(),
            username = session.username(),
            topic = %outcome.topic(),
            won = outcome.is_won(),
            points = outcome.points(),
            "game finished"
        );
        Ok(outcome)
    }

    /// Leave a running game. Nothing is recorded and all pending transitions
    /// are dropped with the session.
    pub fn abandon(&self, session: GameSession) {
        tracing::info!(
            session_id = %session.id(),
            username = session.username(),
            index = session.current_index(),
            "game abandoned"
        );
        drop(session);
    }

    async fn flush_seen(&self, session: &mut GameSession) {
        if session.unsaved_seen().is_empty() {
            return;
        }
        let written = self
            .record_seen(session.username(), session.unsaved_seen())
            .await;
        match written {
            Ok(()) => session.clear_unsaved_seen(),
            Err(err) => tracing::warn!(
                session_id = %session.id(),
                %err,
                pending = session.unsaved_seen().len(),
                "failed to record seen questions, will retry"
            ),
        }
    }

    async fn record_seen(&self, username: &str, texts: &BTreeSet<String>) -> Result<(), GameError> {
        let mut account = self.load_account(username).await?;
        let mut changed = false;
        for text in texts {
            changed |= account.record_seen(text);
        }
        if changed {
            self.accounts.update(&account).await?;
        }
        Ok(())
    }

    async fn load_account(&self, username: &str) -> Result<Account, GameError> {
        self.accounts
            .find_by_username(username)
            .await?
            .ok_or_else(|| GameError::AccountNotFound(username.to_string()))
    }

    fn session_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}
