use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use std::fmt;

use quiz_core::model::{
    AudiencePoll, GameOutcome, Lifeline, Lifelines, LossReason, OPTION_COUNT, Question, SessionId,
    Topic,
};
use quiz_core::time::{
    QUESTION_TIME_LIMIT_SECS, audience_poll_delay, resolve_delay, reveal_delay, timer_tick,
};

use super::progress::SessionProgress;
use super::view::{OptionView, QuestionView};
use crate::error::GameError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where the current question is in its answer cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerState {
    /// Waiting for the player.
    Idle,
    /// Answer locked in, correctness not yet shown.
    Selected,
    Correct,
    Wrong,
}

/// Things that happened during a call to [`GameSession::poll`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    TimerTicked { time_left: u32 },
    AnswerRevealed {
        index: usize,
        selected: usize,
        correct: bool,
    },
    /// A correct answer; the text should be remembered against the account.
    QuestionSeen { text: String },
    QuestionStarted { index: usize },
    AudiencePollReady(AudiencePoll),
    Finished(GameOutcome),
}

/// Question and options handed to the hint provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintRequest {
    pub question: String,
    pub options: [String; OPTION_COUNT],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Reveal,
    Resolve,
    AudiencePoll,
}

/// A scheduled transition. It lives inside the session, so it disappears with it.
#[derive(Debug, Clone, Copy)]
struct Pending {
    transition: Transition,
    due: DateTime<Utc>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One playthrough of ten questions.
///
/// All timing is driven by [`GameSession::poll`]: the countdown and the single
/// pending transition each carry a due time, and `poll` fires whatever is due
/// in chronological order. Nothing runs in the background.
pub struct GameSession {
    id: SessionId,
    username: String,
    topic: Topic,
    questions: Vec<Question>,
    current: usize,
    lifelines: Lifelines,
    time_left: u32,
    next_tick: Option<DateTime<Utc>>,
    user_paused: bool,
    answer_state: AnswerState,
    selected: Option<usize>,
    hidden_options: Vec<usize>,
    audience: Option<AudiencePoll>,
    hint: Option<String>,
    hint_loading: bool,
    pending: Option<Pending>,
    /// Correct answers not yet written to the account.
    unsaved_seen: BTreeSet<String>,
    outcome: Option<GameOutcome>,
    outcome_recorded: bool,
    rng: StdRng,
}

impl GameSession {
    /// Start playing at the first question with every lifeline available.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoQuestions` if `questions` is empty.
    pub fn start(
        username: impl Into<String>,
        topic: Topic,
        questions: Vec<Question>,
        rng: StdRng,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        if questions.is_empty() {
            return Err(GameError::NoQuestions);
        }

        let mut session = Self {
            id: SessionId::new_random(),
            username: username.into(),
            topic,
            questions,
            current: 0,
            lifelines: Lifelines::default(),
            time_left: QUESTION_TIME_LIMIT_SECS,
            next_tick: None,
            user_paused: false,
            answer_state: AnswerState::Idle,
            selected: None,
            hidden_options: Vec::new(),
            audience: None,
            hint: None,
            hint_loading: false,
            pending: None,
            unsaved_seen: BTreeSet::new(),
            outcome: None,
            outcome_recorded: false,
            rng,
        };
        session.sync_timer(now);
        Ok(session)
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn topic(&self) -> Topic {
        self.topic
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    #[must_use]
    pub fn answer_state(&self) -> AnswerState {
        self.answer_state
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn lifelines(&self) -> Lifelines {
        self.lifelines
    }

    #[must_use]
    pub fn hidden_options(&self) -> &[usize] {
        &self.hidden_options
    }

    #[must_use]
    pub fn audience_poll(&self) -> Option<AudiencePoll> {
        self.audience
    }

    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    #[must_use]
    pub fn is_hint_loading(&self) -> bool {
        self.hint_loading
    }

    /// True while the countdown is stopped for any reason other than an answer.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.user_paused || self.lifeline_in_progress()
    }

    #[must_use]
    pub fn is_user_paused(&self) -> bool {
        self.user_paused
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn is_outcome_recorded(&self) -> bool {
        self.outcome_recorded
    }

    pub(crate) fn mark_outcome_recorded(&mut self) {
        self.outcome_recorded = true;
    }

    pub(crate) fn unsaved_seen(&self) -> &BTreeSet<String> {
        &self.unsaved_seen
    }

    pub(crate) fn clear_unsaved_seen(&mut self) {
        self.unsaved_seen.clear();
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            index: self.current,
            total: self.questions.len(),
            prize: self.current_question().map_or("", Question::prize),
            time_left: self.time_left,
            is_finished: self.is_finished(),
        }
    }

    /// Snapshot of the current question for rendering.
    #[must_use]
    pub fn view(&self) -> Option<QuestionView> {
        let question = self.current_question()?;
        let revealed = matches!(self.answer_state, AnswerState::Correct | AnswerState::Wrong);
        let options = question
            .options()
            .iter()
            .enumerate()
            .map(|(index, text)| OptionView {
                index,
                text: text.clone(),
                hidden: self.hidden_options.contains(&index),
                selected: self.selected == Some(index),
                audience_share: self.audience.map(|poll| poll.share(index)),
                revealed_correct: revealed.then(|| question.is_correct(index)),
            })
            .collect();

        Some(QuestionView {
            index: self.current,
            total: self.questions.len(),
            text: question.text().to_owned(),
            prize: question.prize(),
            difficulty: question.difficulty(),
            options,
            time_left: self.time_left,
            paused: self.is_paused(),
            answer_state: self.answer_state,
            lifelines: self.lifelines,
            hint: self.hint.clone(),
            hint_loading: self.hint_loading,
        })
    }

    //
    // ─── INTENTS ───────────────────────────────────────────────────────────────
    //

    /// Lock in an answer. Correctness is revealed by a later `poll`.
    ///
    /// # Errors
    ///
    /// Returns `GameError` if the game is over, an answer is already pending,
    /// the game is paused, a lifeline is in progress, or the option is out of
    /// range or hidden by 50:50.
    pub fn select_answer(&mut self, index: usize, now: DateTime<Utc>) -> Result<(), GameError> {
        self.ensure_awaiting_answer()?;
        self.ensure_unpaused()?;
        if index >= OPTION_COUNT || self.hidden_options.contains(&index) {
            return Err(GameError::InvalidOption(index));
        }

        self.selected = Some(index);
        self.answer_state = AnswerState::Selected;
        self.pending = Some(Pending {
            transition: Transition::Reveal,
            due: now + reveal_delay(),
        });
        self.sync_timer(now);
        Ok(())
    }

    /// Hide two of the three wrong options. Returns the hidden indices.
    ///
    /// # Errors
    ///
    /// Returns `GameError` if the game is not waiting for an answer or the
    /// lifeline is gone.
    pub fn use_fifty_fifty(&mut self) -> Result<[usize; 2], GameError> {
        self.ensure_awaiting_answer()?;
        let question = self.current_question().ok_or(GameError::Finished)?;
        let mut wrong = question.wrong_indices();
        self.consume(Lifeline::FiftyFifty)?;

        wrong.shuffle(&mut self.rng);
        let mut hidden = [wrong[0], wrong[1]];
        hidden.sort_unstable();
        self.hidden_options = hidden.to_vec();
        Ok(hidden)
    }

    /// Stop the countdown and poll the audience; the result arrives via `poll`.
    ///
    /// # Errors
    ///
    /// Returns `GameError` if the game is not waiting for an answer, another
    /// lifeline is running, or the lifeline is gone.
    pub fn ask_audience(&mut self, now: DateTime<Utc>) -> Result<(), GameError> {
        self.ensure_awaiting_answer()?;
        self.ensure_unpaused()?;
        self.consume(Lifeline::AskAudience)?;

        self.pending = Some(Pending {
            transition: Transition::AudiencePoll,
            due: now + audience_poll_delay(),
        });
        self.sync_timer(now);
        Ok(())
    }

    /// Stop the countdown and hand out the question for an external hint.
    ///
    /// The session stays in the loading state until [`GameSession::finish_hint`].
    ///
    /// # Errors
    ///
    /// Returns `GameError` if the game is not waiting for an answer, another
    /// lifeline is running, or the lifeline is gone.
    pub fn begin_hint(&mut self, now: DateTime<Utc>) -> Result<HintRequest, GameError> {
        self.ensure_awaiting_answer()?;
        self.ensure_unpaused()?;
        let question = self.current_question().ok_or(GameError::Finished)?;
        let request = HintRequest {
            question: question.text().to_owned(),
            options: question.options().clone(),
        };
        self.consume(Lifeline::AskAi)?;

        self.hint_loading = true;
        self.sync_timer(now);
        Ok(request)
    }

    /// Store the hint (if any) and restart the countdown.
    pub fn finish_hint(&mut self, hint: Option<String>, now: DateTime<Utc>) {
        if !self.hint_loading {
            return;
        }
        self.hint_loading = false;
        self.hint = hint
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        self.sync_timer(now);
    }

    /// Stop the countdown while the player is away from the game screen.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Finished` once the game is over.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), GameError> {
        self.ensure_playing()?;
        self.user_paused = true;
        self.sync_timer(now);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `GameError::Finished` once the game is over.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), GameError> {
        self.ensure_playing()?;
        self.user_paused = false;
        self.sync_timer(now);
        Ok(())
    }

    //
    // ─── TIME ──────────────────────────────────────────────────────────────────
    //

    /// Fire every tick and transition due at or before `now`, oldest first.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while !self.is_finished() {
            let tick = self.next_tick.filter(|at| *at <= now);
            let pending = self.pending.filter(|p| p.due <= now);
            match (tick, pending) {
                (None, None) => break,
                (Some(at), Some(p)) if p.due < at => self.fire(p, &mut events),
                (Some(at), _) => self.fire_tick(at, &mut events),
                (None, Some(p)) => self.fire(p, &mut events),
            }
        }
        events
    }

    fn fire_tick(&mut self, at: DateTime<Utc>, events: &mut Vec<GameEvent>) {
        self.time_left = self.time_left.saturating_sub(1);
        events.push(GameEvent::TimerTicked {
            time_left: self.time_left,
        });
        if self.time_left == 0 {
            self.finish(
                GameOutcome::lost(self.topic, self.current, LossReason::Timeout),
                events,
            );
        } else {
            self.next_tick = Some(at + timer_tick());
        }
    }

    fn fire(&mut self, pending: Pending, events: &mut Vec<GameEvent>) {
        self.pending = None;
        match pending.transition {
            Transition::Reveal => self.reveal(pending.due, events),
            Transition::Resolve => self.resolve(pending.due, events),
            Transition::AudiencePoll => self.deliver_audience_poll(pending.due, events),
        }
    }

    fn reveal(&mut self, at: DateTime<Utc>, events: &mut Vec<GameEvent>) {
        let (Some(selected), Some(question)) = (self.selected, self.questions.get(self.current))
        else {
            return;
        };
        let correct = question.is_correct(selected);
        let text = question.text().to_owned();

        self.answer_state = if correct {
            AnswerState::Correct
        } else {
            AnswerState::Wrong
        };
        events.push(GameEvent::AnswerRevealed {
            index: self.current,
            selected,
            correct,
        });
        if correct {
            self.unsaved_seen.insert(text.clone());
            events.push(GameEvent::QuestionSeen { text });
        }
        self.pending = Some(Pending {
            transition: Transition::Resolve,
            due: at + resolve_delay(),
        });
    }

    fn resolve(&mut self, at: DateTime<Utc>, events: &mut Vec<GameEvent>) {
        match self.answer_state {
            AnswerState::Correct if self.current + 1 >= self.questions.len() => {
                self.finish(GameOutcome::won(self.topic, self.current), events);
            }
            AnswerState::Correct => {
                self.current += 1;
                self.reset_question_state();
                self.sync_timer(at);
                events.push(GameEvent::QuestionStarted {
                    index: self.current,
                });
            }
            _ => {
                self.finish(
                    GameOutcome::lost(self.topic, self.current, LossReason::Wrong),
                    events,
                );
            }
        }
    }

    fn deliver_audience_poll(&mut self, at: DateTime<Utc>, events: &mut Vec<GameEvent>) {
        if let Some(question) = self.questions.get(self.current) {
            let shares = audience_shares(question, &mut self.rng);
            match AudiencePoll::new(shares) {
                Ok(poll) => {
                    self.audience = Some(poll);
                    events.push(GameEvent::AudiencePollReady(poll));
                }
                Err(err) => tracing::warn!(session_id = %self.id, %err, "discarded audience poll"),
            }
        }
        self.sync_timer(at);
    }

    fn finish(&mut self, outcome: GameOutcome, events: &mut Vec<GameEvent>) {
        self.pending = None;
        self.next_tick = None;
        self.hint_loading = false;
        self.outcome = Some(outcome.clone());
        events.push(GameEvent::Finished(outcome));
    }

    fn reset_question_state(&mut self) {
        self.selected = None;
        self.answer_state = AnswerState::Idle;
        self.hidden_options.clear();
        self.audience = None;
        self.hint = None;
        self.hint_loading = false;
        self.time_left = QUESTION_TIME_LIMIT_SECS;
        self.user_paused = false;
    }

    fn timer_should_run(&self) -> bool {
        !self.is_finished()
            && self.answer_state == AnswerState::Idle
            && !self.user_paused
            && !self.lifeline_in_progress()
    }

    /// Start or stop the countdown to match the current state. A restarted
    /// countdown waits a full second before its next tick.
    fn sync_timer(&mut self, now: DateTime<Utc>) {
        if !self.timer_should_run() {
            self.next_tick = None;
        } else if self.next_tick.is_none() {
            self.next_tick = Some(now + timer_tick());
        }
    }

    fn lifeline_in_progress(&self) -> bool {
        self.hint_loading
            || self
                .pending
                .is_some_and(|p| p.transition == Transition::AudiencePoll)
    }

    //
    // ─── GUARDS ────────────────────────────────────────────────────────────────
    //

    fn ensure_playing(&self) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::Finished);
        }
        Ok(())
    }

    fn ensure_awaiting_answer(&self) -> Result<(), GameError> {
        self.ensure_playing()?;
        if self.answer_state != AnswerState::Idle {
            return Err(GameError::AnswerPending);
        }
        Ok(())
    }

    fn ensure_unpaused(&self) -> Result<(), GameError> {
        if self.lifeline_in_progress() {
            return Err(GameError::LifelineInProgress);
        }
        if self.user_paused {
            return Err(GameError::Paused);
        }
        Ok(())
    }

    fn consume(&mut self, lifeline: Lifeline) -> Result<(), GameError> {
        if !self.lifelines.consume(lifeline) {
            return Err(GameError::LifelineUsed(lifeline));
        }
        Ok(())
    }
}

/// Correct option gets 50..=79%; the rest is cut twice at random and spread
/// over the wrong options in ascending index order.
fn audience_shares<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> [u8; OPTION_COUNT] {
    let correct_share: u8 = rng.random_range(50..80);
    let remaining = 100 - correct_share;
    let first = rng.random_range(0..remaining);
    let second = rng.random_range(0..remaining - first);
    let third = remaining - first - second;

    let mut shares = [0_u8; OPTION_COUNT];
    if let Some(slot) = shares.get_mut(question.correct_index()) {
        *slot = correct_share;
    }
    for (index, share) in question.wrong_indices().into_iter().zip([first, second, third]) {
        if let Some(slot) = shares.get_mut(index) {
            *slot = share;
        }
    }
    shares
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("topic", &self.topic)
            .field("current", &self.current)
            .field("time_left", &self.time_left)
            .field("answer_state", &self.answer_state)
            .field("pending", &self.pending)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
