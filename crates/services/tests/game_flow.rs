use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use quiz_core::bank::QuestionBank;
use quiz_core::model::{
    Account, Gender, Lifeline, LossReason, OPTION_COUNT, RegistrationDraft, Topic,
};
use quiz_core::time::fixed_now;
use services::{
    AccountService, Clock, GameError, GameEvent, GameLoopService, GameSession, HintError,
    HintProvider,
};
use storage::repository::AccountRepository;
use storage::{Storage, StorageError};

struct FakeHints {
    reply: Option<&'static str>,
    calls: AtomicUsize,
}

impl FakeHints {
    fn replying(reply: &'static str) -> Self {
        Self {
            reply: Some(reply),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl HintProvider for FakeHints {
    async fn hint(
        &self,
        _question: &str,
        _options: &[String; OPTION_COUNT],
    ) -> Result<String, HintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .map(str::to_string)
            .ok_or(HintError::EmptyResponse)
    }
}

/// Delegates to a real repository but refuses `update` while `offline` is set.
struct FlakyAccounts {
    inner: Arc<dyn AccountRepository>,
    offline: AtomicBool,
}

impl FlakyAccounts {
    fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountRepository for FlakyAccounts {
    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, StorageError> {
        self.inner.find_by_credentials(username, password).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StorageError> {
        self.inner.find_by_username(username).await
    }

    async fn is_username_taken(&self, username: &str) -> Result<bool, StorageError> {
        self.inner.is_username_taken(username).await
    }

    async fn create(&self, account: &Account) -> Result<(), StorageError> {
        self.inner.create(account).await
    }

    async fn update(&self, account: &Account) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("offline".into()));
        }
        self.inner.update(account).await
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StorageError> {
        self.inner.list_accounts().await
    }
}

struct Harness {
    accounts: AccountService,
    game: GameLoopService,
}

async fn harness(hints: Arc<dyn HintProvider>) -> Harness {
    let storage = Storage::in_memory();
    harness_with(Arc::clone(&storage.accounts), hints).await
}

async fn harness_with(repo: Arc<dyn AccountRepository>, hints: Arc<dyn HintProvider>) -> Harness {
    let accounts = AccountService::new(Arc::clone(&repo));
    accounts
        .register(RegistrationDraft {
            username: "leyla".into(),
            password: "secret".into(),
            name: "Leyla".into(),
            age: "27".into(),
            gender: Some(Gender::Female),
        })
        .await
        .unwrap();

    let game = GameLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::new(QuestionBank::builtin().unwrap()),
        repo,
        hints,
    )
    .with_seed(7);

    Harness {
        accounts,
        game,
    }
}

/// Intents are stamped with the fixed clock, so each answer resolves by
/// `fixed_now() + 4s` without a countdown tick in between.
fn resolved() -> DateTime<Utc> {
    fixed_now() + Duration::seconds(4)
}

fn correct(session: &GameSession) -> usize {
    session.current_question().unwrap().correct_index()
}

async fn answer(h: &Harness, session: &mut GameSession, index: usize) -> Vec<GameEvent> {
    h.game.select_answer(session, index).unwrap();
    h.game.poll_at(session, resolved()).await.events
}

#[tokio::test]
async fn winning_run_records_points_and_completes_topic() {
    let h = harness(Arc::new(FakeHints::failing())).await;
    let mut session = h.game.start_game("leyla", Topic::Cografiya).await.unwrap();

    for _ in 0..10 {
        let index = correct(&session);
        answer(&h, &mut session, index).await;
    }

    let outcome = session.outcome().unwrap();
    assert!(outcome.is_won());
    assert_eq!(outcome.points(), 6_000);
    assert!(session.is_outcome_recorded());

    let account = h.accounts.account("leyla").await.unwrap();
    assert_eq!(account.total_points(), 6_000);
    assert_eq!(account.games_played(), 1);
    assert!(account.has_completed(Topic::Cografiya));
    assert_eq!(account.seen_questions().len(), 10);

    let err = h
        .game
        .start_game("leyla", Topic::Cografiya)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::TopicCompleted(Topic::Cografiya)));
}

#[tokio::test]
async fn wrong_answer_on_fourth_question_scores_150() {
    let h = harness(Arc::new(FakeHints::failing())).await;
    let mut session = h.game.start_game("leyla", Topic::Din).await.unwrap();

    for _ in 0..3 {
        let index = correct(&session);
        answer(&h, &mut session, index).await;
    }
    let wrong = session.current_question().unwrap().wrong_indices()[0];
    answer(&h, &mut session, wrong).await;

    let outcome = session.outcome().unwrap();
    assert_eq!(outcome.loss_reason(), Some(LossReason::Wrong));
    assert_eq!(outcome.points(), 150);

    let account = h.accounts.account("leyla").await.unwrap();
    assert_eq!(account.total_points(), 150);
    assert_eq!(account.games_played(), 1);
    assert!(!account.has_completed(Topic::Din));
    assert_eq!(account.seen_questions().len(), 3);
}

#[tokio::test]
async fn timeout_on_first_question_scores_zero_but_counts_game() {
    let h = harness(Arc::new(FakeHints::failing())).await;
    let mut session = h.game.start_game("leyla", Topic::Film).await.unwrap();

    let report = h
        .game
        .poll_at(&mut session, fixed_now() + Duration::seconds(30))
        .await;
    assert!(report.record_error.is_none());
    let events = report.events;
    assert!(matches!(events.last(), Some(GameEvent::Finished(_))));
    assert_eq!(
        session.outcome().unwrap().loss_reason(),
        Some(LossReason::Timeout)
    );

    let account = h.accounts.account("leyla").await.unwrap();
    assert_eq!(account.total_points(), 0);
    assert_eq!(account.games_played(), 1);
}

#[tokio::test]
async fn outcome_is_recorded_exactly_once() {
    let h = harness(Arc::new(FakeHints::failing())).await;
    let mut session = h.game.start_game("leyla", Topic::Tarix).await.unwrap();
    h.game
        .poll_at(&mut session, fixed_now() + Duration::seconds(30))
        .await;

    h.game.finalize_outcome(&mut session).await.unwrap();
    let report = h
        .game
        .poll_at(&mut session, fixed_now() + Duration::seconds(60))
        .await;
    assert!(report.record_error.is_none());

    let account = h.accounts.account("leyla").await.unwrap();
    assert_eq!(account.games_played(), 1);
}

#[tokio::test]
async fn finalize_before_finish_is_rejected() {
    let h = harness(Arc::new(FakeHints::failing())).await;
    let mut session = h.game.start_game("leyla", Topic::Tarix).await.unwrap();
    let err = h.game.finalize_outcome(&mut session).await.unwrap_err();
    assert!(matches!(err, GameError::NotFinished));
}

#[tokio::test]
async fn seen_questions_are_avoided_next_game() {
    let h = harness(Arc::new(FakeHints::failing())).await;
    let mut first = h.game.start_game("leyla", Topic::Tarix).await.unwrap();
    for _ in 0..3 {
        let index = correct(&first);
        answer(&h, &mut first, index).await;
    }
    let wrong = first.current_question().unwrap().wrong_indices()[0];
    answer(&h, &mut first, wrong).await;

    let account = h.accounts.account("leyla").await.unwrap();
    assert_eq!(account.seen_questions().len(), 3);

    let second = h.game.start_game("leyla", Topic::Tarix).await.unwrap();
    for question in second.questions() {
        assert!(!account.seen_questions().contains(question.text()));
    }
}

async fn flaky_harness() -> (Arc<FlakyAccounts>, Harness) {
    let storage = Storage::in_memory();
    let flaky = Arc::new(FlakyAccounts {
        inner: Arc::clone(&storage.accounts),
        offline: AtomicBool::new(false),
    });
    let h = harness_with(
        Arc::clone(&flaky) as Arc<dyn AccountRepository>,
        Arc::new(FakeHints::failing()),
    )
    .await;
    (flaky, h)
}

#[tokio::test]
async fn seen_question_survives_failed_write() {
    let (flaky, h) = flaky_harness().await;
    let mut session = h.game.start_game("leyla", Topic::Tarix).await.unwrap();
    let first = session.current_question().unwrap().text().to_owned();

    flaky.set_offline(true);
    let index = correct(&session);
    let events = answer(&h, &mut session, index).await;
    assert!(events.contains(&GameEvent::QuestionSeen {
        text: first.clone()
    }));
    let account = h.accounts.account("leyla").await.unwrap();
    assert!(account.seen_questions().is_empty());

    flaky.set_offline(false);
    let wrong = session.current_question().unwrap().wrong_indices()[0];
    answer(&h, &mut session, wrong).await;
    assert!(session.is_outcome_recorded());

    let account = h.accounts.account("leyla").await.unwrap();
    assert_eq!(account.seen_questions().len(), 1);
    assert!(account.seen_questions().contains(&first));
    assert_eq!(account.games_played(), 1);
    assert_eq!(account.total_points(), 50);
}

#[tokio::test]
async fn finish_is_reported_even_when_outcome_write_fails() {
    let (flaky, h) = flaky_harness().await;
    let mut session = h.game.start_game("leyla", Topic::Film).await.unwrap();

    flaky.set_offline(true);
    let report = h
        .game
        .poll_at(&mut session, fixed_now() + Duration::seconds(30))
        .await;
    assert!(matches!(report.events.last(), Some(GameEvent::Finished(_))));
    assert!(matches!(report.record_error, Some(GameError::Storage(_))));
    assert!(!session.is_outcome_recorded());
    let account = h.accounts.account("leyla").await.unwrap();
    assert_eq!(account.games_played(), 0);

    // The next poll retries the write without replaying the finish.
    flaky.set_offline(false);
    let report = h
        .game
        .poll_at(&mut session, fixed_now() + Duration::seconds(31))
        .await;
    assert!(report.record_error.is_none());
    assert!(
        !report
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::Finished(_)))
    );
    assert!(session.is_outcome_recorded());
    let account = h.accounts.account("leyla").await.unwrap();
    assert_eq!(account.games_played(), 1);
}

#[tokio::test]
async fn ask_ai_stores_hint_and_consumes_lifeline() {
    let hints = Arc::new(FakeHints::replying("Cənubi Qafqazı düşün."));
    let h = harness(Arc::clone(&hints) as Arc<dyn HintProvider>).await;
    let mut session = h.game.start_game("leyla", Topic::Incesenet).await.unwrap();

    let hint = h.game.ask_ai(&mut session).await.unwrap();
    assert_eq!(hint.as_deref(), Some("Cənubi Qafqazı düşün."));
    assert!(!session.lifelines().is_available(Lifeline::AskAi));
    assert!(!session.is_hint_loading());

    let err = h.game.ask_ai(&mut session).await.unwrap_err();
    assert!(matches!(err, GameError::LifelineUsed(Lifeline::AskAi)));
    assert_eq!(hints.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failing_hint_provider_is_tolerated() {
    let h = harness(Arc::new(FakeHints::failing())).await;
    let mut session = h.game.start_game("leyla", Topic::Incesenet).await.unwrap();

    let hint = h.game.ask_ai(&mut session).await.unwrap();
    assert_eq!(hint, None);
    assert!(!session.is_paused());

    // Game keeps going normally.
    let index = correct(&session);
    let events = answer(&h, &mut session, index).await;
    assert!(events.contains(&GameEvent::QuestionStarted { index: 1 }));
}

#[tokio::test]
async fn abandoned_game_leaves_account_untouched() {
    let h = harness(Arc::new(FakeHints::failing())).await;
    let mut session = h.game.start_game("leyla", Topic::Tarix).await.unwrap();
    let index = correct(&session);
    h.game.select_answer(&mut session, index).unwrap();
    h.game.abandon(session);

    let account = h.accounts.account("leyla").await.unwrap();
    assert_eq!(account.games_played(), 0);
    assert_eq!(account.total_points(), 0);
    assert!(account.seen_questions().is_empty());
}

#[tokio::test]
async fn unknown_player_cannot_start() {
    let h = harness(Arc::new(FakeHints::failing())).await;
    let err = h.game.start_game("ghost", Topic::Tarix).await.unwrap_err();
    assert!(matches!(err, GameError::AccountNotFound(name) if name == "ghost"));
}
