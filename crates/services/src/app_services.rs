use std::sync::Arc;

use quiz_core::bank::QuestionBank;
use storage::repository::Storage;

use crate::Clock;
use crate::account_service::AccountService;
use crate::error::AppServicesError;
use crate::hint_service::{HintProvider, HintService};
use crate::preferences_service::PreferencesService;
use crate::sessions::GameLoopService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    accounts: Arc<AccountService>,
    preferences: Arc<PreferencesService>,
    game_loop: Arc<GameLoopService>,
    hints_enabled: bool,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, the built-in question bank
    /// and hints configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails, the bank is
    /// invalid, or the hint configuration is malformed.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let hints = HintService::from_env()?;
        let hints_enabled = hints.enabled();
        let bank = Arc::new(QuestionBank::builtin()?);
        Ok(Self::assemble(
            &storage,
            clock,
            bank,
            Arc::new(hints),
            hints_enabled,
        ))
    }

    /// Build services over in-memory storage with a caller-supplied hint
    /// provider.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Bank` if the built-in bank is invalid.
    pub fn in_memory(clock: Clock, hints: Arc<dyn HintProvider>) -> Result<Self, AppServicesError> {
        let bank = Arc::new(QuestionBank::builtin()?);
        Ok(Self::assemble(&Storage::in_memory(), clock, bank, hints, true))
    }

    fn assemble(
        storage: &Storage,
        clock: Clock,
        bank: Arc<QuestionBank>,
        hints: Arc<dyn HintProvider>,
        hints_enabled: bool,
    ) -> Self {
        let accounts = Arc::new(AccountService::new(Arc::clone(&storage.accounts)));
        let preferences = Arc::new(PreferencesService::new(Arc::clone(&storage.preferences)));
        let game_loop = Arc::new(GameLoopService::new(
            clock,
            bank,
            Arc::clone(&storage.accounts),
            hints,
        ));
        tracing::debug!(hints_enabled, "app services assembled");
        Self {
            accounts,
            preferences,
            game_loop,
            hints_enabled,
        }
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.accounts)
    }

    #[must_use]
    pub fn preferences(&self) -> Arc<PreferencesService> {
        Arc::clone(&self.preferences)
    }

    #[must_use]
    pub fn game_loop(&self) -> Arc<GameLoopService> {
        Arc::clone(&self.game_loop)
    }

    /// False when no hint API key is configured; the AI lifeline then yields
    /// no hint.
    #[must_use]
    pub fn hints_enabled(&self) -> bool {
        self.hints_enabled
    }
}
