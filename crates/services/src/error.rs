//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::bank::BankError;
use quiz_core::model::{AccountError, Lifeline, Topic};
use storage::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `HintService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HintError {
    #[error("hints are not configured")]
    Disabled,
    #[error("invalid hint service URL: {0}")]
    InvalidBaseUrl(String),
    #[error("hint service returned an empty response")]
    EmptyResponse,
    #[error("hint request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `AccountService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccountServiceError {
    #[error(transparent)]
    Validation(#[from] AccountError),
    #[error("Bu istifadəçi adı artıq mövcuddur.")]
    UsernameTaken,
    /// Same message for unknown users and wrong passwords.
    #[error("İstifadəçi adı və ya şifrə yanlışdır.")]
    AuthFailed,
    #[error("account not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PreferencesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PreferencesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by game sessions and the game loop.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameError {
    #[error("topic {0} is already completed")]
    TopicCompleted(Topic),
    #[error("no questions available for this game")]
    NoQuestions,
    #[error("game already finished")]
    Finished,
    #[error("game is still in progress")]
    NotFinished,
    #[error("an answer is already being evaluated")]
    AnswerPending,
    #[error("option {0} cannot be selected")]
    InvalidOption(usize),
    #[error("{0} lifeline already used")]
    LifelineUsed(Lifeline),
    #[error("another lifeline is in progress")]
    LifelineInProgress,
    #[error("game is paused")]
    Paused,
    #[error("account {0} not found")]
    AccountNotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Hint(#[from] HintError),
}
