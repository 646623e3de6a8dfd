use std::fmt;
use std::sync::Arc;

use quiz_core::model::{
    Account, MIN_USERNAME_LEN, Profile, ProfileDraft, RegistrationDraft, validate_username,
};
use storage::StorageError;
use storage::repository::AccountRepository;

use crate::error::AccountServiceError;

/// Default leaderboard size.
pub const LEADERBOARD_SIZE: usize = 10;

/// Live feedback for the username field while the player types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameStatus {
    /// Empty or too short to check.
    Idle,
    Valid,
    Taken,
}

impl fmt::Display for UsernameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UsernameStatus::Idle => "idle",
            UsernameStatus::Valid => "İstifadəçi adı uyğundur",
            UsernameStatus::Taken => "Bu ad artıq mövcuddur",
        };
        f.write_str(text)
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: String,
    pub name: String,
    pub total_points: u64,
    pub games_played: u32,
}

#[derive(Clone)]
pub struct AccountService {
    repo: Arc<dyn AccountRepository>,
}

impl AccountService {
    #[must_use]
    pub fn new(repo: Arc<dyn AccountRepository>) -> Self {
        Self { repo }
    }

    /// # Errors
    ///
    /// Returns `AccountServiceError::Storage` on backend failures.
    pub async fn username_status(
        &self,
        username: &str,
    ) -> Result<UsernameStatus, AccountServiceError> {
        if username.chars().count() < MIN_USERNAME_LEN {
            return Ok(UsernameStatus::Idle);
        }
        if self.repo.is_username_taken(username).await? {
            Ok(UsernameStatus::Taken)
        } else {
            Ok(UsernameStatus::Valid)
        }
    }

    /// Validate and create a new account.
    ///
    /// Checks run in form order: username length, username availability,
    /// password length, name, age, gender.
    ///
    /// # Errors
    ///
    /// Returns `AccountServiceError::Validation` or
    /// `AccountServiceError::UsernameTaken` for rejected input, or
    /// `AccountServiceError::Storage` on backend failures.
    pub async fn register(&self, draft: RegistrationDraft) -> Result<Account, AccountServiceError> {
        validate_username(&draft.username)?;
        if self.repo.is_username_taken(&draft.username).await? {
            return Err(AccountServiceError::UsernameTaken);
        }
        let account = draft.validate()?;

        match self.repo.create(&account).await {
            Ok(()) => {}
            Err(StorageError::Conflict) => return Err(AccountServiceError::UsernameTaken),
            Err(err) => return Err(err.into()),
        }
        tracing::info!(username = account.username(), "account registered");
        Ok(account)
    }

    /// # Errors
    ///
    /// Returns `AccountServiceError::AuthFailed` for any credential mismatch,
    /// or `AccountServiceError::Storage` on backend failures.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Account, AccountServiceError> {
        self.repo
            .find_by_credentials(username, password)
            .await?
            .ok_or(AccountServiceError::AuthFailed)
    }

    /// # Errors
    ///
    /// Returns `AccountServiceError::NotFound` for unknown users, or
    /// `AccountServiceError::Storage` on backend failures.
    pub async fn account(&self, username: &str) -> Result<Account, AccountServiceError> {
        self.repo
            .find_by_username(username)
            .await?
            .ok_or(AccountServiceError::NotFound)
    }

    /// Replace name, age and gender. Stats and history are untouched.
    ///
    /// # Errors
    ///
    /// Returns `AccountServiceError::Validation` for bad input,
    /// `AccountServiceError::NotFound` for unknown users, or
    /// `AccountServiceError::Storage` on backend failures.
    pub async fn update_profile(
        &self,
        username: &str,
        draft: ProfileDraft,
    ) -> Result<Account, AccountServiceError> {
        let profile: Profile = draft.validate()?;
        let mut account = self.account(username).await?;
        account.set_profile(profile);
        match self.repo.update(&account).await {
            Ok(()) => Ok(account),
            Err(StorageError::NotFound) => Err(AccountServiceError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    /// Accounts ranked by total points, highest first. Ties keep storage order.
    ///
    /// # Errors
    ///
    /// Returns `AccountServiceError::Storage` on backend failures.
    pub async fn leaderboard(
        &self,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, AccountServiceError> {
        let mut accounts = self.repo.list_accounts().await?;
        accounts.sort_by(|a, b| b.total_points().cmp(&a.total_points()));
        Ok(accounts
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, account)| LeaderboardEntry {
                rank: index + 1,
                username: account.username().to_string(),
                name: account.name().to_string(),
                total_points: account.total_points(),
                games_played: account.games_played(),
            })
            .collect())
    }
}
