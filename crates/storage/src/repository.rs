use async_trait::async_trait;
use quiz_core::model::{Account, Theme};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::accounts::{KvAccountRepository, KvPreferenceRepository};

/// Key holding the JSON array of account records.
pub const USERS_KEY: &str = "users_db";

/// Key holding the raw theme string (`dark` / `light`).
pub const THEME_KEY: &str = "theme_preference";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// String-keyed store of serialized values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Repository contract for player accounts.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Look up an account by exact username and password.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; a miss is `Ok(None)`.
    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; a miss is `Ok(None)`.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn is_username_taken(&self, username: &str) -> Result<bool, StorageError>;

    /// Persist a new account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username already exists.
    async fn create(&self, account: &Account) -> Result<(), StorageError>;

    /// Replace the stored account with the same username.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no such account exists.
    async fn update(&self, account: &Account) -> Result<(), StorageError>;

    /// Every stored account, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_accounts(&self) -> Result<Vec<Account>, StorageError>;
}

#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; an unset theme is `Ok(None)`.
    async fn get_theme(&self) -> Result<Option<Theme>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn save_theme(&self, theme: Theme) -> Result<(), StorageError>;
}

/// Simple in-memory key-value store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub accounts: Arc<dyn AccountRepository>,
    pub preferences: Arc<dyn PreferenceRepository>,
}

impl Storage {
    /// Build repositories over any key-value backend.
    #[must_use]
    pub fn over(kv: Arc<dyn KeyValueStore>) -> Self {
        let accounts: Arc<dyn AccountRepository> =
            Arc::new(KvAccountRepository::new(Arc::clone(&kv)));
        let preferences: Arc<dyn PreferenceRepository> =
            Arc::new(KvPreferenceRepository::new(kv));
        Self {
            accounts,
            preferences,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::over(Arc::new(InMemoryRepository::new()))
    }
}
