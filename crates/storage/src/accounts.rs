//! Account and preference repositories over a [`KeyValueStore`].
//!
//! The whole account table lives under one key and is read, modified and
//! written back as a unit. There is a single local writer, so no locking or
//! conflict resolution is attempted beyond username uniqueness.

use async_trait::async_trait;
use quiz_core::model::{Account, Theme};
use serde_json::Value;
use std::sync::Arc;

use crate::record::{AccountRecord, migrate_record};
use crate::repository::{
    AccountRepository, KeyValueStore, PreferenceRepository, StorageError, THEME_KEY, USERS_KEY,
};

#[derive(Clone)]
pub struct KvAccountRepository {
    kv: Arc<dyn KeyValueStore>,
}

impl KvAccountRepository {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load every account, migrating legacy records. Upgraded tables are
    /// written back so the migration runs once.
    async fn load(&self) -> Result<Vec<Account>, StorageError> {
        let Some(raw) = self.kv.get(USERS_KEY).await? else {
            return Ok(Vec::new());
        };
        let value: Value =
            serde_json::from_str(&raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let Value::Array(items) = value else {
            return Err(StorageError::Serialization(format!(
                "{USERS_KEY} is not an array"
            )));
        };

        let mut upgraded = 0_usize;
        let mut accounts = Vec::with_capacity(items.len());
        for item in items {
            let migrated = migrate_record(item)?;
            if migrated.upgraded {
                upgraded += 1;
            }
            accounts.push(migrated.record.into_account());
        }

        if upgraded > 0 {
            tracing::info!(upgraded, "migrated legacy account records");
            self.save(&accounts).await?;
        }
        Ok(accounts)
    }

    async fn save(&self, accounts: &[Account]) -> Result<(), StorageError> {
        let records: Vec<AccountRecord> = accounts.iter().map(AccountRecord::from_account).collect();
        let raw = serde_json::to_string(&records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.put(USERS_KEY, &raw).await
    }
}

#[async_trait]
impl AccountRepository for KvAccountRepository {
    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, StorageError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|a| a.matches_credentials(username, password)))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StorageError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|a| a.username() == username))
    }

    async fn is_username_taken(&self, username: &str) -> Result<bool, StorageError> {
        Ok(self.load().await?.iter().any(|a| a.username() == username))
    }

    async fn create(&self, account: &Account) -> Result<(), StorageError> {
        let mut accounts = self.load().await?;
        if accounts.iter().any(|a| a.username() == account.username()) {
            return Err(StorageError::Conflict);
        }
        accounts.push(account.clone());
        self.save(&accounts).await
    }

    async fn update(&self, account: &Account) -> Result<(), StorageError> {
        let mut accounts = self.load().await?;
        let slot = accounts
            .iter_mut()
            .find(|a| a.username() == account.username())
            .ok_or(StorageError::NotFound)?;
        *slot = account.clone();
        self.save(&accounts).await
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StorageError> {
        self.load().await
    }
}

#[derive(Clone)]
pub struct KvPreferenceRepository {
    kv: Arc<dyn KeyValueStore>,
}

impl KvPreferenceRepository {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl PreferenceRepository for KvPreferenceRepository {
    async fn get_theme(&self) -> Result<Option<Theme>, StorageError> {
        let Some(raw) = self.kv.get(THEME_KEY).await? else {
            return Ok(None);
        };
        raw.parse::<Theme>()
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.kv.put(THEME_KEY, theme.as_str()).await
    }
}
