//! Persisted account schema and its migrations.
//!
//! Records are stored as a JSON array under [`crate::repository::USERS_KEY`].
//! Every record written by this crate carries `schemaVersion`; records without
//! one predate versioning and are upgraded by [`migrate_record`].

use quiz_core::model::{Account, Gender, Profile, Topic};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::repository::StorageError;

pub const ACCOUNT_SCHEMA_VERSION: u64 = 1;

/// Persisted shape for an account (schema version 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub schema_version: u64,
    pub username: String,
    pub password: String,
    pub name: String,
    pub age: Option<u32>,
    pub gender: Gender,
    pub total_points: u64,
    pub games_played: u32,
    pub completed_topics: Vec<Topic>,
    pub seen_questions: Vec<String>,
}

impl AccountRecord {
    #[must_use]
    pub fn from_account(account: &Account) -> Self {
        let profile = account.profile();
        Self {
            schema_version: ACCOUNT_SCHEMA_VERSION,
            username: account.username().to_owned(),
            password: account.password().to_owned(),
            name: profile.name.clone(),
            age: profile.age,
            gender: profile.gender,
            total_points: account.total_points(),
            games_played: account.games_played(),
            completed_topics: account.completed_topics().iter().copied().collect(),
            seen_questions: account.seen_questions().iter().cloned().collect(),
        }
    }

    #[must_use]
    pub fn into_account(self) -> Account {
        Account::from_persisted(
            self.username,
            self.password,
            Profile {
                name: self.name,
                age: self.age,
                gender: self.gender,
            },
            self.total_points,
            self.games_played,
            self.completed_topics.into_iter().collect(),
            self.seen_questions.into_iter().collect(),
        )
    }
}

/// Unversioned records from earlier releases. Anything may be missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyAccountRecord {
    username: String,
    password: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    age: Option<Value>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    total_points: Option<u64>,
    #[serde(default)]
    games_played: Option<u32>,
    #[serde(default)]
    completed_topics: Option<Vec<String>>,
    #[serde(default)]
    seen_questions: Option<Vec<String>>,
}

impl LegacyAccountRecord {
    fn upgrade(self) -> AccountRecord {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .or(self.full_name)
            .unwrap_or_default();
        let age = match self.age {
            Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        let gender = match self.gender.as_deref() {
            Some("Kişi") => Gender::Male,
            Some("Qadın") => Gender::Female,
            _ => Gender::Unspecified,
        };
        let completed_topics = self
            .completed_topics
            .unwrap_or_default()
            .iter()
            .filter_map(|raw| raw.parse().ok())
            .collect();

        AccountRecord {
            schema_version: ACCOUNT_SCHEMA_VERSION,
            username: self.username,
            password: self.password,
            name,
            age,
            gender,
            total_points: self.total_points.unwrap_or(0),
            games_played: self.games_played.unwrap_or(0),
            completed_topics,
            seen_questions: self.seen_questions.unwrap_or_default(),
        }
    }
}

/// A record after migration, plus whether it had to be upgraded.
#[derive(Debug)]
pub struct Migrated {
    pub record: AccountRecord,
    pub upgraded: bool,
}

/// Bring a raw stored record up to [`ACCOUNT_SCHEMA_VERSION`].
///
/// # Errors
///
/// Returns `StorageError::Serialization` for records that cannot be read or
/// carry a schema version newer than this build understands.
pub fn migrate_record(raw: Value) -> Result<Migrated, StorageError> {
    let version = raw.get("schemaVersion").and_then(Value::as_u64).unwrap_or(0);
    match version {
        0 => {
            let legacy: LegacyAccountRecord = serde_json::from_value(raw)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            Ok(Migrated {
                record: legacy.upgrade(),
                upgraded: true,
            })
        }
        ACCOUNT_SCHEMA_VERSION => {
            let record = serde_json::from_value(raw)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            Ok(Migrated {
                record,
                upgraded: false,
            })
        }
        other => Err(StorageError::Serialization(format!(
            "unsupported account schema version {other}"
        ))),
    }
}
