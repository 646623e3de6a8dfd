use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{GameOutcome, Topic};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 5;
pub const MAX_PASSWORD_LEN: usize = 10;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Registration and profile validation failures. The display text is the
/// message shown to the player.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccountError {
    #[error("İstifadəçi adı ən az 3 simvol olmalıdır.")]
    UsernameTooShort,

    #[error("Şifrə 5 ilə 10 simvol arasında olmalıdır.")]
    PasswordLength,

    #[error("Ad daxil edilməlidir.")]
    MissingName,

    #[error("Yaş daxil edilməlidir.")]
    MissingAge,

    #[error("Yaş düzgün deyil.")]
    InvalidAge,

    #[error("Cins seçilməlidir.")]
    MissingGender,
}

//
// ─── GENDER ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "Kişi")]
    Male,
    #[serde(rename = "Qadın")]
    Female,
    /// Records created before gender was collected.
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl Gender {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Kişi",
            Gender::Female => "Qadın",
            Gender::Unspecified => "",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kişi" | "kisi" | "male" | "m" => Ok(Gender::Male),
            "qadın" | "qadin" | "female" | "f" => Ok(Gender::Female),
            _ => Err(AccountError::MissingGender),
        }
    }
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Raw registration form input.
#[derive(Debug, Clone, Default)]
pub struct RegistrationDraft {
    pub username: String,
    pub password: String,
    pub name: String,
    pub age: String,
    pub gender: Option<Gender>,
}

/// Raw profile form input.
#[derive(Debug, Clone, Default)]
pub struct ProfileDraft {
    pub name: String,
    pub age: String,
    pub gender: Option<Gender>,
}

/// Checks the username rule alone, so forms can report it before the rest.
///
/// # Errors
///
/// Returns `AccountError::UsernameTooShort` for blank or short usernames.
pub fn validate_username(username: &str) -> Result<(), AccountError> {
    if username.trim().is_empty() || username.chars().count() < MIN_USERNAME_LEN {
        return Err(AccountError::UsernameTooShort);
    }
    Ok(())
}

/// # Errors
///
/// Returns `AccountError::PasswordLength` outside 5..=10 characters.
pub fn validate_password(password: &str) -> Result<(), AccountError> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(AccountError::PasswordLength);
    }
    Ok(())
}

impl ProfileDraft {
    /// # Errors
    ///
    /// Returns the first failing field rule: name, then age, then gender.
    pub fn validate(self) -> Result<Profile, AccountError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AccountError::MissingName);
        }
        let age = self.age.trim();
        if age.is_empty() {
            return Err(AccountError::MissingAge);
        }
        let age = age.parse::<u32>().map_err(|_| AccountError::InvalidAge)?;
        let gender = match self.gender {
            Some(Gender::Unspecified) | None => return Err(AccountError::MissingGender),
            Some(gender) => gender,
        };
        Ok(Profile {
            name,
            age: Some(age),
            gender,
        })
    }
}

impl RegistrationDraft {
    /// Validate everything except username uniqueness, which needs storage.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule in form order.
    pub fn validate(self) -> Result<Account, AccountError> {
        validate_username(&self.username)?;
        validate_password(&self.password)?;
        let profile = ProfileDraft {
            name: self.name,
            age: self.age,
            gender: self.gender,
        }
        .validate()?;

        Ok(Account {
            username: self.username,
            password: self.password,
            profile,
            total_points: 0,
            games_played: 0,
            completed_topics: BTreeSet::new(),
            seen_questions: BTreeSet::new(),
        })
    }
}

//
// ─── ACCOUNT ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub age: Option<u32>,
    pub gender: Gender,
}

/// A locally stored player.
///
/// Passwords are kept as entered; the store is single-user and local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    username: String,
    password: String,
    profile: Profile,
    total_points: u64,
    games_played: u32,
    completed_topics: BTreeSet<Topic>,
    seen_questions: BTreeSet<String>,
}

impl Account {
    /// Rehydrate an account from storage without re-running form validation.
    #[must_use]
    pub fn from_persisted(
        username: String,
        password: String,
        profile: Profile,
        total_points: u64,
        games_played: u32,
        completed_topics: BTreeSet<Topic>,
        seen_questions: BTreeSet<String>,
    ) -> Self {
        Self {
            username,
            password,
            profile,
            total_points,
            games_played,
            completed_topics,
            seen_questions,
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[must_use]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.profile.name
    }

    #[must_use]
    pub fn total_points(&self) -> u64 {
        self.total_points
    }

    #[must_use]
    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    #[must_use]
    pub fn completed_topics(&self) -> &BTreeSet<Topic> {
        &self.completed_topics
    }

    #[must_use]
    pub fn seen_questions(&self) -> &BTreeSet<String> {
        &self.seen_questions
    }

    #[must_use]
    pub fn has_completed(&self, topic: Topic) -> bool {
        self.completed_topics.contains(&topic)
    }

    #[must_use]
    pub fn matches_credentials(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }

    /// Remember a correctly answered question. Returns `true` if it was new.
    pub fn record_seen(&mut self, text: &str) -> bool {
        if self.seen_questions.contains(text) {
            return false;
        }
        self.seen_questions.insert(text.to_string())
    }

    /// Fold a finished game into the cumulative stats.
    pub fn apply_outcome(&mut self, outcome: &GameOutcome) {
        self.total_points = self.total_points.saturating_add(outcome.points());
        self.games_played = self.games_played.saturating_add(1);
        if let Some(topic) = outcome.completed_topic() {
            self.completed_topics.insert(topic);
        }
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LossReason;

    fn draft(username: &str, password: &str) -> RegistrationDraft {
        RegistrationDraft {
            username: username.into(),
            password: password.into(),
            name: "Aysel".into(),
            age: "21".into(),
            gender: Some(Gender::Female),
        }
    }

    #[test]
    fn username_needs_three_characters() {
        assert_eq!(
            draft("ab", "secret").validate().unwrap_err(),
            AccountError::UsernameTooShort
        );
        assert!(draft("abc", "secret").validate().is_ok());
        assert_eq!(
            draft("   ", "secret").validate().unwrap_err(),
            AccountError::UsernameTooShort
        );
    }

    #[test]
    fn password_length_is_bounded() {
        assert_eq!(
            draft("player", "1234").validate().unwrap_err(),
            AccountError::PasswordLength
        );
        assert_eq!(
            draft("player", "12345678901").validate().unwrap_err(),
            AccountError::PasswordLength
        );
        assert!(draft("player", "1234567890").validate().is_ok());
    }

    #[test]
    fn profile_fields_are_required_in_order() {
        let mut d = draft("player", "secret");
        d.name = " ".into();
        d.age = String::new();
        assert_eq!(d.clone().validate().unwrap_err(), AccountError::MissingName);

        d.name = "Murad".into();
        assert_eq!(d.clone().validate().unwrap_err(), AccountError::MissingAge);

        d.age = "x".into();
        assert_eq!(d.clone().validate().unwrap_err(), AccountError::InvalidAge);

        d.age = "30".into();
        d.gender = None;
        assert_eq!(d.validate().unwrap_err(), AccountError::MissingGender);
    }

    #[test]
    fn seen_questions_are_idempotent() {
        let mut account = draft("player", "secret").validate().unwrap();
        assert!(account.record_seen("Q1"));
        assert!(!account.record_seen("Q1"));
        assert_eq!(account.seen_questions().len(), 1);
    }

    #[test]
    fn outcomes_accumulate() {
        let mut account = draft("player", "secret").validate().unwrap();
        account.apply_outcome(&GameOutcome::lost(Topic::Tarix, 3, LossReason::Wrong));
        account.apply_outcome(&GameOutcome::won(Topic::Tarix, 9));

        assert_eq!(account.total_points(), 6_150);
        assert_eq!(account.games_played(), 2);
        assert!(account.has_completed(Topic::Tarix));
        assert!(!account.has_completed(Topic::Film));
    }

    #[test]
    fn parses_gender_labels() {
        assert_eq!("Kişi".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("qadin".parse::<Gender>().unwrap(), Gender::Female);
        assert!("".parse::<Gender>().is_err());
    }
}
