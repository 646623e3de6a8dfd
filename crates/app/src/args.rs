use std::fmt;
use std::path::{Path, PathBuf};

use quiz_core::model::{Gender, Theme, Topic};
use services::LEADERBOARD_SIZE;

pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidTopic { raw: String },
    InvalidGender { raw: String },
    InvalidTheme { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidTopic { raw } => write!(f, "unknown topic: {raw}"),
            ArgsError::InvalidGender { raw } => write!(f, "invalid --gender value: {raw}"),
            ArgsError::InvalidTheme { raw } => write!(f, "invalid theme: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Register,
    Login,
    Profile,
    Topics,
    Play,
    Leaderboard,
    Theme,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "register" => Some(Self::Register),
            "login" => Some(Self::Login),
            "profile" => Some(Self::Profile),
            "topics" => Some(Self::Topics),
            "play" => Some(Self::Play),
            "leaderboard" => Some(Self::Leaderboard),
            "theme" => Some(Self::Theme),
            _ => None,
        }
    }
}

/// What `theme` should do with the stored preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    Show,
    Toggle,
    Set(Theme),
}

/// Parsed command line. Flags that a subcommand does not use are ignored.
#[derive(Debug)]
pub struct Args {
    pub command: Command,
    pub db_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<Gender>,
    pub topic: Option<Topic>,
    pub seed: Option<u64>,
    pub limit: usize,
    pub theme: ThemeAction,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz register --user <name> --password <pw> --name <full name> --age <n> --gender <kişi|qadın>");
    eprintln!("  quiz login    --user <name> --password <pw>");
    eprintln!("  quiz profile  --user <name> --password <pw> [--name <n>] [--age <n>] [--gender <g>]");
    eprintln!("  quiz topics   --user <name> --password <pw>");
    eprintln!("  quiz play     --user <name> --password <pw> --topic <topic> [--seed <n>]");
    eprintln!("  quiz leaderboard [--limit <n>]");
    eprintln!("  quiz theme    [dark|light|toggle]");
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  --db <sqlite_url>   (default {DEFAULT_DB_URL})");
    eprintln!();
    eprintln!("Topics: {}", topic_list());
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_AI_API_KEY, QUIZ_AI_BASE_URL, QUIZ_AI_MODEL, RUST_LOG");
}

fn topic_list() -> String {
    Topic::ALL
        .iter()
        .map(|topic| topic.id().to_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    /// Parse `argv` (without the program name).
    ///
    /// Returns `Ok(None)` when help was requested.
    pub fn parse(argv: Vec<String>) -> Result<Option<Self>, ArgsError> {
        let mut iter = argv.into_iter();
        let command = match iter.next() {
            None => return Ok(None),
            Some(first) if first == "--help" || first == "-h" => return Ok(None),
            Some(first) => {
                Command::from_arg(&first).ok_or(ArgsError::UnknownCommand(first))?
            }
        };

        let mut args = Self {
            command,
            db_url: std::env::var("QUIZ_DB_URL")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url),
            username: None,
            password: None,
            name: None,
            age: None,
            gender: None,
            topic: None,
            seed: None,
            limit: LEADERBOARD_SIZE,
            theme: ThemeAction::Show,
        };

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut iter, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    args.db_url = normalize_sqlite_url(value);
                }
                "--user" | "-u" => args.username = Some(require_value(&mut iter, "--user")?),
                "--password" | "-p" => {
                    args.password = Some(require_value(&mut iter, "--password")?);
                }
                "--name" => args.name = Some(require_value(&mut iter, "--name")?),
                "--age" => args.age = Some(require_value(&mut iter, "--age")?),
                "--gender" => {
                    let value = require_value(&mut iter, "--gender")?;
                    let gender = value
                        .parse::<Gender>()
                        .map_err(|_| ArgsError::InvalidGender { raw: value.clone() })?;
                    args.gender = Some(gender);
                }
                "--topic" | "-t" => {
                    let value = require_value(&mut iter, "--topic")?;
                    let topic = value
                        .parse::<Topic>()
                        .map_err(|_| ArgsError::InvalidTopic { raw: value.clone() })?;
                    args.topic = Some(topic);
                }
                "--seed" => {
                    let value = require_value(&mut iter, "--seed")?;
                    let seed = value.parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--seed",
                        raw: value.clone(),
                    })?;
                    args.seed = Some(seed);
                }
                "--limit" => {
                    let value = require_value(&mut iter, "--limit")?;
                    args.limit = value.parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--limit",
                        raw: value.clone(),
                    })?;
                }
                "--help" | "-h" => return Ok(None),
                other if command == Command::Theme && !other.starts_with('-') => {
                    args.theme = match other {
                        "toggle" => ThemeAction::Toggle,
                        _ => ThemeAction::Set(other.parse().map_err(|_| {
                            ArgsError::InvalidTheme {
                                raw: other.to_string(),
                            }
                        })?),
                    };
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(args))
    }

    pub fn credentials(&self) -> Result<(&str, &str), ArgsError> {
        let username = self
            .username
            .as_deref()
            .ok_or(ArgsError::MissingFlag { flag: "--user" })?;
        let password = self
            .password
            .as_deref()
            .ok_or(ArgsError::MissingFlag { flag: "--password" })?;
        Ok((username, password))
    }

    pub fn topic(&self) -> Result<Topic, ArgsError> {
        self.topic.ok_or(ArgsError::MissingFlag { flag: "--topic" })
    }

    /// True if any profile field was given on the command line.
    pub fn has_profile_changes(&self) -> bool {
        self.name.is_some() || self.age.is_some() || self.gender.is_some()
    }
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file and its directory exist before connecting.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}
