#![forbid(unsafe_code)]

pub mod account_service;
pub mod app_services;
pub mod error;
pub mod hint_service;
pub mod preferences_service;
pub mod sessions;

pub use quiz_core::Clock;

pub use account_service::{AccountService, LEADERBOARD_SIZE, LeaderboardEntry, UsernameStatus};
pub use app_services::AppServices;
pub use error::{AccountServiceError, AppServicesError, GameError, HintError, PreferencesError};
pub use hint_service::{HintConfig, HintProvider, HintService, build_prompt};
pub use preferences_service::PreferencesService;
pub use sessions::{
    AnswerState, GameEvent, GameLoopService, GameSession, HintRequest, OptionView,
    PollReport, QuestionSelector, QuestionView, SessionPlan, SessionProgress,
};
