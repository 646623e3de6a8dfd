mod account;
mod ids;
mod lifeline;
mod preferences;
mod question;
mod session;
mod topic;

pub use account::{
    Account, AccountError, Gender, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN, MIN_USERNAME_LEN, Profile,
    ProfileDraft, RegistrationDraft, validate_password, validate_username,
};
pub use ids::SessionId;
pub use lifeline::{AudiencePoll, AudiencePollError, Lifeline, Lifelines};
pub use preferences::{Theme, UnknownTheme};
pub use question::{Difficulty, OPTION_COUNT, Question, option_label};
pub use session::{GameOutcome, GameResult, LossReason};
pub use topic::{Topic, UnknownTopic};
