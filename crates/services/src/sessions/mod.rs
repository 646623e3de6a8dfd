mod plan;
mod progress;
mod service;
mod view;
mod workflow;

// Public API of the game subsystem.
pub use crate::error::GameError;
pub use plan::{QuestionSelector, SessionPlan};
pub use progress::SessionProgress;
pub use service::{AnswerState, GameEvent, GameSession, HintRequest};
pub use view::{OptionView, QuestionView};
pub use workflow::{GameLoopService, PollReport};
