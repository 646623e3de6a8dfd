use quiz_core::model::{Difficulty, Lifelines, option_label};

use super::service::AnswerState;

/// Render-ready snapshot of one answer option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub index: usize,
    pub text: String,
    /// Removed by 50:50.
    pub hidden: bool,
    pub selected: bool,
    pub audience_share: Option<u8>,
    /// `Some` once the answer has been revealed.
    pub revealed_correct: Option<bool>,
}

impl OptionView {
    #[must_use]
    pub fn label(&self) -> char {
        option_label(self.index)
    }
}

/// Render-ready snapshot of the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub text: String,
    pub prize: &'static str,
    pub difficulty: Difficulty,
    pub options: Vec<OptionView>,
    pub time_left: u32,
    pub paused: bool,
    pub answer_state: AnswerState,
    pub lifelines: Lifelines,
    pub hint: Option<String>,
    pub hint_loading: bool,
}

impl QuestionView {
    #[must_use]
    pub fn visible_options(&self) -> impl Iterator<Item = &OptionView> {
        self.options.iter().filter(|option| !option.hidden)
    }
}
