use quiz_core::ladder::{PRIZE_LADDER, is_milestone};
use quiz_core::model::{
    Account, AudiencePoll, GameOutcome, GameResult, Lifeline, LossReason, Question, Theme, Topic,
    option_label,
};
use services::{AnswerState, LeaderboardEntry, QuestionView};

const RESET: &str = "\x1b[0m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";

/// Terminal colours derived from the stored theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    accent: &'static str,
    milestone: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                accent: "\x1b[1;93m",
                milestone: "\x1b[1;96m",
            },
            Theme::Light => Self {
                accent: "\x1b[1;34m",
                milestone: "\x1b[1;35m",
            },
        }
    }

    fn accent(&self, text: &str) -> String {
        format!("{}{text}{RESET}", self.accent)
    }
}

pub fn account_summary(account: &Account) -> String {
    let profile = account.profile();
    let age = profile
        .age
        .map_or_else(|| "-".to_string(), |age| age.to_string());
    let gender = if profile.gender.label().is_empty() {
        "-"
    } else {
        profile.gender.label()
    };
    format!(
        "{} ({})\n  Yaş: {age}  Cins: {gender}\n  Ümumi xal: {}  Oyunlar: {}  Tamamlanmış mövzular: {}",
        account.name(),
        account.username(),
        account.total_points(),
        account.games_played(),
        account.completed_topics().len(),
    )
}

pub fn topics(account: &Account, palette: Palette) -> String {
    Topic::ALL
        .iter()
        .map(|topic| {
            let status = if account.has_completed(*topic) {
                format!("{GREEN}✓ tamamlanıb{RESET}")
            } else {
                palette.accent("oyna")
            };
            format!(
                "  {:<10} {:<12} {status}\n  {DIM}{}{RESET}",
                topic.id().to_lowercase(),
                topic.label(),
                topic.description()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn leaderboard(rows: &[LeaderboardEntry], palette: Palette) -> String {
    if rows.is_empty() {
        return "Hələ heç kim oynamayıb.".to_string();
    }
    let mut out = palette.accent("Liderlər cədvəli");
    for row in rows {
        out.push_str(&format!(
            "\n  {:>2}. {:<16} {:>8} xal  ({} oyun)",
            row.rank, row.name, row.total_points, row.games_played
        ));
    }
    out
}

/// Ladder from the top rung down, marking the current position.
pub fn ladder(current: usize, palette: Palette) -> String {
    PRIZE_LADDER
        .iter()
        .enumerate()
        .rev()
        .map(|(index, prize)| {
            let marker = if index == current { "▶" } else { " " };
            let line = format!("{marker} {:>2}  {prize}", index + 1);
            if index == current {
                palette.accent(&line)
            } else if is_milestone(index) {
                format!("{}{line}{RESET}", palette.milestone)
            } else if index < current {
                format!("{DIM}{line}{RESET}")
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn question(view: &QuestionView, palette: Palette) -> String {
    let mut out = format!(
        "\n{}  {}/{}  {}  [{}]\n{}\n",
        palette.accent("Sual"),
        view.index + 1,
        view.total,
        view.prize,
        view.difficulty,
        view.text
    );
    for option in view.visible_options() {
        let share = option
            .audience_share
            .map(|share| format!("  ({share}%)"))
            .unwrap_or_default();
        out.push_str(&format!("  {}) {}{share}\n", option.label(), option.text));
    }
    if let Some(hint) = &view.hint {
        out.push_str(&format!("  İpucu: {hint}\n"));
    }
    out.push_str(&format!(
        "{DIM}Vaxt: {}s  Kömək: {}{RESET}",
        view.time_left,
        lifeline_status(view)
    ));
    out
}

fn lifeline_status(view: &QuestionView) -> String {
    [
        (Lifeline::FiftyFifty, "50"),
        (Lifeline::AskAudience, "aud"),
        (Lifeline::AskAi, "ai"),
    ]
    .iter()
    .filter(|(lifeline, _)| view.lifelines.is_available(*lifeline))
    .map(|(_, command)| *command)
    .collect::<Vec<_>>()
    .join(" ")
}

pub fn answer_state(state: AnswerState, question: &Question, selected: usize) -> String {
    let label = option_label(selected);
    match state {
        AnswerState::Correct => format!("{GREEN}{label}) Düzgün cavab!{RESET}"),
        AnswerState::Wrong => format!(
            "{RED}{label}) Səhv cavab.{RESET} Düzgün cavab: {}) {}",
            option_label(question.correct_index()),
            question.options()[question.correct_index()]
        ),
        AnswerState::Selected | AnswerState::Idle => format!("{label}) seçildi..."),
    }
}

pub fn audience(poll: AudiencePoll) -> String {
    poll.shares()
        .iter()
        .enumerate()
        .map(|(index, share)| {
            let bar = "█".repeat(usize::from(*share) / 5);
            format!("  {}) {bar} {share}%", option_label(index))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn outcome(outcome: &GameOutcome, palette: Palette) -> String {
    let headline = match outcome.result() {
        GameResult::Won => format!("{GREEN}Təbriklər! Milyonçu oldunuz!{RESET}"),
        GameResult::Lost(LossReason::Timeout) => format!("{RED}Vaxt bitdi.{RESET}"),
        GameResult::Lost(LossReason::Wrong) => format!("{RED}Oyun bitdi.{RESET}"),
    };
    format!(
        "\n{headline}\n{}: {} xal\n",
        palette.accent(outcome.topic().label()),
        outcome.points()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_marks_current_rung() {
        let text = ladder(3, Palette::for_theme(Theme::Dark));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines[0].contains("1,000,000 ₼"));
        assert!(lines[6].contains('▶'));
        assert!(lines[6].contains("500 ₼"));
    }

    #[test]
    fn audience_bars_scale_with_share() {
        let poll = AudiencePoll::new([60, 20, 15, 5]).unwrap();
        let text = audience(poll);
        assert!(text.contains("A) ████████████ 60%"));
        assert!(text.contains("D) █ 5%"));
    }

    #[test]
    fn empty_leaderboard_has_placeholder() {
        assert_eq!(
            leaderboard(&[], Palette::for_theme(Theme::Light)),
            "Hələ heç kim oynamayıb."
        );
    }
}
