use std::time::Duration;

use quiz_core::model::Topic;
use services::{GameError, GameEvent, GameLoopService, GameSession};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{MissedTickBehavior, interval};

use crate::render::{self, Palette};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const MAX_RECORD_ATTEMPTS: u32 = 3;

/// One line typed by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Answer(usize),
    FiftyFifty,
    Audience,
    Ai,
    TogglePause,
    Ladder,
    Quit,
}

impl Input {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "a" => Some(Self::Answer(0)),
            "b" => Some(Self::Answer(1)),
            "c" => Some(Self::Answer(2)),
            "d" => Some(Self::Answer(3)),
            "50" | "50:50" => Some(Self::FiftyFifty),
            "aud" => Some(Self::Audience),
            "ai" => Some(Self::Ai),
            "p" => Some(Self::TogglePause),
            "l" => Some(Self::Ladder),
            "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Run one game on stdin/stdout until it finishes or the player quits.
pub async fn run(
    game: &GameLoopService,
    username: &str,
    topic: Topic,
    palette: Palette,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = game.start_game(username, topic).await?;
    println!("{}", render::ladder(0, palette));
    print_question(&session, palette);
    println!("Əmrlər: a-d cavab, 50, aud, ai, p fasilə, l pilləkən, q çıxış");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut failed_records = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = game.poll(&mut session).await;
                show_events(&session, &report.events, palette);
                if let Some(err) = report.record_error {
                    failed_records += 1;
                    tracing::warn!(%err, attempt = failed_records, "could not record game result");
                    if failed_records >= MAX_RECORD_ATTEMPTS {
                        return Err(err.into());
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    game.abandon(session);
                    return Ok(());
                };
                match Input::parse(&line) {
                    Some(Input::Quit) => {
                        println!("Oyundan çıxdınız. Nəticə qeydə alınmadı.");
                        game.abandon(session);
                        return Ok(());
                    }
                    Some(input) => {
                        if let Err(err) = apply(game, &mut session, input, palette).await {
                            println!("{}", describe(&err));
                        }
                    }
                    None => println!("Naməlum əmr: {}", line.trim()),
                }
            }
        }

        if session.is_finished() && session.is_outcome_recorded() {
            return Ok(());
        }
    }
}

async fn apply(
    game: &GameLoopService,
    session: &mut GameSession,
    input: Input,
    palette: Palette,
) -> Result<(), GameError> {
    match input {
        Input::Answer(index) => {
            game.select_answer(session, index)?;
            if let Some(question) = session.current_question() {
                println!(
                    "{}",
                    render::answer_state(session.answer_state(), question, index)
                );
            }
        }
        Input::FiftyFifty => {
            game.use_fifty_fifty(session)?;
            print_question(session, palette);
        }
        Input::Audience => {
            game.ask_audience(session)?;
            println!("Zal səs verir...");
        }
        Input::Ai => {
            println!("Süni intellekt düşünür...");
            if game.ask_ai(session).await?.is_none() {
                println!("İpucu alınmadı.");
            }
            print_question(session, palette);
        }
        Input::TogglePause => {
            if session.is_user_paused() {
                game.resume(session)?;
                println!("Davam edirik.");
            } else {
                game.pause(session)?;
                println!("Fasilə. Davam etmək üçün p yazın.");
            }
        }
        Input::Ladder => {
            let progress = session.progress();
            println!("{}", render::ladder(progress.index, palette));
            println!("{}/{}  {}  {}s", progress.index + 1, progress.total, progress.prize, progress.time_left);
        }
        Input::Quit => {}
    }
    Ok(())
}

fn show_events(session: &GameSession, events: &[GameEvent], palette: Palette) {
    for event in events {
        match event {
            GameEvent::TimerTicked { time_left } if *time_left % 10 == 0 || *time_left <= 5 => {
                println!("{time_left}s");
            }
            GameEvent::TimerTicked { .. } | GameEvent::QuestionSeen { .. } => {}
            GameEvent::AnswerRevealed {
                index, selected, ..
            } => {
                if let Some(question) = session.questions().get(*index) {
                    let state = if question.is_correct(*selected) {
                        services::AnswerState::Correct
                    } else {
                        services::AnswerState::Wrong
                    };
                    println!("{}", render::answer_state(state, question, *selected));
                }
            }
            GameEvent::QuestionStarted { index } => {
                println!("{}", render::ladder(*index, palette));
                print_question(session, palette);
            }
            GameEvent::AudiencePollReady(poll) => println!("{}", render::audience(*poll)),
            GameEvent::Finished(outcome) => println!("{}", render::outcome(outcome, palette)),
        }
    }
}

fn print_question(session: &GameSession, palette: Palette) {
    if let Some(view) = session.view() {
        println!("{}", render::question(&view, palette));
    }
}

fn describe(err: &GameError) -> String {
    match err {
        GameError::AnswerPending => "Cavab yoxlanılır...".to_string(),
        GameError::LifelineInProgress => "Kömək hələ davam edir.".to_string(),
        GameError::Paused => "Oyun fasilədədir. p yazın.".to_string(),
        GameError::InvalidOption(_) => "Bu variant seçilə bilməz.".to_string(),
        GameError::LifelineUsed(lifeline) => format!("{lifeline} artıq istifadə olunub."),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_player_commands() {
        assert_eq!(Input::parse("A"), Some(Input::Answer(0)));
        assert_eq!(Input::parse(" d \n"), Some(Input::Answer(3)));
        assert_eq!(Input::parse("50"), Some(Input::FiftyFifty));
        assert_eq!(Input::parse("aud"), Some(Input::Audience));
        assert_eq!(Input::parse("ai"), Some(Input::Ai));
        assert_eq!(Input::parse("p"), Some(Input::TogglePause));
        assert_eq!(Input::parse("q"), Some(Input::Quit));
        assert_eq!(Input::parse("e"), None);
    }
}
