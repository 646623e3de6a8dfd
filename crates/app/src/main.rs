use quiz_core::model::{ProfileDraft, RegistrationDraft};
use services::{AppServices, Clock};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod args;
mod play;
mod render;

use args::{Args, Command, ThemeAction, prepare_sqlite_file, print_usage};
use render::Palette;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let parsed = match Args::parse(argv) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;
    let palette = Palette::for_theme(app.preferences().load_theme().await?);

    match parsed.command {
        Command::Register => {
            let (username, password) = parsed.credentials()?;
            let draft = RegistrationDraft {
                username: username.to_string(),
                password: password.to_string(),
                name: parsed.name.clone().unwrap_or_default(),
                age: parsed.age.clone().unwrap_or_default(),
                gender: parsed.gender,
            };
            let account = app.accounts().register(draft).await?;
            println!("Qeydiyyat uğurludur!\n{}", render::account_summary(&account));
        }
        Command::Login => {
            let (username, password) = parsed.credentials()?;
            let account = app.accounts().login(username, password).await?;
            println!("Xoş gəldiniz, {}!", account.name());
            println!("{}", render::account_summary(&account));
        }
        Command::Profile => {
            let (username, password) = parsed.credentials()?;
            let mut account = app.accounts().login(username, password).await?;
            if parsed.has_profile_changes() {
                let current = account.profile();
                let draft = ProfileDraft {
                    name: parsed.name.clone().unwrap_or_else(|| current.name.clone()),
                    age: parsed
                        .age
                        .clone()
                        .or_else(|| current.age.map(|age| age.to_string()))
                        .unwrap_or_default(),
                    gender: parsed.gender.or(Some(current.gender)),
                };
                account = app.accounts().update_profile(username, draft).await?;
                println!("Profil yeniləndi.");
            }
            println!("{}", render::account_summary(&account));
        }
        Command::Topics => {
            let (username, password) = parsed.credentials()?;
            let account = app.accounts().login(username, password).await?;
            println!("{}", render::topics(&account, palette));
        }
        Command::Play => {
            let (username, password) = parsed.credentials()?;
            let topic = parsed.topic()?;
            let account = app.accounts().login(username, password).await?;
            if !app.hints_enabled() {
                tracing::info!("QUIZ_AI_API_KEY not set, the ai lifeline will give no hint");
            }
            let mut game = (*app.game_loop()).clone();
            if let Some(seed) = parsed.seed {
                game = game.with_seed(seed);
            }
            play::run(&game, account.username(), topic, palette).await?;
        }
        Command::Leaderboard => {
            let rows = app.accounts().leaderboard(parsed.limit).await?;
            println!("{}", render::leaderboard(&rows, palette));
        }
        Command::Theme => {
            let preferences = app.preferences();
            let theme = match parsed.theme {
                ThemeAction::Show => preferences.load_theme().await?,
                ThemeAction::Toggle => preferences.toggle_theme().await?,
                ThemeAction::Set(theme) => preferences.save_theme(theme).await?,
            };
            println!("Tema: {theme}");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
