// ============================================
// src/main.rs (メインファイル)
// ============================================

use std::io::{self, stdout};
use std::path::Path;
use std::time::{Duration, Instant};

mod app;
mod config;
mod effects;
mod error;
mod game;
mod logging;
mod questions;
mod speech;
mod store;
mod ui;
mod words;

use app::App;
use clap::Parser;
use config::Args;
use console::style;
use dialoguer::Confirm;
use error::AppError;
use speech::Speaker;
use store::Store;

use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};

use ratatui::prelude::*;

// --------------------------------------------------
// メイン関数 (TUIセットアップと実行ループ)
// --------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    let data_dir = args.data_dir();
    logging::init(&data_dir, args.log_level());

    if args.reset {
        return reset(&data_dir, args.yes).await;
    }

    let seed_words = words::seed_words()?;
    let speaker = Speaker::new(!args.no_speech);
    let mut app = App::load(&data_dir, &seed_words, args.seed, speaker).await;

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app).await;
    restore_terminal(&mut terminal)?;
    result?;

    println!(
        "{}  {}",
        style("FUN WORDS").magenta().bold(),
        style(format!("High score: {}", app.high_score)).yellow()
    );
    Ok(())
}

/// 学習記録とハイスコアを消す (単語データは残す)
async fn reset(data_dir: &Path, skip_confirm: bool) -> Result<(), AppError> {
    let confirmed = skip_confirm
        || Confirm::new()
            .with_prompt("Delete all progress and the high score?")
            .default(false)
            .interact()?;
    if !confirmed {
        println!("{}", style("Nothing was deleted.").dim());
        return Ok(());
    }

    let mut store = Store::open(data_dir).await?;
    let previous = store.high_score().await?;
    store.reset_progress().await?;
    log::info!("progress reset in {}", data_dir.display());
    println!(
        "{} (high score was {})",
        style("Progress and high score were reset.").green(),
        previous
    );
    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal(_terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
    stdout().execute(Show)?; // カーソルを再表示
    stdout().execute(LeaveAlternateScreen)?; // 代替スクリーンを終了
    disable_raw_mode()?;
    Ok(())
}

async fn run_app(terminal: &mut Terminal<impl Backend>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key).await;
                }
            }
        }
        app.tick(Instant::now()).await;

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
