//! Terminal UI for the swap puzzle.

mod app;
mod input;
mod ui;

use std::io;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::time::{Duration, sleep};
use tracing::{error, info, instrument, warn};

use crate::driver::SessionDriver;
use crate::games::puzzle::{Phase, Submission};

use app::{App, AppCommand};

/// Runs the game in the terminal until the player quits.
pub async fn run_tui(driver: SessionDriver) -> Result<()> {
    // Setup logging to file to avoid interfering with TUI
    let log_file = std::fs::File::create("swap_puzzle_tui.log")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init(); // Don't panic if already initialized

    info!("Starting Swap Puzzle TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_game(&mut terminal, driver).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

#[instrument(skip_all)]
async fn run_game<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut driver: SessionDriver,
) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    let config = driver.session().config().clone();
    let mut app = App::new(*config.rows(), *config.cols(), *config.drag_threshold());
    let mut last_phase = driver.session().phase();

    loop {
        driver.pump(Instant::now());
        app.sync_board(driver.session());

        let phase = driver.session().phase();
        if phase != last_phase {
            info!(from = %last_phase, to = %phase, "Phase changed");
            if phase != Phase::Playing {
                app.invalidate_leaderboard();
            }
            last_phase = phase;
        }
        let upload_settled = !matches!(driver.session().submission(), Submission::Pending);
        if app.leaderboard_stale()
            && phase != Phase::Playing
            && upload_settled
            && !driver.standings_loading()
        {
            driver.refresh_standings();
            app.begin_leaderboard_fetch();
        }
        if let Some(result) = driver.take_standings() {
            app.set_leaderboard(result.map_err(|e| e.to_string()));
        }

        terminal.draw(|f| ui::draw(f, &mut app, driver.session()))?;

        // Poll for input with short timeout to keep the countdown smooth.
        if event::poll(Duration::from_millis(50))? {
            let command = match event::read()? {
                // Skip key release events (crossterm fires both press and release).
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    app.handle_key(key, driver.session())
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse, driver.session()),
                _ => AppCommand::None,
            };
            match command {
                AppCommand::None => {}
                AppCommand::Quit => {
                    info!("User quit");
                    return Ok(());
                }
                AppCommand::Dispatch(event) => {
                    if let Err(e) = driver.dispatch(event) {
                        warn!(error = %e, "Input rejected");
                    }
                }
            }
        }

        sleep(Duration::from_millis(10)).await;
    }
}
