//! Swap Puzzle - Unified CLI
//!
//! Leaderboard server, terminal game and score listing in one binary.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use rand::SeedableRng;
use rand::rngs::StdRng;
use swap_puzzle::{
    AssetLoader, GameConfig, GameSession, HttpAssetLoader, LeaderboardStore, OfflineAssetLoader,
    RestLeaderboard, Scheduler, ScoreRepository, SessionDriver, TOP_LIMIT, run_tui, serve,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            host,
            port,
            db_path,
        } => run_server(host, port, db_path).await,
        Command::Play {
            config,
            db_path,
            server_url,
            offline,
            seed,
        } => run_play(config, db_path, server_url, offline, seed).await,
        Command::Scores { db_path, server_url } => print_scores(db_path, server_url).await,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Picks the leaderboard backend: a remote server if given, else a local file.
#[instrument]
fn open_leaderboard(db_path: String, server_url: Option<String>) -> Result<Arc<dyn LeaderboardStore>> {
    Ok(match server_url {
        Some(url) => {
            info!(url = %url, "Using remote leaderboard");
            Arc::new(RestLeaderboard::new(url))
        }
        None => Arc::new(ScoreRepository::open(db_path)?),
    })
}

/// Run the leaderboard HTTP server
async fn run_server(host: String, port: u16, db_path: String) -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();

    info!(db_path = %db_path, "Starting Swap Puzzle leaderboard server");
    let store: Arc<dyn LeaderboardStore> = Arc::new(ScoreRepository::open(db_path)?);
    serve(host, port, store).await
}

/// Run the terminal game
async fn run_play(
    config_path: std::path::PathBuf,
    db_path: String,
    server_url: Option<String>,
    offline: bool,
    seed: Option<u64>,
) -> Result<()> {
    let config = GameConfig::load_or_default(&config_path)?;
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let session = GameSession::new(config, rng)?;
    let assets: Arc<dyn AssetLoader> = if offline {
        Arc::new(OfflineAssetLoader)
    } else {
        Arc::new(HttpAssetLoader::new())
    };
    let leaderboard = open_leaderboard(db_path, server_url)?;
    let driver = SessionDriver::new(session, Scheduler::default(), assets, leaderboard);
    run_tui(driver).await
}

/// Print the top scores
async fn print_scores(db_path: String, server_url: Option<String>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();

    let leaderboard = open_leaderboard(db_path, server_url)?;
    let scores = leaderboard.list_top(TOP_LIMIT).await?;
    if scores.is_empty() {
        println!("No scores yet.");
        return Ok(());
    }
    println!("{:<4} {:<24} {:>5}  {}", "#", "Player", "Score", "When");
    for (rank, record) in scores.iter().enumerate() {
        println!(
            "{:<4} {:<24} {:>5}  {}",
            rank + 1,
            record.player_name(),
            record.score(),
            record.created_at().format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
