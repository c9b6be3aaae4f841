//! Command-line interface for swap_puzzle.

use clap::{Parser, Subcommand};

/// Swap Puzzle - timed picture puzzle with a shared leaderboard
#[derive(Parser, Debug)]
#[command(name = "swap_puzzle")]
#[command(about = "Timed swap puzzle game and leaderboard server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the leaderboard HTTP server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Path to the database file (created if it doesn't exist)
        #[arg(long, env = "SWAP_PUZZLE_DB", default_value = "swap_puzzle.db")]
        db_path: String,
    },

    /// Play the puzzle in the terminal
    Play {
        /// Path to a TOML game config; defaults apply if it is missing
        #[arg(short, long, default_value = "swap_puzzle.toml")]
        config: std::path::PathBuf,

        /// Local database for scores (ignored with --server-url)
        #[arg(long, env = "SWAP_PUZZLE_DB", default_value = "swap_puzzle.db")]
        db_path: String,

        /// Leaderboard server URL; scores go there instead of a local file
        #[arg(long)]
        server_url: Option<String>,

        /// Skip image downloads
        #[arg(long)]
        offline: bool,

        /// Seed for shuffles and image picks (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the leaderboard
    Scores {
        /// Local database to read (ignored with --server-url)
        #[arg(long, env = "SWAP_PUZZLE_DB", default_value = "swap_puzzle.db")]
        db_path: String,

        /// Leaderboard server URL
        #[arg(long)]
        server_url: Option<String>,
    },
}
