//! GAMBIT CLI - Command-line interface
//!
//! Commands:
//! - serve: Start the game server
//! - perft: Count move paths from a position
//! - best-move: Ask the AI for a move
//! - play: AI self-play

mod best_move;
mod perft_cmd;
mod play_cmd;
mod server;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gambit")]
#[command(about = "GAMBIT chess engine and game server", version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the game server
    Serve(server::ServerArgs),
    /// Count leaf nodes of the move tree
    Perft(perft_cmd::PerftArgs),
    /// Search a position and print the chosen move
    BestMove(best_move::BestMoveArgs),
    /// Let the AI play both sides
    Play(play_cmd::PlayArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Serve(args) => server::run(args),
        Commands::Perft(args) => perft_cmd::run(args),
        Commands::BestMove(args) => best_move::run(args),
        Commands::Play(args) => play_cmd::run(args),
    }
}

/// Logs go to stderr so `--json` output stays machine-readable
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
