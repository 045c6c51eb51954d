//! Play command - AI self-play from a position
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_random_opening(), play_engine_moves(), report_game()
//! - Level 3: describe_result(), format_move_list()
//! - Level 4: utilities

use anyhow::{Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use gambit_core::{AlphaBetaAI, Color, Move, Position, Status, START_FEN};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Starting position
    #[arg(long, default_value = START_FEN)]
    pub fen: String,

    /// AI search depth for both sides
    #[arg(long, short, default_value = "3")]
    pub depth: u32,

    /// Stop after this many plies
    #[arg(long, default_value = "200")]
    pub max_plies: usize,

    /// Seed for the random opening plies
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of uniformly random plies before the AI takes over
    #[arg(long, default_value = "0")]
    pub random_plies: usize,

    /// Output the game record as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct GameRecord {
    initial_fen: String,
    final_fen: String,
    moves: Vec<String>,
    result: &'static str,
    status: Status,
    depth: u32,
    seed: Option<u64>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Random opening plies (seeded)
/// 2. AI plays both sides
/// 3. Report the game
pub fn run(args: PlayArgs) -> Result<()> {
    let initial = Position::from_fen(&args.fen)
        .with_context(|| format!("Invalid FEN: {}", args.fen))?;
    let mut rng = create_rng(args.seed);

    tracing::info!(
        "Self-play: depth={}, max_plies={}, random_plies={}",
        args.depth,
        args.max_plies,
        args.random_plies
    );

    let (pos, mut moves) =
        play_random_opening(initial.clone(), args.random_plies.min(args.max_plies), &mut rng)?;
    let remaining = args.max_plies - moves.len();
    let (final_pos, engine_moves) = play_engine_moves(pos, args.depth, remaining);
    moves.extend(engine_moves);

    let record = GameRecord {
        initial_fen: initial.to_fen(),
        final_fen: final_pos.to_fen(),
        moves: moves.iter().map(Move::to_string).collect(),
        result: describe_result(&final_pos),
        status: final_pos.status(),
        depth: args.depth,
        seed: args.seed,
    };

    tracing::info!("Game over after {} plies: {}", moves.len(), record.result);

    report_game(&record, &initial, &final_pos, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play up to `plies` uniformly random legal moves
fn play_random_opening(
    initial: Position,
    plies: usize,
    rng: &mut ChaCha8Rng,
) -> Result<(Position, Vec<Move>)> {
    let mut pos = initial;
    let mut moves = Vec::with_capacity(plies);

    while moves.len() < plies && !pos.status().is_terminal() {
        let legal = pos.legal_moves(pos.side_to_move());
        if legal.is_empty() {
            break;
        }
        let mv = legal[rng.gen_range(0..legal.len())];
        pos.apply_move(mv.from, mv.to, mv.promotion)
            .with_context(|| format!("Random move {} rejected", mv))?;
        tracing::debug!("random ply {}: {}", moves.len() + 1, mv);
        moves.push(mv);
    }

    Ok((pos, moves))
}

/// AI plays both sides until the game ends or the ply budget runs out
fn play_engine_moves(pos: Position, depth: u32, max_plies: usize) -> (Position, Vec<Move>) {
    AlphaBetaAI::new(depth).play_game(pos, max_plies)
}

fn report_game(record: &GameRecord, initial: &Position, final_pos: &Position, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!("{}", format_move_list(initial, &record.moves));
    println!("\n{}\n", final_pos);
    println!("Result: {}", record.result);
    println!("FEN:    {}", record.final_fen);
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn describe_result(pos: &Position) -> &'static str {
    match (pos.status(), pos.side_to_move()) {
        (Status::Checkmate, Color::Dark) => "1-0 (checkmate)",
        (Status::Checkmate, Color::Light) => "0-1 (checkmate)",
        (Status::Stalemate, _) => "1/2-1/2 (stalemate)",
        _ => "* (unfinished)",
    }
}

/// Numbered move pairs, "1. e2e4 e7e5 2. ..."
fn format_move_list(initial: &Position, moves: &[String]) -> String {
    let mut out = String::new();
    let mut number = initial.fullmove_number();
    let mut color = initial.side_to_move();

    for (i, mv) in moves.iter().enumerate() {
        if color == Color::Light {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&format!("{}. {}", number, mv));
        } else {
            if i == 0 {
                out.push_str(&format!("{}... {}", number, mv));
            } else {
                out.push_str(&format!(" {}", mv));
            }
            number += 1;
        }
        color = color.opponent();
    }
    out
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
