//! Perft command - count move paths to validate the move generator
//!
//! - Level 1: run() - orchestration
//! - Level 2: count(), report()
//! - Level 3: formatting

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use gambit_core::{divide, perft, perft_unique, PerftCounts, Position, START_FEN};

#[derive(Args)]
pub struct PerftArgs {
    /// Position to start from
    #[arg(long, default_value = START_FEN)]
    pub fen: String,

    /// Plies to search
    #[arg(long, short)]
    pub depth: u32,

    /// Print node counts per root move
    #[arg(long)]
    pub divide: bool,

    /// Also count distinct leaf positions
    #[arg(long)]
    pub unique: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PerftReport {
    fen: String,
    depth: u32,
    counts: PerftCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    unique_positions: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    divide: Vec<(String, u64)>,
    elapsed_ms: u64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: PerftArgs) -> Result<()> {
    let pos = Position::from_fen(&args.fen)
        .with_context(|| format!("Invalid FEN: {}", args.fen))?;

    tracing::info!("perft depth {} from {}", args.depth, args.fen);

    let report = count(&pos, &args);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn count(pos: &Position, args: &PerftArgs) -> PerftReport {
    let started = Instant::now();

    let counts = perft(pos, args.depth);
    let unique_positions = args.unique.then(|| perft_unique(pos, args.depth));
    let split = if args.divide {
        divide(pos, args.depth)
            .into_iter()
            .map(|(mv, nodes)| (mv.to_string(), nodes))
            .collect()
    } else {
        Vec::new()
    };

    PerftReport {
        fen: pos.to_fen(),
        depth: args.depth,
        counts,
        unique_positions,
        divide: split,
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

// ============================================================================
// LEVEL 3 - FORMATTING
// ============================================================================

fn print_text(report: &PerftReport) {
    for (mv, nodes) in &report.divide {
        println!("{}: {}", mv, nodes);
    }
    if !report.divide.is_empty() {
        println!();
    }

    let c = &report.counts;
    println!("=== Perft depth {} ===", report.depth);
    println!("Nodes:       {}", c.nodes);
    println!("Captures:    {}", c.captures);
    println!("En passant:  {}", c.en_passant);
    println!("Castles:     {}", c.castles);
    println!("Promotions:  {}", c.promotions);
    println!("Checks:      {}", c.checks);
    println!("Checkmates:  {}", c.checkmates);
    if let Some(unique) = report.unique_positions {
        println!("Unique:      {}", unique);
    }
    println!(
        "Time:        {} ms ({} nodes/s)",
        report.elapsed_ms,
        nodes_per_second(c.nodes, report.elapsed_ms)
    );
}

fn nodes_per_second(nodes: u64, elapsed_ms: u64) -> u64 {
    nodes * 1000 / elapsed_ms.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(depth: u32) -> PerftArgs {
        PerftArgs {
            fen: START_FEN.to_string(),
            depth,
            divide: true,
            unique: true,
            json: false,
        }
    }

    #[test]
    fn test_count_start_position() {
        let report = count(&Position::new_game(), &args(2));
        assert_eq!(report.counts.nodes, 400);
        assert_eq!(report.unique_positions, Some(400));
        assert_eq!(report.divide.len(), 20);
    }

    #[test]
    fn test_nodes_per_second_zero_elapsed() {
        assert_eq!(nodes_per_second(500, 0), 500_000);
    }
}
