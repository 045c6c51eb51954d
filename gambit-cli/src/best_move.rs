//! Best-move command - search one position and report the AI's choice

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use gambit_core::{search, AiLevel, Position, Status, START_FEN};

#[derive(Args)]
pub struct BestMoveArgs {
    /// Position to search
    #[arg(long, default_value = START_FEN)]
    pub fen: String,

    /// Search depth in plies
    #[arg(long, short, conflicts_with = "level")]
    pub depth: Option<u32>,

    /// Difficulty preset: easy, medium or hard
    #[arg(long)]
    pub level: Option<AiLevel>,

    /// Output result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct BestMoveReport {
    fen: String,
    #[serde(rename = "move")]
    best_move: Option<String>,
    score: i32,
    depth: u32,
    nodes: u64,
    elapsed_ms: u64,
    status: Status,
}

pub fn run(args: BestMoveArgs) -> Result<()> {
    let pos = Position::from_fen(&args.fen)
        .with_context(|| format!("Invalid FEN: {}", args.fen))?;
    let depth = resolve_depth(&args);

    tracing::debug!("searching to depth {}", depth);
    let started = Instant::now();
    let result = search(&pos, depth);
    let report = BestMoveReport {
        fen: pos.to_fen(),
        best_move: result.best_move.map(|mv| mv.to_string()),
        score: result.score,
        depth: result.depth,
        nodes: result.nodes,
        elapsed_ms: started.elapsed().as_millis() as u64,
        status: pos.status(),
    };
    tracing::info!(
        "search finished: depth {} nodes {} in {} ms",
        report.depth,
        report.nodes,
        report.elapsed_ms
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}\n", pos);
    match &report.best_move {
        Some(mv) => println!(
            "Best move: {} (score {}, depth {}, {} nodes)",
            mv, report.score, report.depth, report.nodes
        ),
        None => println!("No legal move: {:?}", report.status),
    }
    Ok(())
}

fn resolve_depth(args: &BestMoveArgs) -> u32 {
    match (args.depth, args.level) {
        (Some(depth), _) => depth.max(1),
        (None, Some(level)) => level.depth(),
        (None, None) => AiLevel::default().depth(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(depth: Option<u32>, level: Option<AiLevel>) -> BestMoveArgs {
        BestMoveArgs {
            fen: START_FEN.to_string(),
            depth,
            level,
            json: false,
        }
    }

    #[test]
    fn test_resolve_depth() {
        assert_eq!(resolve_depth(&args(Some(2), None)), 2);
        assert_eq!(resolve_depth(&args(Some(0), None)), 1);
        assert_eq!(resolve_depth(&args(None, Some(AiLevel::Hard))), 6);
        assert_eq!(resolve_depth(&args(None, None)), 5);
    }
}
