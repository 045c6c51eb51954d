//! Move-path enumeration for validating the move generator

use crate::position::{Move, Position, PositionKey, Status};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::ops::AddAssign;

/// Leaf statistics of a perft run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl AddAssign for PerftCounts {
    fn add_assign(&mut self, other: Self) {
        self.nodes += other.nodes;
        self.captures += other.captures;
        self.en_passant += other.en_passant;
        self.castles += other.castles;
        self.promotions += other.promotions;
        self.checks += other.checks;
        self.checkmates += other.checkmates;
    }
}

/// Count leaf nodes `depth` plies below `pos`, classifying the last move
pub fn perft(pos: &Position, depth: u32) -> PerftCounts {
    let mut counts = PerftCounts::default();
    if depth == 0 {
        counts.nodes = 1;
        return counts;
    }

    for mv in pos.legal_moves(pos.side_to_move()) {
        let mut child = pos.clone();
        let outcome = child.apply_legal(mv);

        if depth == 1 {
            counts.nodes += 1;
            if outcome.captured.is_some() {
                counts.captures += 1;
            }
            if mv.en_passant {
                counts.en_passant += 1;
            }
            if mv.castling.is_some() {
                counts.castles += 1;
            }
            if outcome.promotion.is_some() {
                counts.promotions += 1;
            }
            if outcome.is_check {
                counts.checks += 1;
            }
            if child.status() == Status::Checkmate {
                counts.checkmates += 1;
            }
        } else {
            counts += perft(&child, depth - 1);
        }
    }

    counts
}

/// Per-root-move node counts, sorted by move text
pub fn divide(pos: &Position, depth: u32) -> Vec<(Move, u64)> {
    let mut out: Vec<(Move, u64)> = pos
        .legal_moves(pos.side_to_move())
        .into_iter()
        .map(|mv| {
            let mut child = pos.clone();
            child.apply_legal(mv);
            let nodes = perft(&child, depth.saturating_sub(1)).nodes;
            (mv, nodes)
        })
        .collect();
    out.sort_by_key(|(mv, _)| mv.to_string());
    out
}

/// Number of distinct positions reachable in exactly `depth` plies
pub fn perft_unique(pos: &Position, depth: u32) -> usize {
    let mut seen = FxHashSet::default();
    collect_unique(pos, depth, &mut seen);
    seen.len()
}

fn collect_unique(pos: &Position, depth: u32, seen: &mut FxHashSet<PositionKey>) {
    if depth == 0 {
        seen.insert(pos.key());
        return;
    }
    for mv in pos.legal_moves(pos.side_to_move()) {
        let mut child = pos.clone();
        child.apply_legal(mv);
        collect_unique(&child, depth - 1, seen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perft_zero_is_one() {
        assert_eq!(perft(&Position::new_game(), 0).nodes, 1);
    }

    #[test]
    fn test_divide_sums_to_perft() {
        let pos = Position::new_game();
        let split = divide(&pos, 2);
        assert_eq!(split.len(), 20);
        assert!(split.iter().all(|(_, n)| *n == 20));
        assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), 400);
    }

    #[test]
    fn test_en_passant_and_castle_counted() {
        let pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/R3K3 w Q d6 0 2").unwrap();
        let counts = perft(&pos, 1);
        assert_eq!(counts.en_passant, 1);
        assert_eq!(counts.castles, 1);
        assert_eq!(counts.captures, 1);
    }
}
