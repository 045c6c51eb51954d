//! Iterative-deepening negamax AI with alpha-beta pruning

use crate::error::UnknownLevel;
use crate::eval::{evaluate, MATE_VALUE};
use crate::pieces::{Color, PieceKind};
use crate::position::{Move, Position, Status};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Scores beyond this magnitude are forced mates
pub const MATE_THRESHOLD: i32 = 9000;

/// Window bound, kept well inside i32 so negation never overflows
const INFINITY: i32 = 1_000_000;

// ============================================================================
// DIFFICULTY
// ============================================================================

/// Difficulty presets mapped to search depth
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl AiLevel {
    pub fn depth(self) -> u32 {
        match self {
            AiLevel::Easy => 4,
            AiLevel::Medium => 5,
            AiLevel::Hard => 6,
        }
    }
}

impl FromStr for AiLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(AiLevel::Easy),
            "medium" => Ok(AiLevel::Medium),
            "hard" => Ok(AiLevel::Hard),
            _ => Err(UnknownLevel(s.to_owned())),
        }
    }
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Outcome of one search call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    pub best_move: Option<Move>,
    /// Score of the best move from the searching side's view
    pub score: i32,
    /// Deepest iteration completed
    pub depth: u32,
    pub nodes: u64,
}

/// Alpha-Beta AI player
#[derive(Clone, Copy, Debug)]
pub struct AlphaBetaAI {
    pub depth: u32,
}

impl AlphaBetaAI {
    pub fn new(depth: u32) -> Self {
        Self { depth }
    }

    pub fn from_level(level: AiLevel) -> Self {
        Self::new(level.depth())
    }

    /// Get best move for current position
    pub fn best_move(&self, pos: &Position) -> Option<Move> {
        self.search(pos).best_move
    }

    /// Search with statistics
    pub fn search(&self, pos: &Position) -> SearchReport {
        search(pos, self.depth)
    }

    /// Play both sides until the game ends or `max_plies` moves were made
    pub fn play_game(&self, initial: Position, max_plies: usize) -> (Position, Vec<Move>) {
        let mut pos = initial;
        let mut history = Vec::new();

        while !pos.status().is_terminal() && history.len() < max_plies {
            match self.best_move(&pos) {
                Some(mv) => {
                    pos.apply_legal(mv);
                    history.push(mv);
                }
                None => break,
            }
        }

        (pos, history)
    }
}

impl Default for AlphaBetaAI {
    fn default() -> Self {
        Self::from_level(AiLevel::default())
    }
}

/// Pick a move for the side to move, or None when it has no legal move
pub fn choose_move(pos: &Position, max_depth: u32) -> Option<Move> {
    search(pos, max_depth).best_move
}

/// Iterative deepening from depth 1 to `max_depth`.
///
/// Keeps the best move of the deepest finished iteration and stops early
/// once a forced mate is seen.
pub fn search(pos: &Position, max_depth: u32) -> SearchReport {
    let mut searcher = Searcher::new(true);
    let perspective = pos.side_to_move().sign();
    let mut report = SearchReport {
        best_move: None,
        score: 0,
        depth: 0,
        nodes: 0,
    };

    for depth in 1..=max_depth.max(1) {
        let (score, mv) = searcher.negamax(pos, depth, -INFINITY, INFINITY, perspective, false);
        if mv.is_some() {
            report.best_move = mv;
        }
        report.score = score;
        report.depth = depth;

        if score.abs() > MATE_THRESHOLD {
            break;
        }
    }

    report.nodes = searcher.nodes;
    report
}

/// Negamax without pruning, for checking that cutoffs never change the
/// root score. Same ordering and extension rules as `search`.
pub fn full_width_score(pos: &Position, depth: u32) -> i32 {
    let mut searcher = Searcher::new(false);
    let perspective = pos.side_to_move().sign();
    searcher
        .negamax(pos, depth, -INFINITY, INFINITY, perspective, false)
        .0
}

/// Score of a single fixed-depth alpha-beta pass (no iterative deepening)
pub fn alpha_beta_score(pos: &Position, depth: u32) -> i32 {
    let mut searcher = Searcher::new(true);
    let perspective = pos.side_to_move().sign();
    searcher
        .negamax(pos, depth, -INFINITY, INFINITY, perspective, false)
        .0
}

// ============================================================================
// NEGAMAX WITH ALPHA-BETA
// ============================================================================

struct Searcher {
    nodes: u64,
    prune: bool,
}

impl Searcher {
    fn new(prune: bool) -> Self {
        Self { nodes: 0, prune }
    }

    /// `perspective` is +1 when light is to move at this node, -1 otherwise.
    /// `extended` marks a subtree already granted the quiescence ply.
    fn negamax(
        &mut self,
        pos: &Position,
        depth: u32,
        mut alpha: i32,
        beta: i32,
        perspective: i32,
        extended: bool,
    ) -> (i32, Option<Move>) {
        self.nodes += 1;

        if depth == 0 {
            return (perspective * evaluate(pos), None);
        }

        match pos.status() {
            Status::Checkmate => {
                return (perspective * -pos.side_to_move().sign() * MATE_VALUE, None);
            }
            Status::Stalemate => return (0, None),
            Status::Active | Status::Check => {}
        }

        let moves = order_moves(pos, pos.legal_moves(pos.side_to_move()));
        if moves.is_empty() {
            let score = if pos.is_in_check(pos.side_to_move()) {
                -MATE_VALUE
            } else {
                0
            };
            return (score, None);
        }

        let mut best_score = -INFINITY;
        let mut best_move = None;

        for mv in moves {
            let mut child = pos.clone();
            let outcome = child.apply_legal(mv);

            // Quiescence: one extra ply after a capture or check at the horizon
            let extend = depth == 1 && !extended && (outcome.captured.is_some() || outcome.is_check);
            let child_depth = if extend { 1 } else { depth - 1 };

            let (child_score, _) = self.negamax(
                &child,
                child_depth,
                -beta,
                -alpha,
                -perspective,
                extended || extend,
            );
            let score = -child_score;

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }

            alpha = alpha.max(score);
            if self.prune && alpha >= beta {
                break; // Beta cutoff
            }
        }

        (best_score, best_move)
    }
}

// ============================================================================
// MOVE ORDERING
// ============================================================================

/// Captures by MVV-LVA, then checking moves, then the rest in generation order
pub fn order_moves(pos: &Position, moves: Vec<Move>) -> Vec<Move> {
    let mut captures: Vec<(i32, Move)> = Vec::new();
    let mut checks = Vec::new();
    let mut quiet = Vec::new();
    let color = pos.side_to_move();

    for mv in moves {
        let attacker = match pos.piece_at(mv.from) {
            Some(p) => p,
            None => continue,
        };
        let victim = if mv.en_passant {
            Some(PieceKind::Pawn)
        } else {
            pos.piece_at(mv.to).map(|p| p.kind)
        };

        if let Some(victim) = victim {
            captures.push((victim.value() - attacker.kind.value(), mv));
        } else if gives_check(pos, mv, color) {
            checks.push(mv);
        } else {
            quiet.push(mv);
        }
    }

    captures.sort_by(|a, b| b.0.cmp(&a.0));

    let mut ordered = Vec::with_capacity(captures.len() + checks.len() + quiet.len());
    ordered.extend(captures.into_iter().map(|(_, mv)| mv));
    ordered.extend(checks);
    ordered.extend(quiet);
    ordered
}

fn gives_check(pos: &Position, mv: Move, color: Color) -> bool {
    let mut probe = pos.clone();
    probe.transition(mv);
    probe.is_in_check(color.opponent())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn test_ai_returns_move() {
        let pos = Position::new_game();
        let mv = AlphaBetaAI::new(2).best_move(&pos);
        assert!(mv.is_some());
        assert!(pos.legal_moves(Color::Light).contains(&mv.unwrap()));
    }

    #[test]
    fn test_no_move_when_game_over() {
        let mate = Position::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        assert_eq!(choose_move(&mate, 3), None);
    }

    #[test]
    fn test_finds_mate_in_one() {
        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let report = search(&pos, 3);
        assert_eq!(report.best_move.map(|m| (m.from, m.to)), Some((sq("a1"), sq("a8"))));
        assert!(report.score > MATE_THRESHOLD);
        // Mate found at depth 1 ends the deepening
        assert_eq!(report.depth, 1);
    }

    #[test]
    fn test_takes_hanging_queen() {
        let pos = Position::from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
        let mv = choose_move(&pos, 2).unwrap();
        assert_eq!((mv.from, mv.to), (sq("d2"), sq("d5")));
    }

    #[test]
    fn test_move_ordering_mvv_lva() {
        // Pawn and queen can both take the rook; pawn takes first
        let pos = Position::from_fen("4k3/8/8/3r4/4P3/8/8/3QK3 w - - 0 1").unwrap();
        let ordered = order_moves(&pos, pos.legal_moves(Color::Light));
        assert_eq!((ordered[0].from, ordered[0].to), (sq("e4"), sq("d5")));
        assert_eq!((ordered[1].from, ordered[1].to), (sq("d1"), sq("d5")));
    }

    #[test]
    fn test_checks_ordered_after_captures() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let ordered = order_moves(&pos, pos.legal_moves(Color::Light));
        assert_eq!((ordered[0].from, ordered[0].to), (sq("a1"), sq("a8")));
    }

    #[test]
    fn test_pruning_preserves_score() {
        let pos = Position::from_fen(
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
        )
        .unwrap();
        assert_eq!(alpha_beta_score(&pos, 2), full_width_score(&pos, 2));
    }

    #[test]
    fn test_search_does_not_mutate() {
        let pos = Position::new_game();
        let before = pos.clone();
        let _ = search(&pos, 2);
        assert_eq!(pos, before);
    }

    #[test]
    fn test_levels() {
        assert_eq!("hard".parse::<AiLevel>().unwrap().depth(), 6);
        assert_eq!(AiLevel::default().depth(), 5);
        assert!("insane".parse::<AiLevel>().is_err());
    }

    #[test]
    fn test_play_game() {
        let ai = AlphaBetaAI::new(1);
        let (final_pos, history) = ai.play_game(Position::new_game(), 4);
        assert_eq!(history.len(), 4);
        assert_eq!(final_pos.history().len(), 4);
        assert_eq!(final_pos.side_to_move(), Color::Light);
    }
}
