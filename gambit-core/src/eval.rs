//! Position evaluation
//!
//! Scores are in centipawns from light's point of view: positive favors
//! light. Every term is computed per side and netted as light minus dark,
//! so a color-flipped position scores the exact negation.

use crate::board::{Square, CENTER_SQUARES, EXTENDED_CENTER};
use crate::pieces::{Color, Piece, PieceKind};
use crate::position::{Position, Status};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Score of a checkmated position (sign gives the winner)
pub const MATE_VALUE: i32 = 10000;

const MOBILITY_WEIGHT: i32 = 8;

const DOUBLED_PAWN_PENALTY: i32 = 20;
const ISOLATED_PAWN_PENALTY: i32 = 15;
const PASSED_PAWN_BONUS: i32 = 30;
const PASSED_PAWN_RANK_BONUS: i32 = 20;

const KING_ATTACKED_PENALTY: i32 = 50;
const PAWN_SHIELD_BONUS: i32 = 10;

const CENTER_OCCUPY_BONUS: i32 = 20;
const CENTER_ATTACK_BONUS: i32 = 15;
const EXTENDED_CENTER_ATTACK_BONUS: i32 = 5;

const OPEN_FILE_ROOK_BONUS: i32 = 20;
const SEMI_OPEN_FILE_ROOK_BONUS: i32 = 10;
const BISHOP_PAIR_BONUS: i32 = 30;

type PieceSquareTable = [[i32; 8]; 8];

// Tables are written from light's side: row 0 is light's promotion rank.
const PAWN_TABLE: PieceSquareTable = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [50, 50, 50, 50, 50, 50, 50, 50],
    [10, 10, 20, 30, 30, 20, 10, 10],
    [5, 5, 10, 25, 25, 10, 5, 5],
    [0, 0, 0, 20, 20, 0, 0, 0],
    [5, -5, -10, 0, 0, -10, -5, 5],
    [5, 10, 10, -20, -20, 10, 10, 5],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

const KNIGHT_TABLE: PieceSquareTable = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20, 0, 0, 0, 0, -20, -40],
    [-30, 0, 10, 15, 15, 10, 0, -30],
    [-30, 5, 15, 20, 20, 15, 5, -30],
    [-30, 0, 15, 20, 20, 15, 0, -30],
    [-30, 5, 10, 15, 15, 10, 5, -30],
    [-40, -20, 0, 5, 5, 0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];

const BISHOP_TABLE: PieceSquareTable = [
    [-20, -10, -10, -10, -10, -10, -10, -20],
    [-10, 0, 0, 0, 0, 0, 0, -10],
    [-10, 0, 5, 10, 10, 5, 0, -10],
    [-10, 5, 5, 10, 10, 5, 5, -10],
    [-10, 0, 10, 10, 10, 10, 0, -10],
    [-10, 10, 10, 10, 10, 10, 10, -10],
    [-10, 5, 0, 0, 0, 0, 5, -10],
    [-20, -10, -10, -10, -10, -10, -10, -20],
];

const ROOK_TABLE: PieceSquareTable = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [5, 10, 10, 10, 10, 10, 10, 5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [0, 0, 0, 5, 5, 0, 0, 0],
];

const QUEEN_TABLE: PieceSquareTable = [
    [-20, -10, -10, -5, -5, -10, -10, -20],
    [-10, 0, 0, 0, 0, 0, 0, -10],
    [-10, 0, 5, 5, 5, 5, 0, -10],
    [-5, 0, 5, 5, 5, 5, 0, -5],
    [0, 0, 5, 5, 5, 5, 0, -5],
    [-10, 5, 5, 5, 5, 5, 0, -10],
    [-10, 0, 5, 0, 0, 0, 0, -10],
    [-20, -10, -10, -5, -5, -10, -10, -20],
];

const KING_TABLE: PieceSquareTable = [
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-20, -30, -30, -40, -40, -30, -30, -20],
    [-10, -20, -20, -20, -20, -20, -20, -10],
    [20, 20, 0, 0, 0, 0, 20, 20],
    [20, 30, 10, 0, 0, 10, 30, 20],
];

// ============================================================================
// EVALUATION
// ============================================================================

/// Evaluate a position. Positive favors light.
pub fn evaluate(pos: &Position) -> i32 {
    match pos.status() {
        Status::Checkmate => return -pos.side_to_move().sign() * MATE_VALUE,
        Status::Stalemate => return 0,
        Status::Active | Status::Check => {}
    }

    let mut score = 0;

    for (sq, piece) in pos.pieces() {
        score += piece.color.sign() * (piece.kind.value() + piece_square_value(piece, sq));
    }

    let light_mobility = pos.legal_moves(Color::Light).len() as i32;
    let dark_mobility = pos.legal_moves(Color::Dark).len() as i32;
    score += (light_mobility - dark_mobility) * MOBILITY_WEIGHT;

    for color in [Color::Light, Color::Dark] {
        let side = pawn_structure(pos, color)
            + king_safety(pos, color)
            + center_control(pos, color)
            + piece_coordination(pos, color);
        score += color.sign() * side;
    }

    score
}

/// Positional bonus for a piece on a square
pub fn piece_square_value(piece: Piece, sq: Square) -> i32 {
    let table = match piece.kind {
        PieceKind::Pawn => &PAWN_TABLE,
        PieceKind::Knight => &KNIGHT_TABLE,
        PieceKind::Bishop => &BISHOP_TABLE,
        PieceKind::Rook => &ROOK_TABLE,
        PieceKind::Queen => &QUEEN_TABLE,
        PieceKind::King => &KING_TABLE,
    };
    let row = match piece.color {
        Color::Light => sq.row,
        Color::Dark => 7 - sq.row,
    };
    table[row as usize][sq.col as usize]
}

// ============================================================================
// TERMS
// ============================================================================

fn pawns_of(pos: &Position, color: Color) -> Vec<Square> {
    pos.pieces()
        .filter(|(_, p)| p.kind == PieceKind::Pawn && p.color == color)
        .map(|(sq, _)| sq)
        .collect()
}

fn pawn_structure(pos: &Position, color: Color) -> i32 {
    let pawns = pawns_of(pos, color);
    let mut score = 0;

    // Doubled
    let mut per_file = [0i32; 8];
    for sq in &pawns {
        per_file[sq.col as usize] += 1;
    }
    for &count in &per_file {
        if count > 1 {
            score -= DOUBLED_PAWN_PENALTY * (count - 1);
        }
    }

    for sq in &pawns {
        // Isolated
        let has_neighbor = pawns.iter().any(|o| (o.col - sq.col).abs() == 1);
        if !has_neighbor {
            score -= ISOLATED_PAWN_PENALTY;
        }

        // Passed
        if is_passed(pos, *sq, color) {
            let advanced = i32::from((color.home_row() - sq.row).abs());
            score += PASSED_PAWN_BONUS + advanced * PASSED_PAWN_RANK_BONUS;
        }
    }

    score
}

/// No enemy pawn ahead on the same or an adjacent file
fn is_passed(pos: &Position, sq: Square, color: Color) -> bool {
    let enemy_pawn = Piece::new(PieceKind::Pawn, color.opponent());
    let dir = color.forward();
    let mut row = sq.row + dir;
    while (0..8).contains(&row) {
        for col in (sq.col - 1).max(0)..=(sq.col + 1).min(7) {
            if pos.piece_at(Square::new(row, col)) == Some(enemy_pawn) {
                return false;
            }
        }
        row += dir;
    }
    true
}

fn king_safety(pos: &Position, color: Color) -> i32 {
    let king = pos
        .king_square(color)
        .expect("evaluated position is missing a king");
    let mut score = 0;

    if pos.is_square_attacked(king, color.opponent()) {
        score -= KING_ATTACKED_PENALTY;
    }

    // Pawn shield on the row in front of the king
    let shield_row = king.row + color.forward();
    if (0..8).contains(&shield_row) {
        let own_pawn = Piece::new(PieceKind::Pawn, color);
        for col in (king.col - 1).max(0)..=(king.col + 1).min(7) {
            if pos.piece_at(Square::new(shield_row, col)) == Some(own_pawn) {
                score += PAWN_SHIELD_BONUS;
            }
        }
    }

    score
}

fn center_control(pos: &Position, color: Color) -> i32 {
    let mut score = 0;

    for sq in CENTER_SQUARES {
        if pos.is_square_attacked(sq, color) {
            score += CENTER_ATTACK_BONUS;
        }
        if matches!(pos.piece_at(sq), Some(p) if p.color == color) {
            score += CENTER_OCCUPY_BONUS;
        }
    }

    for sq in EXTENDED_CENTER {
        if pos.is_square_attacked(sq, color) {
            score += EXTENDED_CENTER_ATTACK_BONUS;
        }
    }

    score
}

fn piece_coordination(pos: &Position, color: Color) -> i32 {
    let mut score = 0;
    let mut bishops = 0;

    for (sq, piece) in pos.pieces() {
        if piece.color != color {
            continue;
        }
        match piece.kind {
            PieceKind::Rook => {
                let file_pawns: Vec<Piece> = (0..8)
                    .filter_map(|row| pos.piece_at(Square::new(row, sq.col)))
                    .filter(|p| p.kind == PieceKind::Pawn)
                    .collect();
                if file_pawns.is_empty() {
                    score += OPEN_FILE_ROOK_BONUS;
                } else if file_pawns.iter().all(|p| p.color != color) {
                    score += SEMI_OPEN_FILE_ROOK_BONUS;
                }
            }
            PieceKind::Bishop => bishops += 1,
            _ => {}
        }
    }

    if bishops >= 2 {
        score += BISHOP_PAIR_BONUS;
    }

    score
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position_balanced() {
        assert_eq!(evaluate(&Position::new_game()), 0);
    }

    #[test]
    fn test_evaluate_idempotent() {
        let pos = Position::from_fen(
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
        )
        .unwrap();
        assert_eq!(evaluate(&pos), evaluate(&pos));
    }

    #[test]
    fn test_color_flip_negates() {
        let pos = Position::from_fen(
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
        )
        .unwrap();
        assert_eq!(evaluate(&pos.color_flipped()), -evaluate(&pos));
    }

    #[test]
    fn test_material_advantage() {
        // Light is a queen up
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert!(evaluate(&pos) > 800);
    }

    #[test]
    fn test_checkmate_scores() {
        let dark_mated = Position::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        assert_eq!(evaluate(&dark_mated), MATE_VALUE);
        assert_eq!(evaluate(&dark_mated.color_flipped()), -MATE_VALUE);
    }

    #[test]
    fn test_stalemate_scores_zero() {
        let pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(pos.status(), Status::Stalemate);
        assert_eq!(evaluate(&pos), 0);
    }

    #[test]
    fn test_piece_square_mirrored() {
        let light = Piece::new(PieceKind::Knight, Color::Light);
        let dark = Piece::new(PieceKind::Knight, Color::Dark);
        let sq = Square::from_algebraic("f3").unwrap();
        assert_eq!(piece_square_value(light, sq), piece_square_value(dark, sq.mirrored()));
    }

    #[test]
    fn test_pawn_structure_terms() {
        // Doubled isolated pawns on e-file
        let doubled = Position::from_fen("4k3/8/8/8/8/4P3/4P3/4K3 w - - 0 1").unwrap();
        let score = pawn_structure(&doubled, Color::Light);
        // -20 doubled, -15 isolated x2, both passed (30 + rank bonus each)
        assert_eq!(score, -20 - 30 + (30 + 40) + (30 + 20));
    }

    #[test]
    fn test_passed_pawn_blocked_by_adjacent_file() {
        let pos = Position::from_fen("4k3/3p4/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        assert!(!is_passed(&pos, Square::from_algebraic("e2").unwrap(), Color::Light));
        assert!(!is_passed(&pos, Square::from_algebraic("d7").unwrap(), Color::Dark));
    }

    #[test]
    fn test_rook_files_and_bishop_pair() {
        let pos = Position::from_fen("4k3/p7/8/8/8/8/8/R1B1KB1R w - - 0 1").unwrap();
        // a-file semi-open (dark pawn only), h-file open, two bishops
        assert_eq!(piece_coordination(&pos, Color::Light), 10 + 20 + 30);
    }

    #[test]
    fn test_king_shield() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/5PPP/6K1 w - - 0 1").unwrap();
        assert_eq!(king_safety(&pos, Color::Light), 30);
    }
}
