//! Move generation and attack detection

use crate::board::{Square, BISHOP_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRECTIONS};
use crate::pieces::{Color, Piece, PieceKind};
use crate::position::{CastleSide, Move, Position, KING_HOME_COL};

impl Position {
    // ========================================================================
    // LEGAL MOVES
    // ========================================================================

    /// All legal moves for a color
    pub fn legal_moves(&self, color: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(48);
        for (sq, piece) in self.pieces() {
            if piece.color == color {
                self.push_legal_moves(sq, piece, &mut moves);
            }
        }
        moves
    }

    /// Legal moves of the piece standing on `sq`
    pub fn legal_moves_from(&self, sq: Square) -> Vec<Move> {
        let mut moves = Vec::new();
        if let Some(piece) = self.piece_at(sq) {
            self.push_legal_moves(sq, piece, &mut moves);
        }
        moves
    }

    /// Whether the color has at least one legal move
    pub fn has_legal_move(&self, color: Color) -> bool {
        let mut buf = Vec::with_capacity(32);
        self.pieces().filter(|(_, p)| p.color == color).any(|(sq, piece)| {
            buf.clear();
            self.push_pseudo_moves(sq, piece, &mut buf);
            buf.iter().any(|mv| self.is_legal(mv, piece))
        })
    }

    fn push_legal_moves(&self, sq: Square, piece: Piece, moves: &mut Vec<Move>) {
        let start = moves.len();
        self.push_pseudo_moves(sq, piece, moves);
        let mut keep = start;
        for i in start..moves.len() {
            if self.is_legal(&moves[i], piece) {
                moves.swap(keep, i);
                keep += 1;
            }
        }
        moves.truncate(keep);
    }

    /// A pseudo-move is legal if the mover's king is not attacked afterwards.
    /// Only the mover (and an en passant victim) is relocated for the test.
    fn is_legal(&self, mv: &Move, piece: Piece) -> bool {
        let mut scratch = self.clone_board();
        scratch.set_piece(mv.to, Some(piece));
        scratch.set_piece(mv.from, None);
        if mv.en_passant {
            scratch.set_piece(Square::new(mv.from.row, mv.to.col), None);
        }
        !scratch.is_in_check(piece.color)
    }

    /// Copy of the grid only, for legality simulation
    fn clone_board(&self) -> Position {
        let mut scratch = Position::empty();
        scratch.cells = self.cells;
        scratch
    }

    // ========================================================================
    // PSEUDO-LEGAL MOVES
    // ========================================================================

    /// Pseudo-legal moves of the piece on `sq` (king safety not checked)
    pub fn pseudo_moves(&self, sq: Square) -> Vec<Move> {
        let mut moves = Vec::new();
        if let Some(piece) = self.piece_at(sq) {
            self.push_pseudo_moves(sq, piece, &mut moves);
        }
        moves
    }

    fn push_pseudo_moves(&self, sq: Square, piece: Piece, moves: &mut Vec<Move>) {
        match piece.kind {
            PieceKind::Pawn => self.pawn_moves(sq, piece.color, moves),
            PieceKind::Knight => self.step_moves(sq, piece.color, &KNIGHT_OFFSETS, moves),
            PieceKind::Bishop => self.slide_moves(sq, piece.color, &BISHOP_DIRECTIONS, moves),
            PieceKind::Rook => self.slide_moves(sq, piece.color, &ROOK_DIRECTIONS, moves),
            PieceKind::Queen => {
                self.slide_moves(sq, piece.color, &ROOK_DIRECTIONS, moves);
                self.slide_moves(sq, piece.color, &BISHOP_DIRECTIONS, moves);
            }
            PieceKind::King => {
                self.step_moves(sq, piece.color, &KING_OFFSETS, moves);
                self.castling_moves(sq, piece.color, moves);
            }
        }
    }

    fn pawn_moves(&self, sq: Square, color: Color, moves: &mut Vec<Move>) {
        let dir = color.forward();

        let push = |moves: &mut Vec<Move>, to: Square| {
            let mut mv = Move::new(sq, to);
            if to.row == color.promotion_row() {
                mv.promotion = Some(PieceKind::Queen);
            }
            moves.push(mv);
        };

        // Single and double push
        if let Some(one) = sq.offset(dir, 0) {
            if self.piece_at(one).is_none() {
                push(moves, one);
                if sq.row == color.pawn_start_row() {
                    if let Some(two) = sq.offset(2 * dir, 0) {
                        if self.piece_at(two).is_none() {
                            moves.push(Move::new(sq, two));
                        }
                    }
                }
            }
        }

        // Diagonal captures
        for dc in [-1, 1] {
            if let Some(target) = sq.offset(dir, dc) {
                if matches!(self.piece_at(target), Some(p) if p.color != color) {
                    push(moves, target);
                }
            }
        }

        // En passant: the pawn sits one row behind the target, one file away
        if let (Some(ep), true) = (self.en_passant, color == self.side_to_move) {
            let victim = Square::new(sq.row, ep.col);
            if sq.row == ep.row - dir
                && (sq.col - ep.col).abs() == 1
                && self.piece_at(victim) == Some(Piece::new(PieceKind::Pawn, color.opponent()))
            {
                let mut mv = Move::new(sq, ep);
                mv.en_passant = true;
                moves.push(mv);
            }
        }
    }

    fn step_moves(&self, sq: Square, color: Color, offsets: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(dr, dc) in offsets {
            if let Some(to) = sq.offset(dr, dc) {
                match self.piece_at(to) {
                    Some(p) if p.color == color => {}
                    _ => moves.push(Move::new(sq, to)),
                }
            }
        }
    }

    fn slide_moves(&self, sq: Square, color: Color, dirs: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(dr, dc) in dirs {
            let mut current = sq;
            while let Some(next) = current.offset(dr, dc) {
                current = next;
                match self.piece_at(current) {
                    None => moves.push(Move::new(sq, current)),
                    Some(p) => {
                        if p.color != color {
                            moves.push(Move::new(sq, current));
                        }
                        break; // Blocked
                    }
                }
            }
        }
    }

    fn castling_moves(&self, sq: Square, color: Color, moves: &mut Vec<Move>) {
        let home = color.home_row();
        if sq != Square::new(home, KING_HOME_COL) {
            return;
        }
        let enemy = color.opponent();

        for side in [CastleSide::Kingside, CastleSide::Queenside] {
            if !self.castling.has(color, side) {
                continue;
            }

            let rook_sq = Square::new(home, side.rook_from_col());
            if self.piece_at(rook_sq) != Some(Piece::new(PieceKind::Rook, color)) {
                continue;
            }

            // Every square strictly between king and rook must be empty
            let (lo, hi) = if side.rook_from_col() > KING_HOME_COL {
                (KING_HOME_COL + 1, side.rook_from_col())
            } else {
                (side.rook_from_col() + 1, KING_HOME_COL)
            };
            if (lo..hi).any(|col| self.piece_at(Square::new(home, col)).is_some()) {
                continue;
            }

            // King may not start in, pass through, or land on an attacked square
            let king_to = side.king_to_col();
            let step = if king_to > KING_HOME_COL { 1 } else { -1 };
            let mut col = KING_HOME_COL;
            let mut safe = true;
            loop {
                if self.is_square_attacked(Square::new(home, col), enemy) {
                    safe = false;
                    break;
                }
                if col == king_to {
                    break;
                }
                col += step;
            }

            if safe {
                let mut mv = Move::new(sq, Square::new(home, king_to));
                mv.castling = Some(side);
                moves.push(mv);
            }
        }
    }

    // ========================================================================
    // ATTACK DETECTION
    // ========================================================================

    /// Whether any piece of `by` attacks `target`.
    ///
    /// Uses direct geometric reachability, never move generation.
    pub fn is_square_attacked(&self, target: Square, by: Color) -> bool {
        self.pieces()
            .any(|(sq, piece)| piece.color == by && self.can_piece_attack(sq, piece, target))
    }

    /// Whether the color's king is attacked. False when the king is missing.
    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(king) => self.is_square_attacked(king, color.opponent()),
            None => false,
        }
    }

    fn can_piece_attack(&self, from: Square, piece: Piece, to: Square) -> bool {
        if from == to {
            return false;
        }
        let dr = to.row - from.row;
        let dc = to.col - from.col;

        match piece.kind {
            PieceKind::Pawn => dr == piece.color.forward() && dc.abs() == 1,
            PieceKind::Knight => KNIGHT_OFFSETS.contains(&(dr, dc)),
            PieceKind::King => dr.abs() <= 1 && dc.abs() <= 1,
            PieceKind::Bishop => dr.abs() == dc.abs() && self.is_path_clear(from, to),
            PieceKind::Rook => (dr == 0 || dc == 0) && self.is_path_clear(from, to),
            PieceKind::Queen => {
                (dr == 0 || dc == 0 || dr.abs() == dc.abs()) && self.is_path_clear(from, to)
            }
        }
    }

    /// Squares strictly between `from` and `to` on a line are empty
    fn is_path_clear(&self, from: Square, to: Square) -> bool {
        let dr = (to.row - from.row).signum();
        let dc = (to.col - from.col).signum();
        let mut current = Square::new(from.row + dr, from.col + dc);
        while current != to {
            if self.piece_at(current).is_some() {
                return false;
            }
            current = Square::new(current.row + dr, current.col + dc);
        }
        true
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn targets(moves: &[Move]) -> Vec<String> {
        let mut names: Vec<String> = moves.iter().map(|m| m.to.to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_initial_move_count() {
        let pos = Position::new_game();
        assert_eq!(pos.legal_moves(Color::Light).len(), 20);
        assert_eq!(pos.legal_moves(Color::Dark).len(), 20);
    }

    #[test]
    fn test_pawn_pushes() {
        let pos = Position::new_game();
        assert_eq!(targets(&pos.legal_moves_from(sq("e2"))), vec!["e3", "e4"]);
        assert_eq!(targets(&pos.legal_moves_from(sq("d7"))), vec!["d5", "d6"]);
        assert!(pos.legal_moves_from(sq("e4")).is_empty());
    }

    #[test]
    fn test_knight_moves() {
        let pos = Position::new_game();
        assert_eq!(targets(&pos.legal_moves_from(sq("g1"))), vec!["f3", "h3"]);
    }

    #[test]
    fn test_sliders_blocked_at_start() {
        let pos = Position::new_game();
        for name in ["a1", "c1", "d1", "h8"] {
            assert!(pos.legal_moves_from(sq(name)).is_empty(), "{name} should be blocked");
        }
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        let pos = Position::from_fen("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        assert!(pos.legal_moves_from(sq("e2")).is_empty());
        assert!(!pos.pseudo_moves(sq("e2")).is_empty());
    }

    #[test]
    fn test_attack_detection() {
        let pos = Position::new_game();
        assert!(pos.is_square_attacked(sq("f3"), Color::Light));
        assert!(pos.is_square_attacked(sq("d3"), Color::Light));
        assert!(!pos.is_square_attacked(sq("e4"), Color::Light));
        assert!(pos.is_square_attacked(sq("e6"), Color::Dark));
        assert!(!pos.is_in_check(Color::Light));
    }

    #[test]
    fn test_slider_attack_blocked() {
        let pos = Position::from_fen("4k3/8/8/8/r2P3K/8/8/8 w - - 0 1").unwrap();
        assert!(!pos.is_in_check(Color::Light));
        assert!(pos.is_square_attacked(sq("c4"), Color::Dark));
        assert!(!pos.is_square_attacked(sq("e4"), Color::Dark));
    }

    #[test]
    fn test_pawn_attacks_direction() {
        let pos = Position::from_fen("4k3/8/8/3p4/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(pos.is_square_attacked(sq("c4"), Color::Dark));
        assert!(pos.is_square_attacked(sq("e4"), Color::Dark));
        assert!(!pos.is_square_attacked(sq("c6"), Color::Dark));
    }

    #[test]
    fn test_promotion_moves_default_to_queen() {
        let pos = Position::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        let moves = pos.legal_moves_from(sq("e7"));
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].promotion, Some(PieceKind::Queen));
    }

    #[test]
    fn test_castling_generated_when_clear() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let king_moves = pos.legal_moves_from(sq("e1"));
        let castles: Vec<_> = king_moves.iter().filter_map(|m| m.castling).collect();
        assert!(castles.contains(&CastleSide::Kingside));
        assert!(castles.contains(&CastleSide::Queenside));
    }

    #[test]
    fn test_castling_blocked_by_attack() {
        // Dark rook on f8 covers f1
        let pos = Position::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let castles: Vec<_> = pos
            .legal_moves_from(sq("e1"))
            .iter()
            .filter_map(|m| m.castling)
            .collect();
        assert_eq!(castles, vec![CastleSide::Queenside]);
    }

    #[test]
    fn test_no_castling_out_of_check() {
        let pos = Position::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(pos.is_in_check(Color::Light));
        assert!(pos.legal_moves_from(sq("e1")).iter().all(|m| m.castling.is_none()));
    }

    #[test]
    fn test_queenside_needs_b_file_empty() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/RN2K3 w Q - 0 1").unwrap();
        assert!(pos.legal_moves_from(sq("e1")).iter().all(|m| m.castling.is_none()));
    }
}
