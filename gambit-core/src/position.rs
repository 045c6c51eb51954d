//! Position data model

use crate::board::{all_squares, Square};
use crate::pieces::{Color, Piece, PieceKind};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Back-rank order from column a to column h
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Column the king starts on
pub(crate) const KING_HOME_COL: i8 = 4;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Castling side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// Column of the rook before castling
    pub fn rook_from_col(self) -> i8 {
        match self {
            CastleSide::Kingside => 7,
            CastleSide::Queenside => 0,
        }
    }

    /// Column of the rook after castling
    pub fn rook_to_col(self) -> i8 {
        match self {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        }
    }

    /// Column the king lands on
    pub fn king_to_col(self) -> i8 {
        match self {
            CastleSide::Kingside => 6,
            CastleSide::Queenside => 2,
        }
    }
}

/// Castling rights per color and side (can only be revoked)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    pub light_kingside: bool,
    pub light_queenside: bool,
    pub dark_kingside: bool,
    pub dark_queenside: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        light_kingside: true,
        light_queenside: true,
        dark_kingside: true,
        dark_queenside: true,
    };

    pub const NONE: CastlingRights = CastlingRights {
        light_kingside: false,
        light_queenside: false,
        dark_kingside: false,
        dark_queenside: false,
    };

    pub fn has(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::Light, CastleSide::Kingside) => self.light_kingside,
            (Color::Light, CastleSide::Queenside) => self.light_queenside,
            (Color::Dark, CastleSide::Kingside) => self.dark_kingside,
            (Color::Dark, CastleSide::Queenside) => self.dark_queenside,
        }
    }

    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        match (color, side) {
            (Color::Light, CastleSide::Kingside) => self.light_kingside = false,
            (Color::Light, CastleSide::Queenside) => self.light_queenside = false,
            (Color::Dark, CastleSide::Kingside) => self.dark_kingside = false,
            (Color::Dark, CastleSide::Queenside) => self.dark_queenside = false,
        }
    }

    pub fn revoke_all(&mut self, color: Color) {
        self.revoke(color, CastleSide::Kingside);
        self.revoke(color, CastleSide::Queenside);
    }
}

/// Game status from the perspective of the side to move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Check,
    Checkmate,
    Stalemate,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Checkmate | Status::Stalemate)
    }
}

/// A move value. Carries no engine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub en_passant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub castling: Option<CastleSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            en_passant: false,
            castling: None,
            promotion: None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

/// An applied move as kept in the history
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub piece: PieceKind,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub castling: Option<CastleSide>,
    pub en_passant: bool,
}

/// Identity of a position for repetition-free counting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PositionKey {
    cells: [[Option<Piece>; 8]; 8],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
}

// ============================================================================
// POSITION
// ============================================================================

/// Full game position (clone to explore)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub(crate) cells: [[Option<Piece>; 8]; 8],
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) status: Status,
    pub(crate) history: Vec<MoveRecord>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
}

impl Position {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Standard starting setup, light to move
    pub fn new_game() -> Self {
        let mut pos = Self::empty();
        for (col, &kind) in BACK_RANK.iter().enumerate() {
            let col = col as i8;
            pos.cells[0][col as usize] = Some(Piece::new(kind, Color::Dark));
            pos.cells[1][col as usize] = Some(Piece::new(PieceKind::Pawn, Color::Dark));
            pos.cells[6][col as usize] = Some(Piece::new(PieceKind::Pawn, Color::Light));
            pos.cells[7][col as usize] = Some(Piece::new(kind, Color::Light));
        }
        pos.castling = CastlingRights::ALL;
        pos
    }

    /// Board with no pieces and no rights
    pub(crate) fn empty() -> Self {
        Self {
            cells: [[None; 8]; 8],
            side_to_move: Color::Light,
            castling: CastlingRights::NONE,
            en_passant: None,
            status: Status::Active,
            history: Vec::new(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Piece on a square (None when empty or off the board)
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        if !sq.is_valid() {
            return None;
        }
        self.cells[sq.row as usize][sq.col as usize]
    }

    pub(crate) fn set_piece(&mut self, sq: Square, piece: Option<Piece>) {
        self.cells[sq.row as usize][sq.col as usize] = piece;
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// Rows of the grid, row 0 first
    pub fn rows(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.cells
    }

    /// Iterate occupied squares
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        all_squares().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Square of the given color's king
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.kind == PieceKind::King && p.color == color)
            .map(|(sq, _)| sq)
    }

    /// Hashable identity (board, side, rights, en passant)
    pub fn key(&self) -> PositionKey {
        PositionKey {
            cells: self.cells,
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
        }
    }

    /// Vertically mirrored position with colors swapped
    pub fn color_flipped(&self) -> Position {
        let mut flipped = Self::empty();
        for (sq, piece) in self.pieces() {
            flipped.set_piece(
                sq.mirrored(),
                Some(Piece::new(piece.kind, piece.color.opponent())),
            );
        }
        flipped.side_to_move = self.side_to_move.opponent();
        flipped.castling = CastlingRights {
            light_kingside: self.castling.dark_kingside,
            light_queenside: self.castling.dark_queenside,
            dark_kingside: self.castling.light_kingside,
            dark_queenside: self.castling.light_queenside,
        };
        flipped.en_passant = self.en_passant.map(|sq| sq.mirrored());
        flipped.status = self.status;
        flipped.halfmove_clock = self.halfmove_clock;
        flipped.fullmove_number = self.fullmove_number;
        flipped
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new_game()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8i8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8i8 {
                let c = self
                    .piece_at(Square::new(row, col))
                    .map(|p| p.fen_char())
                    .unwrap_or('.');
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_setup() {
        let pos = Position::new_game();
        assert_eq!(pos.side_to_move(), Color::Light);
        assert_eq!(pos.status(), Status::Active);
        assert_eq!(pos.castling_rights(), CastlingRights::ALL);
        assert_eq!(pos.en_passant_target(), None);
        assert_eq!(pos.pieces().count(), 32);
        assert_eq!(pos.king_square(Color::Light), Some(Square::new(7, 4)));
        assert_eq!(pos.king_square(Color::Dark), Some(Square::new(0, 4)));
        assert_eq!(
            pos.piece_at(Square::new(0, 3)),
            Some(Piece::new(PieceKind::Queen, Color::Dark))
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let pos = Position::new_game();
        let mut copy = pos.clone();
        copy.set_piece(Square::new(6, 4), None);
        copy.castling.revoke_all(Color::Light);
        assert!(pos.piece_at(Square::new(6, 4)).is_some());
        assert!(pos.castling_rights().light_kingside);
    }

    #[test]
    fn test_castling_rights_revoke() {
        let mut rights = CastlingRights::ALL;
        rights.revoke(Color::Dark, CastleSide::Queenside);
        assert!(!rights.has(Color::Dark, CastleSide::Queenside));
        assert!(rights.has(Color::Dark, CastleSide::Kingside));
        rights.revoke_all(Color::Light);
        assert!(!rights.light_kingside && !rights.light_queenside);
    }

    #[test]
    fn test_start_is_its_own_flip() {
        let pos = Position::new_game();
        let flipped = pos.color_flipped();
        assert_eq!(flipped.cells, pos.cells);
        assert_eq!(flipped.side_to_move(), Color::Dark);
    }

    #[test]
    fn test_display() {
        let text = Position::new_game().to_string();
        assert!(text.starts_with("8  r n b q k b n r"));
        assert!(text.ends_with("a b c d e f g h"));
    }

    #[test]
    fn test_move_display() {
        let mut mv = Move::new(Square::new(1, 4), Square::new(0, 4));
        mv.promotion = Some(PieceKind::Queen);
        assert_eq!(mv.to_string(), "e7e8q");
    }

    #[test]
    fn test_move_json_omits_unset_flags() {
        let mv = Move::new(Square::new(6, 4), Square::new(4, 4));
        assert_eq!(
            serde_json::to_string(&mv).unwrap(),
            r#"{"from":{"row":6,"col":4},"to":{"row":4,"col":4}}"#
        );
        let back: Move = serde_json::from_str(r#"{"from":{"row":6,"col":4},"to":{"row":4,"col":4}}"#).unwrap();
        assert_eq!(back, mv);
    }
}
