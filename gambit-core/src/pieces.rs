//! Piece and color definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Light = 0,
    Dark = 1,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// Row delta of a pawn advance
    pub fn forward(self) -> i8 {
        match self {
            Color::Light => -1,
            Color::Dark => 1,
        }
    }

    /// Row holding this color's king and rooks at the start
    pub fn home_row(self) -> i8 {
        match self {
            Color::Light => 7,
            Color::Dark => 0,
        }
    }

    /// Row from which a pawn may advance two squares
    pub fn pawn_start_row(self) -> i8 {
        match self {
            Color::Light => 6,
            Color::Dark => 1,
        }
    }

    /// Row on which a pawn promotes
    pub fn promotion_row(self) -> i8 {
        match self {
            Color::Light => 0,
            Color::Dark => 7,
        }
    }

    /// +1 for light, -1 for dark
    pub fn sign(self) -> i32 {
        match self {
            Color::Light => 1,
            Color::Dark => -1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Light => write!(f, "light"),
            Color::Dark => write!(f, "dark"),
        }
    }
}

/// Piece kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Material value in centipawns, shared by evaluation and move ordering
    pub fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 20000,
        }
    }

    /// Kinds a pawn may promote to
    pub fn is_promotion_target(self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }

    /// Lowercase letter used in FEN and long algebraic notation
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_letter(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Parse a full name ("queen") or a single letter ("q")
    pub fn parse(s: &str) -> Option<PieceKind> {
        match s.to_ascii_lowercase().as_str() {
            "pawn" => Some(PieceKind::Pawn),
            "knight" => Some(PieceKind::Knight),
            "bishop" => Some(PieceKind::Bishop),
            "rook" => Some(PieceKind::Rook),
            "queen" => Some(PieceKind::Queen),
            "king" => Some(PieceKind::King),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => PieceKind::from_letter(c),
                    _ => None,
                }
            }
        }
    }
}

/// A piece on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// FEN character: uppercase for light, lowercase for dark
    pub fn fen_char(&self) -> char {
        let c = self.kind.letter();
        match self.color {
            Color::Light => c.to_ascii_uppercase(),
            Color::Dark => c,
        }
    }

    pub fn from_fen_char(c: char) -> Option<Piece> {
        let kind = PieceKind::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::Light
        } else {
            Color::Dark
        };
        Some(Piece::new(kind, color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_ordered() {
        assert!(PieceKind::Queen.value() > PieceKind::Rook.value());
        assert!(PieceKind::Bishop.value() > PieceKind::Knight.value());
        assert!(PieceKind::King.value() > PieceKind::Queen.value());
    }

    #[test]
    fn test_fen_chars() {
        let wq = Piece::new(PieceKind::Queen, Color::Light);
        assert_eq!(wq.fen_char(), 'Q');
        assert_eq!(Piece::from_fen_char('n'), Some(Piece::new(PieceKind::Knight, Color::Dark)));
        assert_eq!(Piece::from_fen_char('x'), None);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(PieceKind::parse("Queen"), Some(PieceKind::Queen));
        assert_eq!(PieceKind::parse("n"), Some(PieceKind::Knight));
        assert_eq!(PieceKind::parse("dragon"), None);
        assert!(!PieceKind::King.is_promotion_target());
    }

    #[test]
    fn test_color_geometry() {
        assert_eq!(Color::Light.opponent(), Color::Dark);
        assert_eq!(Color::Light.forward(), -1);
        assert_eq!(Color::Dark.pawn_start_row(), 1);
        assert_eq!(Color::Dark.promotion_row(), 7);
    }
}
