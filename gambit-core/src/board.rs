//! Board geometry: squares, offsets and ray directions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Board size (rows and columns)
pub const BOARD_SIZE: i8 = 8;

/// A square on the 8x8 grid.
///
/// Row 0 is dark's back rank, row 7 is light's back rank.
/// Columns 0-7 map to files a-h.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Build a square, returning None when off the board
    pub fn checked(row: i8, col: i8) -> Option<Self> {
        let sq = Self::new(row, col);
        sq.is_valid().then_some(sq)
    }

    /// Check if this square is on the board
    pub fn is_valid(&self) -> bool {
        (0..BOARD_SIZE).contains(&self.row) && (0..BOARD_SIZE).contains(&self.col)
    }

    /// Square displaced by (dr, dc), if still on the board
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Square> {
        Square::checked(self.row + dr, self.col + dc)
    }

    /// Parse "e4"-style coordinates
    pub fn from_algebraic(s: &str) -> Option<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return None;
        }
        Some(Square::new(7 - (rank - b'1') as i8, (file - b'a') as i8))
    }

    /// File letter ('a'..='h')
    pub fn file_char(&self) -> char {
        (b'a' + self.col as u8) as char
    }

    /// Rank digit ('1'..='8')
    pub fn rank_char(&self) -> char {
        (b'1' + (7 - self.row) as u8) as char
    }

    /// Same square seen from the other side of the board
    pub fn mirrored(&self) -> Square {
        Square::new(7 - self.row, self.col)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

/// Iterate every square, row by row from dark's back rank
pub fn all_squares() -> impl Iterator<Item = Square> {
    (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Square::new(row, col)))
}

/// Knight jump offsets (dr, dc)
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// King step offsets (dr, dc)
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Orthogonal ray directions
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Diagonal ray directions
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// d4, e4, d5, e5
pub const CENTER_SQUARES: [Square; 4] = [
    Square::new(3, 3),
    Square::new(3, 4),
    Square::new(4, 3),
    Square::new(4, 4),
];

/// Ring of twelve squares around the center
pub const EXTENDED_CENTER: [Square; 12] = [
    Square::new(2, 2),
    Square::new(2, 3),
    Square::new(2, 4),
    Square::new(2, 5),
    Square::new(3, 2),
    Square::new(3, 5),
    Square::new(4, 2),
    Square::new(4, 5),
    Square::new(5, 2),
    Square::new(5, 3),
    Square::new(5, 4),
    Square::new(5, 5),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_validity() {
        assert!(Square::new(0, 0).is_valid());
        assert!(Square::new(7, 7).is_valid());
        assert!(!Square::new(8, 0).is_valid());
        assert!(!Square::new(0, -1).is_valid());
        assert_eq!(Square::new(7, 7).offset(1, 0), None);
    }

    #[test]
    fn test_algebraic() {
        assert_eq!(Square::from_algebraic("a8"), Some(Square::new(0, 0)));
        assert_eq!(Square::from_algebraic("e1"), Some(Square::new(7, 4)));
        assert_eq!(Square::from_algebraic("h1"), Some(Square::new(7, 7)));
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("e9"), None);
        assert_eq!(Square::new(4, 4).to_string(), "e4");
    }

    #[test]
    fn test_all_squares() {
        assert_eq!(all_squares().count(), 64);
        assert_eq!(Square::new(6, 4).mirrored(), Square::new(1, 4));
    }
}
