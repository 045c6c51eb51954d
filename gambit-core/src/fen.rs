//! Forsyth-Edwards Notation import and export

use crate::board::Square;
use crate::error::FenError;
use crate::pieces::{Color, Piece, PieceKind};
use crate::position::{CastlingRights, Position};

/// FEN of the standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    /// Parse a FEN string. The two move counters may be omitted.
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let mut parts = fen.split_whitespace();

        let board_part = parts.next().ok_or(FenError::MissingField("board"))?;
        let side_part = parts.next().ok_or(FenError::MissingField("side to move"))?;
        let castling_part = parts.next().ok_or(FenError::MissingField("castling"))?;
        let en_passant_part = parts.next().ok_or(FenError::MissingField("en passant"))?;

        let mut pos = Position::empty();
        parse_board(board_part, &mut pos)?;

        pos.side_to_move = match side_part {
            "w" => Color::Light,
            "b" => Color::Dark,
            other => return Err(FenError::SideToMove(other.to_owned())),
        };
        pos.castling = parse_castling(castling_part)?;
        pos.en_passant = parse_en_passant(en_passant_part)?;

        if let Some(half) = parts.next() {
            pos.halfmove_clock = half
                .parse()
                .map_err(|_| FenError::Counter(half.to_owned()))?;
        }
        if let Some(full) = parts.next() {
            pos.fullmove_number = full
                .parse()
                .map_err(|_| FenError::Counter(full.to_owned()))?;
        }

        for color in [Color::Light, Color::Dark] {
            let kings = pos
                .pieces()
                .filter(|(_, p)| p.kind == PieceKind::King && p.color == color)
                .count();
            if kings != 1 {
                return Err(FenError::KingCount(color));
            }
        }

        if let Some(target) = pos.en_passant {
            check_en_passant(&pos, target, en_passant_part)?;
        }
        if pos.is_in_check(pos.side_to_move.opponent()) {
            return Err(FenError::OpponentInCheck(pos.side_to_move.opponent()));
        }

        pos.refresh_status();
        Ok(pos)
    }

    /// Serialize to FEN
    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(90);

        for row in 0..8i8 {
            let mut empty = 0;
            for col in 0..8i8 {
                match self.piece_at(Square::new(row, col)) {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if row < 7 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move {
            Color::Light => 'w',
            Color::Dark => 'b',
        });

        out.push(' ');
        let rights = self.castling;
        let mut any = false;
        for (held, c) in [
            (rights.light_kingside, 'K'),
            (rights.light_queenside, 'Q'),
            (rights.dark_kingside, 'k'),
            (rights.dark_queenside, 'q'),
        ] {
            if held {
                out.push(c);
                any = true;
            }
        }
        if !any {
            out.push('-');
        }

        out.push(' ');
        match self.en_passant {
            Some(sq) => out.push_str(&sq.to_string()),
            None => out.push('-'),
        }

        out.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        out
    }
}

fn parse_board(board_part: &str, pos: &mut Position) -> Result<(), FenError> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::Board("board layout must contain 8 ranks".to_owned()));
    }

    for (row, rank_str) in ranks.iter().enumerate() {
        let mut col = 0i8;
        for ch in rank_str.chars() {
            if let Some(run) = ch.to_digit(10) {
                if !(1..=8).contains(&run) {
                    return Err(FenError::Board(format!("invalid empty-square count '{ch}'")));
                }
                col += run as i8;
                if col > 8 {
                    return Err(FenError::Board(format!("rank {} has too many files", 8 - row)));
                }
                continue;
            }

            let piece = Piece::from_fen_char(ch)
                .ok_or_else(|| FenError::Board(format!("invalid piece character '{ch}'")))?;
            if col >= 8 {
                return Err(FenError::Board(format!("rank {} has too many files", 8 - row)));
            }
            pos.set_piece(Square::new(row as i8, col), Some(piece));
            col += 1;
        }

        if col != 8 {
            return Err(FenError::Board(format!("rank {} does not sum to 8 files", 8 - row)));
        }
    }

    Ok(())
}

fn parse_castling(part: &str) -> Result<CastlingRights, FenError> {
    let mut rights = CastlingRights::NONE;
    if part == "-" {
        return Ok(rights);
    }
    for ch in part.chars() {
        match ch {
            'K' => rights.light_kingside = true,
            'Q' => rights.light_queenside = true,
            'k' => rights.dark_kingside = true,
            'q' => rights.dark_queenside = true,
            _ => return Err(FenError::Castling(part.to_owned())),
        }
    }
    Ok(rights)
}

fn parse_en_passant(part: &str) -> Result<Option<Square>, FenError> {
    if part == "-" {
        return Ok(None);
    }
    let sq = Square::from_algebraic(part).ok_or_else(|| FenError::EnPassant(part.to_owned()))?;
    if sq.row != 2 && sq.row != 5 {
        return Err(FenError::EnPassant(part.to_owned()));
    }
    Ok(Some(sq))
}

/// The target must sit behind a pawn that just made a double step
fn check_en_passant(pos: &Position, target: Square, part: &str) -> Result<(), FenError> {
    let mover = pos.side_to_move;
    let expected_row = match mover {
        Color::Light => 2,
        Color::Dark => 5,
    };
    let pushed = Square::new(target.row + mover.opponent().forward(), target.col);
    let enemy_pawn = Piece::new(PieceKind::Pawn, mover.opponent());
    if target.row != expected_row
        || pos.piece_at(target).is_some()
        || pos.piece_at(pushed) != Some(enemy_pawn)
    {
        return Err(FenError::EnPassant(part.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Status;

    #[test]
    fn test_start_fen_matches_new_game() {
        let pos = Position::from_fen(START_FEN).unwrap();
        assert_eq!(pos, Position::new_game());
        assert_eq!(Position::new_game().to_fen(), START_FEN);
    }

    #[test]
    fn test_fen_after_moves() {
        let mut pos = Position::new_game();
        pos.apply_move(
            Square::from_algebraic("e2").unwrap(),
            Square::from_algebraic("e4").unwrap(),
            None,
        )
        .unwrap();
        assert_eq!(
            pos.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn test_counters_optional() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").unwrap();
        assert_eq!(pos.fullmove_number(), 1);
    }

    #[test]
    fn test_status_recomputed_on_import() {
        let mate = Position::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        assert_eq!(mate.status(), Status::Checkmate);
        let stale = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(stale.status(), Status::Stalemate);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(Position::from_fen(""), Err(FenError::MissingField(_))));
        assert!(matches!(
            Position::from_fen("8/8/8 w - - 0 1"),
            Err(FenError::Board(_))
        ));
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1"),
            Err(FenError::SideToMove(_))
        ));
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w Z - 0 1"),
            Err(FenError::Castling(_))
        ));
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - e4 0 1"),
            Err(FenError::EnPassant(_))
        ));
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::KingCount(Color::Dark))
        );
    }

    #[test]
    fn test_rejects_overlong_rank() {
        assert!(matches!(
            Position::from_fen("88888888888888888/8/8/8/8/8/8/4K2k w - - 0 1"),
            Err(FenError::Board(_))
        ));
        assert!(matches!(
            Position::from_fen("44k3/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::Board(_))
        ));
    }

    #[test]
    fn test_rejects_side_not_to_move_in_check() {
        assert_eq!(
            Position::from_fen("4k3/8/8/3p4/4Q3/8/8/4K3 w - - 0 1"),
            Err(FenError::OpponentInCheck(Color::Dark))
        );
        assert!(Position::from_fen("5k2/8/8/3p4/4Q3/8/8/4K3 w - - 0 1").is_ok());
    }

    #[test]
    fn test_en_passant_needs_pushed_pawn() {
        // Wrong row for the side to move
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/3Pp3/K7 w - e3 0 1"),
            Err(FenError::EnPassant(_))
        ));
        // Right row but no pawn in front of the target
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - e6 0 1"),
            Err(FenError::EnPassant(_))
        ));

        let pos = Position::from_fen("4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 1").unwrap();
        assert_eq!(pos.en_passant_target(), Square::from_algebraic("e6"));
        let d5 = Square::from_algebraic("d5").unwrap();
        let captures: Vec<_> = pos
            .legal_moves(Color::Light)
            .into_iter()
            .filter(|m| m.from == d5 && m.en_passant)
            .collect();
        assert_eq!(captures.len(), 1);
    }
}
