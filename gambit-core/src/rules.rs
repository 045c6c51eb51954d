//! Move application and terminal-state detection

use crate::board::Square;
use crate::error::{Result, RuleError};
use crate::pieces::{Color, Piece, PieceKind};
use crate::position::{CastleSide, Move, MoveRecord, Position, Status};
use serde::{Deserialize, Serialize};

/// Result of a successfully applied move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub mv: Move,
    pub captured: Option<Piece>,
    pub promotion: Option<PieceKind>,
    /// Side now to move is in check
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
}

impl Position {
    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Validate and apply a move for the side to move.
    ///
    /// `promotion` is only consulted when a pawn reaches the far rank
    /// and defaults to a queen.
    pub fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<MoveOutcome> {
        let mv = self.validate(from, to, promotion)?;
        Ok(self.apply_legal(mv))
    }

    /// Apply move to a copy, leaving `self` untouched
    pub fn after_move(&self, from: Square, to: Square, promotion: Option<PieceKind>) -> Result<Position> {
        let mut next = self.clone();
        next.apply_move(from, to, promotion)?;
        Ok(next)
    }

    fn validate(&self, from: Square, to: Square, promotion: Option<PieceKind>) -> Result<Move> {
        for color in [Color::Light, Color::Dark] {
            if self.king_square(color).is_none() {
                return Err(RuleError::NoKing(color));
            }
        }

        let illegal = RuleError::IllegalMove { from, to };
        let piece = self.piece_at(from).ok_or(illegal)?;
        if piece.color != self.side_to_move {
            return Err(RuleError::WrongSideToMove {
                from,
                piece: piece.color,
                to_move: self.side_to_move,
            });
        }

        let mut mv = self
            .legal_moves_from(from)
            .into_iter()
            .find(|m| m.to == to)
            .ok_or(illegal)?;

        if mv.promotion.is_some() {
            if let Some(kind) = promotion {
                if !kind.is_promotion_target() {
                    return Err(illegal);
                }
                mv.promotion = Some(kind);
            }
        }

        Ok(mv)
    }

    /// Canonical state transition for a move known to be legal
    pub(crate) fn apply_legal(&mut self, mv: Move) -> MoveOutcome {
        let (captured, promotion) = self.transition(mv);

        // 8. Status for the new side to move
        self.refresh_status();

        MoveOutcome {
            mv,
            captured,
            promotion,
            is_check: matches!(self.status, Status::Check | Status::Checkmate),
            is_checkmate: self.status == Status::Checkmate,
            is_stalemate: self.status == Status::Stalemate,
        }
    }

    /// Steps 1-7 of a move: board, rights, en passant, promotion, history, turn.
    /// `status` is stale until `refresh_status` runs.
    pub(crate) fn transition(&mut self, mv: Move) -> (Option<Piece>, Option<PieceKind>) {
        let color = self.side_to_move;
        let piece = self.piece_at(mv.from).expect("No piece at move origin");

        // 1. Move the piece, capturing whatever stands on the target
        let mut captured = self.piece_at(mv.to);
        self.set_piece(mv.to, Some(piece));
        self.set_piece(mv.from, None);

        // 2. En passant removes the pawn that was jumped past
        if mv.en_passant {
            let victim = Square::new(mv.from.row, mv.to.col);
            captured = self.piece_at(victim);
            self.set_piece(victim, None);
        }

        // 3. Castling relocates the rook
        if let Some(side) = mv.castling {
            let home = color.home_row();
            let rook = self.piece_at(Square::new(home, side.rook_from_col()));
            self.set_piece(Square::new(home, side.rook_from_col()), None);
            self.set_piece(Square::new(home, side.rook_to_col()), rook);
            self.castling.revoke_all(color);
        }

        // 4. Rights lost by king moves and rook moves or captures on a corner
        if piece.kind == PieceKind::King {
            self.castling.revoke_all(color);
        }
        self.revoke_corner_right(mv.from);
        self.revoke_corner_right(mv.to);

        // 5. En passant target lives for exactly one move
        self.en_passant = None;
        if piece.kind == PieceKind::Pawn && (mv.to.row - mv.from.row).abs() == 2 {
            self.en_passant = Some(Square::new((mv.from.row + mv.to.row) / 2, mv.from.col));
        }

        // 6. Promotion
        let promotion = if piece.kind == PieceKind::Pawn && mv.to.row == color.promotion_row() {
            let kind = mv.promotion.unwrap_or(PieceKind::Queen);
            self.set_piece(mv.to, Some(Piece::new(kind, color)));
            Some(kind)
        } else {
            None
        };

        // 7. Record and pass the turn
        self.history.push(MoveRecord {
            from: mv.from,
            to: mv.to,
            piece: piece.kind,
            captured: captured.map(|p| p.kind),
            promotion,
            castling: mv.castling,
            en_passant: mv.en_passant,
        });
        if piece.kind == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if color == Color::Dark {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = color.opponent();

        (captured, promotion)
    }

    /// A rook leaving or captured on its corner loses that corner's right
    fn revoke_corner_right(&mut self, sq: Square) {
        for color in [Color::Light, Color::Dark] {
            for side in [CastleSide::Kingside, CastleSide::Queenside] {
                if sq == Square::new(color.home_row(), side.rook_from_col()) {
                    self.castling.revoke(color, side);
                }
            }
        }
    }

    /// Recompute status from the side to move's point of view
    pub(crate) fn refresh_status(&mut self) {
        let color = self.side_to_move;
        let in_check = self.is_in_check(color);
        self.status = match (self.has_legal_move(color), in_check) {
            (false, true) => Status::Checkmate,
            (false, false) => Status::Stalemate,
            (true, true) => Status::Check,
            (true, false) => Status::Active,
        };
    }
}

// ============================================================================
// TESTS
// ============================================================================
