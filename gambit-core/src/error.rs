//! Error types for gambit-core

use crate::board::Square;
use crate::pieces::Color;
use thiserror::Error;

/// Reasons a move request is rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleError {
    #[error("piece on {from} belongs to {piece}, but it is {to_move}'s turn")]
    WrongSideToMove {
        from: Square,
        piece: Color,
        to_move: Color,
    },

    #[error("illegal move {from}{to}")]
    IllegalMove { from: Square, to: Square },

    #[error("position has no {0} king")]
    NoKing(Color),
}

/// Malformed FEN input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("missing FEN field: {0}")]
    MissingField(&'static str),

    #[error("invalid board layout: {0}")]
    Board(String),

    #[error("invalid side to move: {0}")]
    SideToMove(String),

    #[error("invalid castling rights: {0}")]
    Castling(String),

    #[error("invalid en passant square: {0}")]
    EnPassant(String),

    #[error("invalid move counter: {0}")]
    Counter(String),

    #[error("expected exactly one {0} king")]
    KingCount(Color),

    #[error("{0} is in check but it is not {0}'s turn")]
    OpponentInCheck(Color),
}

/// Unrecognised AI difficulty name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown AI level '{0}' (expected easy, medium or hard)")]
pub struct UnknownLevel(pub String);

pub type Result<T> = std::result::Result<T, RuleError>;
