//! GAMBIT Core - Chess rules engine and AI
//!
//! This crate provides the core game logic for GAMBIT:
//! - Board geometry (8x8 grid, row 0 is dark's back rank)
//! - Position state, move generation and move application
//! - FEN import/export and perft
//! - Position evaluation (material, piece-square tables, structure)
//! - Alpha-beta AI with iterative deepening

pub mod board;
pub mod pieces;
pub mod position;
pub mod movegen;
pub mod rules;
pub mod fen;
pub mod eval;
pub mod ai;
pub mod perft;
pub mod error;

// Re-exports for convenient access
pub use board::{Square, BOARD_SIZE};
pub use pieces::{Color, Piece, PieceKind};
pub use position::{CastleSide, CastlingRights, Move, MoveRecord, Position, PositionKey, Status};
pub use rules::MoveOutcome;
pub use fen::START_FEN;
pub use eval::{evaluate, MATE_VALUE};
pub use ai::{choose_move, search, AiLevel, AlphaBetaAI, SearchReport, MATE_THRESHOLD};
pub use perft::{divide, perft, perft_unique, PerftCounts};
pub use error::{FenError, Result, RuleError, UnknownLevel};
