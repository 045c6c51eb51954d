//! Game API endpoints
//!
//! Create, join and play games. In AI games the engine reply is computed on
//! the blocking pool and written back once the search returns.

use super::ApiError;
use crate::state::{GameMode, GameSession, GameSnapshot, ServerState};
use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use gambit_core::{search, AiLevel, Color, Move, MoveOutcome, PieceKind, Square};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Deepest search a client may request
const MAX_AI_DEPTH: u32 = 6;

#[derive(Debug, Default, Deserialize)]
pub struct CreateGameRequest {
    #[serde(default)]
    pub mode: GameMode,
    /// Creator's color; light when omitted
    pub color: Option<Color>,
    pub ai_level: Option<AiLevel>,
    /// Explicit AI search depth, overriding the level
    pub ai_depth: Option<u32>,
}

#[derive(Serialize)]
pub struct SeatResponse {
    pub game_id: String,
    pub color: Color,
    pub state: GameSnapshot,
}

/// Create a new game
pub async fn create_game(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<CreateGameRequest>,
) -> Result<Json<SeatResponse>, ApiError> {
    let color = req.color.unwrap_or(Color::Light);
    if let Some(depth) = req.ai_depth {
        if !(1..=MAX_AI_DEPTH).contains(&depth) {
            return Err(ApiError::bad_request(format!(
                "ai_depth must be between 1 and {}",
                MAX_AI_DEPTH
            )));
        }
    }

    let snapshot = match req.mode {
        GameMode::Human => state.insert_new(|id| GameSession::new_human(id, color)),
        GameMode::Ai => {
            let level = req.ai_level.unwrap_or_default();
            state.insert_new(|id| {
                let mut session = GameSession::new_ai(id, color, level, req.ai_depth);
                // AI plays light: it opens the game
                session.ai_thinking = session.ai_to_move();
                session
            })
        }
    };

    tracing::info!(
        game_id = %snapshot.game_id,
        mode = ?req.mode,
        color = %color,
        "Game created"
    );

    if snapshot.ai_thinking {
        spawn_ai_move(state.clone(), snapshot.game_id.clone());
    }

    Ok(Json(SeatResponse {
        game_id: snapshot.game_id.clone(),
        color,
        state: snapshot,
    }))
}

/// Take the open seat of a two-player game
pub async fn join_game(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<SeatResponse>, ApiError> {
    let mut games = state.games.write().unwrap();
    let session = games.get_mut(&id).ok_or_else(|| game_not_found(&id))?;

    if session.mode == GameMode::Ai {
        return Err(ApiError::conflict("Cannot join an AI game"));
    }
    let color = [Color::Dark, Color::Light]
        .into_iter()
        .find(|c| !session.is_seated(*c))
        .ok_or_else(|| ApiError::conflict("Game is full"))?;
    session.seat(color);

    tracing::info!(game_id = %id, color = %color, "Player joined");

    Ok(Json(SeatResponse {
        game_id: id.clone(),
        color,
        state: session.snapshot(),
    }))
}

/// Current state of a game
pub async fn get_game(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let games = state.games.read().unwrap();
    let session = games.get(&id).ok_or_else(|| game_not_found(&id))?;
    Ok(Json(session.snapshot()))
}

#[derive(Debug, Deserialize)]
pub struct MovesQuery {
    pub square: Option<String>,
}

#[derive(Serialize)]
pub struct LegalMove {
    pub from: String,
    pub to: String,
    pub uci: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub en_passant: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub castling: bool,
}

impl From<Move> for LegalMove {
    fn from(mv: Move) -> Self {
        Self {
            from: mv.from.to_string(),
            to: mv.to.to_string(),
            uci: mv.to_string(),
            promotion: mv.promotion,
            en_passant: mv.en_passant,
            castling: mv.castling.is_some(),
        }
    }
}

#[derive(Serialize)]
pub struct MovesResponse {
    pub moves: Vec<LegalMove>,
}

/// Legal moves for one square, or for the whole side to move
pub async fn legal_moves(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Query(query): Query<MovesQuery>,
) -> Result<Json<MovesResponse>, ApiError> {
    let square = query.square.as_deref().map(parse_square).transpose()?;

    let games = state.games.read().unwrap();
    let session = games.get(&id).ok_or_else(|| game_not_found(&id))?;
    let pos = &session.position;

    let moves = match square {
        Some(sq) => pos.legal_moves_from(sq),
        None => pos.legal_moves(pos.side_to_move()),
    };

    Ok(Json(MovesResponse {
        moves: moves.into_iter().map(LegalMove::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub color: Color,
    pub from: String,
    pub to: String,
    pub promotion: Option<String>,
}

#[derive(Serialize)]
pub struct MoveResponse {
    pub outcome: MoveOutcome,
    pub state: GameSnapshot,
}

/// Apply a player's move
pub async fn make_move(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let from = parse_square(&req.from)?;
    let to = parse_square(&req.to)?;
    let promotion = req
        .promotion
        .as_deref()
        .map(|p| {
            PieceKind::parse(p).ok_or_else(|| ApiError::bad_request(format!("Unknown piece '{}'", p)))
        })
        .transpose()?;

    let response = {
        let mut games = state.games.write().unwrap();
        let session = games.get_mut(&id).ok_or_else(|| game_not_found(&id))?;

        if session.position.side_to_move() != req.color || session.ai_thinking {
            tracing::debug!(game_id = %id, color = %req.color, "Move out of turn");
            return Err(ApiError::conflict("Not your turn"));
        }
        if session.ai_color == Some(req.color) || !session.is_seated(req.color) {
            return Err(ApiError::new(
                axum::http::StatusCode::FORBIDDEN,
                format!("{} is not your seat", req.color),
            ));
        }

        let outcome = session.position.apply_move(from, to, promotion).map_err(|e| {
            tracing::debug!(game_id = %id, "Move rejected: {}", e);
            ApiError::from(e)
        })?;

        tracing::info!(
            game_id = %id,
            mv = %outcome.mv,
            captured = ?outcome.captured.map(|p| p.kind),
            check = outcome.is_check,
            checkmate = outcome.is_checkmate,
            "Move made"
        );

        session.ai_thinking = session.ai_to_move();
        MoveResponse {
            outcome,
            state: session.snapshot(),
        }
    };

    if response.state.ai_thinking {
        spawn_ai_move(state.clone(), id);
    }

    Ok(Json(response))
}

fn parse_square(name: &str) -> Result<Square, ApiError> {
    Square::from_algebraic(name)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid square '{}'", name)))
}

fn game_not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("Game {} not found", id))
}

// ============================================================================
// AI REPLIES
// ============================================================================

/// Compute and play the AI move for `game_id` in the background
fn spawn_ai_move(state: Arc<ServerState>, game_id: String) {
    tokio::spawn(async move {
        if let Err(e) = play_ai_move(&state, &game_id).await {
            tracing::error!(game_id = %game_id, "AI move failed: {:#}", e);
            if let Some(session) = state.games.write().unwrap().get_mut(&game_id) {
                session.ai_thinking = false;
            }
        }
    });
}

async fn play_ai_move(state: &ServerState, game_id: &str) -> anyhow::Result<()> {
    tokio::time::sleep(state.ai_move_delay).await;

    let (position, depth) = {
        let games = state.games.read().unwrap();
        let session = games.get(game_id).context("game no longer exists")?;
        if !session.ai_to_move() {
            tracing::debug!(game_id, "AI has nothing to play");
            return Ok(());
        }
        (session.position.clone(), session.ai_depth)
    };
    let plies_before = position.history().len();

    tracing::debug!(game_id, depth, "AI calculating move");
    let started = Instant::now();
    let report = tokio::task::spawn_blocking(move || search(&position, depth))
        .await
        .context("search task panicked")?;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let mv = report.best_move.context("AI returned no move")?;

    let mut games = state.games.write().unwrap();
    let session = games.get_mut(game_id).context("game no longer exists")?;
    session.ai_thinking = false;
    if session.position.history().len() != plies_before {
        tracing::debug!(game_id, "Position changed during search, discarding AI move");
        return Ok(());
    }

    let outcome = session
        .position
        .apply_move(mv.from, mv.to, mv.promotion)
        .context("AI produced an illegal move")?;

    tracing::info!(
        game_id,
        mv = %outcome.mv,
        score = report.score,
        nodes = report.nodes,
        elapsed_ms,
        check = outcome.is_check,
        checkmate = outcome.is_checkmate,
        "AI move made"
    );

    Ok(())
}
