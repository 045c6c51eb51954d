//! Server state management
//!
//! Registry of live game sessions keyed by game id.

use crate::ServerConfig;
use gambit_core::{
    AiLevel, CastlingRights, Color, MoveRecord, Piece, Position, Square, Status,
};
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;

const GAME_ID_LEN: usize = 7;
const GAME_ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Who sits on the other side of the board
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Human,
    Ai,
}

/// One game in progress
#[derive(Clone, Debug)]
pub struct GameSession {
    pub id: String,
    pub mode: GameMode,
    pub position: Position,
    pub light_seated: bool,
    pub dark_seated: bool,
    pub ai_color: Option<Color>,
    pub ai_level: Option<AiLevel>,
    /// Search depth for the AI side (from the level unless overridden)
    pub ai_depth: u32,
    pub ai_thinking: bool,
}

impl GameSession {
    pub fn new_human(id: String, creator: Color) -> Self {
        Self {
            id,
            mode: GameMode::Human,
            position: Position::new_game(),
            light_seated: creator == Color::Light,
            dark_seated: creator == Color::Dark,
            ai_color: None,
            ai_level: None,
            ai_depth: 0,
            ai_thinking: false,
        }
    }

    pub fn new_ai(id: String, human: Color, level: AiLevel, depth: Option<u32>) -> Self {
        Self {
            id,
            mode: GameMode::Ai,
            position: Position::new_game(),
            light_seated: true,
            dark_seated: true,
            ai_color: Some(human.opponent()),
            ai_level: Some(level),
            ai_depth: depth.unwrap_or_else(|| level.depth()),
            ai_thinking: false,
        }
    }

    pub fn is_seated(&self, color: Color) -> bool {
        match color {
            Color::Light => self.light_seated,
            Color::Dark => self.dark_seated,
        }
    }

    pub fn seat(&mut self, color: Color) {
        match color {
            Color::Light => self.light_seated = true,
            Color::Dark => self.dark_seated = true,
        }
    }

    /// True when the AI owns the side to move and the game is still running
    pub fn ai_to_move(&self) -> bool {
        self.ai_color == Some(self.position.side_to_move()) && !self.position.status().is_terminal()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            game_id: self.id.clone(),
            mode: self.mode,
            board: *self.position.rows(),
            turn: self.position.side_to_move(),
            status: self.position.status(),
            en_passant_target: self.position.en_passant_target(),
            castling_rights: self.position.castling_rights(),
            history: self.position.history().to_vec(),
            fen: self.position.to_fen(),
            ai_color: self.ai_color,
            ai_level: self.ai_level,
            ai_thinking: self.ai_thinking,
        }
    }
}

/// Wire view of a game
#[derive(Clone, Debug, Serialize)]
pub struct GameSnapshot {
    pub game_id: String,
    pub mode: GameMode,
    pub board: [[Option<Piece>; 8]; 8],
    pub turn: Color,
    pub status: Status,
    pub en_passant_target: Option<Square>,
    pub castling_rights: CastlingRights,
    pub history: Vec<MoveRecord>,
    pub fen: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_level: Option<AiLevel>,
    pub ai_thinking: bool,
}

/// Server-wide shared state
pub struct ServerState {
    pub games: RwLock<FxHashMap<String, GameSession>>,
    pub ai_move_delay: Duration,
}

impl ServerState {
    pub fn new() -> Self {
        Self::from_config(&ServerConfig::default())
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            games: RwLock::new(FxHashMap::default()),
            ai_move_delay: config.ai_move_delay(),
        }
    }

    /// Register a session built from a fresh id and return its snapshot
    pub fn insert_new(&self, build: impl FnOnce(String) -> GameSession) -> GameSnapshot {
        let mut games = self.games.write().unwrap();
        let id = loop {
            let candidate = generate_game_id();
            if !games.contains_key(&candidate) {
                break candidate;
            }
        };
        let session = build(id.clone());
        let snapshot = session.snapshot();
        games.insert(id, session);
        snapshot
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Random 7-character lowercase alphanumeric id
pub fn generate_game_id() -> String {
    let mut rng = rand::thread_rng();
    (0..GAME_ID_LEN)
        .map(|_| GAME_ID_CHARS[rng.gen_range(0..GAME_ID_CHARS.len())] as char)
        .collect()
}
