//! Engine-vs-itself game loop.
//!
//! Plays one engine against itself with a fixed per-move budget until the
//! game ends by rule or the ply cap is reached.

use std::time::Duration;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::engines::engine::Engine;
use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Color;
use crate::game_state::game_state::{GameState, GameStatus};
use crate::move_generation::legal_move_apply::make_move;
use crate::moves::move_descriptions::ChessMove;
use crate::utils::pgn::{write_pgn, PgnHeaders};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    WhiteWinCheckmate,
    BlackWinCheckmate,
    DrawStalemate,
    DrawRepetition,
    DrawFiftyMoveRule,
    DrawInsufficientMaterial,
    /// Ply cap reached with the game still in progress.
    Unfinished,
}

impl GameOutcome {
    fn from_status(status: GameStatus, side_to_move: Color) -> Option<Self> {
        match status {
            GameStatus::Ongoing => None,
            GameStatus::Checkmate => Some(match side_to_move {
                Color::Light => GameOutcome::BlackWinCheckmate,
                Color::Dark => GameOutcome::WhiteWinCheckmate,
            }),
            GameStatus::Stalemate => Some(GameOutcome::DrawStalemate),
            GameStatus::FiftyMoveDraw => Some(GameOutcome::DrawFiftyMoveRule),
            GameStatus::ThreefoldRepetition => Some(GameOutcome::DrawRepetition),
            GameStatus::InsufficientMaterial => Some(GameOutcome::DrawInsufficientMaterial),
        }
    }

    /// PGN result token.
    pub fn result(self) -> &'static str {
        match self {
            GameOutcome::WhiteWinCheckmate => "1-0",
            GameOutcome::BlackWinCheckmate => "0-1",
            GameOutcome::Unfinished => "*",
            _ => "1/2-1/2",
        }
    }

    pub fn termination(self) -> &'static str {
        match self {
            GameOutcome::WhiteWinCheckmate | GameOutcome::BlackWinCheckmate => "checkmate",
            GameOutcome::DrawStalemate => "stalemate",
            GameOutcome::DrawRepetition => "threefold repetition",
            GameOutcome::DrawFiftyMoveRule => "fifty-move rule",
            GameOutcome::DrawInsufficientMaterial => "insufficient material",
            GameOutcome::Unfinished => "ply limit",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameRecord {
    pub initial_state: GameState,
    pub moves: Vec<ChessMove>,
    pub final_state: GameState,
    pub outcome: GameOutcome,
    pub total_nodes: u64,
    pub total_search_time: Duration,
}

impl GameRecord {
    /// PGN dated today.
    pub fn to_pgn(&self) -> ChessResult<String> {
        self.to_pgn_dated(Local::now().date_naive())
    }

    pub fn to_pgn_dated(&self, date: NaiveDate) -> ChessResult<String> {
        let headers = PgnHeaders {
            event: "Self-play".to_owned(),
            date: Some(date),
            result: self.outcome.result().to_owned(),
            termination: Some(self.outcome.termination().to_owned()),
            ..PgnHeaders::default()
        };
        write_pgn(&self.initial_state, &self.moves, &headers)
    }
}

/// Play `engine` against itself from `game_state`, giving each move
/// `per_move`, for at most `max_plies` plies.
pub fn play_self_game(
    engine: &mut Engine,
    game_state: GameState,
    per_move: Duration,
    max_plies: u16,
) -> ChessResult<GameRecord> {
    let initial_state = game_state.clone();
    let mut state = game_state;
    let mut moves = Vec::with_capacity(usize::from(max_plies));
    let mut total_nodes = 0u64;
    let mut total_search_time = Duration::ZERO;

    let outcome = loop {
        if let Some(outcome) = GameOutcome::from_status(state.status()?, state.side_to_move) {
            break outcome;
        }
        if moves.len() >= usize::from(max_plies) {
            break GameOutcome::Unfinished;
        }

        let result = engine.search_for(&state, per_move)?;
        total_nodes += result.nodes;
        total_search_time += result.elapsed;

        let mv = result.chess_move().ok_or_else(|| {
            ChessError::InvariantViolation(format!(
                "search returned no move in ongoing game {}",
                state.get_fen()
            ))
        })?;
        debug!(
            ply = moves.len() + 1,
            mv = %mv,
            score = result.score,
            depth = result.reached_depth,
            "self-play move"
        );

        make_move(&mut state, mv)?;
        moves.push(mv);
    };

    info!(
        outcome = ?outcome,
        plies = moves.len(),
        nodes = total_nodes,
        "self-play game finished"
    );

    Ok(GameRecord {
        initial_state,
        moves,
        final_state: state,
        outcome,
        total_nodes,
        total_search_time,
    })
}
