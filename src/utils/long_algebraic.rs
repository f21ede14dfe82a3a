//! Long algebraic move text (`e2e4`, `e7e8q`).
//!
//! Text is resolved against the legal move list of the given position, so a
//! successfully parsed move always carries the generator's flags.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_apply::make_move;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::moves::move_descriptions::ChessMove;
use crate::utils::algebraic::algebraic_to_square;

pub fn long_algebraic_to_move(long_algebraic: &str, game_state: &GameState) -> ChessResult<ChessMove> {
    let text = long_algebraic.trim().to_ascii_lowercase();
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return Err(ChessError::InvalidMove(format!(
            "invalid long algebraic move: {long_algebraic}"
        )));
    }

    algebraic_to_square(&text[0..2])?;
    algebraic_to_square(&text[2..4])?;
    if let Some(promo) = text.chars().nth(4) {
        if !matches!(promo, 'n' | 'b' | 'r' | 'q') {
            return Err(ChessError::InvalidMove(format!(
                "invalid promotion piece '{promo}' in {long_algebraic}"
            )));
        }
    }

    legal_moves(game_state)?
        .into_iter()
        .find(|mv| mv.to_long_algebraic() == text)
        .ok_or_else(|| {
            ChessError::InvalidMove(format!(
                "{long_algebraic} is not legal in {}",
                game_state.get_fen()
            ))
        })
}

#[inline]
pub fn move_to_long_algebraic(mv: ChessMove) -> String {
    mv.to_long_algebraic()
}

/// Play a whitespace-separated list of long algebraic moves from `game_state`.
pub fn apply_long_algebraic_moves(game_state: &GameState, moves: &str) -> ChessResult<GameState> {
    let mut state = game_state.clone();
    for token in moves.split_whitespace() {
        let mv = long_algebraic_to_move(token, &state)?;
        make_move(&mut state, mv)?;
    }
    Ok(state)
}
