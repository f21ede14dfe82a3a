//! Full legal move generation pipeline.
//!
//! Collects piece-wise pseudo-legal moves, then filters out any move that
//! leaves the mover's own king attacked by making and unmaking it in place.

use crate::errors::ChessResult;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_apply::{make_move, unmake_move};
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_moves_king::generate_king_moves;
use crate::move_generation::legal_moves_pawn::generate_pawn_moves;
use crate::move_generation::legal_moves_pieces::{
    generate_bishop_moves, generate_knight_moves, generate_queen_moves, generate_rook_moves,
};
use crate::moves::move_descriptions::ChessMove;

/// Every move obeying piece movement rules, ignoring self-check.
pub fn generate_pseudo_legal_moves(game_state: &GameState, out: &mut Vec<ChessMove>) {
    generate_pawn_moves(game_state, out);
    generate_knight_moves(game_state, out);
    generate_bishop_moves(game_state, out);
    generate_rook_moves(game_state, out);
    generate_queen_moves(game_state, out);
    generate_king_moves(game_state, out);
}

/// Replace `out` with the legal moves of `game_state`. The state is mutated
/// while filtering and is restored before returning.
pub fn generate_legal_moves_in_place(
    game_state: &mut GameState,
    out: &mut Vec<ChessMove>,
) -> ChessResult<()> {
    filter_legal(game_state, out, false)
}

/// Legal captures and promotions only.
pub fn generate_legal_tactical_moves_in_place(
    game_state: &mut GameState,
    out: &mut Vec<ChessMove>,
) -> ChessResult<()> {
    filter_legal(game_state, out, true)
}

/// Owned convenience wrapper around `generate_legal_moves_in_place`.
pub fn legal_moves(game_state: &GameState) -> ChessResult<Vec<ChessMove>> {
    let mut scratch = game_state.clone();
    let mut out = Vec::with_capacity(64);
    generate_legal_moves_in_place(&mut scratch, &mut out)?;
    Ok(out)
}

fn filter_legal(
    game_state: &mut GameState,
    out: &mut Vec<ChessMove>,
    tactical_only: bool,
) -> ChessResult<()> {
    let mut pseudo = Vec::with_capacity(64);
    generate_pseudo_legal_moves(game_state, &mut pseudo);

    out.clear();
    let mover = game_state.side_to_move;
    for mv in pseudo {
        if tactical_only && !mv.is_tactical() {
            continue;
        }

        let undo = make_move(game_state, mv)?;
        let leaves_king_attacked = is_king_in_check(game_state, mover);
        unmake_move(game_state, undo)?;

        if !leaves_king_attacked {
            out.push(mv);
        }
    }

    Ok(())
}
