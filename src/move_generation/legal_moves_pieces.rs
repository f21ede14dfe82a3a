//! Knight and slider move generation.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::leaper_attacks::knight_attacks;
use crate::moves::move_descriptions::{ChessMove, FLAG_CAPTURE};
use crate::moves::slider_attacks::{bishop_attacks, queen_attacks, rook_attacks};

pub fn generate_knight_moves(game_state: &GameState, out: &mut Vec<ChessMove>) {
    generate_piece_moves(game_state, out, PieceKind::Knight, |from, _| {
        knight_attacks(from)
    });
}

pub fn generate_bishop_moves(game_state: &GameState, out: &mut Vec<ChessMove>) {
    generate_piece_moves(game_state, out, PieceKind::Bishop, bishop_attacks);
}

pub fn generate_rook_moves(game_state: &GameState, out: &mut Vec<ChessMove>) {
    generate_piece_moves(game_state, out, PieceKind::Rook, rook_attacks);
}

pub fn generate_queen_moves(game_state: &GameState, out: &mut Vec<ChessMove>) {
    generate_piece_moves(game_state, out, PieceKind::Queen, queen_attacks);
}

#[inline]
fn generate_piece_moves<F>(
    game_state: &GameState,
    out: &mut Vec<ChessMove>,
    piece: PieceKind,
    attacks_from: F,
) where
    F: Fn(Square, u64) -> u64,
{
    let side = game_state.side_to_move;
    let own_occ = game_state.occupancy_by_color[side.index()];
    let enemy_occ = game_state.occupancy_by_color[side.opposite().index()];

    let mut pieces = game_state.pieces[side.index()][piece.index()];
    while pieces != 0 {
        let from = pieces.trailing_zeros() as Square;
        let mut targets = attacks_from(from, game_state.occupancy_all) & !own_occ;

        while targets != 0 {
            let to = targets.trailing_zeros() as Square;
            let flags = if square_bit(to) & enemy_occ != 0 {
                FLAG_CAPTURE
            } else {
                0
            };
            out.push(ChessMove::new(from, to, piece, None, flags));
            targets &= targets - 1;
        }

        pieces &= pieces - 1;
    }
}
