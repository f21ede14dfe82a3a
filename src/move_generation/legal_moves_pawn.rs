use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::leaper_attacks::pawn_attacks;
use crate::moves::move_descriptions::{
    ChessMove, FLAG_CAPTURE, FLAG_DOUBLE_PAWN_PUSH, FLAG_EN_PASSANT,
};

pub fn generate_pawn_moves(game_state: &GameState, out: &mut Vec<ChessMove>) {
    let side = game_state.side_to_move;
    let enemy_occ = game_state.occupancy_by_color[side.opposite().index()];
    let empty = !game_state.occupancy_all;

    let (start_rank, promotion_rank) = match side {
        Color::Light => (1, 7),
        Color::Dark => (6, 0),
    };

    let mut pawns = game_state.pieces[side.index()][PieceKind::Pawn.index()];
    while pawns != 0 {
        let from = pawns.trailing_zeros() as Square;
        let promotes = square_rank(forward(side, from)) == promotion_rank;

        let one_step = forward(side, from);
        if square_bit(one_step) & empty != 0 {
            push_pawn_move(out, from, one_step, 0, promotes);

            if square_rank(from) == start_rank {
                let two_step = forward(side, one_step);
                if square_bit(two_step) & empty != 0 {
                    out.push(ChessMove::new(
                        from,
                        two_step,
                        PieceKind::Pawn,
                        None,
                        FLAG_DOUBLE_PAWN_PUSH,
                    ));
                }
            }
        }

        let attacks = pawn_attacks(side, from);
        let mut captures = attacks & enemy_occ;
        while captures != 0 {
            let to = captures.trailing_zeros() as Square;
            push_pawn_move(out, from, to, FLAG_CAPTURE, promotes);
            captures &= captures - 1;
        }

        if let Some(ep) = game_state.en_passant_square {
            if attacks & square_bit(ep) != 0 && has_en_passant_victim(game_state, ep) {
                out.push(ChessMove::new(
                    from,
                    ep,
                    PieceKind::Pawn,
                    None,
                    FLAG_CAPTURE | FLAG_EN_PASSANT,
                ));
            }
        }

        pawns &= pawns - 1;
    }
}

#[inline]
fn forward(side: Color, square: Square) -> Square {
    match side {
        Color::Light => square.wrapping_add(8) & 63,
        Color::Dark => square.wrapping_sub(8) & 63,
    }
}

/// The en-passant square is set on every double push, so confirm an enemy
/// pawn actually sits behind it.
#[inline]
fn has_en_passant_victim(game_state: &GameState, ep: Square) -> bool {
    let side = game_state.side_to_move;
    let victim_square = forward(side.opposite(), ep);
    game_state.occupancy_all & square_bit(ep) == 0
        && game_state.pieces[side.opposite().index()][PieceKind::Pawn.index()]
            & square_bit(victim_square)
            != 0
}

#[inline]
fn push_pawn_move(out: &mut Vec<ChessMove>, from: Square, to: Square, flags: u32, promotes: bool) {
    if promotes {
        for promo in PieceKind::PROMOTIONS {
            out.push(ChessMove::new(from, to, PieceKind::Pawn, Some(promo), flags));
        }
    } else {
        out.push(ChessMove::new(from, to, PieceKind::Pawn, None, flags));
    }
}

#[cfg(test)]
mod tests {
    use super::generate_pawn_moves;
    use crate::game_state::game_state::GameState;

    #[test]
    fn start_position_has_sixteen_pawn_moves() {
        let game = GameState::new_game();
        let mut moves = Vec::new();
        generate_pawn_moves(&game, &mut moves);
        assert_eq!(moves.len(), 16);
        assert_eq!(moves.iter().filter(|m| m.is_double_pawn_push()).count(), 8);
    }

    #[test]
    fn promotion_expands_to_four_pieces() {
        let game = GameState::from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let mut moves = Vec::new();
        generate_pawn_moves(&game, &mut moves);
        // a8 push plus capture on b8, each with four promotion pieces.
        assert_eq!(moves.len(), 8);
        assert!(moves.iter().all(|m| m.promotion().is_some()));
        assert_eq!(moves.iter().filter(|m| m.is_capture()).count(), 4);
    }

    #[test]
    fn en_passant_requires_a_victim_pawn() {
        let with_victim =
            GameState::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").expect("FEN should parse");
        let mut moves = Vec::new();
        generate_pawn_moves(&with_victim, &mut moves);
        assert_eq!(moves.iter().filter(|m| m.is_en_passant()).count(), 1);
    }
}
