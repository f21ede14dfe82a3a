use crate::game_state::chess_rules::{DARK_KING_START, LIGHT_KING_START};
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::moves::leaper_attacks::king_attacks;
use crate::moves::move_descriptions::{
    ChessMove, FLAG_CAPTURE, FLAG_CASTLE_KINGSIDE, FLAG_CASTLE_QUEENSIDE,
};

pub fn generate_king_moves(game_state: &GameState, out: &mut Vec<ChessMove>) {
    let side = game_state.side_to_move;
    let own_occ = game_state.occupancy_by_color[side.index()];
    let enemy_occ = game_state.occupancy_by_color[side.opposite().index()];
    let king_bb = game_state.pieces[side.index()][PieceKind::King.index()];
    if king_bb == 0 {
        return;
    }

    let from = king_bb.trailing_zeros() as Square;
    let mut targets = king_attacks(from) & !own_occ;
    while targets != 0 {
        let to = targets.trailing_zeros() as Square;
        let flags = if square_bit(to) & enemy_occ != 0 {
            FLAG_CAPTURE
        } else {
            0
        };
        out.push(ChessMove::new(from, to, PieceKind::King, None, flags));
        targets &= targets - 1;
    }

    generate_castling_moves(game_state, out, from);
}

struct CastleRoute {
    right: CastlingRights,
    flag: u32,
    king_to: Square,
    must_be_empty: u64,
    /// Squares the king crosses or lands on.
    must_be_safe: [Square; 2],
}

const LIGHT_ROUTES: [CastleRoute; 2] = [
    CastleRoute {
        right: CASTLE_LIGHT_KINGSIDE,
        flag: FLAG_CASTLE_KINGSIDE,
        king_to: 6,
        must_be_empty: (1 << 5) | (1 << 6),
        must_be_safe: [5, 6],
    },
    CastleRoute {
        right: CASTLE_LIGHT_QUEENSIDE,
        flag: FLAG_CASTLE_QUEENSIDE,
        king_to: 2,
        must_be_empty: (1 << 1) | (1 << 2) | (1 << 3),
        must_be_safe: [3, 2],
    },
];

const DARK_ROUTES: [CastleRoute; 2] = [
    CastleRoute {
        right: CASTLE_DARK_KINGSIDE,
        flag: FLAG_CASTLE_KINGSIDE,
        king_to: 62,
        must_be_empty: (1 << 61) | (1 << 62),
        must_be_safe: [61, 62],
    },
    CastleRoute {
        right: CASTLE_DARK_QUEENSIDE,
        flag: FLAG_CASTLE_QUEENSIDE,
        king_to: 58,
        must_be_empty: (1 << 57) | (1 << 58) | (1 << 59),
        must_be_safe: [59, 58],
    },
];

fn generate_castling_moves(game_state: &GameState, out: &mut Vec<ChessMove>, king_from: Square) {
    let side = game_state.side_to_move;
    let enemy = side.opposite();

    let (king_start, routes) = match side {
        Color::Light => (LIGHT_KING_START, &LIGHT_ROUTES),
        Color::Dark => (DARK_KING_START, &DARK_ROUTES),
    };
    if king_from != king_start {
        return;
    }

    let rooks = game_state.pieces[side.index()][PieceKind::Rook.index()];
    let mut in_check: Option<bool> = None;

    for route in routes {
        if game_state.castling_rights & route.right == 0
            || game_state.occupancy_all & route.must_be_empty != 0
        {
            continue;
        }

        // FEN import may grant rights without the rook in place.
        let rook_square = if route.flag == FLAG_CASTLE_KINGSIDE {
            route.king_to + 1
        } else {
            route.king_to - 2
        };
        if rooks & square_bit(rook_square) == 0 {
            continue;
        }

        // Cannot castle out of check.
        if *in_check.get_or_insert_with(|| is_square_attacked(game_state, king_from, enemy)) {
            return;
        }

        if route
            .must_be_safe
            .iter()
            .all(|sq| !is_square_attacked(game_state, *sq, enemy))
        {
            out.push(ChessMove::new(
                king_from,
                route.king_to,
                PieceKind::King,
                None,
                route.flag,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::generate_king_moves;
    use crate::game_state::game_state::GameState;

    fn castles(fen: &str) -> usize {
        let game = GameState::from_fen(fen).expect("FEN should parse");
        let mut moves = Vec::new();
        generate_king_moves(&game, &mut moves);
        moves.iter().filter(|m| m.is_castle()).count()
    }

    #[test]
    fn both_sides_available_on_clear_back_rank() {
        assert_eq!(castles("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1"), 2);
        assert_eq!(castles("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1"), 2);
    }

    #[test]
    fn no_castling_out_of_or_through_check() {
        // Rook on e8 gives check.
        assert_eq!(castles("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1"), 0);
        // Rook on f8 covers f1, so only the queenside remains.
        assert_eq!(castles("5rk1/8/8/8/8/8/8/R3K2R w KQ - 0 1"), 1);
    }

    #[test]
    fn queenside_needs_b_file_empty_but_not_safe() {
        // b1 attacked by the rook on b8 does not prevent queenside castling.
        assert_eq!(castles("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1"), 1);
        assert_eq!(castles("4k3/8/8/8/8/8/8/RN2K3 w Q - 0 1"), 0);
    }
}
