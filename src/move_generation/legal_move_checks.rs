//! Square attack and king safety queries.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::leaper_attacks::{king_attacks, knight_attacks, pawn_attacks};
use crate::moves::slider_attacks::{bishop_attacks, rook_attacks};

#[inline]
pub fn king_square(game_state: &GameState, color: Color) -> Option<Square> {
    game_state.king_square(color)
}

#[inline]
pub fn is_king_in_check(game_state: &GameState, color: Color) -> bool {
    let Some(king_sq) = king_square(game_state, color) else {
        return false;
    };
    is_square_attacked(game_state, king_sq, color.opposite())
}

/// Whether any piece of `attacker_color` attacks `square` under the current
/// occupancy. Attacks are cast outward from the target square.
pub fn is_square_attacked(game_state: &GameState, square: Square, attacker_color: Color) -> bool {
    let attackers = &game_state.pieces[attacker_color.index()];

    // A pawn of the defending colour on `square` would attack exactly the
    // squares from which enemy pawns attack it.
    if pawn_attacks(attacker_color.opposite(), square) & attackers[PieceKind::Pawn.index()] != 0 {
        return true;
    }

    if knight_attacks(square) & attackers[PieceKind::Knight.index()] != 0 {
        return true;
    }

    if king_attacks(square) & attackers[PieceKind::King.index()] != 0 {
        return true;
    }

    let queens = attackers[PieceKind::Queen.index()];
    let bishops_queens = attackers[PieceKind::Bishop.index()] | queens;
    if bishop_attacks(square, game_state.occupancy_all) & bishops_queens != 0 {
        return true;
    }

    let rooks_queens = attackers[PieceKind::Rook.index()] | queens;
    rook_attacks(square, game_state.occupancy_all) & rooks_queens != 0
}

#[cfg(test)]
mod tests {
    use super::{is_king_in_check, is_square_attacked};
    use crate::game_state::chess_types::Color;
    use crate::game_state::game_state::GameState;

    #[test]
    fn start_position_attack_map() {
        let game = GameState::new_game();
        // e3 and f3 are covered by light pawns, e4 is not.
        assert!(is_square_attacked(&game, 20, Color::Light));
        assert!(is_square_attacked(&game, 21, Color::Light));
        assert!(!is_square_attacked(&game, 28, Color::Light));
        // Knight on g8 covers f6.
        assert!(is_square_attacked(&game, 45, Color::Dark));
        assert!(!is_king_in_check(&game, Color::Light));
    }

    #[test]
    fn slider_check_is_blocked_by_interposed_piece() {
        let open = GameState::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1").expect("FEN should parse");
        assert!(is_king_in_check(&open, Color::Dark));

        let blocked =
            GameState::from_fen("4k3/4n3/8/8/8/8/8/4R1K1 b - - 0 1").expect("FEN should parse");
        assert!(!is_king_in_check(&blocked, Color::Dark));
    }

    #[test]
    fn pawn_attacks_point_forward_only() {
        let game = GameState::from_fen("4k3/8/8/8/3p4/8/8/4K3 w - - 0 1").expect("FEN should parse");
        // Dark pawn on d4 attacks c3 and e3 but not c5.
        assert!(is_square_attacked(&game, 18, Color::Dark));
        assert!(is_square_attacked(&game, 20, Color::Dark));
        assert!(!is_square_attacked(&game, 34, Color::Dark));
    }
}
