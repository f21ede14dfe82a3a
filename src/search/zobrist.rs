//! Position keys for repetition tracking and the transposition table.
//!
//! One flat table of 781 keys drawn from a fixed-seed `StdRng`: 768
//! piece-square keys, 16 castling masks, 8 en-passant files and the
//! side-to-move key. The same seed gives the same keys in every process.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game_state::{chess_types::*, game_state::GameState};

const ZOBRIST_SEED: u64 = 0x5EED_C4E5_5AB1_E5ED;

const PIECE_SQUARE_KEYS: usize = 2 * 6 * 64;
const CASTLING_OFFSET: usize = PIECE_SQUARE_KEYS;
const EN_PASSANT_OFFSET: usize = CASTLING_OFFSET + 16;
const SIDE_TO_MOVE_OFFSET: usize = EN_PASSANT_OFFSET + 8;
const KEY_COUNT: usize = SIDE_TO_MOVE_OFFSET + 1;

static KEYS: OnceLock<[u64; KEY_COUNT]> = OnceLock::new();

#[inline]
fn keys() -> &'static [u64; KEY_COUNT] {
    KEYS.get_or_init(|| {
        let mut keys = [0u64; KEY_COUNT];
        StdRng::seed_from_u64(ZOBRIST_SEED).fill(&mut keys[..]);
        keys
    })
}

#[inline]
pub fn piece_square_key(color: Color, piece: PieceKind, square: Square) -> u64 {
    keys()[(color.index() * 6 + piece.index()) * 64 + usize::from(square & 63)]
}

/// Contribution of a castling rights mask (`0..=15`).
#[inline]
pub fn castling_key(castling_rights: CastlingRights) -> u64 {
    keys()[CASTLING_OFFSET + usize::from(castling_rights & CASTLE_ALL)]
}

/// Contribution of an en-passant target square, keyed by its file.
#[inline]
pub fn en_passant_key(square: Square) -> u64 {
    keys()[EN_PASSANT_OFFSET + usize::from(square_file(square & 63))]
}

/// XORed in when dark is to move.
#[inline]
pub fn side_to_move_key() -> u64 {
    keys()[SIDE_TO_MOVE_OFFSET]
}

/// Full key computed from the piece bitboards. Make/unmake keep
/// `zobrist_key` equal to this.
pub fn compute_zobrist_key(game_state: &GameState) -> u64 {
    let mut key = castling_key(game_state.castling_rights);
    if let Some(ep_square) = game_state.en_passant_square {
        key ^= en_passant_key(ep_square);
    }
    if game_state.side_to_move == Color::Dark {
        key ^= side_to_move_key();
    }

    for color in Color::ALL {
        for piece in PieceKind::ALL {
            let mut bb = game_state.piece_bitboard(color, piece);
            while bb != 0 {
                key ^= piece_square_key(color, piece, bb.trailing_zeros() as Square);
                bb &= bb - 1;
            }
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::{compute_zobrist_key, en_passant_key};
    use crate::game_state::game_state::GameState;
    use crate::move_generation::legal_move_apply::apply_move;
    use crate::utils::long_algebraic::long_algebraic_to_move;

    #[test]
    fn starting_position_hash_is_deterministic() {
        let a = GameState::new_game();
        let b = GameState::new_game();
        assert_eq!(a.zobrist_key, b.zobrist_key);
        assert_ne!(a.zobrist_key, 0);
    }

    #[test]
    fn side_to_move_changes_hash() {
        let w = GameState::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let b = GameState::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").expect("FEN should parse");
        assert_ne!(w.zobrist_key, b.zobrist_key);
    }

    #[test]
    fn castling_rights_change_hash() {
        let with_rights =
            GameState::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").expect("FEN should parse");
        let without_rights =
            GameState::from_fen("4k3/8/8/8/8/8/8/R3K2R w - - 0 1").expect("FEN should parse");
        assert_ne!(with_rights.zobrist_key, without_rights.zobrist_key);
    }

    #[test]
    fn transposed_move_orders_share_a_key() {
        let game = GameState::new_game();
        let mut via_knight_first = game.clone();
        for lan in ["g1f3", "g8f6", "b1c3", "b8c6"] {
            let mv = long_algebraic_to_move(lan, &via_knight_first).expect("legal move");
            via_knight_first = apply_move(&via_knight_first, mv).expect("move should apply");
        }
        let mut via_queenside_first = game;
        for lan in ["b1c3", "b8c6", "g1f3", "g8f6"] {
            let mv = long_algebraic_to_move(lan, &via_queenside_first).expect("legal move");
            via_queenside_first = apply_move(&via_queenside_first, mv).expect("move should apply");
        }
        assert_eq!(via_knight_first.zobrist_key, via_queenside_first.zobrist_key);
        assert_eq!(
            via_knight_first.zobrist_key,
            compute_zobrist_key(&via_knight_first)
        );
    }

    #[test]
    fn keys_are_pairwise_distinct() {
        let mut all = super::keys().to_vec();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), super::KEY_COUNT);
        assert!(!all.contains(&0));
    }

    #[test]
    fn en_passant_key_depends_only_on_file() {
        assert_eq!(en_passant_key(20), en_passant_key(44));
        assert_ne!(en_passant_key(20), en_passant_key(21));
    }
}
