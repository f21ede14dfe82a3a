//! Canonical chess-rule constants.
//!
//! Static rule literals shared by FEN handling, move generation, make/unmake
//! and draw detection.

use crate::game_state::chess_types::Square;

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Halfmove clock value at which the fifty-move rule declares a draw.
pub const FIFTY_MOVE_RULE_HALFMOVES: u16 = 100;

pub const LIGHT_KING_START: Square = 4;
pub const DARK_KING_START: Square = 60;

pub const LIGHT_ROOK_QUEENSIDE_START: Square = 0;
pub const LIGHT_ROOK_KINGSIDE_START: Square = 7;
pub const DARK_ROOK_QUEENSIDE_START: Square = 56;
pub const DARK_ROOK_KINGSIDE_START: Square = 63;

pub const FIRST_RANK: u64 = 0x0000_0000_0000_00FF;
pub const EIGHTH_RANK: u64 = 0xFF00_0000_0000_0000;
