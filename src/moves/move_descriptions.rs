//! Packed move value type.
//!
//! A `ChessMove` is immutable once built. Equality is structural on the packed
//! bits (origin, destination, moving piece, promotion, flag set).

use std::fmt;

use crate::game_state::chess_types::{PieceKind, Square};
use crate::utils::algebraic::square_name;

const FROM_SHIFT: u32 = 0;
const TO_SHIFT: u32 = 6;
const MOVED_PIECE_SHIFT: u32 = 12;
const PROMOTION_PIECE_SHIFT: u32 = 15;

const SQUARE_MASK: u32 = 0x3F;
const PIECE_MASK: u32 = 0x7;
const NO_PIECE_CODE: u32 = 0x7;

pub const FLAG_CAPTURE: u32 = 1 << 18;
pub const FLAG_DOUBLE_PAWN_PUSH: u32 = 1 << 19;
pub const FLAG_EN_PASSANT: u32 = 1 << 20;
pub const FLAG_CASTLE_KINGSIDE: u32 = 1 << 21;
pub const FLAG_CASTLE_QUEENSIDE: u32 = 1 << 22;

const FLAG_MASK: u32 = FLAG_CAPTURE
    | FLAG_DOUBLE_PAWN_PUSH
    | FLAG_EN_PASSANT
    | FLAG_CASTLE_KINGSIDE
    | FLAG_CASTLE_QUEENSIDE;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove(u32);

impl ChessMove {
    #[inline]
    pub fn new(
        from: Square,
        to: Square,
        moved_piece: PieceKind,
        promotion: Option<PieceKind>,
        flags: u32,
    ) -> Self {
        let promotion_code = promotion.map_or(NO_PIECE_CODE, |p| p.index() as u32);
        Self(
            (u32::from(from) & SQUARE_MASK) << FROM_SHIFT
                | (u32::from(to) & SQUARE_MASK) << TO_SHIFT
                | (moved_piece.index() as u32) << MOVED_PIECE_SHIFT
                | promotion_code << PROMOTION_PIECE_SHIFT
                | (flags & FLAG_MASK),
        )
    }

    #[inline]
    pub fn quiet(from: Square, to: Square, moved_piece: PieceKind) -> Self {
        Self::new(from, to, moved_piece, None, 0)
    }

    #[inline]
    pub fn from(self) -> Square {
        ((self.0 >> FROM_SHIFT) & SQUARE_MASK) as Square
    }

    #[inline]
    pub fn to(self) -> Square {
        ((self.0 >> TO_SHIFT) & SQUARE_MASK) as Square
    }

    #[inline]
    pub fn moved_piece(self) -> PieceKind {
        // Only `new` builds moves, and it always stores a valid piece index.
        PieceKind::from_index(((self.0 >> MOVED_PIECE_SHIFT) & PIECE_MASK) as usize)
            .unwrap_or(PieceKind::Pawn)
    }

    #[inline]
    pub fn promotion(self) -> Option<PieceKind> {
        PieceKind::from_index(((self.0 >> PROMOTION_PIECE_SHIFT) & PIECE_MASK) as usize)
    }

    #[inline]
    pub fn flags(self) -> u32 {
        self.0 & FLAG_MASK
    }

    #[inline]
    pub fn has_flag(self, flag: u32) -> bool {
        self.0 & flag != 0
    }

    #[inline]
    pub fn is_capture(self) -> bool {
        self.has_flag(FLAG_CAPTURE)
    }

    #[inline]
    pub fn is_en_passant(self) -> bool {
        self.has_flag(FLAG_EN_PASSANT)
    }

    #[inline]
    pub fn is_castle(self) -> bool {
        self.has_flag(FLAG_CASTLE_KINGSIDE | FLAG_CASTLE_QUEENSIDE)
    }

    #[inline]
    pub fn is_double_pawn_push(self) -> bool {
        self.has_flag(FLAG_DOUBLE_PAWN_PUSH)
    }

    #[inline]
    pub fn is_tactical(self) -> bool {
        self.is_capture() || self.promotion().is_some()
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Long algebraic form, e.g. `e2e4` or `e7e8q`.
    pub fn to_long_algebraic(self) -> String {
        let mut out = String::with_capacity(5);
        out.push_str(&square_name(self.from()));
        out.push_str(&square_name(self.to()));
        if let Some(promo) = self.promotion() {
            out.push(promo.fen_char());
        }
        out
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_long_algebraic())
    }
}

impl fmt::Debug for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChessMove({}", self.to_long_algebraic())?;
        if self.flags() != 0 {
            write!(f, " flags={:#x}", self.flags() >> 18)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_and_unpacks_every_field() {
        let mv = ChessMove::new(
            52,
            61,
            PieceKind::Pawn,
            Some(PieceKind::Knight),
            FLAG_CAPTURE,
        );
        assert_eq!(mv.from(), 52);
        assert_eq!(mv.to(), 61);
        assert_eq!(mv.moved_piece(), PieceKind::Pawn);
        assert_eq!(mv.promotion(), Some(PieceKind::Knight));
        assert!(mv.is_capture());
        assert!(!mv.is_en_passant());
        assert!(mv.is_tactical());
        assert_eq!(mv.to_string(), "e7f8n");
    }

    #[test]
    fn equality_is_structural() {
        let a = ChessMove::new(4, 6, PieceKind::King, None, FLAG_CASTLE_KINGSIDE);
        let b = ChessMove::new(4, 6, PieceKind::King, None, FLAG_CASTLE_KINGSIDE);
        let plain = ChessMove::quiet(4, 6, PieceKind::King);
        assert_eq!(a, b);
        assert_ne!(a, plain);
        assert!(a.is_castle());
        assert!(!plain.is_castle());
    }

    #[test]
    fn quiet_move_has_no_promotion() {
        let mv = ChessMove::quiet(12, 28, PieceKind::Pawn);
        assert_eq!(mv.promotion(), None);
        assert!(!mv.is_tactical());
        assert_eq!(format!("{mv}"), "e2e4");
    }
}
