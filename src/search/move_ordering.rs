//! Move ordering heuristics for alpha-beta.
//!
//! Order of preference: the previous iteration's root best move, the
//! transposition-table move, captures by MVV-LVA, promotions, the two killer
//! moves of the current ply, then quiet moves by history score.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::move_descriptions::ChessMove;

pub const MAX_PLY: usize = 128;

const PV_MOVE_SCORE: i32 = 2_000_000;
const TT_MOVE_SCORE: i32 = 1_000_000;
const CAPTURE_BASE: i32 = 100_000;
const PROMOTION_BASE: i32 = 90_000;
const FIRST_KILLER_SCORE: i32 = 80_000;
const SECOND_KILLER_SCORE: i32 = 70_000;
const HISTORY_CAP: i32 = 50_000;

type HistoryTable = [[[i32; 64]; 6]; 2];

/// Ordering value of a piece as victim or attacker. The king is only ever an
/// attacker here, so it sorts last among capturers.
#[inline]
const fn ordering_value(piece: PieceKind) -> i32 {
    match piece {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 20_000,
    }
}

/// Killer and history tables. History survives between searches and is
/// halved at the start of each one; killers are per-search.
#[derive(Debug, Clone)]
pub struct MoveOrdering {
    killers: [[Option<ChessMove>; 2]; MAX_PLY],
    history: Box<HistoryTable>,
}

impl Default for MoveOrdering {
    fn default() -> Self {
        Self {
            killers: [[None; 2]; MAX_PLY],
            history: Box::new([[[0; 64]; 6]; 2]),
        }
    }
}

impl MoveOrdering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare for a new search: drop killers, age history.
    pub fn begin_search(&mut self) {
        self.killers.fill([None; 2]);
        for side in self.history.iter_mut() {
            for piece in side.iter_mut() {
                for entry in piece.iter_mut() {
                    *entry /= 2;
                }
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn killers_at(&self, ply: usize) -> [Option<ChessMove>; 2] {
        self.killers[ply.min(MAX_PLY - 1)]
    }

    #[inline]
    pub fn history_score(&self, side: Color, mv: ChessMove) -> i32 {
        self.history[side.index()][mv.moved_piece().index()][mv.to() as usize]
    }

    /// Record a quiet move that caused a beta cutoff.
    pub fn record_cutoff(&mut self, side: Color, mv: ChessMove, ply: usize, depth: u8) {
        let slot = &mut self.killers[ply.min(MAX_PLY - 1)];
        if slot[0] != Some(mv) {
            slot[1] = slot[0];
            slot[0] = Some(mv);
        }

        let bonus = i32::from(depth) * i32::from(depth);
        let entry = &mut self.history[side.index()][mv.moved_piece().index()][mv.to() as usize];
        *entry = (*entry + bonus).min(HISTORY_CAP);
    }

    pub fn score_move(
        &self,
        game_state: &GameState,
        mv: ChessMove,
        pv_move: Option<ChessMove>,
        tt_move: Option<ChessMove>,
        ply: usize,
    ) -> i32 {
        if Some(mv) == pv_move {
            return PV_MOVE_SCORE;
        }
        if Some(mv) == tt_move {
            return TT_MOVE_SCORE;
        }

        let mut score = 0i32;
        if mv.is_capture() {
            let victim = if mv.is_en_passant() {
                PieceKind::Pawn
            } else {
                game_state
                    .piece_of_color_at(game_state.side_to_move.opposite(), mv.to())
                    .unwrap_or(PieceKind::Pawn)
            };
            score += CAPTURE_BASE + ordering_value(victim) * 16 - ordering_value(mv.moved_piece());
        }
        if let Some(promo) = mv.promotion() {
            score += PROMOTION_BASE + ordering_value(promo);
        }
        if score != 0 {
            return score;
        }

        let [first, second] = self.killers_at(ply);
        if Some(mv) == first {
            return FIRST_KILLER_SCORE;
        }
        if Some(mv) == second {
            return SECOND_KILLER_SCORE;
        }

        self.history_score(game_state.side_to_move, mv)
    }

    /// Stable sort, best first. Ties keep generation order.
    pub fn order_moves(
        &self,
        game_state: &GameState,
        moves: &mut [ChessMove],
        pv_move: Option<ChessMove>,
        tt_move: Option<ChessMove>,
        ply: usize,
    ) {
        moves.sort_by_cached_key(|mv| {
            std::cmp::Reverse(self.score_move(game_state, *mv, pv_move, tt_move, ply))
        });
    }
}
