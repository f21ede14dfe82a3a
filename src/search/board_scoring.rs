//! Pluggable board evaluation interfaces and baseline implementations.
//!
//! Search delegates static scoring to `BoardScorer`, so heuristics can be
//! swapped without touching search code. `evaluate_position` layers the
//! terminal rules (mate, stalemate, draws) on top of any scorer.

use crate::errors::ChessResult;
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::legal_move_generator::generate_legal_moves_in_place;

pub const MATE_SCORE: i32 = 30000;
/// Scores at or beyond this magnitude encode a forced mate.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - 1000;
/// Static evaluations are clamped to stay clear of the mate band.
pub const MAX_EVAL: i32 = MATE_THRESHOLD - 1;
pub const DRAW_SCORE: i32 = 0;

const FILE_A: u64 = 0x0101_0101_0101_0101;
const FULL_PHASE: i32 = 24;

pub trait BoardScorer: Send + Sync {
    /// Score from the perspective of the side to move.
    fn score(&self, game_state: &GameState) -> i32;
}

#[inline]
pub const fn piece_value(piece: PieceKind) -> i32 {
    match piece {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 0,
    }
}

/// Score for delivering mate `ply` half-moves from the root.
#[inline]
pub const fn mate_in(ply: u8) -> i32 {
    MATE_SCORE - ply as i32
}

#[inline]
pub const fn is_mate_score(score: i32) -> bool {
    score >= MATE_THRESHOLD || score <= -MATE_THRESHOLD
}

/// Full moves until mate, positive when the side to move mates.
pub fn mate_distance(score: i32) -> Option<i32> {
    if !is_mate_score(score) {
        return None;
    }
    let plies = MATE_SCORE - score.abs();
    let moves = (plies + 1) / 2;
    Some(if score > 0 { moves } else { -moves })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl MaterialScorer {
    #[inline]
    fn material_balance_white_minus_black(game_state: &GameState) -> i32 {
        PieceKind::ALL
            .iter()
            .map(|&piece| {
                let light = game_state.piece_bitboard(Color::Light, piece).count_ones() as i32;
                let dark = game_state.piece_bitboard(Color::Dark, piece).count_ones() as i32;
                (light - dark) * piece_value(piece)
            })
            .sum()
    }
}

impl BoardScorer for MaterialScorer {
    fn score(&self, game_state: &GameState) -> i32 {
        let white_minus_black = Self::material_balance_white_minus_black(game_state);
        from_side_to_move(game_state, white_minus_black)
    }
}

/// Material plus tapered piece placement, king shelter and pawn structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScorer;

impl StandardScorer {
    const SHIELD_PAWN_BONUS: i32 = 12;
    const DOUBLED_PAWN_PENALTY: i32 = 15;
    const ISOLATED_PAWN_PENALTY: i32 = 12;

    /// `(midgame, endgame)` light-minus-dark terms for one side.
    fn side_terms(game_state: &GameState, color: Color) -> (i32, i32) {
        let mut mg = 0i32;
        let mut eg = 0i32;

        for piece in PieceKind::ALL {
            let mut bb = game_state.piece_bitboard(color, piece);
            while bb != 0 {
                let sq = bb.trailing_zeros() as Square;
                mg += piece_square_bonus_mg(piece, color, sq);
                eg += piece_square_bonus_eg(piece, color, sq);
                bb &= bb - 1;
            }
        }

        mg += Self::king_shelter(game_state, color);

        let (structure, passed_mg, passed_eg) = Self::pawn_structure(game_state, color);
        mg += structure + passed_mg;
        eg += structure + passed_eg;

        (mg, eg)
    }

    fn king_shelter(game_state: &GameState, color: Color) -> i32 {
        let Some(king_sq) = game_state.king_square(color) else {
            return 0;
        };
        if relative_rank(color, king_sq) > 0 {
            return 0;
        }

        let own_pawns = game_state.piece_bitboard(color, PieceKind::Pawn);
        let file = square_file(king_sq) as i32;
        let mut shield = 0u64;
        for f in (file - 1).max(0)..=(file + 1).min(7) {
            for rel_rank in [1u8, 2u8] {
                let rank = match color {
                    Color::Light => rel_rank,
                    Color::Dark => 7 - rel_rank,
                };
                shield |= square_bit(rank * 8 + f as u8);
            }
        }
        (own_pawns & shield).count_ones() as i32 * Self::SHIELD_PAWN_BONUS
    }

    /// Returns `(doubled + isolated, passed midgame, passed endgame)`.
    fn pawn_structure(game_state: &GameState, color: Color) -> (i32, i32, i32) {
        let own_pawns = game_state.piece_bitboard(color, PieceKind::Pawn);
        let enemy_pawns = game_state.piece_bitboard(color.opposite(), PieceKind::Pawn);
        let mut structure = 0i32;

        for file in 0..8u8 {
            let on_file = (own_pawns & (FILE_A << file)).count_ones() as i32;
            if on_file == 0 {
                continue;
            }
            if on_file > 1 {
                structure -= (on_file - 1) * Self::DOUBLED_PAWN_PENALTY;
            }
            if own_pawns & adjacent_files(file) == 0 {
                structure -= on_file * Self::ISOLATED_PAWN_PENALTY;
            }
        }

        let mut passed_mg = 0i32;
        let mut passed_eg = 0i32;
        let mut pawns = own_pawns;
        while pawns != 0 {
            let sq = pawns.trailing_zeros() as Square;
            if is_passed_pawn(color, sq, enemy_pawns) {
                let rank = relative_rank(color, sq) as i32;
                passed_mg += rank * 5;
                passed_eg += (rank + 1) * 12;
            }
            pawns &= pawns - 1;
        }

        (structure, passed_mg, passed_eg)
    }
}

impl BoardScorer for StandardScorer {
    fn score(&self, game_state: &GameState) -> i32 {
        let material = MaterialScorer::material_balance_white_minus_black(game_state);
        let (light_mg, light_eg) = Self::side_terms(game_state, Color::Light);
        let (dark_mg, dark_eg) = Self::side_terms(game_state, Color::Dark);

        let phase = game_phase(game_state);
        let mg = light_mg - dark_mg;
        let eg = light_eg - dark_eg;
        let tapered = (mg * phase + eg * (FULL_PHASE - phase)) / FULL_PHASE;

        from_side_to_move(game_state, material + tapered)
    }
}

/// Terminal-aware evaluation at `ply` from the search root.
///
/// Checkmate scores `-(MATE_SCORE - ply)` for the side to move; stalemate and
/// the draw rules score `DRAW_SCORE`; anything else is the scorer's opinion
/// clamped to `±MAX_EVAL`.
pub fn evaluate_position<S: BoardScorer + ?Sized>(
    scorer: &S,
    game_state: &mut GameState,
    ply: u8,
) -> ChessResult<i32> {
    let mut moves = Vec::with_capacity(64);
    generate_legal_moves_in_place(game_state, &mut moves)?;

    if moves.is_empty() {
        return Ok(if game_state.is_in_check() {
            -mate_in(ply)
        } else {
            DRAW_SCORE
        });
    }

    if game_state.is_fifty_move_draw()
        || game_state.is_threefold_repetition()
        || game_state.has_insufficient_material()
    {
        return Ok(DRAW_SCORE);
    }

    Ok(clamp_eval(scorer.score(game_state)))
}

#[inline]
pub fn clamp_eval(score: i32) -> i32 {
    score.clamp(-MAX_EVAL, MAX_EVAL)
}

#[inline]
fn from_side_to_move(game_state: &GameState, white_minus_black: i32) -> i32 {
    white_minus_black * game_state.side_to_move.sign()
}

/// Remaining non-pawn material, `FULL_PHASE` at the start, 0 in bare endings.
fn game_phase(game_state: &GameState) -> i32 {
    let mut phase = 0i32;
    for color in Color::ALL {
        phase += game_state.piece_bitboard(color, PieceKind::Queen).count_ones() as i32 * 4;
        phase += game_state.piece_bitboard(color, PieceKind::Rook).count_ones() as i32 * 2;
        phase += game_state.piece_bitboard(color, PieceKind::Bishop).count_ones() as i32;
        phase += game_state.piece_bitboard(color, PieceKind::Knight).count_ones() as i32;
    }
    phase.clamp(0, FULL_PHASE)
}

#[inline]
fn relative_rank(color: Color, sq: Square) -> u8 {
    match color {
        Color::Light => square_rank(sq),
        Color::Dark => 7 - square_rank(sq),
    }
}

#[inline]
fn adjacent_files(file: u8) -> u64 {
    let mut mask = 0u64;
    if file > 0 {
        mask |= FILE_A << (file - 1);
    }
    if file < 7 {
        mask |= FILE_A << (file + 1);
    }
    mask
}

#[inline]
fn center_bonus(file: i32, rank: i32) -> i32 {
    // Distance to the nearest of the four centre squares.
    let df = if file < 4 { 3 - file } else { file - 4 };
    let dr = if rank < 4 { 3 - rank } else { rank - 4 };
    3 - (df + dr)
}

fn piece_square_bonus_mg(piece: PieceKind, color: Color, sq: Square) -> i32 {
    let r = relative_rank(color, sq) as i32;
    let file = square_file(sq) as i32;
    let center = center_bonus(file, r);

    match piece {
        PieceKind::Pawn => r * 6 + if (3..=4).contains(&file) { r * 4 } else { 0 },
        PieceKind::Knight => center * 8,
        PieceKind::Bishop => center * 4 + if r == 0 { -10 } else { 0 },
        PieceKind::Rook => if r == 6 { 20 } else { 0 },
        PieceKind::Queen => center * 2,
        PieceKind::King => {
            if r == 0 {
                // Castled corners beat the centre files.
                match file {
                    0..=2 | 6..=7 => 20,
                    _ => 0,
                }
            } else {
                -r * 15
            }
        }
    }
}

fn piece_square_bonus_eg(piece: PieceKind, color: Color, sq: Square) -> i32 {
    let r = relative_rank(color, sq) as i32;
    let file = square_file(sq) as i32;
    let center = center_bonus(file, r);

    match piece {
        PieceKind::Pawn => r * 10,
        PieceKind::Knight => center * 6,
        PieceKind::Bishop => center * 4,
        PieceKind::Rook => 0,
        PieceKind::Queen => center * 4,
        PieceKind::King => center * 10,
    }
}

fn is_passed_pawn(color: Color, sq: Square, enemy_pawns: u64) -> bool {
    let file = square_file(sq);
    let rank = square_rank(sq);
    let files = FILE_A << file | adjacent_files(file);
    let ahead = match color {
        Color::Light if rank < 7 => !0u64 << ((rank + 1) * 8),
        Color::Dark if rank > 0 => !0u64 >> ((8 - rank) * 8),
        _ => 0,
    };
    enemy_pawns & files & ahead == 0
}
