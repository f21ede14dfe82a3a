//! Core incremental board state representation.
//!
//! `GameState` stores piece bitboards, occupancy caches, turn and rights
//! flags, clocks, the incremental Zobrist key and the repetition history that
//! make/unmake maintain.

use std::fmt;
use std::str::FromStr;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::{EIGHTH_RANK, FIFTY_MOVE_RULE_HALFMOVES, FIRST_RANK};
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::move_generation::legal_move_generator::generate_legal_moves_in_place;
use crate::search::zobrist::{compute_zobrist_key, piece_square_key};
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;

/// Outcome classification of a position for the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    FiftyMoveDraw,
    ThreefoldRepetition,
    InsufficientMaterial,
}

/// Incremental game state optimized for in-place make/unmake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    // [color][piece_kind]
    pub pieces: [[u64; 6]; 2],

    pub occupancy_by_color: [u64; 2],
    pub occupancy_all: u64,

    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,

    pub halfmove_clock: u16,
    pub fullmove_number: u16,

    pub zobrist_key: u64,

    /// Plies played since this state was created or imported.
    pub ply: u16,
    /// Zobrist keys of every earlier position, oldest first.
    pub repetition_history: Vec<u64>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            pieces: [[0; 6]; 2],
            occupancy_by_color: [0; 2],
            occupancy_all: 0,

            side_to_move: Color::Light,
            castling_rights: 0,
            en_passant_square: None,

            halfmove_clock: 0,
            fullmove_number: 1,

            zobrist_key: 0,

            ply: 0,
            repetition_history: Vec::new(),
        }
    }
}

impl GameState {
    #[inline]
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Standard starting position.
    pub fn new_game() -> Self {
        let mut game_state = Self::new_empty();

        let light = Color::Light.index();
        let dark = Color::Dark.index();
        game_state.pieces[light] = [
            0x0000_0000_0000_FF00,
            0x0000_0000_0000_0042,
            0x0000_0000_0000_0024,
            0x0000_0000_0000_0081,
            0x0000_0000_0000_0008,
            0x0000_0000_0000_0010,
        ];
        game_state.pieces[dark] = [
            0x00FF_0000_0000_0000,
            0x4200_0000_0000_0000,
            0x2400_0000_0000_0000,
            0x8100_0000_0000_0000,
            0x0800_0000_0000_0000,
            0x1000_0000_0000_0000,
        ];
        game_state.castling_rights = CASTLE_ALL;
        game_state.refresh_derived_state();
        game_state.repetition_history.reserve(256);
        game_state
    }

    #[inline]
    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        parse_fen(fen)
    }

    #[inline]
    pub fn get_fen(&self) -> String {
        generate_fen(self)
    }

    /// Recompute occupancy caches and the Zobrist key from the bitboards.
    pub fn refresh_derived_state(&mut self) {
        for color in Color::ALL {
            self.occupancy_by_color[color.index()] = self.pieces[color.index()]
                .iter()
                .fold(0u64, |acc, bb| acc | bb);
        }
        self.occupancy_all = self.occupancy_by_color[0] | self.occupancy_by_color[1];
        self.zobrist_key = compute_zobrist_key(self);
    }

    #[inline]
    pub fn piece_bitboard(&self, color: Color, piece: PieceKind) -> u64 {
        self.pieces[color.index()][piece.index()]
    }

    #[inline]
    pub fn piece_of_color_at(&self, color: Color, square: Square) -> Option<PieceKind> {
        let mask = square_bit(square);
        if self.occupancy_by_color[color.index()] & mask == 0 {
            return None;
        }
        PieceKind::ALL
            .into_iter()
            .find(|piece| self.pieces[color.index()][piece.index()] & mask != 0)
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<(Color, PieceKind)> {
        Color::ALL.into_iter().find_map(|color| {
            self.piece_of_color_at(color, square)
                .map(|piece| (color, piece))
        })
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let kings = self.piece_bitboard(color, PieceKind::King);
        (kings != 0).then(|| kings.trailing_zeros() as Square)
    }

    /// Whether the side to move's king is attacked.
    #[inline]
    pub fn is_in_check(&self) -> bool {
        self.is_color_in_check(self.side_to_move)
    }

    #[inline]
    pub fn is_color_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|sq| is_square_attacked(self, sq, color.opposite()))
    }

    /// Flip one piece on or off, keeping occupancy and hash in sync.
    #[inline]
    pub(crate) fn toggle_piece(&mut self, color: Color, piece: PieceKind, square: Square) {
        let mask = square_bit(square);
        self.pieces[color.index()][piece.index()] ^= mask;
        self.occupancy_by_color[color.index()] ^= mask;
        self.occupancy_all ^= mask;
        self.zobrist_key ^= piece_square_key(color, piece, square);
    }

    #[inline]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= FIFTY_MOVE_RULE_HALFMOVES
    }

    /// Current position occurred at least twice before since the last
    /// irreversible move.
    #[inline]
    pub fn is_threefold_repetition(&self) -> bool {
        self.is_repetition_draw(usize::MAX)
    }

    /// Repetition test used by search: a third occurrence in the game, or any
    /// repeat of a position at history index `search_root_len` or later.
    pub fn is_repetition_draw(&self, search_root_len: usize) -> bool {
        let len = self.repetition_history.len();
        let window = usize::from(self.halfmove_clock).min(len);
        let mut seen = 0u32;
        let mut back = 2usize;

        while back <= window {
            let idx = len - back;
            if self.repetition_history[idx] == self.zobrist_key {
                if idx >= search_root_len {
                    return true;
                }
                seen += 1;
                if seen >= 2 {
                    return true;
                }
            }
            back += 2;
        }

        false
    }

    /// Neither side can possibly deliver mate: no pawns, rooks or queens and
    /// at most one minor piece on the board.
    pub fn has_insufficient_material(&self) -> bool {
        let heavy_or_pawns = Color::ALL.iter().fold(0u64, |acc, c| {
            acc | self.piece_bitboard(*c, PieceKind::Pawn)
                | self.piece_bitboard(*c, PieceKind::Rook)
                | self.piece_bitboard(*c, PieceKind::Queen)
        });
        if heavy_or_pawns != 0 {
            return false;
        }

        let minors: u32 = Color::ALL
            .iter()
            .map(|c| {
                (self.piece_bitboard(*c, PieceKind::Knight)
                    | self.piece_bitboard(*c, PieceKind::Bishop))
                .count_ones()
            })
            .sum();
        minors <= 1
    }

    /// Classify the position. Checkmate takes precedence over the draw rules.
    pub fn status(&self) -> ChessResult<GameStatus> {
        let mut probe = self.clone();
        let mut moves = Vec::with_capacity(64);
        generate_legal_moves_in_place(&mut probe, &mut moves)?;

        if moves.is_empty() {
            return Ok(if self.is_in_check() {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            });
        }
        if self.is_fifty_move_draw() {
            return Ok(GameStatus::FiftyMoveDraw);
        }
        if self.is_threefold_repetition() {
            return Ok(GameStatus::ThreefoldRepetition);
        }
        if self.has_insufficient_material() {
            return Ok(GameStatus::InsufficientMaterial);
        }
        Ok(GameStatus::Ongoing)
    }

    /// Check structural invariants that legal play must preserve.
    pub fn validate(&self) -> ChessResult<()> {
        for color in Color::ALL {
            let kings = self.piece_bitboard(color, PieceKind::King).count_ones();
            if kings != 1 {
                return Err(ChessError::InvariantViolation(format!(
                    "{color:?} has {kings} kings"
                )));
            }
        }

        let mut seen = 0u64;
        for color in Color::ALL {
            for piece in PieceKind::ALL {
                let bb = self.piece_bitboard(color, piece);
                if seen & bb != 0 {
                    return Err(ChessError::InvariantViolation(
                        "two pieces share a square".to_owned(),
                    ));
                }
                seen |= bb;
            }
        }
        if seen != self.occupancy_all {
            return Err(ChessError::InvariantViolation(
                "occupancy cache out of sync with piece bitboards".to_owned(),
            ));
        }

        let pawns = self.piece_bitboard(Color::Light, PieceKind::Pawn)
            | self.piece_bitboard(Color::Dark, PieceKind::Pawn);
        if pawns & (FIRST_RANK | EIGHTH_RANK) != 0 {
            return Err(ChessError::InvariantViolation(
                "pawn on first or eighth rank".to_owned(),
            ));
        }

        if self.is_color_in_check(self.side_to_move.opposite()) {
            return Err(ChessError::InvariantViolation(
                "side not to move is in check".to_owned(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_fen())
    }
}

impl FromStr for GameState {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}
