//! FEN-to-GameState parser.
//!
//! Builds fully-populated incremental state from a Forsyth-Edwards Notation
//! string, including piece bitboards, rights, clocks, occupancies and the
//! Zobrist key. The result is checked with `GameState::validate`.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::{
    DARK_KING_START, DARK_ROOK_KINGSIDE_START, DARK_ROOK_QUEENSIDE_START, LIGHT_KING_START,
    LIGHT_ROOK_KINGSIDE_START, LIGHT_ROOK_QUEENSIDE_START,
};
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::utils::algebraic::{algebraic_to_square, square_name};

#[inline]
fn fen_error(message: impl Into<String>) -> ChessError {
    ChessError::InvalidFen(message.into())
}

pub fn parse_fen(fen: &str) -> ChessResult<GameState> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or_else(|| fen_error("missing board layout"))?;
    let side_part = parts.next().ok_or_else(|| fen_error("missing side to move"))?;
    let castling_part = parts.next().ok_or_else(|| fen_error("missing castling rights"))?;
    let en_passant_part = parts.next().ok_or_else(|| fen_error("missing en-passant square"))?;
    let halfmove_part = parts.next().ok_or_else(|| fen_error("missing halfmove clock"))?;
    let fullmove_part = parts.next().ok_or_else(|| fen_error("missing fullmove number"))?;

    if parts.next().is_some() {
        return Err(fen_error("extra trailing fields"));
    }

    let mut game_state = GameState::new_empty();

    parse_board(board_part, &mut game_state)?;
    game_state.side_to_move = parse_side_to_move(side_part)?;
    game_state.castling_rights =
        supported_castling_rights(&game_state, parse_castling_rights(castling_part)?);
    game_state.en_passant_square = parse_en_passant_square(en_passant_part)?;
    game_state.halfmove_clock = halfmove_part
        .parse::<u16>()
        .map_err(|_| fen_error(format!("invalid halfmove clock: {halfmove_part}")))?;
    game_state.fullmove_number = fullmove_part
        .parse::<u16>()
        .map_err(|_| fen_error(format!("invalid fullmove number: {fullmove_part}")))?
        .max(1);

    game_state.refresh_derived_state();

    if let Some(ep) = game_state.en_passant_square {
        check_en_passant_square(&game_state, ep)?;
    }

    game_state.validate().map_err(|err| match err {
        ChessError::InvariantViolation(reason) => fen_error(reason),
        other => other,
    })?;

    Ok(game_state)
}

fn parse_board(board_part: &str, game_state: &mut GameState) -> ChessResult<()> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(fen_error("board layout must contain 8 ranks"));
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx;
        let mut file = 0usize;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(fen_error(format!("invalid empty-square count '{ch}'")));
                }
                file += empty_count as usize;
                if file > 8 {
                    return Err(fen_error(format!("rank {} has too many files", board_rank + 1)));
                }
                continue;
            }

            let (color, piece) = piece_from_fen_char(ch)
                .ok_or_else(|| fen_error(format!("invalid piece character '{ch}'")))?;

            if file >= 8 {
                return Err(fen_error(format!("rank {} has too many files", board_rank + 1)));
            }

            let sq = board_rank * 8 + file;
            game_state.pieces[color.index()][piece.index()] |= 1u64 << sq;
            file += 1;
        }

        if file != 8 {
            return Err(fen_error(format!(
                "rank {} does not sum to 8 files",
                board_rank + 1
            )));
        }
    }

    Ok(())
}

fn parse_side_to_move(side_part: &str) -> ChessResult<Color> {
    match side_part {
        "w" => Ok(Color::Light),
        "b" => Ok(Color::Dark),
        _ => Err(fen_error(format!("invalid side to move: {side_part}"))),
    }
}

fn parse_castling_rights(castling_part: &str) -> ChessResult<CastlingRights> {
    if castling_part == "-" {
        return Ok(0);
    }

    let mut rights: CastlingRights = 0;
    for ch in castling_part.chars() {
        let flag = match ch {
            'K' => CASTLE_LIGHT_KINGSIDE,
            'Q' => CASTLE_LIGHT_QUEENSIDE,
            'k' => CASTLE_DARK_KINGSIDE,
            'q' => CASTLE_DARK_QUEENSIDE,
            _ => return Err(fen_error(format!("invalid castling character '{ch}'"))),
        };
        if rights & flag != 0 {
            return Err(fen_error(format!("duplicate castling character '{ch}'")));
        }
        rights |= flag;
    }

    Ok(rights)
}

/// Drop rights whose king or rook is not on its starting square.
fn supported_castling_rights(game_state: &GameState, rights: CastlingRights) -> CastlingRights {
    let on = |color: Color, piece: PieceKind, sq: Square| {
        game_state.pieces[color.index()][piece.index()] & square_bit(sq) != 0
    };

    let checks = [
        (CASTLE_LIGHT_KINGSIDE, Color::Light, LIGHT_KING_START, LIGHT_ROOK_KINGSIDE_START),
        (CASTLE_LIGHT_QUEENSIDE, Color::Light, LIGHT_KING_START, LIGHT_ROOK_QUEENSIDE_START),
        (CASTLE_DARK_KINGSIDE, Color::Dark, DARK_KING_START, DARK_ROOK_KINGSIDE_START),
        (CASTLE_DARK_QUEENSIDE, Color::Dark, DARK_KING_START, DARK_ROOK_QUEENSIDE_START),
    ];

    checks
        .into_iter()
        .filter(|(flag, color, king, rook)| {
            rights & flag != 0
                && on(*color, PieceKind::King, *king)
                && on(*color, PieceKind::Rook, *rook)
        })
        .fold(0, |acc, (flag, ..)| acc | flag)
}

fn parse_en_passant_square(en_passant_part: &str) -> ChessResult<Option<Square>> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    algebraic_to_square(en_passant_part)
        .map(Some)
        .map_err(|_| fen_error(format!("invalid en-passant square: {en_passant_part}")))
}

/// The target must sit behind a pawn that just made a double push.
fn check_en_passant_square(game_state: &GameState, ep: Square) -> ChessResult<()> {
    let (expected_rank, pusher, pawn_sq, origin_sq) = match game_state.side_to_move {
        Color::Light => (5, Color::Dark, ep.wrapping_sub(8), ep.wrapping_add(8)),
        Color::Dark => (2, Color::Light, ep.wrapping_add(8), ep.wrapping_sub(8)),
    };

    if square_rank(ep) != expected_rank {
        return Err(fen_error(format!(
            "en-passant square on wrong rank for side to move: {}",
            square_name(ep)
        )));
    }
    if game_state.piece_of_color_at(pusher, pawn_sq) != Some(PieceKind::Pawn) {
        return Err(fen_error("en-passant square without a double-pushed pawn"));
    }
    if game_state.occupancy_all & (square_bit(ep) | square_bit(origin_sq)) != 0 {
        return Err(fen_error("en-passant square or its origin is occupied"));
    }

    Ok(())
}

fn piece_from_fen_char(ch: char) -> Option<(Color, PieceKind)> {
    let color = if ch.is_ascii_uppercase() {
        Color::Light
    } else if ch.is_ascii_lowercase() {
        Color::Dark
    } else {
        return None;
    };

    let piece = PieceKind::ALL
        .into_iter()
        .find(|piece| piece.fen_char() == ch.to_ascii_lowercase())?;

    Some((color, piece))
}
