//! In-place make/unmake.
//!
//! `make_move` mutates the state and hands back an `UndoState` token;
//! `unmake_move` consumes the token and restores the exact previous state,
//! Zobrist key and repetition history included.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::{
    DARK_KING_START, DARK_ROOK_KINGSIDE_START, DARK_ROOK_QUEENSIDE_START, LIGHT_KING_START,
    LIGHT_ROOK_KINGSIDE_START, LIGHT_ROOK_QUEENSIDE_START,
};
use crate::game_state::{chess_types::*, game_state::GameState, undo_state::UndoState};
use crate::moves::move_descriptions::{ChessMove, FLAG_CASTLE_KINGSIDE, FLAG_CASTLE_QUEENSIDE};
use crate::search::zobrist::{castling_key, en_passant_key, side_to_move_key};

/// Apply `mv` for the side to move. The move must come from the generator for
/// this exact state; a mismatching piece layout is reported as `InvalidMove`
/// and leaves the state untouched.
pub fn make_move(game_state: &mut GameState, mv: ChessMove) -> ChessResult<UndoState> {
    let from = mv.from();
    let to = mv.to();
    let moved_piece = mv.moved_piece();
    let mover = game_state.side_to_move;
    let enemy = mover.opposite();
    let captured_piece = fitting_capture(game_state, mv, mover)?;
    let capture_square = en_passant_capture_square(mv, mover);

    let undo = UndoState {
        mv,
        captured_piece,
        prev_castling_rights: game_state.castling_rights,
        prev_en_passant_square: game_state.en_passant_square,
        prev_halfmove_clock: game_state.halfmove_clock,
        prev_fullmove_number: game_state.fullmove_number,
        prev_zobrist_key: game_state.zobrist_key,
    };

    game_state.zobrist_key ^= castling_key(game_state.castling_rights);
    if let Some(ep) = game_state.en_passant_square {
        game_state.zobrist_key ^= en_passant_key(ep);
    }

    if let Some(captured) = captured_piece {
        game_state.toggle_piece(enemy, captured, capture_square);
    }

    game_state.toggle_piece(mover, moved_piece, from);
    game_state.toggle_piece(mover, mv.promotion().unwrap_or(moved_piece), to);

    if let Some((rook_from, rook_to)) = castling_rook_squares(mv) {
        game_state.toggle_piece(mover, PieceKind::Rook, rook_from);
        game_state.toggle_piece(mover, PieceKind::Rook, rook_to);
    }

    update_castling_rights(game_state, mover, from, to, moved_piece);
    game_state.en_passant_square = mv.is_double_pawn_push().then(|| (from + to) / 2);

    game_state.zobrist_key ^= castling_key(game_state.castling_rights);
    if let Some(ep) = game_state.en_passant_square {
        game_state.zobrist_key ^= en_passant_key(ep);
    }
    game_state.zobrist_key ^= side_to_move_key();

    if moved_piece == PieceKind::Pawn || captured_piece.is_some() {
        game_state.halfmove_clock = 0;
    } else {
        game_state.halfmove_clock = game_state.halfmove_clock.saturating_add(1);
    }
    if mover == Color::Dark {
        game_state.fullmove_number = game_state.fullmove_number.saturating_add(1);
    }

    game_state.side_to_move = enemy;
    game_state.ply = game_state.ply.saturating_add(1);
    game_state.repetition_history.push(undo.prev_zobrist_key);

    Ok(undo)
}

/// Reverse the move recorded in `undo`. Tokens must be replayed in LIFO order.
pub fn unmake_move(game_state: &mut GameState, undo: UndoState) -> ChessResult<()> {
    let mv = undo.mv;
    let from = mv.from();
    let to = mv.to();
    let moved_piece = mv.moved_piece();
    let mover = game_state.side_to_move.opposite();
    let placed_piece = mv.promotion().unwrap_or(moved_piece);

    if game_state.piece_of_color_at(mover, to) != Some(placed_piece) {
        return Err(ChessError::InvariantViolation(format!(
            "unmake {mv}: destination does not hold the moved piece"
        )));
    }
    if game_state.repetition_history.last() != Some(&undo.prev_zobrist_key) {
        return Err(ChessError::InvariantViolation(format!(
            "unmake {mv}: undo token is not the most recent one"
        )));
    }

    if let Some((rook_from, rook_to)) = castling_rook_squares(mv) {
        game_state.toggle_piece(mover, PieceKind::Rook, rook_to);
        game_state.toggle_piece(mover, PieceKind::Rook, rook_from);
    }

    game_state.toggle_piece(mover, placed_piece, to);
    game_state.toggle_piece(mover, moved_piece, from);

    if let Some(captured) = undo.captured_piece {
        game_state.toggle_piece(
            mover.opposite(),
            captured,
            en_passant_capture_square(mv, mover),
        );
    }

    game_state.castling_rights = undo.prev_castling_rights;
    game_state.en_passant_square = undo.prev_en_passant_square;
    game_state.halfmove_clock = undo.prev_halfmove_clock;
    game_state.fullmove_number = undo.prev_fullmove_number;
    game_state.zobrist_key = undo.prev_zobrist_key;
    game_state.side_to_move = mover;
    game_state.ply = game_state.ply.saturating_sub(1);
    game_state.repetition_history.pop();

    Ok(())
}

/// Copy-make convenience for callers that keep the original state.
pub fn apply_move(game_state: &GameState, mv: ChessMove) -> ChessResult<GameState> {
    let mut next = game_state.clone();
    make_move(&mut next, mv)?;
    Ok(next)
}

/// Check that `mv` fits the board and return the piece it captures.
fn fitting_capture(game_state: &GameState, mv: ChessMove, mover: Color) -> ChessResult<Option<PieceKind>> {
    let reject = |reason: &str| Err(ChessError::InvalidMove(format!("{mv}: {reason}")));
    let moved_piece = mv.moved_piece();
    let enemy = mover.opposite();
    let own = game_state.occupancy_by_color[mover.index()];

    if game_state.piece_of_color_at(mover, mv.from()) != Some(moved_piece) {
        return reject("no piece of that kind for the side to move on the origin square");
    }
    if own & (1u64 << mv.to()) != 0 {
        return reject("destination holds a piece of the side to move");
    }

    if let Some((rook_from, _)) = castling_rook_squares(mv) {
        let king_start = match mover {
            Color::Light => LIGHT_KING_START,
            Color::Dark => DARK_KING_START,
        };
        if moved_piece != PieceKind::King || mv.from() != king_start {
            return reject("castling without the king on its start square");
        }
        if game_state.piece_of_color_at(mover, rook_from) != Some(PieceKind::Rook) {
            return reject("castling without a rook in the corner");
        }
        let (low, high) = (rook_from.min(king_start), rook_from.max(king_start));
        let between = ((1u64 << high) - 1) & !((1u64 << (low + 1)) - 1);
        if game_state.occupancy_all & between != 0 {
            return reject("castling through an occupied square");
        }
    }

    let captured_piece = if mv.is_en_passant() {
        if moved_piece != PieceKind::Pawn || game_state.occupancy_all & (1u64 << mv.to()) != 0 {
            return reject("en passant onto an occupied square");
        }
        match game_state.piece_of_color_at(enemy, en_passant_capture_square(mv, mover)) {
            Some(PieceKind::Pawn) => Some(PieceKind::Pawn),
            _ => return reject("en passant without an enemy pawn to take"),
        }
    } else {
        game_state.piece_of_color_at(enemy, mv.to())
    };

    if mv.is_capture() != captured_piece.is_some() {
        return reject("capture flag does not match the destination square");
    }
    if captured_piece == Some(PieceKind::King) {
        return reject("captures a king");
    }
    Ok(captured_piece)
}

/// Square of the piece removed by `mv`: the destination, except for en passant.
#[inline]
fn en_passant_capture_square(mv: ChessMove, mover: Color) -> Square {
    if !mv.is_en_passant() {
        return mv.to();
    }
    match mover {
        Color::Light => mv.to().wrapping_sub(8),
        Color::Dark => mv.to().wrapping_add(8),
    }
}

#[inline]
fn castling_rook_squares(mv: ChessMove) -> Option<(Square, Square)> {
    let to = mv.to();
    if mv.has_flag(FLAG_CASTLE_KINGSIDE) {
        Some((to + 1, to - 1))
    } else if mv.has_flag(FLAG_CASTLE_QUEENSIDE) {
        Some((to - 2, to + 1))
    } else {
        None
    }
}

fn update_castling_rights(
    game_state: &mut GameState,
    moving_color: Color,
    from: Square,
    to: Square,
    moved_piece: PieceKind,
) {
    if moved_piece == PieceKind::King {
        game_state.castling_rights &= match moving_color {
            Color::Light => !(CASTLE_LIGHT_KINGSIDE | CASTLE_LIGHT_QUEENSIDE),
            Color::Dark => !(CASTLE_DARK_KINGSIDE | CASTLE_DARK_QUEENSIDE),
        };
    }

    // Moving a rook off, or capturing on, an original rook square.
    for square in [from, to] {
        game_state.castling_rights &= match square {
            LIGHT_ROOK_QUEENSIDE_START => !CASTLE_LIGHT_QUEENSIDE,
            LIGHT_ROOK_KINGSIDE_START => !CASTLE_LIGHT_KINGSIDE,
            DARK_ROOK_QUEENSIDE_START => !CASTLE_DARK_QUEENSIDE,
            DARK_ROOK_KINGSIDE_START => !CASTLE_DARK_KINGSIDE,
            _ => CASTLE_ALL,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_move, make_move, unmake_move};
    use crate::errors::ChessError;
    use crate::game_state::chess_types::{Color, PieceKind, CASTLE_DARK_KINGSIDE, CASTLE_LIGHT_KINGSIDE};
    use crate::game_state::game_state::GameState;
    use crate::move_generation::legal_move_generator::legal_moves;
    use crate::moves::move_descriptions::{
        ChessMove, FLAG_CAPTURE, FLAG_CASTLE_KINGSIDE, FLAG_CASTLE_QUEENSIDE, FLAG_EN_PASSANT,
    };
    use crate::search::zobrist::compute_zobrist_key;
    use crate::utils::long_algebraic::long_algebraic_to_move;

    fn assert_every_move_round_trips(fen: &str) {
        let original = GameState::from_fen(fen).expect("FEN should parse");
        let mut game = original.clone();
        for mv in legal_moves(&original).expect("move generation should succeed") {
            let undo = make_move(&mut game, mv).expect("legal move should apply");
            assert_eq!(
                game.zobrist_key,
                compute_zobrist_key(&game),
                "incremental hash drifted after {mv}"
            );
            unmake_move(&mut game, undo).expect("unmake should succeed");
            assert_eq!(game, original, "state not restored after {mv}");
        }
    }

    #[test]
    fn make_unmake_is_exact_inverse() {
        assert_every_move_round_trips("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_every_move_round_trips(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        );
        assert_every_move_round_trips("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        assert_every_move_round_trips(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        );
    }

    #[test]
    fn en_passant_capture_removes_the_passed_pawn() {
        let game = GameState::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").expect("FEN should parse");
        let mv = long_algebraic_to_move("e5d6", &game).expect("en passant should be legal");
        assert!(mv.is_en_passant());
        let next = apply_move(&game, mv).expect("en passant should apply");
        assert_eq!(next.piece_at(35), None);
        assert_eq!(next.piece_at(43), Some((Color::Light, PieceKind::Pawn)));
        assert_eq!(next.halfmove_clock, 0);
    }

    #[test]
    fn castling_moves_rook_and_clears_rights() {
        let game = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 3 10").expect("FEN should parse");
        let mv = long_algebraic_to_move("e1g1", &game).expect("castling should be legal");
        let next = apply_move(&game, mv).expect("castling should apply");
        assert_eq!(next.piece_at(5), Some((Color::Light, PieceKind::Rook)));
        assert_eq!(next.piece_at(7), None);
        assert_eq!(next.castling_rights & CASTLE_LIGHT_KINGSIDE, 0);
        assert_ne!(next.castling_rights & CASTLE_DARK_KINGSIDE, 0);
        assert_eq!(next.halfmove_clock, 4);
    }

    #[test]
    fn double_push_always_sets_en_passant_square() {
        let game = GameState::new_game();
        let mv = long_algebraic_to_move("e2e4", &game).expect("e2e4 should be legal");
        let next = apply_move(&game, mv).expect("e2e4 should apply");
        assert_eq!(next.en_passant_square, Some(20));
        assert_eq!(next.side_to_move, Color::Dark);
        assert_eq!(next.repetition_history, vec![game.zobrist_key]);
    }

    #[test]
    fn rejects_move_for_wrong_position() {
        let mut game = GameState::new_game();
        let bogus = ChessMove::quiet(28, 36, PieceKind::Pawn);
        let before = game.clone();
        assert!(make_move(&mut game, bogus).is_err());
        assert_eq!(game, before);
    }

    fn assert_rejected_untouched(fen: &str, mv: ChessMove) {
        let mut game = GameState::from_fen(fen).expect("FEN should parse");
        let before = game.clone();
        assert!(
            matches!(make_move(&mut game, mv), Err(ChessError::InvalidMove(_))),
            "{mv} should be rejected in {fen}"
        );
        assert_eq!(game, before, "{mv} mutated the state");
        game.validate().expect("state should stay consistent");
    }

    #[test]
    fn rejects_quiet_move_onto_own_piece() {
        let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert_rejected_untouched(start, ChessMove::quiet(6, 12, PieceKind::Knight));
        assert_rejected_untouched(start, ChessMove::quiet(3, 11, PieceKind::Queen));
    }

    #[test]
    fn rejects_castling_that_does_not_fit_the_board() {
        // King already off its start square.
        assert_rejected_untouched(
            "4k3/8/8/8/8/8/8/R4K1R w - - 0 1",
            ChessMove::new(5, 6, PieceKind::King, None, FLAG_CASTLE_KINGSIDE),
        );
        // No rook in the corner.
        assert_rejected_untouched(
            "4k3/8/8/8/8/8/8/R3K3 w - - 0 1",
            ChessMove::new(4, 6, PieceKind::King, None, FLAG_CASTLE_KINGSIDE),
        );
        // Knight still on b1.
        assert_rejected_untouched(
            "4k3/8/8/8/8/8/8/RN2K3 w - - 0 1",
            ChessMove::new(4, 2, PieceKind::King, None, FLAG_CASTLE_QUEENSIDE),
        );
    }

    #[test]
    fn rejects_en_passant_without_a_pawn_to_take() {
        assert_rejected_untouched(
            "4k3/8/8/4P3/8/8/8/4K3 w - - 0 1",
            ChessMove::new(36, 43, PieceKind::Pawn, None, FLAG_CAPTURE | FLAG_EN_PASSANT),
        );
        assert_rejected_untouched(
            "4k3/8/3n4/3pP3/8/8/8/4K3 w - - 0 1",
            ChessMove::new(36, 43, PieceKind::Pawn, None, FLAG_CAPTURE | FLAG_EN_PASSANT),
        );
    }
}
