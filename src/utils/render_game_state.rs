//! Terminal-oriented Unicode board renderer.

use crate::game_state::{chess_types::*, game_state::GameState};

/// Render the board with file/rank labels, light pieces at the bottom.
pub fn render_game_state(game_state: &GameState) -> String {
    let mut out = String::with_capacity(256);

    out.push_str("  a b c d e f g h\n");

    for rank in (0..8u8).rev() {
        let label = char::from(b'1' + rank);
        out.push(label);

        for file in 0..8u8 {
            out.push(' ');
            out.push(
                game_state
                    .piece_at(rank * 8 + file)
                    .map_or('·', |(color, piece)| piece_to_unicode(color, piece)),
            );
        }

        out.push(' ');
        out.push(label);
        out.push('\n');
    }

    out.push_str("  a b c d e f g h");
    out
}

/// Board plus a status line with side to move and FEN.
pub fn render_with_status(game_state: &GameState) -> String {
    let side = match game_state.side_to_move {
        Color::Light => "white",
        Color::Dark => "black",
    };
    format!(
        "{}\n{} to move{}\n{}",
        render_game_state(game_state),
        side,
        if game_state.is_in_check() { " (check)" } else { "" },
        game_state.get_fen()
    )
}

fn piece_to_unicode(color: Color, piece: PieceKind) -> char {
    match (color, piece) {
        (Color::Light, PieceKind::Pawn) => '♙',
        (Color::Light, PieceKind::Knight) => '♘',
        (Color::Light, PieceKind::Bishop) => '♗',
        (Color::Light, PieceKind::Rook) => '♖',
        (Color::Light, PieceKind::Queen) => '♕',
        (Color::Light, PieceKind::King) => '♔',
        (Color::Dark, PieceKind::Pawn) => '♟',
        (Color::Dark, PieceKind::Knight) => '♞',
        (Color::Dark, PieceKind::Bishop) => '♝',
        (Color::Dark, PieceKind::Rook) => '♜',
        (Color::Dark, PieceKind::Queen) => '♛',
        (Color::Dark, PieceKind::King) => '♚',
    }
}
