//! PGN export for finished or interrupted games.
//!
//! Movetext is written in long algebraic form. Headers follow the seven-tag
//! roster order, with `SetUp`/`FEN` added for non-standard starts.

use chrono::NaiveDate;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::chess_types::Color;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_apply::make_move;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::moves::move_descriptions::ChessMove;

const MOVETEXT_LINE_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnHeaders {
    pub event: String,
    pub site: String,
    pub date: Option<NaiveDate>,
    pub round: String,
    pub white: String,
    pub black: String,
    pub result: String,
    pub termination: Option<String>,
}

impl Default for PgnHeaders {
    fn default() -> Self {
        Self {
            event: "Timed Chess Game".to_owned(),
            site: "Local".to_owned(),
            date: None,
            round: "-".to_owned(),
            white: "White".to_owned(),
            black: "Black".to_owned(),
            result: "*".to_owned(),
            termination: None,
        }
    }
}

/// Render headers and movetext. Each move is checked for legality while
/// replaying from `initial_state`.
pub fn write_pgn(
    initial_state: &GameState,
    move_history: &[ChessMove],
    headers: &PgnHeaders,
) -> ChessResult<String> {
    let result = normalize_result(&headers.result);
    let date = headers
        .date
        .map_or_else(|| "????.??.??".to_owned(), |d| d.format("%Y.%m.%d").to_string());

    let mut tags = vec![
        ("Event", headers.event.clone()),
        ("Site", headers.site.clone()),
        ("Date", date),
        ("Round", headers.round.clone()),
        ("White", headers.white.clone()),
        ("Black", headers.black.clone()),
        ("Result", result.to_owned()),
    ];
    let initial_fen = initial_state.get_fen();
    if initial_fen != STARTING_POSITION_FEN {
        tags.push(("SetUp", "1".to_owned()));
        tags.push(("FEN", initial_fen));
    }
    if let Some(termination) = &headers.termination {
        tags.push(("Termination", termination.clone()));
    }

    let mut out = String::new();
    for (key, value) in tags {
        out.push_str(&format!("[{key} \"{}\"]\n", escape_pgn_value(&value)));
    }
    out.push('\n');

    let mut state = initial_state.clone();
    let mut tokens = Vec::with_capacity(move_history.len() + move_history.len() / 2 + 2);
    for (index, &mv) in move_history.iter().enumerate() {
        if !legal_moves(&state)?.contains(&mv) {
            return Err(ChessError::InvalidMove(format!(
                "{mv} at ply {} is not legal in {}",
                index + 1,
                state.get_fen()
            )));
        }
        let number = state.fullmove_number;
        match state.side_to_move {
            Color::Light => tokens.push(format!("{number}.")),
            Color::Dark if index == 0 => tokens.push(format!("{number}...")),
            Color::Dark => {}
        }
        tokens.push(mv.to_long_algebraic());
        make_move(&mut state, mv)?;
    }
    tokens.push(result.to_owned());

    out.push_str(&wrap_movetext(&tokens));
    out.push('\n');
    Ok(out)
}

fn wrap_movetext(tokens: &[String]) -> String {
    let mut out = String::new();
    let mut line_len = 0usize;
    for token in tokens {
        if line_len > 0 && line_len + 1 + token.len() > MOVETEXT_LINE_WIDTH {
            out.push('\n');
            line_len = 0;
        } else if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(token);
        line_len += token.len();
    }
    out
}

#[inline]
pub fn normalize_result(result: &str) -> &'static str {
    match result.trim() {
        "1-0" => "1-0",
        "0-1" => "0-1",
        "1/2-1/2" => "1/2-1/2",
        _ => "*",
    }
}

fn escape_pgn_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
