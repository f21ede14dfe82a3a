//! Crate root module declarations for the timed chess search core.
//!
//! Exposes the position model, legal move generation, evaluation, the
//! deadline-driven search controller and the `Engine` facade so the loader
//! binary, benches and tests share stable module paths.

pub mod errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_state;
    pub mod undo_state;
}

pub mod moves {
    pub mod leaper_attacks;
    pub mod move_descriptions;
    pub mod slider_attacks;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod legal_moves_king;
    pub mod legal_moves_pawn;
    pub mod legal_moves_pieces;
    pub mod perft;
}

pub mod search {
    pub mod board_scoring;
    pub mod iterative_deepening;
    pub mod move_ordering;
    pub mod time_management;
    pub mod transposition_table;
    pub mod zobrist;
}

pub mod engines {
    pub mod engine;
    pub mod self_play;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod pgn;
    pub mod render_game_state;
}

pub use engines::engine::{new_engine, new_game, Engine, EngineConfig};
pub use errors::{ChessError, ChessResult};
pub use game_state::game_state::GameState;
pub use moves::move_descriptions::ChessMove;
pub use search::iterative_deepening::{SearchLimits, SearchResult};
