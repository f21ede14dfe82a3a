//! Move-path enumeration for validating the generator.

use crate::errors::ChessResult;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_apply::{make_move, unmake_move};
use crate::move_generation::legal_move_generator::generate_legal_moves_in_place;
use crate::moves::move_descriptions::ChessMove;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

/// Leaf-node count at `depth`, without per-move statistics.
pub fn perft(game_state: &GameState, depth: u8) -> ChessResult<u64> {
    let mut scratch = game_state.clone();
    perft_nodes(&mut scratch, depth)
}

/// Leaf counts with capture, castle, promotion and check breakdown.
pub fn perft_detailed(game_state: &GameState, depth: u8) -> ChessResult<PerftCounts> {
    if depth == 0 {
        return Ok(PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        });
    }

    let mut scratch = game_state.clone();
    let mut total = PerftCounts::default();
    perft_recurse(&mut scratch, depth, &mut total)?;
    Ok(total)
}

/// Per-root-move node counts, in generation order.
pub fn perft_divide(game_state: &GameState, depth: u8) -> ChessResult<Vec<(ChessMove, u64)>> {
    let mut scratch = game_state.clone();
    let mut moves = Vec::with_capacity(64);
    generate_legal_moves_in_place(&mut scratch, &mut moves)?;

    let mut divide = Vec::with_capacity(moves.len());
    for mv in moves {
        let undo = make_move(&mut scratch, mv)?;
        let nodes = perft_nodes(&mut scratch, depth.saturating_sub(1))?;
        unmake_move(&mut scratch, undo)?;
        divide.push((mv, nodes));
    }
    Ok(divide)
}

fn perft_nodes(game_state: &mut GameState, depth: u8) -> ChessResult<u64> {
    if depth == 0 {
        return Ok(1);
    }

    let mut moves = Vec::with_capacity(64);
    generate_legal_moves_in_place(game_state, &mut moves)?;
    if depth == 1 {
        return Ok(moves.len() as u64);
    }

    let mut nodes = 0u64;
    for mv in moves {
        let undo = make_move(game_state, mv)?;
        nodes += perft_nodes(game_state, depth - 1)?;
        unmake_move(game_state, undo)?;
    }
    Ok(nodes)
}

fn perft_recurse(game_state: &mut GameState, depth: u8, counts: &mut PerftCounts) -> ChessResult<()> {
    let mut moves = Vec::with_capacity(64);
    generate_legal_moves_in_place(game_state, &mut moves)?;

    for mv in moves {
        let undo = make_move(game_state, mv)?;
        if depth == 1 {
            counts.merge(leaf_counts(game_state, mv)?);
        } else {
            perft_recurse(game_state, depth - 1, counts)?;
        }
        unmake_move(game_state, undo)?;
    }

    Ok(())
}

fn leaf_counts(after_move: &mut GameState, mv: ChessMove) -> ChessResult<PerftCounts> {
    let mut counts = PerftCounts {
        nodes: 1,
        captures: u64::from(mv.is_capture()),
        en_passant: u64::from(mv.is_en_passant()),
        castles: u64::from(mv.is_castle()),
        promotions: u64::from(mv.promotion().is_some()),
        ..PerftCounts::default()
    };

    if after_move.is_in_check() {
        counts.checks = 1;
        let mut replies = Vec::with_capacity(32);
        generate_legal_moves_in_place(after_move, &mut replies)?;
        counts.checkmates = u64::from(replies.is_empty());
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::{perft, perft_detailed, perft_divide, PerftCounts};
    use crate::game_state::game_state::GameState;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

    fn nodes(fen: &str, depth: u8) -> u64 {
        let game = GameState::from_fen(fen).expect("FEN should parse");
        perft(&game, depth).expect("perft should succeed")
    }

    #[test]
    fn start_position_node_counts() {
        let game = GameState::new_game();
        assert_eq!(perft(&game, 0).expect("perft"), 1);
        assert_eq!(perft(&game, 1).expect("perft"), 20);
        assert_eq!(perft(&game, 2).expect("perft"), 400);
        assert_eq!(perft(&game, 3).expect("perft"), 8_902);
    }

    #[test]
    fn start_position_depth_three_breakdown() {
        let counts = perft_detailed(&GameState::new_game(), 3).expect("perft should succeed");
        assert_eq!(
            counts,
            PerftCounts {
                nodes: 8_902,
                captures: 34,
                checks: 12,
                ..PerftCounts::default()
            }
        );
    }

    #[test]
    fn kiwipete_node_counts() {
        assert_eq!(nodes(KIWIPETE, 1), 48);
        assert_eq!(nodes(KIWIPETE, 2), 2_039);

        let game = GameState::from_fen(KIWIPETE).expect("FEN should parse");
        let counts = perft_detailed(&game, 2).expect("perft should succeed");
        assert_eq!(counts.captures, 351);
        assert_eq!(counts.en_passant, 1);
        assert_eq!(counts.castles, 91);
        assert_eq!(counts.checks, 3);
    }

    #[test]
    fn endgame_position_node_counts() {
        assert_eq!(nodes(POSITION_3, 1), 14);
        assert_eq!(nodes(POSITION_3, 2), 191);
        assert_eq!(nodes(POSITION_3, 3), 2_812);
    }

    #[test]
    fn promotion_heavy_position_node_counts() {
        assert_eq!(nodes(POSITION_4, 1), 6);
        assert_eq!(nodes(POSITION_4, 2), 264);

        let game = GameState::from_fen(POSITION_4).expect("FEN should parse");
        let counts = perft_detailed(&game, 3).expect("perft should succeed");
        assert_eq!(counts.nodes, 9_467);
        assert_eq!(counts.promotions, 120);
        assert_eq!(counts.checkmates, 22);
    }

    #[test]
    fn position_five_node_counts() {
        assert_eq!(nodes(POSITION_5, 1), 44);
        assert_eq!(nodes(POSITION_5, 2), 1_486);
    }

    #[test]
    fn divide_sums_to_perft() {
        let game = GameState::from_fen(KIWIPETE).expect("FEN should parse");
        let divide = perft_divide(&game, 2).expect("divide should succeed");
        assert_eq!(divide.len(), 48);
        assert_eq!(divide.iter().map(|(_, n)| n).sum::<u64>(), 2_039);
    }
}
