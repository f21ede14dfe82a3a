//! Iterative deepening search with negamax alpha-beta pruning.
//!
//! Each iteration runs a complete alpha-beta pass at one more ply than the
//! last. The deadline is polled every `NODE_POLL_INTERVAL` nodes, between root
//! moves and between iterations; an iteration cut short by the deadline is
//! discarded and the result of the last completed one is returned.
//!
//! Heuristics:
//! - Transposition table probe/store with mate scores stored node-relative.
//! - Quiescence search over captures and promotions with stand-pat.
//! - One-ply check extension (an extended child cannot extend again).
//! - Repetition inside the search tree scores as a draw.
//! - Aspiration windows around the previous score from depth 3.
//! - PV/TT/MVV-LVA/killer/history move ordering.
//!
//! Iterations up to `SearchLimits::min_depth` run to completion whatever the
//! deadline says, so a legal move is always produced. Past the deadline their
//! quiescence stands pat, so only the full-width part of a protected
//! iteration adds to the overshoot, plus one poll interval of node
//! expansions. A zero budget always protects depth 1.

use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::errors::ChessResult;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_apply::{make_move, unmake_move};
use crate::move_generation::legal_move_generator::{
    generate_legal_moves_in_place, generate_legal_tactical_moves_in_place, legal_moves,
};
use crate::moves::move_descriptions::ChessMove;
use crate::search::board_scoring::{
    clamp_eval, is_mate_score, mate_distance, mate_in, BoardScorer, DRAW_SCORE, MATE_SCORE,
};
use crate::search::move_ordering::{MoveOrdering, MAX_PLY};
use crate::search::time_management::{SearchDeadline, NODE_POLL_INTERVAL};
use crate::search::transposition_table::{
    score_for_storage, score_from_storage, Bound, TTEntry, TranspositionTable,
};

const INFINITY: i32 = MATE_SCORE + 1;
const QUIESCENCE_MAX_PLY: u8 = 10;
const ASPIRATION_MIN_DEPTH: u8 = 3;
const ASPIRATION_MAX_ATTEMPTS: u8 = 8;

/// Depth and node caps for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: u8,
    /// Iterations up to this depth ignore the deadline.
    pub min_depth: u8,
    pub max_nodes: Option<u64>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            min_depth: 1,
            max_nodes: None,
        }
    }
}

impl SearchLimits {
    pub fn depth(max_depth: u8) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    #[inline]
    fn normalized(self) -> Self {
        let max_depth = self.max_depth.clamp(1, (MAX_PLY / 2) as u8);
        Self {
            max_depth,
            min_depth: self.min_depth.min(max_depth),
            max_nodes: self.max_nodes.filter(|n| *n > 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` only when the root has no legal moves.
    pub best_move: Option<ChessMove>,
    /// Side-to-move perspective, centipawns or mate band.
    pub score: i32,
    /// Deepest fully completed iteration. Zero for terminal roots and for a
    /// partial depth-1 fallback.
    pub reached_depth: u8,
    pub nodes: u64,
    pub elapsed: Duration,
    pub principal_variation: Vec<ChessMove>,
    /// The deadline or node cap ended the search before `max_depth`.
    pub timed_out: bool,
}

impl SearchResult {
    #[inline]
    pub fn chess_move(&self) -> Option<ChessMove> {
        self.best_move
    }

    /// Full moves to mate, positive when the side to move delivers it.
    #[inline]
    pub fn mate_in(&self) -> Option<i32> {
        mate_distance(self.score)
    }
}

struct RootOutcome {
    best_move: Option<ChessMove>,
    score: i32,
    completed: bool,
}

struct Searcher<'a, S: BoardScorer + ?Sized> {
    scorer: &'a S,
    tt: &'a mut TranspositionTable,
    ordering: &'a mut MoveOrdering,
    deadline: SearchDeadline,
    max_nodes: Option<u64>,
    enforce_deadline: bool,
    nodes: u64,
    next_poll: u64,
    stopped: bool,
    past_deadline: bool,
    root_history_len: usize,
}

/// Search `game_state` for at most `budget` (subject to the protected
/// `min_depth` iterations) and return the best move found.
pub fn iterative_deepening_search<S: BoardScorer + ?Sized>(
    game_state: &GameState,
    scorer: &S,
    tt: &mut TranspositionTable,
    ordering: &mut MoveOrdering,
    budget: Duration,
    limits: SearchLimits,
) -> ChessResult<SearchResult> {
    let deadline = SearchDeadline::from_now(budget);
    let mut limits = limits.normalized();
    if budget.is_zero() {
        limits.min_depth = limits.min_depth.max(1);
    }
    game_state.validate()?;

    let mut root = game_state.clone();
    let mut root_moves = Vec::with_capacity(64);
    generate_legal_moves_in_place(&mut root, &mut root_moves)?;

    if root_moves.is_empty() {
        let score = if root.is_in_check() {
            -MATE_SCORE
        } else {
            DRAW_SCORE
        };
        info!(score, "root has no legal moves");
        return Ok(SearchResult {
            best_move: None,
            score,
            reached_depth: 0,
            nodes: 0,
            elapsed: deadline.elapsed(),
            principal_variation: Vec::new(),
            timed_out: false,
        });
    }

    tt.new_generation();
    ordering.begin_search();

    let mut searcher = Searcher {
        scorer,
        tt,
        ordering,
        deadline,
        max_nodes: limits.max_nodes,
        enforce_deadline: false,
        nodes: 0,
        next_poll: NODE_POLL_INTERVAL,
        stopped: false,
        past_deadline: false,
        root_history_len: root.repetition_history.len(),
    };

    let tt_move = searcher.tt.probe(root.zobrist_key).and_then(|e| e.best_move);
    searcher
        .ordering
        .order_moves(&root, &mut root_moves, None, tt_move, 0);

    let mut completed: Option<(ChessMove, i32, u8)> = None;
    let mut partial: Option<(ChessMove, i32)> = None;
    let mut timed_out = false;
    let mut prev_score = 0i32;

    for depth in 1..=limits.max_depth {
        searcher.enforce_deadline = depth > limits.min_depth;
        // Depth 1 always starts, so its first root move is searched.
        if depth > 1 && searcher.poll_now() {
            timed_out = true;
            break;
        }

        let outcome = searcher.search_root_with_aspiration(&mut root, &mut root_moves, depth, prev_score)?;

        let Some(best_move) = outcome.best_move.filter(|_| outcome.completed) else {
            timed_out = true;
            if completed.is_none() {
                partial = outcome.best_move.map(|mv| (mv, outcome.score));
            }
            break;
        };

        completed = Some((best_move, outcome.score, depth));
        prev_score = outcome.score;
        promote_to_front(&mut root_moves, best_move);

        debug!(
            depth,
            score = outcome.score,
            nodes = searcher.nodes,
            best = %best_move,
            "iteration complete"
        );

        // A mate proven inside the full-width horizon cannot improve.
        if is_mate_score(outcome.score) && MATE_SCORE - outcome.score.abs() <= i32::from(depth) {
            break;
        }
    }

    let (best_move, score, reached_depth) = match (completed, partial) {
        (Some((mv, score, depth)), _) => (mv, score, depth),
        (None, Some((mv, score))) => {
            warn!(best = %mv, "deadline hit during depth 1, using partial result");
            (mv, score, 0)
        }
        (None, None) => {
            let mv = root_moves[0];
            warn!(best = %mv, "no search completed, using first ordered move");
            (mv, clamp_eval(scorer.score(&root)), 0)
        }
    };

    let principal_variation =
        principal_variation_from_tt(&root, searcher.tt, best_move, reached_depth.max(1))?;
    let nodes = searcher.nodes;
    let elapsed = deadline.elapsed();
    let tt_stats = searcher.tt.stats();

    info!(
        best = %best_move,
        score,
        depth = reached_depth,
        nodes,
        elapsed_us = elapsed.as_micros() as u64,
        timed_out,
        tt_probes = tt_stats.probes,
        tt_hits = tt_stats.hits,
        "search finished"
    );

    Ok(SearchResult {
        best_move: Some(best_move),
        score,
        reached_depth,
        nodes,
        elapsed,
        principal_variation,
        timed_out,
    })
}

impl<S: BoardScorer + ?Sized> Searcher<'_, S> {
    /// Node-driven stop check: node cap every call, clock every poll interval.
    #[inline]
    fn should_abort(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if self.max_nodes.is_some_and(|cap| self.nodes >= cap) {
            self.stopped = true;
        } else if self.enforce_deadline && self.nodes >= self.next_poll {
            self.next_poll = self.nodes + NODE_POLL_INTERVAL;
            self.stopped = self.deadline.is_expired();
        }
        self.stopped
    }

    /// Deadline check for the protected iterations, which must finish. Once it
    /// fires, quiescence stands pat instead of searching captures.
    #[inline]
    fn protected_time_up(&mut self) -> bool {
        if self.enforce_deadline {
            return false;
        }
        if !self.past_deadline && self.nodes >= self.next_poll {
            self.next_poll = self.nodes + NODE_POLL_INTERVAL;
            self.past_deadline = self.deadline.is_expired();
        }
        self.past_deadline
    }

    /// Unconditional stop check used at root and iteration boundaries.
    #[inline]
    fn poll_now(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if self.max_nodes.is_some_and(|cap| self.nodes >= cap)
            || (self.enforce_deadline && self.deadline.is_expired())
        {
            self.stopped = true;
        }
        self.stopped
    }

    fn search_root_with_aspiration(
        &mut self,
        root: &mut GameState,
        root_moves: &mut [ChessMove],
        depth: u8,
        prev_score: i32,
    ) -> ChessResult<RootOutcome> {
        if depth < ASPIRATION_MIN_DEPTH || is_mate_score(prev_score) {
            return self.search_root(root, root_moves, depth, -INFINITY, INFINITY);
        }

        let mut window = aspiration_initial_window(depth);
        let mut alpha = (prev_score - window).max(-INFINITY);
        let mut beta = (prev_score + window).min(INFINITY);

        for attempt in 1..=ASPIRATION_MAX_ATTEMPTS {
            let outcome = self.search_root(root, root_moves, depth, alpha, beta)?;
            if !outcome.completed {
                return Ok(outcome);
            }

            let full_window = alpha <= -INFINITY && beta >= INFINITY;
            if full_window || (outcome.score > alpha && outcome.score < beta) {
                return Ok(outcome);
            }

            trace!(depth, attempt, alpha, beta, score = outcome.score, "aspiration re-search");
            window = (window * 2).min(MATE_SCORE / 2);
            if outcome.score <= alpha {
                alpha = (outcome.score - window).max(-INFINITY);
            } else {
                beta = (outcome.score + window).min(INFINITY);
            }
        }

        self.search_root(root, root_moves, depth, -INFINITY, INFINITY)
    }

    fn search_root(
        &mut self,
        root: &mut GameState,
        root_moves: &[ChessMove],
        depth: u8,
        mut alpha: i32,
        beta: i32,
    ) -> ChessResult<RootOutcome> {
        let alpha_orig = alpha;
        let mut best_move = None;
        let mut best_score = -INFINITY;

        for (index, &mv) in root_moves.iter().enumerate() {
            if index > 0 && self.poll_now() {
                return Ok(RootOutcome {
                    best_move,
                    score: best_score,
                    completed: false,
                });
            }

            let undo = make_move(root, mv)?;
            let child_depth = depth - 1 + u8::from(root.is_in_check());
            let score = self.negamax(root, child_depth, -beta, -alpha, 1, !root.is_in_check());
            unmake_move(root, undo)?;

            let Some(score) = score? else {
                return Ok(RootOutcome {
                    best_move,
                    score: best_score,
                    completed: false,
                });
            };
            let score = -score;

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        self.tt.store(TTEntry {
            key: root.zobrist_key,
            depth,
            score: score_for_storage(best_score, 0),
            bound: bound_for(best_score, alpha_orig, beta),
            best_move,
        });

        Ok(RootOutcome {
            best_move,
            score: best_score,
            completed: true,
        })
    }

    fn negamax(
        &mut self,
        game_state: &mut GameState,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        ply: u8,
        allow_check_extension: bool,
    ) -> ChessResult<Option<i32>> {
        if self.should_abort() {
            return Ok(None);
        }

        if game_state.is_repetition_draw(self.root_history_len)
            || game_state.has_insufficient_material()
        {
            return Ok(Some(DRAW_SCORE));
        }

        if usize::from(ply) >= MAX_PLY - 1 {
            return Ok(Some(clamp_eval(self.scorer.score(game_state))));
        }

        // Mate distance pruning.
        alpha = alpha.max(-mate_in(ply));
        beta = beta.min(mate_in(ply + 1));
        if alpha >= beta {
            return Ok(Some(alpha));
        }

        let alpha_orig = alpha;
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(game_state.zobrist_key) {
            tt_move = entry.best_move;
            let tt_score = score_from_storage(entry.score, ply);
            if entry.depth >= depth {
                match entry.bound {
                    Bound::Exact => return Ok(Some(tt_score)),
                    Bound::Lower if tt_score >= beta => return Ok(Some(tt_score)),
                    Bound::Upper if tt_score <= alpha => return Ok(Some(tt_score)),
                    _ => {}
                }
            }
        }

        if depth == 0 {
            return self.quiescence(game_state, alpha, beta, ply, 0);
        }

        self.nodes += 1;

        let mut moves = Vec::with_capacity(64);
        generate_legal_moves_in_place(game_state, &mut moves)?;
        if moves.is_empty() {
            return Ok(Some(terminal_score(game_state, ply)));
        }
        if game_state.is_fifty_move_draw() {
            return Ok(Some(DRAW_SCORE));
        }

        let ply_idx = usize::from(ply);
        self.ordering
            .order_moves(game_state, &mut moves, None, tt_move, ply_idx);

        let side = game_state.side_to_move;
        let mut best = -INFINITY;
        let mut best_move = None;

        for mv in moves {
            let undo = make_move(game_state, mv)?;
            let extend = allow_check_extension && game_state.is_in_check();
            let child_depth = depth - 1 + u8::from(extend);
            let score = self.negamax(
                game_state,
                child_depth,
                -beta,
                -alpha,
                ply + 1,
                !extend,
            );
            unmake_move(game_state, undo)?;

            let Some(score) = score? else {
                return Ok(None);
            };
            let score = -score;

            if score > best {
                best = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                if !mv.is_tactical() {
                    self.ordering.record_cutoff(side, mv, ply_idx, depth);
                }
                trace!(ply, depth, mv = %mv, score, "beta cutoff");
                break;
            }
        }

        self.tt.store(TTEntry {
            key: game_state.zobrist_key,
            depth,
            score: score_for_storage(best, ply),
            bound: bound_for(best, alpha_orig, beta),
            best_move,
        });

        Ok(Some(best))
    }

    fn quiescence(
        &mut self,
        game_state: &mut GameState,
        mut alpha: i32,
        beta: i32,
        ply: u8,
        qply: u8,
    ) -> ChessResult<Option<i32>> {
        if self.should_abort() {
            return Ok(None);
        }
        if self.protected_time_up() {
            return Ok(Some(clamp_eval(self.scorer.score(game_state))));
        }
        self.nodes += 1;

        let in_check = game_state.is_in_check();
        let mut moves = Vec::with_capacity(32);
        if in_check {
            if usize::from(ply) >= MAX_PLY - 1 {
                return Ok(Some(clamp_eval(self.scorer.score(game_state))));
            }
            generate_legal_moves_in_place(game_state, &mut moves)?;
            if moves.is_empty() {
                return Ok(Some(-mate_in(ply)));
            }
        } else {
            // Stand pat: the side to move may decline every capture.
            let stand_pat = clamp_eval(self.scorer.score(game_state));
            if stand_pat >= beta {
                return Ok(Some(stand_pat));
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
            if qply >= QUIESCENCE_MAX_PLY || usize::from(ply) >= MAX_PLY - 1 {
                return Ok(Some(alpha));
            }
            generate_legal_tactical_moves_in_place(game_state, &mut moves)?;
        }

        self.ordering
            .order_moves(game_state, &mut moves, None, None, usize::from(ply));

        let mut best = if in_check { -INFINITY } else { alpha };
        for mv in moves {
            let undo = make_move(game_state, mv)?;
            let score = self.quiescence(game_state, -beta, -alpha, ply + 1, qply + 1);
            unmake_move(game_state, undo)?;

            let Some(score) = score? else {
                return Ok(None);
            };
            let score = -score;

            if score >= beta {
                return Ok(Some(score));
            }
            if score > best {
                best = score;
            }
            if score > alpha {
                alpha = score;
            }
        }

        Ok(Some(best))
    }
}

#[inline]
fn aspiration_initial_window(depth: u8) -> i32 {
    25 + i32::from(depth) * 10
}

#[inline]
fn bound_for(score: i32, alpha_orig: i32, beta: i32) -> Bound {
    if score <= alpha_orig {
        Bound::Upper
    } else if score >= beta {
        Bound::Lower
    } else {
        Bound::Exact
    }
}

#[inline]
fn terminal_score(game_state: &GameState, ply: u8) -> i32 {
    if game_state.is_in_check() {
        -mate_in(ply)
    } else {
        DRAW_SCORE
    }
}

fn promote_to_front(moves: &mut [ChessMove], mv: ChessMove) {
    if let Some(pos) = moves.iter().position(|m| *m == mv) {
        moves[..=pos].rotate_right(1);
    }
}

/// Follow TT best moves from the position after `best_move`, validating each
/// against the legal move list. Stops at the first miss or repeated position.
pub fn principal_variation_from_tt(
    game_state: &GameState,
    tt: &mut TranspositionTable,
    best_move: ChessMove,
    max_len: u8,
) -> ChessResult<Vec<ChessMove>> {
    let mut pv = vec![best_move];
    let mut state = game_state.clone();
    make_move(&mut state, best_move)?;
    let mut seen = vec![game_state.zobrist_key, state.zobrist_key];

    while pv.len() < usize::from(max_len) {
        let Some(mv) = tt.probe(state.zobrist_key).and_then(|e| e.best_move) else {
            break;
        };
        if !legal_moves(&state)?.contains(&mv) {
            break;
        }
        make_move(&mut state, mv)?;
        if seen.contains(&state.zobrist_key) {
            break;
        }
        seen.push(state.zobrist_key);
        pv.push(mv);
    }

    Ok(pv)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{iterative_deepening_search, SearchLimits, SearchResult};
    use crate::game_state::game_state::GameState;
    use crate::move_generation::legal_move_apply::apply_move;
    use crate::move_generation::legal_move_generator::legal_moves;
    use crate::moves::move_descriptions::ChessMove;
    use crate::search::board_scoring::{
        BoardScorer, MaterialScorer, StandardScorer, DRAW_SCORE, MATE_SCORE, MATE_THRESHOLD,
    };
    use crate::search::move_ordering::MoveOrdering;
    use crate::search::time_management::DEADLINE_OVERSHOOT_MARGIN;
    use crate::search::transposition_table::TranspositionTable;

    fn run<S: BoardScorer>(
        fen: &str,
        scorer: &S,
        budget: Duration,
        limits: SearchLimits,
    ) -> (GameState, SearchResult) {
        let game = GameState::from_fen(fen).expect("FEN should parse");
        let mut tt = TranspositionTable::new_with_mb(1);
        let mut ordering = MoveOrdering::new();
        let result = iterative_deepening_search(&game, scorer, &mut tt, &mut ordering, budget, limits)
            .expect("search should run");
        (game, result)
    }

    fn assert_legal(game: &GameState, result: &SearchResult) {
        let mv = result.chess_move().expect("a move should be returned");
        assert!(
            legal_moves(game).expect("generation").contains(&mv),
            "{mv} is not legal"
        );
    }

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const GENEROUS: Duration = Duration::from_secs(60);

    #[test]
    fn search_prefers_winning_capture_in_simple_position() {
        let (game, result) = run(
            "4k3/8/8/8/8/8/4q3/4KQ2 w - - 0 1",
            &MaterialScorer,
            GENEROUS,
            SearchLimits::depth(3),
        );
        assert_legal(&game, &result);
        let mv = result.chess_move().expect("move");
        assert_eq!(mv.to(), 12, "should capture the queen on e2, got {mv}");
        assert_eq!(result.reached_depth, 3);
        assert!(!result.timed_out);
    }

    #[test]
    fn search_finds_mate_in_one() {
        let (game, result) = run(
            "7k/8/6K1/8/8/8/8/5Q2 w - - 0 1",
            &StandardScorer,
            GENEROUS,
            SearchLimits::default(),
        );
        let mv = result.chess_move().expect("move");
        let next = apply_move(&game, mv).expect("best move should apply");
        assert!(legal_moves(&next).expect("generation").is_empty());
        assert!(next.is_in_check(), "best move should deliver checkmate");
        assert_eq!(result.score, MATE_SCORE - 1);
        assert_eq!(result.mate_in(), Some(1));
        // Proven mate ends the deepening loop long before the depth cap.
        assert!(result.reached_depth < 64);
        assert!(!result.timed_out);
    }

    #[test]
    fn search_finds_back_rank_mate() {
        let (_, result) = run(
            "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1",
            &StandardScorer,
            GENEROUS,
            SearchLimits::depth(4),
        );
        assert_eq!(result.chess_move().map(|m| m.to_string()), Some("a1a8".to_owned()));
        assert!(result.score >= MATE_THRESHOLD);
    }

    #[test]
    fn terminal_roots_report_no_move() {
        let (_, mated) = run(
            "R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1",
            &StandardScorer,
            GENEROUS,
            SearchLimits::default(),
        );
        assert_eq!(mated.chess_move(), None);
        assert_eq!(mated.score, -MATE_SCORE);

        let (_, stalemate) = run(
            "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1",
            &StandardScorer,
            GENEROUS,
            SearchLimits::default(),
        );
        assert_eq!(stalemate.chess_move(), None);
        assert_eq!(stalemate.score, DRAW_SCORE);
    }

    #[test]
    fn zero_budget_still_completes_depth_one() {
        let (game, result) = run(START, &StandardScorer, Duration::ZERO, SearchLimits::default());
        assert_legal(&game, &result);
        assert_eq!(result.reached_depth, 1);
        assert!(result.timed_out);
    }

    #[test]
    fn zero_budget_searches_depth_one_even_without_protected_depth() {
        let limits = SearchLimits {
            min_depth: 0,
            ..SearchLimits::default()
        };
        let (game, result) = run(START, &StandardScorer, Duration::ZERO, limits);
        assert_legal(&game, &result);
        assert_eq!(result.reached_depth, 1);
        assert!(result.nodes >= 20, "every root move should be searched");
        assert!(result.timed_out);
    }

    #[test]
    fn tiny_budget_without_protected_depth_keeps_partial_depth_one() {
        let limits = SearchLimits {
            min_depth: 0,
            ..SearchLimits::default()
        };
        let (game, result) = run(START, &StandardScorer, Duration::from_micros(1), limits);
        assert_legal(&game, &result);
        assert_eq!(result.reached_depth, 0);
        assert!(result.nodes > 0, "the first root move should be searched");
        assert!(result.timed_out);
    }

    #[test]
    fn search_respects_node_cap() {
        let limits = SearchLimits {
            max_nodes: Some(200),
            ..SearchLimits::default()
        };
        let (game, result) = run(START, &MaterialScorer, GENEROUS, limits);
        assert!(result.nodes <= 200, "nodes exceeded cap: {}", result.nodes);
        assert_legal(&game, &result);
    }

    #[test]
    fn deadline_overshoot_stays_within_margin() {
        let budget = Duration::from_millis(40);
        for fen in [START, KIWIPETE] {
            for trial in 0..3 {
                let (game, result) = run(fen, &StandardScorer, budget, SearchLimits::default());
                assert_legal(&game, &result);
                assert!(result.timed_out);
                assert!(
                    result.elapsed <= budget + DEADLINE_OVERSHOOT_MARGIN,
                    "trial {trial} on {fen} overshot: {:?}",
                    result.elapsed
                );
            }
        }
    }

    #[test]
    fn protected_depth_one_finishes_quickly_past_the_deadline() {
        let (game, result) = run(KIWIPETE, &StandardScorer, Duration::ZERO, SearchLimits::default());
        assert_legal(&game, &result);
        assert_eq!(result.reached_depth, 1);
        assert!(
            result.elapsed <= DEADLINE_OVERSHOOT_MARGIN,
            "depth 1 took {:?}",
            result.elapsed
        );
    }

    #[test]
    fn fresh_searches_are_deterministic() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let (_, a) = run(fen, &StandardScorer, GENEROUS, SearchLimits::depth(4));
        let (_, b) = run(fen, &StandardScorer, GENEROUS, SearchLimits::depth(4));
        assert_eq!(a.best_move, b.best_move);
        assert_eq!(a.score, b.score);
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.principal_variation, b.principal_variation);
    }

    #[test]
    fn more_time_never_searches_shallower() {
        let (_, short) = run(START, &StandardScorer, Duration::from_millis(10), SearchLimits::default());
        let (_, long) = run(START, &StandardScorer, Duration::from_millis(150), SearchLimits::default());
        assert!(long.reached_depth >= short.reached_depth);
    }

    /// Score of `mv` for the mover, judged by a fresh fixed-depth search.
    fn judged_score(game: &GameState, mv: ChessMove, depth: u8) -> i32 {
        let next = apply_move(game, mv).expect("move should apply");
        let mut tt = TranspositionTable::new_with_mb(1);
        let mut ordering = MoveOrdering::new();
        let reply = iterative_deepening_search(
            &next,
            &StandardScorer,
            &mut tt,
            &mut ordering,
            GENEROUS,
            SearchLimits::depth(depth),
        )
        .expect("search should run");
        -reply.score
    }

    #[test]
    fn more_time_never_returns_a_worse_move() {
        // Qd8+ Bxd8 Re8# is only visible past depth 1.
        let fen = "r1b2k1r/ppp1bppp/8/1B1Q4/5q2/2P5/PPP2PPP/R3R1K1 w - - 1 1";
        let (game, short) = run(fen, &StandardScorer, Duration::ZERO, SearchLimits::default());
        let (_, long) = run(fen, &StandardScorer, GENEROUS, SearchLimits::depth(4));
        assert_eq!(short.reached_depth, 1);
        assert!(long.score >= MATE_THRESHOLD, "long search should see the mate");

        let short_score = judged_score(&game, short.chess_move().expect("move"), 3);
        let long_score = judged_score(&game, long.chess_move().expect("move"), 3);
        assert!(
            long_score >= short_score,
            "long {} scored {long_score}, short {} scored {short_score}",
            long.chess_move().expect("move"),
            short.chess_move().expect("move")
        );
    }

    #[test]
    fn principal_variation_starts_with_best_move_and_is_legal() {
        let (game, result) = run(START, &StandardScorer, GENEROUS, SearchLimits::depth(4));
        assert_eq!(result.principal_variation.first().copied(), result.best_move);

        let mut state = game;
        for mv in &result.principal_variation {
            assert!(legal_moves(&state).expect("generation").contains(mv));
            state = apply_move(&state, *mv).expect("PV move should apply");
        }
    }

    #[test]
    fn depth_limited_search_reports_requested_depth() {
        let (_, result) = run(START, &MaterialScorer, GENEROUS, SearchLimits::depth(2));
        assert_eq!(result.reached_depth, 2);
        assert!(!result.timed_out);
    }
}
