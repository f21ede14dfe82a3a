use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use timed_chess::engines::engine::new_engine;
use timed_chess::game_state::game_state::GameState;
use timed_chess::move_generation::legal_move_generator::legal_moves;
use timed_chess::search::board_scoring::StandardScorer;
use timed_chess::search::iterative_deepening::{iterative_deepening_search, SearchLimits};
use timed_chess::search::move_ordering::MoveOrdering;
use timed_chess::search::time_management::{parse_duration, DEADLINE_OVERSHOOT_MARGIN};
use timed_chess::search::transposition_table::TranspositionTable;

#[derive(Clone, Copy)]
struct SearchCase {
    name: &'static str,
    fen: &'static str,
}

const CASES: &[SearchCase] = &[
    SearchCase {
        name: "startpos",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    },
    SearchCase {
        name: "classical_mid",
        fen: "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    },
    SearchCase {
        name: "tactical",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    },
    SearchCase {
        name: "end_kpk",
        fen: "8/8/8/8/8/4k3/4P3/4K3 w - - 0 1",
    },
];

/// Fixed-depth search from cold tables.
fn bench_fixed_depth(c: &mut Criterion) {
    let depth = std::env::var("TIMED_CHESS_BENCH_DEPTH")
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(4)
        .max(1);

    let mut group = c.benchmark_group("search_fixed_depth");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.sample_size(20);

    for case in CASES {
        let game = GameState::from_fen(case.fen).expect("benchmark FEN should parse");
        group.bench_with_input(
            BenchmarkId::new(case.name, format!("d{depth}")),
            &game,
            |b, game| {
                b.iter(|| {
                    let mut tt = TranspositionTable::new_with_mb(16);
                    let mut ordering = MoveOrdering::new();
                    let result = iterative_deepening_search(
                        black_box(game),
                        &StandardScorer,
                        &mut tt,
                        &mut ordering,
                        Duration::from_secs(3600),
                        SearchLimits::depth(depth),
                    )
                    .expect("search should run");
                    black_box(result.nodes)
                });
            },
        );
    }

    group.finish();
}

/// Wall-clock cost of a timed search including deadline overshoot. Every
/// sample must still return a legal move inside the overshoot margin.
fn bench_timed_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_timed");
    group.sample_size(10);

    for case in CASES {
        let game = GameState::from_fen(case.fen).expect("benchmark FEN should parse");
        let legal = legal_moves(&game).expect("generation should run");

        for budget in ["1ms", "10ms", "50ms"] {
            let limit = parse_duration(budget).expect("budget should parse") + DEADLINE_OVERSHOOT_MARGIN;
            let mut engine = new_engine();
            group.bench_with_input(BenchmarkId::new(case.name, budget), budget, |b, budget| {
                b.iter(|| {
                    let result = engine
                        .search(black_box(&game), budget)
                        .expect("search should run");
                    let mv = result.chess_move().expect("position has legal moves");
                    assert!(legal.contains(&mv), "{} returned illegal {mv}", case.name);
                    assert!(
                        result.elapsed <= limit,
                        "{} overshot {budget}: {:?}",
                        case.name,
                        result.elapsed
                    );
                    black_box(mv)
                });
            });
        }
    }

    group.finish();
}

criterion_group!(search_benches, bench_fixed_depth, bench_timed_search);
criterion_main!(search_benches);
