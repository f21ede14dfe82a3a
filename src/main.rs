//! Command-line front end: timed search, perft, self-play and evaluation.
//!
//! Logging goes to stderr through `tracing-subscriber`. `-v`/`-q` raise or
//! lower the level; with neither, `RUST_LOG` applies and defaults to `warn`.

use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use timed_chess::engines::engine::{Engine, EngineConfig, ScorerKind};
use timed_chess::engines::self_play::play_self_game;
use timed_chess::game_state::chess_rules::STARTING_POSITION_FEN;
use timed_chess::move_generation::perft::{perft_detailed, perft_divide};
use timed_chess::search::iterative_deepening::SearchLimits;
use timed_chess::search::time_management::parse_duration;
use timed_chess::utils::long_algebraic::apply_long_algebraic_moves;
use timed_chess::utils::render_game_state::render_with_status;
use timed_chess::{ChessResult, GameState};

#[derive(Debug, Parser)]
#[command(name = "timed_chess", version, about = "Deadline-driven chess move search")]
struct Cli {
    #[arg(global = true, long, short, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
    #[arg(global = true, long, short, action = ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct PositionArgs {
    /// Starting position in FEN.
    #[arg(long, default_value = STARTING_POSITION_FEN)]
    fen: String,
    /// Long algebraic moves played from the FEN, e.g. "e2e4 e7e5".
    #[arg(long)]
    moves: Option<String>,
}

impl PositionArgs {
    fn game_state(&self) -> ChessResult<GameState> {
        let start = GameState::from_fen(&self.fen)?;
        match &self.moves {
            Some(moves) => apply_long_algebraic_moves(&start, moves),
            None => Ok(start),
        }
    }
}

#[derive(Debug, Args)]
struct EngineArgs {
    /// Transposition table size in MiB.
    #[arg(long, default_value_t = 16)]
    hash: usize,
    #[arg(long, default_value_t = 64)]
    max_depth: u8,
    /// Iterations that always complete regardless of the deadline.
    #[arg(long, default_value_t = 1)]
    min_depth: u8,
    #[arg(long)]
    max_nodes: Option<u64>,
    #[arg(long, default_value_t = ScorerKind::Standard)]
    scorer: ScorerKind,
}

impl EngineArgs {
    fn engine(&self) -> Engine {
        Engine::with_config(EngineConfig {
            tt_size_mb: self.hash,
            limits: SearchLimits {
                max_depth: self.max_depth,
                min_depth: self.min_depth,
                max_nodes: self.max_nodes,
            },
            scorer: self.scorer,
        })
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search one position and print the best move.
    Search {
        #[command(flatten)]
        position: PositionArgs,
        #[command(flatten)]
        engine: EngineArgs,
        /// Time budget such as "250ms", "2s" or "100microseconds".
        #[arg(long, short, default_value = "1s")]
        time: String,
    },
    /// Count leaf nodes of the legal move tree.
    Perft {
        #[command(flatten)]
        position: PositionArgs,
        #[arg(long, short, default_value_t = 4)]
        depth: u8,
        /// Per-root-move breakdown.
        #[arg(long)]
        divide: bool,
    },
    /// Let the engine play itself.
    Selfplay {
        #[command(flatten)]
        position: PositionArgs,
        #[command(flatten)]
        engine: EngineArgs,
        #[arg(long, default_value = "100ms")]
        per_move: String,
        #[arg(long, default_value_t = 200)]
        max_plies: u16,
        /// Print the game as PGN.
        #[arg(long)]
        pgn: bool,
    },
    /// Static evaluation from the side to move's perspective.
    Eval {
        #[command(flatten)]
        position: PositionArgs,
        #[command(flatten)]
        engine: EngineArgs,
    },
}

fn init_logging(level: i16) {
    let filter = match level {
        0 => EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy(),
        i16::MIN..=-1 => EnvFilter::new("error"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command) -> ChessResult<()> {
    match command {
        Command::Search {
            position,
            engine,
            time,
        } => {
            let game_state = position.game_state()?;
            let mut engine = engine.engine();
            let result = engine.search(&game_state, &time)?;

            let pv = result
                .principal_variation
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "depth {} score {} nodes {} time {}us pv {}",
                result.reached_depth,
                result.score,
                result.nodes,
                result.elapsed.as_micros(),
                pv
            );
            match result.chess_move() {
                Some(mv) => println!("bestmove {mv}"),
                None => println!("bestmove (none)"),
            }
        }
        Command::Perft {
            position,
            depth,
            divide,
        } => {
            let game_state = position.game_state()?;
            if divide {
                for (mv, nodes) in perft_divide(&game_state, depth)? {
                    println!("{mv}: {nodes}");
                }
            }
            let counts = perft_detailed(&game_state, depth)?;
            println!("{counts:?}");
        }
        Command::Selfplay {
            position,
            engine,
            per_move,
            max_plies,
            pgn,
        } => {
            let game_state = position.game_state()?;
            let per_move = parse_duration(&per_move)?;
            let mut engine = engine.engine();
            let record = play_self_game(&mut engine, game_state, per_move, max_plies)?;

            println!("{}", render_with_status(&record.final_state));
            println!(
                "{} ({}) after {} plies",
                record.outcome.result(),
                record.outcome.termination(),
                record.moves.len()
            );
            if pgn {
                println!("\n{}", record.to_pgn()?);
            }
        }
        Command::Eval { position, engine } => {
            let game_state = position.game_state()?;
            println!("{}", render_with_status(&game_state));
            println!("eval {}", engine.engine().evaluate(&game_state)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(i16::from(cli.verbose) - i16::from(cli.quiet));

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
