//! Engine facade: one reusable search context behind a small API.
//!
//! An `Engine` owns the transposition table, move-ordering history and the
//! board scorer. They persist across `search` calls and are cleared only by
//! `reset`. The duration string is parsed before any search work begins.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::game_state::GameState;
use crate::search::board_scoring::{evaluate_position, BoardScorer, MaterialScorer, StandardScorer};
use crate::search::iterative_deepening::{iterative_deepening_search, SearchLimits, SearchResult};
use crate::search::move_ordering::MoveOrdering;
use crate::search::time_management::parse_duration;
use crate::search::transposition_table::TranspositionTable;

pub const DEFAULT_HASH_MB: usize = 16;
const MAX_HASH_MB: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorerKind {
    #[default]
    Standard,
    Material,
}

impl ScorerKind {
    fn build(self) -> Box<dyn BoardScorer> {
        match self {
            ScorerKind::Standard => Box::new(StandardScorer),
            ScorerKind::Material => Box::new(MaterialScorer),
        }
    }
}

impl FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ScorerKind::Standard),
            "material" => Ok(ScorerKind::Material),
            _ => Err("expected standard or material".to_owned()),
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScorerKind::Standard => "standard",
            ScorerKind::Material => "material",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub tt_size_mb: usize,
    pub limits: SearchLimits,
    pub scorer: ScorerKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tt_size_mb: DEFAULT_HASH_MB,
            limits: SearchLimits::default(),
            scorer: ScorerKind::default(),
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    scorer: Box<dyn BoardScorer>,
    tt: TranspositionTable,
    ordering: MoveOrdering,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("tt_capacity", &self.tt.capacity())
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

/// Engine with the default configuration.
#[inline]
pub fn new_engine() -> Engine {
    Engine::default()
}

/// Standard starting position.
#[inline]
pub fn new_game() -> GameState {
    GameState::new_game()
}

impl Engine {
    pub fn with_config(config: EngineConfig) -> Self {
        let tt_size_mb = config.tt_size_mb.clamp(1, MAX_HASH_MB);
        Self {
            config: EngineConfig { tt_size_mb, ..config },
            scorer: config.scorer.build(),
            tt: TranspositionTable::new_with_mb(tt_size_mb),
            ordering: MoveOrdering::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Search for at most `duration`, e.g. `"250ms"`, `"2s"` or
    /// `"100microseconds"`.
    pub fn search(&mut self, game_state: &GameState, duration: &str) -> ChessResult<SearchResult> {
        let budget = parse_duration(duration)?;
        self.search_for(game_state, budget)
    }

    #[inline]
    pub fn search_for(&mut self, game_state: &GameState, budget: Duration) -> ChessResult<SearchResult> {
        self.search_with_limits(game_state, budget, self.config.limits)
    }

    pub fn search_with_limits(
        &mut self,
        game_state: &GameState,
        budget: Duration,
        limits: SearchLimits,
    ) -> ChessResult<SearchResult> {
        iterative_deepening_search(
            game_state,
            self.scorer.as_ref(),
            &mut self.tt,
            &mut self.ordering,
            budget,
            limits,
        )
    }

    /// Terminal-aware static evaluation from the side to move's perspective.
    pub fn evaluate(&self, game_state: &GameState) -> ChessResult<i32> {
        game_state.validate()?;
        let mut probe = game_state.clone();
        evaluate_position(self.scorer.as_ref(), &mut probe, 0)
    }

    /// Forget everything learned in earlier searches.
    pub fn reset(&mut self) {
        self.tt.clear();
        self.ordering.clear();
        debug!("engine state reset");
    }

    /// String configuration: `Hash` (MiB), `MaxDepth`, `MinDepth`,
    /// `MaxNodes` (0 disables) and `Scorer` (`standard` or `material`).
    pub fn set_option(&mut self, name: &str, value: &str) -> ChessResult<()> {
        let invalid = |reason: &str| ChessError::InvalidOption {
            name: name.to_owned(),
            value: value.to_owned(),
            reason: reason.to_owned(),
        };
        let trimmed = value.trim();

        if name.eq_ignore_ascii_case("Hash") {
            let mb = trimmed
                .parse::<usize>()
                .map_err(|_| invalid("expected a size in MiB"))?;
            if !(1..=MAX_HASH_MB).contains(&mb) {
                return Err(invalid("size out of range"));
            }
            self.config.tt_size_mb = mb;
            self.tt = TranspositionTable::new_with_mb(mb);
        } else if name.eq_ignore_ascii_case("MaxDepth") {
            let depth = trimmed
                .parse::<u8>()
                .map_err(|_| invalid("expected a depth in plies"))?;
            if depth == 0 {
                return Err(invalid("depth must be at least 1"));
            }
            self.config.limits.max_depth = depth;
        } else if name.eq_ignore_ascii_case("MinDepth") {
            self.config.limits.min_depth = trimmed
                .parse::<u8>()
                .map_err(|_| invalid("expected a depth in plies"))?;
        } else if name.eq_ignore_ascii_case("MaxNodes") {
            let nodes = trimmed
                .parse::<u64>()
                .map_err(|_| invalid("expected a node count"))?;
            self.config.limits.max_nodes = (nodes > 0).then_some(nodes);
        } else if name.eq_ignore_ascii_case("Scorer") {
            let kind = trimmed.parse::<ScorerKind>().map_err(|e| invalid(&e))?;
            self.config.scorer = kind;
            self.scorer = kind.build();
            self.tt.clear();
        } else {
            return Err(invalid("unknown option"));
        }

        debug!(option = name, value = trimmed, "option set");
        Ok(())
    }
}
