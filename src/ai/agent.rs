use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{heuristic, minimax};
use crate::game::board::{Board, IntegrityError, Mark};

/// Boundary sentinel for "no legal move" (board already terminal).
pub const NO_MOVE: i32 = -1;

/// Share of moves the Medium tier takes from the strategic cascade;
/// the rest are uniform random mistakes.
const MEDIUM_STRATEGIC_WEIGHT: f64 = 0.8;
/// Share of moves the Hard tier takes from the strategic cascade; the
/// remaining 10% fall through to full search. The mix is intentionally
/// asymmetric and must stay this way.
const HARD_STRATEGIC_WEIGHT: f64 = 0.9;

/// 难度档位，对应四种选子策略混合。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    Medium,
    Hard,
    Impossible,
}

impl FromStr for AiDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" | "weakest" => Ok(AiDifficulty::Easy),
            "medium" | "normal" | "weak" => Ok(AiDifficulty::Medium),
            "hard" | "strong" => Ok(AiDifficulty::Hard),
            "impossible" | "perfect" | "expert" => Ok(AiDifficulty::Impossible),
            _ => Err(()),
        }
    }
}

/// 具体选子策略；显式指定时跳过难度混合。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiStrategy {
    Random,
    Strategic,
    Aggressive,
    Defensive,
    Hybrid,
    Minimax,
}

impl FromStr for AiStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(AiStrategy::Random),
            "strategic" | "greedy" => Ok(AiStrategy::Strategic),
            "aggressive" | "aggro" => Ok(AiStrategy::Aggressive),
            "defensive" => Ok(AiStrategy::Defensive),
            "hybrid" => Ok(AiStrategy::Hybrid),
            "minimax" | "perfect" => Ok(AiStrategy::Minimax),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AiConfig {
    pub difficulty: AiDifficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<AiStrategy>,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: AiDifficulty) -> Self {
        Self {
            difficulty,
            strategy: None,
        }
    }

    pub fn with_strategy(mut self, strategy: AiStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_difficulty(AiDifficulty::Medium)
    }
}

/// 一次选子结果，序列化后交给前端。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiDecision {
    /// Cell index 0–8, or `NO_MOVE` when the board is terminal.
    pub cell: i32,
    /// The policy that actually produced this move (after blending).
    pub strategy: AiStrategy,
    pub difficulty: AiDifficulty,
}

/// Runs one policy directly, outside any difficulty blending. Shared
/// by the agent dispatch and the self-play batch tool.
pub fn policy_move(
    board: &Board,
    player: Mark,
    strategy: AiStrategy,
    rng: &mut SmallRng,
) -> Option<usize> {
    match strategy {
        AiStrategy::Random => heuristic::random_move(board, rng),
        AiStrategy::Strategic => heuristic::strategic_move(board, player, rng),
        AiStrategy::Aggressive => heuristic::aggressive_move(board, player, rng),
        AiStrategy::Defensive => heuristic::defensive_move(board, player, rng),
        AiStrategy::Hybrid => heuristic::hybrid_move(board, player, rng),
        AiStrategy::Minimax => minimax::best_move(board, player),
    }
}

pub struct AiAgent {
    config: AiConfig,
    rng: SmallRng,
}

impl AiAgent {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Seeded constructor: identical (board, config, seed) inputs
    /// reproduce identical move sequences.
    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Selects the next cell for `player`, validating the board first.
    ///
    /// A terminal board is not an error: the decision carries the
    /// `NO_MOVE` sentinel instead.
    pub fn select_move(
        &mut self,
        board: &Board,
        player: Mark,
    ) -> Result<AiDecision, IntegrityError> {
        board.integrity_check()?;

        let strategy = match self.config.strategy {
            Some(strategy) => strategy,
            None => self.blend_strategy(),
        };

        if board.evaluate().is_terminal() {
            return Ok(AiDecision {
                cell: NO_MOVE,
                strategy,
                difficulty: self.config.difficulty,
            });
        }

        let cell = policy_move(board, player, strategy, &mut self.rng);
        Ok(AiDecision {
            cell: cell.map_or(NO_MOVE, |cell| cell as i32),
            strategy,
            difficulty: self.config.difficulty,
        })
    }

    /// Difficulty mixing. Hard deliberately falls back to *search* on
    /// its 10% branch while Medium falls back to random on its 20%.
    fn blend_strategy(&mut self) -> AiStrategy {
        match self.config.difficulty {
            AiDifficulty::Easy => AiStrategy::Random,
            AiDifficulty::Medium => {
                if self.rng.gen_bool(MEDIUM_STRATEGIC_WEIGHT) {
                    AiStrategy::Strategic
                } else {
                    AiStrategy::Random
                }
            }
            AiDifficulty::Hard => {
                if self.rng.gen_bool(HARD_STRATEGIC_WEIGHT) {
                    AiStrategy::Strategic
                } else {
                    AiStrategy::Minimax
                }
            }
            AiDifficulty::Impossible => AiStrategy::Minimax,
        }
    }
}
