//! 离线自对弈批量工具：策略对战、对局记录与训练数据集导出。
//!
//! This is the offline data-generation side of the project. It drives
//! the same pure policies as the interactive agent but never learns
//! from the games it records.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::ai::{policy_move, AiStrategy};
use crate::game::{GameState, Mark, MoveAction, Outcome, RuleEngine};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameResult {
    X,
    O,
    Tie,
}

/// 单步样本：落子前的棋盘、落点与落子方。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveSample {
    pub board: String,
    pub cell: usize,
    pub player: Mark,
}

/// 一局完整对局的记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: u32,
    pub player_x_strategy: AiStrategy,
    pub player_o_strategy: AiStrategy,
    pub moves: Vec<MoveSample>,
    pub winner: GameResult,
    pub game_length: usize,
}

/// Plays one full game between two policies, recording every move.
/// Nine cells bound the loop, so a game always terminates.
pub fn play_game(
    game_id: u32,
    strategy_x: AiStrategy,
    strategy_o: AiStrategy,
    rng: &mut SmallRng,
) -> GameRecord {
    let mut engine = RuleEngine::new();
    let mut state = GameState::new();
    let mut moves = Vec::new();

    while !state.is_finished() {
        let player = state.current_player;
        let strategy = if player == Mark::X {
            strategy_x
        } else {
            strategy_o
        };
        let Some(cell) = policy_move(&state.board, player, strategy, rng) else {
            break;
        };
        moves.push(MoveSample {
            board: state.board.key(),
            cell,
            player,
        });
        if engine
            .apply_move(&mut state, MoveAction { player, cell })
            .is_err()
        {
            break;
        }
    }

    let winner = match state.outcome() {
        Outcome::Won { mark: Mark::X, .. } => GameResult::X,
        Outcome::Won { mark: Mark::O, .. } => GameResult::O,
        _ => GameResult::Tie,
    };

    GameRecord {
        game_id,
        player_x_strategy: strategy_x,
        player_o_strategy: strategy_o,
        game_length: moves.len(),
        moves,
        winner,
    }
}

/// 数据集汇总统计。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub total_games: usize,
    pub x_wins: u32,
    pub o_wins: u32,
    pub ties: u32,
    pub average_game_length: f64,
    pub game_length_distribution: BTreeMap<usize, u32>,
    pub opening_moves: BTreeMap<usize, u32>,
}

#[derive(Serialize)]
struct DatasetMetadata {
    total_games: usize,
    strategies_used: Vec<AiStrategy>,
}

#[derive(Serialize)]
struct Dataset<'a> {
    metadata: DatasetMetadata,
    games: &'a [GameRecord],
}

/// 采集多局对局并导出 JSON 数据集。
#[derive(Debug, Default)]
pub struct DataCollector {
    games: Vec<GameRecord>,
    next_game_id: u32,
}

impl DataCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn record_game(&mut self, record: GameRecord) {
        self.games.push(record);
    }

    pub fn play_and_record(
        &mut self,
        strategy_x: AiStrategy,
        strategy_o: AiStrategy,
        rng: &mut SmallRng,
    ) -> GameResult {
        let record = play_game(self.next_game_id, strategy_x, strategy_o, rng);
        self.next_game_id += 1;
        let winner = record.winner;
        self.record_game(record);
        winner
    }

    /// wasm 环境没有文件系统，数据集以 JSON 字符串形式交给调用方。
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        let mut strategies_used = Vec::new();
        for game in &self.games {
            for strategy in [game.player_x_strategy, game.player_o_strategy] {
                if !strategies_used.contains(&strategy) {
                    strategies_used.push(strategy);
                }
            }
        }

        serde_json::to_string(&Dataset {
            metadata: DatasetMetadata {
                total_games: self.games.len(),
                strategies_used,
            },
            games: &self.games,
        })
    }

    pub fn statistics(&self) -> DatasetStatistics {
        let mut stats = DatasetStatistics {
            total_games: self.games.len(),
            x_wins: 0,
            o_wins: 0,
            ties: 0,
            average_game_length: 0.0,
            game_length_distribution: BTreeMap::new(),
            opening_moves: BTreeMap::new(),
        };

        let mut total_length = 0usize;
        for game in &self.games {
            match game.winner {
                GameResult::X => stats.x_wins += 1,
                GameResult::O => stats.o_wins += 1,
                GameResult::Tie => stats.ties += 1,
            }
            total_length += game.game_length;
            *stats
                .game_length_distribution
                .entry(game.game_length)
                .or_insert(0) += 1;
            if let Some(opening) = game.moves.first() {
                *stats.opening_moves.entry(opening.cell).or_insert(0) += 1;
            }
        }

        if !self.games.is_empty() {
            stats.average_game_length = total_length as f64 / self.games.len() as f64;
        }
        stats
    }
}

/// 两个策略对打若干局的结果汇总。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentReport {
    pub player_x_strategy: AiStrategy,
    pub player_o_strategy: AiStrategy,
    pub games: u32,
    pub x_wins: u32,
    pub o_wins: u32,
    pub ties: u32,
}

pub fn run_tournament(
    strategy_x: AiStrategy,
    strategy_o: AiStrategy,
    games: u32,
    seed: u64,
) -> TournamentReport {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut report = TournamentReport {
        player_x_strategy: strategy_x,
        player_o_strategy: strategy_o,
        games,
        x_wins: 0,
        o_wins: 0,
        ties: 0,
    };

    for game_id in 0..games {
        let record = play_game(game_id, strategy_x, strategy_o, &mut rng);
        match record.winner {
            GameResult::X => report.x_wins += 1,
            GameResult::O => report.o_wins += 1,
            GameResult::Tie => report.ties += 1,
        }
    }

    report
}
