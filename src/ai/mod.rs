//! AI 算法模块（极小极大搜索、启发式级联、难度混合）。

pub mod agent;
pub mod heuristic;
pub mod minimax;

pub use agent::{policy_move, AiAgent, AiConfig, AiDecision, AiDifficulty, AiStrategy, NO_MOVE};
pub use minimax::best_move;
