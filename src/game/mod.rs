//! 游戏核心逻辑模块（棋盘、规则引擎等）。

pub mod board;
pub mod rules;

pub use board::{
    Board, Cell, IntegrityError, Mark, Outcome, BOARD_SIZE, CENTER, CORNERS, EDGES, LINES,
};
pub use rules::{GameEvent, GameState, MoveAction, RuleEngine, RuleError, RuleResolution};
