use serde::{Deserialize, Serialize};

use super::board::{Board, IntegrityError, Mark, Outcome, BOARD_SIZE};

/// 一次落子请求。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveAction {
    pub player: Mark,
    pub cell: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    GameFinished,
    NotPlayerTurn { expected: Mark, actual: Mark },
    CellOutOfRange { cell: usize },
    CellOccupied { cell: usize },
    IntegrityViolation { error: IntegrityError },
}

/// 游戏事件流。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    MovePlayed { player: Mark, cell: usize },
    GameWon { winner: Mark, line: [usize; 3] },
    GameTied,
    BoardCleared,
}

/// 会话状态：棋盘、当前行动方与事件日志。
///
/// The outcome is never stored here; it is recomputed from the board on
/// every query so the session can never drift out of sync with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    #[serde(default)]
    pub board: Board,
    pub current_player: Mark,
    pub turn: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Mark::X,
            turn: 1,
            event_log: Vec::new(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.board.evaluate()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome().is_terminal()
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }

    pub fn reset(&mut self) {
        self.board = Board::new();
        self.current_player = Mark::X;
        self.turn = 1;
        self.record_event(GameEvent::BoardCleared);
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl RuleResolution {
    pub fn new(state: GameState, mut events: Vec<GameEvent>) -> Self {
        let outcome = state.outcome();
        let outcome = if outcome.is_terminal() {
            let has_event = events
                .iter()
                .any(|event| matches!(event, GameEvent::GameWon { .. } | GameEvent::GameTied));
            if !has_event {
                match &outcome {
                    Outcome::Won { mark, line } => events.push(GameEvent::GameWon {
                        winner: *mark,
                        line: *line,
                    }),
                    Outcome::Tied => events.push(GameEvent::GameTied),
                    Outcome::InProgress => {}
                }
            }
            Some(outcome)
        } else {
            None
        };

        Self {
            state,
            events,
            outcome,
        }
    }
}

#[derive(Debug, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    fn ensure_integrity(state: &GameState) -> Result<(), RuleError> {
        state
            .board
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })
    }

    /// Validates and applies one move, returning the emitted events.
    pub fn apply_move(
        &mut self,
        state: &mut GameState,
        action: MoveAction,
    ) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_integrity(state)?;

        if state.is_finished() {
            return Err(RuleError::GameFinished);
        }
        if action.player != state.current_player {
            return Err(RuleError::NotPlayerTurn {
                expected: state.current_player,
                actual: action.player,
            });
        }
        if action.cell >= BOARD_SIZE {
            return Err(RuleError::CellOutOfRange { cell: action.cell });
        }
        if !state.board.is_empty_cell(action.cell) {
            return Err(RuleError::CellOccupied { cell: action.cell });
        }

        let mut events = Vec::new();
        state.board.set_cell(action.cell, action.player.into());

        let move_event = GameEvent::MovePlayed {
            player: action.player,
            cell: action.cell,
        };
        state.record_event(move_event.clone());
        events.push(move_event);

        match state.outcome() {
            Outcome::Won { mark, line } => {
                let event = GameEvent::GameWon { winner: mark, line };
                state.record_event(event.clone());
                events.push(event);
            }
            Outcome::Tied => {
                state.record_event(GameEvent::GameTied);
                events.push(GameEvent::GameTied);
            }
            Outcome::InProgress => {
                state.current_player = state.current_player.opponent();
                state.turn += 1;
            }
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Cell;

    #[test]
    fn valid_move_flips_current_player() {
        let mut engine = RuleEngine::new();
        let mut state = GameState::new();

        let events = engine
            .apply_move(
                &mut state,
                MoveAction {
                    player: Mark::X,
                    cell: 4,
                },
            )
            .expect("opening move should be legal");

        assert_eq!(state.board.cell(4), Cell::X);
        assert_eq!(state.current_player, Mark::O);
        assert_eq!(state.turn, 2);
        assert!(events
            .iter()
            .any(|event| matches!(event, GameEvent::MovePlayed { cell: 4, .. })));
    }

    #[test]
    fn occupied_cell_is_rejected() {
        let mut engine = RuleEngine::new();
        let mut state = GameState::new();

        engine
            .apply_move(
                &mut state,
                MoveAction {
                    player: Mark::X,
                    cell: 0,
                },
            )
            .expect("first move should succeed");

        let result = engine.apply_move(
            &mut state,
            MoveAction {
                player: Mark::O,
                cell: 0,
            },
        );
        assert_eq!(result, Err(RuleError::CellOccupied { cell: 0 }));
    }

    #[test]
    fn out_of_turn_move_is_rejected() {
        let mut engine = RuleEngine::new();
        let mut state = GameState::new();

        let result = engine.apply_move(
            &mut state,
            MoveAction {
                player: Mark::O,
                cell: 4,
            },
        );
        assert_eq!(
            result,
            Err(RuleError::NotPlayerTurn {
                expected: Mark::X,
                actual: Mark::O,
            })
        );
    }

    #[test]
    fn winning_move_emits_game_won_and_freezes_state() {
        let mut engine = RuleEngine::new();
        let mut state = GameState::new();

        for action in [
            MoveAction {
                player: Mark::X,
                cell: 0,
            },
            MoveAction {
                player: Mark::O,
                cell: 3,
            },
            MoveAction {
                player: Mark::X,
                cell: 1,
            },
            MoveAction {
                player: Mark::O,
                cell: 4,
            },
        ] {
            engine
                .apply_move(&mut state, action)
                .expect("setup moves should be legal");
        }

        let events = engine
            .apply_move(
                &mut state,
                MoveAction {
                    player: Mark::X,
                    cell: 2,
                },
            )
            .expect("winning move should be legal");

        assert!(events.iter().any(|event| matches!(
            event,
            GameEvent::GameWon {
                winner: Mark::X,
                line: [0, 1, 2]
            }
        )));
        assert!(state.is_finished());

        let result = engine.apply_move(
            &mut state,
            MoveAction {
                player: Mark::O,
                cell: 5,
            },
        );
        assert_eq!(result, Err(RuleError::GameFinished));
    }

    #[test]
    fn imbalanced_board_is_rejected_before_mutation() {
        let mut engine = RuleEngine::new();
        let mut state = GameState::new();
        state.board.set_cell(0, Cell::X);
        state.board.set_cell(1, Cell::X);
        state.current_player = Mark::O;

        let result = engine.apply_move(
            &mut state,
            MoveAction {
                player: Mark::O,
                cell: 4,
            },
        );
        assert!(
            matches!(result, Err(RuleError::IntegrityViolation { .. })),
            "mark imbalance must fail fast"
        );
        assert_eq!(state.board.cell(4), Cell::Empty);
    }

    #[test]
    fn resolution_appends_missing_terminal_event() {
        let mut state = GameState::new();
        for (cell, value) in [
            (0, Cell::X),
            (1, Cell::X),
            (2, Cell::X),
            (3, Cell::O),
            (4, Cell::O),
        ] {
            state.board.set_cell(cell, value);
        }

        let resolution = RuleResolution::new(state, Vec::new());
        assert!(resolution
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::GameWon { winner: Mark::X, .. })));
        assert!(resolution.outcome.is_some());
    }
}
