pub mod ai;
pub mod feedback;
pub mod game;
pub mod selfplay;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{policy_move, AiAgent, AiConfig, AiDecision, AiDifficulty, AiStrategy, NO_MOVE};
pub use feedback::{
    default_pipeline, DeliveryMethod, FeedbackError, FeedbackPipeline, FeedbackReceipt,
    FeedbackSubmission, NotificationProvider,
};
pub use game::{
    Board, Cell, GameEvent, GameState, IntegrityError, Mark, MoveAction, Outcome, RuleEngine,
    RuleError, RuleResolution, BOARD_SIZE, LINES,
};
pub use selfplay::{run_tournament, DataCollector, GameRecord, GameResult, TournamentReport};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn integrity_to_js_error(error: IntegrityError) -> JsValue {
    to_js_error(RuleError::IntegrityViolation { error })
}

fn feedback_to_js_error(error: FeedbackError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn resolution_from_events(state: &GameState, events: Vec<GameEvent>) -> RuleResolution {
    RuleResolution::new(state.clone(), events)
}

fn make_resolution_json(resolution: RuleResolution) -> Result<String, JsValue> {
    serde_json::to_string(&resolution).map_err(serde_to_js_error)
}

fn ai_config_from_options(difficulty: Option<&str>, strategy: Option<&str>) -> AiConfig {
    let diff = difficulty
        .and_then(|value| AiDifficulty::from_str(value).ok())
        .unwrap_or(AiDifficulty::Medium);
    let mut config = AiConfig::from_difficulty(diff);
    if let Some(strategy) = strategy.and_then(|value| AiStrategy::from_str(value).ok()) {
        config = config.with_strategy(strategy);
    }
    config
}

fn make_agent(config: AiConfig, seed: Option<u64>) -> AiAgent {
    match seed {
        Some(seed) => AiAgent::with_seed(config, seed),
        None => AiAgent::new(config),
    }
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied: Option<RuleResolution>,
}

#[wasm_bindgen]
pub struct GameEngine {
    state: GameState,
}

#[wasm_bindgen]
impl GameEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(initial_state_json: Option<String>) -> Result<GameEngine, JsValue> {
        let state = if let Some(json) = initial_state_json {
            serde_json::from_str(&json).map_err(serde_to_js_error)?
        } else {
            GameState::new()
        };
        Ok(GameEngine { state })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        self.state = state;
        Ok(())
    }

    /// 人类落子：UI 把点击的格子编号交给引擎。
    pub fn play_move(&mut self, cell: usize) -> Result<String, JsValue> {
        let action = MoveAction {
            player: self.state.current_player,
            cell,
        };
        let mut engine = RuleEngine::new();
        let events = engine
            .apply_move(&mut self.state, action)
            .map_err(to_js_error)?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    /// 计算并落下电脑的一步棋。
    pub fn apply_ai_move(
        &mut self,
        difficulty: Option<String>,
        strategy: Option<String>,
        seed: Option<u64>,
    ) -> Result<String, JsValue> {
        let config = ai_config_from_options(difficulty.as_deref(), strategy.as_deref());
        let mut agent = make_agent(config, seed);

        let mover = self.state.current_player;
        let decision = agent
            .select_move(&self.state.board, mover)
            .map_err(integrity_to_js_error)?;

        let applied = if let Ok(cell) = usize::try_from(decision.cell) {
            let mut engine = RuleEngine::new();
            let events = engine
                .apply_move(
                    &mut self.state,
                    MoveAction {
                        player: mover,
                        cell,
                    },
                )
                .map_err(to_js_error)?;
            Some(resolution_from_events(&self.state, events))
        } else {
            None
        };

        let response = AiMoveResponse { decision, applied };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// 异步"思考"：延迟仅为界面效果，不影响选子结果。
    pub fn think_ai(
        &self,
        difficulty: Option<String>,
        strategy: Option<String>,
        seed: Option<u64>,
        delay_ms: Option<u32>,
    ) -> Promise {
        let board = self.state.board.clone();
        let mover = self.state.current_player;
        let config = ai_config_from_options(difficulty.as_deref(), strategy.as_deref());
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut agent = make_agent(config, seed);
            let decision = agent
                .select_move(&board, mover)
                .map_err(integrity_to_js_error)?;
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    pub fn reset(&mut self) -> Result<String, JsValue> {
        self.state.reset();
        make_resolution_json(resolution_from_events(&self.state, Vec::new()))
    }
}

/// 返回一个全新对局状态，方便前端初始化。
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state() -> Result<JsValue, JsValue> {
    to_value(&GameState::new()).map_err(JsValue::from)
}

/// 计算棋盘的对局结果（进行中 / 获胜 / 平局）。
#[wasm_bindgen(js_name = "evaluateBoard")]
pub fn evaluate_board(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&board.evaluate()).map_err(JsValue::from)
}

/// 校验棋盘是否满足轮流落子的不变量。
#[wasm_bindgen(js_name = "validateBoard")]
pub fn validate_board(board: JsValue) -> Result<(), JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    board.integrity_check().map_err(integrity_to_js_error)
}

/// 无状态选子入口：给定棋盘快照与难度，返回电脑(O)的下一步。
#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(
    board: JsValue,
    difficulty: Option<String>,
    strategy: Option<String>,
    seed: Option<u64>,
) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let config = ai_config_from_options(difficulty.as_deref(), strategy.as_deref());
    let mut agent = make_agent(config, seed);
    let decision = agent
        .select_move(&board, Mark::O)
        .map_err(integrity_to_js_error)?;
    to_value(&decision).map_err(JsValue::from)
}

/// 提交玩家反馈；投递失败不会阻断游戏流程。
#[wasm_bindgen(js_name = "submitFeedback")]
pub fn submit_feedback(payload: JsValue) -> Result<JsValue, JsValue> {
    let submission: FeedbackSubmission = from_value(payload).map_err(JsValue::from)?;
    let receipt = default_pipeline()
        .submit(submission)
        .map_err(feedback_to_js_error)?;
    to_value(&receipt).map_err(JsValue::from)
}

/// 批量自对弈：返回两个策略对打的统计汇总。
#[wasm_bindgen(js_name = "runSelfPlay")]
pub fn run_self_play(
    strategy_x: &str,
    strategy_o: &str,
    games: u32,
    seed: Option<u64>,
) -> Result<String, JsValue> {
    let strategy_x = AiStrategy::from_str(strategy_x)
        .map_err(|_| JsValue::from_str("unknown strategy for X"))?;
    let strategy_o = AiStrategy::from_str(strategy_o)
        .map_err(|_| JsValue::from_str("unknown strategy for O"))?;
    let report = run_tournament(strategy_x, strategy_o, games, seed.unwrap_or(0));
    serde_json::to_string(&report).map_err(serde_to_js_error)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
