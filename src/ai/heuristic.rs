use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use super::minimax;
use crate::game::board::{Board, Mark, CENTER, CORNERS, EDGES};

/// First empty cell (in 0→8 scan order) that completes a line for
/// `mark`, found by simulate-then-undo on a scratch copy.
pub fn winning_cell(board: &Board, mark: Mark) -> Option<usize> {
    let mut scratch = board.clone();
    for cell in scratch.available_moves() {
        scratch.set_cell(cell, mark.into());
        let wins = scratch.evaluate().winner() == Some(mark);
        scratch.clear_cell(cell);
        if wins {
            return Some(cell);
        }
    }
    None
}

pub fn random_move(board: &Board, rng: &mut SmallRng) -> Option<usize> {
    board.available_moves().choose(rng).copied()
}

fn random_from(board: &Board, candidates: &[usize], rng: &mut SmallRng) -> Option<usize> {
    let open: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&cell| board.is_empty_cell(cell))
        .collect();
    open.choose(rng).copied()
}

/// 策略级联：先赢、再堵、占中心、抢角、最后随机。
///
/// Each step runs only when the previous one found nothing.
pub fn strategic_move(board: &Board, mark: Mark, rng: &mut SmallRng) -> Option<usize> {
    if let Some(cell) = winning_cell(board, mark) {
        return Some(cell);
    }
    if let Some(cell) = winning_cell(board, mark.opponent()) {
        return Some(cell);
    }
    if board.is_empty_cell(CENTER) {
        return Some(CENTER);
    }
    if let Some(cell) = random_from(board, &CORNERS, rng) {
        return Some(cell);
    }
    random_move(board, rng)
}

/// 进攻型：只找自己的连线机会，不做防守。
pub fn aggressive_move(board: &Board, mark: Mark, rng: &mut SmallRng) -> Option<usize> {
    if let Some(cell) = winning_cell(board, mark) {
        return Some(cell);
    }
    if board.is_empty_cell(CENTER) {
        return Some(CENTER);
    }
    if let Some(cell) = random_from(board, &CORNERS, rng) {
        return Some(cell);
    }
    random_move(board, rng)
}

/// 防守型：先堵对手，再找自己的机会，偏好边格。
pub fn defensive_move(board: &Board, mark: Mark, rng: &mut SmallRng) -> Option<usize> {
    if let Some(cell) = winning_cell(board, mark.opponent()) {
        return Some(cell);
    }
    if let Some(cell) = winning_cell(board, mark) {
        return Some(cell);
    }
    if board.is_empty_cell(CENTER) {
        return Some(CENTER);
    }
    if let Some(cell) = random_from(board, &EDGES, rng) {
        return Some(cell);
    }
    random_move(board, rng)
}

/// 混合型：开局用进攻级联，剩余不超过 6 格时切换到完全搜索。
pub fn hybrid_move(board: &Board, mark: Mark, rng: &mut SmallRng) -> Option<usize> {
    if board.available_moves().len() > 6 {
        aggressive_move(board, mark, rng)
    } else {
        minimax::best_move(board, mark)
    }
}
