use serde::{Deserialize, Serialize};

/// 棋盘格数（3×3，按行优先编号 0–8）。
pub const BOARD_SIZE: usize = 9;
/// 中心格编号。
pub const CENTER: usize = 4;
/// 四个角落格。
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];
/// 四条边上的格子。
pub const EDGES: [usize; 4] = [1, 3, 5, 7];

/// 八条获胜连线：三行、三列、两条对角线。
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 落子方：X 为人类玩家，O 为电脑。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// 单个棋盘格的状态。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '-',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

/// 对局结果：进行中、一方连线获胜或平局。
///
/// Always derived fresh from a board, never stored alongside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Outcome {
    InProgress,
    Won { mark: Mark, line: [usize; 3] },
    Tied,
}

impl Outcome {
    pub fn winner(&self) -> Option<Mark> {
        match self {
            Outcome::Won { mark, .. } => Some(*mark),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    MarkImbalance { x: usize, o: usize },
}

/// 3×3 棋盘，固定 9 格。
///
/// The fixed-length array keeps "wrong board length" unrepresentable;
/// deserialization of anything but 9 cells fails outright.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; 9],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
        }
    }

    pub fn from_cells(cells: [Cell; 9]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    pub fn is_empty_cell(&self, index: usize) -> bool {
        index < BOARD_SIZE && self.cells[index] == Cell::Empty
    }

    pub fn set_cell(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }

    pub fn clear_cell(&mut self, index: usize) {
        self.cells[index] = Cell::Empty;
    }

    pub fn available_moves(&self) -> Vec<usize> {
        (0..BOARD_SIZE)
            .filter(|&index| self.cells[index] == Cell::Empty)
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&cell| cell != Cell::Empty)
    }

    pub fn mark_count(&self, mark: Mark) -> usize {
        self.cells
            .iter()
            .filter(|&&cell| cell == Cell::from(mark))
            .count()
    }

    /// Scans the 8 win lines, then the tie condition. Pure; call this
    /// before generating moves so finished boards short-circuit.
    pub fn evaluate(&self) -> Outcome {
        for line in &LINES {
            let [a, b, c] = *line;
            if let Some(mark) = self.cells[a].mark() {
                if self.cells[b] == self.cells[a] && self.cells[c] == self.cells[a] {
                    return Outcome::Won { mark, line: *line };
                }
            }
        }

        if self.is_full() {
            Outcome::Tied
        } else {
            Outcome::InProgress
        }
    }

    /// Turns alternate with X opening, so any reachable board carries
    /// either equal counts or exactly one extra X.
    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let x = self.mark_count(Mark::X);
        let o = self.mark_count(Mark::O);
        if x == o || x == o + 1 {
            Ok(())
        } else {
            Err(IntegrityError::MarkImbalance { x, o })
        }
    }

    /// 用于日志与训练数据的紧凑棋盘键，如 "XO---X-O-"。
    pub fn key(&self) -> String {
        self.cells.iter().map(|cell| cell.symbol()).collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}
