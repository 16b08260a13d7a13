//! 局面评估
//!
//! 每个棋子的价值 = 子力 + 位置分 × 2 + 机动性 × 15，
//! 再依次乘以受威胁折扣、中路加成、过河兵加成。
//! 评估方的棋子加分，对方棋子减分。

use crate::board::{Board, Piece, PieceId};
use crate::types::{GameOutcome, PieceType, Side};

/// 终局分数（胜负分）
pub const MATE_SCORE: i32 = 1_000_000;

/// 将军奖励：对方正被将军时加分，己方被将军时减分
pub const CHECK_BONUS: i32 = 500;

/// 位置分权重
const POSITION_WEIGHT: i32 = 2;
/// 每个伪合法落点的机动性分
const MOBILITY_WEIGHT: i32 = 15;

/// 子力价值
pub fn material_value(kind: PieceType) -> i32 {
    match kind {
        PieceType::General => 10000,
        PieceType::Advisor => 250,
        PieceType::Elephant => 250,
        PieceType::Horse => 600,
        PieceType::Chariot => 1200,
        PieceType::Cannon => 550,
        PieceType::Soldier => 150,
    }
}

// === 位置分表 ===

/// 位置分表，按 [y][x] 索引，以黑方视角排列（y 越大越靠近对方）；
/// 红方查表前先把 y 翻转。
type PositionTable = [[i32; 9]; 10];

const SOLDIER_TABLE: PositionTable = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 4, 6, 6, 6, 6, 6, 4, 2],
    [4, 6, 8, 8, 8, 8, 8, 6, 4],
    [6, 8, 10, 10, 10, 10, 10, 8, 6],
    [8, 10, 12, 12, 12, 12, 12, 10, 8],
    [10, 12, 14, 14, 14, 14, 14, 12, 10],
    [12, 14, 16, 16, 16, 16, 16, 14, 12],
    [14, 16, 18, 18, 18, 18, 18, 16, 14],
];

const HORSE_TABLE: PositionTable = [
    [0, 2, 4, 4, 4, 4, 4, 2, 0],
    [2, 4, 6, 6, 6, 6, 6, 4, 2],
    [4, 6, 8, 8, 8, 8, 8, 6, 4],
    [4, 6, 8, 8, 8, 8, 8, 6, 4],
    [4, 6, 8, 8, 8, 8, 8, 6, 4],
    [4, 6, 8, 8, 8, 8, 8, 6, 4],
    [4, 6, 8, 8, 8, 8, 8, 6, 4],
    [2, 4, 6, 6, 6, 6, 6, 4, 2],
    [0, 2, 4, 4, 4, 4, 4, 2, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
];

const CANNON_TABLE: PositionTable = [
    [6, 6, 6, 6, 6, 6, 6, 6, 6],
    [6, 8, 8, 8, 8, 8, 8, 8, 6],
    [6, 8, 8, 8, 8, 8, 8, 8, 6],
    [6, 8, 8, 10, 10, 10, 8, 8, 6],
    [6, 8, 8, 10, 10, 10, 8, 8, 6],
    [6, 8, 8, 10, 10, 10, 8, 8, 6],
    [6, 8, 8, 8, 8, 8, 8, 8, 6],
    [6, 8, 8, 8, 8, 8, 8, 8, 6],
    [6, 6, 6, 6, 6, 6, 6, 6, 6],
    [6, 6, 6, 6, 6, 6, 6, 6, 6],
];

/// 查位置分；将、士、象、车没有位置表
pub fn position_value(piece: &Piece) -> i32 {
    let table = match piece.kind {
        PieceType::Soldier => &SOLDIER_TABLE,
        PieceType::Horse => &HORSE_TABLE,
        PieceType::Cannon => &CANNON_TABLE,
        PieceType::General | PieceType::Advisor | PieceType::Elephant | PieceType::Chariot => {
            return 0
        }
    };
    let y = match piece.side {
        Side::Red => 9 - piece.square.y,
        Side::Black => piece.square.y,
    };
    table[y as usize][piece.square.x as usize]
}

/// 单个棋子的评估明细
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceEval {
    pub kind: PieceType,
    pub side: Side,
    pub material: i32,
    pub position: i32,
    pub mobility: i32,
    pub threatened: bool,
    /// 折扣与加成之后的最终价值（恒为正，符号由阵营决定）
    pub value: i32,
}

/// 局面评估器
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Evaluator
    }

    /// 从 `perspective` 方视角评估局面
    ///
    /// 将帅被吃或照面时直接返回 ±[`MATE_SCORE`]。
    pub fn evaluate(&self, board: &Board, perspective: Side) -> i32 {
        if let Some(outcome) = board.terminal_outcome() {
            return self.outcome_score(outcome, perspective);
        }

        let mut score = 0;
        for (id, piece) in board.pieces() {
            let value = self.piece_eval(board, id, piece).value;
            if piece.side == perspective {
                score += value;
            } else {
                score -= value;
            }
        }

        let to_move = board.side_to_move();
        if board.is_in_check(to_move) {
            if to_move == perspective {
                score -= CHECK_BONUS;
            } else {
                score += CHECK_BONUS;
            }
        }

        score
    }

    /// 已知终局结果的分数
    pub fn outcome_score(&self, outcome: GameOutcome, perspective: Side) -> i32 {
        if outcome.winner == perspective {
            MATE_SCORE
        } else {
            -MATE_SCORE
        }
    }

    /// 单个棋子的评估明细
    pub fn piece_eval(&self, board: &Board, id: PieceId, piece: &Piece) -> PieceEval {
        let material = material_value(piece.kind);
        let position = position_value(piece);
        let mobility = board.mobility(id) as i32;
        let threatened = board.is_square_attacked(piece.square, piece.side.opposite());

        let mut value = material + position * POSITION_WEIGHT + mobility * MOBILITY_WEIGHT;
        if threatened {
            value = value * 4 / 5;
        }
        // 中路三列
        if (3..=5).contains(&piece.square.x) {
            value = value * 6 / 5;
        }
        if piece.kind == PieceType::Soldier && !piece.square.on_own_side(piece.side) {
            value = value * 3 / 2;
        }

        PieceEval {
            kind: piece.kind,
            side: piece.side,
            material,
            position,
            mobility,
            threatened,
            value,
        }
    }

    /// 全部棋子的评估明细，按仓库顺序
    pub fn breakdown(&self, board: &Board) -> Vec<PieceEval> {
        board
            .pieces()
            .map(|(id, piece)| self.piece_eval(board, id, piece))
            .collect()
    }
}
