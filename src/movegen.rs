//! 合法走法生成
//!
//! 伪合法走法经过"走一步 → 检查己方是否被将军 → 撤销"的过滤。
//! 模拟走子只使用棋盘上不记录历史的路径，结束后棋盘完全复原。

use crate::board::{Board, PieceId};
use crate::types::{Move, Side, Square};

impl Board {
    /// 模拟走子后 `side` 是否仍安全（不被将军）
    fn leaves_side_safe(&mut self, mv: Move, side: Side) -> bool {
        match self.make_move(mv) {
            Some(applied) => {
                let safe = !self.is_in_check(side);
                self.unmake_move(applied);
                safe
            }
            None => false,
        }
    }

    /// 生成某方全部合法走法
    ///
    /// 顺序为棋子仓库顺序，同一棋子内按方向生成顺序；
    /// 需要排序的调用方自行排序。每次调用都重新计算。
    pub fn generate_legal_moves(&mut self, side: Side) -> Vec<Move> {
        let mut moves = Vec::with_capacity(48);
        let candidates: Vec<(PieceId, Square)> = self
            .pieces_of(side)
            .map(|(id, p)| (id, p.square))
            .collect();

        for (id, from) in candidates {
            for to in self.pseudo_legal_destinations(id) {
                let mv = Move::new(from, to);
                if self.leaves_side_safe(mv, side) {
                    moves.push(mv);
                }
            }
        }
        moves
    }

    /// 某方是否至少有一步合法走法（找到即返回）
    pub fn has_any_legal_move(&mut self, side: Side) -> bool {
        let candidates: Vec<(PieceId, Square)> = self
            .pieces_of(side)
            .map(|(id, p)| (id, p.square))
            .collect();

        for (id, from) in candidates {
            for to in self.pseudo_legal_destinations(id) {
                if self.leaves_side_safe(Move::new(from, to), side) {
                    return true;
                }
            }
        }
        false
    }

    /// 某棋子的合法目标格（用于界面提示）
    pub fn legal_destinations(&mut self, id: PieceId) -> Vec<Square> {
        let (from, side) = match self.piece(id) {
            Some(p) => (p.square, p.side),
            None => return Vec::new(),
        };
        self.pseudo_legal_destinations(id)
            .into_iter()
            .filter(|&to| self.leaves_side_safe(Move::new(from, to), side))
            .collect()
    }

    /// 走法是否合法：起点有子、伪合法、且不让己方被将军
    ///
    /// 不检查是否轮到该方走棋。
    pub fn is_legal_move(&mut self, mv: Move) -> bool {
        let id = match self.piece_at(mv.from) {
            Some(id) => id,
            None => return false,
        };
        let side = match self.piece(id) {
            Some(p) => p.side,
            None => return false,
        };
        self.is_pseudo_legal_move(id, mv.to) && self.leaves_side_safe(mv, side)
    }
}
