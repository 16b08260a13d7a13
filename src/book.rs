//! 开局库
//!
//! 按行棋方分组的少量固定走法。查询时按列表顺序返回第一条
//! "起点仍是该方同类棋子且当前合法"的走法。

use crate::board::Board;
use crate::types::{Move, PieceType, Side};

/// 开局库中的一条走法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookMove {
    pub kind: PieceType,
    pub mv: Move,
}

impl BookMove {
    const fn new(kind: PieceType, from_x: i8, from_y: i8, to_x: i8, to_y: i8) -> Self {
        BookMove {
            kind,
            mv: Move::from_coords(from_x, from_y, to_x, to_y),
        }
    }
}

/// 红方：炮二平五、马二进三、马八进七
const RED_LINES: [BookMove; 3] = [
    BookMove::new(PieceType::Cannon, 7, 7, 4, 7),
    BookMove::new(PieceType::Horse, 7, 9, 6, 7),
    BookMove::new(PieceType::Horse, 1, 9, 2, 7),
];

/// 黑方：马8进7、马2进3、炮8平5
const BLACK_LINES: [BookMove; 3] = [
    BookMove::new(PieceType::Horse, 7, 0, 6, 2),
    BookMove::new(PieceType::Horse, 1, 0, 2, 2),
    BookMove::new(PieceType::Cannon, 7, 2, 4, 2),
];

#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    red: Vec<BookMove>,
    black: Vec<BookMove>,
}

impl OpeningBook {
    /// 内置开局库
    pub fn standard() -> Self {
        OpeningBook {
            red: RED_LINES.to_vec(),
            black: BLACK_LINES.to_vec(),
        }
    }

    /// 空开局库（总是交给搜索）
    pub fn empty() -> Self {
        OpeningBook::default()
    }

    pub fn add(&mut self, side: Side, entry: BookMove) {
        match side {
            Side::Red => self.red.push(entry),
            Side::Black => self.black.push(entry),
        }
    }

    pub fn moves_for(&self, side: Side) -> &[BookMove] {
        match side {
            Side::Red => &self.red,
            Side::Black => &self.black,
        }
    }

    /// 为当前行棋方查找可用的开局走法
    pub fn probe(&self, board: &mut Board) -> Option<Move> {
        let side = board.side_to_move();
        self.moves_for(side)
            .iter()
            .find(|entry| {
                let matches = board
                    .piece_on(entry.mv.from)
                    .map_or(false, |p| p.side == side && p.kind == entry.kind);
                matches && board.is_legal_move(entry.mv)
            })
            .map(|entry| entry.mv)
    }
}
