//! 棋盘：棋子仓库 + 占位表 + 走子规则
//!
//! 棋子存放在按 `PieceId` 寻址的仓库里，被吃的棋子只是标记为离场，
//! 撤销时重新上场，因此 `make_move` / `unmake_move` 都是 O(1)。
//!
//! 这里的 `make_move` / `unmake_move` 是不记录历史的路径，
//! 供合法性模拟和搜索使用；记录历史的对局路径在 [`crate::game::BoardState`]。

use crate::error::PlacementError;
use crate::types::{EndReason, GameOutcome, Move, PieceType, Side, Square, SQUARE_COUNT};
use std::fmt;

/// 棋子在仓库中的编号，整局对局内保持不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceId(u8);

impl PieceId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceType,
    pub side: Side,
    pub square: Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    piece: Piece,
    on_board: bool,
}

/// 已执行的走法，撤销时原样交回
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub mv: Move,
    pub piece: PieceId,
    pub captured: Option<PieceId>,
}

/// 四个正交方向
const ORTHOGONAL: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
/// 四个斜向
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
/// 马的目标偏移与马腿偏移
const HORSE_STEPS: [((i8, i8), (i8, i8)); 8] = [
    ((1, 2), (0, 1)),
    ((-1, 2), (0, 1)),
    ((1, -2), (0, -1)),
    ((-1, -2), (0, -1)),
    ((2, 1), (1, 0)),
    ((2, -1), (1, 0)),
    ((-2, 1), (-1, 0)),
    ((-2, -1), (-1, 0)),
];

/// 棋盘
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    slots: Vec<Slot>,
    squares: [Option<PieceId>; SQUARE_COUNT],
    /// 每方将/帅的编号
    generals: [Option<PieceId>; 2],
    side_to_move: Side,
}

impl Board {
    /// 空棋盘
    pub fn empty(side_to_move: Side) -> Board {
        Board {
            slots: Vec::with_capacity(32),
            squares: [None; SQUARE_COUNT],
            generals: [None; 2],
            side_to_move,
        }
    }

    /// 标准开局 32 子布局，红方先行
    pub fn standard() -> Board {
        let mut board = Board::empty(Side::Red);
        for side in [Side::Red, Side::Black] {
            let (back, dir) = match side {
                Side::Red => (9, -1),
                Side::Black => (0, 1),
            };
            let back_rank = [
                (PieceType::Chariot, 0),
                (PieceType::Chariot, 8),
                (PieceType::Horse, 1),
                (PieceType::Horse, 7),
                (PieceType::Elephant, 2),
                (PieceType::Elephant, 6),
                (PieceType::Advisor, 3),
                (PieceType::Advisor, 5),
                (PieceType::General, 4),
            ];
            for (kind, x) in back_rank {
                board.push(kind, side, Square::new(x, back));
            }
            for x in [1, 7] {
                board.push(PieceType::Cannon, side, Square::new(x, back + dir * 2));
            }
            for x in [0, 2, 4, 6, 8] {
                board.push(PieceType::Soldier, side, Square::new(x, back + dir * 3));
            }
        }
        board
    }

    /// 摆放一个棋子（用于构造局面）
    pub fn place(
        &mut self,
        kind: PieceType,
        side: Side,
        square: Square,
    ) -> Result<PieceId, PlacementError> {
        if !square.is_valid() {
            return Err(PlacementError::OutOfBounds {
                x: square.x,
                y: square.y,
            });
        }
        if self.squares[square.to_index()].is_some() {
            return Err(PlacementError::Occupied(square));
        }
        if kind == PieceType::General && self.generals[side.index()].is_some() {
            return Err(PlacementError::DuplicateGeneral(side));
        }
        // 被吃的棋子仍占着槽位，PieceId 只有 u8 的空间
        if self.slots.len() > u8::MAX as usize {
            return Err(PlacementError::ArenaFull);
        }
        Ok(self.push(kind, side, square))
    }

    fn push(&mut self, kind: PieceType, side: Side, square: Square) -> PieceId {
        let id = PieceId(self.slots.len() as u8);
        self.slots.push(Slot {
            piece: Piece { kind, side, square },
            on_board: true,
        });
        self.squares[square.to_index()] = Some(id);
        if kind == PieceType::General {
            self.generals[side.index()] = Some(id);
        }
        id
    }

    #[inline]
    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    pub fn set_side_to_move(&mut self, side: Side) {
        self.side_to_move = side;
    }

    /// 获取在场棋子
    #[inline]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.on_board)
            .map(|slot| &slot.piece)
    }

    /// 某格上的棋子编号
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<PieceId> {
        if !square.is_valid() {
            return None;
        }
        self.squares[square.to_index()]
    }

    /// 某格上的棋子
    #[inline]
    pub fn piece_on(&self, square: Square) -> Option<&Piece> {
        self.piece_at(square).and_then(|id| self.piece(id))
    }

    #[inline]
    fn is_occupied(&self, square: Square) -> bool {
        self.piece_at(square).is_some()
    }

    /// 所有在场棋子，按仓库顺序
    pub fn pieces(&self) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.on_board)
            .map(|(i, slot)| (PieceId(i as u8), &slot.piece))
    }

    /// 某方在场棋子
    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.side == side)
    }

    /// 某方将/帅的位置；已被吃则为 None
    #[inline]
    pub fn general(&self, side: Side) -> Option<Square> {
        self.generals[side.index()]
            .and_then(|id| self.piece(id))
            .map(|p| p.square)
    }

    /// 伪合法性判定：只看走法几何与占位，不考虑走后是否被将军
    pub fn is_pseudo_legal_move(&self, id: PieceId, to: Square) -> bool {
        let piece = match self.piece(id) {
            Some(p) => *p,
            None => return false,
        };
        if !to.is_valid() || to == piece.square {
            return false;
        }
        if let Some(target) = self.piece_on(to) {
            if target.side == piece.side {
                return false;
            }
        }

        match piece.kind {
            PieceType::General => self.general_rule(&piece, to),
            PieceType::Advisor => self.advisor_rule(&piece, to),
            PieceType::Elephant => self.elephant_rule(&piece, to),
            PieceType::Horse => self.horse_rule(&piece, to),
            PieceType::Chariot => self.chariot_rule(&piece, to),
            PieceType::Cannon => self.cannon_rule(&piece, to),
            PieceType::Soldier => self.soldier_rule(&piece, to),
        }
    }

    fn general_rule(&self, piece: &Piece, to: Square) -> bool {
        let dx = (to.x - piece.square.x).abs();
        let dy = (to.y - piece.square.y).abs();
        to.in_palace(piece.side) && dx + dy == 1
    }

    fn advisor_rule(&self, piece: &Piece, to: Square) -> bool {
        let dx = (to.x - piece.square.x).abs();
        let dy = (to.y - piece.square.y).abs();
        to.in_palace(piece.side) && dx == 1 && dy == 1
    }

    fn elephant_rule(&self, piece: &Piece, to: Square) -> bool {
        if !to.on_own_side(piece.side) {
            return false;
        }
        let dx = to.x - piece.square.x;
        let dy = to.y - piece.square.y;
        if dx.abs() != 2 || dy.abs() != 2 {
            return false;
        }
        // 象眼
        !self.is_occupied(piece.square.offset(dx / 2, dy / 2))
    }

    fn horse_rule(&self, piece: &Piece, to: Square) -> bool {
        let dx = to.x - piece.square.x;
        let dy = to.y - piece.square.y;
        let leg = match (dx.abs(), dy.abs()) {
            (2, 1) => piece.square.offset(dx.signum(), 0),
            (1, 2) => piece.square.offset(0, dy.signum()),
            _ => return false,
        };
        !self.is_occupied(leg)
    }

    fn chariot_rule(&self, piece: &Piece, to: Square) -> bool {
        self.count_between(piece.square, to) == Some(0)
    }

    fn cannon_rule(&self, piece: &Piece, to: Square) -> bool {
        let screens = match self.count_between(piece.square, to) {
            Some(n) => n,
            None => return false,
        };
        if self.is_occupied(to) {
            screens == 1
        } else {
            screens == 0
        }
    }

    fn soldier_rule(&self, piece: &Piece, to: Square) -> bool {
        let dx = (to.x - piece.square.x).abs();
        let dy = to.y - piece.square.y;
        let forward = piece.side.forward();
        if piece.square.on_own_side(piece.side) {
            dx == 0 && dy == forward
        } else {
            (dx == 1 && dy == 0) || (dx == 0 && dy == forward)
        }
    }

    /// 同一直线上两点之间（不含端点）的棋子数；不在同一直线返回 None
    fn count_between(&self, from: Square, to: Square) -> Option<u32> {
        if from == to || (from.x != to.x && from.y != to.y) {
            return None;
        }
        let dx = (to.x - from.x).signum();
        let dy = (to.y - from.y).signum();
        let mut count = 0;
        let mut sq = from.offset(dx, dy);
        while sq != to {
            if self.is_occupied(sq) {
                count += 1;
            }
            sq = sq.offset(dx, dy);
        }
        Some(count)
    }

    /// 某棋子的全部伪合法目标格
    ///
    /// 与 [`Board::is_pseudo_legal_move`] 对全部格子逐一判定的结果一致，
    /// 只是按方向生成，避免扫描整个棋盘。
    pub fn pseudo_legal_destinations(&self, id: PieceId) -> Vec<Square> {
        let piece = match self.piece(id) {
            Some(p) => *p,
            None => return Vec::new(),
        };
        match piece.kind {
            PieceType::General => self.step_targets(&piece, &ORTHOGONAL, true),
            PieceType::Advisor => self.step_targets(&piece, &DIAGONAL, true),
            PieceType::Elephant => self.elephant_targets(&piece),
            PieceType::Horse => self.horse_targets(&piece),
            PieceType::Chariot => self.chariot_targets(&piece),
            PieceType::Cannon => self.cannon_targets(&piece),
            PieceType::Soldier => self.soldier_targets(&piece),
        }
    }

    /// 伪合法目标格数量（机动性）
    pub fn mobility(&self, id: PieceId) -> usize {
        self.pseudo_legal_destinations(id).len()
    }

    #[inline]
    fn can_land(&self, piece: &Piece, to: Square) -> bool {
        if !to.is_valid() {
            return false;
        }
        match self.piece_on(to) {
            None => true,
            Some(target) => target.side != piece.side,
        }
    }

    fn step_targets(&self, piece: &Piece, dirs: &[(i8, i8)], palace: bool) -> Vec<Square> {
        let mut moves = Vec::with_capacity(4);
        for &(dx, dy) in dirs {
            let to = piece.square.offset(dx, dy);
            if palace && !to.in_palace(piece.side) {
                continue;
            }
            if self.can_land(piece, to) {
                moves.push(to);
            }
        }
        moves
    }

    fn elephant_targets(&self, piece: &Piece) -> Vec<Square> {
        let mut moves = Vec::with_capacity(4);
        for (dx, dy) in DIAGONAL {
            let to = piece.square.offset(dx * 2, dy * 2);
            if !to.is_valid() || !to.on_own_side(piece.side) {
                continue;
            }
            if self.is_occupied(piece.square.offset(dx, dy)) {
                continue;
            }
            if self.can_land(piece, to) {
                moves.push(to);
            }
        }
        moves
    }

    fn horse_targets(&self, piece: &Piece) -> Vec<Square> {
        let mut moves = Vec::with_capacity(8);
        for ((dx, dy), (lx, ly)) in HORSE_STEPS {
            let to = piece.square.offset(dx, dy);
            if !to.is_valid() || self.is_occupied(piece.square.offset(lx, ly)) {
                continue;
            }
            if self.can_land(piece, to) {
                moves.push(to);
            }
        }
        moves
    }

    fn chariot_targets(&self, piece: &Piece) -> Vec<Square> {
        let mut moves = Vec::with_capacity(17);
        for (dx, dy) in ORTHOGONAL {
            let mut to = piece.square.offset(dx, dy);
            while to.is_valid() {
                match self.piece_on(to) {
                    None => moves.push(to),
                    Some(target) => {
                        if target.side != piece.side {
                            moves.push(to);
                        }
                        break;
                    }
                }
                to = to.offset(dx, dy);
            }
        }
        moves
    }

    fn cannon_targets(&self, piece: &Piece) -> Vec<Square> {
        let mut moves = Vec::with_capacity(17);
        for (dx, dy) in ORTHOGONAL {
            let mut to = piece.square.offset(dx, dy);
            let mut screened = false;
            while to.is_valid() {
                match self.piece_on(to) {
                    None => {
                        if !screened {
                            moves.push(to);
                        }
                    }
                    Some(target) => {
                        if !screened {
                            screened = true;
                        } else {
                            if target.side != piece.side {
                                moves.push(to);
                            }
                            break;
                        }
                    }
                }
                to = to.offset(dx, dy);
            }
        }
        moves
    }

    fn soldier_targets(&self, piece: &Piece) -> Vec<Square> {
        let mut moves = Vec::with_capacity(3);
        let forward = piece.square.offset(0, piece.side.forward());
        if self.can_land(piece, forward) {
            moves.push(forward);
        }
        if !piece.square.on_own_side(piece.side) {
            for dx in [-1, 1] {
                let to = piece.square.offset(dx, 0);
                if self.can_land(piece, to) {
                    moves.push(to);
                }
            }
        }
        moves
    }

    /// 某格是否处于 `by` 方任一棋子的伪合法吃子范围内
    pub fn is_square_attacked(&self, square: Square, by: Side) -> bool {
        self.pieces_of(by)
            .any(|(id, _)| self.is_pseudo_legal_move(id, square))
    }

    /// 某方是否被将军；将/帅已被吃视为被将军
    pub fn is_in_check(&self, side: Side) -> bool {
        match self.general(side) {
            Some(sq) => self.is_square_attacked(sq, side.opposite()),
            None => true,
        }
    }

    /// 将帅是否在同一列且中间无子
    pub fn generals_facing(&self) -> bool {
        let (red, black) = match (self.general(Side::Red), self.general(Side::Black)) {
            (Some(r), Some(b)) => (r, b),
            _ => return false,
        };
        red.x == black.x && self.count_between(red, black) == Some(0)
    }

    /// 无需搜索即可判定的终局：将帅被吃或将帅照面
    ///
    /// 照面时判上一手的走子方负，即当前行棋方胜。
    pub fn terminal_outcome(&self) -> Option<GameOutcome> {
        match (self.general(Side::Red), self.general(Side::Black)) {
            (None, Some(_)) => {
                return Some(GameOutcome {
                    winner: Side::Black,
                    reason: EndReason::GeneralCaptured,
                })
            }
            (Some(_), None) => {
                return Some(GameOutcome {
                    winner: Side::Red,
                    reason: EndReason::GeneralCaptured,
                })
            }
            _ => {}
        }
        if self.generals_facing() {
            return Some(GameOutcome {
                winner: self.side_to_move,
                reason: EndReason::FlyingGeneral,
            });
        }
        None
    }

    /// 执行走法（不记录历史），返回撤销所需信息
    ///
    /// 起点无子、终点越界或终点是己方棋子时返回 None 且不修改棋盘。
    pub fn make_move(&mut self, mv: Move) -> Option<AppliedMove> {
        let id = self.piece_at(mv.from)?;
        if !mv.to.is_valid() || mv.from == mv.to {
            return None;
        }
        let mover_side = self.slots[id.index()].piece.side;
        let captured = self.squares[mv.to.to_index()];
        if let Some(victim) = captured {
            if self.slots[victim.index()].piece.side == mover_side {
                return None;
            }
            self.slots[victim.index()].on_board = false;
        }

        self.squares[mv.from.to_index()] = None;
        self.squares[mv.to.to_index()] = Some(id);
        self.slots[id.index()].piece.square = mv.to;
        self.side_to_move = self.side_to_move.opposite();

        Some(AppliedMove {
            mv,
            piece: id,
            captured,
        })
    }

    /// 撤销 [`Board::make_move`]，必须按栈顺序调用
    pub fn unmake_move(&mut self, applied: AppliedMove) {
        let AppliedMove { mv, piece, captured } = applied;
        self.slots[piece.index()].piece.square = mv.from;
        self.squares[mv.from.to_index()] = Some(piece);
        self.squares[mv.to.to_index()] = captured;
        if let Some(victim) = captured {
            self.slots[victim.index()].on_board = true;
        }
        self.side_to_move = self.side_to_move.opposite();
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..10 {
            write!(f, "{} ", 9 - y)?;
            for x in 0..9 {
                let c = match self.piece_on(Square::new(x, y)) {
                    Some(p) if p.side == Side::Red => p.kind.to_fen_char().to_ascii_uppercase(),
                    Some(p) => p.kind.to_fen_char(),
                    None => '.',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "  abcdefghi")
    }
}
