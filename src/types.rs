//! 象棋核心类型定义
//!
//! 坐标约定：x 为列 (0-8，从左到右)，y 为行 (0-9)。
//! 黑方底线在 y = 0，红方底线在 y = 9，红方向 y 减小的方向前进。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 棋盘列数
pub const FILES: i8 = 9;
/// 棋盘行数
pub const RANKS: i8 = 10;
/// 格子总数
pub const SQUARE_COUNT: usize = 90;

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Red,
    Black,
}

impl Side {
    /// 获取对方阵营
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }

    /// 前进方向（y 的增量）
    #[inline]
    pub fn forward(self) -> i8 {
        match self {
            Side::Red => -1,
            Side::Black => 1,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Side::Red => 0,
            Side::Black => 1,
        }
    }

    /// 从 FEN 行棋方字段解析
    pub fn from_fen_str(s: &str) -> Option<Side> {
        match s {
            "w" | "r" | "red" => Some(Side::Red),
            "b" | "black" => Some(Side::Black),
            _ => None,
        }
    }

    /// 转换为 FEN 行棋方字符
    pub fn to_fen_char(self) -> char {
        match self {
            Side::Red => 'w',
            Side::Black => 'b',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Red => write!(f, "red"),
            Side::Black => write!(f, "black"),
        }
    }
}

/// 棋子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    /// 将/帅
    General,
    /// 士/仕
    Advisor,
    /// 象/相
    Elephant,
    /// 马
    Horse,
    /// 车
    Chariot,
    /// 炮
    Cannon,
    /// 卒/兵
    Soldier,
}

impl PieceType {
    pub const ALL: [PieceType; 7] = [
        PieceType::General,
        PieceType::Advisor,
        PieceType::Elephant,
        PieceType::Horse,
        PieceType::Chariot,
        PieceType::Cannon,
        PieceType::Soldier,
    ];

    /// 从 FEN 字符解析（大小写均可）
    pub fn from_fen_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'k' => Some(PieceType::General),
            'a' => Some(PieceType::Advisor),
            'e' | 'b' => Some(PieceType::Elephant),
            'h' | 'n' => Some(PieceType::Horse),
            'r' => Some(PieceType::Chariot),
            'c' => Some(PieceType::Cannon),
            'p' => Some(PieceType::Soldier),
            _ => None,
        }
    }

    /// 转换为 FEN 字符（小写）
    pub fn to_fen_char(self) -> char {
        match self {
            PieceType::General => 'k',
            PieceType::Advisor => 'a',
            PieceType::Elephant => 'e',
            PieceType::Horse => 'h',
            PieceType::Chariot => 'r',
            PieceType::Cannon => 'c',
            PieceType::Soldier => 'p',
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceType::General => "General",
            PieceType::Advisor => "Advisor",
            PieceType::Elephant => "Elephant",
            PieceType::Horse => "Horse",
            PieceType::Chariot => "Chariot",
            PieceType::Cannon => "Cannon",
            PieceType::Soldier => "Soldier",
        };
        write!(f, "{}", name)
    }
}

/// 棋盘格子 (x, y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    pub x: i8,
    pub y: i8,
}

impl Square {
    #[inline]
    pub const fn new(x: i8, y: i8) -> Self {
        Square { x, y }
    }

    /// 检查是否在棋盘范围内
    #[inline]
    pub fn is_valid(self) -> bool {
        (0..FILES).contains(&self.x) && (0..RANKS).contains(&self.y)
    }

    /// 检查是否在某方九宫内
    pub fn in_palace(self, side: Side) -> bool {
        if !(3..=5).contains(&self.x) {
            return false;
        }
        match side {
            Side::Red => (7..=9).contains(&self.y),
            Side::Black => (0..=2).contains(&self.y),
        }
    }

    /// 检查是否在某方己方半场（未过河）
    pub fn on_own_side(self, side: Side) -> bool {
        match side {
            Side::Red => self.y >= 5,
            Side::Black => self.y <= 4,
        }
    }

    #[inline]
    pub fn offset(self, dx: i8, dy: i8) -> Square {
        Square {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// 转换为数组索引（调用方保证坐标合法）
    #[inline]
    pub fn to_index(self) -> usize {
        self.y as usize * FILES as usize + self.x as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Square {
        Square {
            x: (index % FILES as usize) as i8,
            y: (index / FILES as usize) as i8,
        }
    }

    /// 遍历全部 90 个格子，x 优先
    pub fn all() -> impl Iterator<Item = Square> {
        (0..FILES).flat_map(|x| (0..RANKS).map(move |y| Square::new(x, y)))
    }

    /// 从 ICCS 坐标解析（如 "e0" 是红帅初始位置）
    pub fn from_iccs(s: &str) -> Option<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let x = match bytes[0] {
            b @ b'a'..=b'i' => (b - b'a') as i8,
            _ => return None,
        };
        let rank = match bytes[1] {
            b @ b'0'..=b'9' => (b - b'0') as i8,
            _ => return None,
        };
        Some(Square::new(x, 9 - rank))
    }

    /// 转换为 ICCS 坐标
    pub fn to_iccs(self) -> String {
        let file = (b'a' + self.x as u8) as char;
        format!("{}{}", file, 9 - self.y)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_iccs())
    }
}

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Move { from, to }
    }

    /// 从坐标直接构造
    pub const fn from_coords(from_x: i8, from_y: i8, to_x: i8, to_y: i8) -> Self {
        Move {
            from: Square::new(from_x, from_y),
            to: Square::new(to_x, to_y),
        }
    }

    /// 从 ICCS 走法字符串解析（如 "h2e2"）
    pub fn from_iccs(s: &str) -> Option<Move> {
        let s = s.trim();
        if s.len() != 4 || !s.is_ascii() {
            return None;
        }
        let from = Square::from_iccs(&s[0..2])?;
        let to = Square::from_iccs(&s[2..4])?;
        Some(Move { from, to })
    }

    pub fn to_iccs(&self) -> String {
        format!("{}{}", self.from.to_iccs(), self.to.to_iccs())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_iccs())
    }
}

/// 终局原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// 将/帅被吃
    GeneralCaptured,
    /// 将帅照面，走子方负
    FlyingGeneral,
    Checkmate,
    /// 困毙：无子可动但未被将军，同样判负
    Stalemate,
    Resignation,
}

/// 终局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winner: Side,
    pub reason: EndReason,
}
