//! 错误类型
//!
//! 查询接口只返回 bool / Option；只有会修改局面的命令返回这些错误。
//! 返回 Err 时局面保证未被修改。

use crate::types::{Side, Square};

/// 摆子错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("square ({x}, {y}) is outside the board")]
    OutOfBounds { x: i8, y: i8 },

    #[error("square {0} is already occupied")]
    Occupied(Square),

    #[error("{0} already has a general")]
    DuplicateGeneral(Side),

    #[error("no free piece slot left on the board")]
    ArenaFull,
}

/// FEN 解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("missing FEN field: {0}")]
    Missing(&'static str),

    #[error("expected 10 rows, got {0}")]
    RowCount(usize),

    #[error("row {row} covers {width} files, expected 9")]
    RowWidth { row: usize, width: usize },

    #[error("unknown piece letter '{0}'")]
    UnknownPiece(char),

    #[error("unknown side to move '{0}'")]
    UnknownSide(String),

    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// 走子被拒绝的原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("the game is already over")]
    GameOver,

    #[error("no piece on {0}")]
    NoPiece(Square),

    #[error("the piece on {0} does not belong to the side to move")]
    NotSideToMove(Square),

    #[error("{from}{to} breaks the movement rules")]
    Illegal { from: Square, to: Square },

    #[error("{from}{to} leaves the own general in check")]
    LeavesGeneralInCheck { from: Square, to: Square },

    #[error("cannot parse move '{0}'")]
    Parse(String),
}
