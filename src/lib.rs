//! Xiangqi rules and search engine
//!
//! 中国象棋规则引擎 + 搜索引擎 - 支持 FEN 输入输出

pub mod board;
pub mod book;
pub mod error;
pub mod eval;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod search;
pub mod test_positions;
pub mod types;

pub use board::{AppliedMove, Board, Piece, PieceId};
pub use book::{BookMove, OpeningBook};
pub use error::{FenError, MoveError, PlacementError};
pub use eval::{material_value, Evaluator, PieceEval, CHECK_BONUS, MATE_SCORE};
pub use game::{BoardState, GameEvent, GameStatus, HistoryEntry};
pub use search::{SearchConfig, SearchEngine, SearchReport, SearchState};
pub use types::{EndReason, GameOutcome, Move, PieceType, Side, Square};
