//! 对局状态（记录历史的走子路径）
//!
//! [`BoardState`] 持有私有的 [`Board`]、行棋方、将军/终局标志和对局历史。
//! 真实对局的走子、悔棋、认输都经过这里，并以 [`GameEvent`] 的形式
//! 把状态变化交给界面层。搜索只拿到 `&mut Board`，碰不到历史。

use crate::board::{AppliedMove, Board, Piece};
use crate::error::{FenError, MoveError};
use crate::eval::Evaluator;
use crate::search::{SearchEngine, SearchReport};
use crate::types::{EndReason, GameOutcome, Move, Side, Square};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// 对局层发出的通知
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    MoveApplied { mv: Move, capture: bool },
    /// `side` 被将军
    Check { side: Side },
    GameEnded(GameOutcome),
    MoveUndone { mv: Move },
    Resigned { side: Side },
}

/// 行棋方、将军标志与终局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatus {
    /// 终局后为 None
    pub side_to_move: Option<Side>,
    pub is_check: bool,
    pub outcome: Option<GameOutcome>,
}

impl GameStatus {
    /// 轮到 `board` 的行棋方时的状态，按优先级判定终局：
    /// 将帅被吃、照面、将死、困毙
    fn assess(board: &mut Board) -> GameStatus {
        if let Some(outcome) = board.terminal_outcome() {
            return GameStatus {
                side_to_move: None,
                is_check: false,
                outcome: Some(outcome),
            };
        }

        let side = board.side_to_move();
        let is_check = board.is_in_check(side);
        if !board.has_any_legal_move(side) {
            let reason = if is_check {
                EndReason::Checkmate
            } else {
                EndReason::Stalemate
            };
            return GameStatus {
                side_to_move: None,
                is_check,
                outcome: Some(GameOutcome {
                    winner: side.opposite(),
                    reason,
                }),
            };
        }

        GameStatus {
            side_to_move: Some(side),
            is_check,
            outcome: None,
        }
    }
}

/// 历史记录；每条都带着执行前的状态，悔棋时原样恢复
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    Move { applied: AppliedMove, prior: GameStatus },
    Resign { side: Side, prior: GameStatus },
}

/// 一局棋
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    board: Board,
    status: GameStatus,
    history: Vec<HistoryEntry>,
}

impl BoardState {
    /// 标准开局
    pub fn new() -> Self {
        BoardState::from_board(Board::standard())
    }

    /// 从任意局面开始一局
    pub fn from_board(mut board: Board) -> Self {
        let status = GameStatus::assess(&mut board);
        BoardState {
            board,
            status,
            history: Vec::new(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Board::from_fen(fen).map(BoardState::from_board)
    }

    /// 重新开始（标准开局，清空历史）
    pub fn reset(&mut self) {
        *self = BoardState::new();
        debug!("game reset");
    }

    // ========== 查询 ==========

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.board.pieces().map(|(_, p)| p)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn side_to_move(&self) -> Option<Side> {
        self.status.side_to_move
    }

    pub fn is_check(&self) -> bool {
        self.status.is_check
    }

    pub fn is_game_over(&self) -> bool {
        self.status.outcome.is_some()
    }

    pub fn winner(&self) -> Option<Side> {
        self.status.outcome.map(|o| o.winner)
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.status.outcome
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// 最近一步棋盘走法（跳过认输记录）
    pub fn last_move(&self) -> Option<Move> {
        self.history.iter().rev().find_map(|entry| match entry {
            HistoryEntry::Move { applied, .. } => Some(applied.mv),
            HistoryEntry::Resign { .. } => None,
        })
    }

    pub fn to_fen(&self) -> String {
        self.board.to_fen()
    }

    /// 当前行棋方走 `mv` 是否合法；终局后恒为 false
    pub fn is_legal_move(&self, mv: Move) -> bool {
        self.check_move(mv).is_ok()
    }

    /// 某格棋子的合法落点（走法提示）；不是当前行棋方的棋子时为空
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let side = match self.status.side_to_move {
            Some(side) => side,
            None => return Vec::new(),
        };
        let id = match self.board.piece_at(from) {
            Some(id) => id,
            None => return Vec::new(),
        };
        if self.board.piece(id).map(|p| p.side) != Some(side) {
            return Vec::new();
        }
        let mut scratch = self.board.clone();
        scratch.legal_destinations(id)
    }

    /// 当前行棋方全部合法走法
    pub fn legal_moves(&self) -> Vec<Move> {
        match self.status.side_to_move {
            Some(side) => self.board.clone().generate_legal_moves(side),
            None => Vec::new(),
        }
    }

    /// 从 `perspective` 方视角的评估；已终局（含将死、困毙、认输）时为 ±MATE_SCORE
    pub fn evaluate(&self, perspective: Side) -> i32 {
        let evaluator = Evaluator::new();
        match self.status.outcome {
            Some(outcome) => evaluator.outcome_score(outcome, perspective),
            None => evaluator.evaluate(&self.board, perspective),
        }
    }

    // ========== 命令 ==========

    /// 校验走法，返回拒绝原因
    fn check_move(&self, mv: Move) -> Result<(), MoveError> {
        let side = self.status.side_to_move.ok_or(MoveError::GameOver)?;
        let id = self
            .board
            .piece_at(mv.from)
            .ok_or(MoveError::NoPiece(mv.from))?;
        let piece = self.board.piece(id).ok_or(MoveError::NoPiece(mv.from))?;
        if piece.side != side {
            return Err(MoveError::NotSideToMove(mv.from));
        }
        if !self.board.is_pseudo_legal_move(id, mv.to) {
            return Err(MoveError::Illegal {
                from: mv.from,
                to: mv.to,
            });
        }
        if !self.board.clone().is_legal_move(mv) {
            return Err(MoveError::LeavesGeneralInCheck {
                from: mv.from,
                to: mv.to,
            });
        }
        Ok(())
    }

    /// 执行一步真实走法
    ///
    /// 走法写入历史并重新判定将军与终局。被拒绝时局面不变。
    pub fn apply_move(&mut self, mv: Move) -> Result<Vec<GameEvent>, MoveError> {
        self.check_move(mv)?;
        let applied = self.board.make_move(mv).ok_or(MoveError::Illegal {
            from: mv.from,
            to: mv.to,
        })?;

        let prior = self.status;
        self.status = GameStatus::assess(&mut self.board);
        self.history.push(HistoryEntry::Move { applied, prior });

        let capture = applied.captured.is_some();
        info!("move {}{}", mv, if capture { " (capture)" } else { "" });
        let mut events = vec![GameEvent::MoveApplied { mv, capture }];

        if self.status.is_check {
            let checked = self.board.side_to_move();
            debug!("{} is in check", checked);
            events.push(GameEvent::Check { side: checked });
        }
        if let Some(outcome) = self.status.outcome {
            info!("game over: {} wins by {:?}", outcome.winner, outcome.reason);
            events.push(GameEvent::GameEnded(outcome));
        }
        Ok(events)
    }

    /// 解析 ICCS 走法（如 "h2e2"）后执行
    pub fn apply_iccs(&mut self, text: &str) -> Result<Vec<GameEvent>, MoveError> {
        let mv = Move::from_iccs(text).ok_or_else(|| MoveError::Parse(text.to_string()))?;
        self.apply_move(mv)
    }

    /// 悔一步（走法或认输）；历史为空时什么也不做
    pub fn undo(&mut self) -> Vec<GameEvent> {
        match self.history.pop() {
            Some(HistoryEntry::Move { applied, prior }) => {
                self.board.unmake_move(applied);
                self.status = prior;
                debug!("undo {}", applied.mv);
                vec![GameEvent::MoveUndone { mv: applied.mv }]
            }
            Some(HistoryEntry::Resign { side, prior }) => {
                self.status = prior;
                debug!("{} takes back the resignation", side);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// 当前行棋方认输
    pub fn resign(&mut self) -> Result<Vec<GameEvent>, MoveError> {
        let side = self.status.side_to_move.ok_or(MoveError::GameOver)?;
        let outcome = GameOutcome {
            winner: side.opposite(),
            reason: EndReason::Resignation,
        };
        self.history.push(HistoryEntry::Resign {
            side,
            prior: self.status,
        });
        self.status = GameStatus {
            side_to_move: None,
            is_check: self.status.is_check,
            outcome: Some(outcome),
        };
        info!("{} resigns", side);
        Ok(vec![
            GameEvent::Resigned { side },
            GameEvent::GameEnded(outcome),
        ])
    }

    /// 让引擎为当前行棋方搜索（不执行）；终局后为 None
    pub fn engine_search(&mut self, engine: &mut SearchEngine) -> Option<SearchReport> {
        if self.is_game_over() {
            return None;
        }
        Some(engine.search(&mut self.board))
    }

    /// 引擎选择的走法（不执行）
    pub fn engine_move(&mut self, engine: &mut SearchEngine) -> Option<Move> {
        self.engine_search(engine).and_then(|report| report.best_move)
    }
}

impl Default for BoardState {
    fn default() -> Self {
        BoardState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MATE_SCORE;
    use crate::search::SearchConfig;
    use crate::test_positions::MATE_2;
    use crate::types::PieceType;
    use rand::prelude::*;
    use std::time::Duration;

    fn sq(x: i8, y: i8) -> Square {
        Square::new(x, y)
    }

    #[test]
    fn test_new_game() {
        let game = BoardState::new();
        assert_eq!(game.side_to_move(), Some(Side::Red));
        assert!(!game.is_check());
        assert!(!game.is_game_over());
        assert_eq!(game.winner(), None);
        assert_eq!(game.pieces().count(), 32);
        assert_eq!(game.legal_moves().len(), 44);
        assert_eq!(game.last_move(), None);
    }

    #[test]
    fn test_apply_and_undo_capture() {
        let mut game = BoardState::new();
        let before = game.clone();

        // 炮二进七打马：隔着黑炮
        let events = game.apply_iccs("b2b9").unwrap();
        assert_eq!(
            events[0],
            GameEvent::MoveApplied {
                mv: Move::from_coords(1, 7, 1, 0),
                capture: true
            }
        );
        assert_eq!(game.side_to_move(), Some(Side::Black));
        assert_eq!(game.pieces().count(), 31);
        assert_eq!(game.last_move(), Some(Move::from_coords(1, 7, 1, 0)));
        assert_eq!(game.history().len(), 1);

        let events = game.undo();
        assert_eq!(
            events,
            vec![GameEvent::MoveUndone {
                mv: Move::from_coords(1, 7, 1, 0)
            }]
        );
        assert_eq!(game, before);
        // 空历史悔棋无操作
        assert!(game.undo().is_empty());
        assert_eq!(game, before);
    }

    #[test]
    fn test_rejected_moves_leave_state_untouched() {
        let mut game = BoardState::new();
        let before = game.clone();

        assert_eq!(
            game.apply_move(Move::from_coords(4, 5, 4, 4)),
            Err(MoveError::NoPiece(sq(4, 5)))
        );
        assert_eq!(
            game.apply_move(Move::from_coords(0, 0, 0, 1)),
            Err(MoveError::NotSideToMove(sq(0, 0)))
        );
        // 车被己方兵挡住
        assert_eq!(
            game.apply_move(Move::from_coords(0, 9, 0, 4)),
            Err(MoveError::Illegal {
                from: sq(0, 9),
                to: sq(0, 4)
            })
        );
        assert_eq!(
            game.apply_iccs("zz"),
            Err(MoveError::Parse("zz".to_string()))
        );
        assert!(!game.is_legal_move(Move::from_coords(0, 9, 0, 4)));
        assert_eq!(game, before);
    }

    #[test]
    fn test_pinned_piece_rejected() {
        let mut board = Board::empty(Side::Black);
        board.place(PieceType::General, Side::Red, sq(4, 9)).unwrap();
        board.place(PieceType::General, Side::Black, sq(4, 0)).unwrap();
        board.place(PieceType::Horse, Side::Black, sq(4, 2)).unwrap();
        board.place(PieceType::Chariot, Side::Red, sq(4, 6)).unwrap();
        board.place(PieceType::Soldier, Side::Black, sq(0, 3)).unwrap();
        let mut game = BoardState::from_board(board);

        assert_eq!(
            game.apply_move(Move::from_coords(4, 2, 3, 4)),
            Err(MoveError::LeavesGeneralInCheck {
                from: sq(4, 2),
                to: sq(3, 4)
            })
        );
        assert!(game.legal_destinations(sq(4, 2)).is_empty());
        assert!(!game.legal_destinations(sq(0, 3)).is_empty());
        // 红方棋子不给黑方提示
        assert!(game.legal_destinations(sq(4, 6)).is_empty());
    }

    #[test]
    fn test_checkmate_ends_game() {
        let mut board = Board::empty(Side::Red);
        board.place(PieceType::General, Side::Red, sq(3, 9)).unwrap();
        board.place(PieceType::General, Side::Black, sq(4, 0)).unwrap();
        board.place(PieceType::Chariot, Side::Red, sq(8, 1)).unwrap();
        board.place(PieceType::Chariot, Side::Red, sq(0, 5)).unwrap();
        let mut game = BoardState::from_board(board);

        let events = game.apply_move(Move::from_coords(0, 5, 0, 0)).unwrap();
        let outcome = GameOutcome {
            winner: Side::Red,
            reason: EndReason::Checkmate,
        };
        assert_eq!(
            events,
            vec![
                GameEvent::MoveApplied {
                    mv: Move::from_coords(0, 5, 0, 0),
                    capture: false
                },
                GameEvent::Check { side: Side::Black },
                GameEvent::GameEnded(outcome),
            ]
        );
        assert!(game.is_game_over());
        assert!(game.is_check());
        assert_eq!(game.winner(), Some(Side::Red));
        assert_eq!(game.side_to_move(), None);

        // 终局后拒绝一切命令
        assert_eq!(
            game.apply_move(Move::from_coords(4, 0, 5, 0)),
            Err(MoveError::GameOver)
        );
        assert_eq!(game.resign(), Err(MoveError::GameOver));
        assert!(game.legal_moves().is_empty());
        let mut engine = SearchEngine::default();
        assert_eq!(game.engine_move(&mut engine), None);

        game.undo();
        assert!(!game.is_game_over());
        assert_eq!(game.side_to_move(), Some(Side::Red));
    }

    #[test]
    fn test_flying_general_loses_for_mover() {
        let mut board = Board::empty(Side::Red);
        board.place(PieceType::General, Side::Red, sq(4, 9)).unwrap();
        board.place(PieceType::General, Side::Black, sq(4, 0)).unwrap();
        board.place(PieceType::Horse, Side::Red, sq(4, 5)).unwrap();
        board.place(PieceType::Soldier, Side::Black, sq(0, 3)).unwrap();
        let mut game = BoardState::from_board(board);

        let events = game.apply_move(Move::from_coords(4, 5, 2, 4)).unwrap();
        let outcome = GameOutcome {
            winner: Side::Black,
            reason: EndReason::FlyingGeneral,
        };
        assert_eq!(events.last(), Some(&GameEvent::GameEnded(outcome)));
        assert!(!game.is_check());
        assert_eq!(game.winner(), Some(Side::Black));
    }

    #[test]
    fn test_stalemate_is_a_loss() {
        let mut board = Board::empty(Side::Red);
        board.place(PieceType::General, Side::Red, sq(4, 9)).unwrap();
        board.place(PieceType::General, Side::Black, sq(4, 0)).unwrap();
        board.place(PieceType::Chariot, Side::Red, sq(3, 5)).unwrap();
        board.place(PieceType::Chariot, Side::Red, sq(6, 5)).unwrap();
        board.place(PieceType::Soldier, Side::Red, sq(4, 2)).unwrap();
        let mut game = BoardState::from_board(board);
        assert!(!game.is_game_over());

        let events = game.apply_move(Move::from_coords(6, 5, 5, 5)).unwrap();
        assert!(!game.is_check());
        assert_eq!(
            game.outcome(),
            Some(GameOutcome {
                winner: Side::Red,
                reason: EndReason::Stalemate
            })
        );
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Check { .. })));
    }

    #[test]
    fn test_resign_and_take_back() {
        let mut game = BoardState::new();
        game.apply_iccs("h2e2").unwrap();
        let before = game.clone();

        let events = game.resign().unwrap();
        assert_eq!(events[0], GameEvent::Resigned { side: Side::Black });
        assert_eq!(game.winner(), Some(Side::Red));
        assert_eq!(game.last_move(), Some(Move::from_coords(7, 7, 4, 7)));

        assert!(game.undo().is_empty());
        assert_eq!(game, before);
    }

    #[test]
    fn test_engine_move_does_not_touch_history() {
        let mut game = BoardState::new();
        game.apply_iccs("h2e2").unwrap();
        let before = game.clone();

        let mut engine = SearchEngine::new(SearchConfig {
            max_depth: 2,
            time_limit: Duration::from_secs(60),
            use_opening_book: false,
        });
        let mv = game.engine_move(&mut engine).unwrap();
        assert_eq!(game, before);
        assert!(game.is_legal_move(mv));
        game.apply_move(mv).unwrap();
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn test_evaluate_scores_recorded_outcome() {
        // 黑方已被将死，棋盘上将帅都还在
        let game = BoardState::from_fen(MATE_2).unwrap();
        assert_eq!(game.winner(), Some(Side::Red));
        assert_eq!(game.evaluate(Side::Red), MATE_SCORE);
        assert_eq!(game.evaluate(Side::Black), -MATE_SCORE);

        let mut game = BoardState::new();
        let opening = game.evaluate(Side::Red);
        game.resign().unwrap();
        assert_eq!(game.evaluate(Side::Black), MATE_SCORE);
        assert_eq!(game.evaluate(Side::Red), -MATE_SCORE);

        game.undo();
        assert_eq!(game.evaluate(Side::Red), opening);
    }

    #[test]
    fn test_random_playout_undo_restores_state() {
        for seed in 0..8u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut game = BoardState::new();
            let mut snapshots = Vec::new();

            for _ in 0..60 {
                let moves = game.legal_moves();
                let mv = match moves.choose(&mut rng) {
                    Some(&mv) => mv,
                    None => break,
                };
                snapshots.push(game.clone());
                game.apply_move(mv).unwrap();
            }
            assert_eq!(game.history().len(), snapshots.len());

            while let Some(snapshot) = snapshots.pop() {
                assert!(!game.undo().is_empty(), "seed {}", seed);
                assert_eq!(game, snapshot, "seed {}", seed);
            }
            assert!(game.undo().is_empty());
            assert_eq!(game, BoardState::new());
        }
    }
}
