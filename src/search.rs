//! 迭代加深 Minimax 搜索（Alpha-Beta 剪枝 + 时间限制 + 开局库）
//!
//! 搜索只接触 [`Board`] 上不记录历史的走子路径，返回前棋盘完全复原。
//! 分数始终从根节点行棋方（最大化方）视角计算。

use crate::board::Board;
use crate::book::OpeningBook;
use crate::eval::{material_value, Evaluator};
use crate::types::{Move, PieceType, Side};
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::time::{Duration, Instant};

/// 无走法节点的分数（超过任何终局分）
pub const INFINITY: i32 = i32::MAX;

/// 搜索配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 最大迭代深度
    pub max_depth: u32,
    /// 每步思考时间
    #[serde(rename = "time_limit_ms", with = "millis")]
    pub time_limit: Duration,
    /// 是否先查开局库
    pub use_opening_book: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_depth: 4,
            time_limit: Duration::from_millis(3000),
            use_opening_book: true,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// 搜索状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Searching,
    Done,
}

/// 一次搜索的结果
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub best_move: Option<Move>,
    /// 最后一个完整深度下最佳走法的分数
    pub score: i32,
    /// 最后一个完整搜索的深度（开局库命中时为 0）
    pub depth_reached: u32,
    pub nodes: u64,
    pub elapsed: Duration,
    pub from_book: bool,
    /// 是否因超时放弃了某一层
    pub timed_out: bool,
}

/// 搜索引擎
///
/// `search` 需要 `&mut self` 与 `&mut Board`，同一引擎或同一棋盘上的搜索
/// 不可能重入。
pub struct SearchEngine {
    config: SearchConfig,
    book: OpeningBook,
    evaluator: Evaluator,
    state: SearchState,
    nodes: u64,
    deadline: Option<Instant>,
    maximizing: Side,
    aborted: bool,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        SearchEngine {
            config,
            book: OpeningBook::standard(),
            evaluator: Evaluator::new(),
            state: SearchState::Idle,
            nodes: 0,
            deadline: None,
            maximizing: Side::Red,
            aborted: false,
        }
    }

    /// 替换开局库
    pub fn with_book(mut self, book: OpeningBook) -> Self {
        self.book = book;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// 最近一次搜索访问的节点数
    pub fn node_count(&self) -> u64 {
        self.nodes
    }

    /// 为当前行棋方选择走法；无合法走法时返回 None
    pub fn get_best_move(&mut self, board: &mut Board) -> Option<Move> {
        self.search(board).best_move
    }

    /// 完整搜索流程：开局库 → 生成并排序走法 → 迭代加深
    pub fn search(&mut self, board: &mut Board) -> SearchReport {
        let start = Instant::now();
        self.state = SearchState::Searching;
        self.nodes = 0;
        self.aborted = false;
        self.deadline = start.checked_add(self.config.time_limit);
        self.maximizing = board.side_to_move();

        let mut report = SearchReport {
            best_move: None,
            score: 0,
            depth_reached: 0,
            nodes: 0,
            elapsed: Duration::ZERO,
            from_book: false,
            timed_out: false,
        };

        if self.config.use_opening_book {
            if let Some(mv) = self.book.probe(board) {
                info!("opening book move {} for {}", mv, self.maximizing);
                report.best_move = Some(mv);
                report.from_book = true;
                return self.finish(report, start);
            }
        }

        let mut moves = board.generate_legal_moves(self.maximizing);
        if moves.is_empty() {
            debug!("{} has no legal move", self.maximizing);
            return self.finish(report, start);
        }
        self.order_moves(board, &mut moves);

        let mut best_move = moves[0];
        let mut best_score = -INFINITY;

        for depth in 1..=self.config.max_depth.max(1) {
            let mut alpha = -INFINITY;
            let beta = INFINITY;
            let mut depth_best: Option<(Move, i32)> = None;
            let mut completed = true;

            for &mv in &moves {
                // 第一层总是完整搜索，保证有可用的走法
                if depth > 1 && self.deadline_passed() {
                    completed = false;
                    break;
                }
                let applied = match board.make_move(mv) {
                    Some(applied) => applied,
                    None => continue,
                };
                let score = self.minimax(board, depth - 1, alpha, beta);
                board.unmake_move(applied);

                if self.aborted {
                    completed = false;
                    break;
                }
                trace!("depth {} move {} score {}", depth, mv, score);

                if depth_best.map_or(true, |(_, best)| score > best) {
                    depth_best = Some((mv, score));
                }
                alpha = alpha.max(score);
            }

            if !completed {
                debug!(
                    "depth {} abandoned on deadline, keeping {} ({})",
                    depth, best_move, best_score
                );
                report.timed_out = true;
                break;
            }

            if let Some((mv, score)) = depth_best {
                best_move = mv;
                best_score = score;
                report.depth_reached = depth;
            }
            debug!(
                "depth {} best {} score {} nodes {}",
                depth, best_move, best_score, self.nodes
            );
        }

        report.best_move = Some(best_move);
        report.score = best_score;
        self.finish(report, start)
    }

    fn finish(&mut self, mut report: SearchReport, start: Instant) -> SearchReport {
        report.nodes = self.nodes;
        report.elapsed = start.elapsed();
        self.state = SearchState::Done;
        if let Some(mv) = report.best_move {
            info!(
                "search done: {} score {} depth {} nodes {} in {:?}",
                mv, report.score, report.depth_reached, report.nodes, report.elapsed
            );
        }
        report
    }

    #[inline]
    fn deadline_passed(&self) -> bool {
        self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    /// Minimax + Alpha-Beta
    ///
    /// 超时后仍返回当前局面的静态评估，但会置 `aborted`，调用方丢弃这一层结果。
    fn minimax(&mut self, board: &mut Board, depth: u32, mut alpha: i32, mut beta: i32) -> i32 {
        self.nodes += 1;

        if depth == 0 || board.terminal_outcome().is_some() {
            return self.evaluator.evaluate(board, self.maximizing);
        }
        if self.deadline_passed() {
            self.aborted = true;
            return self.evaluator.evaluate(board, self.maximizing);
        }

        let side = board.side_to_move();
        let maximizing = side == self.maximizing;
        let moves = board.generate_legal_moves(side);

        // 无子可动即判负，不区分将死与困毙
        if moves.is_empty() {
            return if maximizing { -INFINITY } else { INFINITY };
        }

        if maximizing {
            let mut best = -INFINITY;
            for mv in moves {
                let applied = match board.make_move(mv) {
                    Some(applied) => applied,
                    None => continue,
                };
                let score = self.minimax(board, depth - 1, alpha, beta);
                board.unmake_move(applied);

                best = best.max(score);
                alpha = alpha.max(score);
                if beta <= alpha || self.aborted {
                    break;
                }
            }
            best
        } else {
            let mut best = INFINITY;
            for mv in moves {
                let applied = match board.make_move(mv) {
                    Some(applied) => applied,
                    None => continue,
                };
                let score = self.minimax(board, depth - 1, alpha, beta);
                board.unmake_move(applied);

                best = best.min(score);
                beta = beta.min(score);
                if beta <= alpha || self.aborted {
                    break;
                }
            }
            best
        }
    }

    /// 按启发分降序排序，同分保持原顺序
    fn order_moves(&self, board: &mut Board, moves: &mut Vec<Move>) {
        let mut scored: Vec<(i32, Move)> = moves
            .iter()
            .map(|&mv| (order_score(board, mv), mv))
            .collect();
        scored.sort_by_key(|&(score, _)| Reverse(score));
        *moves = scored.into_iter().map(|(_, mv)| mv).collect();
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        SearchEngine::new(SearchConfig::default())
    }
}

/// 排序用的粗略子力（子力价值的十分之一）
fn order_value(kind: PieceType) -> i32 {
    material_value(kind) / 10
}

/// 走法排序启发分：吃子（小吃大额外加分）、落在中路、前进、把受威胁的子走到安全处
pub fn order_score(board: &mut Board, mv: Move) -> i32 {
    let piece = match board.piece_on(mv.from) {
        Some(p) => *p,
        None => return 0,
    };
    let opponent = piece.side.opposite();
    let mut score = 0;

    if let Some(victim) = board.piece_on(mv.to) {
        let victim_value = order_value(victim.kind);
        let attacker_value = order_value(piece.kind);
        score += victim_value * 10;
        if attacker_value < victim_value {
            score += (victim_value - attacker_value) * 5;
        }
    }

    if (3..=5).contains(&mv.to.x) {
        score += 10;
    }

    if (mv.to.y - mv.from.y) * piece.side.forward() > 0 {
        score += 5;
    }

    if board.is_square_attacked(mv.from, opponent) {
        if let Some(applied) = board.make_move(mv) {
            let safe = !board.is_square_attacked(mv.to, opponent);
            board.unmake_move(applied);
            if safe {
                score += 50;
            }
        }
    }

    score
}
