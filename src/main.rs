//! Xiangqi engine CLI
//!
//! 命令行界面，用于调试规则与搜索
//!
//! 支持两种模式：
//! 1. 单次命令模式：每次执行一个命令
//! 2. Server 模式：长驻进程，通过 stdin/stdout 逐行收发 JSON，维护一局棋

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::time::Duration;
use xiangqi_engine::fen::STANDARD_FEN;
use xiangqi_engine::{
    Board, BoardState, Evaluator, GameEvent, GameOutcome, SearchConfig, SearchEngine,
    SearchReport, Side, Square,
};

#[derive(Parser)]
#[command(name = "xiangqi-engine")]
#[command(about = "Xiangqi rules and search engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// 搜索参数（映射到 SearchConfig）
#[derive(Args, Clone)]
struct SearchArgs {
    /// 最大搜索深度
    #[arg(long, default_value_t = 4)]
    depth: u32,

    /// 时间限制（毫秒）
    #[arg(long, default_value_t = 3000)]
    time_limit: u64,

    /// 不使用开局库
    #[arg(long)]
    no_book: bool,
}

impl SearchArgs {
    fn config(&self) -> SearchConfig {
        SearchConfig {
            max_depth: self.depth,
            time_limit: Duration::from_millis(self.time_limit),
            use_opening_book: !self.no_book,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 列出合法走法
    Moves {
        /// FEN 字符串
        #[arg(long, default_value = STANDARD_FEN)]
        fen: String,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 搜索最佳走法
    Best {
        /// FEN 字符串
        #[arg(long, default_value = STANDARD_FEN)]
        fen: String,

        #[command(flatten)]
        search: SearchArgs,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 评估局面分数（行棋方视角）
    Score {
        /// FEN 字符串
        #[arg(long, default_value = STANDARD_FEN)]
        fen: String,

        /// 打印每个棋子的评估明细
        #[arg(long)]
        breakdown: bool,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 引擎自对弈
    Play {
        /// 起始局面
        #[arg(long, default_value = STANDARD_FEN)]
        fen: String,

        #[command(flatten)]
        search: SearchArgs,

        /// 最多走多少步（半回合）
        #[arg(long, default_value_t = 120)]
        max_plies: usize,
    },

    /// 启动 server 模式（stdin/stdout 通信）
    Server {
        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(Serialize)]
struct MovesResponse {
    side_to_move: Option<Side>,
    moves: Vec<String>,
    total: usize,
}

#[derive(Serialize)]
struct BestResponse {
    #[serde(rename = "move")]
    mv: Option<String>,
    score: i32,
    depth: u32,
    nodes: u64,
    elapsed_ms: f64,
    from_book: bool,
    timed_out: bool,
}

impl From<&SearchReport> for BestResponse {
    fn from(report: &SearchReport) -> Self {
        BestResponse {
            mv: report.best_move.map(|m| m.to_iccs()),
            score: report.score,
            depth: report.depth_reached,
            nodes: report.nodes,
            elapsed_ms: report.elapsed.as_secs_f64() * 1000.0,
            from_book: report.from_book,
            timed_out: report.timed_out,
        }
    }
}

// Server 模式的请求和响应结构
#[derive(Deserialize)]
struct ServerRequest {
    cmd: String,
    #[serde(default)]
    fen: Option<String>,
    #[serde(rename = "move", default)]
    mv: Option<String>,
    #[serde(default)]
    square: Option<String>,
    #[serde(default)]
    config: Option<SearchConfig>,
}

#[derive(Serialize, Default)]
struct ServerResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    fen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    side_to_move: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<GameOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_move: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<GameEvent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    legal_moves: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hints: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    best: Option<BestResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServerResponse {
    /// 带完整对局状态的成功响应
    fn state(game: &BoardState) -> Self {
        Self {
            ok: true,
            fen: Some(game.to_fen()),
            side_to_move: game.side_to_move(),
            is_check: Some(game.is_check()),
            outcome: game.outcome(),
            last_move: game.last_move().map(|m| m.to_iccs()),
            ..Default::default()
        }
    }

    fn with_events(mut self, events: Vec<GameEvent>) -> Self {
        self.events = Some(events);
        self
    }

    fn error(msg: &str) -> Self {
        Self {
            ok: false,
            error: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    let result = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.unwrap_or_else(|e| format!("{{\"ok\":false,\"error\":\"serialization failed: {}\"}}", e))
}

fn load_board(fen: &str) -> Board {
    match Board::from_fen(fen) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Error: invalid FEN: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Moves { fen, json } => {
            let game = BoardState::from_board(load_board(&fen));
            let moves: Vec<String> = game.legal_moves().iter().map(|m| m.to_iccs()).collect();
            if json {
                let response = MovesResponse {
                    side_to_move: game.side_to_move(),
                    total: moves.len(),
                    moves,
                };
                println!("{}", to_json(&response, true));
            } else {
                println!("Legal moves ({}):", moves.len());
                for mv in &moves {
                    println!("  {}", mv);
                }
            }
        }

        Commands::Best { fen, search, json } => {
            let mut board = load_board(&fen);
            let mut engine = SearchEngine::new(search.config());
            let report = engine.search(&mut board);
            if json {
                println!("{}", to_json(&BestResponse::from(&report), true));
            } else {
                match report.best_move {
                    Some(mv) => println!("Best move: {} (score: {})", mv, report.score),
                    None => println!("No legal move"),
                }
                println!(
                    "\nStats: depth={}, nodes={}, time={:.3}s, book={}, timed_out={}",
                    report.depth_reached,
                    report.nodes,
                    report.elapsed.as_secs_f64(),
                    report.from_book,
                    report.timed_out
                );
            }
        }

        Commands::Score {
            fen,
            breakdown,
            json,
        } => {
            let game = BoardState::from_board(load_board(&fen));
            let board = game.board();
            let side = board.side_to_move();
            let evaluator = Evaluator::new();
            let score = game.evaluate(side);

            if json {
                println!(
                    "{}",
                    to_json(
                        &serde_json::json!({ "fen": fen, "side": side, "score": score }),
                        false
                    )
                );
            } else {
                let side_cn = if side == Side::Red { "红方" } else { "黑方" };
                println!("局面评估 ({} 视角): {}", side_cn, score);
                if breakdown {
                    for detail in evaluator.breakdown(board) {
                        println!(
                            "  {:<6} {:<9} material={:>5} position={:>3} mobility={:>2} threatened={:<5} value={}",
                            detail.side.to_string(),
                            detail.kind.to_string(),
                            detail.material,
                            detail.position,
                            detail.mobility,
                            detail.threatened,
                            detail.value
                        );
                    }
                }
            }
        }

        Commands::Play {
            fen,
            search,
            max_plies,
        } => {
            let mut game = BoardState::from_board(load_board(&fen));
            let mut engine = SearchEngine::new(search.config());
            run_self_play(&mut game, &mut engine, max_plies);
        }

        Commands::Server { search } => {
            run_server(search.config());
        }
    }
}

/// 自对弈：每一步都走记录历史的对局路径
fn run_self_play(game: &mut BoardState, engine: &mut SearchEngine, max_plies: usize) {
    println!("{}\n", game.board());
    for ply in 1..=max_plies {
        let report = match game.engine_search(engine) {
            Some(report) => report,
            None => break,
        };
        let mv = match report.best_move {
            Some(mv) => mv,
            None => break,
        };
        match game.apply_move(mv) {
            Ok(events) => {
                let tag = if report.from_book {
                    "book".to_string()
                } else {
                    format!("d{} {}", report.depth_reached, report.score)
                };
                println!("{:>3}. {} ({})", ply, mv, tag);
                for event in events {
                    match event {
                        GameEvent::Check { side } => println!("     {} in check", side),
                        GameEvent::GameEnded(outcome) => {
                            println!("     {} wins ({:?})", outcome.winner, outcome.reason)
                        }
                        _ => {}
                    }
                }
            }
            Err(e) => {
                eprintln!("Error: engine produced a rejected move {}: {}", mv, e);
                break;
            }
        }
    }
    println!("\n{}", game.board());
    println!("{}", game.to_fen());
    if !game.is_game_over() {
        println!("Stopped after {} plies without a result", game.history().len());
    }
}

/// Server 会话：一局棋 + 一个引擎
struct Session {
    game: BoardState,
    engine: SearchEngine,
}

impl Session {
    fn new(config: SearchConfig) -> Self {
        Session {
            game: BoardState::new(),
            engine: SearchEngine::new(config),
        }
    }

    fn handle(&mut self, request: &ServerRequest) -> ServerResponse {
        if let Some(config) = &request.config {
            self.engine.set_config(config.clone());
        }

        match request.cmd.as_str() {
            "new" => self.handle_new(request),
            "state" => {
                let mut response = ServerResponse::state(&self.game);
                response.legal_moves =
                    Some(self.game.legal_moves().iter().map(|m| m.to_iccs()).collect());
                response
            }
            "move" => match request.mv.as_deref() {
                Some(text) => match self.game.apply_iccs(text) {
                    Ok(events) => ServerResponse::state(&self.game).with_events(events),
                    Err(e) => ServerResponse::error(&e.to_string()),
                },
                None => ServerResponse::error("missing field: move"),
            },
            "undo" => {
                let events = self.game.undo();
                ServerResponse::state(&self.game).with_events(events)
            }
            "resign" => match self.game.resign() {
                Ok(events) => ServerResponse::state(&self.game).with_events(events),
                Err(e) => ServerResponse::error(&e.to_string()),
            },
            "hints" => self.handle_hints(request),
            "best" => match self.game.engine_search(&mut self.engine) {
                Some(report) => {
                    let mut response = ServerResponse::state(&self.game);
                    response.best = Some(BestResponse::from(&report));
                    response
                }
                None => ServerResponse::error("the game is already over"),
            },
            "go" => self.handle_go(),
            _ => ServerResponse::error(&format!("Unknown command: {}", request.cmd)),
        }
    }

    fn handle_new(&mut self, request: &ServerRequest) -> ServerResponse {
        match request.fen.as_deref() {
            Some(fen) => match BoardState::from_fen(fen) {
                Ok(game) => self.game = game,
                Err(e) => return ServerResponse::error(&format!("Invalid FEN: {}", e)),
            },
            None => self.game.reset(),
        }
        ServerResponse::state(&self.game)
    }

    fn handle_hints(&self, request: &ServerRequest) -> ServerResponse {
        let square = match request.square.as_deref().map(Square::from_iccs) {
            Some(Some(square)) => square,
            Some(None) => return ServerResponse::error("invalid square"),
            None => return ServerResponse::error("missing field: square"),
        };
        let mut response = ServerResponse::state(&self.game);
        response.hints = Some(
            self.game
                .legal_destinations(square)
                .iter()
                .map(|s| s.to_iccs())
                .collect(),
        );
        response
    }

    /// 引擎为当前行棋方走一步
    fn handle_go(&mut self) -> ServerResponse {
        let report = match self.game.engine_search(&mut self.engine) {
            Some(report) => report,
            None => return ServerResponse::error("the game is already over"),
        };
        let mv = match report.best_move {
            Some(mv) => mv,
            None => return ServerResponse::error("no legal move"),
        };
        match self.game.apply_move(mv) {
            Ok(events) => {
                let mut response = ServerResponse::state(&self.game).with_events(events);
                response.best = Some(BestResponse::from(&report));
                response
            }
            Err(e) => ServerResponse::error(&e.to_string()),
        }
    }
}

/// Server 模式主循环
/// 从 stdin 读取 JSON 请求，返回 JSON 响应到 stdout
fn run_server(config: SearchConfig) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut session = Session::new(config);

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        // 空行跳过
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<ServerRequest>(&line) {
            Ok(request) if request.cmd == "quit" => break,
            Ok(request) => session.handle(&request),
            Err(e) => ServerResponse::error(&format!("Invalid JSON: {}", e)),
        };

        println!("{}", to_json(&response, false));
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> ServerRequest {
        serde_json::from_str(json).unwrap()
    }

    fn quick_session() -> Session {
        Session::new(SearchConfig {
            max_depth: 1,
            time_limit: Duration::from_secs(10),
            use_opening_book: true,
        })
    }

    #[test]
    fn test_session_move_and_undo() {
        let mut session = quick_session();
        let response = session.handle(&request(r#"{"cmd": "move", "move": "h2e2"}"#));
        assert!(response.ok);
        assert_eq!(response.side_to_move, Some(Side::Black));
        assert_eq!(response.last_move.as_deref(), Some("h2e2"));
        assert_eq!(response.events.map(|e| e.len()), Some(1));

        let response = session.handle(&request(r#"{"cmd": "undo"}"#));
        assert_eq!(response.fen.as_deref(), Some(STANDARD_FEN));

        let response = session.handle(&request(r#"{"cmd": "move", "move": "a0a5"}"#));
        assert!(!response.ok);
        assert!(response.error.is_some());
    }

    #[test]
    fn test_session_hints_and_go() {
        let mut session = quick_session();
        let response = session.handle(&request(r#"{"cmd": "hints", "square": "h2"}"#));
        let hints = response.hints.unwrap();
        assert!(hints.contains(&"e2".to_string()));

        let response = session.handle(&request(r#"{"cmd": "go"}"#));
        assert!(response.ok);
        assert_eq!(response.last_move.as_deref(), Some("h2e2"));
        assert_eq!(response.best.map(|b| b.from_book), Some(true));
    }

    #[test]
    fn test_session_new_with_fen_and_resign() {
        let mut session = quick_session();
        let response = session.handle(&request(
            r#"{"cmd": "new", "fen": "4k4/8R/9/9/9/R8/9/9/9/3K5 w", "config": {"max_depth": 2, "use_opening_book": false}}"#,
        ));
        assert!(response.ok);
        assert_eq!(session.engine.config().max_depth, 2);

        let response = session.handle(&request(r#"{"cmd": "go"}"#));
        assert_eq!(response.last_move.as_deref(), Some("a4a9"));
        assert!(response.outcome.is_some());

        let response = session.handle(&request(r#"{"cmd": "resign"}"#));
        assert!(!response.ok);

        let response = session.handle(&request(r#"{"cmd": "new", "fen": "bad"}"#));
        assert!(!response.ok);
    }
}
