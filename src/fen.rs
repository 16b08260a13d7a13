//! FEN 解析和生成
//!
//! 格式: `<棋盘> <行棋方> [其余字段忽略]`
//!
//! 棋盘从黑方底线 (y = 0) 写到红方底线 (y = 9)，行之间用 `/` 分隔：
//! - 红方：K(帅) A(仕) E(相) H(马) R(车) C(炮) P(兵)，输入也接受 B(相) N(马)
//! - 黑方：对应的小写字母
//! - 空格：数字 (1-9)
//!
//! 行棋方：`w` / `r` 为红方，`b` 为黑方。

use crate::board::Board;
use crate::error::FenError;
use crate::types::{PieceType, Side, Square, FILES, RANKS};

/// 标准开局
pub const STANDARD_FEN: &str = "rheakaehr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RHEAKAEHR w";

impl Board {
    /// 从 FEN 构造棋盘
    pub fn from_fen(fen: &str) -> Result<Board, FenError> {
        let mut parts = fen.split_whitespace();
        let board_str = parts.next().ok_or(FenError::Missing("board"))?;
        let side_str = parts.next().ok_or(FenError::Missing("side to move"))?;
        let side = Side::from_fen_str(side_str)
            .ok_or_else(|| FenError::UnknownSide(side_str.to_string()))?;

        let rows: Vec<&str> = board_str.split('/').collect();
        if rows.len() != RANKS as usize {
            return Err(FenError::RowCount(rows.len()));
        }

        let mut board = Board::empty(side);
        for (row, row_str) in rows.iter().enumerate() {
            let mut width = 0usize;
            for ch in row_str.chars() {
                if let Some(run) = ch.to_digit(10) {
                    width += run as usize;
                    continue;
                }
                let kind = PieceType::from_fen_char(ch).ok_or(FenError::UnknownPiece(ch))?;
                if width >= FILES as usize {
                    return Err(FenError::RowWidth {
                        row,
                        width: width + 1,
                    });
                }
                let side = if ch.is_ascii_uppercase() {
                    Side::Red
                } else {
                    Side::Black
                };
                board.place(kind, side, Square::new(width as i8, row as i8))?;
                width += 1;
            }
            if width != FILES as usize {
                return Err(FenError::RowWidth { row, width });
            }
        }
        Ok(board)
    }

    /// 生成 FEN（只含棋盘与行棋方）
    pub fn to_fen(&self) -> String {
        let mut rows = Vec::with_capacity(RANKS as usize);
        for y in 0..RANKS {
            let mut row = String::new();
            let mut empty = 0;
            for x in 0..FILES {
                match self.piece_on(Square::new(x, y)) {
                    Some(piece) => {
                        if empty > 0 {
                            row.push_str(&empty.to_string());
                            empty = 0;
                        }
                        let ch = piece.kind.to_fen_char();
                        row.push(match piece.side {
                            Side::Red => ch.to_ascii_uppercase(),
                            Side::Black => ch,
                        });
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }
        format!("{} {}", rows.join("/"), self.side_to_move().to_fen_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlacementError;
    use crate::types::Move;

    #[test]
    fn test_standard_fen_matches_layout() {
        let board = Board::from_fen(STANDARD_FEN).unwrap();
        let standard = Board::standard();
        for square in Square::all() {
            assert_eq!(board.piece_on(square), standard.piece_on(square), "{}", square);
        }
        assert_eq!(board.side_to_move(), Side::Red);
        assert_eq!(standard.to_fen(), STANDARD_FEN);
    }

    #[test]
    fn test_aliases_and_extra_fields() {
        let fen = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR r - - 0 1";
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(board.to_fen(), STANDARD_FEN);
        assert_eq!(
            board.piece_on(Square::new(1, 9)).map(|p| p.kind),
            Some(PieceType::Horse)
        );
    }

    #[test]
    fn test_fen_after_move() {
        let mut board = Board::standard();
        board.make_move(Move::from_coords(7, 7, 4, 7)).unwrap();
        let fen = board.to_fen();
        assert_eq!(
            fen,
            "rheakaehr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C4/9/RHEAKAEHR b"
        );
        assert_eq!(Board::from_fen(&fen).unwrap().to_fen(), fen);
    }

    #[test]
    fn test_rejects_bad_fen() {
        assert_eq!(Board::from_fen(""), Err(FenError::Missing("board")));
        assert_eq!(
            Board::from_fen("4k4/9/9/9/9/9/9/9/9/4K4"),
            Err(FenError::Missing("side to move"))
        );
        assert_eq!(
            Board::from_fen("4k4/9/9/9/9/9/9/9/4K4 w"),
            Err(FenError::RowCount(9))
        );
        assert_eq!(
            Board::from_fen("4k4/9/9/9/9/9/9/9/9/4K3 w"),
            Err(FenError::RowWidth { row: 9, width: 8 })
        );
        assert_eq!(
            Board::from_fen("4k5/9/9/9/9/9/9/9/9/4K4 w"),
            Err(FenError::RowWidth { row: 0, width: 10 })
        );
        assert_eq!(
            Board::from_fen("4k4/9/9/9/9/9/9/9/9/4K4R w"),
            Err(FenError::RowWidth { row: 9, width: 10 })
        );
        assert_eq!(
            Board::from_fen("4k4/9/9/9/9/9/9/9/9/4X4 w"),
            Err(FenError::UnknownPiece('X'))
        );
        assert_eq!(
            Board::from_fen("4k4/9/9/9/9/9/9/9/9/4K4 x"),
            Err(FenError::UnknownSide("x".to_string()))
        );
        assert_eq!(
            Board::from_fen("3kk4/9/9/9/9/9/9/9/9/4K4 w"),
            Err(FenError::Placement(PlacementError::DuplicateGeneral(
                Side::Black
            )))
        );
    }
}
