//! 测试局面库
//!
//! 提供命名的 FEN 测试局面，供单元测试、基准测试和命令行调试使用。
//!
//! 命名规范:
//! - START: 初始局面
//! - EARLY_n: 开局后几步
//! - MID_n: 中局
//! - END_n: 残局
//! - CHECK_n: 被将军的局面（行棋方被将）
//! - MATE_n: 杀棋测试
//! - SPECIAL_n: 特殊规则测试

use crate::fen::STANDARD_FEN;

// =============================================================================
// 开局
// =============================================================================

/// 初始局面
pub const START: &str = STANDARD_FEN;

/// 红方第一步: 中炮 (炮二平五)
pub const EARLY_1: &str = "rheakaehr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C4/9/RHEAKAEHR b";

/// 黑方回应: 马8进7
pub const EARLY_2: &str = "rheakae1r/9/1c4hc1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C4/9/RHEAKAEHR w";

/// 红方第二步: 马二进三
pub const EARLY_3: &str = "rheakae1r/9/1c4hc1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C1H2/9/RHEAKAE1R b";

// =============================================================================
// 中局
// =============================================================================

/// 黑车过河，双方中炮
pub const MID_1: &str = "2eakae2/9/4c4/p1p1p1p1p/2r6/9/P1P1P1P1P/4C4/4A4/2EAK1E2 w";

/// 兵卒已接触的中局
pub const MID_2: &str = "r1eakaeh1/9/1ch4c1/p1p1p3p/6p2/2P6/P3P1P1P/1C2C1H2/9/RHEAKAE1R b";

// =============================================================================
// 残局
// =============================================================================

/// 单车对将
pub const END_1: &str = "3k5/9/9/9/9/9/9/9/4R4/5K3 w";

/// 马兵对将
pub const END_2: &str = "4k4/9/3P5/9/9/9/9/4H4/9/3K5 w";

/// 单炮对双士
pub const END_3: &str = "3ak4/4a4/9/9/9/9/9/4C4/9/3K5 w";

// =============================================================================
// 将军
// =============================================================================

/// 车将军
pub const CHECK_1: &str = "4k4/9/9/9/9/9/9/9/4R4/3K5 b";

/// 炮隔卒将军
pub const CHECK_2: &str = "4k4/9/9/4p4/9/9/9/4C4/9/3K5 b";

/// 马将军
pub const CHECK_3: &str = "4k4/9/3H5/9/9/9/9/9/9/3K5 b";

// =============================================================================
// 杀棋
// =============================================================================

/// 红先一步杀：车 a4 平底线
pub const MATE_1: &str = "4k4/8R/9/9/9/R8/9/9/9/3K5 w";

/// 黑方已被双车错杀
pub const MATE_2: &str = "R3k4/8R/9/9/9/9/9/9/9/3K5 b";

// =============================================================================
// 特殊规则
// =============================================================================

/// 困毙：黑将无子可动且未被将军
pub const SPECIAL_1: &str = "4k4/9/4P4/9/9/3R1R3/9/9/9/4K4 b";

/// 照面：挪开中间的马即输
pub const SPECIAL_2: &str = "4k4/9/9/9/9/4H4/9/9/9/4K4 w";

/// 牵制：黑马被红车钉在将前
pub const SPECIAL_3: &str = "4k4/9/4h4/p8/9/9/4R4/9/9/4K4 b";

// =============================================================================
// 位置集合
// =============================================================================

pub const EARLY_POSITIONS: [&str; 3] = [EARLY_1, EARLY_2, EARLY_3];

pub const MID_POSITIONS: [&str; 2] = [MID_1, MID_2];

pub const END_POSITIONS: [&str; 3] = [END_1, END_2, END_3];

pub const CHECK_POSITIONS: [&str; 3] = [CHECK_1, CHECK_2, CHECK_3];

pub const MATE_POSITIONS: [&str; 2] = [MATE_1, MATE_2];

pub const SPECIAL_POSITIONS: [&str; 3] = [SPECIAL_1, SPECIAL_2, SPECIAL_3];

/// 全部局面（带名字），便于遍历
pub fn all_positions() -> Vec<(&'static str, &'static str)> {
    let mut all = vec![("START", START)];
    let groups: [(&str, &[&'static str]); 6] = [
        ("EARLY", &EARLY_POSITIONS),
        ("MID", &MID_POSITIONS),
        ("END", &END_POSITIONS),
        ("CHECK", &CHECK_POSITIONS),
        ("MATE", &MATE_POSITIONS),
        ("SPECIAL", &SPECIAL_POSITIONS),
    ];
    for (group, fens) in groups {
        for fen in fens {
            all.push((group, *fen));
        }
    }
    all
}
