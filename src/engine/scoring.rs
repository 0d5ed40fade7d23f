// ==========================================
// 补贴预算分配引擎 - 综合评分计算
// ==========================================
// 职责: 单条资格记录的综合优先级评分
// 公式: alpha × 收入增幅% + (1 - alpha) × 新增就业 × 10
// 红线: 不做 alpha 收敛（由配置边界负责），纯算术
// ==========================================

use crate::domain::allocation::ScoredRecord;
use crate::domain::record::EligibilityRecord;

/// 就业人数归一化系数（对齐百分比与小整数的量纲，必须保持不变）
pub const JOBS_NORMALIZATION: f64 = 10.0;

// ==========================================
// ScoreCalculator - 评分计算器
// ==========================================
pub struct ScoreCalculator {
    // 无状态引擎
}

impl ScoreCalculator {
    pub fn new() -> Self {
        Self {}
    }

    /// 计算综合评分
    ///
    /// # 参数
    /// - `record`: 资格记录
    /// - `alpha`: 收入权重（调用方保证在 [0, 1] 内）
    pub fn score(&self, record: &EligibilityRecord, alpha: f64) -> f64 {
        let beta = 1.0 - alpha;
        alpha * record.revenue_increase_pct
            + beta * f64::from(record.new_jobs_added) * JOBS_NORMALIZATION
    }

    /// 批量评分（保持输入顺序）
    pub fn score_all(&self, records: &[EligibilityRecord], alpha: f64) -> Vec<ScoredRecord> {
        records
            .iter()
            .map(|record| ScoredRecord {
                composite_score: self.score(record, alpha),
                record: record.clone(),
            })
            .collect()
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new()
    }
}
