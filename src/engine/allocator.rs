// ==========================================
// 补贴预算分配引擎 - 贪心分配器
// ==========================================
// 职责: 预算约束下的单趟贪心选择
// 输入: 资格记录 + 预算 + alpha + 名额上限
// 输出: 入选名单（带名次/理由）+ 落选名单（带原因）+ 未处理计数
// 红线: 入选补贴总额不得超过预算
// ==========================================

use crate::domain::allocation::{AllocationCaps, RejectedRecord, ScoredRecord, SelectedRecord};
use crate::domain::record::EligibilityRecord;
use crate::domain::types::RejectionReason;
use crate::engine::scoring::ScoreCalculator;
use tracing::{debug, instrument};

// ==========================================
// GreedyAllocator - 贪心分配器
// ==========================================
pub struct GreedyAllocator {
    scorer: ScoreCalculator,
}

/// 单趟分配结果
#[derive(Debug, Clone, Default)]
pub struct AllocationOutcome {
    pub selected: Vec<SelectedRecord>,
    pub rejected: Vec<RejectedRecord>,
    /// 两个名单都已满后被丢弃的记录数
    pub unprocessed: usize,
    pub remaining_budget: f64,
}

impl GreedyAllocator {
    pub fn new() -> Self {
        Self {
            scorer: ScoreCalculator::new(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 评分 + 稳定降序排序
    ///
    /// 同分记录保持输入顺序（`sort_by` 为稳定排序）
    pub fn rank(&self, records: &[EligibilityRecord], alpha: f64) -> Vec<ScoredRecord> {
        let mut scored = self.scorer.score_all(records, alpha);
        scored.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
        scored
    }

    /// 执行贪心分配
    ///
    /// 规则：
    /// 1) 剩余预算 >= 补贴金额 且 入选未满 → 入选，名次 = 当前入选数 + 1
    /// 2) 否则若落选名单未满 → 落选（预算不足 / 名额已满）
    /// 3) 否则 → 不进入任何名单，仅计数
    #[instrument(skip(self, records, caps), fields(
        records_count = records.len(),
        max_selected = caps.max_selected,
        max_rejected = caps.max_rejected
    ))]
    pub fn allocate(
        &self,
        records: &[EligibilityRecord],
        budget: f64,
        alpha: f64,
        caps: AllocationCaps,
    ) -> AllocationOutcome {
        let ranked = self.rank(records, alpha);
        self.allocate_ranked(ranked, budget, caps)
    }

    /// 对已排序记录执行单趟分配
    pub fn allocate_ranked(
        &self,
        ranked: Vec<ScoredRecord>,
        budget: f64,
        caps: AllocationCaps,
    ) -> AllocationOutcome {
        let mut selected: Vec<SelectedRecord> = Vec::new();
        let mut rejected: Vec<RejectedRecord> = Vec::new();
        let mut unprocessed = 0usize;
        let mut remaining_budget = budget;

        for ScoredRecord {
            record,
            composite_score,
        } in ranked
        {
            let cost = record.subsidy_amount;

            if remaining_budget >= cost && selected.len() < caps.max_selected {
                let justification = build_justification(&record, composite_score);
                remaining_budget -= cost;
                selected.push(SelectedRecord {
                    rank: selected.len() + 1,
                    record,
                    composite_score,
                    justification,
                    sub_budget_category: None,
                });
                continue;
            }

            if rejected.len() < caps.max_rejected {
                let rejection_reason = if remaining_budget < cost {
                    RejectionReason::InsufficientBudget
                } else {
                    RejectionReason::LowerPriority
                };
                rejected.push(RejectedRecord {
                    record,
                    composite_score,
                    rejection_reason,
                });
                continue;
            }

            unprocessed += 1;
        }

        debug!(
            selected = selected.len(),
            rejected = rejected.len(),
            unprocessed,
            remaining_budget,
            "贪心分配完成"
        );

        AllocationOutcome {
            selected,
            rejected,
            unprocessed,
            remaining_budget,
        }
    }
}

impl Default for GreedyAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// 入选理由文本
pub fn build_justification(record: &EligibilityRecord, composite_score: f64) -> String {
    format!(
        "Composite score: {:.1} | {} potential",
        composite_score,
        record.growth_label()
    )
}
