// ==========================================
// 补贴预算分配引擎 - 类别子预算分配
// ==========================================
// 职责: 按企业类别拆分总预算，在各子预算内独立执行贪心分配
// 默认比例: Micro 40% / Small 35% / Medium 25%
// 红线: 名额上限对合并结果整体生效（按类别顺序消耗名额）
// ==========================================

use crate::domain::allocation::{AllocationCaps, CategoryShare};
use crate::domain::record::EligibilityRecord;
use crate::engine::allocator::{AllocationOutcome, GreedyAllocator};
use tracing::{debug, info};

// ==========================================
// CategoryBudgetAllocator - 类别子预算分配器
// ==========================================
pub struct CategoryBudgetAllocator {
    allocator: GreedyAllocator,
}

impl CategoryBudgetAllocator {
    pub fn new() -> Self {
        Self {
            allocator: GreedyAllocator::new(),
        }
    }

    /// 按类别子预算分配
    ///
    /// # 参数
    /// - `records`: 资格记录
    /// - `budget`: 总预算
    /// - `alpha`: 收入权重
    /// - `caps`: 合并结果的名额上限
    /// - `shares`: 类别比例（顺序即处理顺序）
    ///
    /// # 返回
    /// 合并后的分配结果；入选名次按合并顺序重排为 1..n，
    /// 无对应比例的类别记录计入 unprocessed
    pub fn allocate(
        &self,
        records: &[EligibilityRecord],
        budget: f64,
        alpha: f64,
        caps: AllocationCaps,
        shares: &[CategoryShare],
    ) -> AllocationOutcome {
        let mut merged = AllocationOutcome::default();
        let mut budget_used = 0.0;
        let mut matched = 0usize;

        // 比例之和超过 1 时按比例缩放，保证子预算总和不超过总预算
        let total_share: f64 = shares.iter().map(|s| s.share).sum();
        let scale = if total_share > 1.0 + 1e-9 { 1.0 / total_share } else { 1.0 };

        for share in shares {
            let sub_budget = budget * share.share * scale;
            let subset: Vec<EligibilityRecord> = records
                .iter()
                .filter(|r| category_matches(r, &share.category))
                .cloned()
                .collect();
            matched += subset.len();

            let remaining_caps = AllocationCaps {
                max_selected: caps.max_selected.saturating_sub(merged.selected.len()),
                max_rejected: caps.max_rejected.saturating_sub(merged.rejected.len()),
            };
            let outcome = self
                .allocator
                .allocate(&subset, sub_budget, alpha, remaining_caps);

            debug!(
                category = %share.category,
                sub_budget,
                candidates = subset.len(),
                selected = outcome.selected.len(),
                "类别子预算分配完成"
            );

            budget_used += sub_budget - outcome.remaining_budget;
            merged.unprocessed += outcome.unprocessed;
            merged.rejected.extend(outcome.rejected);
            for mut item in outcome.selected {
                item.rank = merged.selected.len() + 1;
                item.sub_budget_category = Some(share.category.clone());
                merged.selected.push(item);
            }
        }

        let unmatched = records.len() - matched.min(records.len());
        if unmatched > 0 {
            info!(unmatched, "部分记录的类别无子预算，计入未处理");
        }
        merged.unprocessed += unmatched;
        merged.remaining_budget = budget - budget_used;
        merged
    }
}

impl Default for CategoryBudgetAllocator {
    fn default() -> Self {
        Self::new()
    }
}

fn category_matches(record: &EligibilityRecord, category: &str) -> bool {
    record
        .category
        .as_deref()
        .map(|c| c.trim().eq_ignore_ascii_case(category.trim()))
        .unwrap_or(false)
}
