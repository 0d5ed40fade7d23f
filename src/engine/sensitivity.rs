// ==========================================
// 补贴预算分配引擎 - 政策敏感性分析
// ==========================================
// 职责: 固定预算下扫描多个 alpha，观察入选结果如何随权重偏移
// ==========================================

use crate::domain::allocation::AllocationCaps;
use crate::domain::record::EligibilityRecord;
use crate::engine::aggregator::{scheme_key, ReportAggregator};
use crate::engine::allocator::GreedyAllocator;
use serde::{Deserialize, Serialize};

/// 默认扫描点: 0.1（就业优先）… 0.9（收入优先）
pub const DEFAULT_SENSITIVITY_ALPHAS: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub alpha: f64,
    pub beta: f64,
    pub selected: usize,
    pub budget_used: f64,
    /// 入选次数最多的补贴计划（无入选时为 None）
    pub top_scheme: Option<String>,
    pub avg_score: Option<f64>,
}

pub struct SensitivityAnalyzer {
    allocator: GreedyAllocator,
    aggregator: ReportAggregator,
}

impl SensitivityAnalyzer {
    pub fn new() -> Self {
        Self {
            allocator: GreedyAllocator::new(),
            aggregator: ReportAggregator::new(),
        }
    }

    pub fn analyze(
        &self,
        records: &[EligibilityRecord],
        budget: f64,
        alphas: &[f64],
        caps: AllocationCaps,
    ) -> Vec<SensitivityRow> {
        alphas
            .iter()
            .map(|&alpha| {
                let outcome = self.allocator.allocate(records, budget, alpha, caps);
                let totals = self.aggregator.totals(&outcome.selected, budget);
                let top_scheme = self
                    .aggregator
                    .breakdown(&outcome.selected, scheme_key)
                    .into_iter()
                    .next()
                    .map(|row| row.key);
                let avg_score = if outcome.selected.is_empty() {
                    None
                } else {
                    let sum: f64 = outcome.selected.iter().map(|s| s.composite_score).sum();
                    Some(sum / outcome.selected.len() as f64)
                };

                SensitivityRow {
                    alpha,
                    beta: 1.0 - alpha,
                    selected: outcome.selected.len(),
                    budget_used: totals.budget_used,
                    top_scheme,
                    avg_score,
                }
            })
            .collect()
    }
}

impl Default for SensitivityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
