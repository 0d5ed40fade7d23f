// ==========================================
// 补贴预算分配引擎 - 报告汇总引擎
// ==========================================
// 职责: 由入选名单派生汇总指标（预算使用率 / 收入增量 / 新增就业）
// 输入: 分配结果 + 预算
// 输出: AllocationReport
// ==========================================

use crate::domain::allocation::{AllocationReport, GroupBreakdown, SelectedRecord};
use crate::domain::types::DistributionMode;
use crate::engine::allocator::AllocationOutcome;
use std::collections::{BTreeMap, HashSet};

// ==========================================
// SelectionTotals - 入选汇总
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionTotals {
    pub budget_used: f64,
    pub utilization_pct: f64,
    pub total_revenue_gain: f64,
    pub total_jobs_created: u64,
}

/// 补贴计划分组键: 计划名称为空时退回计划 ID
pub fn scheme_key(item: &SelectedRecord) -> String {
    if item.record.scheme_name.is_empty() {
        item.record.scheme_id.clone()
    } else {
        item.record.scheme_name.clone()
    }
}

// ==========================================
// ReportAggregator - 报告汇总引擎
// ==========================================
// 红线: 无状态引擎,所有方法都是纯函数
pub struct ReportAggregator;

impl ReportAggregator {
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算入选汇总指标
    ///
    /// - budget_used = Σ 补贴金额
    /// - utilization_pct = min(budget_used / budget × 100, 100)，budget <= 0 时为 0
    /// - total_revenue_gain = Σ 补贴金额 × 收入增幅% / 100
    /// - total_jobs_created = Σ 新增就业
    pub fn totals(&self, selected: &[SelectedRecord], budget: f64) -> SelectionTotals {
        let budget_used: f64 = selected.iter().map(|s| s.record.subsidy_amount).sum();
        let total_revenue_gain: f64 = selected.iter().map(|s| s.record.revenue_gain()).sum();
        let total_jobs_created: u64 = selected
            .iter()
            .map(|s| u64::from(s.record.new_jobs_added))
            .sum();

        SelectionTotals {
            budget_used,
            utilization_pct: utilization_pct(budget_used, budget),
            total_revenue_gain,
            total_jobs_created,
        }
    }

    /// 生成完整分配报告
    pub fn aggregate(
        &self,
        outcome: AllocationOutcome,
        budget: f64,
        alpha: f64,
        mode: DistributionMode,
    ) -> AllocationReport {
        let totals = self.totals(&outcome.selected, budget);
        let unique_entities = outcome
            .selected
            .iter()
            .map(|s| s.record.entity_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let by_sector = self.breakdown(&outcome.selected, |s| s.record.sector.clone());
        let by_scheme = self.breakdown(&outcome.selected, scheme_key);

        AllocationReport {
            mode,
            budget,
            alpha,
            beta: 1.0 - alpha,
            total_selected: outcome.selected.len(),
            total_rejected: outcome.rejected.len(),
            total_unprocessed: outcome.unprocessed,
            budget_used: totals.budget_used,
            utilization_pct: totals.utilization_pct,
            total_revenue_gain: totals.total_revenue_gain,
            total_jobs_created: totals.total_jobs_created,
            unique_entities,
            by_sector,
            by_scheme,
            selected: outcome.selected,
            rejected: outcome.rejected,
        }
    }

    // ==========================================
    // 分组汇总
    // ==========================================

    /// 按键分组汇总，按入选数降序、补贴总额降序、键升序排列
    pub fn breakdown<F>(&self, selected: &[SelectedRecord], key_of: F) -> Vec<GroupBreakdown>
    where
        F: Fn(&SelectedRecord) -> String,
    {
        let mut groups: BTreeMap<String, (usize, f64, u64, f64)> = BTreeMap::new();
        for item in selected {
            let entry = groups.entry(key_of(item)).or_insert((0, 0.0, 0, 0.0));
            entry.0 += 1;
            entry.1 += item.record.subsidy_amount;
            entry.2 += u64::from(item.record.new_jobs_added);
            entry.3 += item.composite_score;
        }

        let mut rows: Vec<GroupBreakdown> = groups
            .into_iter()
            .map(|(key, (count, subsidy_total, jobs_total, score_sum))| GroupBreakdown {
                key,
                count,
                subsidy_total,
                jobs_total,
                avg_score: score_sum / count as f64,
            })
            .collect();

        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.subsidy_total.total_cmp(&a.subsidy_total))
        });
        rows
    }
}

impl Default for ReportAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// 预算使用率（%），上限 100，预算非正时为 0
pub fn utilization_pct(budget_used: f64, budget: f64) -> f64 {
    if budget > 0.0 {
        (budget_used / budget * 100.0).min(100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::EligibilityRecord;

    fn selected(id: &str, sector: &str, scheme: &str, subsidy: f64, rev: f64, jobs: u32) -> SelectedRecord {
        let mut record = EligibilityRecord::new(id, "SCH", scheme, subsidy, rev, jobs);
        record.sector = sector.to_string();
        SelectedRecord {
            rank: 1,
            record,
            composite_score: 10.0,
            justification: String::new(),
            sub_budget_category: None,
        }
    }

    #[test]
    fn test_totals() {
        let aggregator = ReportAggregator::new();
        let items = vec![
            selected("C", "Textiles", "Rural", 1_500_000.0, 3.0, 20),
            selected("A", "Textiles", "Digital", 1_000_000.0, 5.0, 10),
        ];
        let totals = aggregator.totals(&items, 3_000_000.0);

        assert_eq!(totals.budget_used, 2_500_000.0);
        assert!((totals.utilization_pct - 83.333_333).abs() < 1e-4);
        assert_eq!(totals.total_revenue_gain, 45_000.0 + 50_000.0);
        assert_eq!(totals.total_jobs_created, 30);
    }

    #[test]
    fn test_utilization_zero_budget() {
        assert_eq!(utilization_pct(0.0, 0.0), 0.0);
        assert_eq!(utilization_pct(10.0, -5.0), 0.0);
        assert_eq!(utilization_pct(150.0, 100.0), 100.0);
    }

    #[test]
    fn test_breakdown_ordering() {
        let aggregator = ReportAggregator::new();
        let items = vec![
            selected("A", "IT Services", "S1", 100.0, 1.0, 1),
            selected("B", "Manufacturing", "S1", 300.0, 1.0, 2),
            selected("C", "Manufacturing", "S2", 50.0, 1.0, 3),
            selected("D", "Textiles", "S2", 200.0, 1.0, 4),
        ];
        let rows = aggregator.breakdown(&items, |s| s.record.sector.clone());

        assert_eq!(rows[0].key, "Manufacturing");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].subsidy_total, 350.0);
        assert_eq!(rows[0].jobs_total, 5);
        // 同数量按补贴总额降序
        assert_eq!(rows[1].key, "Textiles");
        assert_eq!(rows[2].key, "IT Services");
    }

    #[test]
    fn test_aggregate_empty_outcome() {
        let aggregator = ReportAggregator::new();
        let report = aggregator.aggregate(
            AllocationOutcome::default(),
            1_000.0,
            0.6,
            DistributionMode::GlobalGreedy,
        );
        assert_eq!(report.total_selected, 0);
        assert_eq!(report.budget_used, 0.0);
        assert_eq!(report.utilization_pct, 0.0);
        assert_eq!(report.total_jobs_created, 0);
        assert_eq!(report.unique_entities, 0);
        assert!(report.by_sector.is_empty());
    }
}
