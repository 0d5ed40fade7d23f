// ==========================================
// 补贴预算分配引擎 - 引擎编排器（门面）
// ==========================================
// 用途: 协调 评分 → 排序 → 贪心分配 → 汇总 的执行顺序
// 红线: 纯函数，不持有跨调用状态，可重复调用
// ==========================================

use crate::domain::allocation::{AllocationCaps, AllocationConfig, AllocationReport};
use crate::domain::record::EligibilityRecord;
use crate::domain::types::DistributionMode;
use crate::engine::aggregator::ReportAggregator;
use crate::engine::allocator::GreedyAllocator;
use crate::engine::category_budget::CategoryBudgetAllocator;
use tracing::{debug, info, instrument};

// ==========================================
// AllocationEngine - 分配引擎门面
// ==========================================
pub struct AllocationEngine {
    allocator: GreedyAllocator,
    category_allocator: CategoryBudgetAllocator,
    aggregator: ReportAggregator,
}

impl AllocationEngine {
    pub fn new() -> Self {
        Self {
            allocator: GreedyAllocator::new(),
            category_allocator: CategoryBudgetAllocator::new(),
            aggregator: ReportAggregator::new(),
        }
    }

    /// 执行分配（默认名额上限 50 / 20）
    ///
    /// 不校验 budget / alpha，越界输入得到退化但确定的结果
    pub fn run(&self, records: &[EligibilityRecord], budget: f64, alpha: f64) -> AllocationReport {
        self.run_with_caps(records, budget, alpha, AllocationCaps::default())
    }

    /// 执行分配（指定名额上限）
    #[instrument(skip(self, records, caps), fields(records_count = records.len()))]
    pub fn run_with_caps(
        &self,
        records: &[EligibilityRecord],
        budget: f64,
        alpha: f64,
        caps: AllocationCaps,
    ) -> AllocationReport {
        debug!("步骤1-3: 评分 / 排序 / 贪心分配");
        let outcome = self.allocator.allocate(records, budget, alpha, caps);

        debug!("步骤4: 汇总报告");
        let report = self
            .aggregator
            .aggregate(outcome, budget, alpha, DistributionMode::GlobalGreedy);
        log_report(&report);
        report
    }

    /// 按完整配置执行分配（支持类别子预算模式）
    pub fn run_with_config(
        &self,
        records: &[EligibilityRecord],
        config: &AllocationConfig,
    ) -> AllocationReport {
        match config.mode {
            DistributionMode::GlobalGreedy => {
                self.run_with_caps(records, config.budget, config.alpha, config.caps)
            }
            DistributionMode::CategorySubBudgets => {
                let outcome = self.category_allocator.allocate(
                    records,
                    config.budget,
                    config.alpha,
                    config.caps,
                    &config.category_shares,
                );
                let report = self.aggregator.aggregate(
                    outcome,
                    config.budget,
                    config.alpha,
                    DistributionMode::CategorySubBudgets,
                );
                log_report(&report);
                report
            }
        }
    }
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn log_report(report: &AllocationReport) {
    info!(
        mode = %report.mode,
        selected = report.total_selected,
        rejected = report.total_rejected,
        unprocessed = report.total_unprocessed,
        budget_used = report.budget_used,
        utilization_pct = report.utilization_pct,
        "分配完成"
    );
}
