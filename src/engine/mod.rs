// ==========================================
// 补贴预算分配引擎 - 引擎层
// ==========================================
// 职责: 评分 / 贪心分配 / 汇总，全部为纯计算
// 红线: 引擎不读文件、不做 I/O，所有落选必须给出原因
// ==========================================

pub mod aggregator;
pub mod allocator;
pub mod category_budget;
pub mod orchestrator;
pub mod scoring;
pub mod sensitivity;

// 重导出核心引擎
pub use aggregator::{ReportAggregator, SelectionTotals};
pub use allocator::{AllocationOutcome, GreedyAllocator};
pub use category_budget::CategoryBudgetAllocator;
pub use orchestrator::AllocationEngine;
pub use scoring::{ScoreCalculator, JOBS_NORMALIZATION};
pub use sensitivity::{SensitivityAnalyzer, SensitivityRow, DEFAULT_SENSITIVITY_ALPHAS};
