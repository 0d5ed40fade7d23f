// ==========================================
// 补贴预算分配引擎 - 领域模型层
// ==========================================
// 职责: 定义资格记录、分配配置、分配报告等领域类型
// 红线: 不含文件读取逻辑,不含引擎逻辑
// ==========================================

pub mod allocation;
pub mod record;
pub mod types;

// 重导出核心类型
pub use allocation::{
    default_category_shares, AllocationCaps, AllocationConfig, AllocationReport, CategoryShare,
    GroupBreakdown, RejectedRecord, ScoredRecord, SelectedRecord, DEFAULT_ALPHA, DEFAULT_BUDGET,
    DEFAULT_MAX_REJECTED, DEFAULT_MAX_SELECTED,
};
pub use record::{EligibilityRecord, UNKNOWN_SECTOR};
pub use types::{DistributionMode, RejectionReason};
