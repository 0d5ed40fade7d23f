// ==========================================
// 补贴预算分配引擎 - 分配配置与分配报告
// ==========================================
// 输入: AllocationConfig（预算 + 权重 + 名额上限）
// 输出: AllocationReport（入选 / 落选 / 汇总指标）
// 红线: 报告 JSON 结构是进程内 / 进程外两种调用方式的共同契约
// ==========================================

use crate::domain::record::{lenient_f64, lenient_u64, lenient_usize, EligibilityRecord};
use crate::domain::types::{DistributionMode, RejectionReason};
use serde::{Deserialize, Serialize};

/// 默认总预算（5 千万）
pub const DEFAULT_BUDGET: f64 = 50_000_000.0;
/// 默认收入权重
pub const DEFAULT_ALPHA: f64 = 0.6;
/// 默认入选名额上限
pub const DEFAULT_MAX_SELECTED: usize = 50;
/// 默认落选名单上限
pub const DEFAULT_MAX_REJECTED: usize = 20;

// ==========================================
// AllocationCaps - 名单长度上限
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationCaps {
    pub max_selected: usize,
    pub max_rejected: usize,
}

impl Default for AllocationCaps {
    fn default() -> Self {
        Self {
            max_selected: DEFAULT_MAX_SELECTED,
            max_rejected: DEFAULT_MAX_REJECTED,
        }
    }
}

// ==========================================
// CategoryShare - 子预算比例
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub share: f64,
}

impl CategoryShare {
    pub fn new(category: impl Into<String>, share: f64) -> Self {
        Self {
            category: category.into(),
            share,
        }
    }
}

/// 默认子预算比例: Micro 40% / Small 35% / Medium 25%
pub fn default_category_shares() -> Vec<CategoryShare> {
    vec![
        CategoryShare::new("Micro", 0.40),
        CategoryShare::new("Small", 0.35),
        CategoryShare::new("Medium", 0.25),
    ]
}

// ==========================================
// AllocationConfig - 分配配置
// ==========================================
// 红线: 越界值在此处收敛，引擎内部保持宽松（纯函数可测）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    pub budget: f64,
    pub alpha: f64,
    #[serde(default)]
    pub caps: AllocationCaps,
    #[serde(default)]
    pub mode: DistributionMode,
    #[serde(default = "default_category_shares")]
    pub category_shares: Vec<CategoryShare>,
}

impl AllocationConfig {
    /// 构造并收敛参数
    ///
    /// - alpha 收敛到 [0, 1]，非有限值回退为 DEFAULT_ALPHA
    /// - budget 负数或非有限值收敛为 0
    pub fn new(budget: f64, alpha: f64) -> Self {
        Self {
            budget: clamp_budget(budget),
            alpha: clamp_alpha(alpha),
            caps: AllocationCaps::default(),
            mode: DistributionMode::GlobalGreedy,
            category_shares: default_category_shares(),
        }
    }

    pub fn with_caps(mut self, caps: AllocationCaps) -> Self {
        self.caps = caps;
        self
    }

    pub fn with_mode(mut self, mode: DistributionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_category_shares(mut self, shares: Vec<CategoryShare>) -> Self {
        self.category_shares = shares;
        self
    }

    /// 就业权重 beta = 1 - alpha
    pub fn beta(&self) -> f64 {
        1.0 - self.alpha
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET, DEFAULT_ALPHA)
    }
}

pub fn clamp_alpha(alpha: f64) -> f64 {
    if alpha.is_finite() {
        alpha.clamp(0.0, 1.0)
    } else {
        DEFAULT_ALPHA
    }
}

pub fn clamp_budget(budget: f64) -> f64 {
    if budget.is_finite() {
        budget.max(0.0)
    } else {
        0.0
    }
}

// ==========================================
// ScoredRecord - 已评分记录（临时对象）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: EligibilityRecord,
    pub composite_score: f64,
}

// ==========================================
// SelectedRecord / RejectedRecord - 分配结果条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedRecord {
    #[serde(default, alias = "Selection_Rank", deserialize_with = "lenient_usize")]
    pub rank: usize,
    #[serde(flatten)]
    pub record: EligibilityRecord,
    #[serde(default, alias = "Composite_Score", deserialize_with = "lenient_f64")]
    pub composite_score: f64,
    #[serde(default, alias = "Decision_Justification")]
    pub justification: String,
    /// 仅子预算模式下填写
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_budget_category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord {
    #[serde(flatten)]
    pub record: EligibilityRecord,
    #[serde(default, alias = "Composite_Score", deserialize_with = "lenient_f64")]
    pub composite_score: f64,
    #[serde(default, alias = "Reason")]
    pub rejection_reason: RejectionReason,
}

// ==========================================
// GroupBreakdown - 分组汇总（行业 / 补贴计划）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBreakdown {
    pub key: String,
    pub count: usize,
    pub subsidy_total: f64,
    pub jobs_total: u64,
    pub avg_score: f64,
}

// ==========================================
// AllocationReport - 分配报告
// ==========================================
// 兼容性: 未知字段忽略；汇总字段缺失时取默认值；计数字段接受 30.0 形式
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllocationReport {
    #[serde(default)]
    pub mode: DistributionMode,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub alpha: f64,
    #[serde(default)]
    pub beta: f64,

    #[serde(default)]
    pub selected: Vec<SelectedRecord>,
    #[serde(default, alias = "unselected")]
    pub rejected: Vec<RejectedRecord>,

    #[serde(default, deserialize_with = "lenient_usize")]
    pub total_selected: usize,
    #[serde(default, deserialize_with = "lenient_usize")]
    pub total_rejected: usize,
    /// 超出两个名额上限、未列入任何名单的记录数
    #[serde(default, deserialize_with = "lenient_usize")]
    pub total_unprocessed: usize,

    #[serde(default)]
    pub budget_used: f64,
    #[serde(default)]
    pub utilization_pct: f64,
    #[serde(default)]
    pub total_revenue_gain: f64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_jobs_created: u64,

    #[serde(default, deserialize_with = "lenient_usize")]
    pub unique_entities: usize,
    #[serde(default)]
    pub by_sector: Vec<GroupBreakdown>,
    #[serde(default)]
    pub by_scheme: Vec<GroupBreakdown>,
}

impl AllocationReport {
    /// 本次评估的记录总数
    pub fn total_evaluated(&self) -> usize {
        self.total_selected + self.total_rejected + self.total_unprocessed
    }

    pub fn remaining_budget(&self) -> f64 {
        self.budget - self.budget_used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_clamps_out_of_range_values() {
        let config = AllocationConfig::new(-5.0, 1.7);
        assert_eq!(config.budget, 0.0);
        assert_eq!(config.alpha, 1.0);
        assert_eq!(config.beta(), 0.0);

        let config = AllocationConfig::new(f64::NAN, f64::NAN);
        assert_eq!(config.budget, 0.0);
        assert_eq!(config.alpha, DEFAULT_ALPHA);
    }

    #[test]
    fn test_config_defaults() {
        let config = AllocationConfig::default();
        assert_eq!(config.budget, DEFAULT_BUDGET);
        assert_eq!(config.caps.max_selected, 50);
        assert_eq!(config.caps.max_rejected, 20);
        assert_eq!(config.category_shares.len(), 3);
    }

    #[test]
    fn test_report_accepts_superset_json() {
        let raw = r#"{"budget": 100.0, "total_selected": 0, "extra_field": [1, 2, 3]}"#;
        let report: AllocationReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.budget, 100.0);
        assert!(report.selected.is_empty());
        assert_eq!(report.total_evaluated(), 0);
    }
}
