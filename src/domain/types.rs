// ==========================================
// 补贴预算分配引擎 - 领域类型定义
// ==========================================
// 依据: 分配规则 - 拒绝原因 / 分配模式
// ==========================================

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ==========================================
// 拒绝原因 (Rejection Reason)
// ==========================================
// 序列化格式: 与外部报告 JSON 完全一致的原文
// 外部引擎给出的其他原因文本原样保留
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RejectionReason {
    /// 剩余预算不足以覆盖该记录的补贴金额
    #[default]
    InsufficientBudget,
    /// 预算足够，但入选名额已满
    LowerPriority,
    /// 外部引擎自定义原因
    Other(String),
}

const INSUFFICIENT_BUDGET_TEXT: &str = "Insufficient budget remaining";
const LOWER_PRIORITY_TEXT: &str = "Lower priority score in current allocation";

impl RejectionReason {
    pub fn as_str(&self) -> &str {
        match self {
            RejectionReason::InsufficientBudget => INSUFFICIENT_BUDGET_TEXT,
            RejectionReason::LowerPriority => LOWER_PRIORITY_TEXT,
            RejectionReason::Other(text) => text,
        }
    }

    pub fn from_text(text: &str) -> Self {
        match text.trim() {
            INSUFFICIENT_BUDGET_TEXT => RejectionReason::InsufficientBudget,
            LOWER_PRIORITY_TEXT => RejectionReason::LowerPriority,
            other => RejectionReason::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RejectionReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RejectionReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(RejectionReason::from_text(&text))
    }
}

// ==========================================
// 分配模式 (Distribution Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMode {
    #[default]
    GlobalGreedy,       // 全局贪心
    CategorySubBudgets, // 按企业类别拆分子预算
}

impl fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionMode::GlobalGreedy => write!(f, "Global Greedy"),
            DistributionMode::CategorySubBudgets => write!(f, "Category Sub-budgets"),
        }
    }
}
