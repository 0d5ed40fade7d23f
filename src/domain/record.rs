// ==========================================
// 补贴预算分配引擎 - 资格记录领域模型
// ==========================================
// 一条记录 = 一个受益主体 + 一个补贴计划 的合格配对
// 红线: 记录只读，引擎不修改输入
// ==========================================

use serde::{Deserialize, Deserializer, Serialize};

/// 主体元数据无法解析时的行业默认值
pub const UNKNOWN_SECTOR: &str = "Unknown";

// ==========================================
// EligibilityRecord - 资格记录
// ==========================================
// 字段别名兼容外部引擎输出的表格列名（MSME_ID / Subsidy_Applied ...）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityRecord {
    // ===== 标识 =====
    #[serde(alias = "MSME_ID")]
    pub entity_id: String,
    #[serde(alias = "Scheme_ID", default)]
    pub scheme_id: String,
    #[serde(alias = "Scheme_Name", default)]
    pub scheme_name: String,

    // ===== 报表分组 =====
    #[serde(alias = "Sector", default = "default_sector")]
    pub sector: String,
    #[serde(alias = "Category", default)]
    pub category: Option<String>,
    #[serde(alias = "Growth_Category", default)]
    pub growth_category: Option<String>,

    // ===== 成本与影响 =====
    #[serde(alias = "Subsidy_Applied", deserialize_with = "lenient_f64", default)]
    pub subsidy_amount: f64,
    #[serde(alias = "Revenue_Increase_Pct", deserialize_with = "lenient_f64", default)]
    pub revenue_increase_pct: f64,
    #[serde(alias = "New_Jobs_Added", deserialize_with = "lenient_u32", default)]
    pub new_jobs_added: u32,
}

fn default_sector() -> String {
    UNKNOWN_SECTOR.to_string()
}

impl EligibilityRecord {
    /// 构造函数（报表分组字段取默认值）
    pub fn new(
        entity_id: impl Into<String>,
        scheme_id: impl Into<String>,
        scheme_name: impl Into<String>,
        subsidy_amount: f64,
        revenue_increase_pct: f64,
        new_jobs_added: u32,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            scheme_id: scheme_id.into(),
            scheme_name: scheme_name.into(),
            sector: default_sector(),
            category: None,
            growth_category: None,
            subsidy_amount,
            revenue_increase_pct,
            new_jobs_added,
        }
    }

    /// 理由文本使用的成长潜力标签（缺省为 "Growth"）
    pub fn growth_label(&self) -> &str {
        match self.growth_category.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label,
            _ => "Growth",
        }
    }

    /// 收入增量 = 补贴金额 × 收入增幅%
    pub fn revenue_gain(&self) -> f64 {
        self.subsidy_amount * self.revenue_increase_pct / 100.0
    }
}

// ==========================================
// 宽松数值反序列化
// ==========================================
// 非数值/空值一律视为 0，不丢弃记录

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_json_f64(&value))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_count(coerce_json_f64(&value)))
}

/// 计数字段: 接受 30 / 30.0 / "30"，负数与非数值为 0
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_wide_count(coerce_json_f64(&value)))
}

pub(crate) fn lenient_usize<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let count = coerce_wide_count(coerce_json_f64(&value));
    Ok(usize::try_from(count).unwrap_or(usize::MAX))
}

fn coerce_wide_count(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round().min(u64::MAX as f64) as u64
}

fn coerce_json_f64(value: &serde_json::Value) -> f64 {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// 浮点计数转为非负整数（负数/非有限值为 0，四舍五入）
pub fn coerce_count(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round().min(u32::MAX as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_label_fallback() {
        let mut record = EligibilityRecord::new("M001", "SCH_001", "Grant", 100.0, 5.0, 2);
        assert_eq!(record.growth_label(), "Growth");

        record.growth_category = Some("  ".to_string());
        assert_eq!(record.growth_label(), "Growth");

        record.growth_category = Some("High".to_string());
        assert_eq!(record.growth_label(), "High");
    }

    #[test]
    fn test_deserialize_tabular_aliases_and_garbage_numbers() {
        let raw = r#"{
            "MSME_ID": "MSME_0007",
            "Scheme_ID": "SCH_002",
            "Scheme_Name": "Green Tech Subsidy",
            "Subsidy_Applied": "250000",
            "Revenue_Increase_Pct": "n/a",
            "New_Jobs_Added": 3.0
        }"#;
        let record: EligibilityRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.entity_id, "MSME_0007");
        assert_eq!(record.sector, UNKNOWN_SECTOR);
        assert_eq!(record.subsidy_amount, 250_000.0);
        assert_eq!(record.revenue_increase_pct, 0.0);
        assert_eq!(record.new_jobs_added, 3);
    }

    #[test]
    fn test_wide_count_accepts_float_text() {
        assert_eq!(coerce_wide_count(30.0), 30);
        assert_eq!(coerce_wide_count(-1.0), 0);
        assert_eq!(coerce_wide_count(f64::INFINITY), 0);
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count(-4.0), 0);
        assert_eq!(coerce_count(f64::NAN), 0);
        assert_eq!(coerce_count(2.6), 3);
    }

    #[test]
    fn test_revenue_gain() {
        let record = EligibilityRecord::new("M001", "S1", "Grant", 1_000_000.0, 5.0, 10);
        assert_eq!(record.revenue_gain(), 50_000.0);
    }
}
