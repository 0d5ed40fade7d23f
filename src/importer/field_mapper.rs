// ==========================================
// 补贴预算分配引擎 - 字段映射器
// ==========================================
// 职责: 原始行 → 领域对象（列名别名 / 宽松数值转换）
// 规则:
// - 影响字段（收入增幅 / 新增就业）非数值 → 0
// - 补贴金额列缺失或为空 → 该行排除（记录原因，不中断批次）
// - 补贴金额非数值或为负 → 0
// ==========================================

use crate::domain::record::{coerce_count, EligibilityRecord, UNKNOWN_SECTOR};
use crate::importer::feed_trait::RawRow;
use serde::Serialize;

// ===== 列名别名 =====
pub const ENTITY_ID_COLUMNS: &[&str] = &["MSME_ID", "entity_id", "Entity_ID"];
pub const SCHEME_ID_COLUMNS: &[&str] = &["Scheme_ID", "scheme_id"];
pub const SCHEME_NAME_COLUMNS: &[&str] = &["Scheme_Name", "scheme_name"];
pub const SECTOR_COLUMNS: &[&str] = &["Sector", "sector"];
pub const CATEGORY_COLUMNS: &[&str] = &["Category", "category"];
pub const GROWTH_CATEGORY_COLUMNS: &[&str] = &[
    "Growth_Category",
    "Predicted_Growth_Category",
    "growth_category",
];
pub const SUBSIDY_COLUMNS: &[&str] = &["Subsidy_Applied", "subsidy_amount", "Subsidy_Amount"];
pub const REVENUE_PCT_COLUMNS: &[&str] = &["Revenue_Increase_Pct", "revenue_increase_pct"];
pub const NEW_JOBS_COLUMNS: &[&str] = &["New_Jobs_Added", "new_jobs_added"];
pub const SIMULATION_TYPE_COLUMNS: &[&str] = &["Simulation_Type", "simulation_type"];
pub const MAX_SUBSIDY_COLUMNS: &[&str] = &["Max_Subsidy_Amount", "max_subsidy"];

/// 参与分配的模拟类型（组合模拟行会重复计数）
pub const SINGLE_SCHEME: &str = "Single_Scheme";

// ==========================================
// 元数据对象
// ==========================================

/// 补贴计划元数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemeInfo {
    pub scheme_id: String,
    pub scheme_name: String,
    pub max_subsidy: Option<f64>,
}

/// 受益主体元数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityProfile {
    pub entity_id: String,
    pub sector: Option<String>,
    pub category: Option<String>,
    pub growth_category: Option<String>,
}

/// 被排除的行（行号从 1 开始，不含表头）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowExclusion {
    pub row: usize,
    pub reason: String,
}

// ==========================================
// FieldMapper - 字段映射器
// ==========================================
pub struct FieldMapper;

impl FieldMapper {
    /// 资格记录映射
    ///
    /// 行业缺省为 "Unknown"，由 FeedLoader 按主体元数据再补全
    pub fn map_eligibility(&self, row: &RawRow, row_no: usize) -> Result<EligibilityRecord, RowExclusion> {
        let entity_id = text(row, ENTITY_ID_COLUMNS).ok_or_else(|| RowExclusion {
            row: row_no,
            reason: "缺少主体标识".to_string(),
        })?;

        let subsidy_raw = text(row, SUBSIDY_COLUMNS).ok_or_else(|| RowExclusion {
            row: row_no,
            reason: format!("缺少补贴金额: entity_id={}", entity_id),
        })?;

        Ok(EligibilityRecord {
            entity_id,
            scheme_id: text(row, SCHEME_ID_COLUMNS).unwrap_or_default(),
            scheme_name: text(row, SCHEME_NAME_COLUMNS).unwrap_or_default(),
            sector: text(row, SECTOR_COLUMNS).unwrap_or_else(|| UNKNOWN_SECTOR.to_string()),
            category: text(row, CATEGORY_COLUMNS),
            growth_category: text(row, GROWTH_CATEGORY_COLUMNS),
            subsidy_amount: parse_lenient_f64(&subsidy_raw).max(0.0),
            revenue_increase_pct: number(row, REVENUE_PCT_COLUMNS).max(0.0),
            new_jobs_added: coerce_count(number(row, NEW_JOBS_COLUMNS)),
        })
    }

    /// 是否为单计划模拟行（无模拟类型列时视为是）
    pub fn is_single_scheme(&self, row: &RawRow) -> bool {
        match text(row, SIMULATION_TYPE_COLUMNS) {
            Some(kind) => kind.eq_ignore_ascii_case(SINGLE_SCHEME),
            None => true,
        }
    }

    /// 补贴计划元数据映射（缺少计划标识返回 None）
    pub fn map_scheme(&self, row: &RawRow) -> Option<SchemeInfo> {
        let scheme_id = text(row, SCHEME_ID_COLUMNS)?;
        Some(SchemeInfo {
            scheme_name: text(row, SCHEME_NAME_COLUMNS).unwrap_or_else(|| scheme_id.clone()),
            max_subsidy: text(row, MAX_SUBSIDY_COLUMNS)
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite()),
            scheme_id,
        })
    }

    /// 受益主体元数据映射（缺少主体标识返回 None）
    pub fn map_entity(&self, row: &RawRow) -> Option<EntityProfile> {
        Some(EntityProfile {
            entity_id: text(row, ENTITY_ID_COLUMNS)?,
            sector: text(row, SECTOR_COLUMNS),
            category: text(row, CATEGORY_COLUMNS),
            growth_category: text(row, GROWTH_CATEGORY_COLUMNS),
        })
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 按别名顺序取第一个非空文本
fn text(row: &RawRow, columns: &[&str]) -> Option<String> {
    columns
        .iter()
        .filter_map(|c| row.get(*c))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

fn number(row: &RawRow, columns: &[&str]) -> f64 {
    text(row, columns)
        .map(|v| parse_lenient_f64(&v))
        .unwrap_or(0.0)
}

/// 宽松数值解析: 去千分位逗号，非数值 / 非有限值 → 0
pub fn parse_lenient_f64(value: &str) -> f64 {
    value
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_map_eligibility_full_row() {
        let mapper = FieldMapper;
        let record = mapper
            .map_eligibility(
                &row(&[
                    ("MSME_ID", "MSME_0001"),
                    ("Scheme_ID", "SCH_001"),
                    ("Scheme_Name", "Digital MSME Transformation Grant"),
                    ("Sector", "IT Services"),
                    ("Category", "Micro"),
                    ("Subsidy_Applied", "1,250,000"),
                    ("Revenue_Increase_Pct", "15.0"),
                    ("New_Jobs_Added", "2"),
                ]),
                1,
            )
            .unwrap();

        assert_eq!(record.entity_id, "MSME_0001");
        assert_eq!(record.sector, "IT Services");
        assert_eq!(record.category.as_deref(), Some("Micro"));
        assert_eq!(record.subsidy_amount, 1_250_000.0);
        assert_eq!(record.revenue_increase_pct, 15.0);
        assert_eq!(record.new_jobs_added, 2);
    }

    #[test]
    fn test_malformed_impact_fields_become_zero() {
        let record = FieldMapper
            .map_eligibility(
                &row(&[
                    ("MSME_ID", "MSME_0002"),
                    ("Subsidy_Applied", "abc"),
                    ("Revenue_Increase_Pct", "NaN"),
                    ("New_Jobs_Added", ""),
                ]),
                2,
            )
            .unwrap();

        assert_eq!(record.subsidy_amount, 0.0);
        assert_eq!(record.revenue_increase_pct, 0.0);
        assert_eq!(record.new_jobs_added, 0);
        assert_eq!(record.sector, UNKNOWN_SECTOR);
    }

    #[test]
    fn test_missing_subsidy_column_excludes_row() {
        let exclusion = FieldMapper
            .map_eligibility(&row(&[("MSME_ID", "MSME_0003"), ("Revenue_Increase_Pct", "4")]), 7)
            .unwrap_err();
        assert_eq!(exclusion.row, 7);
        assert!(exclusion.reason.contains("MSME_0003"));
    }

    #[test]
    fn test_simulation_type_filter() {
        let mapper = FieldMapper;
        assert!(mapper.is_single_scheme(&row(&[("Simulation_Type", "Single_Scheme")])));
        assert!(!mapper.is_single_scheme(&row(&[("Simulation_Type", "Combined_Multi_Scheme")])));
        assert!(mapper.is_single_scheme(&row(&[("MSME_ID", "X")])));
    }

    #[test]
    fn test_map_scheme_and_entity() {
        let mapper = FieldMapper;
        let scheme = mapper
            .map_scheme(&row(&[("Scheme_ID", "SCH_003"), ("Max_Subsidy_Amount", "300000")]))
            .unwrap();
        assert_eq!(scheme.scheme_name, "SCH_003");
        assert_eq!(scheme.max_subsidy, Some(300_000.0));

        let entity = mapper
            .map_entity(&row(&[("MSME_ID", "MSME_0009"), ("Predicted_Growth_Category", "High")]))
            .unwrap();
        assert_eq!(entity.growth_category.as_deref(), Some("High"));
        assert!(mapper.map_entity(&row(&[("Sector", "Textiles")])).is_none());
    }
}
