// ==========================================
// 补贴预算分配引擎 - 数据源读取 Trait
// ==========================================
// 职责: 定义表格文件解析接口（不包含实现）
// 红线: 只读，不写回数据源
// ==========================================

use crate::importer::error::ImportResult;
use std::collections::HashMap;
use std::path::Path;

/// 原始行: 列名 → 去空白后的单元格文本
pub type RawRow = HashMap<String, String>;

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser / ExcelParser
pub trait FileParser {
    /// 解析文件为原始行列表
    ///
    /// # 返回
    /// - Ok(Vec<RawRow>): 跳过完全空白行后的数据行
    /// - Err(ImportError::FileNotFound): 文件不存在
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}
