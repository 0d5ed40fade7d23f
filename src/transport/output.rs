// ==========================================
// 补贴预算分配引擎 - 外部引擎输出解析
// ==========================================
// 外部引擎可能在 JSON 之前打印进度信息:
// 从第一个 '{' 开始解析，JSON 文档之后的内容忽略
// ==========================================

use crate::domain::allocation::AllocationReport;
use crate::transport::error::{TransportError, TransportResult};
use serde::Deserialize;

/// 从标准输出中提取分配报告
pub fn extract_json_document(stdout: &str) -> TransportResult<AllocationReport> {
    let Some(start) = stdout.find('{') else {
        return Err(TransportError::OutputParse {
            message: "输出中没有 JSON 文档".to_string(),
            raw_output: stdout.to_string(),
        });
    };

    let mut de = serde_json::Deserializer::from_str(&stdout[start..]);
    AllocationReport::deserialize(&mut de).map_err(|e| TransportError::OutputParse {
        message: e.to_string(),
        raw_output: stdout.to_string(),
    })
}
