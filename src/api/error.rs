// ==========================================
// 补贴预算分配引擎 - API层错误类型
// ==========================================
// 职责: 将导入 / 配置 / 传输层错误转换为面向调用方的错误
// 规则: 所有错误信息必须包含显式原因
// ==========================================

use crate::config::error::ConfigError;
use crate::importer::error::ImportError;
use crate::transport::error::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据源错误
    // ==========================================
    #[error("数据导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 模拟执行错误
    // ==========================================
    /// 外部引擎非零退出
    #[error("模拟执行失败 (code: {code:?}): {stderr}")]
    SimulationFailed { code: Option<i32>, stderr: String },

    /// 外部引擎输出无法解析（保留原始输出便于排查）
    #[error("模拟结果解析失败: {message}")]
    ParseFailed { message: String, raw_output: String },

    #[error("模拟超时: {0}")]
    Timeout(String),

    #[error("模拟已被更新的请求取代: run {0}")]
    Superseded(u64),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("数据文件不存在: {}", path)),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::EngineFailed { code, stderr } => {
                ApiError::SimulationFailed { code, stderr }
            }
            TransportError::OutputParse {
                message,
                raw_output,
            } => ApiError::ParseFailed {
                message,
                raw_output,
            },
            TransportError::Timeout(duration) => {
                ApiError::Timeout(format!("{} 秒内未返回结果", duration.as_secs()))
            }
            TransportError::Superseded { generation } => ApiError::Superseded(generation),
            TransportError::NotConfigured => {
                ApiError::ConfigError("未配置外部引擎程序 (engine/program)".to_string())
            }
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_transport_error_mapping() {
        let err: ApiError = TransportError::EngineFailed {
            code: Some(2),
            stderr: "bad data".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::SimulationFailed { code: Some(2), .. }));

        let err: ApiError = TransportError::OutputParse {
            message: "eof".to_string(),
            raw_output: "garbage".to_string(),
        }
        .into();
        match err {
            ApiError::ParseFailed { raw_output, .. } => assert_eq!(raw_output, "garbage"),
            other => panic!("unexpected: {other:?}"),
        }

        let err: ApiError = TransportError::Timeout(Duration::from_secs(5)).into();
        assert!(matches!(err, ApiError::Timeout(_)));
    }

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let err: ApiError = ImportError::FileNotFound("data/x.csv".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
