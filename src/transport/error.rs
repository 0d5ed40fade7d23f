// ==========================================
// 补贴预算分配引擎 - 传输层错误类型
// ==========================================
// 区分: 外部引擎非零退出 / 输出无法解析 / 超时 / 启动失败
// 规则: 全部不重试，由调用方决定
// ==========================================

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("外部引擎启动失败 ({program}): {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("外部引擎异常退出 (code: {code:?}): {stderr}")]
    EngineFailed { code: Option<i32>, stderr: String },

    #[error("外部引擎输出无法解析: {message}")]
    OutputParse { message: String, raw_output: String },

    #[error("外部引擎超时 ({0:?})")]
    Timeout(Duration),

    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("计算任务执行失败: {0}")]
    Join(String),

    #[error("结果已过期: run {generation} 之后已有更新的请求")]
    Superseded { generation: u64 },

    #[error("外部引擎未配置")]
    NotConfigured,
}

impl TransportError {
    /// 原始输出（仅解析失败时存在）
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            TransportError::OutputParse { raw_output, .. } => Some(raw_output),
            _ => None,
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
