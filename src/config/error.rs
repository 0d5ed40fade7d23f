// ==========================================
// 补贴预算分配引擎 - 配置层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("锁获取失败: {0}")]
    LockPoisoned(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
