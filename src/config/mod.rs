// ==========================================
// 补贴预算分配引擎 - 配置层
// ==========================================
// 职责: 系统配置管理,缺省值回退
// 存储: config_kv 表
// ==========================================

pub mod allocation_config_trait;
pub mod config_manager;
pub mod error;

// 重导出核心配置管理器
pub use allocation_config_trait::AllocationConfigReader;
pub use config_manager::{
    config_keys, get_default_db_path, parse_category_shares, ConfigManager, DB_PATH_ENV,
    DEFAULT_DATA_DIR, DEFAULT_ENGINE_TIMEOUT_SECS,
};
pub use error::{ConfigError, ConfigResult};
