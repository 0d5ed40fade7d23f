// ==========================================
// 补贴预算分配引擎 - 分配配置读取 Trait
// ==========================================
// 职责: 定义分配引擎与外部引擎调用所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::domain::allocation::{AllocationCaps, CategoryShare};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

// ==========================================
// AllocationConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait AllocationConfigReader: Send + Sync {
    // ===== 分配参数 =====

    /// 默认总预算
    ///
    /// # 默认值
    /// - 50000000
    async fn get_default_budget(&self) -> ConfigResult<f64>;

    /// 默认收入权重 alpha
    ///
    /// # 默认值
    /// - 0.6
    async fn get_default_alpha(&self) -> ConfigResult<f64>;

    /// 名单长度上限
    ///
    /// # 默认值
    /// - max_selected = 50, max_rejected = 20
    async fn get_caps(&self) -> ConfigResult<AllocationCaps>;

    /// 类别子预算比例
    ///
    /// # 默认值
    /// - Micro:0.40,Small:0.35,Medium:0.25
    async fn get_category_shares(&self) -> ConfigResult<Vec<CategoryShare>>;

    // ===== 外部引擎 =====

    /// 外部引擎程序（None 表示未配置，只能进程内计算）
    async fn get_engine_program(&self) -> ConfigResult<Option<String>>;

    /// 外部引擎固定参数（追加在 --budget/--alpha/--json-out 之前）
    async fn get_engine_args(&self) -> ConfigResult<Vec<String>>;

    /// 外部引擎超时
    ///
    /// # 默认值
    /// - 120 秒
    async fn get_engine_timeout(&self) -> ConfigResult<Duration>;

    /// 数据目录（外部引擎工作目录 / 数据源所在目录）
    ///
    /// # 默认值
    /// - data
    async fn get_data_dir(&self) -> ConfigResult<PathBuf>;
}
