// ==========================================
// 补贴预算分配引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 规则: 缺失或无法解析的配置值一律回退默认值
// ==========================================

use crate::config::allocation_config_trait::AllocationConfigReader;
use crate::config::error::{ConfigError, ConfigResult};
use crate::db::{configure_sqlite_connection, ensure_config_schema, open_sqlite_connection};
use crate::domain::allocation::{
    default_category_shares, AllocationCaps, CategoryShare, DEFAULT_ALPHA, DEFAULT_BUDGET,
    DEFAULT_MAX_REJECTED, DEFAULT_MAX_SELECTED,
};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::warn;

/// 外部引擎默认超时（秒）
pub const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 120;
/// 默认数据目录
pub const DEFAULT_DATA_DIR: &str = "data";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 内存数据库（测试 / 临时会话）
    pub fn in_memory() -> ConfigResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA 与 schema（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = lock(&conn)?;
            configure_sqlite_connection(&guard)?;
            ensure_config_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    // ==========================================
    // 读写
    // ==========================================

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = lock(&self.conn)?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 删除 global scope 的配置值（恢复默认）
    pub fn remove_global_config_value(&self, key: &str) -> ConfigResult<bool> {
        let conn = lock(&self.conn)?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
        )?;
        Ok(affected > 0)
    }

    /// 列出所有 global 配置（按 key 排序）
    pub fn list_configs(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = lock(&self.conn)?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut configs = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            configs.insert(key, value);
        }
        Ok(configs)
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(&self.list_configs()?)?)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取数值配置；无法解析时告警并回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: std::str::FromStr + Copy,
    {
        match self.get_global_config_value(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(value) => Ok(value),
                Err(_) => {
                    warn!(key, value = %raw, "配置值无法解析，使用默认值");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }
}

// ==========================================
// AllocationConfigReader 实现
// ==========================================
#[async_trait]
impl AllocationConfigReader for ConfigManager {
    async fn get_default_budget(&self) -> ConfigResult<f64> {
        let budget = self.get_parsed_or_default(config_keys::DEFAULT_BUDGET, DEFAULT_BUDGET)?;
        Ok(if budget.is_finite() { budget } else { DEFAULT_BUDGET })
    }

    async fn get_default_alpha(&self) -> ConfigResult<f64> {
        let alpha = self.get_parsed_or_default(config_keys::DEFAULT_ALPHA, DEFAULT_ALPHA)?;
        Ok(if alpha.is_finite() { alpha } else { DEFAULT_ALPHA })
    }

    async fn get_caps(&self) -> ConfigResult<AllocationCaps> {
        Ok(AllocationCaps {
            max_selected: self
                .get_parsed_or_default(config_keys::MAX_SELECTED, DEFAULT_MAX_SELECTED)?,
            max_rejected: self
                .get_parsed_or_default(config_keys::MAX_REJECTED, DEFAULT_MAX_REJECTED)?,
        })
    }

    async fn get_category_shares(&self) -> ConfigResult<Vec<CategoryShare>> {
        let Some(raw) = self.get_global_config_value(config_keys::CATEGORY_SHARES)? else {
            return Ok(default_category_shares());
        };
        match parse_category_shares(&raw) {
            Some(shares) => Ok(shares),
            None => {
                warn!(value = %raw, "类别子预算比例格式错误，使用默认值");
                Ok(default_category_shares())
            }
        }
    }

    async fn get_engine_program(&self) -> ConfigResult<Option<String>> {
        Ok(self
            .get_global_config_value(config_keys::ENGINE_PROGRAM)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    async fn get_engine_args(&self) -> ConfigResult<Vec<String>> {
        let raw = self.get_config_or_default(config_keys::ENGINE_ARGS, "")?;
        Ok(raw.split_whitespace().map(str::to_string).collect())
    }

    async fn get_engine_timeout(&self) -> ConfigResult<Duration> {
        let secs = self.get_parsed_or_default(
            config_keys::ENGINE_TIMEOUT_SECS,
            DEFAULT_ENGINE_TIMEOUT_SECS,
        )?;
        Ok(Duration::from_secs(secs.max(1)))
    }

    async fn get_data_dir(&self) -> ConfigResult<PathBuf> {
        Ok(PathBuf::from(
            self.get_config_or_default(config_keys::DATA_DIR, DEFAULT_DATA_DIR)?,
        ))
    }
}

/// 解析 "Micro:0.40,Small:0.35,Medium:0.25"
///
/// 任一片段格式错误、比例为负或非有限值时返回 None
pub fn parse_category_shares(raw: &str) -> Option<Vec<CategoryShare>> {
    let shares: Option<Vec<CategoryShare>> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|part| {
            let (category, share) = part.split_once(':')?;
            let share = share.trim().parse::<f64>().ok()?;
            let category = category.trim();
            if category.is_empty() || !share.is_finite() || share < 0.0 {
                return None;
            }
            Some(CategoryShare::new(category, share))
        })
        .collect();
    shares.filter(|s| !s.is_empty())
}

fn lock(conn: &Arc<Mutex<Connection>>) -> ConfigResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| ConfigError::LockPoisoned(e.to_string()))
}

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SUBSIDY_ALLOC_DB_PATH";

/// 获取默认数据库路径
///
/// 优先级: 环境变量 SUBSIDY_ALLOC_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./subsidy_alloc.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("subsidy-alloc");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("subsidy_alloc.db");
        }
    }

    path.to_string_lossy().to_string()
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 分配参数
    pub const DEFAULT_BUDGET: &str = "allocation/default_budget";
    pub const DEFAULT_ALPHA: &str = "allocation/default_alpha";
    pub const MAX_SELECTED: &str = "allocation/max_selected";
    pub const MAX_REJECTED: &str = "allocation/max_rejected";
    pub const CATEGORY_SHARES: &str = "allocation/category_shares";

    // 外部引擎
    pub const ENGINE_PROGRAM: &str = "engine/program";
    pub const ENGINE_ARGS: &str = "engine/args";
    pub const ENGINE_TIMEOUT_SECS: &str = "engine/timeout_secs";

    // 数据源
    pub const DATA_DIR: &str = "data/dir";

    /// 全部已知键（CLI 校验用）
    pub const ALL: &[&str] = &[
        DEFAULT_BUDGET,
        DEFAULT_ALPHA,
        MAX_SELECTED,
        MAX_REJECTED,
        CATEGORY_SHARES,
        ENGINE_PROGRAM,
        ENGINE_ARGS,
        ENGINE_TIMEOUT_SECS,
        DATA_DIR,
    ];
}
