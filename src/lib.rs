// ==========================================
// 补贴预算分配引擎 - 核心库
// ==========================================
// 系统定位: 预算约束下的多目标（收入 / 就业）补贴分配
// 执行方式: 进程内调用 或 外部引擎进程（JSON 协议）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与报告类型
pub mod domain;

// 引擎层 - 评分 / 分配 / 汇总
pub mod engine;

// 导入层 - 外部数据源
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 传输层 - 进程内 / 外部进程
pub mod transport;

// 报告层 - 文本评估报告
pub mod report;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    AllocationCaps, AllocationConfig, AllocationReport, DistributionMode, EligibilityRecord,
    GroupBreakdown, RejectedRecord, RejectionReason, ScoredRecord, SelectedRecord,
};

pub use engine::{
    AllocationEngine, CategoryBudgetAllocator, GreedyAllocator, ReportAggregator,
    ScoreCalculator, SensitivityAnalyzer,
};

pub use importer::{FeedLoader, FieldMapper, ImportError, UniversalFileParser};

pub use config::{AllocationConfigReader, ConfigError, ConfigManager};

pub use transport::{
    extract_json_document, AllocationTransport, InProcessTransport, ProcessTransport,
    SimulationRequest, SimulationSession, TransportError,
};

pub use report::TextReportRenderer;

pub use api::{ApiError, SimulationApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "补贴预算分配引擎";
