// ==========================================
// 补贴预算分配引擎 - 导入层
// ==========================================
// 职责: 只读加载外部表格数据源,生成资格记录
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod feed_loader;
pub mod feed_trait;
pub mod field_mapper;
pub mod file_parser;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use feed_loader::{resolve_data_dir, FeedLoader, FeedPaths, LoadedFeed};
pub use feed_trait::{FileParser, RawRow};
pub use field_mapper::{EntityProfile, FieldMapper, RowExclusion, SchemeInfo};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
