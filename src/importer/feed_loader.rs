// ==========================================
// 补贴预算分配引擎 - 数据源加载器
// ==========================================
// 职责: 读取资格记录 / 补贴计划 / 受益主体三类表格并按标识关联
// 输入: 数据目录下的表格文件（CSV / Excel）
// 输出: 可直接送入 AllocationEngine 的资格记录
// ==========================================

use crate::domain::record::{EligibilityRecord, UNKNOWN_SECTOR};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{
    EntityProfile, FieldMapper, RowExclusion, SchemeInfo, ENTITY_ID_COLUMNS,
};
use crate::importer::file_parser::UniversalFileParser;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// 默认文件名
pub const ELIGIBILITY_FILE: &str = "scheme_eligibility_results.csv";
pub const SCHEMES_FILE: &str = "schemes_data.csv";
pub const ENTITIES_FILE: &str = "msme_data.csv";

// ==========================================
// FeedPaths - 数据源路径
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPaths {
    pub eligibility: PathBuf,
    pub schemes: Option<PathBuf>,
    pub entities: Option<PathBuf>,
}

impl FeedPaths {
    /// 数据目录下的默认文件；计划/主体元数据文件不存在时忽略
    pub fn in_data_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        let dir = data_dir.as_ref();
        let optional = |name: &str| Some(dir.join(name)).filter(|p| p.exists());
        Self {
            eligibility: dir.join(ELIGIBILITY_FILE),
            schemes: optional(SCHEMES_FILE),
            entities: optional(ENTITIES_FILE),
        }
    }
}

/// 解析配置的数据目录
///
/// - 绝对路径原样返回
/// - 相对路径优先取 cwd 下的同名目录
/// - 否则若 cwd 本身就含资格记录文件（作为外部引擎在数据目录中启动），取 cwd
pub fn resolve_data_dir(configured: &Path, cwd: &Path) -> PathBuf {
    if configured.is_absolute() {
        return configured.to_path_buf();
    }
    let joined = cwd.join(configured);
    if !joined.is_dir() && cwd.join(ELIGIBILITY_FILE).is_file() {
        return cwd.to_path_buf();
    }
    joined
}

// ==========================================
// LoadedFeed - 加载结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct LoadedFeed {
    pub records: Vec<EligibilityRecord>,
    pub schemes: HashMap<String, SchemeInfo>,
    /// 因结构缺陷被排除的行
    pub exclusions: Vec<RowExclusion>,
    /// 非单计划模拟行（不参与分配）
    pub filtered_out: usize,
    /// 补贴金额超过计划上限的记录数（仅告警）
    pub over_max_subsidy: usize,
}

// ==========================================
// FeedLoader - 数据源加载器
// ==========================================
pub struct FeedLoader {
    parser: UniversalFileParser,
    mapper: FieldMapper,
}

impl FeedLoader {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
            mapper: FieldMapper,
        }
    }

    /// 加载并关联三类数据源
    ///
    /// 行业 / 类别 / 成长等级取值顺序: 主体元数据 → 资格行自身 → 默认值
    #[instrument(skip(self), fields(eligibility = %paths.eligibility.display()))]
    pub fn load(&self, paths: &FeedPaths) -> ImportResult<LoadedFeed> {
        let schemes = match &paths.schemes {
            Some(path) => self.load_schemes(path)?,
            None => HashMap::new(),
        };
        let entities = match &paths.entities {
            Some(path) => self.load_entities(path)?,
            None => HashMap::new(),
        };

        let rows = self.parser.parse(&paths.eligibility)?;
        if let Some(first) = rows.first() {
            if !ENTITY_ID_COLUMNS.iter().any(|c| first.contains_key(*c)) {
                return Err(ImportError::MissingColumn {
                    file: paths.eligibility.display().to_string(),
                    column: ENTITY_ID_COLUMNS[0].to_string(),
                });
            }
        }
        let mut loaded = LoadedFeed {
            schemes,
            ..LoadedFeed::default()
        };

        for (idx, row) in rows.iter().enumerate() {
            let row_no = idx + 1;
            if !self.mapper.is_single_scheme(row) {
                loaded.filtered_out += 1;
                continue;
            }

            let mut record = match self.mapper.map_eligibility(row, row_no) {
                Ok(record) => record,
                Err(exclusion) => {
                    warn!(row = exclusion.row, reason = %exclusion.reason, "资格记录被排除");
                    loaded.exclusions.push(exclusion);
                    continue;
                }
            };

            let profile = entities.get(&record.entity_id);
            resolve_entity(&mut record, profile);

            if let Some(scheme) = loaded.schemes.get(&record.scheme_id) {
                if record.scheme_name.is_empty() {
                    record.scheme_name = scheme.scheme_name.clone();
                }
                if scheme.max_subsidy.is_some_and(|max| record.subsidy_amount > max) {
                    loaded.over_max_subsidy += 1;
                }
            }

            loaded.records.push(record);
        }

        if loaded.over_max_subsidy > 0 {
            warn!(count = loaded.over_max_subsidy, "部分记录补贴金额超过计划上限");
        }
        info!(
            records = loaded.records.len(),
            excluded = loaded.exclusions.len(),
            filtered_out = loaded.filtered_out,
            "资格记录加载完成"
        );
        Ok(loaded)
    }

    /// 从数据目录加载（资格记录文件必须存在）
    pub fn load_from_dir<P: AsRef<Path>>(&self, data_dir: P) -> ImportResult<LoadedFeed> {
        let paths = FeedPaths::in_data_dir(data_dir);
        if !paths.eligibility.exists() {
            return Err(ImportError::FileNotFound(paths.eligibility.display().to_string()));
        }
        self.load(&paths)
    }

    fn load_schemes(&self, path: &Path) -> ImportResult<HashMap<String, SchemeInfo>> {
        let rows = self.parser.parse(path)?;
        Ok(rows
            .iter()
            .filter_map(|row| self.mapper.map_scheme(row))
            .map(|s| (s.scheme_id.clone(), s))
            .collect())
    }

    fn load_entities(&self, path: &Path) -> ImportResult<HashMap<String, EntityProfile>> {
        let rows = self.parser.parse(path)?;
        Ok(rows
            .iter()
            .filter_map(|row| self.mapper.map_entity(row))
            .map(|e| (e.entity_id.clone(), e))
            .collect())
    }
}

impl Default for FeedLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_entity(record: &mut EligibilityRecord, profile: Option<&EntityProfile>) {
    let Some(profile) = profile else {
        return;
    };
    if let Some(sector) = &profile.sector {
        record.sector = sector.clone();
    }
    if profile.category.is_some() {
        record.category = profile.category.clone();
    }
    if profile.growth_category.is_some() {
        record.growth_category = profile.growth_category.clone();
    }
    if record.sector.trim().is_empty() {
        record.sector = UNKNOWN_SECTOR.to_string();
    }
}
