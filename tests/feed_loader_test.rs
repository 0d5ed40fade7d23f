// ==========================================
// 数据源加载集成测试
// ==========================================
// 测试范围:
// 1. 三类数据源关联（计划名称 / 行业 / 类别）
// 2. 宽松数值转换与行排除
// 3. 加载结果直接送入分配引擎
// ==========================================


use subsidy_alloc::domain::{AllocationConfig, DistributionMode, UNKNOWN_SECTOR};
use subsidy_alloc::engine::AllocationEngine;
use subsidy_alloc::importer::{FeedLoader, FeedPaths, ImportError};
use tempfile::tempdir;
use test_helpers::write_feed;

const ELIGIBILITY: &str = "\u{feff}MSME_ID,Scheme_ID,Simulation_Type,Subsidy_Applied,Revenue_Increase_Pct,New_Jobs_Added
M1,S1,Single_Scheme,1000000,5,10
M2,S1,Single_Scheme,2000000,8,5
M3,S2,Single_Scheme,1500000,3,20
M3,S1+S2,Combined,2500000,9,25
M4,S2,Single_Scheme,\"600,000\",n/a,-3
M5,S2,Single_Scheme,,4,1
";

const SCHEMES: &str = "Scheme_ID,Scheme_Name,Max_Subsidy_Amount
S1,Credit Guarantee Scheme,1500000
S2,Technology Upgradation Fund,2000000
";

const ENTITIES: &str = "MSME_ID,Sector,Category,Growth_Category
M1,Textiles,Micro,High
M2,Retail,Small,Moderate
M3,Textiles,Micro,
";

#[test]
fn test_load_and_join_feeds() {
    let dir = tempdir().unwrap();
    let paths = FeedPaths {
        eligibility: write_feed(dir.path(), "eligibility.csv", ELIGIBILITY),
        schemes: Some(write_feed(dir.path(), "schemes.csv", SCHEMES)),
        entities: Some(write_feed(dir.path(), "entities.csv", ENTITIES)),
    };

    let loaded = FeedLoader::new().load(&paths).unwrap();

    let ids: Vec<&str> = loaded.records.iter().map(|r| r.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["M1", "M2", "M3", "M4"]);
    assert_eq!(loaded.filtered_out, 1);
    assert_eq!(loaded.exclusions.len(), 1);
    assert_eq!(loaded.exclusions[0].row, 6);
    // M2 申请 2,000,000 超过 S1 上限 1,500,000
    assert_eq!(loaded.over_max_subsidy, 1);

    let m1 = &loaded.records[0];
    assert_eq!(m1.scheme_name, "Credit Guarantee Scheme");
    assert_eq!(m1.sector, "Textiles");
    assert_eq!(m1.category.as_deref(), Some("Micro"));
    assert_eq!(m1.growth_label(), "High");

    let m3 = &loaded.records[2];
    assert_eq!(m3.growth_label(), "Growth");

    let m4 = &loaded.records[3];
    assert_eq!(m4.sector, UNKNOWN_SECTOR);
    assert_eq!(m4.subsidy_amount, 600_000.0);
    assert_eq!(m4.revenue_increase_pct, 0.0);
    assert_eq!(m4.new_jobs_added, 0);
}

#[test]
fn test_loaded_feed_runs_through_engine() {
    let dir = tempdir().unwrap();
    let paths = FeedPaths {
        eligibility: write_feed(dir.path(), "eligibility.csv", ELIGIBILITY),
        schemes: Some(write_feed(dir.path(), "schemes.csv", SCHEMES)),
        entities: Some(write_feed(dir.path(), "entities.csv", ENTITIES)),
    };
    let loaded = FeedLoader::new().load(&paths).unwrap();

    let report = AllocationEngine::new().run(&loaded.records, 3_000_000.0, 0.6);
    let ids: Vec<&str> = report
        .selected
        .iter()
        .map(|s| s.record.entity_id.as_str())
        .collect();
    assert_eq!(ids, vec!["M3", "M1"]);
    assert_eq!(report.total_jobs_created, 30);
    assert_eq!(report.by_sector[0].key, "Textiles");
    assert_eq!(report.by_scheme.len(), 2);
    assert_eq!(report.total_evaluated(), 4);

    // 子预算模式: M4 无类别 → 未处理
    let config = AllocationConfig::new(3_000_000.0, 0.6).with_mode(DistributionMode::CategorySubBudgets);
    let report = AllocationEngine::new().run_with_config(&loaded.records, &config);
    assert_eq!(report.total_unprocessed, 1);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempdir().unwrap();
    let paths = FeedPaths {
        eligibility: write_feed(dir.path(), "eligibility.json", "{}"),
        schemes: None,
        entities: None,
    };
    let err = FeedLoader::new().load(&paths).unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let paths = FeedPaths {
        eligibility: dir.path().join("absent.csv"),
        schemes: None,
        entities: None,
    };
    let err = FeedLoader::new().load(&paths).unwrap_err();
    assert!(err.is_not_found());
}
