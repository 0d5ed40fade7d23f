// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证配置读取、覆写与缺省回退
// ==========================================


use std::path::PathBuf;
use std::time::Duration;
use subsidy_alloc::config::{config_keys, AllocationConfigReader, ConfigManager};
use test_helpers::{create_test_db, insert_test_config, open_test_connection};

#[tokio::test]
async fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[tokio::test]
async fn test_reads_stored_values() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn).expect("Failed to insert test config");

    let config = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert_eq!(config.get_default_budget().await.unwrap(), 3_000_000.0);
    assert_eq!(config.get_default_alpha().await.unwrap(), 0.7);

    let caps = config.get_caps().await.unwrap();
    assert_eq!(caps.max_selected, 5);
    assert_eq!(caps.max_rejected, 3);

    let shares = config.get_category_shares().await.unwrap();
    assert_eq!(shares.len(), 2);
    assert_eq!(shares[0].category, "Micro");
    assert_eq!(shares[0].share, 0.5);

    assert_eq!(
        config.get_engine_program().await.unwrap().as_deref(),
        Some("python3")
    );
    assert_eq!(
        config.get_engine_args().await.unwrap(),
        vec!["optimization_engine.py", "--quiet"]
    );
    assert_eq!(
        config.get_engine_timeout().await.unwrap(),
        Duration::from_secs(30)
    );
    assert_eq!(
        config.get_data_dir().await.unwrap(),
        PathBuf::from("/srv/feeds")
    );
}

#[tokio::test]
async fn test_defaults_without_overrides() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert_eq!(config.get_default_budget().await.unwrap(), 50_000_000.0);
    assert_eq!(config.get_default_alpha().await.unwrap(), 0.6);
    let caps = config.get_caps().await.unwrap();
    assert_eq!((caps.max_selected, caps.max_rejected), (50, 20));

    let shares = config.get_category_shares().await.unwrap();
    let categories: Vec<&str> = shares.iter().map(|s| s.category.as_str()).collect();
    assert_eq!(categories, vec!["Micro", "Small", "Medium"]);

    assert!(config.get_engine_program().await.unwrap().is_none());
    assert!(config.get_engine_args().await.unwrap().is_empty());
    assert_eq!(config.get_data_dir().await.unwrap(), PathBuf::from("data"));
}

#[tokio::test]
async fn test_invalid_values_fall_back() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config
        .set_global_config_value(config_keys::MAX_SELECTED, "many")
        .unwrap();
    config
        .set_global_config_value(config_keys::CATEGORY_SHARES, "Micro=all")
        .unwrap();
    config
        .set_global_config_value(config_keys::ENGINE_TIMEOUT_SECS, "0")
        .unwrap();

    assert_eq!(config.get_caps().await.unwrap().max_selected, 50);
    assert_eq!(config.get_category_shares().await.unwrap().len(), 3);
    assert_eq!(
        config.get_engine_timeout().await.unwrap(),
        Duration::from_secs(1)
    );
}

#[tokio::test]
async fn test_overrides_persist_across_instances() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    {
        let config = ConfigManager::new(&db_path).unwrap();
        config
            .set_global_config_value(config_keys::DEFAULT_ALPHA, "0.25")
            .unwrap();
    }

    let config = ConfigManager::new(&db_path).unwrap();
    assert_eq!(config.get_default_alpha().await.unwrap(), 0.25);

    let snapshot: serde_json::Value =
        serde_json::from_str(&config.get_config_snapshot().unwrap()).unwrap();
    assert_eq!(snapshot[config_keys::DEFAULT_ALPHA], "0.25");
}
