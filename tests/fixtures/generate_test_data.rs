// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成一套样例数据源（资格记录 / 补贴计划 / 受益主体）
// 输出: <目录>/*.csv（默认 data/）
// 用法: cargo run --bin generate_test_data -- [输出目录]
// ==========================================

use csv::Writer;
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

const ENTITY_COUNT: usize = 120;

const SECTORS: &[&str] = &["Manufacturing", "Textiles", "Food Processing", "IT Services", "Retail"];
const CATEGORIES: &[&str] = &["Micro", "Small", "Medium"];
const GROWTH: &[&str] = &["High", "Moderate", "Low"];

// (scheme_id, scheme_name, max_subsidy)
const SCHEMES: &[(&str, &str, f64)] = &[
    ("SCH01", "Credit Guarantee Scheme", 2_000_000.0),
    ("SCH02", "Technology Upgradation Fund", 1_500_000.0),
    ("SCH03", "Market Development Assistance", 500_000.0),
    ("SCH04", "Skill Development Grant", 800_000.0),
    ("SCH05", "Cluster Development Programme", 3_000_000.0),
];

fn main() -> Result<(), Box<dyn Error>> {
    let out_dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let out_dir = Path::new(&out_dir);
    fs::create_dir_all(out_dir)?;

    println!("开始生成样例数据源 → {}", out_dir.display());
    generate_schemes(out_dir)?;
    generate_entities(out_dir)?;
    let rows = generate_eligibility(out_dir)?;
    println!("✓ 样例数据生成完成（资格记录 {} 行）", rows);
    Ok(())
}

fn generate_schemes(dir: &Path) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(dir.join("schemes_data.csv"))?);
    wtr.write_record(["Scheme_ID", "Scheme_Name", "Max_Subsidy_Amount"])?;
    for (id, name, max) in SCHEMES {
        wtr.write_record([id.to_string(), name.to_string(), format!("{:.0}", max)])?;
    }
    wtr.flush()?;
    println!("✓ 生成 schemes_data.csv ({}条)", SCHEMES.len());
    Ok(())
}

fn generate_entities(dir: &Path) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(dir.join("msme_data.csv"))?);
    wtr.write_record(["MSME_ID", "Sector", "Category", "Growth_Category"])?;
    for i in 0..ENTITY_COUNT {
        wtr.write_record([
            entity_id(i),
            SECTORS[i % SECTORS.len()].to_string(),
            CATEGORIES[(i / 2) % CATEGORIES.len()].to_string(),
            GROWTH[(i * 7) % GROWTH.len()].to_string(),
        ])?;
    }
    wtr.flush()?;
    println!("✓ 生成 msme_data.csv ({}条)", ENTITY_COUNT);
    Ok(())
}

fn generate_eligibility(dir: &Path) -> Result<usize, Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(dir.join("scheme_eligibility_results.csv"))?);
    wtr.write_record([
        "MSME_ID",
        "Scheme_ID",
        "Simulation_Type",
        "Subsidy_Applied",
        "Revenue_Increase_Pct",
        "New_Jobs_Added",
    ])?;

    let mut rows = 0;
    for i in 0..ENTITY_COUNT {
        // 每个主体合格 1~3 个计划
        let eligible = 1 + (i * 13) % 3;
        for k in 0..eligible {
            let (scheme_id, _, max) = SCHEMES[(i + k * 2) % SCHEMES.len()];
            let subsidy = (max * (0.3 + ((i * 37 + k * 11) % 60) as f64 / 100.0)).round();
            let revenue_pct = 2.0 + ((i * 17 + k * 5) % 450) as f64 / 10.0;
            let jobs = (i * 3 + k * 7) % 25;

            wtr.write_record([
                entity_id(i),
                scheme_id.to_string(),
                "Single_Scheme".to_string(),
                format!("{:.0}", subsidy),
                format!("{:.1}", revenue_pct),
                jobs.to_string(),
            ])?;
            rows += 1;
        }

        // 组合模拟行（加载时应被过滤）
        if i % 10 == 0 {
            wtr.write_record([
                entity_id(i),
                "SCH01+SCH02".to_string(),
                "Combined".to_string(),
                "2500000".to_string(),
                "30.0".to_string(),
                "12".to_string(),
            ])?;
            rows += 1;
        }
    }

    // 缺少补贴金额的行（加载时应被排除）
    wtr.write_record([entity_id(0), "SCH03".to_string(), "Single_Scheme".to_string(), String::new(), "5.0".to_string(), "1".to_string()])?;
    rows += 1;

    wtr.flush()?;
    println!("✓ 生成 scheme_eligibility_results.csv ({}条)", rows);
    Ok(rows)
}

fn entity_id(index: usize) -> String {
    format!("MSME{:04}", index + 1)
}
