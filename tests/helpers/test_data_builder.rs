// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use subsidy_alloc::domain::EligibilityRecord;

// ==========================================
// EligibilityRecord 构建器
// ==========================================

pub struct RecordBuilder {
    entity_id: String,
    scheme_id: String,
    scheme_name: String,
    sector: Option<String>,
    category: Option<String>,
    growth_category: Option<String>,
    subsidy_amount: f64,
    revenue_increase_pct: f64,
    new_jobs_added: u32,
}

impl RecordBuilder {
    pub fn new(entity_id: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            scheme_id: "S1".to_string(),
            scheme_name: "Default Scheme".to_string(),
            sector: None,
            category: None,
            growth_category: None,
            subsidy_amount: 100_000.0,
            revenue_increase_pct: 10.0,
            new_jobs_added: 1,
        }
    }

    pub fn scheme(mut self, scheme_id: &str, scheme_name: &str) -> Self {
        self.scheme_id = scheme_id.to_string();
        self.scheme_name = scheme_name.to_string();
        self
    }

    pub fn sector(mut self, sector: &str) -> Self {
        self.sector = Some(sector.to_string());
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn growth(mut self, growth: &str) -> Self {
        self.growth_category = Some(growth.to_string());
        self
    }

    pub fn subsidy(mut self, amount: f64) -> Self {
        self.subsidy_amount = amount;
        self
    }

    pub fn revenue_pct(mut self, pct: f64) -> Self {
        self.revenue_increase_pct = pct;
        self
    }

    pub fn jobs(mut self, jobs: u32) -> Self {
        self.new_jobs_added = jobs;
        self
    }

    pub fn build(self) -> EligibilityRecord {
        let mut record = EligibilityRecord::new(
            self.entity_id,
            self.scheme_id,
            self.scheme_name,
            self.subsidy_amount,
            self.revenue_increase_pct,
            self.new_jobs_added,
        );
        if let Some(sector) = self.sector {
            record.sector = sector;
        }
        record.category = self.category;
        record.growth_category = self.growth_category;
        record
    }
}

/// 批量生成记录: 编号 0..count，金额与影响按编号错开
pub fn build_pool(count: usize) -> Vec<EligibilityRecord> {
    (0..count)
        .map(|i| {
            RecordBuilder::new(&format!("E{:03}", i))
                .scheme(&format!("S{}", i % 4), &format!("Scheme {}", i % 4))
                .category(["Micro", "Small", "Medium"][i % 3])
                .sector(["Textiles", "Retail"][i % 2])
                .subsidy(50_000.0 + (i % 7) as f64 * 25_000.0)
                .revenue_pct(((i * 13) % 60) as f64)
                .jobs(((i * 5) % 12) as u32)
                .build()
        })
        .collect()
}
