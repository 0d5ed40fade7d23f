// ==========================================
// 补贴预算分配引擎 - 进程内传输
// ==========================================
// 引擎为同步纯计算: 放入 blocking 线程池执行，避免阻塞异步运行时
// ==========================================

use crate::domain::allocation::{AllocationConfig, AllocationReport};
use crate::domain::record::EligibilityRecord;
use crate::engine::AllocationEngine;
use crate::transport::error::{TransportError, TransportResult};
use crate::transport::{AllocationTransport, SimulationRequest};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub struct InProcessTransport {
    records: Arc<Vec<EligibilityRecord>>,
    // 名额上限 / 分配模式 / 类别比例；budget 与 alpha 由请求覆盖
    template: AllocationConfig,
}

impl InProcessTransport {
    pub fn new(records: Vec<EligibilityRecord>) -> Self {
        Self::with_shared(Arc::new(records), AllocationConfig::default())
    }

    pub fn with_shared(records: Arc<Vec<EligibilityRecord>>, template: AllocationConfig) -> Self {
        Self { records, template }
    }

    pub fn records_count(&self) -> usize {
        self.records.len()
    }
}

#[async_trait]
impl AllocationTransport for InProcessTransport {
    async fn simulate(&self, request: &SimulationRequest) -> TransportResult<AllocationReport> {
        let request = request.normalized();
        let mut config = self.template.clone();
        config.budget = request.budget;
        config.alpha = request.alpha;

        let records = Arc::clone(&self.records);
        debug!(records_count = records.len(), "提交进程内分配任务");

        tokio::task::spawn_blocking(move || AllocationEngine::new().run_with_config(&records, &config))
            .await
            .map_err(|e| TransportError::Join(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "in_process"
    }
}
