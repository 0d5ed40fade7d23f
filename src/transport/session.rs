// ==========================================
// 补贴预算分配引擎 - 模拟会话
// ==========================================
// 交互场景下参数频繁变动: 每次运行分配递增代号，
// 返回时若已有更新的运行开始，则本次结果作废（最新请求优先）
// ==========================================

use crate::domain::allocation::AllocationReport;
use crate::transport::error::{TransportError, TransportResult};
use crate::transport::{AllocationTransport, SimulationRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

pub struct SimulationSession {
    transport: Arc<dyn AllocationTransport>,
    generation: AtomicU64,
}

impl SimulationSession {
    pub fn new(transport: Arc<dyn AllocationTransport>) -> Self {
        Self {
            transport,
            generation: AtomicU64::new(0),
        }
    }

    /// 最近一次运行的代号（0 表示尚未运行）
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn transport(&self) -> &Arc<dyn AllocationTransport> {
        &self.transport
    }

    /// 执行一次模拟；被更新的运行取代时返回 Superseded
    pub async fn run(&self, request: &SimulationRequest) -> TransportResult<AllocationReport> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.transport.simulate(request).await;

        let latest = self.latest_generation();
        if latest != generation {
            debug!(generation, latest, "结果已被更新的运行取代");
            return Err(TransportError::Superseded { generation });
        }
        result
    }
}
