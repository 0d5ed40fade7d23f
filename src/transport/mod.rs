// ==========================================
// 补贴预算分配引擎 - 传输层
// ==========================================
// 职责: 同一份 JSON 报告结构，两种执行方式
// - InProcessTransport: 进程内调用 AllocationEngine（spawn_blocking）
// - ProcessTransport: 调用外部引擎进程，解析标准输出
// ==========================================

pub mod error;
pub mod in_process;
pub mod output;
pub mod process;
pub mod session;

use crate::domain::allocation::{clamp_alpha, clamp_budget, AllocationReport, DEFAULT_ALPHA, DEFAULT_BUDGET};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{TransportError, TransportResult};
pub use in_process::InProcessTransport;
pub use output::extract_json_document;
pub use process::ProcessTransport;
pub use session::SimulationSession;

// ==========================================
// SimulationRequest - 模拟请求
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    #[serde(default = "default_budget")]
    pub budget: f64,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_budget() -> f64 {
    DEFAULT_BUDGET
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl SimulationRequest {
    pub fn new(budget: f64, alpha: f64) -> Self {
        Self { budget, alpha }
    }

    /// 边界归一化: alpha ∈ [0, 1]，budget ≥ 0
    pub fn normalized(self) -> Self {
        Self {
            budget: clamp_budget(self.budget),
            alpha: clamp_alpha(self.alpha),
        }
    }
}

// ==========================================
// AllocationTransport Trait
// ==========================================
// 实现者: InProcessTransport, ProcessTransport
#[async_trait]
pub trait AllocationTransport: Send + Sync {
    /// 执行一次分配模拟
    async fn simulate(&self, request: &SimulationRequest) -> TransportResult<AllocationReport>;

    /// 传输方式名称（日志用）
    fn name(&self) -> &'static str;
}
