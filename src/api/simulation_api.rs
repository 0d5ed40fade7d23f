// ==========================================
// 补贴预算分配引擎 - 模拟 API
// ==========================================
// 职责: 绑定配置与传输方式，对外提供一次完整的分配模拟
// 流程: 参数缺省/收敛 → 传输执行（会话代号）→ 记录结果
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::AllocationConfigReader;
use crate::domain::allocation::{AllocationConfig, AllocationReport};
use crate::domain::record::EligibilityRecord;
use crate::domain::types::DistributionMode;
use crate::transport::{
    AllocationTransport, InProcessTransport, ProcessTransport, SimulationRequest,
    SimulationSession, TransportError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 模拟结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: i64,
    /// 传输方式（in_process / process）
    pub transport: String,
    /// 实际执行的（收敛后）参数
    pub request: SimulationRequest,
    pub report: AllocationReport,
}

pub struct SimulationApi {
    config: Arc<dyn AllocationConfigReader>,
    session: SimulationSession,
}

impl SimulationApi {
    pub fn new(
        config: Arc<dyn AllocationConfigReader>,
        transport: Arc<dyn AllocationTransport>,
    ) -> Self {
        Self {
            config,
            session: SimulationSession::new(transport),
        }
    }

    /// 进程内模拟（名额上限 / 类别比例取自配置）
    pub async fn in_process(
        config: Arc<dyn AllocationConfigReader>,
        records: Vec<EligibilityRecord>,
        mode: DistributionMode,
    ) -> ApiResult<Self> {
        let template = AllocationConfig::default()
            .with_caps(config.get_caps().await?)
            .with_mode(mode)
            .with_category_shares(config.get_category_shares().await?);
        let transport = InProcessTransport::with_shared(Arc::new(records), template);
        info!(records_count = transport.records_count(), mode = %mode, "进程内模拟已就绪");
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// 外部进程模拟（程序 / 参数 / 超时 / 工作目录取自配置）
    pub async fn external(config: Arc<dyn AllocationConfigReader>) -> ApiResult<Self> {
        let program = config
            .get_engine_program()
            .await?
            .ok_or(TransportError::NotConfigured)?;
        let transport = ProcessTransport::new(program)
            .with_args(config.get_engine_args().await?)
            .with_timeout(config.get_engine_timeout().await?)
            .with_working_dir(config.get_data_dir().await?);
        info!(
            program = transport.program(),
            timeout_secs = transport.timeout().as_secs(),
            "外部引擎已配置"
        );
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// 缺省参数取配置值，再做边界收敛
    pub async fn resolve_request(
        &self,
        budget: Option<f64>,
        alpha: Option<f64>,
    ) -> ApiResult<SimulationRequest> {
        let budget = match budget {
            Some(v) => v,
            None => self.config.get_default_budget().await?,
        };
        let alpha = match alpha {
            Some(v) => v,
            None => self.config.get_default_alpha().await?,
        };
        let request = SimulationRequest::new(budget, alpha);
        let normalized = request.normalized();
        if normalized != request {
            warn!(
                budget_in = budget,
                alpha_in = alpha,
                budget = normalized.budget,
                alpha = normalized.alpha,
                "模拟参数越界，已收敛"
            );
        }
        Ok(normalized)
    }

    /// 执行一次模拟
    #[instrument(skip(self))]
    pub async fn simulate(
        &self,
        budget: Option<f64>,
        alpha: Option<f64>,
    ) -> ApiResult<SimulationOutcome> {
        let request = self.resolve_request(budget, alpha).await?;
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let timer = Instant::now();
        let transport = self.session.transport().name();

        info!(%run_id, transport, budget = request.budget, alpha = request.alpha, "开始分配模拟");

        let report = self.session.run(&request).await.map_err(|e| {
            warn!(%run_id, error = %e, "分配模拟失败");
            ApiError::from(e)
        })?;

        let elapsed_ms = timer.elapsed().as_millis() as i64;
        info!(
            %run_id,
            elapsed_ms,
            selected = report.total_selected,
            budget_used = report.budget_used,
            "分配模拟完成"
        );

        Ok(SimulationOutcome {
            run_id,
            started_at,
            elapsed_ms,
            transport: transport.to_string(),
            request,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{config_keys, ConfigManager};

    fn records() -> Vec<EligibilityRecord> {
        vec![
            EligibilityRecord::new("A", "S1", "Grant", 1_000_000.0, 5.0, 10),
            EligibilityRecord::new("B", "S1", "Grant", 2_000_000.0, 8.0, 5),
            EligibilityRecord::new("C", "S2", "Loan", 1_500_000.0, 3.0, 20),
        ]
    }

    #[tokio::test]
    async fn test_defaults_come_from_config() {
        let manager = ConfigManager::in_memory().unwrap();
        manager
            .set_global_config_value(config_keys::DEFAULT_BUDGET, "3000000")
            .unwrap();
        let api = SimulationApi::in_process(Arc::new(manager), records(), DistributionMode::GlobalGreedy)
            .await
            .unwrap();

        let outcome = api.simulate(None, None).await.unwrap();
        assert_eq!(outcome.request.budget, 3_000_000.0);
        assert_eq!(outcome.request.alpha, 0.6);
        assert_eq!(outcome.transport, "in_process");
        assert_eq!(outcome.report.total_selected, 2);
        assert_eq!(outcome.report.budget_used, 2_500_000.0);
    }

    #[tokio::test]
    async fn test_out_of_range_alpha_is_clamped() {
        let manager = ConfigManager::in_memory().unwrap();
        let api = SimulationApi::in_process(Arc::new(manager), records(), DistributionMode::GlobalGreedy)
            .await
            .unwrap();
        let outcome = api.simulate(Some(3_000_000.0), Some(-0.5)).await.unwrap();
        assert_eq!(outcome.request.alpha, 0.0);
        assert_eq!(outcome.report.beta, 1.0);
    }

    #[tokio::test]
    async fn test_external_requires_program() {
        let manager = ConfigManager::in_memory().unwrap();
        let err = SimulationApi::external(Arc::new(manager)).await.err().unwrap();
        assert!(matches!(err, ApiError::ConfigError(_)));
    }
}
