// ==========================================
// 补贴预算分配引擎 - API 层
// ==========================================
// 职责: 对外业务接口，统一错误转换
// ==========================================

pub mod error;
pub mod simulation_api;

pub use error::{ApiError, ApiResult};
pub use simulation_api::{SimulationApi, SimulationOutcome};
