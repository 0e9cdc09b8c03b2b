// ==========================================
// 储煤场自燃风险预测系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口, 供 CLI 或上层服务调用
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod forecast_api;

// 重导出核心类型
pub use dashboard_api::{
    DashboardApi, DashboardOverview, PileHistory, PileOverview, RiskPoint, TemperaturePoint,
    WeatherSummary,
};
pub use error::{ApiError, ApiResult};
pub use forecast_api::ForecastApi;
