// ==========================================
// 储煤场自燃风险预测系统 - 领域层
// ==========================================
// 职责: 定义领域实体与类型, 不含数据访问与业务流程
// ==========================================

pub mod evaluation;
pub mod features;
pub mod fire;
pub mod forecast;
pub mod observation;
pub mod pile;
pub mod types;

// 重导出领域实体
pub use evaluation::{EvaluationReport, FireEvent};
pub use features::PileFeatures;
pub use fire::FireIncident;
pub use forecast::{Prediction, RiskForecast, ScoringResult, FORECAST_HORIZON_DAYS};
pub use observation::{TemperatureReading, WeatherDaily};
pub use pile::CoalPile;
pub use types::RiskLevel;
