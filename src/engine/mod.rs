// ==========================================
// 储煤场自燃风险预测系统 - 引擎层
// ==========================================
// 职责: 实现预测与评估的业务规则, 不拼 SQL
// 红线: Engine 不拼 SQL, 数据访问一律经由 Repository 接口
// ==========================================

pub mod evaluation;
pub mod features;
pub mod forecast;
pub mod repositories;
pub mod scorer;

// 重导出核心引擎
pub use evaluation::{EvaluationEngine, DEFAULT_PR_AUC};
pub use features::FeatureBuilder;
pub use forecast::{expand_predictions, ForecastEngine, ForecastError};
pub use repositories::ForecastRepositories;
pub use scorer::{HeuristicScorer, RiskScorer, ScoringError};
