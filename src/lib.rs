// ==========================================
// 储煤场自燃风险预测系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (预测结果供人工处置参考)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/schema）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::RiskLevel;

// 领域实体
pub use domain::{
    CoalPile, EvaluationReport, FireEvent, FireIncident, PileFeatures, Prediction, RiskForecast,
    ScoringResult, TemperatureReading, WeatherDaily, FORECAST_HORIZON_DAYS,
};

// 引擎
pub use engine::{
    expand_predictions, EvaluationEngine, FeatureBuilder, ForecastEngine, ForecastError,
    ForecastRepositories, HeuristicScorer, RiskScorer, ScoringError,
};

// API
pub use api::{ApiError, ApiResult, DashboardApi, ForecastApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "储煤场自燃风险预测系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";
