// ==========================================
// 储煤场自燃风险预测系统 - 配置层
// ==========================================
// 职责: 进程配置与模型侧静态报告读取
// ==========================================

pub mod app_config;
pub mod metrics_report;

// 重导出核心配置类型
pub use app_config::{get_default_db_path, AppConfig, DEFAULT_MODEL_VERSION};
pub use metrics_report::MetricsReport;
