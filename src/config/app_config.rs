// ==========================================
// 储煤场自燃风险预测系统 - 进程配置
// ==========================================
// 职责: 从环境变量读取进程级配置, 提供合理默认值
// ==========================================

use std::path::PathBuf;

/// 默认模型版本号 (写入预测台账)
pub const DEFAULT_MODEL_VERSION: &str = "v1.0";

/// 默认模型指标报告路径 (模型侧训练产物)
pub const DEFAULT_METRICS_REPORT_PATH: &str = "ml/metrics.json";

/// 进程配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite 数据库文件路径
    pub db_path: String,
    /// 模型版本号
    pub model_version: String,
    /// 模型静态指标报告路径
    pub metrics_report_path: PathBuf,
}

impl AppConfig {
    /// 从环境变量构建配置
    ///
    /// # 环境变量
    /// - COAL_FIRE_DB_PATH: 数据库路径（默认: 用户数据目录）
    /// - COAL_FIRE_MODEL_VERSION: 模型版本号（默认: v1.0）
    /// - COAL_FIRE_METRICS_PATH: 指标报告路径（默认: ml/metrics.json）
    pub fn from_env() -> Self {
        let model_version = std::env::var("COAL_FIRE_MODEL_VERSION")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string());

        let metrics_report_path = std::env::var("COAL_FIRE_METRICS_PATH")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_METRICS_REPORT_PATH));

        Self {
            db_path: get_default_db_path(),
            model_version,
            metrics_report_path,
        }
    }
}

/// 解析默认数据库路径
///
/// 优先级: 环境变量 COAL_FIRE_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("COAL_FIRE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 先给一个默认回退值，拿不到用户数据目录时直接使用
    let mut path = PathBuf::from("./coal_fire_predictor.db");

    if let Some(data_dir) = dirs::data_dir() {
        let app_dir = data_dir.join("coal-fire-predictor");
        if std::fs::create_dir_all(&app_dir).is_ok() {
            path = app_dir.join("coal_fire_predictor.db");
        }
    }

    path.to_string_lossy().to_string()
}
