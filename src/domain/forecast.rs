// ==========================================
// 储煤场自燃风险预测系统 - 预测领域模型
// ==========================================
// 职责: 模型输出、逐日预测记录与批次摘要
// 约束: predictions 台账只追加, 重跑不覆盖历史记录
// ==========================================

use crate::domain::types::RiskLevel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 单次评分覆盖的预测天数 (基准日起 3 天)
pub const FORECAST_HORIZON_DAYS: usize = 3;

// ==========================================
// ScoringResult - 模型评分结果
// ==========================================
// 下标 0..2 对应基准日期偏移 0..2 天
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResult {
    pub pile_id: i64,                                   // 煤堆编号
    pub risk_levels: [RiskLevel; FORECAST_HORIZON_DAYS], // 逐日风险等级
    pub probabilities: [f64; FORECAST_HORIZON_DAYS],     // 逐日起火概率 [0,1]
}

// ==========================================
// Prediction - 逐日预测记录 (落库)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub pile_id: i64,               // 煤堆编号
    pub warehouse_id: i64,          // 堆场编号
    pub prediction_date: NaiveDate, // 预测发出日期 (= 基准日期)
    pub forecast_date: NaiveDate,   // 被预测的日期 (= 基准日期 + 偏移)
    pub risk_level: RiskLevel,      // 风险等级
    pub probability: f64,           // 起火概率
    pub model_version: String,      // 模型版本
}

// ==========================================
// RiskForecast - 单煤堆预测摘要
// ==========================================
// 批量预测的对外返回单元, 不落库
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskForecast {
    pub pile_id: i64,                                    // 煤堆编号
    pub forecast_date: NaiveDate,                        // 基准日期
    pub risk_levels: [RiskLevel; FORECAST_HORIZON_DAYS], // 逐日风险等级
    pub probabilities: [f64; FORECAST_HORIZON_DAYS],     // 逐日起火概率
}
