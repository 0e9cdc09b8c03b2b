// ==========================================
// 储煤场自燃风险预测系统 - 质量评估领域模型
// ==========================================
// 职责: 历史预测与真实火情的命中核对结果
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// FireEvent - 单条高风险预测的核对记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireEvent {
    pub pile_id: i64,                      // 煤堆编号
    pub actual_date: Option<NaiveDate>,    // 命中时为实际起火日期, 未命中时为空
    pub predicted_interval: [NaiveDate; 2], // 告警窗口 [起, 止] (闭区间)
    pub hit: bool,                         // 是否命中
}

// ==========================================
// EvaluationReport - 模型质量评估报告
// ==========================================
// precision / recall / f1_score 保留两位小数
// pr_auc 来自模型侧静态报告, 本系统不计算
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub precision: f64,             // 查准率
    pub recall: f64,                // 查全率
    pub f1_score: f64,              // F1
    pub pr_auc: f64,                // PR-AUC (外部透传指标)
    pub fire_events: Vec<FireEvent>, // 逐条核对明细
}
