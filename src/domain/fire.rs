// ==========================================
// 储煤场自燃风险预测系统 - 火情领域模型
// ==========================================
// 职责: 已确认的自燃事件记录
// 约束: 只增不改的历史台账
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// FireIncident - 自燃事件
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireIncident {
    pub pile_id: i64,               // 煤堆编号
    pub warehouse_id: i64,          // 堆场编号
    pub actual_date: NaiveDate,     // 起火日期
    pub document_date: NaiveDate,   // 处置单据日期
    pub weight_act: f64,            // 单据重量 (吨)
}
