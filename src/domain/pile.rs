// ==========================================
// 储煤场自燃风险预测系统 - 煤堆领域模型
// ==========================================
// 职责: 煤堆静态信息
// 数据来源: supplies 表 (同一 pile_id 取最早一条入库记录)
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// CoalPile - 煤堆
// ==========================================
// 约束: 煤堆一经形成即不可变, 每个 pile_id 对应一条记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoalPile {
    pub pile_id: i64,                // 煤堆编号
    pub coal_type: String,           // 煤种
    pub formation_date: NaiveDate,   // 形成日期 (首次入库日期)
    pub initial_volume_tonnes: f64,  // 初始堆存量 (吨)
    pub warehouse_id: i64,           // 堆场编号
}
