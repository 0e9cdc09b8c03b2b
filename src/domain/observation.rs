// ==========================================
// 储煤场自燃风险预测系统 - 观测数据领域模型
// ==========================================
// 职责: 测温记录与逐日气象数据
// 约束: 两类数据均为只增不改的历史记录
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// TemperatureReading - 煤堆测温记录
// ==========================================
// 同一煤堆同一天允许多条记录 (分班次/分测点)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub pile_id: i64,                // 煤堆编号
    pub warehouse_id: i64,           // 堆场编号
    pub measurement_date: NaiveDate, // 测温日期
    pub temperature: f64,            // 温度 (摄氏度)
    pub picket: Option<String>,      // 测点桩号
    pub shift: Option<i64>,          // 班次
}

// ==========================================
// WeatherDaily - 逐日气象数据
// ==========================================
// 每个自然日一条记录, 由上游逐时数据聚合得到
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherDaily {
    pub date: NaiveDate,       // 日期
    pub air_temperature: f64,  // 日均气温 (摄氏度)
    pub humidity: f64,         // 日均相对湿度 (%)
}
