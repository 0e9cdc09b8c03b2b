// ==========================================
// 储煤场自燃风险预测系统 - 特征向量领域模型
// ==========================================
// 职责: 单煤堆单基准日期的模型输入特征
// 约束: 特征向量只在全部字段齐备时产出, 不落库
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// PileFeatures - 煤堆特征向量
// ==========================================
// 特征口径与模型侧约定一致, 字段名不可随意改动
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PileFeatures {
    // ===== 煤堆标识 =====
    pub pile_id: i64,                   // 煤堆编号
    pub coal_type: String,              // 煤种
    pub pile_formation_date: NaiveDate, // 形成日期
    pub initial_volume_tonnes: f64,     // 初始堆存量 (吨)

    // ===== 堆存特征 =====
    pub days_in_storage: i64, // 堆存天数 (基准日期 - 形成日期, 可为负, 不截断)

    // ===== 温度特征 =====
    pub temperature_p: f64,  // 基准日期及之前最近一次测温值
    pub temp_trend_7d: f64,  // 7天窗口首末测温差 (窗口内不足2条时为0.0)
    pub temp_avg_7d: f64,    // 7天窗口测温均值 (窗口为空时取最近测温值)
    pub temp_max_7d: f64,    // 7天窗口测温最大值 (窗口为空时取最近测温值)

    // ===== 火情特征 =====
    pub days_since_last_fire: i64, // 距上次起火天数 (该煤堆从未起火时为 -1)
    pub fire_history_count: i64,   // 近365天火情数量 (统计范围为全场所有煤堆)

    // ===== 气象特征 =====
    pub weather_temp_avg: f64, // 基准日期日均气温
    pub weather_humidity: f64, // 基准日期日均湿度

    // ===== 季节特征 =====
    pub season: i64,    // 季节编码: 3-5月=1, 6-8月=2, 9-11月=3, 其余=4
    pub month_sin: f64, // sin(2π·month/12)
    pub month_cos: f64, // cos(2π·month/12)
}
