// ==========================================
// 储煤场自燃风险预测系统 - 模型评分边界
// ==========================================
// 职责: 定义风险评分能力接口, 隔离模型实现细节
// 约束: 评分失败只影响当前煤堆, 由调用方捕获后跳过
// ==========================================

use crate::domain::features::PileFeatures;
use crate::domain::forecast::{ScoringResult, FORECAST_HORIZON_DAYS};
use crate::domain::types::RiskLevel;
use async_trait::async_trait;
use thiserror::Error;

/// 模型评分错误类型
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("模型不可用: {0}")]
    ModelUnavailable(String),

    #[error("模型输入不合法: {0}")]
    InvalidInput(String),

    #[error("模型推理失败: {0}")]
    Internal(String),
}

// ==========================================
// RiskScorer Trait
// ==========================================
// 用途: 单方法能力接口, 训练模型可整体替换而不触及引擎
#[async_trait]
pub trait RiskScorer: Send + Sync {
    /// 对单个煤堆的特征向量评分
    ///
    /// # 返回
    /// - Ok(ScoringResult): 基准日起 3 天的风险等级与概率
    /// - Err(ScoringError): 任何内部失败（模型缺失、输入不合法等）
    async fn score(&self, features: &PileFeatures) -> Result<ScoringResult, ScoringError>;
}

// ==========================================
// HeuristicScorer - 基线评分器
// ==========================================
// 温度主导的逻辑斯蒂基线, 供未接入训练模型服务时使用。
// 后处理形状与模型侧约定一致: 单一基础概率按逐日衰减展开,
// 概率封顶后映射为三级风险等级。

/// 逐日概率衰减系数（下标对应预测日偏移）
const DAY_DECAY: [f64; FORECAST_HORIZON_DAYS] = [1.0, 0.9, 0.8];

/// 概率上限
const PROBABILITY_CAP: f64 = 0.99;

/// 中风险下限阈值
const MEDIUM_THRESHOLD: f64 = 0.3;

/// 高风险下限阈值
const HIGH_THRESHOLD: f64 = 0.7;

pub struct HeuristicScorer;

impl HeuristicScorer {
    /// 构造函数
    pub fn new() -> Self {
        Self
    }

    /// 基础起火概率: 温度水平 + 升温趋势 + 堆存时长 + 火情历史 - 湿度抑制
    fn base_probability(features: &PileFeatures) -> f64 {
        let z = 0.08 * (features.temperature_p - 45.0)
            + 0.3 * features.temp_trend_7d
            + 0.01 * features.days_in_storage as f64
            + 0.1 * features.fire_history_count as f64
            - 0.02 * (features.weather_humidity - 60.0);
        1.0 / (1.0 + (-z).exp())
    }

    /// 概率到风险等级的映射
    fn map_risk_level(probability: f64) -> RiskLevel {
        if probability < MEDIUM_THRESHOLD {
            RiskLevel::Low
        } else if probability < HIGH_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RiskScorer for HeuristicScorer {
    async fn score(&self, features: &PileFeatures) -> Result<ScoringResult, ScoringError> {
        if !features.temperature_p.is_finite()
            || !features.temp_trend_7d.is_finite()
            || !features.temp_avg_7d.is_finite()
            || !features.temp_max_7d.is_finite()
        {
            return Err(ScoringError::InvalidInput(format!(
                "pile_id={} 温度特征包含非法数值",
                features.pile_id
            )));
        }

        let base = Self::base_probability(features);

        let mut probabilities = [0.0; FORECAST_HORIZON_DAYS];
        let mut risk_levels = [RiskLevel::Low; FORECAST_HORIZON_DAYS];
        for (day, decay) in DAY_DECAY.iter().enumerate() {
            let probability = (base * decay).min(PROBABILITY_CAP);
            probabilities[day] = probability;
            risk_levels[day] = Self::map_risk_level(probability);
        }

        Ok(ScoringResult {
            pile_id: features.pile_id,
            risk_levels,
            probabilities,
        })
    }
}
