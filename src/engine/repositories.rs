// ==========================================
// 储煤场自燃风险预测系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合预测引擎所需的所有 Repository
// 目标: 减少引擎构造函数参数数量，提升可维护性
// ==========================================

use std::sync::Arc;

use crate::repository::{
    CoalPileRepository, FireIncidentRepository, PredictionRepository, TemperatureRepository,
    WeatherRepository,
};

/// 预测引擎仓储集合
///
/// 聚合预测引擎所需的所有 Repository，简化依赖注入。
/// 引擎只依赖 trait 对象，便于单元测试时替换整个仓储层。
#[derive(Clone)]
pub struct ForecastRepositories {
    /// 煤堆仓储
    pub pile_repo: Arc<dyn CoalPileRepository>,
    /// 测温仓储
    pub temperature_repo: Arc<dyn TemperatureRepository>,
    /// 火情仓储
    pub fire_repo: Arc<dyn FireIncidentRepository>,
    /// 气象仓储
    pub weather_repo: Arc<dyn WeatherRepository>,
    /// 预测台账仓储
    pub prediction_repo: Arc<dyn PredictionRepository>,
}

impl ForecastRepositories {
    /// 创建新的仓储集合
    pub fn new(
        pile_repo: Arc<dyn CoalPileRepository>,
        temperature_repo: Arc<dyn TemperatureRepository>,
        fire_repo: Arc<dyn FireIncidentRepository>,
        weather_repo: Arc<dyn WeatherRepository>,
        prediction_repo: Arc<dyn PredictionRepository>,
    ) -> Self {
        Self {
            pile_repo,
            temperature_repo,
            fire_repo,
            weather_repo,
            prediction_repo,
        }
    }
}
