// ==========================================
// 储煤场自燃风险预测系统 - 特征构建引擎
// ==========================================
// 职责: 为单个煤堆在指定基准日期构建模型特征向量
// 输入: 煤堆静态信息 + 测温/火情/气象历史
// 输出: PileFeatures, 或数据缺口时返回 None
// 红线: 缺少测温或当日气象时不产出特征, 不做默认值填充
// ==========================================

use crate::domain::features::PileFeatures;
use crate::domain::pile::CoalPile;
use crate::repository::{
    FireIncidentRepository, RepositoryResult, TemperatureRepository, WeatherRepository,
};
use chrono::{Datelike, Duration, NaiveDate};
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::debug;

/// 温度特征回看窗口（天）
const TEMPERATURE_WINDOW_DAYS: i64 = 7;

/// 火情统计回看窗口（天）
const FIRE_HISTORY_WINDOW_DAYS: i64 = 365;

/// 无火情历史的哨兵值
const NO_FIRE_SENTINEL: i64 = -1;

// ==========================================
// FeatureBuilder - 特征构建引擎
// ==========================================
pub struct FeatureBuilder {
    temperature_repo: Arc<dyn TemperatureRepository>,
    fire_repo: Arc<dyn FireIncidentRepository>,
    weather_repo: Arc<dyn WeatherRepository>,
}

impl FeatureBuilder {
    /// 构造函数
    pub fn new(
        temperature_repo: Arc<dyn TemperatureRepository>,
        fire_repo: Arc<dyn FireIncidentRepository>,
        weather_repo: Arc<dyn WeatherRepository>,
    ) -> Self {
        Self {
            temperature_repo,
            fire_repo,
            weather_repo,
        }
    }

    /// 构建单煤堆特征向量
    ///
    /// # 参数
    /// - pile: 煤堆静态信息
    /// - reference_date: 基准日期
    ///
    /// # 返回
    /// - Ok(Some(PileFeatures)): 特征齐备
    /// - Ok(None): 数据缺口（缺测温或缺当日气象），该煤堆跳过本轮预测
    /// - Err: 数据库错误
    pub async fn build(
        &self,
        pile: &CoalPile,
        reference_date: NaiveDate,
    ) -> RepositoryResult<Option<PileFeatures>> {
        // 堆存天数: 形成日期晚于基准日期时为负值, 不截断
        let days_in_storage = (reference_date - pile.formation_date).num_days();

        // 基准日期及之前的最近一次测温, 缺失则无法产出特征
        let latest = match self
            .temperature_repo
            .get_latest_as_of(pile.pile_id, reference_date)
            .await?
        {
            Some(reading) => reading,
            None => {
                debug!(
                    pile_id = pile.pile_id,
                    %reference_date,
                    "煤堆无可用测温数据, 特征不可用"
                );
                return Ok(None);
            }
        };

        // 7天窗口 [基准日期-7, 基准日期], 按日期升序
        let window_start = reference_date - Duration::days(TEMPERATURE_WINDOW_DAYS);
        let window = self
            .temperature_repo
            .get_by_pile_id_and_date_range(pile.pile_id, window_start, reference_date)
            .await?;

        // 趋势取窗口首末两次测温的差值, 不做回归拟合
        let temp_trend_7d = if window.len() < 2 {
            0.0
        } else {
            window[window.len() - 1].temperature - window[0].temperature
        };

        let temp_avg_7d = if window.is_empty() {
            latest.temperature
        } else {
            window.iter().map(|r| r.temperature).sum::<f64>() / window.len() as f64
        };

        let temp_max_7d = if window.is_empty() {
            latest.temperature
        } else {
            window
                .iter()
                .map(|r| r.temperature)
                .fold(f64::NEG_INFINITY, f64::max)
        };

        // 火情特征: 该煤堆从未起火时取哨兵值;
        // fire_history_count 的统计范围是全场所有煤堆, 不按本堆过滤
        let (days_since_last_fire, fire_history_count) = match self
            .fire_repo
            .get_last_fire_date_by_pile_id(pile.pile_id)
            .await?
        {
            None => (NO_FIRE_SENTINEL, 0),
            Some(last_fire_date) => {
                let year_start = reference_date - Duration::days(FIRE_HISTORY_WINDOW_DAYS);
                let fires_last_year = self
                    .fire_repo
                    .get_fires_in_date_range(year_start, reference_date)
                    .await?;
                (
                    (reference_date - last_fire_date).num_days(),
                    fires_last_year.len() as i64,
                )
            }
        };

        // 当日气象, 缺失则无法产出特征
        let weather = match self.weather_repo.get_by_date(reference_date).await? {
            Some(weather) => weather,
            None => {
                debug!(
                    pile_id = pile.pile_id,
                    %reference_date,
                    "基准日期无气象数据, 特征不可用"
                );
                return Ok(None);
            }
        };

        // 季节特征与月份周期编码
        let month = reference_date.month();
        let season = match month {
            3..=5 => 1,
            6..=8 => 2,
            9..=11 => 3,
            _ => 4,
        };
        let month_angle = 2.0 * PI * month as f64 / 12.0;

        Ok(Some(PileFeatures {
            pile_id: pile.pile_id,
            coal_type: pile.coal_type.clone(),
            pile_formation_date: pile.formation_date,
            initial_volume_tonnes: pile.initial_volume_tonnes,
            days_in_storage,
            temperature_p: latest.temperature,
            temp_trend_7d,
            temp_avg_7d,
            temp_max_7d,
            days_since_last_fire,
            fire_history_count,
            weather_temp_avg: weather.air_temperature,
            weather_humidity: weather.humidity,
            season,
            month_sin: month_angle.sin(),
            month_cos: month_angle.cos(),
        }))
    }
}
