// ==========================================
// 储煤场自燃风险预测系统 - 驾驶舱 API
// ==========================================
// 职责: 聚合全场总览与单煤堆历史的只读查询
// 架构: API 层 → Repository 接口 (不经过预测引擎)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::pile::CoalPile;
use crate::domain::types::RiskLevel;
use crate::engine::repositories::ForecastRepositories;
use chrono::{Duration, Local, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// 全场无火情历史时 days_without_fire 的哨兵值
const NO_FIRE_DAYS_SENTINEL: i64 = 999;

/// 历史查询的日期下界
fn history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
}

// ==========================================
// 驾驶舱 DTO
// ==========================================

/// 单煤堆总览行
#[derive(Debug, Clone, Serialize)]
pub struct PileOverview {
    pub pile_id: i64,
    pub coal_type: String,
    pub formation_date: NaiveDate,
    pub days_in_storage: i64,
    pub last_temp: f64,
    /// 日期 -> 风险等级, 覆盖基准日起 3 天; 无预测记录的日期取 low
    pub risk_forecast: BTreeMap<NaiveDate, RiskLevel>,
}

/// 当日气象摘要 (无数据时各字段为 0.0)
#[derive(Debug, Clone, Serialize)]
pub struct WeatherSummary {
    pub temp_avg: f64,
    pub humidity: f64,
}

/// 全场总览
#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverview {
    pub piles: Vec<PileOverview>,
    pub weather_summary: WeatherSummary,
    pub days_without_fire: i64,
    pub last_update: String,
}

/// 温度历史点
#[derive(Debug, Clone, Serialize)]
pub struct TemperaturePoint {
    pub date: NaiveDate,
    pub temp: f64,
}

/// 预测历史点
#[derive(Debug, Clone, Serialize)]
pub struct RiskPoint {
    pub date: NaiveDate,
    pub level: RiskLevel,
    pub probability: f64,
}

/// 单煤堆历史
#[derive(Debug, Clone, Serialize)]
pub struct PileHistory {
    pub pile_id: i64,
    pub coal_type: String,
    pub formation_date: NaiveDate,
    pub days_in_storage: i64,
    pub last_temp: f64,
    pub temperature_history: Vec<TemperaturePoint>,
    pub risk_history: Vec<RiskPoint>,
}

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================
pub struct DashboardApi {
    repos: ForecastRepositories,
}

impl DashboardApi {
    /// 构造函数
    pub fn new(repos: ForecastRepositories) -> Self {
        Self { repos }
    }

    /// 查询全场总览
    ///
    /// # 参数
    /// - reference_date: 基准日期, 缺省取当天
    ///
    /// # 说明
    /// - 没有任何测温记录的煤堆不出现在总览中
    /// - 基准日起 3 天内无预测记录的日期, 风险等级按 low 展示
    pub async fn get_overview(
        &self,
        reference_date: Option<NaiveDate>,
    ) -> ApiResult<DashboardOverview> {
        let reference_date = reference_date.unwrap_or_else(|| Local::now().date_naive());

        let piles = self.repos.pile_repo.get_all_active().await?;
        let mut pile_rows = Vec::new();

        for pile in &piles {
            let latest_temp = match self
                .repos
                .temperature_repo
                .get_latest_by_pile_id(pile.pile_id)
                .await?
            {
                Some(reading) => reading,
                None => continue,
            };

            let forecast_dates = [
                reference_date,
                reference_date + Duration::days(1),
                reference_date + Duration::days(2),
            ];
            let predictions = self
                .repos
                .prediction_repo
                .get_by_pile_id_and_forecast_dates(pile.pile_id, &forecast_dates)
                .await?;

            let mut risk_forecast = BTreeMap::new();
            for date in forecast_dates {
                let level = predictions
                    .iter()
                    .find(|p| p.forecast_date == date)
                    .map(|p| p.risk_level)
                    .unwrap_or(RiskLevel::Low);
                risk_forecast.insert(date, level);
            }

            pile_rows.push(PileOverview {
                pile_id: pile.pile_id,
                coal_type: pile.coal_type.clone(),
                formation_date: pile.formation_date,
                days_in_storage: (reference_date - pile.formation_date).num_days(),
                last_temp: latest_temp.temperature,
                risk_forecast,
            });
        }

        let weather_summary = match self.repos.weather_repo.get_by_date(reference_date).await? {
            Some(weather) => WeatherSummary {
                temp_avg: weather.air_temperature,
                humidity: weather.humidity,
            },
            None => WeatherSummary {
                temp_avg: 0.0,
                humidity: 0.0,
            },
        };

        let days_without_fire = match self.last_fire_date(&piles).await? {
            Some(last_fire) => (reference_date - last_fire).num_days(),
            None => NO_FIRE_DAYS_SENTINEL,
        };

        Ok(DashboardOverview {
            piles: pile_rows,
            weather_summary,
            days_without_fire,
            last_update: Utc::now().to_rfc3339(),
        })
    }

    /// 查询单煤堆历史 (温度曲线 + 预测记录)
    ///
    /// # 参数
    /// - pile_id: 煤堆编号
    /// - reference_date: 基准日期, 缺省取当天
    pub async fn get_pile_history(
        &self,
        pile_id: i64,
        reference_date: Option<NaiveDate>,
    ) -> ApiResult<PileHistory> {
        let reference_date = reference_date.unwrap_or_else(|| Local::now().date_naive());

        let pile = self
            .repos
            .pile_repo
            .get_by_id(pile_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("煤堆 pile_id={} 不存在", pile_id)))?;

        let readings = self
            .repos
            .temperature_repo
            .get_by_pile_id_and_date_range(pile_id, history_start(), reference_date)
            .await?;
        let temperature_history: Vec<TemperaturePoint> = readings
            .iter()
            .map(|r| TemperaturePoint {
                date: r.measurement_date,
                temp: r.temperature,
            })
            .collect();
        let last_temp = temperature_history.last().map(|p| p.temp).unwrap_or(0.0);

        let predictions = self.repos.prediction_repo.get_all_by_pile_id(pile_id).await?;
        let risk_history: Vec<RiskPoint> = predictions
            .iter()
            .map(|p| RiskPoint {
                date: p.forecast_date,
                level: p.risk_level,
                probability: p.probability,
            })
            .collect();

        Ok(PileHistory {
            pile_id: pile.pile_id,
            coal_type: pile.coal_type,
            formation_date: pile.formation_date,
            days_in_storage: (reference_date - pile.formation_date).num_days(),
            last_temp,
            temperature_history,
            risk_history,
        })
    }

    /// 全场最近一次起火日期 (在监煤堆范围内)
    async fn last_fire_date(&self, piles: &[CoalPile]) -> ApiResult<Option<NaiveDate>> {
        let mut last_dates = Vec::new();
        for pile in piles {
            if let Some(date) = self
                .repos
                .fire_repo
                .get_last_fire_date_by_pile_id(pile.pile_id)
                .await?
            {
                last_dates.push(date);
            }
        }
        Ok(last_dates.into_iter().max())
    }
}
