// ==========================================
// 储煤场自燃风险预测系统 - 批量预测引擎
// ==========================================
// 职责: 编排特征构建 -> 模型评分 -> 预测展开 -> 台账落库
// 红线: 单个煤堆的特征缺口或评分失败不得中断整批预测
// ==========================================

use crate::domain::forecast::{Prediction, RiskForecast, ScoringResult, FORECAST_HORIZON_DAYS};
use crate::domain::pile::CoalPile;
use crate::engine::features::FeatureBuilder;
use crate::engine::repositories::ForecastRepositories;
use crate::engine::scorer::RiskScorer;
use crate::repository::error::RepositoryError;
use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// 批量预测错误类型
///
/// 仅覆盖整批层面的前置条件失败与数据库错误;
/// 单个煤堆的跳过不属于错误, 直接从结果中缺席。
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("没有在监煤堆, 无法推断预测基准日期")]
    NoActivePiles,

    #[error("没有任何测温数据, 无法推断预测基准日期")]
    NoTemperatureData,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// ==========================================
// 预测展开 (Prediction Expansion)
// ==========================================

/// 将单次评分结果展开为 3 条逐日预测记录
///
/// # 规则
/// - forecast_date = 基准日期 + 偏移 (0, 1, 2 天)
/// - prediction_date 恒等于基准日期
///
/// 纯函数, 无副作用。
pub fn expand_predictions(
    result: &ScoringResult,
    warehouse_id: i64,
    reference_date: NaiveDate,
    model_version: &str,
) -> Vec<Prediction> {
    (0..FORECAST_HORIZON_DAYS)
        .map(|offset| Prediction {
            pile_id: result.pile_id,
            warehouse_id,
            prediction_date: reference_date,
            forecast_date: reference_date + Duration::days(offset as i64),
            risk_level: result.risk_levels[offset],
            probability: result.probabilities[offset],
            model_version: model_version.to_string(),
        })
        .collect()
}

// ==========================================
// ForecastEngine - 批量预测引擎
// ==========================================
pub struct ForecastEngine {
    repos: ForecastRepositories,
    feature_builder: FeatureBuilder,
    scorer: Arc<dyn RiskScorer>,
    model_version: String,
}

impl ForecastEngine {
    /// 构造函数
    ///
    /// # 参数
    /// - repos: 仓储集合
    /// - scorer: 模型评分器 (可替换)
    /// - model_version: 写入预测台账的模型版本号
    pub fn new(
        repos: ForecastRepositories,
        scorer: Arc<dyn RiskScorer>,
        model_version: impl Into<String>,
    ) -> Self {
        let feature_builder = FeatureBuilder::new(
            repos.temperature_repo.clone(),
            repos.fire_repo.clone(),
            repos.weather_repo.clone(),
        );
        Self {
            repos,
            feature_builder,
            scorer,
            model_version: model_version.into(),
        }
    }

    /// 执行全场批量风险预测
    ///
    /// # 参数
    /// - reference_date: 基准日期; 缺省时取全场最新测温日期
    ///
    /// # 返回
    /// - Ok(Vec<RiskForecast>): 成功产出预测的煤堆摘要
    ///   (特征缺口或评分失败的煤堆直接缺席, 不计入错误)
    /// - Err(ForecastError): 前置条件失败或数据库错误
    pub async fn execute(
        &self,
        reference_date: Option<NaiveDate>,
    ) -> Result<Vec<RiskForecast>, ForecastError> {
        let reference_date = match reference_date {
            Some(date) => date,
            None => self.resolve_reference_date().await?,
        };

        let piles = self.repos.pile_repo.get_all_active().await?;
        info!(
            %reference_date,
            piles = piles.len(),
            "开始全场批量风险预测"
        );

        // 逐堆扇出, 扇入汇总; 每个煤堆独立成败, 互不影响
        let tasks = piles
            .iter()
            .map(|pile| self.forecast_pile(pile, reference_date));
        let results = join_all(tasks).await;

        let mut forecasts = Vec::new();
        for result in results {
            if let Some(forecast) = result? {
                forecasts.push(forecast);
            }
        }

        info!(
            produced = forecasts.len(),
            skipped = piles.len() - forecasts.len(),
            "全场批量风险预测完成"
        );
        Ok(forecasts)
    }

    /// 推断预测基准日期: 全场各煤堆最新测温日期的最大值
    async fn resolve_reference_date(&self) -> Result<NaiveDate, ForecastError> {
        let piles = self.repos.pile_repo.get_all_active().await?;
        if piles.is_empty() {
            return Err(ForecastError::NoActivePiles);
        }

        let mut latest_dates = Vec::new();
        for pile in &piles {
            if let Some(reading) = self
                .repos
                .temperature_repo
                .get_latest_by_pile_id(pile.pile_id)
                .await?
            {
                latest_dates.push(reading.measurement_date);
            }
        }

        latest_dates
            .into_iter()
            .max()
            .ok_or(ForecastError::NoTemperatureData)
    }

    /// 单煤堆预测
    ///
    /// # 返回
    /// - Ok(Some(RiskForecast)): 预测成功, 3 条逐日记录已落库
    /// - Ok(None): 特征缺口或评分失败, 该煤堆跳过
    /// - Err: 数据库错误 (对整批致命)
    async fn forecast_pile(
        &self,
        pile: &CoalPile,
        reference_date: NaiveDate,
    ) -> Result<Option<RiskForecast>, ForecastError> {
        let features = match self.feature_builder.build(pile, reference_date).await? {
            Some(features) => features,
            None => {
                debug!(
                    pile_id = pile.pile_id,
                    %reference_date,
                    "特征数据缺口, 跳过该煤堆"
                );
                return Ok(None);
            }
        };

        let result = match self.scorer.score(&features).await {
            Ok(result) => result,
            Err(error) => {
                warn!(
                    pile_id = pile.pile_id,
                    %reference_date,
                    %error,
                    "模型评分失败, 跳过该煤堆"
                );
                return Ok(None);
            }
        };

        let predictions = expand_predictions(
            &result,
            pile.warehouse_id,
            reference_date,
            &self.model_version,
        );
        self.repos.prediction_repo.save_batch(&predictions).await?;

        Ok(Some(RiskForecast {
            pile_id: result.pile_id,
            forecast_date: reference_date,
            risk_levels: result.risk_levels,
            probabilities: result.probabilities,
        }))
    }
}
