// ==========================================
// 储煤场自燃风险预测系统 - 预测与评估 API
// ==========================================
// 职责: 封装批量预测与模型质量评估入口
// 架构: API 层 → Engine 层 → Repository 接口
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::evaluation::EvaluationReport;
use crate::domain::forecast::RiskForecast;
use crate::engine::evaluation::EvaluationEngine;
use crate::engine::forecast::ForecastEngine;
use crate::engine::repositories::ForecastRepositories;
use crate::engine::scorer::RiskScorer;
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// ForecastApi - 预测与评估 API
// ==========================================
pub struct ForecastApi {
    forecast_engine: ForecastEngine,
    evaluation_engine: EvaluationEngine,
}

impl ForecastApi {
    /// 构造函数
    ///
    /// # 参数
    /// - repos: 仓储集合
    /// - scorer: 模型评分器
    /// - model_version: 写入预测台账的模型版本号
    /// - pr_auc: 外部静态报告提供的 PR-AUC (缺失时传 None, 评估时使用兜底常量)
    pub fn new(
        repos: ForecastRepositories,
        scorer: Arc<dyn RiskScorer>,
        model_version: impl Into<String>,
        pr_auc: Option<f64>,
    ) -> Self {
        let evaluation_engine = EvaluationEngine::new(
            repos.prediction_repo.clone(),
            repos.fire_repo.clone(),
            pr_auc,
        );
        let forecast_engine = ForecastEngine::new(repos, scorer, model_version);
        Self {
            forecast_engine,
            evaluation_engine,
        }
    }

    /// 执行全场批量风险预测
    ///
    /// # 返回
    /// - Ok(Vec<RiskForecast>): 成功产出预测的煤堆摘要
    /// - Err(ApiError::PreconditionFailed): 无法推断基准日期
    pub async fn run_forecast(
        &self,
        reference_date: Option<NaiveDate>,
    ) -> ApiResult<Vec<RiskForecast>> {
        Ok(self.forecast_engine.execute(reference_date).await?)
    }

    /// 回溯评估模型质量
    pub async fn evaluate_quality(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> ApiResult<EvaluationReport> {
        Ok(self.evaluation_engine.evaluate(start_date, end_date).await?)
    }
}
