// ==========================================
// 储煤场自燃风险预测系统 - 模型质量评估引擎
// ==========================================
// 职责: 用真实火情回溯核对历史高风险预测, 计算 precision/recall/F1
// 约束: PR-AUC 为模型侧静态报告的透传值, 本引擎不计算
// ==========================================

use crate::domain::evaluation::{EvaluationReport, FireEvent};
use crate::repository::{FireIncidentRepository, PredictionRepository, RepositoryResult};
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// 外部 PR-AUC 缺失时的兜底常量
pub const DEFAULT_PR_AUC: f64 = 0.58;

/// 告警窗口: 预报日期之后 1..=3 天 (闭区间)
const ALERT_WINDOW_DAYS: i64 = 3;

/// 全量评估的日期下界
fn full_history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
}

/// 全量评估的日期上界
fn full_history_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()
}

/// 指标保留两位小数
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ==========================================
// EvaluationEngine - 质量评估引擎
// ==========================================
pub struct EvaluationEngine {
    prediction_repo: Arc<dyn PredictionRepository>,
    fire_repo: Arc<dyn FireIncidentRepository>,
    /// 模型侧静态报告注入的 PR-AUC, None 时使用兜底常量
    pr_auc: Option<f64>,
}

impl EvaluationEngine {
    /// 构造函数
    ///
    /// # 参数
    /// - prediction_repo: 预测台账仓储
    /// - fire_repo: 火情仓储
    /// - pr_auc: 外部静态报告提供的 PR-AUC (缺失时传 None)
    pub fn new(
        prediction_repo: Arc<dyn PredictionRepository>,
        fire_repo: Arc<dyn FireIncidentRepository>,
        pr_auc: Option<f64>,
    ) -> Self {
        Self {
            prediction_repo,
            fire_repo,
            pr_auc,
        }
    }

    /// 回溯评估模型质量
    ///
    /// # 参数
    /// - start_date / end_date: 评估区间, 缺省时覆盖全部历史
    ///
    /// # 规则
    /// - 只核对 risk_level = "high" 的预测
    /// - 告警窗口为 [forecast_date+1, forecast_date+3], 按 1,2,3 顺序扫描,
    ///   首次命中即停止
    /// - false_negatives 对照区间内全部火情, 未被任何预测覆盖的火情同样计入
    /// - 零分母时各指标取 0.0
    pub async fn evaluate(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> RepositoryResult<EvaluationReport> {
        let start = start_date.unwrap_or_else(full_history_start);
        let end = end_date.unwrap_or_else(full_history_end);

        let predictions = self.prediction_repo.get_all_high_risk(start, end).await?;
        let fires = self.fire_repo.get_fires_in_date_range(start, end).await?;

        // (煤堆, 起火日期) 查找集
        let fire_set: HashSet<(i64, NaiveDate)> = fires
            .iter()
            .map(|fire| (fire.pile_id, fire.actual_date))
            .collect();

        let mut fire_events = Vec::with_capacity(predictions.len());
        let mut hits: i64 = 0;

        for prediction in &predictions {
            let window_start = prediction.forecast_date + Duration::days(1);
            let window_end = prediction.forecast_date + Duration::days(ALERT_WINDOW_DAYS);

            let mut matched_date = None;
            for days_ahead in 1..=ALERT_WINDOW_DAYS {
                let check_date = prediction.forecast_date + Duration::days(days_ahead);
                if fire_set.contains(&(prediction.pile_id, check_date)) {
                    matched_date = Some(check_date);
                    break;
                }
            }

            if matched_date.is_some() {
                hits += 1;
            }

            fire_events.push(FireEvent {
                pile_id: prediction.pile_id,
                actual_date: matched_date,
                predicted_interval: [window_start, window_end],
                hit: matched_date.is_some(),
            });
        }

        let true_positives = hits;
        let false_positives = predictions.len() as i64 - hits;
        let false_negatives = fires.len() as i64 - true_positives;

        let precision = if true_positives + false_positives > 0 {
            true_positives as f64 / (true_positives + false_positives) as f64
        } else {
            0.0
        };
        let recall = if true_positives + false_negatives > 0 {
            true_positives as f64 / (true_positives + false_negatives) as f64
        } else {
            0.0
        };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        info!(
            %start,
            %end,
            high_predictions = predictions.len(),
            fires = fires.len(),
            true_positives,
            "模型质量评估完成"
        );

        Ok(EvaluationReport {
            precision: round2(precision),
            recall: round2(recall),
            f1_score: round2(f1_score),
            pr_auc: self.pr_auc.unwrap_or(DEFAULT_PR_AUC),
            fire_events,
        })
    }
}
