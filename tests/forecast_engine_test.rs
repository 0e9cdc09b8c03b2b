// ==========================================
// ForecastEngine 引擎集成测试
// ==========================================
// 测试目标: 验证批量预测编排、逐堆失败隔离与台账落库
// 覆盖范围: 预测展开 / 基准日期推断 / 前置条件 / 重跑追加
// ==========================================

mod test_helpers;

use async_trait::async_trait;
use chrono::Duration;
use coal_fire_predictor::domain::{PileFeatures, ScoringResult, FORECAST_HORIZON_DAYS};
use coal_fire_predictor::engine::forecast::expand_predictions;
use coal_fire_predictor::engine::{ForecastEngine, ForecastError, RiskScorer, ScoringError};
use coal_fire_predictor::RiskLevel;
use std::sync::Arc;
use test_helpers::*;

// ==========================================
// 测试用评分器
// ==========================================

/// 固定输出评分器
struct FixedScorer {
    levels: [RiskLevel; FORECAST_HORIZON_DAYS],
    probabilities: [f64; FORECAST_HORIZON_DAYS],
}

impl FixedScorer {
    fn high() -> Self {
        Self {
            levels: [RiskLevel::High, RiskLevel::High, RiskLevel::Medium],
            probabilities: [0.81, 0.74, 0.52],
        }
    }
}

#[async_trait]
impl RiskScorer for FixedScorer {
    async fn score(&self, features: &PileFeatures) -> Result<ScoringResult, ScoringError> {
        Ok(ScoringResult {
            pile_id: features.pile_id,
            risk_levels: self.levels,
            probabilities: self.probabilities,
        })
    }
}

/// 对指定煤堆评分失败的评分器
struct FailingScorer {
    fail_pile_id: i64,
    inner: FixedScorer,
}

#[async_trait]
impl RiskScorer for FailingScorer {
    async fn score(&self, features: &PileFeatures) -> Result<ScoringResult, ScoringError> {
        if features.pile_id == self.fail_pile_id {
            return Err(ScoringError::Internal("模型输出维度不符".to_string()));
        }
        self.inner.score(features).await
    }
}

// ==========================================
// 预测展开
// ==========================================

#[test]
fn expander_materializes_three_dated_rows() {
    let reference_date = date(2025, 11, 20);
    let result = ScoringResult {
        pile_id: 15,
        risk_levels: [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High],
        probabilities: [0.12, 0.45, 0.81],
    };

    let predictions = expand_predictions(&result, 3, reference_date, "v1.0");

    assert_eq!(predictions.len(), 3, "必须恰好展开为3条记录");
    let forecast_dates: Vec<_> = predictions.iter().map(|p| p.forecast_date).collect();
    assert_eq!(
        forecast_dates,
        vec![date(2025, 11, 20), date(2025, 11, 21), date(2025, 11, 22)]
    );
    for (offset, prediction) in predictions.iter().enumerate() {
        assert_eq!(prediction.prediction_date, reference_date);
        assert_eq!(prediction.pile_id, 15);
        assert_eq!(prediction.warehouse_id, 3);
        assert_eq!(prediction.risk_level, result.risk_levels[offset]);
        assert_eq!(prediction.probability, result.probabilities[offset]);
        assert_eq!(prediction.model_version, "v1.0");
    }
}

// ==========================================
// 批量预测: 失败隔离
// ==========================================

#[tokio::test]
async fn scorer_failure_skips_single_pile_only() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);
    let reference_date = date(2025, 11, 20);

    for pile_id in 1..=5 {
        repos
            .pile_repo
            .save(&sample_pile(pile_id, date(2025, 10, 1)))
            .await
            .unwrap();
        repos
            .temperature_repo
            .save_batch(&[sample_reading(pile_id, reference_date, 40.0 + pile_id as f64)])
            .await
            .unwrap();
    }
    repos
        .weather_repo
        .save_batch(&[sample_weather(reference_date, 5.0, 70.0)])
        .await
        .unwrap();

    let scorer = FailingScorer {
        fail_pile_id: 3,
        inner: FixedScorer::high(),
    };
    let engine = ForecastEngine::new(repos.clone(), Arc::new(scorer), "v1.0");

    let forecasts = engine
        .execute(Some(reference_date))
        .await
        .expect("单堆评分失败不应使整批失败");

    assert_eq!(forecasts.len(), 4, "3号煤堆应缺席, 其余4堆正常产出");
    assert!(forecasts.iter().all(|f| f.pile_id != 3));

    // 台账中只有成功煤堆的记录: 4堆 × 3天
    for pile_id in [1, 2, 4, 5] {
        let rows = repos
            .prediction_repo
            .get_all_by_pile_id(pile_id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
    }
    let pile3_rows = repos.prediction_repo.get_all_by_pile_id(3).await.unwrap();
    assert!(pile3_rows.is_empty(), "评分失败的煤堆不应落库");
}

#[tokio::test]
async fn feature_gap_skips_pile_silently() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);
    let reference_date = date(2025, 11, 20);

    repos
        .pile_repo
        .save(&sample_pile(1, date(2025, 10, 1)))
        .await
        .unwrap();
    repos
        .pile_repo
        .save(&sample_pile(2, date(2025, 10, 1)))
        .await
        .unwrap();
    // 只有1号煤堆有测温数据
    repos
        .temperature_repo
        .save_batch(&[sample_reading(1, reference_date, 45.0)])
        .await
        .unwrap();
    repos
        .weather_repo
        .save_batch(&[sample_weather(reference_date, 5.0, 70.0)])
        .await
        .unwrap();

    let engine = ForecastEngine::new(repos.clone(), Arc::new(FixedScorer::high()), "v1.0");
    let forecasts = engine.execute(Some(reference_date)).await.unwrap();

    assert_eq!(forecasts.len(), 1);
    assert_eq!(forecasts[0].pile_id, 1);
}

// ==========================================
// 基准日期推断与前置条件
// ==========================================

#[tokio::test]
async fn reference_date_resolves_to_latest_measurement() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);

    repos
        .pile_repo
        .save(&sample_pile(1, date(2025, 10, 1)))
        .await
        .unwrap();
    repos
        .pile_repo
        .save(&sample_pile(2, date(2025, 10, 5)))
        .await
        .unwrap();
    repos
        .temperature_repo
        .save_batch(&[
            sample_reading(1, date(2025, 11, 18), 40.0),
            sample_reading(2, date(2025, 11, 20), 43.0),
        ])
        .await
        .unwrap();
    repos
        .weather_repo
        .save_batch(&[sample_weather(date(2025, 11, 20), 5.0, 70.0)])
        .await
        .unwrap();

    let engine = ForecastEngine::new(repos.clone(), Arc::new(FixedScorer::high()), "v1.0");
    let forecasts = engine.execute(None).await.unwrap();

    assert!(!forecasts.is_empty());
    assert!(
        forecasts
            .iter()
            .all(|f| f.forecast_date == date(2025, 11, 20)),
        "基准日期应取全场最新测温日期"
    );
}

#[tokio::test]
async fn no_active_piles_is_batch_error() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);

    let engine = ForecastEngine::new(repos, Arc::new(FixedScorer::high()), "v1.0");
    let result = engine.execute(None).await;

    assert!(matches!(result, Err(ForecastError::NoActivePiles)));
}

#[tokio::test]
async fn no_temperature_anywhere_is_batch_error() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);

    repos
        .pile_repo
        .save(&sample_pile(1, date(2025, 10, 1)))
        .await
        .unwrap();

    let engine = ForecastEngine::new(repos, Arc::new(FixedScorer::high()), "v1.0");
    let result = engine.execute(None).await;

    assert!(matches!(result, Err(ForecastError::NoTemperatureData)));
}

// ==========================================
// 台账只追加
// ==========================================

#[tokio::test]
async fn rerun_appends_new_prediction_rows() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);
    let reference_date = date(2025, 11, 20);

    repos
        .pile_repo
        .save(&sample_pile(1, date(2025, 10, 1)))
        .await
        .unwrap();
    repos
        .temperature_repo
        .save_batch(&[sample_reading(1, reference_date, 45.0)])
        .await
        .unwrap();
    repos
        .weather_repo
        .save_batch(&[sample_weather(reference_date, 5.0, 70.0)])
        .await
        .unwrap();

    let engine = ForecastEngine::new(repos.clone(), Arc::new(FixedScorer::high()), "v1.0");
    engine.execute(Some(reference_date)).await.unwrap();
    engine.execute(Some(reference_date)).await.unwrap();

    let rows = repos.prediction_repo.get_all_by_pile_id(1).await.unwrap();
    assert_eq!(rows.len(), 6, "重跑同一基准日期应追加记录而非覆盖");

    // 每个预报日期各有两条记录
    for offset in 0..3 {
        let day = reference_date + Duration::days(offset);
        assert_eq!(rows.iter().filter(|p| p.forecast_date == day).count(), 2);
    }
}
