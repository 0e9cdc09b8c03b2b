// ==========================================
// FeatureBuilder 引擎集成测试
// ==========================================
// 测试目标: 验证特征口径与数据缺口处理
// 覆盖范围: 温度窗口特征 / 火情特征 / 季节编码 / 缺口跳过
// ==========================================

mod test_helpers;

use coal_fire_predictor::engine::FeatureBuilder;
use coal_fire_predictor::engine::ForecastRepositories;
use test_helpers::*;

fn feature_builder(repos: &ForecastRepositories) -> FeatureBuilder {
    FeatureBuilder::new(
        repos.temperature_repo.clone(),
        repos.fire_repo.clone(),
        repos.weather_repo.clone(),
    )
}

// ==========================================
// 数据缺口: 不产出部分填充的特征
// ==========================================

#[tokio::test]
async fn no_features_without_temperature() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);
    let reference_date = date(2025, 11, 20);

    let pile = sample_pile(1, date(2025, 10, 1));
    repos.pile_repo.save(&pile).await.unwrap();
    repos
        .weather_repo
        .save_batch(&[sample_weather(reference_date, 5.0, 70.0)])
        .await
        .unwrap();

    let result = feature_builder(&repos)
        .build(&pile, reference_date)
        .await
        .unwrap();
    assert!(result.is_none(), "无测温数据时不应产出特征");
}

#[tokio::test]
async fn no_features_without_weather() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);
    let reference_date = date(2025, 11, 20);

    let pile = sample_pile(1, date(2025, 10, 1));
    repos.pile_repo.save(&pile).await.unwrap();
    repos
        .temperature_repo
        .save_batch(&[sample_reading(1, reference_date, 42.0)])
        .await
        .unwrap();

    let result = feature_builder(&repos)
        .build(&pile, reference_date)
        .await
        .unwrap();
    assert!(result.is_none(), "基准日期无气象数据时不应产出特征");
}

#[tokio::test]
async fn future_reading_does_not_satisfy_reference_date() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);
    let reference_date = date(2025, 11, 20);

    let pile = sample_pile(1, date(2025, 10, 1));
    repos.pile_repo.save(&pile).await.unwrap();
    // 只有晚于基准日期的测温记录
    repos
        .temperature_repo
        .save_batch(&[sample_reading(1, date(2025, 11, 25), 48.0)])
        .await
        .unwrap();
    repos
        .weather_repo
        .save_batch(&[sample_weather(reference_date, 5.0, 70.0)])
        .await
        .unwrap();

    let result = feature_builder(&repos)
        .build(&pile, reference_date)
        .await
        .unwrap();
    assert!(result.is_none(), "基准日期之前无测温记录时不应产出特征");
}

// ==========================================
// 温度窗口特征
// ==========================================

#[tokio::test]
async fn trend_is_zero_with_single_reading() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);
    let reference_date = date(2025, 11, 20);

    let pile = sample_pile(1, date(2025, 10, 1));
    repos.pile_repo.save(&pile).await.unwrap();
    repos
        .temperature_repo
        .save_batch(&[sample_reading(1, reference_date, 42.0)])
        .await
        .unwrap();
    repos
        .weather_repo
        .save_batch(&[sample_weather(reference_date, 5.0, 70.0)])
        .await
        .unwrap();

    let features = feature_builder(&repos)
        .build(&pile, reference_date)
        .await
        .unwrap()
        .expect("特征应齐备");

    assert_eq!(features.temp_trend_7d, 0.0);
    assert_eq!(features.temp_avg_7d, 42.0);
    assert_eq!(features.temp_max_7d, 42.0);
    assert_eq!(features.temperature_p, 42.0);
}

#[tokio::test]
async fn trend_is_endpoint_difference() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);
    let reference_date = date(2025, 11, 20);

    let pile = sample_pile(1, date(2025, 10, 1));
    repos.pile_repo.save(&pile).await.unwrap();
    // 首末为 10.0 / 14.0, 中间值不影响趋势
    repos
        .temperature_repo
        .save_batch(&[
            sample_reading(1, date(2025, 11, 14), 10.0),
            sample_reading(1, date(2025, 11, 17), 30.0),
            sample_reading(1, reference_date, 14.0),
        ])
        .await
        .unwrap();
    repos
        .weather_repo
        .save_batch(&[sample_weather(reference_date, 5.0, 70.0)])
        .await
        .unwrap();

    let features = feature_builder(&repos)
        .build(&pile, reference_date)
        .await
        .unwrap()
        .expect("特征应齐备");

    assert_eq!(features.temp_trend_7d, 4.0, "趋势应为首末差值");
    assert_eq!(features.temp_max_7d, 30.0);
    assert!((features.temp_avg_7d - 18.0).abs() < 1e-9);
    assert_eq!(features.temperature_p, 14.0);
}

#[tokio::test]
async fn window_excludes_readings_older_than_seven_days() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);
    let reference_date = date(2025, 11, 20);

    let pile = sample_pile(1, date(2025, 10, 1));
    repos.pile_repo.save(&pile).await.unwrap();
    // 窗口下界为 11-13 (含); 11-12 的记录在窗口外
    repos
        .temperature_repo
        .save_batch(&[
            sample_reading(1, date(2025, 11, 12), 99.0),
            sample_reading(1, date(2025, 11, 13), 20.0),
            sample_reading(1, reference_date, 26.0),
        ])
        .await
        .unwrap();
    repos
        .weather_repo
        .save_batch(&[sample_weather(reference_date, 5.0, 70.0)])
        .await
        .unwrap();

    let features = feature_builder(&repos)
        .build(&pile, reference_date)
        .await
        .unwrap()
        .expect("特征应齐备");

    assert_eq!(features.temp_trend_7d, 6.0);
    assert_eq!(features.temp_max_7d, 26.0);
}

// ==========================================
// 火情特征
// ==========================================

#[tokio::test]
async fn fire_sentinels_without_history() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);
    let reference_date = date(2025, 11, 20);

    let pile = sample_pile(1, date(2025, 10, 1));
    repos.pile_repo.save(&pile).await.unwrap();
    repos
        .temperature_repo
        .save_batch(&[sample_reading(1, reference_date, 42.0)])
        .await
        .unwrap();
    repos
        .weather_repo
        .save_batch(&[sample_weather(reference_date, 5.0, 70.0)])
        .await
        .unwrap();

    let features = feature_builder(&repos)
        .build(&pile, reference_date)
        .await
        .unwrap()
        .expect("特征应齐备");

    assert_eq!(features.days_since_last_fire, -1, "无火情历史应取哨兵值");
    assert_eq!(features.fire_history_count, 0);
}

#[tokio::test]
async fn fire_history_counts_across_all_piles() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);
    let reference_date = date(2025, 11, 20);

    let pile = sample_pile(1, date(2025, 10, 1));
    repos.pile_repo.save(&pile).await.unwrap();
    repos
        .temperature_repo
        .save_batch(&[sample_reading(1, reference_date, 42.0)])
        .await
        .unwrap();
    repos
        .weather_repo
        .save_batch(&[sample_weather(reference_date, 5.0, 70.0)])
        .await
        .unwrap();
    // 本堆一次 + 其他煤堆两次 (其中一次超出365天窗口)
    repos
        .fire_repo
        .save_batch(&[
            sample_fire(1, date(2025, 11, 10)),
            sample_fire(7, date(2025, 6, 1)),
            sample_fire(9, date(2023, 1, 1)),
        ])
        .await
        .unwrap();

    let features = feature_builder(&repos)
        .build(&pile, reference_date)
        .await
        .unwrap()
        .expect("特征应齐备");

    assert_eq!(features.days_since_last_fire, 10);
    assert_eq!(
        features.fire_history_count, 2,
        "火情计数覆盖全场煤堆, 且只统计近365天"
    );
}

// ==========================================
// 堆存与季节特征
// ==========================================

#[tokio::test]
async fn days_in_storage_may_be_negative() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);
    let reference_date = date(2025, 11, 20);

    // 形成日期晚于基准日期
    let pile = sample_pile(1, date(2025, 12, 1));
    repos.pile_repo.save(&pile).await.unwrap();
    repos
        .temperature_repo
        .save_batch(&[sample_reading(1, reference_date, 42.0)])
        .await
        .unwrap();
    repos
        .weather_repo
        .save_batch(&[sample_weather(reference_date, 5.0, 70.0)])
        .await
        .unwrap();

    let features = feature_builder(&repos)
        .build(&pile, reference_date)
        .await
        .unwrap()
        .expect("特征应齐备");

    assert_eq!(features.days_in_storage, -11);
}

#[tokio::test]
async fn month_encoding_cycle_points() {
    let (_file, db_path) = create_test_db();
    let repos = build_repositories(&db_path);

    // 3月: 相位 π/2, sin=1, cos=0, 季节=1
    let march = date(2025, 3, 15);
    let pile = sample_pile(1, date(2025, 2, 1));
    repos.pile_repo.save(&pile).await.unwrap();
    repos
        .temperature_repo
        .save_batch(&[
            sample_reading(1, march, 42.0),
            sample_reading(1, date(2025, 6, 15), 42.0),
        ])
        .await
        .unwrap();
    repos
        .weather_repo
        .save_batch(&[
            sample_weather(march, 2.0, 65.0),
            sample_weather(date(2025, 6, 15), 25.0, 55.0),
        ])
        .await
        .unwrap();

    let builder = feature_builder(&repos);
    let features = builder
        .build(&pile, march)
        .await
        .unwrap()
        .expect("特征应齐备");
    assert_eq!(features.season, 1);
    assert!((features.month_sin - 1.0).abs() < 1e-9);
    assert!(features.month_cos.abs() < 1e-9);

    // 6月: 相位 π, sin=0, cos=-1, 季节=2
    let june = date(2025, 6, 15);
    let features = builder
        .build(&pile, june)
        .await
        .unwrap()
        .expect("特征应齐备");
    assert_eq!(features.season, 2);
    assert!(features.month_sin.abs() < 1e-9);
    assert!((features.month_cos + 1.0).abs() < 1e-9);
    assert_eq!(features.weather_temp_avg, 25.0);
    assert_eq!(features.weather_humidity, 55.0);
}
