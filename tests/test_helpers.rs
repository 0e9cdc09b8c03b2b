// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use coal_fire_predictor::db;
use coal_fire_predictor::domain::{CoalPile, FireIncident, TemperatureReading, WeatherDaily};
use coal_fire_predictor::engine::ForecastRepositories;
use coal_fire_predictor::repository::{
    SqliteCoalPileRepository, SqliteFireIncidentRepository, SqlitePredictionRepository,
    SqliteTemperatureRepository, SqliteWeatherRepository,
};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> (NamedTempFile, String) {
    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = db::open_sqlite_connection(&db_path).unwrap();
    db::init_schema(&conn).unwrap();

    (temp_file, db_path)
}

/// 基于共享连接构建全部仓储
pub fn build_repositories(db_path: &str) -> ForecastRepositories {
    let conn = Arc::new(Mutex::new(db::open_sqlite_connection(db_path).unwrap()));
    ForecastRepositories::new(
        Arc::new(SqliteCoalPileRepository::from_connection(conn.clone())),
        Arc::new(SqliteTemperatureRepository::from_connection(conn.clone())),
        Arc::new(SqliteFireIncidentRepository::from_connection(conn.clone())),
        Arc::new(SqliteWeatherRepository::from_connection(conn.clone())),
        Arc::new(SqlitePredictionRepository::from_connection(conn)),
    )
}

/// 日期字面量
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// 创建测试用煤堆
pub fn sample_pile(pile_id: i64, formation_date: NaiveDate) -> CoalPile {
    CoalPile {
        pile_id,
        coal_type: "褐煤".to_string(),
        formation_date,
        initial_volume_tonnes: 12_000.0,
        warehouse_id: 1,
    }
}

/// 创建测试用测温记录
pub fn sample_reading(pile_id: i64, measurement_date: NaiveDate, temperature: f64) -> TemperatureReading {
    TemperatureReading {
        pile_id,
        warehouse_id: 1,
        measurement_date,
        temperature,
        picket: None,
        shift: None,
    }
}

/// 创建测试用火情记录
pub fn sample_fire(pile_id: i64, actual_date: NaiveDate) -> FireIncident {
    FireIncident {
        pile_id,
        warehouse_id: 1,
        actual_date,
        document_date: actual_date + chrono::Duration::days(1),
        weight_act: 150.0,
    }
}

/// 创建测试用气象记录
pub fn sample_weather(date: NaiveDate, air_temperature: f64, humidity: f64) -> WeatherDaily {
    WeatherDaily {
        date,
        air_temperature,
        humidity,
    }
}
