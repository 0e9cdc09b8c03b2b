// ==========================================
// 储煤场自燃风险预测系统 - 气象仓储
// ==========================================
// 职责: weather 表数据访问
// 红线: Repository 不含业务逻辑，只负责数据访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::observation::WeatherDaily;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// WeatherRepository Trait
// ==========================================
#[async_trait]
pub trait WeatherRepository: Send + Sync {
    /// 查询指定日期的气象数据（精确匹配）
    async fn get_by_date(&self, date: NaiveDate) -> RepositoryResult<Option<WeatherDaily>>;

    /// 批量写入逐日气象数据（事务化, 同日重复写入以新值覆盖）
    async fn save_batch(&self, weathers: &[WeatherDaily]) -> RepositoryResult<usize>;
}

// ==========================================
// SqliteWeatherRepository - SQLite 实现
// ==========================================
pub struct SqliteWeatherRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteWeatherRepository {
    /// 创建新的仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

/// 行映射: weather 行 -> WeatherDaily
fn map_weather_row(row: &Row<'_>) -> SqliteResult<WeatherDaily> {
    Ok(WeatherDaily {
        date: NaiveDate::parse_from_str(&row.get::<_, String>(0)?, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
        air_temperature: row.get(1)?,
        humidity: row.get(2)?,
    })
}

#[async_trait]
impl WeatherRepository for SqliteWeatherRepository {
    async fn get_by_date(&self, date: NaiveDate) -> RepositoryResult<Option<WeatherDaily>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT date, air_temperature, humidity
            FROM weather
            WHERE date = ?1
            "#,
        )?;

        let result = stmt.query_row(params![date.to_string()], map_weather_row);

        match result {
            Ok(weather) => Ok(Some(weather)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_batch(&self, weathers: &[WeatherDaily]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for weather in weathers {
            tx.execute(
                r#"
                INSERT INTO weather (date, air_temperature, humidity)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(date) DO UPDATE SET
                    air_temperature = excluded.air_temperature,
                    humidity = excluded.humidity
                "#,
                params![
                    weather.date.to_string(),
                    weather.air_temperature,
                    weather.humidity,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }
}
