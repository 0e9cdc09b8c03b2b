// ==========================================
// 储煤场自燃风险预测系统 - 测温仓储
// ==========================================
// 职责: temperatures 表数据访问
// 红线: Repository 不含业务逻辑，只负责数据访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::observation::TemperatureReading;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// TemperatureRepository Trait
// ==========================================
#[async_trait]
pub trait TemperatureRepository: Send + Sync {
    /// 查询煤堆最近一次测温（不限日期）
    async fn get_latest_by_pile_id(
        &self,
        pile_id: i64,
    ) -> RepositoryResult<Option<TemperatureReading>>;

    /// 查询煤堆在指定日期（含）之前的最近一次测温
    async fn get_latest_as_of(
        &self,
        pile_id: i64,
        as_of: NaiveDate,
    ) -> RepositoryResult<Option<TemperatureReading>>;

    /// 查询煤堆在日期区间内的全部测温记录（按日期升序）
    async fn get_by_pile_id_and_date_range(
        &self,
        pile_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<Vec<TemperatureReading>>;

    /// 批量写入测温记录（事务化）
    ///
    /// # 返回
    /// - Ok(usize): 成功插入的记录数
    /// - Err: 数据库错误（整个事务回滚）
    async fn save_batch(&self, readings: &[TemperatureReading]) -> RepositoryResult<usize>;
}

// ==========================================
// SqliteTemperatureRepository - SQLite 实现
// ==========================================
pub struct SqliteTemperatureRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTemperatureRepository {
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

/// 行映射: temperatures 行 -> TemperatureReading
fn map_reading_row(row: &Row<'_>) -> SqliteResult<TemperatureReading> {
    Ok(TemperatureReading {
        pile_id: row.get(0)?,
        warehouse_id: row.get(1)?,
        measurement_date: NaiveDate::parse_from_str(&row.get::<_, String>(2)?, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
        temperature: row.get(3)?,
        picket: row.get(4)?,
        shift: row.get(5)?,
    })
}

const READING_COLUMNS: &str =
    "pile_id, warehouse_id, measurement_date, temperature, picket, shift";

#[async_trait]
impl TemperatureRepository for SqliteTemperatureRepository {
    async fn get_latest_by_pile_id(
        &self,
        pile_id: i64,
    ) -> RepositoryResult<Option<TemperatureReading>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {READING_COLUMNS}
            FROM temperatures
            WHERE pile_id = ?1
            ORDER BY measurement_date DESC, temperature_id DESC
            LIMIT 1
            "#,
        ))?;

        let result = stmt.query_row(params![pile_id], map_reading_row);

        match result {
            Ok(reading) => Ok(Some(reading)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_latest_as_of(
        &self,
        pile_id: i64,
        as_of: NaiveDate,
    ) -> RepositoryResult<Option<TemperatureReading>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {READING_COLUMNS}
            FROM temperatures
            WHERE pile_id = ?1 AND measurement_date <= ?2
            ORDER BY measurement_date DESC, temperature_id DESC
            LIMIT 1
            "#,
        ))?;

        let result = stmt.query_row(params![pile_id, as_of.to_string()], map_reading_row);

        match result {
            Ok(reading) => Ok(Some(reading)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_pile_id_and_date_range(
        &self,
        pile_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<Vec<TemperatureReading>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {READING_COLUMNS}
            FROM temperatures
            WHERE pile_id = ?1 AND measurement_date >= ?2 AND measurement_date <= ?3
            ORDER BY measurement_date ASC, temperature_id ASC
            "#,
        ))?;

        let readings = stmt
            .query_map(
                params![pile_id, start_date.to_string(), end_date.to_string()],
                map_reading_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(readings)
    }

    async fn save_batch(&self, readings: &[TemperatureReading]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for reading in readings {
            tx.execute(
                r#"
                INSERT INTO temperatures
                    (measurement_date, warehouse_id, pile_id, temperature, picket, shift)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    reading.measurement_date.to_string(),
                    reading.warehouse_id,
                    reading.pile_id,
                    reading.temperature,
                    reading.picket,
                    reading.shift,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }
}
