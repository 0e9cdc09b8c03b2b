// ==========================================
// 储煤场自燃风险预测系统 - 预测台账仓储
// ==========================================
// 职责: predictions 表数据访问
// 约束: 台账只追加, 重跑预测不覆盖、不去重
// 红线: Repository 不含业务逻辑，只负责数据访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::forecast::Prediction;
use crate::domain::types::RiskLevel;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// PredictionRepository Trait
// ==========================================
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// 批量写入预测记录（事务化, 只追加）
    async fn save_batch(&self, predictions: &[Prediction]) -> RepositoryResult<usize>;

    /// 查询煤堆在指定预报日期集合上的预测记录
    async fn get_by_pile_id_and_forecast_dates(
        &self,
        pile_id: i64,
        dates: &[NaiveDate],
    ) -> RepositoryResult<Vec<Prediction>>;

    /// 查询日期区间内的全部高风险预测（按 forecast_date 过滤）
    async fn get_all_high_risk(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Prediction>>;

    /// 查询煤堆的全部预测记录
    async fn get_all_by_pile_id(&self, pile_id: i64) -> RepositoryResult<Vec<Prediction>>;
}

// ==========================================
// SqlitePredictionRepository - SQLite 实现
// ==========================================
pub struct SqlitePredictionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePredictionRepository {
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

/// 行映射: predictions 行 -> Prediction
fn map_prediction_row(row: &Row<'_>) -> SqliteResult<Prediction> {
    Ok(Prediction {
        pile_id: row.get(0)?,
        warehouse_id: row.get(1)?,
        prediction_date: NaiveDate::parse_from_str(&row.get::<_, String>(2)?, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
        forecast_date: NaiveDate::parse_from_str(&row.get::<_, String>(3)?, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
        risk_level: RiskLevel::from_str(&row.get::<_, String>(4)?),
        probability: row.get(5)?,
        model_version: row.get(6)?,
    })
}

const PREDICTION_COLUMNS: &str =
    "pile_id, warehouse_id, prediction_date, forecast_date, risk_level, probability, model_version";

#[async_trait]
impl PredictionRepository for SqlitePredictionRepository {
    async fn save_batch(&self, predictions: &[Prediction]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for prediction in predictions {
            tx.execute(
                r#"
                INSERT INTO predictions
                    (warehouse_id, pile_id, prediction_date, forecast_date,
                     risk_level, probability, model_version)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    prediction.warehouse_id,
                    prediction.pile_id,
                    prediction.prediction_date.to_string(),
                    prediction.forecast_date.to_string(),
                    prediction.risk_level.to_db_str(),
                    prediction.probability,
                    prediction.model_version,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    async fn get_by_pile_id_and_forecast_dates(
        &self,
        pile_id: i64,
        dates: &[NaiveDate],
    ) -> RepositoryResult<Vec<Prediction>> {
        if dates.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let placeholders = (0..dates.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {PREDICTION_COLUMNS}
            FROM predictions
            WHERE pile_id = ?1 AND forecast_date IN ({placeholders})
            ORDER BY forecast_date ASC, prediction_id ASC
            "#,
        ))?;

        let mut sql_params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(pile_id)];
        for date in dates {
            sql_params.push(Box::new(date.to_string()));
        }

        let predictions = stmt
            .query_map(
                rusqlite::params_from_iter(sql_params.iter().map(|p| p.as_ref())),
                map_prediction_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(predictions)
    }

    async fn get_all_high_risk(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Prediction>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {PREDICTION_COLUMNS}
            FROM predictions
            WHERE risk_level = 'high'
              AND forecast_date >= ?1 AND forecast_date <= ?2
            ORDER BY forecast_date ASC, prediction_id ASC
            "#,
        ))?;

        let predictions = stmt
            .query_map(params![start.to_string(), end.to_string()], map_prediction_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(predictions)
    }

    async fn get_all_by_pile_id(&self, pile_id: i64) -> RepositoryResult<Vec<Prediction>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {PREDICTION_COLUMNS}
            FROM predictions
            WHERE pile_id = ?1
            ORDER BY forecast_date ASC, prediction_id ASC
            "#,
        ))?;

        let predictions = stmt
            .query_map(params![pile_id], map_prediction_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(predictions)
    }
}
