// ==========================================
// 储煤场自燃风险预测系统 - 火情仓储
// ==========================================
// 职责: fires 表数据访问
// 红线: Repository 不含业务逻辑，只负责数据访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::fire::FireIncident;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// FireIncidentRepository Trait
// ==========================================
#[async_trait]
pub trait FireIncidentRepository: Send + Sync {
    /// 查询煤堆全部火情（按起火日期升序）
    async fn get_by_pile_id(&self, pile_id: i64) -> RepositoryResult<Vec<FireIncident>>;

    /// 查询煤堆最近一次起火日期
    async fn get_last_fire_date_by_pile_id(
        &self,
        pile_id: i64,
    ) -> RepositoryResult<Option<NaiveDate>>;

    /// 查询日期区间内的全部火情（不限煤堆）
    async fn get_fires_in_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<FireIncident>>;

    /// 批量写入火情记录（事务化）
    async fn save_batch(&self, incidents: &[FireIncident]) -> RepositoryResult<usize>;
}

// ==========================================
// SqliteFireIncidentRepository - SQLite 实现
// ==========================================
pub struct SqliteFireIncidentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteFireIncidentRepository {
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

/// 行映射: fires 行 -> FireIncident
fn map_incident_row(row: &Row<'_>) -> SqliteResult<FireIncident> {
    Ok(FireIncident {
        pile_id: row.get(0)?,
        warehouse_id: row.get(1)?,
        actual_date: NaiveDate::parse_from_str(&row.get::<_, String>(2)?, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
        document_date: NaiveDate::parse_from_str(&row.get::<_, String>(3)?, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
        weight_act: row.get(4)?,
    })
}

const INCIDENT_COLUMNS: &str =
    "pile_id, warehouse_id, fire_start_date, document_date, weight_act";

#[async_trait]
impl FireIncidentRepository for SqliteFireIncidentRepository {
    async fn get_by_pile_id(&self, pile_id: i64) -> RepositoryResult<Vec<FireIncident>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {INCIDENT_COLUMNS}
            FROM fires
            WHERE pile_id = ?1
            ORDER BY fire_start_date ASC, fire_id ASC
            "#,
        ))?;

        let incidents = stmt
            .query_map(params![pile_id], map_incident_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(incidents)
    }

    async fn get_last_fire_date_by_pile_id(
        &self,
        pile_id: i64,
    ) -> RepositoryResult<Option<NaiveDate>> {
        let conn = self.get_conn()?;
        let date_str: Option<String> = conn
            .query_row(
                r#"
                SELECT fire_start_date
                FROM fires
                WHERE pile_id = ?1
                ORDER BY fire_start_date DESC
                LIMIT 1
                "#,
                params![pile_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(date_str.map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
        }))
    }

    async fn get_fires_in_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<FireIncident>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {INCIDENT_COLUMNS}
            FROM fires
            WHERE fire_start_date >= ?1 AND fire_start_date <= ?2
            ORDER BY fire_start_date ASC, fire_id ASC
            "#,
        ))?;

        let incidents = stmt
            .query_map(params![start.to_string(), end.to_string()], map_incident_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(incidents)
    }

    async fn save_batch(&self, incidents: &[FireIncident]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for incident in incidents {
            tx.execute(
                r#"
                INSERT INTO fires
                    (document_date, pile_id, warehouse_id, weight_act, fire_start_date)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    incident.document_date.to_string(),
                    incident.pile_id,
                    incident.warehouse_id,
                    incident.weight_act,
                    incident.actual_date.to_string(),
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }
}
