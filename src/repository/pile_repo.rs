// ==========================================
// 储煤场自燃风险预测系统 - 煤堆仓储
// ==========================================
// 职责: supplies 表数据访问, 聚合出煤堆静态信息
// 红线: Repository 不含业务逻辑，只负责数据访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::pile::CoalPile;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// CoalPileRepository Trait
// ==========================================
// 用途: 煤堆数据访问接口
// 实现者: SqliteCoalPileRepository（使用 rusqlite）
#[async_trait]
pub trait CoalPileRepository: Send + Sync {
    /// 按编号查询煤堆
    ///
    /// # 返回
    /// - Ok(Some(CoalPile)): 找到煤堆（同编号多条入库记录时取最早一条）
    /// - Ok(None): 未找到
    async fn get_by_id(&self, pile_id: i64) -> RepositoryResult<Option<CoalPile>>;

    /// 查询全部在监煤堆
    ///
    /// # 返回
    /// - Ok(Vec<CoalPile>): 每个 pile_id 一条，按最早入库记录聚合
    async fn get_all_active(&self) -> RepositoryResult<Vec<CoalPile>>;

    /// 写入一条入库记录
    async fn save(&self, pile: &CoalPile) -> RepositoryResult<()>;
}

// ==========================================
// SqliteCoalPileRepository - SQLite 实现
// ==========================================
pub struct SqliteCoalPileRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCoalPileRepository {
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

/// 行映射: supplies 行 -> CoalPile
fn map_pile_row(row: &Row<'_>) -> SqliteResult<CoalPile> {
    Ok(CoalPile {
        pile_id: row.get(0)?,
        coal_type: row.get(1)?,
        formation_date: NaiveDate::parse_from_str(&row.get::<_, String>(2)?, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
        initial_volume_tonnes: row.get(3)?,
        warehouse_id: row.get(4)?,
    })
}

#[async_trait]
impl CoalPileRepository for SqliteCoalPileRepository {
    async fn get_by_id(&self, pile_id: i64) -> RepositoryResult<Option<CoalPile>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT pile_id, coal_type, unloading_date, to_warehouse_ton, warehouse_id
            FROM supplies
            WHERE pile_id = ?1
            ORDER BY unloading_date ASC, supply_id ASC
            LIMIT 1
            "#,
        )?;

        let result = stmt.query_row(params![pile_id], map_pile_row);

        match result {
            Ok(pile) => Ok(Some(pile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_all_active(&self) -> RepositoryResult<Vec<CoalPile>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT s.pile_id, s.coal_type, s.unloading_date, s.to_warehouse_ton, s.warehouse_id
            FROM supplies s
            WHERE s.supply_id = (
                SELECT s2.supply_id
                FROM supplies s2
                WHERE s2.pile_id = s.pile_id
                ORDER BY s2.unloading_date ASC, s2.supply_id ASC
                LIMIT 1
            )
            ORDER BY s.pile_id ASC
            "#,
        )?;

        let piles = stmt
            .query_map([], map_pile_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(piles)
    }

    async fn save(&self, pile: &CoalPile) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO supplies (unloading_date, coal_type, pile_id, warehouse_id, to_warehouse_ton)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                pile.formation_date.to_string(),
                pile.coal_type,
                pile.pile_id,
                pile.warehouse_id,
                pile.initial_volume_tonnes,
            ],
        )?;
        Ok(())
    }
}
