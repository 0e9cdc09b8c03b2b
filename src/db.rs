// ==========================================
// 储煤场自燃风险预测系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 集中建表语句，保证各入口 (CLI/测试) 使用同一套 schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 说明：
/// - 版本号用于提示/告警（不做自动迁移），避免静默在旧库上运行导致隐性错误。
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等，可重复执行）
///
/// 表清单:
/// - supplies:     入库台账（煤堆静态信息来源）
/// - temperatures: 测温台账
/// - fires:        火情台账
/// - weather:      逐日气象数据
/// - predictions:  预测台账（只追加）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS supplies (
            supply_id INTEGER PRIMARY KEY AUTOINCREMENT,
            unloading_date TEXT NOT NULL,
            coal_type TEXT NOT NULL,
            pile_id INTEGER NOT NULL,
            warehouse_id INTEGER NOT NULL,
            to_warehouse_ton REAL NOT NULL,
            loaded_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_supplies_composite
            ON supplies (warehouse_id, pile_id, unloading_date);

        CREATE TABLE IF NOT EXISTS temperatures (
            temperature_id INTEGER PRIMARY KEY AUTOINCREMENT,
            measurement_date TEXT NOT NULL,
            warehouse_id INTEGER NOT NULL,
            pile_id INTEGER NOT NULL,
            temperature REAL NOT NULL,
            picket TEXT,
            shift INTEGER,
            loaded_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_temperatures_composite
            ON temperatures (warehouse_id, pile_id, measurement_date);

        CREATE TABLE IF NOT EXISTS fires (
            fire_id INTEGER PRIMARY KEY AUTOINCREMENT,
            document_date TEXT NOT NULL,
            pile_id INTEGER NOT NULL,
            warehouse_id INTEGER NOT NULL,
            weight_act REAL NOT NULL,
            fire_start_date TEXT NOT NULL,
            loaded_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_fires_composite
            ON fires (warehouse_id, pile_id, fire_start_date);

        CREATE TABLE IF NOT EXISTS weather (
            weather_id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL UNIQUE,
            air_temperature REAL NOT NULL,
            humidity REAL NOT NULL,
            loaded_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS predictions (
            prediction_id INTEGER PRIMARY KEY AUTOINCREMENT,
            warehouse_id INTEGER NOT NULL,
            pile_id INTEGER NOT NULL,
            prediction_date TEXT NOT NULL,
            forecast_date TEXT NOT NULL,
            risk_level TEXT NOT NULL,
            probability REAL NOT NULL,
            model_version TEXT NOT NULL DEFAULT 'v1.0',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_predictions_composite
            ON predictions (warehouse_id, pile_id, prediction_date, forecast_date);
        CREATE INDEX IF NOT EXISTS idx_predictions_risk_level
            ON predictions (risk_level, forecast_date);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
