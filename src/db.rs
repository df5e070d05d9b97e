// ==========================================
// 炉次化学成分录入系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有连接的 PRAGMA 行为（外键必须开启，存储端负责引用完整性）
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 幂等建表: heats / chemistry / schema_version
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

use crate::domain::types::Element;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 存储端写入时间默认值（UTC，毫秒精度，RFC3339）
const CREATED_AT_DEFAULT: &str = "(strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))";

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
    let mut conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    crate::perf::install_sqlite_tracing(&mut conn);
    Ok(conn)
}

/// 打开内存数据库（测试/演示用），已建表
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// 元素列定义片段: `c REAL CHECK (c IS NULL OR (c >= 0 AND c <= 100)), ...`
fn element_column_ddl() -> String {
    Element::ALL
        .iter()
        .map(|e| {
            let col = e.column();
            format!("{col} REAL CHECK ({col} IS NULL OR ({col} >= 0 AND {col} <= 100))")
        })
        .collect::<Vec<_>>()
        .join(",\n            ")
}

/// 幂等建表
///
/// 说明：
/// - heat_code 的非空约束同时在存储端以 CHECK 兜底
/// - chemistry.heat_id 通过外键引用 heats.id
/// - created_at 由存储端在写入时赋值
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS heats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            heat_code TEXT NOT NULL CHECK (length(trim(heat_code)) > 0),
            supplier TEXT,
            created_at TEXT NOT NULL DEFAULT {created_at}
        );

        CREATE INDEX IF NOT EXISTS idx_heats_created_at ON heats (created_at DESC, id DESC);

        CREATE TABLE IF NOT EXISTS chemistry (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            heat_id INTEGER NOT NULL REFERENCES heats (id),
            {elements},
            others TEXT,
            created_at TEXT NOT NULL DEFAULT {created_at}
        );

        CREATE INDEX IF NOT EXISTS idx_chemistry_created_at ON chemistry (created_at DESC, id DESC);
        CREATE INDEX IF NOT EXISTS idx_chemistry_heat_id ON chemistry (heat_id);

        INSERT OR IGNORE INTO schema_version (version) VALUES ({version});
        "#,
        created_at = CREATED_AT_DEFAULT,
        elements = element_column_ddl(),
        version = CURRENT_SCHEMA_VERSION,
    );

    conn.execute_batch(&ddl)
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

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_schema_version_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = open_in_memory().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_chemistry_has_all_element_columns() {
        let conn = open_in_memory().unwrap();
        let mut stmt = conn.prepare("PRAGMA table_info(chemistry)").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        for e in Element::ALL {
            assert!(columns.contains(&e.column().to_string()), "缺少列 {}", e.column());
        }
    }

    #[test]
    fn test_store_rejects_blank_heat_code() {
        let conn = open_in_memory().unwrap();
        let result = conn.execute("INSERT INTO heats (heat_code) VALUES ('   ')", []);
        assert!(result.is_err());
    }
}
