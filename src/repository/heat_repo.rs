// ==========================================
// 炉次化学成分录入系统 - 炉次数据仓储
// ==========================================
// 职责: 管理 heats 表的写入与倒序查询
// 红线: Repository 不含业务逻辑
// ==========================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::db::open_sqlite_connection;
use crate::domain::heat::{Heat, HeatOption, NewHeat};
use crate::perf::PerfGuard;
use crate::repository::deadline::write_before;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::store::HeatStore;

// ==========================================
// HeatRepository - 炉次仓储
// ==========================================
/// 炉次仓储
/// 职责: heats 表的 INSERT / SELECT
/// 红线: 不含业务逻辑，只负责数据访问
#[derive(Clone)]
pub struct HeatRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HeatRepository {
    /// 创建新的 HeatRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
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

    /// 写入炉次（不限时）
    pub fn create(&self, heat: &NewHeat) -> RepositoryResult<Heat> {
        self.create_before(heat, None)
    }

    /// 写入炉次，超过截止时间则回滚
    ///
    /// # 返回
    /// - Ok(Heat): 含存储端分配的 id 与 created_at
    /// - Err(DeadlineExceeded): 未写入任何行
    /// - Err: 数据库错误（含 CHECK 约束违反）
    pub fn create_before(&self, heat: &NewHeat, deadline: Option<Instant>) -> RepositoryResult<Heat> {
        let _perf = PerfGuard::new("repo.heat.create");
        let mut conn = self.get_conn()?;
        let created = write_before(&mut conn, deadline, |tx| {
            tx.execute(
                "INSERT INTO heats (heat_code, supplier) VALUES (?1, ?2)",
                params![heat.heat_code(), heat.supplier()],
            )?;
            let id = tx.last_insert_rowid();
            Ok(tx.query_row(
                "SELECT id, heat_code, supplier, created_at FROM heats WHERE id = ?1",
                params![id],
                map_heat_row,
            )?)
        })?;

        tracing::debug!(heat_id = created.id, heat_code = %created.heat_code, "炉次已写入");
        Ok(created)
    }

    /// 按 created_at 倒序查询炉次
    ///
    /// # 参数
    /// - `limit`: 返回上限，None 表示不限
    pub fn find_recent(&self, limit: Option<u32>) -> RepositoryResult<Vec<Heat>> {
        let _perf = PerfGuard::new("repo.heat.find_recent");
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, heat_code, supplier, created_at
            FROM heats
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        // SQLite: 负数 LIMIT 表示不限
        let limit = limit.map(i64::from).unwrap_or(-1);
        let heats = stmt
            .query_map(params![limit], map_heat_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(heats)
    }

    /// 查询下拉选择项 (id, heat_code)，按 created_at 倒序
    pub fn find_options(&self) -> RepositoryResult<Vec<HeatOption>> {
        let _perf = PerfGuard::new("repo.heat.find_options");
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, heat_code
            FROM heats
            ORDER BY created_at DESC, id DESC
            "#,
        )?;

        let options = stmt
            .query_map([], |row| {
                Ok(HeatOption {
                    id: row.get(0)?,
                    heat_code: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(options)
    }
}

#[async_trait]
impl HeatStore for HeatRepository {
    async fn list_newest_first(&self, limit: Option<u32>) -> RepositoryResult<Vec<Heat>> {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.find_recent(limit)).await?
    }

    async fn list_options(&self) -> RepositoryResult<Vec<HeatOption>> {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.find_options()).await?
    }

    async fn insert(&self, heat: NewHeat, deadline: Instant) -> RepositoryResult<Heat> {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.create_before(&heat, Some(deadline))).await?
    }
}

// ==========================================
// 行映射
// ==========================================

fn map_heat_row(row: &Row<'_>) -> SqliteResult<Heat> {
    Ok(Heat {
        id: row.get(0)?,
        heat_code: row.get(1)?,
        supplier: row.get(2)?,
        created_at: parse_store_timestamp(row, 3)?,
    })
}

/// 解析存储端写入时间（RFC3339，兼容 `YYYY-MM-DD HH:MM:SS` 格式）
pub(crate) fn parse_store_timestamp(row: &Row<'_>, idx: usize) -> SqliteResult<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> HeatRepository {
        let conn = crate::db::open_in_memory().unwrap();
        HeatRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_create_assigns_id_and_created_at() {
        let repo = setup_repo();
        let heat = repo
            .create(&NewHeat::new("H-001", "ABC Steel").unwrap())
            .unwrap();

        assert!(heat.id > 0);
        assert_eq!(heat.heat_code, "H-001");
        assert_eq!(heat.supplier.as_deref(), Some("ABC Steel"));
        assert!(heat.created_at <= Utc::now());
    }

    #[test]
    fn test_find_recent_newest_first() {
        let repo = setup_repo();
        let a = repo.create(&NewHeat::new("A", "").unwrap()).unwrap();
        let b = repo.create(&NewHeat::new("B", "").unwrap()).unwrap();

        let heats = repo.find_recent(None).unwrap();
        assert_eq!(heats.len(), 2);
        assert_eq!(heats[0].id, b.id);
        assert_eq!(heats[1].id, a.id);
        assert_eq!(heats[1].supplier, None);
    }

    #[test]
    fn test_find_recent_with_limit() {
        let repo = setup_repo();
        for code in ["H1", "H2", "H3"] {
            repo.create(&NewHeat::new(code, "").unwrap()).unwrap();
        }
        let heats = repo.find_recent(Some(2)).unwrap();
        assert_eq!(heats.len(), 2);
        assert_eq!(heats[0].heat_code, "H3");
    }

    #[test]
    fn test_find_options() {
        let repo = setup_repo();
        let a = repo.create(&NewHeat::new("A", "X").unwrap()).unwrap();
        let b = repo.create(&NewHeat::new("B", "Y").unwrap()).unwrap();

        let options = repo.find_options().unwrap();
        assert_eq!(
            options,
            vec![
                HeatOption { id: b.id, heat_code: "B".to_string() },
                HeatOption { id: a.id, heat_code: "A".to_string() },
            ]
        );
    }

    #[tokio::test]
    async fn test_heat_store_trait() {
        let repo = setup_repo();
        let store: &dyn HeatStore = &repo;

        let deadline = Instant::now() + std::time::Duration::from_secs(5);
        let created = store.insert(NewHeat::new("T-1", "").unwrap(), deadline).await.unwrap();
        let listed = store.list_newest_first(None).await.unwrap();
        assert_eq!(listed[0], created);
    }
}
