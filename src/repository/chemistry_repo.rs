// ==========================================
// 炉次化学成分录入系统 - 化学成分数据仓储
// ==========================================
// 职责: 管理 chemistry 表的写入与倒序分页查询
// 红线: Repository 不含业务逻辑（范围校验在 api::validator）
// 约束: 所有查询使用参数化
// ==========================================

use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::db::open_sqlite_connection;
use crate::domain::chemistry::{ChemistryRecord, Composition, NewChemistryRecord};
use crate::domain::types::{Element, Measurement};
use crate::perf::PerfGuard;
use crate::repository::deadline::write_before;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::heat_repo::parse_store_timestamp;
use crate::repository::store::ChemistryStore;

/// 元素列名列表: "c, mn, si, ..."
fn element_columns() -> String {
    Element::ALL
        .iter()
        .map(|e| e.column())
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT 列: id, heat_id, <17 元素>, others, created_at
fn select_columns() -> String {
    format!("id, heat_id, {}, others, created_at", element_columns())
}

// ==========================================
// ChemistryRepository - 化学成分仓储
// ==========================================
/// 化学成分仓储
/// 职责: chemistry 表的 INSERT / SELECT
#[derive(Clone)]
pub struct ChemistryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ChemistryRepository {
    /// 创建新的 ChemistryRepository 实例
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

    /// 写入化学成分记录（不限时）
    pub fn create(&self, record: &NewChemistryRecord) -> RepositoryResult<ChemistryRecord> {
        self.create_before(record, None)
    }

    /// 写入化学成分记录，超过截止时间则回滚
    ///
    /// # 返回
    /// - Ok(ChemistryRecord): 含存储端分配的 id 与 created_at
    /// - Err(DeadlineExceeded): 未写入任何行
    /// - Err(ForeignKeyViolation): heat_id 不存在
    /// - Err(CheckConstraintViolation): 元素值越界（存储端兜底）
    pub fn create_before(
        &self,
        record: &NewChemistryRecord,
        deadline: Option<Instant>,
    ) -> RepositoryResult<ChemistryRecord> {
        let _perf = PerfGuard::new("repo.chemistry.create");

        // heat_id + 17 元素 + others
        let mut values: Vec<Value> = Vec::with_capacity(Element::ALL.len() + 2);
        values.push(Value::Integer(record.heat_id));
        for value in record.composition.values() {
            values.push(match value {
                Some(x) => Value::Real(x),
                None => Value::Null,
            });
        }
        values.push(match &record.others {
            Some(text) => Value::Text(text.clone()),
            None => Value::Null,
        });

        let placeholders = (1..=values.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO chemistry (heat_id, {}, others) VALUES ({})",
            element_columns(),
            placeholders
        );

        let mut conn = self.get_conn()?;
        let created = write_before(&mut conn, deadline, |tx| {
            tx.execute(&sql, params_from_iter(values.iter()))?;
            let id = tx.last_insert_rowid();
            Ok(tx.query_row(
                &format!("SELECT {} FROM chemistry WHERE id = ?1", select_columns()),
                params![id],
                map_chemistry_row,
            )?)
        })?;

        tracing::debug!(
            chemistry_id = created.id,
            heat_id = created.heat_id,
            measured = created.composition.measured_count(),
            "化学成分记录已写入"
        );
        Ok(created)
    }

    /// 按 created_at 倒序查询最近的化学成分记录
    ///
    /// # 参数
    /// - `limit`: 返回上限
    pub fn find_recent(&self, limit: u32) -> RepositoryResult<Vec<ChemistryRecord>> {
        let _perf = PerfGuard::new("repo.chemistry.find_recent");
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM chemistry
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#,
            select_columns()
        ))?;

        let records = stmt
            .query_map(params![limit], map_chemistry_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }

    /// 查询某炉次下的化学成分记录（倒序）
    pub fn find_by_heat_id(&self, heat_id: i64, limit: u32) -> RepositoryResult<Vec<ChemistryRecord>> {
        let _perf = PerfGuard::new("repo.chemistry.find_by_heat_id");
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM chemistry
            WHERE heat_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
            select_columns()
        ))?;

        let records = stmt
            .query_map(params![heat_id, limit], map_chemistry_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }
}

#[async_trait]
impl ChemistryStore for ChemistryRepository {
    async fn list_newest_first(&self, limit: u32) -> RepositoryResult<Vec<ChemistryRecord>> {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.find_recent(limit)).await?
    }

    async fn list_for_heat(
        &self,
        heat_id: i64,
        limit: u32,
    ) -> RepositoryResult<Vec<ChemistryRecord>> {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.find_by_heat_id(heat_id, limit)).await?
    }

    async fn insert(
        &self,
        record: NewChemistryRecord,
        deadline: Instant,
    ) -> RepositoryResult<ChemistryRecord> {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.create_before(&record, Some(deadline))).await?
    }
}

// ==========================================
// 行映射
// ==========================================
// 列布局: 0=id, 1=heat_id, 2..=18 元素, 19=others, 20=created_at
fn map_chemistry_row(row: &Row<'_>) -> SqliteResult<ChemistryRecord> {
    let mut composition = Composition::default();
    for element in Element::ALL {
        let value: Option<f64> = row.get(2 + element.index())?;
        composition.set(element, Measurement::from(value));
    }

    let base = 2 + Element::ALL.len();
    Ok(ChemistryRecord {
        id: row.get(0)?,
        heat_id: row.get(1)?,
        composition,
        others: row.get(base)?,
        created_at: parse_store_timestamp(row, base + 1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::heat::NewHeat;
    use crate::repository::heat_repo::HeatRepository;

    fn setup() -> (HeatRepository, ChemistryRepository) {
        let conn = Arc::new(Mutex::new(crate::db::open_in_memory().unwrap()));
        (
            HeatRepository::from_connection(conn.clone()),
            ChemistryRepository::from_connection(conn),
        )
    }

    fn new_record(heat_id: i64, entries: &[(Element, f64)], others: Option<&str>) -> NewChemistryRecord {
        let mut composition = Composition::default();
        for (element, value) in entries {
            composition.set(*element, Measurement::Number(*value));
        }
        NewChemistryRecord {
            heat_id,
            composition,
            others: others.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_round_trip_preserves_values_and_absence() {
        let (heat_repo, repo) = setup();
        let heat = heat_repo.create(&NewHeat::new("H-7", "").unwrap()).unwrap();

        let record = new_record(
            heat.id,
            &[(Element::C, 0.25), (Element::Cr, 18.0)],
            Some("Ca 0.002"),
        );
        repo.create(&record).unwrap();

        let rows = repo.find_recent(20).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.heat_id, heat.id);
        assert_eq!(row.composition.c, Some(0.25));
        assert_eq!(row.composition.cr, Some(18.0));
        assert_eq!(row.others.as_deref(), Some("Ca 0.002"));
        assert_eq!(row.composition.measured_count(), 2);
    }

    #[test]
    fn test_zero_is_stored_distinct_from_absent() {
        let (heat_repo, repo) = setup();
        let heat = heat_repo.create(&NewHeat::new("H-0", "").unwrap()).unwrap();

        let created = repo
            .create(&new_record(heat.id, &[(Element::Mn, 0.0)], None))
            .unwrap();
        assert_eq!(created.composition.mn, Some(0.0));
        assert_eq!(created.composition.si, None);
        assert_eq!(created.others, None);
    }

    #[test]
    fn test_unknown_heat_is_foreign_key_violation() {
        let (_heat_repo, repo) = setup();
        let result = repo.create(&new_record(404, &[], None));
        assert!(matches!(result, Err(RepositoryError::ForeignKeyViolation(_))));
        assert!(repo.find_recent(20).unwrap().is_empty());
    }

    #[test]
    fn test_store_check_rejects_out_of_range() {
        let (heat_repo, repo) = setup();
        let heat = heat_repo.create(&NewHeat::new("H-X", "").unwrap()).unwrap();
        let result = repo.create(&new_record(heat.id, &[(Element::Ni, 150.0)], None));
        assert!(matches!(result, Err(RepositoryError::CheckConstraintViolation(_))));
    }

    #[test]
    fn test_find_recent_respects_limit_and_order() {
        let (heat_repo, repo) = setup();
        let heat = heat_repo.create(&NewHeat::new("H-L", "").unwrap()).unwrap();
        let mut ids = Vec::new();
        for i in 0..25 {
            let created = repo
                .create(&new_record(heat.id, &[(Element::C, i as f64 / 100.0)], None))
                .unwrap();
            ids.push(created.id);
        }

        let rows = repo.find_recent(20).unwrap();
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0].id, *ids.last().unwrap());
        assert!(rows.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[test]
    fn test_find_by_heat_id() {
        let (heat_repo, repo) = setup();
        let a = heat_repo.create(&NewHeat::new("A", "").unwrap()).unwrap();
        let b = heat_repo.create(&NewHeat::new("B", "").unwrap()).unwrap();
        repo.create(&new_record(a.id, &[], Some("a1"))).unwrap();
        repo.create(&new_record(b.id, &[], Some("b1"))).unwrap();
        repo.create(&new_record(a.id, &[], Some("a2"))).unwrap();

        let rows = repo.find_by_heat_id(a.id, 20).unwrap();
        let notes: Vec<_> = rows.iter().filter_map(|r| r.others.as_deref()).collect();
        assert_eq!(notes, vec!["a2", "a1"]);
    }
}
