// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use rusqlite::Connection;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tempfile::NamedTempFile;

use heat_ledger::api::{ApiError, ChemistryApi, HeatApi};
use heat_ledger::config::StoreSettings;
use heat_ledger::db;
use heat_ledger::domain::heat::{Heat, NewHeat};
use heat_ledger::repository::{ChemistryRepository, HeatRepository};

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 两个仓储共享同一连接，API 与 AppState 装配方式一致
pub struct ApiTestEnv {
    pub db_path: String,
    pub settings: StoreSettings,
    pub heat_api: Arc<HeatApi>,
    pub chemistry_api: Arc<ChemistryApi>,

    // Repository层（用于测试数据准备与直接校验）
    pub heat_repo: Arc<HeatRepository>,
    pub chemistry_repo: Arc<ChemistryRepository>,

    // 两个仓储共享的连接
    pub conn: Arc<Mutex<Connection>>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的API测试环境（默认配置）
    pub fn new() -> Result<Self, String> {
        Self::with_settings(StoreSettings::default())
    }

    /// 使用指定配置创建API测试环境
    pub fn with_settings(settings: StoreSettings) -> Result<Self, String> {
        heat_ledger::logging::init_test();

        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let conn = db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let heat_repo = Arc::new(HeatRepository::from_connection(conn.clone()));
        let chemistry_repo = Arc::new(ChemistryRepository::from_connection(conn.clone()));

        let heat_api = Arc::new(HeatApi::new(heat_repo.clone(), &settings));
        let chemistry_api = Arc::new(ChemistryApi::new(
            heat_repo.clone(),
            chemistry_repo.clone(),
            &settings,
        ));

        Ok(Self {
            db_path,
            settings,
            heat_api,
            chemistry_api,
            heat_repo,
            chemistry_repo,
            conn,
            _temp_file: temp_file,
        })
    }

    /// 准备炉次数据（绕过 API 直接写仓储）
    pub fn prepare_heat(&self, heat_code: &str, supplier: &str) -> Result<Heat, String> {
        let new_heat = NewHeat::new(heat_code, supplier)
            .ok_or_else(|| format!("炉号为空: {:?}", heat_code))?;
        self.heat_repo
            .create(&new_heat)
            .map_err(|e| format!("准备炉次失败: {}", e))
    }

    /// 直接统计表行数
    pub fn count_rows(&self, table: &str) -> i64 {
        let conn = Connection::open(&self.db_path).expect("打开数据库失败");
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .expect("统计行数失败")
    }

    /// 在另一线程占用共享连接一段时间（模拟前一个慢请求）
    ///
    /// 返回时锁已被占用
    pub fn hold_connection(&self, duration: Duration) -> JoinHandle<()> {
        let conn = self.conn.clone();
        let (locked_tx, locked_rx) = mpsc::channel();
        let handle = std::thread::spawn(move || {
            let _guard = conn.lock().expect("获取连接锁失败");
            let _ = locked_tx.send(());
            std::thread::sleep(duration);
        });
        locked_rx.recv().expect("占用线程未取得连接锁");
        handle
    }

    /// 用独立连接占住写锁（模拟其他进程的未提交写事务）
    pub fn hold_write_lock(&self) -> Connection {
        let blocker = db::open_sqlite_connection(&self.db_path).expect("打开数据库失败");
        blocker.execute_batch("BEGIN IMMEDIATE").expect("获取写锁失败");
        blocker
    }

    /// 直接删除炉次（模拟他人删除）
    pub fn delete_heat(&self, heat_id: i64) {
        let conn = Connection::open(&self.db_path).expect("打开数据库失败");
        conn.execute("DELETE FROM heats WHERE id = ?1", [heat_id])
            .expect("删除炉次失败");
    }
}

// ==========================================
// 断言辅助
// ==========================================

/// 断言为本地校验错误
pub fn assert_validation_error(result: Result<impl std::fmt::Debug, ApiError>) {
    match result {
        Err(e) if e.is_validation() => {}
        other => panic!("Expected validation error, got {:?}", other),
    }
}

/// 断言为存储端错误
pub fn assert_store_error(result: Result<impl std::fmt::Debug, ApiError>) {
    match result {
        Err(ApiError::StoreError(_)) | Err(ApiError::StoreTimeout { .. }) => {}
        other => panic!("Expected store error, got {:?}", other),
    }
}
