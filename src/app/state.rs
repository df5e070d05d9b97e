// ==========================================
// 炉次化学成分录入系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接和API实例
// ==========================================

use std::sync::{Arc, Mutex};
use rusqlite::Connection;

use crate::api::{ChemistryApi, HeatApi};
use crate::config::StoreSettings;
use crate::repository::{ChemistryRepository, HeatRepository};

/// 数据库路径环境变量（优先于默认路径）
pub const ENV_DB_PATH: &str = "HEAT_LEDGER_DB_PATH";

/// 应用状态
///
/// 两个 Repository 共享同一连接，API 持有 trait 对象
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 加载后的存储配置
    pub settings: StoreSettings,

    /// 炉次登记API
    pub heat_api: Arc<HeatApi>,

    /// 化学成分记录API
    pub chemistry_api: Arc<ChemistryApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 数据库路径优先取 settings 中的存储地址，否则使用默认路径。
    /// 打开连接后会执行建表。
    pub fn new(settings: StoreSettings) -> Result<Self, String> {
        let db_path = match settings.sqlite_path().map_err(|e| e.to_string())? {
            Some(path) => path,
            None => get_default_db_path(),
        };
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::db::ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;

        Ok(Self::from_connection(db_path, conn, settings))
    }

    /// 基于已打开（且已建表）的连接创建
    pub fn from_connection(db_path: String, conn: Connection, settings: StoreSettings) -> Self {
        let conn = Arc::new(Mutex::new(conn));

        let heat_repo = Arc::new(HeatRepository::from_connection(conn.clone()));
        let chemistry_repo = Arc::new(ChemistryRepository::from_connection(conn));

        let heat_api = Arc::new(HeatApi::new(heat_repo.clone(), &settings));
        let chemistry_api = Arc::new(ChemistryApi::new(heat_repo, chemistry_repo, &settings));

        tracing::debug!(
            timeout_ms = settings.request_timeout.as_millis() as u64,
            page_size = settings.chemistry_page_size,
            "AppState 初始化完成"
        );

        Self {
            db_path,
            settings,
            heat_api,
            chemistry_api,
        }
    }
}

/// 获取默认数据库路径
///
/// 顺序: HEAT_LEDGER_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(ENV_DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./heat_ledger.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("heat-ledger-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("heat-ledger");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("heat_ledger.db");
    }

    path.to_string_lossy().to_string()
}
