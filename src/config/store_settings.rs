// ==========================================
// 炉次化学成分录入系统 - 存储配置
// ==========================================
// 来源: 环境变量（或任意 key → value 查找函数，便于测试）
// ==========================================
// HEAT_LEDGER_STORE_URL           存储位置 (sqlite://path | file:path | path)
// HEAT_LEDGER_STORE_KEY           存储公钥（仅用于就绪检查）
// HEAT_LEDGER_TIMEOUT_MS          单次请求超时（毫秒）
// HEAT_LEDGER_CHEMISTRY_PAGE_SIZE 化学成分列表条数（限定 20–25）
// HEAT_LEDGER_HEAT_LIST_CAP       炉次列表上限（可选）
// ==========================================

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::config::readiness::EnvReadiness;

pub const ENV_STORE_URL: &str = "HEAT_LEDGER_STORE_URL";
pub const ENV_STORE_KEY: &str = "HEAT_LEDGER_STORE_KEY";
pub const ENV_TIMEOUT_MS: &str = "HEAT_LEDGER_TIMEOUT_MS";
pub const ENV_CHEMISTRY_PAGE_SIZE: &str = "HEAT_LEDGER_CHEMISTRY_PAGE_SIZE";
pub const ENV_HEAT_LIST_CAP: &str = "HEAT_LEDGER_HEAT_LIST_CAP";

/// 默认请求超时（毫秒）
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// 化学成分列表条数范围
pub const DEFAULT_CHEMISTRY_PAGE_SIZE: u32 = 20;
pub const MIN_CHEMISTRY_PAGE_SIZE: u32 = 20;
pub const MAX_CHEMISTRY_PAGE_SIZE: u32 = 25;

/// 配置错误
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("不支持的存储地址: {0}（仅支持 sqlite:// 或 file: 或本地路径）")]
    UnsupportedStoreUrl(String),
}

// ==========================================
// StoreSettings - 存储配置
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    pub store_url: Option<String>,
    pub store_key: Option<String>,
    pub request_timeout: Duration,
    pub chemistry_page_size: u32,
    pub heat_list_cap: Option<u32>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_url: None,
            store_key: None,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            chemistry_page_size: DEFAULT_CHEMISTRY_PAGE_SIZE,
            heat_list_cap: None,
        }
    }
}

impl StoreSettings {
    /// 从进程环境变量加载
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意查找函数加载
    ///
    /// 空白值视为未设置；数值解析失败时记录警告并回退默认值。
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| {
            lookup(key).and_then(|v| {
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };

        let timeout_ms = parse_or_warn::<u64>(ENV_TIMEOUT_MS, text(ENV_TIMEOUT_MS))
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);

        let page_size = parse_or_warn::<u32>(ENV_CHEMISTRY_PAGE_SIZE, text(ENV_CHEMISTRY_PAGE_SIZE))
            .map(|n| n.clamp(MIN_CHEMISTRY_PAGE_SIZE, MAX_CHEMISTRY_PAGE_SIZE))
            .unwrap_or(DEFAULT_CHEMISTRY_PAGE_SIZE);

        let heat_list_cap =
            parse_or_warn::<u32>(ENV_HEAT_LIST_CAP, text(ENV_HEAT_LIST_CAP)).filter(|n| *n > 0);

        Self {
            store_url: text(ENV_STORE_URL),
            store_key: text(ENV_STORE_KEY),
            request_timeout: Duration::from_millis(timeout_ms),
            chemistry_page_size: page_size,
            heat_list_cap,
        }
    }

    /// 环境就绪检查: 存储地址与公钥均已配置
    pub fn readiness(&self) -> EnvReadiness {
        EnvReadiness::check(self.store_url.as_deref(), self.store_key.as_deref())
    }

    /// 解析 SQLite 数据库路径
    ///
    /// # 返回
    /// - Ok(Some(path)): 已配置的本地路径
    /// - Ok(None): 未配置，由调用方使用默认路径
    /// - Err: 地址协议不受支持
    pub fn sqlite_path(&self) -> Result<Option<String>, ConfigError> {
        let Some(url) = self.store_url.as_deref() else {
            return Ok(None);
        };

        if let Some(path) = url.strip_prefix("sqlite://") {
            return Ok(Some(path.to_string()));
        }
        if let Some(path) = url.strip_prefix("file:") {
            return Ok(Some(path.to_string()));
        }
        if url.contains("://") {
            return Err(ConfigError::UnsupportedStoreUrl(url.to_string()));
        }
        Ok(Some(url.to_string()))
    }
}

fn parse_or_warn<T: FromStr>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("配置项 {} 无法解析: {:?}，使用默认值", key, raw);
            None
        }
    }
}
