// ==========================================
// 炉次化学成分录入系统 - 配置层
// ==========================================
// 职责: 存储配置加载、环境就绪检查
// ==========================================

pub mod readiness;
pub mod store_settings;

pub use readiness::EnvReadiness;
pub use store_settings::{ConfigError, StoreSettings};
