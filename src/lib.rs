// ==========================================
// 炉次化学成分录入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 炉次登记 + 化学成分记录（单用户录入）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 存储配置与就绪检查
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// SQL 性能追踪
pub mod perf;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 视图状态与输出
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ChemistryRecord, Composition, Element, Heat, HeatOption, Measurement, NewChemistryRecord,
    NewHeat,
};

// API
pub use api::{ApiError, ApiResult, ChemistryApi, ChemistryInput, HeatApi, HeatInput};

// 配置
pub use config::{EnvReadiness, StoreSettings};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "炉次化学成分录入系统";
