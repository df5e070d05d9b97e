// ==========================================
// 炉次化学成分录入系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod chemistry_repo;
mod deadline;
pub mod error;
pub mod heat_repo;
pub mod store;

// 重导出核心仓储
pub use chemistry_repo::ChemistryRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use heat_repo::HeatRepository;
pub use store::{ChemistryStore, HeatStore};
