// ==========================================
// 炉次化学成分录入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、元素集合、数值解析规则
// 红线: 不含数据访问逻辑
// ==========================================

pub mod chemistry;
pub mod heat;
pub mod types;

// 重导出核心类型
pub use chemistry::{ChemistryRecord, Composition, NewChemistryRecord};
pub use heat::{Heat, HeatOption, NewHeat};
pub use types::{Element, Measurement};
