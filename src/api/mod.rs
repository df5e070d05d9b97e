// ==========================================
// 炉次化学成分录入系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供视图层与命令行调用
// ==========================================

pub mod chemistry_api;
pub mod dto;
pub mod error;
pub mod heat_api;
mod request;
pub mod validator;

// 重导出核心类型
pub use chemistry_api::ChemistryApi;
pub use dto::{ChemistryInput, HeatInput};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use heat_api::HeatApi;
