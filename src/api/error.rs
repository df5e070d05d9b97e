// ==========================================
// 炉次化学成分录入系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户可见的错误消息
// 分类:
// - 校验错误: 本地判定，不发起存储调用
// - 存储错误: 存储端返回的任何失败（含超时），保留存储端原文
// ==========================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::types::Element;
use crate::repository::error::RepositoryError;

/// API层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    // ==========================================
    // 校验错误（提交前）
    // ==========================================
    #[error("未选择炉次")]
    MissingHeatSelection,

    #[error("炉号不能为空")]
    EmptyHeatCode,

    /// 元素值超出 [0, 100]
    #[error("{element} 超出范围: {value}（允许 0–100）")]
    ElementOutOfRange { element: Element, value: f64 },

    // ==========================================
    // 存储错误
    // ==========================================
    #[error("{0}")]
    StoreError(String),

    #[error("存储请求超时: op={op}, timeout_ms={timeout_ms}")]
    StoreTimeout { op: &'static str, timeout_ms: u64 },

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 是否为提交前的本地校验错误
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ApiError::MissingHeatSelection
                | ApiError::EmptyHeatCode
                | ApiError::ElementOutOfRange { .. }
        )
    }

    /// 稳定错误代码（供前端/脚本判定）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingHeatSelection => "MISSING_HEAT_SELECTION",
            ApiError::EmptyHeatCode => "EMPTY_HEAT_CODE",
            ApiError::ElementOutOfRange { .. } => "ELEMENT_OUT_OF_RANGE",
            ApiError::StoreError(_) => "STORE_ERROR",
            ApiError::StoreTimeout { .. } => "STORE_TIMEOUT",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// 错误详情（JSON），无详情时返回 None
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::ElementOutOfRange { element, value } => Some(serde_json::json!({
                "element": element,
                "value": value,
            })),
            ApiError::StoreTimeout { op, timeout_ms } => Some(serde_json::json!({
                "op": op,
                "timeout_ms": timeout_ms,
            })),
            _ => None,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 存储端错误统一为 StoreError，消息保留存储端原文
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::TaskJoinError(msg) => ApiError::InternalError(msg),
            other => ApiError::StoreError(other.store_message()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 错误响应（返回给命令行/前端）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    pub details: Option<serde_json::Value>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            details: err.details(),
        }
    }
}
