// ==========================================
// 炉次化学成分录入系统 - 视图提示
// ==========================================
// 结构化提示 → 本地化文本（rust-i18n）
// ==========================================

use crate::api::ApiError;
use crate::i18n::{t, t_with_args};

/// 视图提示
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// 炉次已保存
    HeatSaved,
    /// 化学成分已保存
    ChemistrySaved,
    /// 操作失败（校验或存储）
    Error(ApiError),
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Notice::Error(e) => Some(e),
            _ => None,
        }
    }

    /// 当前语言下的提示文本
    pub fn render(&self) -> String {
        match self {
            Notice::HeatSaved => t("heat.saved"),
            Notice::ChemistrySaved => t("chemistry.saved"),
            Notice::Error(err) => render_error(err),
        }
    }
}

/// 错误的本地化文本；存储错误保留存储端原文
pub fn render_error(err: &ApiError) -> String {
    match err {
        ApiError::MissingHeatSelection => t("chemistry.pick_heat"),
        ApiError::EmptyHeatCode => t("heat.code_required"),
        ApiError::ElementOutOfRange { element, .. } => {
            t_with_args("chemistry.out_of_range", &[("element", element.label().as_str())])
        }
        ApiError::StoreError(message) => t_with_args("error.store", &[("message", message.as_str())]),
        ApiError::StoreTimeout { timeout_ms, .. } => {
            t_with_args("error.timeout", &[("timeout_ms", timeout_ms.to_string().as_str())])
        }
        ApiError::InternalError(message) => t_with_args("error.store", &[("message", message.as_str())]),
    }
}
