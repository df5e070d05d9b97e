// ==========================================
// 炉次化学成分录入系统 - API 输入对象
// ==========================================
// 表单原始文本，原样传入 API，由 validator 统一解析
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::types::Element;

/// 炉次表单输入
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatInput {
    pub heat_code: String,
    pub supplier: String,
}

impl HeatInput {
    pub fn new(heat_code: impl Into<String>, supplier: impl Into<String>) -> Self {
        Self {
            heat_code: heat_code.into(),
            supplier: supplier.into(),
        }
    }
}

/// 化学成分表单输入
///
/// 未出现的元素等同于空输入。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChemistryInput {
    pub elements: BTreeMap<Element, String>,
    pub others: String,
}

impl ChemistryInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置元素原始输入（链式）
    pub fn with(mut self, element: Element, raw: impl Into<String>) -> Self {
        self.set(element, raw);
        self
    }

    /// 设置备注（链式）
    pub fn with_others(mut self, others: impl Into<String>) -> Self {
        self.others = others.into();
        self
    }

    pub fn set(&mut self, element: Element, raw: impl Into<String>) {
        self.elements.insert(element, raw.into());
    }

    /// 元素原始输入，未填写时返回空串
    pub fn raw(&self, element: Element) -> &str {
        self.elements.get(&element).map(String::as_str).unwrap_or("")
    }

    /// 表单是否完全为空
    pub fn is_blank(&self) -> bool {
        self.others.trim().is_empty() && self.elements.values().all(|v| v.trim().is_empty())
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.others.clear();
    }
}
