// ==========================================
// 炉次化学成分录入系统 - 炉次领域模型
// ==========================================
// 对齐: heats 表 (id, heat_code, supplier, created_at)
// 生命周期: 仅创建与读取，不更新不删除
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::types::normalize_optional_text;

// ==========================================
// Heat - 炉次
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heat {
    pub id: i64,                   // 存储端分配
    pub heat_code: String,         // 炉号（非空）
    pub supplier: Option<String>,  // 供应商（可空）
    pub created_at: DateTime<Utc>, // 存储端写入时间
}

// ==========================================
// NewHeat - 待写入的炉次
// ==========================================
// 只能通过 `NewHeat::new` 构造，保证炉号已去空白且非空
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewHeat {
    heat_code: String,
    supplier: Option<String>,
}

impl NewHeat {
    /// 从表单原始输入构造
    ///
    /// # 返回
    /// - Some(NewHeat): 炉号去空白后非空
    /// - None: 炉号为空
    pub fn new(heat_code: &str, supplier: &str) -> Option<Self> {
        let heat_code = normalize_optional_text(heat_code)?;
        Some(Self {
            heat_code,
            supplier: normalize_optional_text(supplier),
        })
    }

    pub fn heat_code(&self) -> &str {
        &self.heat_code
    }

    pub fn supplier(&self) -> Option<&str> {
        self.supplier.as_deref()
    }
}

// ==========================================
// HeatOption - 下拉选择项
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatOption {
    pub id: i64,
    pub heat_code: String,
}

impl From<&Heat> for HeatOption {
    fn from(heat: &Heat) -> Self {
        Self {
            id: heat.id,
            heat_code: heat.heat_code.clone(),
        }
    }
}

impl fmt::Display for HeatOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.heat_code, self.id)
    }
}
