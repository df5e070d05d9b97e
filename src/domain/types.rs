// ==========================================
// 炉次化学成分录入系统 - 领域类型定义
// ==========================================
// 元素集合: 17 个固定顺序的化学元素百分比字段
// 数值解析: 文本 → Number(x) / Absent 的全函数
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 百分比下限（含）
pub const PERCENT_MIN: f64 = 0.0;

/// 百分比上限（含）
pub const PERCENT_MAX: f64 = 100.0;

// ==========================================
// 化学元素 (Element)
// ==========================================
// 顺序即校验顺序与表格列顺序，不可调整
// 序列化格式: 小写元素符号 (与数据库列名一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    C,  // 碳
    Mn, // 锰
    Si, // 硅
    P,  // 磷
    S,  // 硫
    Cr, // 铬
    Ni, // 镍
    Mo, // 钼
    Cu, // 铜
    V,  // 钒
    Nb, // 铌
    Ti, // 钛
    Al, // 铝
    N,  // 氮
    B,  // 硼
    W,  // 钨
    Co, // 钴
}

impl Element {
    /// 全部元素（固定顺序）
    pub const ALL: [Element; 17] = [
        Element::C,
        Element::Mn,
        Element::Si,
        Element::P,
        Element::S,
        Element::Cr,
        Element::Ni,
        Element::Mo,
        Element::Cu,
        Element::V,
        Element::Nb,
        Element::Ti,
        Element::Al,
        Element::N,
        Element::B,
        Element::W,
        Element::Co,
    ];

    /// 数据库列名 / 表单字段键
    pub fn column(&self) -> &'static str {
        match self {
            Element::C => "c",
            Element::Mn => "mn",
            Element::Si => "si",
            Element::P => "p",
            Element::S => "s",
            Element::Cr => "cr",
            Element::Ni => "ni",
            Element::Mo => "mo",
            Element::Cu => "cu",
            Element::V => "v",
            Element::Nb => "nb",
            Element::Ti => "ti",
            Element::Al => "al",
            Element::N => "n",
            Element::B => "b",
            Element::W => "w",
            Element::Co => "co",
        }
    }

    /// 显示用标签（大写，如 "MN"）
    pub fn label(&self) -> String {
        self.column().to_uppercase()
    }

    /// 在固定顺序中的下标
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// 从元素符号解析（大小写不敏感，容忍首尾空白）
    pub fn from_code(code: &str) -> Option<Element> {
        let normalized = code.trim().to_lowercase();
        Element::ALL
            .iter()
            .copied()
            .find(|e| e.column() == normalized)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 测量值 (Measurement)
// ==========================================
// Absent 表示"未测量"，与测得 0 严格区分
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Measurement {
    Number(f64),
    Absent,
}

impl Measurement {
    /// 将原始输入解析为测量值（全函数，不会失败）
    ///
    /// # 规则
    /// - 去除首尾空白后为空 → Absent
    /// - 无法解析为数字 → Absent
    /// - 非有限数（NaN / ±inf）→ Absent
    /// - 其余 → Number(x)，负零归一为 0
    ///
    /// 范围校验不在此处进行，见 `api::validator`。
    pub fn parse(raw: &str) -> Measurement {
        match parse_numeric(raw) {
            Some(x) if x.is_finite() => Measurement::Number(x + 0.0),
            _ => Measurement::Absent,
        }
    }

    /// 转为可空数值（用于持久化）
    pub fn value(&self) -> Option<f64> {
        match self {
            Measurement::Number(x) => Some(*x),
            Measurement::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Measurement::Absent)
    }
}

impl From<Option<f64>> for Measurement {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(x) => Measurement::Number(x),
            None => Measurement::Absent,
        }
    }
}

/// 按数字文法解析原始输入
///
/// 返回 None 表示空白或非数字文本；无穷大会原样返回，由调用方决定如何处理。
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(x) if !x.is_nan() => Some(x),
        _ => None,
    }
}

/// 判断数值是否位于 [0, 100] 闭区间
pub fn is_valid_percent(value: f64) -> bool {
    (PERCENT_MIN..=PERCENT_MAX).contains(&value)
}

/// 去除首尾空白，空串视为缺失
pub fn normalize_optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
